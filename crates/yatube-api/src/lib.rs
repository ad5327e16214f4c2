pub mod directory;
pub mod error;
pub mod feed;
pub mod follow;
pub mod middleware;
pub mod posts;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
