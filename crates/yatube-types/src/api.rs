use serde::{Deserialize, Serialize};

use crate::models::{Author, Comment, Group, Page, Post};

// -- Authors --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterAuthorRequest {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
}

// -- Groups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGroupRequest {
    pub title: String,
    /// Derived from the title when absent or empty.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

// -- Posts --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostForm {
    pub text: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentForm {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: Post,
    pub comments: Vec<Comment>,
}

// -- Feeds --

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupPostsResponse {
    pub group: Group,
    pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub author: Author,
    /// Whether the acting user follows `author`; false for anonymous callers.
    pub following: bool,
    pub count: u64,
    pub followers: u64,
    pub follows: u64,
    pub page_obj: Page<Post>,
}

// -- Follows --

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub username: String,
    pub following: bool,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Offending input echoed back for re-display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
