//! Field validators. These run before any statement is prepared, so a
//! rejected value never reaches the database.

use crate::error::{Result, StoreError};

pub const TITLE_MAX_LEN: usize = 200;
pub const SLUG_MAX_LEN: usize = 50;
pub const USERNAME_MAX_LEN: usize = 150;
const USERNAME_MIN_LEN: usize = 3;

/// Post and comment bodies must contain something other than whitespace.
pub fn not_empty_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(field, "this field is required", value));
    }
    Ok(())
}

pub fn title(value: &str) -> Result<()> {
    not_empty_text("title", value)?;
    if value.chars().count() > TITLE_MAX_LEN {
        return Err(StoreError::validation(
            "title",
            format!("at most {TITLE_MAX_LEN} characters"),
            value,
        ));
    }
    Ok(())
}

/// Letters, digits, hyphens and underscores only.
pub fn slug(value: &str) -> Result<()> {
    let well_formed = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed {
        return Err(StoreError::validation(
            "slug",
            "use only latin letters, digits, hyphens and underscores",
            value,
        ));
    }
    if value.len() > SLUG_MAX_LEN {
        return Err(StoreError::validation(
            "slug",
            format!("at most {SLUG_MAX_LEN} characters"),
            value,
        ));
    }
    Ok(())
}

pub fn username(value: &str) -> Result<()> {
    let len = value.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(StoreError::validation(
            "username",
            format!("between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"),
            value,
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(StoreError::validation(
            "username",
            "letters, digits and @/./+/-/_ only",
            value,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_text_rejected() {
        for value in ["", "   ", "\n\t"] {
            let err = not_empty_text("text", value).unwrap_err();
            assert!(matches!(err, StoreError::Validation { field: "text", .. }));
        }
        assert!(not_empty_text("text", "hello").is_ok());
    }

    #[test]
    fn validation_keeps_offending_value() {
        match not_empty_text("text", "  ") {
            Err(StoreError::Validation { value, .. }) => assert_eq!(value, "  "),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn slug_charset_and_length() {
        assert!(slug("test-group_1").is_ok());
        assert!(slug("").is_err());
        assert!(slug("with space").is_err());
        assert!(slug("тест").is_err());
        assert!(slug(&"a".repeat(SLUG_MAX_LEN)).is_ok());
        assert!(slug(&"a".repeat(SLUG_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn title_length_limit() {
        assert!(title(&"т".repeat(TITLE_MAX_LEN)).is_ok());
        assert!(title(&"т".repeat(TITLE_MAX_LEN + 1)).is_err());
        assert!(title("").is_err());
    }

    #[test]
    fn username_rules() {
        assert!(username("leo").is_ok());
        assert!(username("user.name+tag@x").is_ok());
        assert!(username("ab").is_err());
        assert!(username("bad name").is_err());
    }
}
