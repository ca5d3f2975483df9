use bigdecimal::{BigDecimal, Zero};
use std::fmt;
use std::str::FromStr;

pub const OBJECT_ID_LEN: usize = 24;
pub const PUSH_TITLE_MAX_LEN: usize = 120;
pub const PUSH_BODY_MAX_LEN: usize = 1000;
pub const SEARCH_QUERY_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult {
    if stock < 0 {
        return Err(ValidationError::new("stock", "must be zero or greater"));
    }

    Ok(())
}

/// Parses a non-negative money or percentage amount typed by the operator.
pub fn validate_amount(field: &'static str, raw: &str) -> Result<BigDecimal, ValidationError> {
    validate_required(field, raw)?;
    let amount = BigDecimal::from_str(raw.trim())
        .map_err(|_| ValidationError::new(field, format!("'{}' is not a number", raw.trim())))?;
    if amount < BigDecimal::zero() {
        return Err(ValidationError::new(field, "must be zero or greater"));
    }
    Ok(amount)
}

/// Backend record ids are 24 hex characters; anything else is treated as a
/// product name when both are accepted.
pub fn is_object_id(value: &str) -> bool {
    value.len() == OBJECT_ID_LEN && value.chars().all(|ch| ch.is_ascii_hexdigit())
}

pub fn validate_search_query(query: &str) -> Result<String, ValidationError> {
    let query = sanitize_string(query);
    validate_required("query", &query)?;
    validate_max_len("query", &query, SEARCH_QUERY_MAX_LEN)?;
    Ok(query)
}

pub fn validate_push_message(title: &str, body: &str) -> ValidationResult {
    validate_required("title", title)?;
    validate_required("body", body)?;
    validate_max_len("title", title, PUSH_TITLE_MAX_LEN)?;
    validate_max_len("body", body, PUSH_BODY_MAX_LEN)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn validates_enum_values() {
        assert!(validate_enum("format", "csv", &["csv", "excel", "pdf"]).is_ok());
        assert!(validate_enum("format", "docx", &["csv", "excel", "pdf"]).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(8).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn validates_amounts() {
        assert_eq!(validate_amount("fee", " 12.50 ").unwrap(), BigDecimal::from_str("12.50").unwrap());
        assert!(validate_amount("fee", "0").is_ok());
        assert_eq!(validate_amount("fee", "-1").unwrap_err().message, "must be zero or greater");
        assert_eq!(validate_amount("fee", "ten").unwrap_err().field, "fee");
        assert!(validate_amount("fee", "").is_err());
    }

    #[test]
    fn detects_object_ids() {
        assert!(is_object_id("64f1a2b3c4d5e6f7a8b9c0d1"));
        assert!(is_object_id("64F1A2B3C4D5E6F7A8B9C0D1"));
        assert!(!is_object_id("Basmati Rice"));
        assert!(!is_object_id("64f1a2b3c4d5e6f7a8b9c0d"));
        assert!(!is_object_id("64f1a2b3c4d5e6f7a8b9c0dz"));
    }

    #[test]
    fn search_query_is_sanitized() {
        assert_eq!(validate_search_query("  rice \n").unwrap(), "rice");
        assert!(validate_search_query("   ").is_err());
        assert!(validate_search_query(&"q".repeat(201)).is_err());
    }

    #[test]
    fn push_message_requires_title_and_body() {
        assert!(validate_push_message("Sale", "20% off today").is_ok());
        let err = validate_push_message("", "body").unwrap_err();
        assert_eq!(err.field, "title");
        let err = validate_push_message("title", " ").unwrap_err();
        assert_eq!(err.field, "body");
    }
}
