//! Key name validation.
//!
//! Key names are the human-readable handles a publisher uses for pointers
//! (`ipfs key gen <name>`). Valid key names:
//! - Must be non-empty and at most 255 bytes
//! - Must not contain whitespace, control characters, `/` or `\`
//! - Must not be `.` or `..`
//! - Must not be `self`, which the naming daemon reserves for the node key

use crate::error::{NamingError, Result};

/// Longest accepted key name in bytes.
pub const MAX_KEY_NAME_LEN: usize = 255;

/// Name the naming daemon reserves for its own identity key.
pub const RESERVED_SELF: &str = "self";

/// Validate a key name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use ipdns_naming::names::validate_key_name;
///
/// assert!(validate_key_name("ipdns-root").is_ok());
/// assert!(validate_key_name("www.example.test").is_ok());
/// assert!(validate_key_name("").is_err());
/// assert!(validate_key_name("self").is_err());
/// ```
pub fn validate_key_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| NamingError::InvalidKeyName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("key name must not be empty"));
    }
    if name.len() > MAX_KEY_NAME_LEN {
        return Err(invalid("key name is longer than 255 bytes"));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || *c == '/' || *c == '\\')
    {
        return Err(NamingError::InvalidKeyName {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }
    if name == "." || name == ".." {
        return Err(invalid("must not be '.' or '..'"));
    }
    if name == RESERVED_SELF {
        return Err(invalid("'self' is reserved for the node key"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(validate_key_name("root").is_ok());
        assert!(validate_key_name("ipdns.www.example.test").is_ok());
        assert!(validate_key_name("zone_1-a").is_ok());
        assert!(validate_key_name(&"k".repeat(MAX_KEY_NAME_LEN)).is_ok());
    }

    #[test]
    fn reject_empty_and_long() {
        assert!(validate_key_name("").is_err());
        assert!(validate_key_name(&"k".repeat(MAX_KEY_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn reject_whitespace_and_control() {
        assert!(validate_key_name("has space").is_err());
        assert!(validate_key_name("has\ttab").is_err());
        assert!(validate_key_name("nul\0byte").is_err());
    }

    #[test]
    fn reject_path_separators() {
        assert!(validate_key_name("a/b").is_err());
        assert!(validate_key_name("a\\b").is_err());
        assert!(validate_key_name(".").is_err());
        assert!(validate_key_name("..").is_err());
    }

    #[test]
    fn reject_reserved_self() {
        let err = validate_key_name("self").unwrap_err();
        assert!(matches!(err, NamingError::InvalidKeyName { .. }));
        assert!(validate_key_name("self2").is_ok());
    }
}
