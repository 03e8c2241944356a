use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::content::validate_id;
use crate::error::TypeError;

/// Identity of a mutable naming slot.
///
/// A `PointerId` is stable for the lifetime of the key that backs it; the
/// content it resolves to can be republished at any time. It is distinct
/// from the human-readable key name bound to it in the naming service.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PointerId(String);

impl PointerId {
    /// Parse a pointer identity from its printable form.
    pub fn new(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        validate_id("pointer id", &s)?;
        Ok(Self(s))
    }

    /// Build a pointer identity from a 32-byte key digest.
    pub fn from_key_digest(digest: [u8; 32]) -> Self {
        Self(format!("k{}", hex::encode(digest)))
    }

    /// The printable form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 characters) for log output.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Debug for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointerId({})", self.short())
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PointerId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PointerId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PointerId> for String {
    fn from(id: PointerId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_key_digest_prefix() {
        let id = PointerId::from_key_digest([0xab; 32]);
        assert!(id.as_str().starts_with("kabab"));
        assert_eq!(id.as_str().len(), 65);
    }

    #[test]
    fn accepts_ipns_keys() {
        let raw = "k2k4r8nk7wv8kbapvrfpleun1juxvmdv5vmuxpu57n371ygf0opljtdd";
        let id: PointerId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert_eq!(format!("{id:?}"), "PointerId(k2k4r8nk7wv8)");
    }

    #[test]
    fn rejects_malformed() {
        assert!(PointerId::new("").is_err());
        assert!(PointerId::new("/ipns/k51").is_err());
        assert!(PointerId::new("k51\n").is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let id = PointerId::from_key_digest([3; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: PointerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
