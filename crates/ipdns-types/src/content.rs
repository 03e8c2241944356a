use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest identifier accepted from a backend. CIDv1 strings stay well below.
pub(crate) const MAX_ID_LEN: usize = 128;

/// Content-addressed identifier for a stored record object.
///
/// A `ContentId` is produced by an object store when an object is written
/// and is the only way to read it back. Identical content always maps to
/// the same `ContentId`. The value is opaque: a Kubo CID (`Qm...`,
/// `bafy...`) or a `b3`-prefixed BLAKE3 digest from the in-memory store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Parse a content identifier from its printable form.
    pub fn new(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        validate_id("content id", &s)?;
        Ok(Self(s))
    }

    /// Build a content identifier from a 32-byte BLAKE3 digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(format!("b3{}", hex::encode(digest)))
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

/// Identifiers are opaque but must be printable tokens: non-empty, bounded,
/// and ASCII alphanumeric so they can be passed to a backend verbatim.
pub(crate) fn validate_id(kind: &'static str, s: &str) -> Result<(), TypeError> {
    if s.is_empty() || s.len() > MAX_ID_LEN || !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(TypeError::InvalidId {
            kind,
            value: s.to_string(),
        });
    }
    Ok(())
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_digest_is_deterministic() {
        let id1 = ContentId::from_digest([7; 32]);
        let id2 = ContentId::from_digest([7; 32]);
        assert_eq!(id1, id2);
        assert!(id1.as_str().starts_with("b3"));
        assert_eq!(id1.as_str().len(), 66);
    }

    #[test]
    fn accepts_kubo_cids() {
        let id = ContentId::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").unwrap();
        assert_eq!(id.short(), "QmYwAPJzv5CZ");
    }

    #[test]
    fn rejects_empty_and_paths() {
        assert!(ContentId::new("").is_err());
        assert!(ContentId::new("/ipfs/Qmabc").is_err());
        assert!(ContentId::new("Qm abc").is_err());
        assert!(ContentId::new("x".repeat(MAX_ID_LEN + 1)).is_err());
    }

    #[test]
    fn equality_is_byte_exact() {
        let lower = ContentId::new("bafyabc").unwrap();
        let upper = ContentId::new("BAFYABC").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn serde_is_a_plain_string() {
        let id = ContentId::from_digest([1; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<ContentId>("\"not valid\"").is_err());
    }
}
