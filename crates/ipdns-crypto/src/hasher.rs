use ipdns_types::ContentId;

/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a record object and a key with identical bytes never
/// share a digest.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored record objects.
    pub const OBJECT: Self = Self {
        domain: "ipdns-object-v1",
    };
    /// Hasher for pointer key material.
    pub const POINTER: Self = Self {
        domain: "ipdns-pointer-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Domain-separated digest of raw bytes.
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Content id for raw bytes.
    pub fn hash(&self, data: &[u8]) -> ContentId {
        ContentId::from_digest(self.digest(data))
    }

    /// Content id for a JSON value, hashed over its canonical encoding.
    ///
    /// `serde_json` maps are ordered by key, so two values that compare
    /// equal always serialize to the same bytes.
    pub fn hash_json(&self, value: &serde_json::Value) -> Result<ContentId, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Verify that data produces the expected content id.
    pub fn verify(&self, data: &[u8], expected: &ContentId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_is_deterministic() {
        let id1 = ContentHasher::OBJECT.hash(b"hello world");
        let id2 = ContentHasher::OBJECT.hash(b"hello world");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_domains_produce_different_digests() {
        let data = b"same content";
        assert_ne!(
            ContentHasher::OBJECT.digest(data),
            ContentHasher::POINTER.digest(data)
        );
    }

    #[test]
    fn verify_detects_tampering() {
        let id = ContentHasher::OBJECT.hash(b"original");
        assert!(ContentHasher::OBJECT.verify(b"original", &id));
        assert!(!ContentHasher::OBJECT.verify(b"tampered", &id));
    }

    #[test]
    fn hash_json_ignores_insertion_order() {
        let a = json!({"test": "k1", "A": "1.2.3.4"});
        let b = json!({"A": "1.2.3.4", "test": "k1"});
        assert_eq!(
            ContentHasher::OBJECT.hash_json(&a).unwrap(),
            ContentHasher::OBJECT.hash_json(&b).unwrap()
        );
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::OBJECT.hash(b"data"));
    }
}
