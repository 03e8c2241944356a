use ipdns_types::PointerId;

use crate::hasher::ContentHasher;

/// Ed25519 key pair backing a mutable pointer.
///
/// The pointer identity is the domain-separated digest of the public key,
/// so it is stable for the life of the key and cannot collide with a
/// content id.
pub struct PointerKey(ed25519_dalek::SigningKey);

impl PointerKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from a raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// Raw public key bytes.
    pub fn public_bytes(&self) -> [u8; 32] {
        self.0.verifying_key().to_bytes()
    }

    /// The pointer identity derived from the public key.
    pub fn pointer_id(&self) -> PointerId {
        PointerId::from_key_digest(ContentHasher::POINTER.digest(&self.public_bytes()))
    }
}

impl std::fmt::Debug for PointerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PointerKey({})", hex::encode(&self.public_bytes()[..8]))
    }
}
