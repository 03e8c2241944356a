//! Cryptographic primitives for ipdns.
//!
//! Provides domain-separated BLAKE3 hashing for content ids and Ed25519 key
//! generation for the pointer identities of the in-memory naming service.

pub mod hasher;
pub mod keys;

pub use hasher::{ContentHasher, HasherError};
pub use keys::PointerKey;
