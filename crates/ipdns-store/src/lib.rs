//! Content-addressed object storage for ipdns.
//!
//! Every zone record that the resolver walks is a JSON object stored under
//! the [`ContentId`](ipdns_types::ContentId) derived from its content.
//! Records are immutable; the only mutable state in the system lives in the
//! naming service that points at them.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - `KuboClient` in `ipdns-kubo` -- objects added to an IPFS node
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Concurrent reads are always safe (objects are immutable).
//! 3. "Not stored" is `Ok(None)`; a backend that cannot answer is `Err`.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use traits::ObjectStore;
