//! Mutable pointer management for ipdns.
//!
//! This crate provides the naming layer that sits on top of the
//! content-addressed object store: key names bound to pointer identities,
//! and pointer identities bound to the content id of the record currently
//! published under them. Republishing a pointer is the only way zone data
//! changes; every individual version of a record stays immutable.
//!
//! # Modules
//!
//! - [`error`]: Error types for naming operations
//! - [`traits`]: The [`NamingService`] trait defining the pointer interface
//! - [`names`]: Key name validation
//! - [`memory`]: In-memory [`InMemoryNamingService`] for tests

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;

pub use error::{NamingError, Result};
pub use memory::InMemoryNamingService;
pub use names::validate_key_name;
pub use traits::NamingService;
