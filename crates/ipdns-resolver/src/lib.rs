//! Name resolution over the ipdns naming fabric.
//!
//! A domain is resolved by walking its labels from the top-level domain
//! down. Starting at a configured trust-root pointer, each step dereferences
//! the current pointer to a content id, loads the record stored there, and
//! follows the delegation for the next label. The record reached after the
//! last label carries the addresses.
//!
//! # Key Types
//!
//! - [`Resolver`]: Read-only walk from a fixed trust root
//! - [`Resolution`]: Addresses found, or why there are none
//! - [`DomainRecord`]: Stored JSON shape of delegations and addresses
//! - [`ZonePublisher`]: Stores records and publishes zone trees bottom-up

pub mod error;
pub mod publisher;
pub mod record;
pub mod resolver;

pub use error::{PublishError, ResolveError};
pub use publisher::{ZoneNode, ZonePublisher, DEFAULT_ROOT_NAME};
pub use record::{Delegation, DomainRecord, ADDRESS_KEY};
pub use resolver::{NotFoundReason, Resolution, Resolver, RetryPolicy};
