//! Foundation types for ipdns.
//!
//! This crate provides the identifier and name types shared by every other
//! ipdns crate: content identifiers from the object store, pointer
//! identities from the naming service, and the domain names the resolver
//! walks.
//!
//! # Key Types
//!
//! - [`ContentId`]: Immutable, content-derived address of a stored record
//! - [`PointerId`]: Identity of a mutable naming slot
//! - [`Label`]: One non-empty ASCII label, compared byte-exact
//! - [`DomainName`]: Ordered label sequence with TLD-first walk order

pub mod content;
pub mod domain;
pub mod error;
pub mod pointer;

pub use content::ContentId;
pub use domain::{DomainName, Label, MAX_LABEL_LEN, MAX_NAME_LEN};
pub use error::TypeError;
pub use pointer::PointerId;
