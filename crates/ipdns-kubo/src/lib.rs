//! Kubo backend for ipdns.
//!
//! [`KuboClient`] drives a local Kubo (go-ipfs) node through its command-line
//! interface and implements both [`ObjectStore`](ipdns_store::ObjectStore)
//! (objects added to and fetched from IPFS) and
//! [`NamingService`](ipdns_naming::NamingService) (keys and pointers on IPNS).
//!
//! Objects pass through temporary files created under the client's data
//! path; they are removed once the command finishes.

pub mod client;
pub mod error;
pub mod naming;
pub mod parse;
pub mod store;

pub use client::{KuboClient, DEFAULT_IPFS_BIN};
pub use error::{KuboError, Result};
