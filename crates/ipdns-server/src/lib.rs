//! UDP DNS front end for ipdns.
//!
//! Answers standard `IN A` queries by walking the requested name through
//! the naming fabric. Each datagram is handled independently; malformed or
//! unsupported requests are dropped without a reply.

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::{BackendFailurePolicy, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use handler::{DnsRequestHandler, DropReason, Outcome};
pub use server::{DnsServer, MAX_DATAGRAM};
