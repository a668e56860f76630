//! Networking: request descriptors, the transport seam, the refresh-aware
//! fetch wrapper, and the REST helpers built on top of it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is what screens call, `fetch` owns the 401 handling, `transport`
//! talks to the wire, and `types` defines the auth wire schema.

pub mod api;
pub mod fetch;
pub mod request;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;
