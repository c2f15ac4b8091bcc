//! Static asset host for the batch simulator front-end.
//!
//! Exposes configuration and router construction so integration tests and
//! the binary entrypoint build the exact same service.

pub mod config;
pub mod routes;
