//! Refresh Session Store.
//!
//! The only mutable shared state in the system. Every record is the durable
//! half of one issued refresh token; the token string itself is never stored.

pub mod service;
pub mod sweeper;
