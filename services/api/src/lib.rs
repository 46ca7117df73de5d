//! services/api/src/lib.rs
//!
//! The HTTP service: configuration, adapters for the core ports, and the
//! axum web layer. The binaries in `src/bin` only wire these together.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
