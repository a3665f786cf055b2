//! # Prospan Lib Core
//!
//! I/O-free logic for Prospan Lib: data models, the in-memory document
//! store, prompt construction, response validation, citation resolution,
//! dashboard statistics, and the session state machine.
//!
//! This crate performs no network or filesystem access. The AI provider,
//! configuration and presentation surfaces live in the `prospan-lib` crate.

pub mod citation;
pub mod dashboard;
pub mod models;
pub mod prompt;
pub mod response;
pub mod seed;
pub mod session;
pub mod store;
