//! Test utilities for Warden crates.
//!
//! Import from `[dev-dependencies]` only; never in production code.

pub mod auth;
