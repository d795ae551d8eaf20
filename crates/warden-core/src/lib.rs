//! Shared plumbing for Warden binaries and services: tracing setup and the
//! per-request [`context::RequestContext`].

pub mod context;
pub mod tracing;
