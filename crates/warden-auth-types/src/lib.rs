//! Credential validation and access gates shared across Warden crates.
//!
//! Provides the JWT-backed [`token::CredentialValidator`], the
//! [`gate::AccessGate`] that turns a bearer credential into an
//! [`Identity`](warden_domain::identity::Identity), and axum extractors built on it.

pub mod gate;
pub mod identity;
pub mod token;
