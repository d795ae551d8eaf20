//! Domain types shared across all Warden crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/`.

pub mod id;
pub mod identity;
pub mod pagination;
pub mod user;
