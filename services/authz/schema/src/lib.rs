//! sea-orm entities for the authorization store.
//!
//! Soft-deletable tables (`roles`, `role_permissions`) carry `deleted_at`; every
//! read in the service filters on it being null.

pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod user_roles;
pub mod users;
