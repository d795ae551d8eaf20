pub mod access;
pub mod password;
pub mod permission;
pub mod resolve;
pub mod role;
pub mod seed;
pub mod user;
pub mod user_role;
