pub mod cache;
pub mod cached;
pub mod db;
pub mod keys;
