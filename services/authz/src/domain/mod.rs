pub mod change;
pub mod repository;
pub mod types;
