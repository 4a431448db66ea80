pub mod common;
pub mod release;
pub mod repository;
