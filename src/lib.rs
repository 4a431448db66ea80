pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod retry;
pub mod staging;

pub use error::{Result, StagingError};
