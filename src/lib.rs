pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod paths;
pub mod quantities;
pub mod reactions;

pub use error::{NdsError, Result};
pub use models::*;
