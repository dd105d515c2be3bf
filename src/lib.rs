pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ingest;
pub mod model;
pub mod render;
pub mod session;
mod utils;


pub use config::{Config, DEFAULT_BUDGET};
pub use error::{Error, LoadError, Result};
pub use session::{Session, View};
