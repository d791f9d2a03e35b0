#![deny(unsafe_code)]

pub mod error;
pub mod registry;

pub use error::{ConfigError, Result};
pub use registry::SchemaRegistry;
