// Configuration: TOML file loading, defaults and validation.

pub mod types;

pub use types::{Config, ConfigError};
