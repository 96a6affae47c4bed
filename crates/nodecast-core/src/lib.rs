//! nodecast-core — shared domain types and configuration.
//!
//! Every other nodecast crate depends on this one: the telemetry sample
//! type, the resolved per-subsystem config structs, and the TOML config
//! file loader live here. Durations in the config file are human strings
//! ("5m", "30s") parsed by [`parse_duration`].

pub mod config;
pub mod error;
pub mod types;

pub use config::{Settings, parse_duration};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
