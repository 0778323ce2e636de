//! KDL configuration parsing for buildspec.
//!
//! This crate handles parsing of:
//! - Build descriptors (build.kdl)
//! - Toolchain defaults files and `local.properties`

pub mod defaults;
pub mod descriptor;
pub mod error;
mod nodes;

pub use defaults::{DefaultsContext, DefaultsContextBuilder, parse_defaults, parse_properties};
pub use descriptor::{load_descriptor, parse_descriptor};
pub use error::{ConfigError, ConfigResult};
