//! Resolution errors.

use buildspec_core::SettingKey;
use thiserror::Error;

/// Why a variant (or the whole descriptor) could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("descriptor declares no build types")]
    NoBuildTypes,

    #[error("build type '{0}' is declared more than once")]
    DuplicateBuildType(String),

    #[error("invalid SDK range: expected minSdk ({min}) <= targetSdk ({target}) <= compileSdk ({compile})")]
    InvalidSdkRange { min: u32, target: u32, compile: u32 },

    #[error("no default for {field}: '{key}' is not provided")]
    MissingSdkDefault { field: String, key: String },

    #[error("duplicate configuration: {key} is set more than once in {layer}")]
    DuplicateConfiguration { layer: String, key: SettingKey },

    #[error("unresolved signing config: {}", .name.as_deref().unwrap_or("none set"))]
    UnresolvedSigningConfig { name: Option<String> },

    #[error("unknown dependency scope '{scope}' for {coordinate}")]
    UnknownDependencyScope { scope: String, coordinate: String },

    #[error("missing capability: {0}")]
    MissingCapability(String),
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
