//! Core domain types and traits for buildspec.
//!
//! This crate contains:
//! - The build descriptor model (SDK fields, compile options, build types)
//! - Dependency coordinates, scopes and classpaths
//! - Layered build-type settings
//! - Collaborator traits (SDK defaults, signing-config registry)
//! - The resolved per-variant configuration

pub mod build_type;
pub mod compile;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod sdk;
pub mod signing;
pub mod variant;

pub use build_type::{BuildType, ConfigLayer, ProguardFile, Setting, SettingKey};
pub use compile::{CompileOptions, JavaVersion};
pub use dependency::{Classpath, Coordinate, Dependency, DependencyScope, ScopeKind};
pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use sdk::{NoDefaults, SdkDefaults, SdkLevels, SdkValue, StringValue};
pub use signing::{InMemorySigningConfigs, SigningConfig, SigningConfigRegistry};
pub use variant::{Classpaths, ResolvedDependency, VariantConfig};
