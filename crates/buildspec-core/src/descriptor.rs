//! The build descriptor.

use serde::{Deserialize, Serialize};

use crate::{BuildType, CompileOptions, ConfigLayer, Dependency, SdkValue, StringValue};

/// A complete, statically declared build configuration.
///
/// Constructed once from input and only read during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Plugin ids, in declaration order.
    pub plugins: Vec<String>,
    pub namespace: String,
    pub application_id: String,
    pub ndk_version: Option<String>,
    pub compile_sdk: SdkValue,
    pub min_sdk: SdkValue,
    pub target_sdk: SdkValue,
    pub version_code: Option<SdkValue>,
    pub version_name: Option<StringValue>,
    pub compile_options: CompileOptions,
    /// Base settings layer (`defaultConfig`) that build types override.
    pub default_config: ConfigLayer,
    pub build_types: Vec<BuildType>,
    pub dependencies: Vec<Dependency>,
}

impl Descriptor {
    /// Names of the declared build types, in declaration order.
    pub fn build_type_names(&self) -> impl Iterator<Item = &str> {
        self.build_types.iter().map(|b| b.name.as_str())
    }

    pub fn build_type(&self, name: &str) -> Option<&BuildType> {
        self.build_types.iter().find(|b| b.name == name)
    }

    pub fn has_plugin(&self, id: &str) -> bool {
        self.plugins.iter().any(|p| p == id)
    }
}
