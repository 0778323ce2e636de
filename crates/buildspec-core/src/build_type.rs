//! Build types and layered settings.
//!
//! Settings are kept as ordered assignments rather than collapsed into a
//! struct, so a field assigned twice at the same level is still visible when
//! the layers are merged.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A rule file passed to the code shrinker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProguardFile {
    /// A file shipped with the toolchain (`getDefaultProguardFile(name)`).
    Default(String),
    /// A file relative to the module directory.
    Project(String),
}

/// Name of an overridable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SettingKey {
    #[display("signingConfig")]
    SigningConfig,
    #[display("minifyEnabled")]
    MinifyEnabled,
    #[display("shrinkResources")]
    ShrinkResources,
    #[display("proguardFiles")]
    ProguardFiles,
    #[display("debuggable")]
    Debuggable,
    #[display("applicationIdSuffix")]
    ApplicationIdSuffix,
    #[display("versionNameSuffix")]
    VersionNameSuffix,
}

/// A single assignment within a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Setting {
    SigningConfig(String),
    MinifyEnabled(bool),
    ShrinkResources(bool),
    ProguardFiles(Vec<ProguardFile>),
    Debuggable(bool),
    ApplicationIdSuffix(String),
    VersionNameSuffix(String),
}

impl Setting {
    pub fn key(&self) -> SettingKey {
        match self {
            Setting::SigningConfig(_) => SettingKey::SigningConfig,
            Setting::MinifyEnabled(_) => SettingKey::MinifyEnabled,
            Setting::ShrinkResources(_) => SettingKey::ShrinkResources,
            Setting::ProguardFiles(_) => SettingKey::ProguardFiles,
            Setting::Debuggable(_) => SettingKey::Debuggable,
            Setting::ApplicationIdSuffix(_) => SettingKey::ApplicationIdSuffix,
            Setting::VersionNameSuffix(_) => SettingKey::VersionNameSuffix,
        }
    }
}

/// Ordered assignments made at one specificity level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    pub settings: Vec<Setting>,
}

impl ConfigLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, setting: Setting) {
        self.settings.push(setting);
    }

    pub fn with(mut self, setting: Setting) -> Self {
        self.push(setting);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// A named variant policy (e.g. `release`, `debug`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildType {
    pub name: String,
    /// Settings overriding the `defaultConfig` layer.
    pub layer: ConfigLayer,
}

impl BuildType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: ConfigLayer::new(),
        }
    }

    pub fn with(mut self, setting: Setting) -> Self {
        self.layer.push(setting);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_preserves_assignment_order() {
        let build_type = BuildType::new("release")
            .with(Setting::MinifyEnabled(false))
            .with(Setting::SigningConfig("debug".to_string()))
            .with(Setting::MinifyEnabled(true));

        let keys: Vec<SettingKey> = build_type.layer.iter().map(Setting::key).collect();
        assert_eq!(
            keys,
            vec![
                SettingKey::MinifyEnabled,
                SettingKey::SigningConfig,
                SettingKey::MinifyEnabled
            ]
        );
    }

    #[test]
    fn test_setting_key_names() {
        assert_eq!(SettingKey::ShrinkResources.to_string(), "shrinkResources");
        assert_eq!(SettingKey::SigningConfig.to_string(), "signingConfig");
    }
}
