//! Signing-config references.
//!
//! Key material lives with an external keystore subsystem; the resolver only
//! ever checks that a referenced name is known.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named signing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningConfig {
    pub name: String,
}

impl SigningConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Registry of known signing configurations.
pub trait SigningConfigRegistry: Send + Sync {
    /// Look up a signing configuration by name.
    fn lookup(&self, name: &str) -> Option<SigningConfig>;
}

/// A registry backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct InMemorySigningConfigs {
    configs: BTreeMap<String, SigningConfig>,
}

impl InMemorySigningConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only the implicit `debug` config.
    pub fn with_debug() -> Self {
        Self::new().with(SigningConfig::new("debug"))
    }

    pub fn with(mut self, config: SigningConfig) -> Self {
        self.insert(config);
        self
    }

    pub fn insert(&mut self, config: SigningConfig) {
        self.configs.insert(config.name.clone(), config);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(|k| k.as_str())
    }
}

impl SigningConfigRegistry for InMemorySigningConfigs {
    fn lookup(&self, name: &str) -> Option<SigningConfig> {
        self.configs.get(name).cloned()
    }
}
