//! SDK levels and the defaults provider.
//!
//! Descriptors may pin an SDK level directly (`minSdk 21`) or refer to a value
//! owned by an external toolchain (`minSdk "flutter.minSdkVersion"`). References
//! are looked up through an injected [`SdkDefaults`] provider at resolution time.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An integer setting that is either literal or a named reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SdkValue {
    /// A literal level.
    Level(u32),
    /// A dotted key resolved through [`SdkDefaults::sdk_default`].
    Ref(String),
}

impl SdkValue {
    /// Resolve to a concrete level.
    pub fn resolve(&self, defaults: &dyn SdkDefaults) -> Result<u32> {
        match self {
            SdkValue::Level(level) => Ok(*level),
            SdkValue::Ref(key) => defaults.sdk_default(key),
        }
    }
}

impl From<u32> for SdkValue {
    fn from(level: u32) -> Self {
        SdkValue::Level(level)
    }
}

/// A string setting that is either literal or a named reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringValue {
    Literal(String),
    /// A dotted key resolved through [`SdkDefaults::property`].
    Ref(String),
}

impl StringValue {
    pub fn resolve(&self, defaults: &dyn SdkDefaults) -> Result<String> {
        match self {
            StringValue::Literal(value) => Ok(value.clone()),
            StringValue::Ref(key) => defaults.property(key),
        }
    }
}

/// Resolved SDK levels for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkLevels {
    pub compile: u32,
    pub min: u32,
    pub target: u32,
}

impl SdkLevels {
    /// Whether `min <= target <= compile` holds.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.target && self.target <= self.compile
    }
}

/// Provider of toolchain-owned defaults (e.g. `flutter.compileSdkVersion`).
///
/// Implementations must be deterministic for the duration of a resolution
/// call; variants may be resolved concurrently against the same provider.
pub trait SdkDefaults: Send + Sync {
    /// Look up an integer default. Fails if the key is unknown.
    fn sdk_default(&self, key: &str) -> Result<u32>;

    /// Look up a string default. Fails if the key is unknown.
    fn property(&self, key: &str) -> Result<String> {
        Err(Error::NotFound(key.to_string()))
    }
}

/// A provider with no defaults; every reference fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaults;

impl SdkDefaults for NoDefaults {
    fn sdk_default(&self, key: &str) -> Result<u32> {
        Err(Error::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl SdkDefaults for Fixed {
        fn sdk_default(&self, key: &str) -> Result<u32> {
            match key {
                "flutter.minSdkVersion" => Ok(21),
                _ => Err(Error::NotFound(key.to_string())),
            }
        }
    }

    #[test]
    fn test_literal_level_ignores_defaults() {
        assert_eq!(SdkValue::Level(34).resolve(&NoDefaults), Ok(34));
    }

    #[test]
    fn test_ref_resolves_through_provider() {
        let value = SdkValue::Ref("flutter.minSdkVersion".to_string());
        assert_eq!(value.resolve(&Fixed), Ok(21));
    }

    #[test]
    fn test_unknown_ref_fails() {
        let value = SdkValue::Ref("flutter.targetSdkVersion".to_string());
        assert!(matches!(value.resolve(&Fixed), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_string_ref_defaults_to_not_found() {
        let value = StringValue::Ref("flutter.versionName".to_string());
        assert!(matches!(value.resolve(&Fixed), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_sdk_ordering() {
        let ok = SdkLevels {
            compile: 34,
            min: 21,
            target: 34,
        };
        assert!(ok.is_ordered());

        let bad = SdkLevels {
            compile: 34,
            min: 30,
            target: 29,
        };
        assert!(!bad.is_ordered());
    }
}
