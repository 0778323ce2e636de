//! Global compile options.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// Java language level, ordered from oldest to newest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
pub enum JavaVersion {
    #[display("VERSION_1_8")]
    Version1_8,
    #[display("VERSION_11")]
    Version11,
    #[display("VERSION_17")]
    Version17,
    #[display("VERSION_21")]
    Version21,
}

impl FromStr for JavaVersion {
    type Err = Error;

    /// Accepts `VERSION_11`, `JavaVersion.VERSION_11`, `11`, `1.8` and `8`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_prefix("JavaVersion.").unwrap_or(raw);
        let raw = raw.strip_prefix("VERSION_").unwrap_or(raw);

        match raw.replace('_', ".").as_str() {
            "1.8" | "8" => Ok(JavaVersion::Version1_8),
            "11" => Ok(JavaVersion::Version11),
            "17" => Ok(JavaVersion::Version17),
            "21" => Ok(JavaVersion::Version21),
            _ => Err(Error::InvalidInput(format!("unknown Java version: {}", s))),
        }
    }
}

/// Compile options shared by every variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    pub source_compatibility: JavaVersion,
    pub target_compatibility: JavaVersion,
    /// Kotlin `jvmTarget`, when the descriptor sets one.
    pub jvm_target: Option<JavaVersion>,
    pub core_library_desugaring_enabled: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_compatibility: JavaVersion::Version1_8,
            target_compatibility: JavaVersion::Version1_8,
            jvm_target: None,
            core_library_desugaring_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_java_version_spellings() {
        assert_eq!("VERSION_11".parse(), Ok(JavaVersion::Version11));
        assert_eq!("JavaVersion.VERSION_17".parse(), Ok(JavaVersion::Version17));
        assert_eq!("11".parse(), Ok(JavaVersion::Version11));
        assert_eq!("1.8".parse(), Ok(JavaVersion::Version1_8));
        assert_eq!("VERSION_1_8".parse(), Ok(JavaVersion::Version1_8));
        assert!("VERSION_9".parse::<JavaVersion>().is_err());
    }

    #[test]
    fn test_java_version_ordering_and_display() {
        assert!(JavaVersion::Version1_8 < JavaVersion::Version11);
        assert!(JavaVersion::Version21 > JavaVersion::Version17);
        assert_eq!(JavaVersion::Version11.to_string(), "VERSION_11");
    }
}
