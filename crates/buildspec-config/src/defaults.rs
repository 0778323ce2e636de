//! Toolchain defaults for descriptor references.
//!
//! Descriptors can refer to values owned by the surrounding toolchain, e.g.
//! `flutter.compileSdkVersion` or `flutter.versionCode`. Those values come
//! from two kinds of source:
//! - a KDL defaults file, where nested nodes form dotted keys:
//!   `flutter { compileSdkVersion 35; minSdkVersion 21 }`
//! - a Java properties file such as `local.properties`:
//!   `flutter.versionCode=3`
//!
//! Sources are merged in load order; later values replace earlier ones.

use buildspec_core::{Error, Result, SdkDefaults};
use kdl::{KdlDocument, KdlNode};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::nodes::{as_level, first_arg};
use crate::{ConfigError, ConfigResult};

/// In-memory defaults, keyed by dotted name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsContext {
    /// Integer defaults (SDK levels, version codes)
    pub levels: BTreeMap<String, u32>,
    /// String defaults (version names, paths)
    pub properties: BTreeMap<String, String>,
}

impl DefaultsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&mut self, key: impl Into<String>, level: u32) {
        self.levels.insert(key.into(), level);
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Set a value given as text: integers become levels as well as properties.
    pub fn set(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if let Ok(level) = value.parse::<u32>() {
            self.set_level(key, level);
        }
        self.set_property(key, value);
    }

    /// Merge another context over this one.
    pub fn merge(&mut self, other: DefaultsContext) {
        self.levels.extend(other.levels);
        self.properties.extend(other.properties);
    }

    /// Load a KDL defaults file and merge it over this context.
    pub fn load_kdl(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge(parse_defaults(&content)?);
        Ok(())
    }

    /// Load a properties file and merge it over this context.
    pub fn load_properties(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge(parse_properties(&content));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty() && self.properties.is_empty()
    }
}

impl SdkDefaults for DefaultsContext {
    fn sdk_default(&self, key: &str) -> Result<u32> {
        self.levels
            .get(key)
            .copied()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    fn property(&self, key: &str) -> Result<String> {
        self.properties
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }
}

/// Parse a KDL defaults document into dotted keys.
pub fn parse_defaults(kdl: &str) -> ConfigResult<DefaultsContext> {
    let doc: KdlDocument = kdl.parse()?;
    let mut ctx = DefaultsContext::new();
    collect_defaults(&doc, "", &mut ctx)?;
    Ok(ctx)
}

fn collect_defaults(
    doc: &KdlDocument,
    prefix: &str,
    ctx: &mut DefaultsContext,
) -> ConfigResult<()> {
    for node in doc.nodes() {
        let key = if prefix.is_empty() {
            node.name().value().to_string()
        } else {
            format!("{}.{}", prefix, node.name().value())
        };

        if let Some(children) = node.children() {
            collect_defaults(children, &key, ctx)?;
        }
        collect_value(node, &key, ctx)?;
    }
    Ok(())
}

fn collect_value(node: &KdlNode, key: &str, ctx: &mut DefaultsContext) -> ConfigResult<()> {
    let Some(value) = first_arg(node) else {
        return Ok(());
    };

    if let Some(level) = as_level(key, value)? {
        ctx.set_level(key, level);
        ctx.set_property(key, level.to_string());
    } else if let Some(s) = value.as_string() {
        ctx.set_property(key, s);
    } else if let Some(b) = value.as_bool() {
        ctx.set_property(key, b.to_string());
    } else {
        return Err(ConfigError::invalid(
            key,
            format!("unsupported default value {}", value),
        ));
    }
    Ok(())
}

/// Parse Java properties text (`key=value` or `key: value` lines).
///
/// Blank lines and lines starting with `#` or `!` are skipped.
pub fn parse_properties(text: &str) -> DefaultsContext {
    let mut ctx = DefaultsContext::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let Some(idx) = line.find(['=', ':']) else {
            debug!(line, "Skipping properties line without separator");
            continue;
        };
        let (key, value) = (line[..idx].trim(), line[idx + 1..].trim());
        if key.is_empty() {
            continue;
        }
        ctx.set(key, value);
    }

    ctx
}

/// Builder for creating DefaultsContext.
pub struct DefaultsContextBuilder {
    ctx: DefaultsContext,
}

impl DefaultsContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: DefaultsContext::new(),
        }
    }

    pub fn with_level(mut self, key: impl Into<String>, level: u32) -> Self {
        self.ctx.set_level(key, level);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.set_property(key, value);
        self
    }

    /// Populate from `KEY=VALUE` pairs, such as `--define` flags.
    pub fn with_defines<'a>(
        mut self,
        defines: impl IntoIterator<Item = &'a str>,
    ) -> ConfigResult<Self> {
        for define in defines {
            let (key, value) = define.split_once('=').ok_or_else(|| {
                ConfigError::invalid("define", format!("expected KEY=VALUE, got '{}'", define))
            })?;
            self.ctx.set(key.trim(), value);
        }
        Ok(self)
    }

    pub fn build(self) -> DefaultsContext {
        self.ctx
    }
}

impl Default for DefaultsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kdl_defaults() {
        let kdl = r#"
            flutter {
                compileSdkVersion 35
                minSdkVersion 21
                targetSdkVersion 35
                versionName "1.4.0"
            }
        "#;

        let ctx = parse_defaults(kdl).unwrap();
        assert_eq!(ctx.sdk_default("flutter.compileSdkVersion"), Ok(35));
        assert_eq!(ctx.sdk_default("flutter.minSdkVersion"), Ok(21));
        assert_eq!(ctx.property("flutter.versionName"), Ok("1.4.0".to_string()));
        assert!(matches!(
            ctx.sdk_default("flutter.versionName"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_negative_level_rejected() {
        let result = parse_defaults("flutter { minSdkVersion -1 }");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_local_properties() {
        let text = "\
# Generated by the toolchain
sdk.dir=/opt/android-sdk
flutter.sdk=/opt/flutter
flutter.versionCode=3
flutter.versionName = 1.0.2
! legacy comment
malformed line
";

        let ctx = parse_properties(text);
        assert_eq!(ctx.sdk_default("flutter.versionCode"), Ok(3));
        assert_eq!(ctx.property("flutter.versionName"), Ok("1.0.2".to_string()));
        assert_eq!(ctx.property("sdk.dir"), Ok("/opt/android-sdk".to_string()));
        assert!(ctx.sdk_default("sdk.dir").is_err());
        assert_eq!(ctx.properties.len(), 4);
    }

    #[test]
    fn test_later_sources_override() {
        let mut ctx = parse_defaults("flutter { minSdkVersion 21 }").unwrap();
        ctx.merge(parse_properties("flutter.minSdkVersion=23"));
        assert_eq!(ctx.sdk_default("flutter.minSdkVersion"), Ok(23));
    }

    #[test]
    fn test_builder_with_defines() {
        let ctx = DefaultsContextBuilder::new()
            .with_level("flutter.compileSdkVersion", 34)
            .with_defines(["flutter.minSdkVersion=24", "flutter.versionName=2.0"])
            .unwrap()
            .build();

        assert_eq!(ctx.sdk_default("flutter.compileSdkVersion"), Ok(34));
        assert_eq!(ctx.sdk_default("flutter.minSdkVersion"), Ok(24));
        assert_eq!(ctx.property("flutter.versionName"), Ok("2.0".to_string()));
    }

    #[test]
    fn test_builder_rejects_malformed_define() {
        let result = DefaultsContextBuilder::new().with_defines(["flutter.minSdkVersion"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_key() {
        let ctx = DefaultsContext::new();
        assert!(ctx.is_empty());
        assert_eq!(
            ctx.sdk_default("flutter.compileSdkVersion"),
            Err(Error::NotFound("flutter.compileSdkVersion".to_string()))
        );
    }
}
