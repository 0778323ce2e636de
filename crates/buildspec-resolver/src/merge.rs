//! Layered settings merge.
//!
//! Two layers take part: the `defaultConfig` base and the build type's own
//! settings. Within a layer each key may be assigned once; across layers the
//! build type wins.

use buildspec_core::{ConfigLayer, ProguardFile, Setting, SettingKey};
use std::collections::HashSet;

use crate::{ResolveError, ResolveResult};

/// Settings after merging the layers for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Signing-config reference; `None` when neither layer names one.
    pub signing_config: Option<String>,
    pub minify_enabled: bool,
    pub shrink_resources: bool,
    pub debuggable: bool,
    pub proguard_files: Vec<ProguardFile>,
    pub application_id_suffix: Option<String>,
    pub version_name_suffix: Option<String>,
}

/// Values assigned in a single layer.
#[derive(Debug, Default)]
struct LayerValues {
    signing_config: Option<String>,
    minify_enabled: Option<bool>,
    shrink_resources: Option<bool>,
    debuggable: Option<bool>,
    proguard_files: Option<Vec<ProguardFile>>,
    application_id_suffix: Option<String>,
    version_name_suffix: Option<String>,
}

impl LayerValues {
    fn collect(layer: &ConfigLayer, layer_name: &str) -> ResolveResult<Self> {
        let mut seen: HashSet<SettingKey> = HashSet::new();
        let mut values = Self::default();

        for setting in layer.iter() {
            if !seen.insert(setting.key()) {
                return Err(ResolveError::DuplicateConfiguration {
                    layer: layer_name.to_string(),
                    key: setting.key(),
                });
            }

            match setting {
                Setting::SigningConfig(name) => values.signing_config = Some(name.clone()),
                Setting::MinifyEnabled(v) => values.minify_enabled = Some(*v),
                Setting::ShrinkResources(v) => values.shrink_resources = Some(*v),
                Setting::Debuggable(v) => values.debuggable = Some(*v),
                Setting::ProguardFiles(files) => values.proguard_files = Some(files.clone()),
                Setting::ApplicationIdSuffix(s) => values.application_id_suffix = Some(s.clone()),
                Setting::VersionNameSuffix(s) => values.version_name_suffix = Some(s.clone()),
            }
        }

        Ok(values)
    }
}

/// Merge the `defaultConfig` layer with a build type's layer.
///
/// The `debug` build type is debuggable and signed with the `debug` config
/// unless its layers say otherwise, matching the Android toolchain.
pub fn merge_layers(
    build_type: &str,
    base: &ConfigLayer,
    overrides: &ConfigLayer,
) -> ResolveResult<ResolvedSettings> {
    let base = LayerValues::collect(base, "defaultConfig")?;
    let overrides = LayerValues::collect(overrides, &format!("buildTypes.{}", build_type))?;
    let is_debug = build_type == "debug";

    let settings = ResolvedSettings {
        signing_config: overrides
            .signing_config
            .or(base.signing_config)
            .or_else(|| is_debug.then(|| "debug".to_string())),
        minify_enabled: overrides
            .minify_enabled
            .or(base.minify_enabled)
            .unwrap_or(false),
        shrink_resources: overrides
            .shrink_resources
            .or(base.shrink_resources)
            .unwrap_or(false),
        debuggable: overrides.debuggable.or(base.debuggable).unwrap_or(is_debug),
        proguard_files: overrides
            .proguard_files
            .or(base.proguard_files)
            .unwrap_or_default(),
        application_id_suffix: overrides
            .application_id_suffix
            .or(base.application_id_suffix),
        version_name_suffix: overrides.version_name_suffix.or(base.version_name_suffix),
    };

    if settings.shrink_resources && !settings.minify_enabled {
        return Err(ResolveError::MissingCapability(format!(
            "shrinkResources requires minifyEnabled in build type '{}'",
            build_type
        )));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_base() {
        let base = ConfigLayer::new()
            .with(Setting::SigningConfig("upload".to_string()))
            .with(Setting::MinifyEnabled(true));
        let overrides = ConfigLayer::new().with(Setting::MinifyEnabled(false));

        let settings = merge_layers("release", &base, &overrides).unwrap();
        assert_eq!(settings.signing_config.as_deref(), Some("upload"));
        assert!(!settings.minify_enabled);
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = merge_layers("release", &ConfigLayer::new(), &ConfigLayer::new()).unwrap();
        assert_eq!(settings.signing_config, None);
        assert!(!settings.minify_enabled);
        assert!(!settings.shrink_resources);
        assert!(!settings.debuggable);
        assert!(settings.proguard_files.is_empty());
    }

    #[test]
    fn test_debug_build_type_defaults() {
        let settings = merge_layers("debug", &ConfigLayer::new(), &ConfigLayer::new()).unwrap();
        assert_eq!(settings.signing_config.as_deref(), Some("debug"));
        assert!(settings.debuggable);

        let overrides = ConfigLayer::new().with(Setting::Debuggable(false));
        let settings = merge_layers("debug", &ConfigLayer::new(), &overrides).unwrap();
        assert!(!settings.debuggable);
    }

    #[test]
    fn test_proguard_files_replace_base_list() {
        let base = ConfigLayer::new().with(Setting::ProguardFiles(vec![ProguardFile::Project(
            "base-rules.pro".to_string(),
        )]));
        let overrides = ConfigLayer::new().with(Setting::ProguardFiles(vec![
            ProguardFile::Default("proguard-android-optimize.txt".to_string()),
            ProguardFile::Project("proguard-rules.pro".to_string()),
        ]));

        let settings = merge_layers("release", &base, &overrides).unwrap();
        assert_eq!(settings.proguard_files.len(), 2);
        assert_eq!(
            settings.proguard_files[0],
            ProguardFile::Default("proguard-android-optimize.txt".to_string())
        );
    }

    #[test]
    fn test_duplicate_in_override_layer() {
        let overrides = ConfigLayer::new()
            .with(Setting::MinifyEnabled(true))
            .with(Setting::MinifyEnabled(false));

        let result = merge_layers("release", &ConfigLayer::new(), &overrides);
        assert_eq!(
            result,
            Err(ResolveError::DuplicateConfiguration {
                layer: "buildTypes.release".to_string(),
                key: SettingKey::MinifyEnabled,
            })
        );
    }

    #[test]
    fn test_duplicate_in_base_layer() {
        let base = ConfigLayer::new()
            .with(Setting::SigningConfig("debug".to_string()))
            .with(Setting::SigningConfig("upload".to_string()));

        let result = merge_layers("release", &base, &ConfigLayer::new());
        assert!(matches!(
            result,
            Err(ResolveError::DuplicateConfiguration { layer, .. }) if layer == "defaultConfig"
        ));
    }

    #[test]
    fn test_same_key_in_different_layers_is_not_duplicate() {
        let base = ConfigLayer::new().with(Setting::ShrinkResources(false));
        let overrides = ConfigLayer::new()
            .with(Setting::MinifyEnabled(true))
            .with(Setting::ShrinkResources(true));

        let settings = merge_layers("release", &base, &overrides).unwrap();
        assert!(settings.shrink_resources);
    }

    #[test]
    fn test_shrink_requires_minify() {
        let overrides = ConfigLayer::new().with(Setting::ShrinkResources(true));
        let result = merge_layers("release", &ConfigLayer::new(), &overrides);
        assert!(matches!(result, Err(ResolveError::MissingCapability(_))));
    }

    #[test]
    fn test_suffixes() {
        let overrides = ConfigLayer::new()
            .with(Setting::ApplicationIdSuffix(".debug".to_string()))
            .with(Setting::VersionNameSuffix("-dev".to_string()));

        let settings = merge_layers("debug", &ConfigLayer::new(), &overrides).unwrap();
        assert_eq!(settings.application_id_suffix.as_deref(), Some(".debug"));
        assert_eq!(settings.version_name_suffix.as_deref(), Some("-dev"));
    }
}
