//! Build descriptor parsing.
//!
//! A descriptor mirrors the Android Gradle module layout:
//!
//! ```kdl
//! plugins "com.android.application" "kotlin-android"
//! android {
//!     namespace "com.example.app"
//!     compileSdk "flutter.compileSdkVersion"
//!     compileOptions {
//!         sourceCompatibility "VERSION_11"
//!         targetCompatibility "VERSION_11"
//!         coreLibraryDesugaringEnabled #true
//!     }
//!     defaultConfig {
//!         applicationId "com.example.app"
//!         minSdk 21
//!         targetSdk 34
//!     }
//!     buildTypes {
//!         release {
//!             signingConfig "debug"
//!             minifyEnabled #false
//!         }
//!     }
//! }
//! dependencies {
//!     implementation "androidx.work:work-runtime:2.9.0"
//! }
//! ```
//!
//! Integer SDK values are literal levels; string values are references looked
//! up through the SDK defaults provider when the descriptor is resolved.

use buildspec_core::{
    BuildType, CompileOptions, ConfigLayer, Coordinate, Dependency, Descriptor, JavaVersion,
    ProguardFile, SdkValue, Setting, StringValue,
};
use kdl::{KdlDocument, KdlNode};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::nodes::{
    as_level, first_arg, get_all_string_args, get_first_string_arg, require_bool, require_string,
};
use crate::{ConfigError, ConfigResult};

// Dotted identifier such as `flutter.compileSdkVersion`
static REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*$").unwrap()
});

const KOTLIN_PLUGINS: &[&str] = &["kotlin-android", "org.jetbrains.kotlin.android"];

/// Read and parse a descriptor file.
pub fn load_descriptor(path: impl AsRef<Path>) -> ConfigResult<Descriptor> {
    let content = std::fs::read_to_string(path)?;
    parse_descriptor(&content)
}

/// Parse a build descriptor from KDL text.
pub fn parse_descriptor(kdl: &str) -> ConfigResult<Descriptor> {
    let doc: KdlDocument = kdl.parse()?;
    let mut fields = Fields::default();

    for node in doc.nodes() {
        match node.name().value() {
            "plugins" => parse_plugins(node, &mut fields.plugins)?,
            "android" => {
                if let Some(children) = node.children() {
                    parse_android(children, &mut fields)?;
                }
            }
            "dependencies" => {
                if let Some(children) = node.children() {
                    parse_dependencies(children, &mut fields.dependencies)?;
                }
            }
            other => debug!(node = other, "Ignoring top-level node"),
        }
    }

    fields.finish()
}

/// Descriptor fields collected while walking the document.
#[derive(Default)]
struct Fields {
    plugins: Vec<String>,
    namespace: Option<String>,
    application_id: Option<String>,
    ndk_version: Option<String>,
    compile_sdk: Option<SdkValue>,
    min_sdk: Option<SdkValue>,
    target_sdk: Option<SdkValue>,
    version_code: Option<SdkValue>,
    version_name: Option<StringValue>,
    source_compatibility: Option<JavaVersion>,
    target_compatibility: Option<JavaVersion>,
    jvm_target: Option<JavaVersion>,
    desugaring: Option<bool>,
    default_config: ConfigLayer,
    build_types: Vec<BuildType>,
    dependencies: Vec<Dependency>,
}

impl Fields {
    fn finish(self) -> ConfigResult<Descriptor> {
        let namespace = self
            .namespace
            .ok_or_else(|| ConfigError::MissingField("android.namespace".to_string()))?;
        // The toolchain falls back to the namespace when no application id is set.
        let application_id = self.application_id.unwrap_or_else(|| namespace.clone());

        let compile_sdk = self
            .compile_sdk
            .ok_or_else(|| ConfigError::MissingField("android.compileSdk".to_string()))?;
        let min_sdk = self
            .min_sdk
            .ok_or_else(|| ConfigError::MissingField("defaultConfig.minSdk".to_string()))?;
        let target_sdk = self
            .target_sdk
            .ok_or_else(|| ConfigError::MissingField("defaultConfig.targetSdk".to_string()))?;

        let defaults = CompileOptions::default();
        let compile_options = CompileOptions {
            source_compatibility: self
                .source_compatibility
                .unwrap_or(defaults.source_compatibility),
            target_compatibility: self
                .target_compatibility
                .unwrap_or(defaults.target_compatibility),
            jvm_target: self.jvm_target,
            core_library_desugaring_enabled: self.desugaring.unwrap_or(false),
        };

        if compile_options.source_compatibility > compile_options.target_compatibility {
            return Err(ConfigError::invalid(
                "compileOptions.sourceCompatibility",
                format!(
                    "{} is newer than targetCompatibility {}",
                    compile_options.source_compatibility, compile_options.target_compatibility
                ),
            ));
        }

        let descriptor = Descriptor {
            plugins: self.plugins,
            namespace,
            application_id,
            ndk_version: self.ndk_version,
            compile_sdk,
            min_sdk,
            target_sdk,
            version_code: self.version_code,
            version_name: self.version_name,
            compile_options,
            default_config: self.default_config,
            build_types: self.build_types,
            dependencies: self.dependencies,
        };

        if descriptor.compile_options.jvm_target.is_some()
            && !KOTLIN_PLUGINS.iter().any(|id| descriptor.has_plugin(id))
        {
            warn!("kotlinOptions.jvmTarget is set but no Kotlin plugin is applied");
        }

        Ok(descriptor)
    }
}

/// Store a value, rejecting a second assignment of the same field.
fn set_once<T>(slot: &mut Option<T>, value: T, field: &str) -> ConfigResult<()> {
    if slot.is_some() {
        return Err(ConfigError::Duplicate(field.to_string()));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_plugins(node: &KdlNode, plugins: &mut Vec<String>) -> ConfigResult<()> {
    let mut ids = get_all_string_args(node);

    // Block form: plugins { id "com.android.application" }
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "id" {
                ids.push(require_string(child)?);
            }
        }
    }

    for id in ids {
        if plugins.contains(&id) {
            return Err(ConfigError::Duplicate(format!("plugin '{}'", id)));
        }
        plugins.push(id);
    }
    Ok(())
}

fn parse_android(doc: &KdlDocument, fields: &mut Fields) -> ConfigResult<()> {
    for node in doc.nodes() {
        match node.name().value() {
            "namespace" => set_once(
                &mut fields.namespace,
                require_string(node)?,
                "android.namespace",
            )?,
            "ndkVersion" => set_once(
                &mut fields.ndk_version,
                require_string(node)?,
                "android.ndkVersion",
            )?,
            "compileSdk" => set_once(
                &mut fields.compile_sdk,
                parse_sdk_value(node)?,
                "android.compileSdk",
            )?,
            "compileOptions" => {
                if let Some(children) = node.children() {
                    parse_compile_options(children, fields)?;
                }
            }
            "kotlinOptions" => {
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        if child.name().value() == "jvmTarget" {
                            set_once(
                                &mut fields.jvm_target,
                                parse_java_version(child)?,
                                "kotlinOptions.jvmTarget",
                            )?;
                        }
                    }
                }
            }
            "defaultConfig" => {
                if let Some(children) = node.children() {
                    parse_default_config(children, fields)?;
                }
            }
            "buildTypes" => {
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        let build_type = parse_build_type(child)?;
                        if fields.build_types.iter().any(|b| b.name == build_type.name) {
                            return Err(ConfigError::Duplicate(format!(
                                "build type '{}'",
                                build_type.name
                            )));
                        }
                        fields.build_types.push(build_type);
                    }
                }
            }
            other => debug!(node = other, "Ignoring android node"),
        }
    }
    Ok(())
}

fn parse_compile_options(doc: &KdlDocument, fields: &mut Fields) -> ConfigResult<()> {
    for node in doc.nodes() {
        match node.name().value() {
            "sourceCompatibility" => set_once(
                &mut fields.source_compatibility,
                parse_java_version(node)?,
                "compileOptions.sourceCompatibility",
            )?,
            "targetCompatibility" => set_once(
                &mut fields.target_compatibility,
                parse_java_version(node)?,
                "compileOptions.targetCompatibility",
            )?,
            "coreLibraryDesugaringEnabled" | "isCoreLibraryDesugaringEnabled" => set_once(
                &mut fields.desugaring,
                require_bool(node)?,
                "compileOptions.coreLibraryDesugaringEnabled",
            )?,
            other => debug!(node = other, "Ignoring compileOptions node"),
        }
    }
    Ok(())
}

fn parse_default_config(doc: &KdlDocument, fields: &mut Fields) -> ConfigResult<()> {
    for node in doc.nodes() {
        match node.name().value() {
            "applicationId" => set_once(
                &mut fields.application_id,
                require_string(node)?,
                "defaultConfig.applicationId",
            )?,
            "minSdk" => set_once(
                &mut fields.min_sdk,
                parse_sdk_value(node)?,
                "defaultConfig.minSdk",
            )?,
            "targetSdk" => set_once(
                &mut fields.target_sdk,
                parse_sdk_value(node)?,
                "defaultConfig.targetSdk",
            )?,
            "versionCode" => set_once(
                &mut fields.version_code,
                parse_sdk_value(node)?,
                "defaultConfig.versionCode",
            )?,
            "versionName" => set_once(
                &mut fields.version_name,
                parse_string_value(node)?,
                "defaultConfig.versionName",
            )?,
            other => match parse_setting(node)? {
                Some(setting) => fields.default_config.push(setting),
                None => debug!(node = other, "Ignoring defaultConfig node"),
            },
        }
    }
    Ok(())
}

fn parse_build_type(node: &KdlNode) -> ConfigResult<BuildType> {
    let mut build_type = BuildType::new(node.name().value());

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match parse_setting(child)? {
                Some(setting) => build_type.layer.push(setting),
                None => debug!(
                    build_type = %build_type.name,
                    node = child.name().value(),
                    "Ignoring build type node"
                ),
            }
        }
    }

    Ok(build_type)
}

/// Parse an overridable setting. Returns `None` for nodes that are not settings.
///
/// Repeated settings are kept; duplicates are reported when layers are merged.
fn parse_setting(node: &KdlNode) -> ConfigResult<Option<Setting>> {
    let setting = match node.name().value() {
        "signingConfig" => Setting::SigningConfig(require_string(node)?),
        "minifyEnabled" | "isMinifyEnabled" => Setting::MinifyEnabled(require_bool(node)?),
        "shrinkResources" | "isShrinkResources" => Setting::ShrinkResources(require_bool(node)?),
        "debuggable" | "isDebuggable" => Setting::Debuggable(require_bool(node)?),
        "applicationIdSuffix" => Setting::ApplicationIdSuffix(require_string(node)?),
        "versionNameSuffix" => Setting::VersionNameSuffix(require_string(node)?),
        "proguardFiles" => Setting::ProguardFiles(parse_proguard_files(node)?),
        _ => return Ok(None),
    };
    Ok(Some(setting))
}

/// `proguardFiles default="proguard-android-optimize.txt" "proguard-rules.pro"`
fn parse_proguard_files(node: &KdlNode) -> ConfigResult<Vec<ProguardFile>> {
    let mut files = Vec::new();

    for entry in node.entries() {
        let file = entry.value().as_string().ok_or_else(|| {
            ConfigError::invalid("proguardFiles", format!("expected a file name, got {}", entry))
        })?;

        match entry.name().map(|n| n.value()) {
            None => files.push(ProguardFile::Project(file.to_string())),
            Some("default") => files.push(ProguardFile::Default(file.to_string())),
            Some(other) => {
                return Err(ConfigError::invalid(
                    "proguardFiles",
                    format!("unknown property '{}'", other),
                ));
            }
        }
    }

    Ok(files)
}

fn parse_dependencies(doc: &KdlDocument, dependencies: &mut Vec<Dependency>) -> ConfigResult<()> {
    for node in doc.nodes() {
        let scope = node.name().value();
        let raw = get_first_string_arg(node)
            .ok_or_else(|| ConfigError::MissingField(format!("coordinate for {}", scope)))?;
        let coordinate: Coordinate = raw
            .parse()
            .map_err(|e| ConfigError::invalid(format!("dependencies.{}", scope), format!("{}", e)))?;

        let dependency = Dependency::new(coordinate, scope);
        if dependencies.contains(&dependency) {
            return Err(ConfigError::Duplicate(format!(
                "dependency {} \"{}\"",
                scope, dependency.coordinate
            )));
        }
        dependencies.push(dependency);
    }
    Ok(())
}

fn parse_sdk_value(node: &KdlNode) -> ConfigResult<SdkValue> {
    let field = node.name().value();
    let value = first_arg(node)
        .ok_or_else(|| ConfigError::MissingField(format!("value for {}", field)))?;

    if let Some(level) = as_level(field, value)? {
        return Ok(SdkValue::Level(level));
    }

    match value.as_string() {
        Some(key) => Ok(SdkValue::Ref(parse_ref(field, key)?)),
        None => Err(ConfigError::invalid(
            field,
            format!("expected an integer or a reference, got {}", value),
        )),
    }
}

/// `versionName "1.0"` is literal; `versionName ref="flutter.versionName"` is a reference.
fn parse_string_value(node: &KdlNode) -> ConfigResult<StringValue> {
    let field = node.name().value();

    if let Some(key) = node.get("ref") {
        let key = key
            .as_string()
            .ok_or_else(|| ConfigError::invalid(field, "ref must be a string"))?;
        return Ok(StringValue::Ref(parse_ref(field, key)?));
    }

    require_string(node).map(StringValue::Literal)
}

fn parse_ref(field: &str, key: &str) -> ConfigResult<String> {
    if REF_REGEX.is_match(key) {
        Ok(key.to_string())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("'{}' is not a valid reference", key),
        ))
    }
}

fn parse_java_version(node: &KdlNode) -> ConfigResult<JavaVersion> {
    let field = node.name().value();
    let value = first_arg(node)
        .ok_or_else(|| ConfigError::MissingField(format!("value for {}", field)))?;

    let raw = match (value.as_string(), value.as_integer()) {
        (Some(s), _) => s.to_string(),
        (None, Some(n)) => n.to_string(),
        _ => {
            return Err(ConfigError::invalid(
                field,
                format!("expected a Java version, got {}", value),
            ));
        }
    };

    raw.parse()
        .map_err(|e| ConfigError::invalid(field, format!("{}", e)))
}
