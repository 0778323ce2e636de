//! Descriptor resolution command.

use anyhow::{Context, Result};
use buildspec_config::{DefaultsContext, DefaultsContextBuilder, load_descriptor};
use buildspec_core::{InMemorySigningConfigs, SigningConfig, VariantConfig};
use buildspec_resolver::{Resolution, Resolver};
use clap::Args;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Path to the descriptor
    #[arg(default_value = "build.kdl")]
    pub path: String,

    /// KDL defaults file (repeatable; later files win)
    #[arg(long = "defaults", env = "BUILDSPEC_DEFAULTS", value_delimiter = ',')]
    pub defaults: Vec<String>,

    /// Java properties file such as local.properties (repeatable)
    #[arg(long = "properties")]
    pub properties: Vec<String>,

    /// Inline default as KEY=VALUE (repeatable; applied last)
    #[arg(long = "define", short = 'D')]
    pub defines: Vec<String>,

    /// Additional known signing config besides `debug` (repeatable)
    #[arg(long = "signing-config")]
    pub signing_configs: Vec<String>,

    /// Only report this variant
    #[arg(long)]
    pub variant: Option<String>,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

/// Per-variant entry of the JSON report.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum VariantReport<'a> {
    Resolved { config: &'a VariantConfig },
    Failed { error: String },
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    success: bool,
    variants: BTreeMap<&'a str, VariantReport<'a>>,
    dependency_graph: BTreeMap<String, BTreeSet<String>>,
}

/// Resolve a descriptor and print the outcome. Returns whether every
/// reported variant resolved.
pub fn run(args: &ResolveArgs) -> Result<bool> {
    let descriptor = load_descriptor(&args.path)
        .with_context(|| format!("Failed to load descriptor: {}", args.path))?;

    let defaults = build_defaults(args)?;
    let registry = build_registry(args);
    info!(
        path = %args.path,
        build_types = descriptor.build_types.len(),
        signing_configs = ?registry.names().collect::<Vec<_>>(),
        "Resolving descriptor"
    );

    let resolver = Resolver::new(Arc::new(defaults), Arc::new(registry));
    let resolution = resolver
        .resolve(&descriptor)
        .with_context(|| format!("Failed to resolve descriptor: {}", args.path))?;

    let report = build_report(&resolution, args.variant.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.success)
}

/// Merge defaults sources in order: KDL files, properties files, defines.
fn build_defaults(args: &ResolveArgs) -> Result<DefaultsContext> {
    let mut ctx = DefaultsContext::new();

    for path in &args.defaults {
        ctx.load_kdl(path)
            .with_context(|| format!("Failed to load defaults file: {}", path))?;
    }
    for path in &args.properties {
        ctx.load_properties(path)
            .with_context(|| format!("Failed to load properties file: {}", path))?;
    }

    let defines = DefaultsContextBuilder::new()
        .with_defines(args.defines.iter().map(String::as_str))
        .context("Invalid --define")?
        .build();
    ctx.merge(defines);

    Ok(ctx)
}

/// The toolchain always provides a `debug` signing config.
fn build_registry(args: &ResolveArgs) -> InMemorySigningConfigs {
    args.signing_configs
        .iter()
        .fold(InMemorySigningConfigs::with_debug(), |registry, name| {
            registry.with(SigningConfig::new(name.as_str()))
        })
}

fn build_report<'a>(resolution: &'a Resolution, variant: Option<&str>) -> Result<Report<'a>> {
    if let Some(name) = variant {
        if resolution.get(name).is_none() {
            anyhow::bail!("No build type named '{}'", name);
        }
    }

    let variants: BTreeMap<&str, VariantReport<'a>> = resolution
        .variants
        .iter()
        .filter(|(name, _)| variant.is_none_or(|v| v == name.as_str()))
        .map(|(name, outcome)| {
            let entry = match outcome {
                Ok(config) => VariantReport::Resolved { config },
                Err(e) => VariantReport::Failed {
                    error: e.to_string(),
                },
            };
            (name.as_str(), entry)
        })
        .collect();

    let success = variants
        .values()
        .all(|v| matches!(v, VariantReport::Resolved { .. }));

    let dependency_graph = resolution
        .dependency_graph()
        .into_iter()
        .filter_map(|(coordinate, users)| {
            let users: BTreeSet<String> = users
                .into_iter()
                .filter(|u| variants.contains_key(u.as_str()))
                .collect();
            (!users.is_empty()).then_some((coordinate, users))
        })
        .collect();

    Ok(Report {
        success,
        variants,
        dependency_graph,
    })
}

fn print_report(report: &Report<'_>) {
    for (name, entry) in &report.variants {
        match entry {
            VariantReport::Resolved { config } => {
                println!("✓ {}", name);
                println!("  applicationId: {}", config.application_id);
                println!(
                    "  sdk: min {} / target {} / compile {}",
                    config.sdk.min, config.sdk.target, config.sdk.compile
                );
                println!(
                    "  signing: {}  minify: {}  shrink: {}  debuggable: {}",
                    config.signing_config,
                    config.minify_enabled,
                    config.shrink_resources,
                    config.debuggable
                );
                for dep in &config.dependencies {
                    println!("  [{}] {}", dep.scope, dep.coordinate);
                }
            }
            VariantReport::Failed { error } => {
                println!("✗ {}: {}", name, error);
            }
        }
    }

    if report.success {
        println!("\n✓ All variants resolved");
    } else {
        println!("\n✗ Some variants failed to resolve");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspec_config::parse_descriptor;
    use buildspec_core::SigningConfigRegistry;

    const DESCRIPTOR: &str = r#"
        plugins "com.android.application"
        android {
            namespace "com.example.app"
            compileSdk 34
            defaultConfig {
                minSdk 21
                targetSdk 34
            }
            buildTypes {
                release {
                    signingConfig "upload"
                }
                debug
            }
        }
        dependencies {
            implementation "androidx.work:work-runtime:2.9.0"
            debugImplementation "com.squareup.leakcanary:leakcanary-android:2.14"
        }
    "#;

    fn args() -> ResolveArgs {
        ResolveArgs {
            path: "build.kdl".to_string(),
            defaults: Vec::new(),
            properties: Vec::new(),
            defines: Vec::new(),
            signing_configs: Vec::new(),
            variant: None,
            json: false,
        }
    }

    fn resolve(registry: InMemorySigningConfigs) -> Resolution {
        let descriptor = parse_descriptor(DESCRIPTOR).unwrap();
        Resolver::new(Arc::new(DefaultsContext::new()), Arc::new(registry))
            .resolve(&descriptor)
            .unwrap()
    }

    #[test]
    fn test_registry_always_has_debug() {
        let mut args = args();
        args.signing_configs = vec!["upload".to_string()];

        let registry = build_registry(&args);
        assert!(registry.lookup("debug").is_some());
        assert!(registry.lookup("upload").is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["debug", "upload"]);
    }

    #[test]
    fn test_defines_apply_last() {
        let mut args = args();
        args.defines = vec!["flutter.minSdkVersion=23".to_string()];

        let ctx = build_defaults(&args).unwrap();
        assert_eq!(ctx.levels.get("flutter.minSdkVersion"), Some(&23));
    }

    #[test]
    fn test_report_marks_failures() {
        let resolution = resolve(InMemorySigningConfigs::with_debug());
        let report = build_report(&resolution, None).unwrap();

        assert!(!report.success);
        assert!(matches!(
            report.variants.get("release"),
            Some(VariantReport::Failed { .. })
        ));
        assert!(matches!(
            report.variants.get("debug"),
            Some(VariantReport::Resolved { .. })
        ));
    }

    #[test]
    fn test_report_variant_filter() {
        let resolution = resolve(InMemorySigningConfigs::with_debug());
        let report = build_report(&resolution, Some("debug")).unwrap();

        assert!(report.success);
        assert_eq!(report.variants.len(), 1);
        assert_eq!(report.dependency_graph.len(), 2);

        assert!(build_report(&resolution, Some("staging")).is_err());
    }

    #[test]
    fn test_report_serializes_status() {
        let registry = InMemorySigningConfigs::with_debug().with(SigningConfig::new("upload"));
        let resolution = resolve(registry);
        let report = build_report(&resolution, None).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["variants"]["release"]["status"], "resolved");
        assert_eq!(
            json["dependency_graph"]["androidx.work:work-runtime:2.9.0"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }
}
