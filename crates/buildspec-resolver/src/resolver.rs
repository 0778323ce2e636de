//! Descriptor resolver - produces one configuration per build type.

use buildspec_core::{
    BuildType, Classpaths, Dependency, DependencyScope, Descriptor, ResolvedDependency,
    ScopeKind, SdkDefaults, SdkLevels, SdkValue, SigningConfigRegistry, StringValue,
    VariantConfig,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::merge::merge_layers;
use crate::{ResolveError, ResolveResult};

/// Result of resolving a single variant.
pub type VariantOutcome = ResolveResult<VariantConfig>;

/// Outcome of a resolution call, one entry per declared build type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub variants: BTreeMap<String, VariantOutcome>,
}

impl Resolution {
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Whether every variant resolved.
    pub fn is_success(&self) -> bool {
        self.variants.values().all(|outcome| outcome.is_ok())
    }

    pub fn get(&self, variant: &str) -> Option<&VariantOutcome> {
        self.variants.get(variant)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &VariantConfig)> {
        self.variants
            .iter()
            .filter_map(|(name, outcome)| outcome.as_ref().ok().map(|c| (name.as_str(), c)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ResolveError)> {
        self.variants
            .iter()
            .filter_map(|(name, outcome)| outcome.as_ref().err().map(|e| (name.as_str(), e)))
    }

    /// Flattened dependency graph: coordinate -> variants that include it.
    pub fn dependency_graph(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (name, config) in self.succeeded() {
            for dep in &config.dependencies {
                graph
                    .entry(dep.coordinate.to_string())
                    .or_default()
                    .insert(name.to_string());
            }
        }
        graph
    }
}

/// Resolves descriptors against injected collaborators.
pub struct Resolver {
    defaults: Arc<dyn SdkDefaults>,
    signing: Arc<dyn SigningConfigRegistry>,
}

impl Resolver {
    pub fn new(defaults: Arc<dyn SdkDefaults>, signing: Arc<dyn SigningConfigRegistry>) -> Self {
        Self { defaults, signing }
    }

    /// Resolve every build type of a descriptor.
    ///
    /// Fails as a whole only when the descriptor declares no build types or
    /// repeats a build type name; otherwise each variant's outcome is
    /// reported independently.
    pub fn resolve(&self, descriptor: &Descriptor) -> ResolveResult<Resolution> {
        if descriptor.build_types.is_empty() {
            return Err(ResolveError::NoBuildTypes);
        }
        let mut seen = BTreeSet::new();
        if let Some(name) = descriptor.build_type_names().find(|name| !seen.insert(*name)) {
            return Err(ResolveError::DuplicateBuildType(name.to_string()));
        }

        let variants = self.resolve_all(descriptor);

        for (name, outcome) in &variants {
            match outcome {
                Ok(_) => info!(variant = %name, "Variant resolved"),
                Err(e) => warn!(variant = %name, error = %e, "Variant failed to resolve"),
            }
        }

        Ok(Resolution { variants })
    }

    #[cfg(feature = "parallel")]
    fn resolve_all(&self, descriptor: &Descriptor) -> BTreeMap<String, VariantOutcome> {
        use rayon::prelude::*;

        descriptor
            .build_types
            .par_iter()
            .map(|bt| (bt.name.clone(), self.resolve_variant(descriptor, bt)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn resolve_all(&self, descriptor: &Descriptor) -> BTreeMap<String, VariantOutcome> {
        descriptor
            .build_types
            .iter()
            .map(|bt| (bt.name.clone(), self.resolve_variant(descriptor, bt)))
            .collect()
    }

    /// Resolve a single build type.
    ///
    /// Checks run in order: SDK range, layer merge, signing config,
    /// dependency scopes, desugaring capability.
    pub fn resolve_variant(
        &self,
        descriptor: &Descriptor,
        build_type: &BuildType,
    ) -> VariantOutcome {
        let variant = build_type.name.as_str();
        debug!(variant, "Resolving variant");

        let sdk = self.resolve_sdk(descriptor)?;

        let settings = merge_layers(variant, &descriptor.default_config, &build_type.layer)?;

        let signing_config = match settings.signing_config {
            Some(name) if self.signing.lookup(&name).is_some() => name,
            name => return Err(ResolveError::UnresolvedSigningConfig { name }),
        };

        let scoped = parse_scopes(descriptor)?;

        let desugaring = descriptor.compile_options.core_library_desugaring_enabled;
        check_desugaring(desugaring, &scoped)?;

        let mut dependencies = Vec::new();
        let mut classpaths = Classpaths::default();
        for (dep, scope) in scoped {
            if !scope.applies_to(variant) {
                continue;
            }
            for classpath in scope.kind.classpaths() {
                classpaths.add(*classpath, &dep.coordinate);
            }
            dependencies.push(ResolvedDependency {
                coordinate: dep.coordinate.clone(),
                scope,
            });
        }

        let version_code = descriptor
            .version_code
            .as_ref()
            .map(|v| self.resolve_level("versionCode", v))
            .transpose()?;
        let version_name = descriptor
            .version_name
            .as_ref()
            .map(|v| self.resolve_string("versionName", v))
            .transpose()?
            .map(|name| name + settings.version_name_suffix.as_deref().unwrap_or(""));

        let application_id = format!(
            "{}{}",
            descriptor.application_id,
            settings.application_id_suffix.as_deref().unwrap_or("")
        );

        debug!(
            variant,
            dependencies = dependencies.len(),
            minify = settings.minify_enabled,
            "Merged variant configuration"
        );

        Ok(VariantConfig {
            name: variant.to_string(),
            application_id,
            namespace: descriptor.namespace.clone(),
            plugins: descriptor.plugins.clone(),
            ndk_version: descriptor.ndk_version.clone(),
            sdk,
            version_code,
            version_name,
            compile_options: descriptor.compile_options.clone(),
            signing_config,
            minify_enabled: settings.minify_enabled,
            shrink_resources: settings.shrink_resources,
            debuggable: settings.debuggable,
            proguard_files: settings.proguard_files,
            dependencies,
            classpaths,
        })
    }

    fn resolve_sdk(&self, descriptor: &Descriptor) -> ResolveResult<SdkLevels> {
        let sdk = SdkLevels {
            compile: self.resolve_level("compileSdk", &descriptor.compile_sdk)?,
            min: self.resolve_level("minSdk", &descriptor.min_sdk)?,
            target: self.resolve_level("targetSdk", &descriptor.target_sdk)?,
        };

        if !sdk.is_ordered() {
            return Err(ResolveError::InvalidSdkRange {
                min: sdk.min,
                target: sdk.target,
                compile: sdk.compile,
            });
        }
        Ok(sdk)
    }

    fn resolve_level(&self, field: &str, value: &SdkValue) -> ResolveResult<u32> {
        value.resolve(self.defaults.as_ref()).map_err(|_| {
            let key = match value {
                SdkValue::Ref(key) => key.clone(),
                SdkValue::Level(level) => level.to_string(),
            };
            ResolveError::MissingSdkDefault {
                field: field.to_string(),
                key,
            }
        })
    }

    fn resolve_string(&self, field: &str, value: &StringValue) -> ResolveResult<String> {
        value.resolve(self.defaults.as_ref()).map_err(|_| {
            let key = match value {
                StringValue::Ref(key) | StringValue::Literal(key) => key.clone(),
            };
            ResolveError::MissingSdkDefault {
                field: field.to_string(),
                key,
            }
        })
    }
}

/// Recognise every dependency scope against the declared build types.
fn parse_scopes(descriptor: &Descriptor) -> ResolveResult<Vec<(&Dependency, DependencyScope)>> {
    descriptor
        .dependencies
        .iter()
        .map(|dep| {
            DependencyScope::parse(&dep.scope, descriptor.build_type_names())
                .map(|scope| (dep, scope))
                .ok_or_else(|| ResolveError::UnknownDependencyScope {
                    scope: dep.scope.clone(),
                    coordinate: dep.coordinate.to_string(),
                })
        })
        .collect()
}

/// A desugaring library needs the desugaring flag.
fn check_desugaring(enabled: bool, scoped: &[(&Dependency, DependencyScope)]) -> ResolveResult<()> {
    if enabled {
        return Ok(());
    }
    match scoped
        .iter()
        .find(|(_, scope)| scope.kind == ScopeKind::CoreLibraryDesugaring)
    {
        Some((dep, _)) => Err(ResolveError::MissingCapability(format!(
            "{} requires coreLibraryDesugaringEnabled",
            dep.coordinate
        ))),
        None => Ok(()),
    }
}
