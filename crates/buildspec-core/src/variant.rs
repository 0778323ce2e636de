//! Resolved per-variant configuration.

use serde::{Deserialize, Serialize};

use crate::{Classpath, CompileOptions, Coordinate, DependencyScope, ProguardFile, SdkLevels};

/// A dependency that survived filtering for a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub coordinate: Coordinate,
    pub scope: DependencyScope,
}

/// Coordinates grouped by the classpath they are added to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classpaths {
    pub compile: Vec<Coordinate>,
    pub runtime: Vec<Coordinate>,
    pub desugar: Vec<Coordinate>,
    pub unit_test: Vec<Coordinate>,
    pub android_test: Vec<Coordinate>,
}

impl Classpaths {
    pub fn get(&self, classpath: Classpath) -> &[Coordinate] {
        match classpath {
            Classpath::Compile => &self.compile,
            Classpath::Runtime => &self.runtime,
            Classpath::Desugar => &self.desugar,
            Classpath::UnitTest => &self.unit_test,
            Classpath::AndroidTest => &self.android_test,
        }
    }

    /// Add a coordinate, ignoring repeats.
    pub fn add(&mut self, classpath: Classpath, coordinate: &Coordinate) {
        let entries = match classpath {
            Classpath::Compile => &mut self.compile,
            Classpath::Runtime => &mut self.runtime,
            Classpath::Desugar => &mut self.desugar,
            Classpath::UnitTest => &mut self.unit_test,
            Classpath::AndroidTest => &mut self.android_test,
        };
        if !entries.contains(coordinate) {
            entries.push(coordinate.clone());
        }
    }
}

/// The fully resolved configuration for one build type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,
    /// Application id including any build-type suffix.
    pub application_id: String,
    pub namespace: String,
    pub plugins: Vec<String>,
    pub ndk_version: Option<String>,
    pub sdk: SdkLevels,
    pub version_code: Option<u32>,
    /// Version name including any build-type suffix.
    pub version_name: Option<String>,
    pub compile_options: CompileOptions,
    pub signing_config: String,
    pub minify_enabled: bool,
    pub shrink_resources: bool,
    pub debuggable: bool,
    pub proguard_files: Vec<ProguardFile>,
    pub dependencies: Vec<ResolvedDependency>,
    pub classpaths: Classpaths,
}

impl VariantConfig {
    pub fn has_dependency(&self, coordinate: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.coordinate.to_string() == coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classpaths_ignore_repeats() {
        let coord: Coordinate = "androidx.work:work-runtime:2.9.0".parse().unwrap();
        let mut classpaths = Classpaths::default();
        classpaths.add(Classpath::Compile, &coord);
        classpaths.add(Classpath::Compile, &coord);
        classpaths.add(Classpath::Runtime, &coord);

        assert_eq!(classpaths.get(Classpath::Compile), &[coord.clone()]);
        assert_eq!(classpaths.get(Classpath::Runtime), &[coord]);
        assert!(classpaths.get(Classpath::Desugar).is_empty());
    }
}
