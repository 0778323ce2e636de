//! Dependency coordinates, scopes and classpaths.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A Maven-style `group:artifact[:version]` coordinate.
///
/// The version may be omitted for platform/BOM-managed entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group, self.artifact, version),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || Error::InvalidInput(format!("malformed coordinate: {}", s));

        let parts: Vec<&str> = s.split(':').collect();
        if parts
            .iter()
            .any(|p| p.is_empty() || p.chars().any(char::is_whitespace))
        {
            return Err(invalid());
        }

        match parts.as_slice() {
            [group, artifact] => Ok(Self {
                group: group.to_string(),
                artifact: artifact.to_string(),
                version: None,
            }),
            [group, artifact, version] => Ok(Self {
                group: group.to_string(),
                artifact: artifact.to_string(),
                version: Some(version.to_string()),
            }),
            _ => Err(invalid()),
        }
    }
}

/// A classpath a dependency can contribute to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Classpath {
    #[display("compile")]
    Compile,
    #[display("runtime")]
    Runtime,
    #[display("desugar")]
    Desugar,
    #[display("unit-test")]
    UnitTest,
    #[display("android-test")]
    AndroidTest,
}

/// The closed set of dependency configuration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ScopeKind {
    #[display("implementation")]
    Implementation,
    #[display("api")]
    Api,
    #[display("compileOnly")]
    CompileOnly,
    #[display("runtimeOnly")]
    RuntimeOnly,
    #[display("coreLibraryDesugaring")]
    CoreLibraryDesugaring,
    #[display("testImplementation")]
    TestImplementation,
    #[display("androidTestImplementation")]
    AndroidTestImplementation,
}

impl ScopeKind {
    pub const ALL: [ScopeKind; 7] = [
        ScopeKind::Implementation,
        ScopeKind::Api,
        ScopeKind::CompileOnly,
        ScopeKind::RuntimeOnly,
        ScopeKind::CoreLibraryDesugaring,
        ScopeKind::TestImplementation,
        ScopeKind::AndroidTestImplementation,
    ];

    /// Classpaths an entry of this kind is added to.
    pub fn classpaths(self) -> &'static [Classpath] {
        match self {
            ScopeKind::Implementation | ScopeKind::Api => &[Classpath::Compile, Classpath::Runtime],
            ScopeKind::CompileOnly => &[Classpath::Compile],
            ScopeKind::RuntimeOnly => &[Classpath::Runtime],
            ScopeKind::CoreLibraryDesugaring => &[Classpath::Desugar],
            ScopeKind::TestImplementation => &[Classpath::UnitTest],
            ScopeKind::AndroidTestImplementation => &[Classpath::AndroidTest],
        }
    }

    /// Whether a build-type prefix (`debugImplementation`) may be applied.
    pub fn allows_variant_prefix(self) -> bool {
        matches!(
            self,
            ScopeKind::Implementation
                | ScopeKind::Api
                | ScopeKind::CompileOnly
                | ScopeKind::RuntimeOnly
        )
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.to_string() == tag)
    }
}

/// A recognised scope, optionally restricted to one build type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyScope {
    pub kind: ScopeKind,
    /// Build type the scope is restricted to (`release` for `releaseImplementation`).
    pub variant: Option<String>,
}

impl DependencyScope {
    /// Parse a scope tag against the declared build-type names.
    ///
    /// Returns `None` when the tag is not in the closed set.
    pub fn parse<'a>(tag: &str, build_types: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        if let Some(kind) = ScopeKind::from_tag(tag) {
            return Some(Self {
                kind,
                variant: None,
            });
        }

        build_types.into_iter().find_map(|name| {
            let rest = tag.strip_prefix(name)?;
            let mut chars = rest.chars();
            let first = chars.next().filter(|c| c.is_ascii_uppercase())?;
            let unprefixed = format!("{}{}", first.to_ascii_lowercase(), chars.as_str());

            ScopeKind::from_tag(&unprefixed)
                .filter(|kind| kind.allows_variant_prefix())
                .map(|kind| Self {
                    kind,
                    variant: Some(name.to_string()),
                })
        })
    }

    /// Whether this scope contributes to the given variant.
    pub fn applies_to(&self, variant: &str) -> bool {
        self.variant.as_deref().is_none_or(|v| v == variant)
    }
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            None => write!(f, "{}", self.kind),
            Some(variant) => {
                let kind = self.kind.to_string();
                let mut chars = kind.chars();
                match chars.next() {
                    Some(first) => {
                        write!(f, "{}{}{}", variant, first.to_ascii_uppercase(), chars.as_str())
                    }
                    None => write!(f, "{}", variant),
                }
            }
        }
    }
}

/// A declared dependency.
///
/// The scope is kept as written so unknown tags are reported by the resolver
/// for each variant rather than rejected while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub coordinate: Coordinate,
    pub scope: String,
}

impl Dependency {
    pub fn new(coordinate: Coordinate, scope: impl Into<String>) -> Self {
        Self {
            coordinate,
            scope: scope.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        let coord: Coordinate = "androidx.work:work-runtime:2.9.0".parse().unwrap();
        assert_eq!(coord.group, "androidx.work");
        assert_eq!(coord.artifact, "work-runtime");
        assert_eq!(coord.version.as_deref(), Some("2.9.0"));
        assert_eq!(coord.to_string(), "androidx.work:work-runtime:2.9.0");
    }

    #[test]
    fn test_parse_versionless_coordinate() {
        let coord: Coordinate = "androidx.core:core-ktx".parse().unwrap();
        assert_eq!(coord.version, None);
        assert_eq!(coord.to_string(), "androidx.core:core-ktx");
    }

    #[test]
    fn test_reject_malformed_coordinates() {
        for bad in ["", "junit", "a::1", "a:b:c:d", "a b:c:1"] {
            assert!(bad.parse::<Coordinate>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_plain_scopes() {
        let scope = DependencyScope::parse("implementation", ["release"]).unwrap();
        assert_eq!(scope.kind, ScopeKind::Implementation);
        assert_eq!(scope.variant, None);

        let scope = DependencyScope::parse("coreLibraryDesugaring", ["release"]).unwrap();
        assert_eq!(scope.kind, ScopeKind::CoreLibraryDesugaring);
    }

    #[test]
    fn test_parse_variant_prefixed_scope() {
        let scope = DependencyScope::parse("debugImplementation", ["release", "debug"]).unwrap();
        assert_eq!(scope.kind, ScopeKind::Implementation);
        assert_eq!(scope.variant.as_deref(), Some("debug"));
        assert!(scope.applies_to("debug"));
        assert!(!scope.applies_to("release"));
        assert_eq!(scope.to_string(), "debugImplementation");
    }

    #[test]
    fn test_reject_unknown_scopes() {
        assert!(DependencyScope::parse("bogusScope", ["release"]).is_none());
        // Prefix must name a declared build type.
        assert!(DependencyScope::parse("debugImplementation", ["release"]).is_none());
        // Desugaring cannot be restricted to a variant.
        assert!(DependencyScope::parse("releaseCoreLibraryDesugaring", ["release"]).is_none());
        assert!(DependencyScope::parse("releaseimplementation", ["release"]).is_none());
    }

    #[test]
    fn test_scope_classpaths() {
        assert_eq!(
            ScopeKind::Implementation.classpaths(),
            &[Classpath::Compile, Classpath::Runtime]
        );
        assert_eq!(ScopeKind::CompileOnly.classpaths(), &[Classpath::Compile]);
        assert_eq!(
            ScopeKind::CoreLibraryDesugaring.classpaths(),
            &[Classpath::Desugar]
        );
    }
}
