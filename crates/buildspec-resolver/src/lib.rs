//! Build configuration resolution.
//!
//! Turns a [`Descriptor`](buildspec_core::Descriptor) into one
//! [`VariantConfig`](buildspec_core::VariantConfig) per declared build type.
//! Variants are resolved independently: a failure in one never aborts the
//! others, and every outcome is reported.

pub mod error;
pub mod merge;
pub mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use merge::{ResolvedSettings, merge_layers};
pub use resolver::{Resolution, Resolver, VariantOutcome};
