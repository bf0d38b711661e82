//! The predicate objects the core consumes instead of a configuration
//! record directly (§1 PURPOSE & SCOPE: "the configuration loader (consumed
//! as predicate objects: `is_source_type`, `is_sink_fn`, `is_sanitizer`,
//! `is_excluded`, `is_source_field`, `field_tag_matches`)").
//!
//! [`AnalysisConfig`] implements [`SourcePredicates`] and [`SinkPredicates`]
//! directly; the split exists so `features/source_identification` and
//! `features/taint_analysis` depend on the narrow trait rather than the
//! whole config type.

use super::FieldTag;

/// Consulted by source identification (`features/source_identification`)
/// and by C5's source-reference-set computation (`is_source_field`).
pub trait SourcePredicates {
    fn is_source_type(&self, package: &str, ty_name: &str) -> bool;
    fn is_source_field(&self, package: &str, ty_name: &str, field_name: &str) -> bool;
    /// The built-in `{key = "levee", value = "source"}` tag is always
    /// consulted in addition to whatever this returns (§6).
    fn field_tag_matches(&self, tag: &FieldTag) -> bool;
}

/// Consulted by the driver (C7) and the taint propagator (C6).
pub trait SinkPredicates {
    fn is_sink_fn(&self, package: &str, receiver: &str, method: &str) -> bool;
    fn is_sanitizer(&self, package: &str, receiver: &str, method: &str) -> bool;
    fn is_excluded(&self, package: &str, receiver: &str, method: &str) -> bool;
}
