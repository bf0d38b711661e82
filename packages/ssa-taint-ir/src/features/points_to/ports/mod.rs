//! What C5 needs from the outside world, expressed as a narrow port rather
//! than a dependency on the whole [`crate::config::AnalysisConfig`] type
//! (§4.C5 "Source reference set" consults the external predicate
//! `is_source_field`).

/// Blanket-implemented for anything implementing
/// [`crate::config::SourcePredicates`], so `AnalysisConfig` satisfies this
/// port with no extra glue.
pub trait SourceFieldPredicate {
    fn is_source_field(&self, package: &str, ty_name: &str, field_name: &str) -> bool;
}

impl<T: crate::config::SourcePredicates> SourceFieldPredicate for T {
    fn is_source_field(&self, package: &str, ty_name: &str, field_name: &str) -> bool {
        crate::config::SourcePredicates::is_source_field(self, package, ty_name, field_name)
    }
}
