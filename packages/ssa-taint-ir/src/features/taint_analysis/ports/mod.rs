//! What C6 needs from the outside world: sink/sanitizer/exclude predicates,
//! narrowed from [`crate::config::AnalysisConfig`] the same way
//! `points_to::ports` narrows the source-side predicate.

pub trait SinkCallPredicate {
    fn is_sink_fn(&self, package: &str, receiver: &str, method: &str) -> bool;
    fn is_sanitizer(&self, package: &str, receiver: &str, method: &str) -> bool;
    fn is_excluded(&self, package: &str, receiver: &str, method: &str) -> bool;
}

impl<T: crate::config::SinkPredicates> SinkCallPredicate for T {
    fn is_sink_fn(&self, package: &str, receiver: &str, method: &str) -> bool {
        crate::config::SinkPredicates::is_sink_fn(self, package, receiver, method)
    }

    fn is_sanitizer(&self, package: &str, receiver: &str, method: &str) -> bool {
        crate::config::SinkPredicates::is_sanitizer(self, package, receiver, method)
    }

    fn is_excluded(&self, package: &str, receiver: &str, method: &str) -> bool {
        crate::config::SinkPredicates::is_excluded(self, package, receiver, method)
    }
}
