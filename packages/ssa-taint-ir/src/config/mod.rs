//! Configuration (§6 "EXTERNAL INTERFACES — Configuration (consumed)").
//!
//! Mirrors the teacher's `config/io.rs` split: a `RawConfig` deserialization
//! target is validated and compiled into [`AnalysisConfig`], which holds
//! already-compiled `regex::Regex` matchers so the hot analysis loop never
//! touches `regex::Regex::new` again after load.

pub mod error;
pub mod io;
pub mod matcher;
pub mod predicates;
pub mod validation;

use serde::Deserialize;

pub use error::{ConfigError, ConfigResult};
pub use matcher::{MatcherRule, RawMatcherRule};
pub use predicates::{SinkPredicates, SourcePredicates};
pub use validation::{Validatable, ValidatableCollection};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct FieldTag {
    pub key: String,
    pub value: String,
}

impl FieldTag {
    pub fn levee_source() -> Self {
        FieldTag { key: "levee".to_string(), value: "source".to_string() }
    }
}

/// Raw, directly-deserializable configuration (§6's option table).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RawConfig {
    pub sources: Vec<RawMatcherRule>,
    pub sinks: Vec<RawMatcherRule>,
    pub sanitizers: Vec<RawMatcherRule>,
    pub exclude: Vec<RawMatcherRule>,
    pub field_tags: Vec<FieldTag>,
    pub ear_taint_call_span: u32,
    pub context_k: u32,
    pub allow_panic_on_tainted_values: bool,
    pub use_ear: bool,
    pub report_message: String,
}

/// The compiled, validated configuration the rest of the crate consumes.
pub struct AnalysisConfig {
    pub sources: Vec<MatcherRule>,
    pub sinks: Vec<MatcherRule>,
    pub sanitizers: Vec<MatcherRule>,
    pub exclude: Vec<MatcherRule>,
    pub field_tags: Vec<FieldTag>,
    pub ear_taint_call_span: u32,
    pub context_k: u32,
    pub allow_panic_on_tainted_values: bool,
    pub use_ear: bool,
    pub report_message: String,
}

impl RawConfig {
    pub fn compile(&self) -> ConfigResult<AnalysisConfig> {
        let compile_all = |rules: &[RawMatcherRule]| -> ConfigResult<Vec<MatcherRule>> {
            rules.iter().map(RawMatcherRule::compile).collect()
        };
        let config = AnalysisConfig {
            sources: compile_all(&self.sources)?,
            sinks: compile_all(&self.sinks)?,
            sanitizers: compile_all(&self.sanitizers)?,
            exclude: compile_all(&self.exclude)?,
            field_tags: self.field_tags.clone(),
            ear_taint_call_span: self.ear_taint_call_span,
            context_k: self.context_k,
            allow_panic_on_tainted_values: self.allow_panic_on_tainted_values,
            use_ear: self.use_ear,
            report_message: if self.report_message.is_empty() {
                "potential taint flow from source to sink".to_string()
            } else {
                self.report_message.clone()
            },
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validatable for AnalysisConfig {
    fn validate(&self) -> ConfigResult<()> {
        // Matcher compilation above already rejects malformed regexes; there
        // is no further cross-field constraint in the §6 schema today, but
        // validation stays a distinct step so a future option (e.g. a
        // literal/regex conflict) has somewhere to attach without
        // restructuring callers.
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "AnalysisConfig"
    }
}

impl SourcePredicates for AnalysisConfig {
    fn is_source_type(&self, package: &str, ty_name: &str) -> bool {
        self.sources.iter().any(|m| m.matches_type(package, ty_name))
    }

    fn is_source_field(&self, package: &str, ty_name: &str, field_name: &str) -> bool {
        self.sources.iter().any(|m| m.matches_field(package, ty_name, field_name))
    }

    fn field_tag_matches(&self, tag: &FieldTag) -> bool {
        *tag == FieldTag::levee_source() || self.field_tags.contains(tag)
    }
}

impl SinkPredicates for AnalysisConfig {
    fn is_sink_fn(&self, package: &str, receiver: &str, method: &str) -> bool {
        self.sinks.iter().any(|m| m.matches_call(package, receiver, method))
    }

    fn is_sanitizer(&self, package: &str, receiver: &str, method: &str) -> bool {
        self.sanitizers.iter().any(|m| m.matches_call(package, receiver, method))
    }

    fn is_excluded(&self, package: &str, receiver: &str, method: &str) -> bool {
        self.exclude.iter().any(|m| m.matches_call(package, receiver, method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_levee_tag_always_matches() {
        let raw = RawConfig::default();
        let cfg = raw.compile().unwrap();
        assert!(cfg.field_tag_matches(&FieldTag { key: "levee".into(), value: "source".into() }));
        assert!(!cfg.field_tag_matches(&FieldTag { key: "other".into(), value: "tag".into() }));
    }

    #[test]
    fn malformed_regex_is_rejected_at_load_time() {
        let mut raw = RawConfig::default();
        raw.sinks.push(RawMatcherRule {
            package_regex: Some("(".to_string()),
            type_regex: None,
            field_regex: None,
            receiver_regex: None,
            method_regex: None,
        });
        assert!(raw.compile().is_err());
    }
}
