//! Matcher rules (§6: "`{ package_regex, type_regex, field_regex }`" for
//! sources, "`{ package_regex, receiver_regex, method_regex }`" for sinks,
//! sanitizers, and excludes).
//!
//! The raw, deserializable shape ([`RawMatcherRule`]) is compiled once at
//! load time into [`MatcherRule`], whose fields are `regex::Regex` —
//! exactly the teacher's `config/io.rs` split between a serde target and a
//! validated runtime type, scoped down to this crate's single matcher
//! shape (sources additionally carry a `field_regex`; everything else
//! shares `package/receiver/method`).

use regex::Regex;
use serde::Deserialize;

use super::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMatcherRule {
    #[serde(default)]
    pub package_regex: Option<String>,
    #[serde(default)]
    pub type_regex: Option<String>,
    #[serde(default)]
    pub field_regex: Option<String>,
    #[serde(default)]
    pub receiver_regex: Option<String>,
    #[serde(default)]
    pub method_regex: Option<String>,
}

/// A compiled matcher. Any field left unset in the raw rule matches
/// everything (an always-true regex), matching the teacher's convention of
/// treating an absent constraint as "no restriction" rather than "match
/// nothing".
#[derive(Debug, Clone)]
pub struct MatcherRule {
    pub package: Regex,
    pub ty: Option<Regex>,
    pub field: Option<Regex>,
    pub receiver: Option<Regex>,
    pub method: Option<Regex>,
}

fn compile(field: &str, pattern: &Option<String>) -> ConfigResult<Option<Regex>> {
    match pattern {
        None => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| ConfigError::malformed_regex(field, e)),
    }
}

fn compile_always(field: &str, pattern: &Option<String>) -> ConfigResult<Regex> {
    match pattern {
        None => Ok(Regex::new(".*").expect("`.*` is always a valid regex")),
        Some(p) => Regex::new(p).map_err(|e| ConfigError::malformed_regex(field, e)),
    }
}

impl RawMatcherRule {
    pub fn compile(&self) -> ConfigResult<MatcherRule> {
        Ok(MatcherRule {
            package: compile_always("package_regex", &self.package_regex)?,
            ty: compile("type_regex", &self.type_regex)?,
            field: compile("field_regex", &self.field_regex)?,
            receiver: compile("receiver_regex", &self.receiver_regex)?,
            method: compile("method_regex", &self.method_regex)?,
        })
    }
}

impl MatcherRule {
    /// Matches a source-type candidate (`package_regex` + `type_regex`).
    pub fn matches_type(&self, package: &str, ty_name: &str) -> bool {
        self.package.is_match(package) && self.ty.as_ref().map_or(true, |r| r.is_match(ty_name))
    }

    /// Matches a source-field candidate (`package_regex` + `type_regex` +
    /// `field_regex`).
    pub fn matches_field(&self, package: &str, ty_name: &str, field_name: &str) -> bool {
        self.matches_type(package, ty_name)
            && self.field.as_ref().map_or(true, |r| r.is_match(field_name))
    }

    /// Matches a sink/sanitizer/exclude candidate
    /// (`package_regex` + `receiver_regex` + `method_regex`).
    pub fn matches_call(&self, package: &str, receiver: &str, method: &str) -> bool {
        self.package.is_match(package)
            && self.receiver.as_ref().map_or(true, |r| r.is_match(receiver))
            && self.method.as_ref().map_or(true, |r| r.is_match(method))
    }
}
