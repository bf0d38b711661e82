//! Configuration error types.
//!
//! Kept separate from [`crate::errors::AnalysisError`] because every
//! variant here is a load-time, non-recoverable failure (§7: "reject at
//! load time; no analysis runs"), unlike the crate error's internal-bug and
//! I/O classes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed regex in '{field}': {source}")]
    MalformedRegex {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A matcher specified both a literal and a regex for the same slot, or
    /// some other combination the schema disallows (§7 "conflicting
    /// literal-and-regex specification").
    #[error("conflicting configuration in '{field}': {detail}")]
    Conflicting { field: String, detail: String },

    #[error("unknown field '{field}'. {suggestion}")]
    UnknownField { field: String, suggestion: String },

    #[error("{0}")]
    Custom(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn malformed_regex(field: impl Into<String>, source: regex::Error) -> Self {
        ConfigError::MalformedRegex { field: field.into(), source }
    }

    pub fn unknown_field_with_suggestion(field: impl Into<String>, valid_fields: &[&str]) -> Self {
        let field = field.into();
        let suggestion = find_closest_match(&field, valid_fields);
        ConfigError::UnknownField { field, suggestion }
    }
}

fn find_closest_match(target: &str, candidates: &[&str]) -> String {
    match candidates.iter().min_by_key(|c| levenshtein_distance(target, c)) {
        Some(closest) => format!("Did you mean '{closest}'?"),
        None => "no valid fields available".to_string(),
    }
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let mut matrix = vec![vec![0usize; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }
    for (i, c1) in s1.chars().enumerate() {
        for (j, c2) in s2.chars().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            matrix[i + 1][j + 1] = *[
                matrix[i][j + 1] + 1,
                matrix[i + 1][j] + 1,
                matrix[i][j] + cost,
            ]
            .iter()
            .min()
            .unwrap();
        }
    }
    matrix[len1][len2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_classic() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("context_k", "context_k"), 0);
    }

    #[test]
    fn suggests_closest_field() {
        let err = ConfigError::unknown_field_with_suggestion("context_kk", &["context_k", "use_ear"]);
        assert!(err.to_string().contains("context_k"));
    }
}
