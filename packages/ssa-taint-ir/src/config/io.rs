//! Configuration loading from YAML (§6).

use std::path::Path;

use super::error::ConfigResult;
use super::{AnalysisConfig, RawConfig};

impl AnalysisConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<AnalysisConfig> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        raw.compile()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<AnalysisConfig> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SinkPredicates, SourcePredicates};

    #[test]
    fn loads_minimal_yaml() {
        let yaml = r#"
context_k: 1
ear_taint_call_span: 3
use_ear: true
sources:
  - package_regex: "example.com/secrets"
    type_regex: "Credentials"
sinks:
  - package_regex: "log"
    method_regex: "Printf"
"#;
        let cfg = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.context_k, 1);
        assert_eq!(cfg.ear_taint_call_span, 3);
        assert!(cfg.use_ear);
        assert!(cfg.is_source_type("example.com/secrets", "Credentials"));
        assert!(cfg.is_sink_fn("log", "", "Printf"));
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let cfg = AnalysisConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg.context_k, 0);
        assert!(!cfg.allow_panic_on_tainted_values);
    }
}
