//! Loading of values documents (YAML or JSON) into a [`ReplacementSet`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::model::ReplacementSet;
use crate::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuesFormat {
    Yaml,
    Json,
}

impl ValuesFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(ValuesFormat::Yaml),
            "json" => Ok(ValuesFormat::Json),
            _ => Err(EngineError::UnsupportedValuesFormat(format!(".{}", ext))),
        }
    }
}

pub fn load_values(path: &Path) -> Result<ReplacementSet> {
    let format = ValuesFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(EngineError::io(path))?;
    debug!("Loading values from {:?} as {:?}", path, format);
    parse_values(&text, format)
}

pub fn parse_values(text: &str, format: ValuesFormat) -> Result<ReplacementSet> {
    if text.trim().is_empty() {
        return Ok(ReplacementSet::default());
    }
    match format {
        ValuesFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| EngineError::ValuesParse(e.to_string()))
        }
        ValuesFormat::Json => {
            serde_json::from_str(text).map_err(|e| EngineError::ValuesParse(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_document() {
        let text = r#"
variables:
  - key: PROJECT_NAME
    value: TestProject
  - key: SLUG_APPLY_REPLACE
    value: my project
ignore_patterns:
  - docs/legacy
functions:
  APPLY_REPLACE:
    " ": "-"
"#;
        let set = parse_values(text, ValuesFormat::Yaml).unwrap();
        assert_eq!(set.variables.len(), 2);
        assert_eq!(set.effective().get("PROJECT_NAME"), Some(&"TestProject"));
        assert_eq!(set.ignore_patterns, vec!["docs/legacy".to_string()]);
        assert_eq!(set.functions.apply_replace.get(" "), Some(&"-".to_string()));
    }

    #[test]
    fn test_flow_yaml_and_json() {
        let yaml = parse_values("variables: [{key: APP_NAME, value: MyApp}]", ValuesFormat::Yaml).unwrap();
        let json = parse_values(
            r#"{"variables": [{"key": "APP_NAME", "value": "MyApp"}]}"#,
            ValuesFormat::Json,
        )
        .unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_values("", ValuesFormat::Yaml).unwrap().is_empty());
        assert!(parse_values("variables: []", ValuesFormat::Yaml).unwrap().is_empty());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ValuesFormat::from_path(Path::new("v.YML")).unwrap(), ValuesFormat::Yaml);
        assert_eq!(ValuesFormat::from_path(Path::new("v.json")).unwrap(), ValuesFormat::Json);
        assert!(matches!(
            ValuesFormat::from_path(Path::new("v.toml")),
            Err(EngineError::UnsupportedValuesFormat(_))
        ));
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_values("variables: [{key: 1", ValuesFormat::Yaml).unwrap_err();
        assert!(matches!(err, EngineError::ValuesParse(_)));
    }
}
