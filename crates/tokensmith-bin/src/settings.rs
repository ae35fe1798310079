use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokensmith_core::{EngineConfig, Functions, ReplaceStrategy};
use tracing::debug;

use crate::cli::RunArgs;

const SETTINGS_DIR: &str = ".tokensmith";
const SETTINGS_FILE: &str = "config.yaml";

/// A template repository `generate` can start a project from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRepo {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

impl std::fmt::Display for TemplateRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.url)?;
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}

/// Per-user defaults stored in `~/.tokensmith/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_delim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_delim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_limit: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Functions::is_empty")]
    pub functions: Functions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateRepo>,
}

pub fn settings_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_path()?)
    }

    /// A missing or empty file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {:?}", path))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).with_context(|| format!("Invalid configuration: {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let text = serde_yaml::to_string(self).context("Failed to serialize configuration")?;
        fs::write(path, text).with_context(|| format!("Failed to write configuration: {:?}", path))
    }

    /// Returns whether a file was removed.
    pub fn reset_at(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).with_context(|| format!("Failed to remove configuration: {:?}", path))?;
        Ok(true)
    }

    /// Flags win over these settings, which win over the engine defaults.
    pub fn engine_config(&self, run: &RunArgs) -> EngineConfig {
        let defaults = EngineConfig::default();
        let pick = |flag: &Option<String>, setting: &Option<String>, default: String| {
            non_empty(flag)
                .or_else(|| non_empty(setting))
                .unwrap_or(default)
        };

        let mut ignore_patterns = self.ignore_patterns.clone();
        ignore_patterns.extend(run.ignore.iter().cloned());

        EngineConfig {
            start_delimiter: pick(&run.start_delim, &self.start_delim, defaults.start_delimiter),
            end_delimiter: pick(&run.end_delim, &self.end_delim, defaults.end_delimiter),
            file_size_limit: pick(&run.file_size_limit, &self.file_size_limit, defaults.file_size_limit),
            ignore_patterns,
            template_suffix: defaults.template_suffix,
            strategy: if run.literal {
                ReplaceStrategy::Literal
            } else {
                ReplaceStrategy::Tokenized
            },
            functions: self.functions.clone(),
            dry_run: run.dry_run,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_empty_files_are_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_DIR).join(SETTINGS_FILE);
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "\n").unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_DIR).join(SETTINGS_FILE);

        let mut settings = Settings {
            start_delim: Some("<!".to_string()),
            end_delim: Some("!>".to_string()),
            file_size_limit: Some("1 mb".to_string()),
            ignore_patterns: vec!["fixtures".to_string()],
            templates: vec![TemplateRepo {
                name: "rust-cli".to_string(),
                url: "git@github.com:acme/rust-cli.git".to_string(),
                description: String::new(),
                default_branch: Some("main".to_string()),
            }],
            ..Settings::default()
        };
        settings.functions.apply_replace.insert("-".into(), "_".into());

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);

        assert!(Settings::reset_at(&path).unwrap());
        assert!(!path.exists());
        assert!(!Settings::reset_at(&path).unwrap());
    }

    #[test]
    fn test_reads_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "start_delim: \"{{\"\nend_delim: \"}}\"\nfile_size_limit: 3 mb\nfunctions:\n  APPLY_REPLACE:\n    \" \": \"-\"\ntemplates:\n  - name: web\n    url: https://example.com/web.git\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.start_delim.as_deref(), Some("{{"));
        assert_eq!(settings.functions.apply_replace.get(" "), Some(&"-".to_string()));
        assert_eq!(settings.templates[0].name, "web");
        assert_eq!(settings.templates[0].default_branch, None);
    }

    #[test]
    fn test_template_display() {
        let mut template = TemplateRepo {
            name: "web".to_string(),
            url: "https://example.com/web.git".to_string(),
            ..TemplateRepo::default()
        };
        assert_eq!(template.to_string(), "web (https://example.com/web.git)");
        template.description = "static site".to_string();
        assert_eq!(template.to_string(), "web (https://example.com/web.git) - static site");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "start_delim: [unclosed").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_engine_config_precedence() {
        let settings = Settings {
            start_delim: Some("<!".to_string()),
            end_delim: Some(String::new()),
            file_size_limit: Some("1 mb".to_string()),
            ignore_patterns: vec!["fixtures".to_string()],
            ..Settings::default()
        };
        let run = RunArgs {
            file_size_limit: Some("50 kb".to_string()),
            ignore: vec!["docs".to_string()],
            literal: true,
            dry_run: true,
            ..RunArgs::default()
        };

        let config = settings.engine_config(&run);
        assert_eq!(config.start_delimiter, "<!");
        assert_eq!(config.end_delimiter, "]]");
        assert_eq!(config.file_size_limit, "50 kb");
        assert_eq!(config.ignore_patterns, vec!["fixtures", "docs"]);
        assert_eq!(config.strategy, ReplaceStrategy::Literal);
        assert!(config.dry_run);

        let config = Settings::default().engine_config(&RunArgs::default());
        assert_eq!(config, EngineConfig::default());
    }
}
