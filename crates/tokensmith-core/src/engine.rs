use std::fs;
use std::path::Path;

use regex::bytes::Regex;
use tracing::{debug, info};

use crate::analyzer::{scan_content, AnalysisReport};
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::filter::{parse_size_limit, PathFilter};
use crate::materializer::{materialize_file, materialized_path};
use crate::model::{Functions, ReplacementSet};
use crate::replacer::{placeholder_pattern, ContentReplacer, LiteralReplacer, TokenizedReplacer};
use crate::walker::{EligibleFile, Walker};
use crate::{EngineError, Result};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceStrategy {
    /// Parse each delimited span and substitute by base key.
    #[default]
    Tokenized,
    /// Replace literal delimited keys, honoring the `APPLY_*` naming convention.
    Literal,
}

/// Knobs for one engine run. Immutable once the engine is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub start_delimiter: String,
    pub end_delimiter: String,
    pub file_size_limit: String,
    pub ignore_patterns: Vec<String>,
    pub template_suffix: String,
    pub strategy: ReplaceStrategy,
    pub functions: Functions,
    pub dry_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_delimiter: "[[".to_string(),
            end_delimiter: "]]".to_string(),
            file_size_limit: "3 mb".to_string(),
            ignore_patterns: Vec::new(),
            template_suffix: ".tpl".to_string(),
            strategy: ReplaceStrategy::default(),
            functions: Functions::default(),
            dry_run: false,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if self.start_delimiter.is_empty() || self.end_delimiter.is_empty() {
            return Err(EngineError::InvalidDelimiters(
                "start and end delimiters must not be empty".to_string(),
            ));
        }
        if self.template_suffix.is_empty() {
            return Err(EngineError::InvalidDelimiters(
                "template suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub files_visited: usize,
    pub files_changed: usize,
    pub replacements: usize,
}

pub struct Engine<'s> {
    config: EngineConfig,
    size_limit: u64,
    pattern: Regex,
    sink: &'s dyn DiagnosticsSink,
}

impl<'s> Engine<'s> {
    /// Validates the configuration. Nothing touches the filesystem until a pass is run.
    pub fn new(config: EngineConfig, sink: &'s dyn DiagnosticsSink) -> Result<Self> {
        let size_limit = parse_size_limit(&config.file_size_limit)?;
        config.validate()?;
        let pattern = placeholder_pattern(&config.start_delimiter, &config.end_delimiter)
            .map_err(|e| EngineError::InvalidDelimiters(e.to_string()))?;

        debug!(
            "Engine ready: delimiters {:?} {:?}, size limit {} bytes, strategy {:?}",
            config.start_delimiter, config.end_delimiter, size_limit, config.strategy
        );

        Ok(Self {
            config,
            size_limit,
            pattern,
            sink,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn size_limit(&self) -> u64 {
        self.size_limit
    }

    /// Counts placeholder base keys under `dir` without modifying anything.
    pub fn analyze(&self, dir: &Path, only_templates: bool) -> Result<AnalysisReport> {
        info!("Starting analysis: {:?}", dir);

        let filter = PathFilter::new(self.size_limit, &self.config.ignore_patterns);
        let mut walker = Walker::new(&filter, self.sink);
        if only_templates {
            walker = walker.only_suffixed(&self.config.template_suffix);
        }

        let mut report = AnalysisReport::new();
        walker.walk(dir, |file| {
            scan_content(
                &file.path,
                &file.content,
                &self.config.start_delimiter,
                &self.config.end_delimiter,
                &mut report,
                self.sink,
            );
            Ok(())
        })?;

        info!(
            "Analysis complete: {} distinct placeholders, {} occurrences",
            report.len(),
            report.total()
        );
        Ok(report)
    }

    /// Rewrites every eligible file under `dir` in place.
    pub fn replace(&self, dir: &Path, values: &ReplacementSet) -> Result<ReplaceSummary> {
        info!("Starting replacement: {:?}", dir);

        let filter = self.filter_for(values);
        let replacer = self.replacer();
        let mut summary = ReplaceSummary::default();

        let stats = Walker::new(&filter, self.sink).walk(dir, |file| {
            let replaced = replacer.replace(&file.path, &file.content, values, self.sink);
            if !replaced.changed() {
                return Ok(());
            }

            if self.config.dry_run {
                debug!("Would update contents of: {:?}", file.path);
                self.preview(&file, &file.path, &replaced.content);
            } else {
                debug!("Updating contents of: {:?}", file.path);
                fs::write(&file.path, &replaced.content).map_err(EngineError::io(&file.path))?;
            }
            self.sink.report(Diagnostic::Replaced {
                path: file.path,
                count: replaced.count,
            });
            summary.files_changed += 1;
            summary.replacements += replaced.count;
            Ok(())
        })?;
        summary.files_visited = stats.files_visited;

        info!(
            "Replacement complete: {} files visited, {} files changed, {} replacements",
            summary.files_visited, summary.files_changed, summary.replacements
        );
        Ok(summary)
    }

    /// Substitutes inside template files and moves each to its name without the suffix.
    pub fn materialize(&self, dir: &Path, values: &ReplacementSet) -> Result<ReplaceSummary> {
        info!("Starting template processing: {:?}", dir);

        let suffix = self.config.template_suffix.as_str();
        let filter = self.filter_for(values);
        let replacer = self.replacer();
        let mut summary = ReplaceSummary::default();

        let walker = Walker::new(&filter, self.sink).only_suffixed(suffix);
        let stats = walker.walk(dir, |file| {
            let Some(output) = materialized_path(&file.path, suffix) else {
                return Ok(());
            };
            let replaced = replacer.replace(&file.path, &file.content, values, self.sink);

            if self.config.dry_run {
                debug!("Would process template: {:?} -> {:?}", file.path, output);
                self.preview(&file, &output, &replaced.content);
            } else {
                materialize_file(&file.path, &output, &replaced.content)?;
            }
            self.sink.report(Diagnostic::Materialized {
                template: file.path,
                output,
                count: replaced.count,
            });
            summary.files_changed += 1;
            summary.replacements += replaced.count;
            Ok(())
        })?;
        summary.files_visited = stats.files_visited;

        info!(
            "Template processing complete: {} templates, {} replacements",
            summary.files_changed, summary.replacements
        );
        Ok(summary)
    }

    fn filter_for(&self, values: &ReplacementSet) -> PathFilter {
        let patterns = self
            .config
            .ignore_patterns
            .iter()
            .chain(values.ignore_patterns.iter());
        PathFilter::new(self.size_limit, patterns)
    }

    fn replacer(&self) -> Box<dyn ContentReplacer + '_> {
        match self.config.strategy {
            ReplaceStrategy::Tokenized => Box::new(TokenizedReplacer::new(&self.pattern)),
            ReplaceStrategy::Literal => Box::new(LiteralReplacer::new(
                &self.config.start_delimiter,
                &self.config.end_delimiter,
                &self.config.functions,
            )),
        }
    }

    fn preview(&self, file: &EligibleFile, target: &Path, after: &[u8]) {
        self.sink.report(Diagnostic::Preview {
            path: target.to_path_buf(),
            before: String::from_utf8_lossy(&file.content).into_owned(),
            after: String::from_utf8_lossy(after).into_owned(),
        });
    }
}
