use std::collections::BTreeMap;
use std::path::Path;

use memchr::memmem::Finder;

use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::placeholder::base_key_of;
use crate::EngineError;

/// Occurrence counts of placeholder base keys, in sorted key order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    counts: BTreeMap<String, usize>,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all occurrences.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

/// Counts every delimiter-bounded span in `content` by base key.
///
/// The scan moves forward: after a start delimiter the next end delimiter closes the span,
/// and scanning resumes right after it. A start delimiter with no end delimiter after it
/// ends the scan. Bodies without a usable base key are reported and skipped.
pub fn scan_content(
    path: &Path,
    content: &[u8],
    start: &str,
    end: &str,
    report: &mut AnalysisReport,
    sink: &dyn DiagnosticsSink,
) {
    if start.is_empty() || end.is_empty() {
        return;
    }
    let (open_finder, close_finder) = (Finder::new(start), Finder::new(end));
    let mut cursor = 0;

    while let Some(open) = open_finder.find(&content[cursor..]).map(|at| cursor + at) {
        let body_start = open + start.len();
        let Some(close) = close_finder
            .find(&content[body_start..])
            .map(|at| body_start + at)
        else {
            break;
        };
        let body = &content[body_start..close];
        cursor = close + end.len();

        let key = std::str::from_utf8(body)
            .map_err(|_| EngineError::NonUtf8Placeholder)
            .and_then(base_key_of);
        match key {
            Ok(key) => report.record(key),
            Err(err) => sink.report(Diagnostic::TokenError {
                path: path.to_path_buf(),
                token: String::from_utf8_lossy(body).into_owned(),
                reason: err.to_string(),
            }),
        }
    }
}
