use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

/// Events emitted while walking and rewriting a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    SizeExceeded { path: PathBuf, size: u64, limit: u64 },
    BinarySkipped { path: PathBuf },
    Ignored { path: PathBuf },
    TokenError { path: PathBuf, token: String, reason: String },
    Replaced { path: PathBuf, count: usize },
    Materialized { template: PathBuf, output: PathBuf, count: usize },
    /// Emitted instead of a write when running dry.
    Preview { path: PathBuf, before: String, after: String },
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SizeExceeded { path, size, limit } => write!(
                f,
                "Skipping file {} because its size ({}) exceeds the limit ({})",
                file_name(path),
                size,
                limit
            ),
            Diagnostic::BinarySkipped { path } => write!(f, "Skipping binary file: {}", path.display()),
            Diagnostic::Ignored { path } => write!(f, "Ignoring path: {}", path.display()),
            Diagnostic::TokenError { path, token, reason } => write!(
                f,
                "Error in placeholder '{}' ({}): {}",
                token,
                path.display(),
                reason
            ),
            Diagnostic::Replaced { path, count } => {
                write!(f, "Replaced {} instances in {}", count, file_name(path))
            }
            Diagnostic::Materialized { template, output, count } => write!(
                f,
                "Processed template {} -> {} ({} replacements)",
                file_name(template),
                file_name(output),
                count
            ),
            Diagnostic::Preview { path, .. } => write!(f, "Would update contents of: {}", path.display()),
        }
    }
}

/// Receives diagnostics from one engine run.
pub trait DiagnosticsSink {
    fn report(&self, diagnostic: Diagnostic);
}

impl<F> DiagnosticsSink for F
where
    F: Fn(Diagnostic),
{
    fn report(&self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl DiagnosticsSink for Silent {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to `tracing`. Per-file lines are promoted to `info` when verbose.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink {
    verbose: bool,
}

impl TracingSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::TokenError { .. } => warn!("{}", diagnostic),
            Diagnostic::Replaced { count: 0, .. } | Diagnostic::Materialized { count: 0, .. } => {
                debug!("{}", diagnostic)
            }
            Diagnostic::BinarySkipped { .. } | Diagnostic::Ignored { .. } | Diagnostic::Preview { .. } => {
                debug!("{}", diagnostic)
            }
            _ if self.verbose => info!("{}", diagnostic),
            _ => debug!("{}", diagnostic),
        }
    }
}
