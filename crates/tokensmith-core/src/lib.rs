use std::path::{Path, PathBuf};

pub mod analyzer;
pub mod classify;
pub mod diagnostics;
pub mod engine;
pub mod filter;
pub mod materializer;
pub mod model;
pub mod placeholder;
pub mod replacer;
pub mod transform;
pub mod values;
pub mod walker;

pub use analyzer::AnalysisReport;
pub use diagnostics::{Diagnostic, DiagnosticsSink, Silent, TracingSink};
pub use engine::{Engine, EngineConfig, ReplaceStrategy, ReplaceSummary};
pub use model::{Functions, Replacement, ReplacementSet};
pub use placeholder::PlaceholderToken;
pub use replacer::{ContentReplacer, LiteralReplacer, Replaced, TokenizedReplacer};
pub use transform::Transformation;
pub use values::{load_values, parse_values, ValuesFormat};

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid size format: '{0}' (expected e.g. '3 mb', '50kb', '1 GB')")]
    InvalidSizeFormat(String),
    #[error("invalid delimiters: {0}")]
    InvalidDelimiters(String),
    #[error("empty placeholder")]
    EmptyPlaceholder,
    #[error("placeholder is not valid UTF-8")]
    NonUtf8Placeholder,
    #[error("unsupported transformation function: {0}")]
    UnsupportedTransformation(String),
    #[error("invalid gsub arguments: {0}. Expected gsub(old,new)")]
    InvalidGsubArguments(String),
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template {template:?} was written to {output:?} but could not be removed: {source}")]
    PartialMaterialization {
        template: PathBuf,
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported values file format: {0}")]
    UnsupportedValuesFormat(String),
    #[error("values file error: {0}")]
    ValuesParse(String),
}

impl EngineError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> EngineError + '_ {
        move |source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error only affects a single placeholder; the run carries on past it.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            EngineError::EmptyPlaceholder
                | EngineError::NonUtf8Placeholder
                | EngineError::UnsupportedTransformation(_)
                | EngineError::InvalidGsubArguments(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_are_recoverable() {
        assert!(EngineError::EmptyPlaceholder.is_token_error());
        assert!(EngineError::UnsupportedTransformation("nope".into()).is_token_error());
        assert!(!EngineError::InvalidSizeFormat("3 tb".into()).is_token_error());

        let io = EngineError::io(Path::new("a.txt"))(std::io::Error::other("boom"));
        assert!(!io.is_token_error());
        assert!(io.to_string().contains("a.txt"));
    }
}
