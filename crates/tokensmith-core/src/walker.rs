use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::classify::is_binary;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::filter::{Eligibility, PathFilter};
use crate::materializer::is_template_file;
use crate::{EngineError, Result};

/// A file that passed every filter, with its content already read.
#[derive(Debug)]
pub struct EligibleFile {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub content: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub files_visited: usize,
    pub files_skipped: usize,
}

/// Depth-first traversal in file-name order: files of a directory first, then its subdirectories.
pub struct Walker<'a> {
    filter: &'a PathFilter,
    sink: &'a dyn DiagnosticsSink,
    suffix: Option<&'a str>,
}

impl<'a> Walker<'a> {
    pub fn new(filter: &'a PathFilter, sink: &'a dyn DiagnosticsSink) -> Self {
        Self {
            filter,
            sink,
            suffix: None,
        }
    }

    /// Only visit files whose name ends with `suffix` (and is longer than it).
    pub fn only_suffixed(mut self, suffix: &'a str) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn walk<F>(&self, root: &Path, mut visit: F) -> Result<WalkStats>
    where
        F: FnMut(EligibleFile) -> Result<()>,
    {
        let mut stats = WalkStats::default();
        self.walk_recursive(root, root, &mut visit, &mut stats)?;
        debug!(
            "Walk of {:?} complete: {} files visited, {} skipped",
            root, stats.files_visited, stats.files_skipped
        );
        Ok(stats)
    }

    fn walk_recursive<F>(&self, root: &Path, dir: &Path, visit: &mut F, stats: &mut WalkStats) -> Result<()>
    where
        F: FnMut(EligibleFile) -> Result<()>,
    {
        debug!("Processing directory: {:?}", dir);

        let mut entries: Vec<_> = fs::read_dir(dir)
            .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
            .map_err(EngineError::io(dir))?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirectories = Vec::new();

        // Process files first
        for entry in &entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(EngineError::io(&path))?;
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(_) if file_type.is_symlink() => {
                    debug!("Skipping dangling symlink: {:?}", path);
                    continue;
                }
                Err(err) => return Err(EngineError::io(&path)(err)),
            };
            // Symlinked files are read through; symlinked directories are never entered.
            if file_type.is_symlink() && metadata.is_dir() {
                self.sink.report(Diagnostic::Ignored { path });
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

            if metadata.is_dir() {
                match self.filter.check(&relative, true, 0) {
                    Eligibility::Eligible => subdirectories.push(path),
                    Eligibility::Ignored => self.sink.report(Diagnostic::Ignored { path }),
                    _ => debug!("Skipping directory: {:?}", path),
                }
                continue;
            }
            if !metadata.is_file() {
                continue;
            }
            if let Some(suffix) = self.suffix {
                if !is_template_file(&path, suffix) {
                    continue;
                }
            }

            match self.filter.check(&relative, false, metadata.len()) {
                Eligibility::Eligible => {}
                Eligibility::TooLarge { size, limit } => {
                    stats.files_skipped += 1;
                    self.sink.report(Diagnostic::SizeExceeded { path, size, limit });
                    continue;
                }
                _ => {
                    stats.files_skipped += 1;
                    self.sink.report(Diagnostic::Ignored { path });
                    continue;
                }
            }

            let content = fs::read(&path).map_err(EngineError::io(&path))?;
            if is_binary(&path, &content) {
                stats.files_skipped += 1;
                self.sink.report(Diagnostic::BinarySkipped { path });
                continue;
            }

            stats.files_visited += 1;
            visit(EligibleFile {
                path,
                relative,
                content,
            })?;
        }

        // Then process directories recursively
        for subdirectory in subdirectories {
            self.walk_recursive(root, &subdirectory, visit, stats)?;
        }

        Ok(())
    }
}
