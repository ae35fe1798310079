use std::path::Path;

use crate::{EngineError, Result};

/// Directories that are never descended into, whatever the ignore configuration says.
pub const SKIPPED_DIRECTORIES: [&str; 6] = [".git", "node_modules", "vendor", "dist", "build", "bin"];

pub fn is_skipped_directory(name: &str) -> bool {
    SKIPPED_DIRECTORIES.contains(&name)
}

/// Parses sizes like `3 mb`, `50kb` or `1 GB` into bytes.
pub fn parse_size_limit(input: &str) -> Result<u64> {
    let invalid = || EngineError::InvalidSizeFormat(input.to_string());
    let trimmed = input.trim();

    let unit_start = trimmed
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| i)
        .ok_or_else(invalid)?;
    let (number, unit) = trimmed.split_at(unit_start);
    if number.is_empty() {
        return Err(invalid());
    }

    let number: u64 = number.trim().parse().map_err(|_| invalid())?;
    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "kb" => 1024,
        "mb" => 1024 * 1024,
        "gb" => 1024 * 1024 * 1024,
        _ => return Err(invalid()),
    };

    number.checked_mul(multiplier).ok_or_else(invalid)
}

/// Outcome of checking a single directory entry against the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ignored,
    SkippedDirectory,
    TooLarge { size: u64, limit: u64 },
}

#[derive(Debug, Clone)]
pub struct PathFilter {
    size_limit: u64,
    ignore_patterns: Vec<String>,
}

impl PathFilter {
    pub fn new<I, S>(size_limit: u64, ignore_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ignore_patterns = ignore_patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            size_limit,
            ignore_patterns,
        }
    }

    pub fn size_limit(&self) -> u64 {
        self.size_limit
    }

    /// Case-insensitive substring match against the root-relative path, using `/` separators.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        if self.ignore_patterns.is_empty() {
            return false;
        }
        let normalized = relative.to_string_lossy().replace('\\', "/").to_lowercase();
        self.ignore_patterns.iter().any(|p| normalized.contains(p.as_str()))
    }

    pub fn check(&self, relative: &Path, is_dir: bool, size: u64) -> Eligibility {
        if self.is_ignored(relative) {
            return Eligibility::Ignored;
        }
        if is_dir {
            let name = relative.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if is_skipped_directory(name) {
                return Eligibility::SkippedDirectory;
            }
        } else if size > self.size_limit {
            return Eligibility::TooLarge {
                size,
                limit: self.size_limit,
            };
        }
        Eligibility::Eligible
    }

    pub fn eligible(&self, relative: &Path, is_dir: bool, size: u64) -> bool {
        self.check(relative, is_dir, size) == Eligibility::Eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size_limit("3 mb").unwrap(), 3 * 1024 * 1024);
        assert_eq!(parse_size_limit("50kb").unwrap(), 50 * 1024);
        assert_eq!(parse_size_limit(" 1 GB ").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size_limit("2Mb").unwrap(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_rejects_malformed_input() {
        for input in ["", "mb", "3", "3 tb", "3 b", "-1 kb", "1.5 mb", "three mb", "3 mb extra"] {
            let err = parse_size_limit(input).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidSizeFormat(ref s) if s == input),
                "expected InvalidSizeFormat for {input:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_size_overflow() {
        assert!(parse_size_limit("18446744073709551615 gb").is_err());
    }

    #[test]
    fn test_skipped_directories() {
        let filter = PathFilter::new(1024, Vec::<String>::new());
        for name in SKIPPED_DIRECTORIES {
            assert_eq!(filter.check(Path::new(name), true, 0), Eligibility::SkippedDirectory);
        }
        assert!(filter.eligible(Path::new("src/node_modules_docs"), true, 0));
        // Only directories are skipped by name.
        assert!(filter.eligible(Path::new("bin"), false, 10));
    }

    #[test]
    fn test_ignore_patterns_are_case_insensitive_substrings() {
        let filter = PathFilter::new(1024, ["Docs/Legacy", "  ", "secret"]);
        assert!(filter.is_ignored(Path::new("docs/legacy/readme.md")));
        assert!(filter.is_ignored(Path::new("DOCS/LEGACY")));
        assert!(filter.is_ignored(Path::new("config/my-secrets.yaml")));
        assert!(!filter.is_ignored(Path::new("docs/current/readme.md")));
        assert_eq!(filter.check(Path::new("docs/legacy"), true, 0), Eligibility::Ignored);
    }

    #[test]
    fn test_size_limit() {
        let filter = PathFilter::new(100, Vec::<String>::new());
        assert!(filter.eligible(Path::new("a.txt"), false, 100));
        assert_eq!(
            filter.check(Path::new("a.txt"), false, 101),
            Eligibility::TooLarge { size: 101, limit: 100 }
        );
        // Directory sizes are never compared.
        assert!(filter.eligible(Path::new("src"), true, 4096));
    }
}
