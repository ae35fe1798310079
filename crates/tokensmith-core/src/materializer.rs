use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{EngineError, Result};

/// A template file's name ends with the suffix and has something in front of it.
pub fn is_template_file(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.len() > suffix.len() && name.ends_with(suffix))
        .unwrap_or(false)
}

/// `README.md.tpl` -> `README.md`, in the same directory.
pub fn materialized_path(template: &Path, suffix: &str) -> Option<PathBuf> {
    if !is_template_file(template, suffix) {
        return None;
    }
    let name = template.file_name()?.to_str()?;
    let stripped = &name[..name.len() - suffix.len()];
    Some(template.with_file_name(stripped))
}

/// Writes `content` to `output` (replacing any file already there), then removes `template`.
pub fn materialize_file(template: &Path, output: &Path, content: &[u8]) -> Result<()> {
    fs::write(output, content).map_err(EngineError::io(output))?;
    fs::remove_file(template).map_err(|source| EngineError::PartialMaterialization {
        template: template.to_path_buf(),
        output: output.to_path_buf(),
        source,
    })?;
    debug!("Materialized {:?} -> {:?}", template, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_names() {
        assert!(is_template_file(Path::new("README.md.tpl"), ".tpl"));
        assert!(is_template_file(Path::new("src/config.tpl"), ".tpl"));
        assert!(!is_template_file(Path::new(".tpl"), ".tpl"));
        assert!(!is_template_file(Path::new("README.md"), ".tpl"));
        assert!(!is_template_file(Path::new("README.TPL"), ".tpl"));
    }

    #[test]
    fn test_materialized_path() {
        assert_eq!(
            materialized_path(Path::new("docs/README.md.tpl"), ".tpl"),
            Some(PathBuf::from("docs/README.md"))
        );
        assert_eq!(
            materialized_path(Path::new("Makefile.tpl"), ".tpl"),
            Some(PathBuf::from("Makefile"))
        );
        assert_eq!(materialized_path(Path::new("a/.tpl"), ".tpl"), None);
    }

    #[test]
    fn test_materialize_overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("README.md.tpl");
        let output = dir.path().join("README.md");
        fs::write(&template, "# [[NAME]]").unwrap();
        fs::write(&output, "stale").unwrap();

        materialize_file(&template, &output, b"# Demo").unwrap();

        assert!(!template.exists());
        assert_eq!(fs::read_to_string(&output).unwrap(), "# Demo");
    }

    #[test]
    fn test_remove_failure_is_partial() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("gone.txt.tpl");
        let output = dir.path().join("gone.txt");

        let err = materialize_file(&template, &output, b"content").unwrap_err();
        assert!(matches!(err, EngineError::PartialMaterialization { .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "content");
    }

    #[test]
    fn test_write_failure_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("x.tpl");
        fs::write(&template, "x").unwrap();
        let output = dir.path().join("missing-dir").join("x");

        let err = materialize_file(&template, &output, b"x").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
        assert!(template.exists());
    }
}
