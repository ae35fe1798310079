use similar::{ChangeTag, TextDiff};
use std::fmt::{self, Write};
use std::path::Path;
use tokensmith_core::{Diagnostic, DiagnosticsSink, TracingSink};
use tracing::{info, warn};

/// Colored line diff with three lines of context, or `None` when nothing changed.
pub fn render_diff(old_content: &str, new_content: &str) -> Result<Option<String>, fmt::Error> {
    let diff = TextDiff::from_lines(old_content, new_content);
    let mut output = String::new();
    let mut has_changes = false;

    for (i, group) in diff.grouped_ops(3).iter().enumerate() {
        if i > 0 {
            writeln!(output, "{:-^1$}", "", 40)?;
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, style) = match change.tag() {
                    ChangeTag::Delete => ("- ", "\x1b[31m"), // Red
                    ChangeTag::Insert => ("+ ", "\x1b[32m"), // Green
                    ChangeTag::Equal => ("  ", "\x1b[0m"),   // Default
                };
                write!(output, "{}{}{}\x1b[0m", style, sign, change.value())?;
                if change.missing_newline() {
                    output.push('\n');
                }
                if change.tag() != ChangeTag::Equal {
                    has_changes = true;
                }
            }
        }
    }

    Ok(has_changes.then_some(output))
}

pub fn show_diff(file_path: &Path, old_content: &str, new_content: &str) -> fmt::Result {
    println!("\n📝 Would update: {}", file_path.display());
    match render_diff(old_content, new_content)? {
        Some(output) => println!("{}", output),
        None => println!("No changes detected."),
    }
    Ok(())
}

/// Logs through [`TracingSink`] and prints dry-run previews, as diffs when asked to.
pub struct PreviewSink {
    inner: TracingSink,
    show_diffs: bool,
}

impl PreviewSink {
    pub fn new(verbose: bool, show_diffs: bool) -> Self {
        Self {
            inner: TracingSink::new(verbose),
            show_diffs,
        }
    }
}

impl DiagnosticsSink for PreviewSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Diagnostic::Preview { path, before, after } = &diagnostic {
            if self.show_diffs {
                if let Err(err) = show_diff(path, before, after) {
                    warn!("Could not render diff for {:?}: {}", path, err);
                }
            } else {
                info!("{}", diagnostic);
            }
            return;
        }
        self.inner.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_detection() {
        let old_content = "# [[PROJECT_NAME]]\nwith multiple lines";
        let new_content = "# demo\nwith multiple lines";

        let output = render_diff(old_content, new_content).unwrap().unwrap();
        assert!(output.contains("- # [[PROJECT_NAME]]"));
        assert!(output.contains("+ # demo"));
    }

    #[test]
    fn test_no_diff_detection() {
        let content = "This is the same content\nwith multiple lines";
        assert_eq!(render_diff(content, content), Ok(None));
    }

    #[test]
    fn test_distant_changes_are_separated() {
        let old_content: String = (0..20).map(|i| format!("line {}\n", i)).collect();
        let new_content = old_content
            .replace("line 1\n", "changed 1\n")
            .replace("line 18\n", "changed 18\n");

        let output = render_diff(&old_content, &new_content).unwrap().unwrap();
        assert!(output.contains(&"-".repeat(40)));
    }

    #[test]
    fn test_missing_trailing_newline_is_terminated() {
        let output = render_diff("a\nb", "a\nc").unwrap().unwrap();
        assert!(output.ends_with("c\x1b[0m\n"));
        assert!(show_diff(Path::new("f.txt"), "a", "b").is_ok());
    }
}
