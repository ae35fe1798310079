use std::path::Path;

use indexmap::IndexMap;
use memchr::memmem;
use regex::bytes::Regex;

use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::model::{Functions, ReplacementSet};
use crate::placeholder::PlaceholderToken;
use crate::EngineError;

pub const APPLY_UPPERCASE: &str = "APPLY_UPPERCASE";
pub const APPLY_DOWNCASE: &str = "APPLY_DOWNCASE";
pub const APPLY_REPLACE: &str = "APPLY_REPLACE";

/// Result of rewriting one file's content in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub content: Vec<u8>,
    pub count: usize,
}

impl Replaced {
    pub fn changed(&self) -> bool {
        self.count > 0
    }
}

pub trait ContentReplacer {
    fn replace(
        &self,
        path: &Path,
        content: &[u8],
        values: &ReplacementSet,
        sink: &dyn DiagnosticsSink,
    ) -> Replaced;
}

/// Builds the span pattern for a delimiter pair. Bodies never cross a newline.
pub fn placeholder_pattern(start: &str, end: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(
        "{}(?-u:(.*?)){}",
        regex::escape(start),
        regex::escape(end)
    ))
}

/// Parses every span, looks up its base key and substitutes the transformed value.
pub struct TokenizedReplacer<'a> {
    pattern: &'a Regex,
}

impl<'a> TokenizedReplacer<'a> {
    pub fn new(pattern: &'a Regex) -> Self {
        Self { pattern }
    }
}

impl ContentReplacer for TokenizedReplacer<'_> {
    fn replace(
        &self,
        path: &Path,
        content: &[u8],
        values: &ReplacementSet,
        sink: &dyn DiagnosticsSink,
    ) -> Replaced {
        let lookup = values.effective();
        let spans: Vec<_> = self
            .pattern
            .captures_iter(content)
            .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.as_bytes())))
            .collect();

        let mut output = content.to_vec();
        let mut count = 0;

        // Back to front so earlier offsets stay valid.
        for (span, body) in spans.into_iter().rev() {
            let token = std::str::from_utf8(body)
                .map_err(|_| EngineError::NonUtf8Placeholder)
                .and_then(PlaceholderToken::parse);
            let token = match token {
                Ok(token) => token,
                Err(err) => {
                    sink.report(Diagnostic::TokenError {
                        path: path.to_path_buf(),
                        token: String::from_utf8_lossy(body).into_owned(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let Some(value) = lookup.get(token.base_key.as_str()) else {
                continue;
            };
            output.splice(span, token.resolve(value).into_bytes());
            count += 1;
        }

        Replaced { content: output, count }
    }
}

/// Replaces the literal delimited key of each variable with its smart-transformed value.
pub struct LiteralReplacer<'a> {
    start: &'a str,
    end: &'a str,
    functions: &'a Functions,
}

impl<'a> LiteralReplacer<'a> {
    pub fn new(start: &'a str, end: &'a str, functions: &'a Functions) -> Self {
        Self { start, end, functions }
    }

    fn search_token(&self, key: &str) -> String {
        let wrapped = key.len() >= self.start.len() + self.end.len()
            && key.starts_with(self.start)
            && key.ends_with(self.end);
        if wrapped {
            key.to_string()
        } else {
            format!("{}{}{}", self.start, key, self.end)
        }
    }
}

impl ContentReplacer for LiteralReplacer<'_> {
    fn replace(
        &self,
        _path: &Path,
        content: &[u8],
        values: &ReplacementSet,
        _sink: &dyn DiagnosticsSink,
    ) -> Replaced {
        let table = self.functions.merged_with(&values.functions);
        let mut output = content.to_vec();
        let mut count = 0;

        for (key, value) in values.effective() {
            let token = self.search_token(key);
            if token.is_empty() {
                continue;
            }
            let hits: Vec<usize> = memmem::find_iter(&output, token.as_bytes()).collect();
            if hits.is_empty() {
                continue;
            }
            let value = smart_transform(key, value, &table.apply_replace);
            output = splice_all(&output, &hits, token.len(), value.as_bytes());
            count += hits.len();
        }

        Replaced { content: output, count }
    }
}

/// Applies the naming convention encoded in `key` to `value`.
///
/// `APPLY_UPPERCASE` wins over `APPLY_DOWNCASE`. `APPLY_REPLACE` then runs every table entry
/// over the whole value in table order; entries with an empty pattern are skipped.
pub fn smart_transform(key: &str, value: &str, table: &IndexMap<String, String>) -> String {
    let mut result = if key.contains(APPLY_UPPERCASE) {
        value.to_uppercase()
    } else if key.contains(APPLY_DOWNCASE) {
        value.to_lowercase()
    } else {
        value.to_string()
    };

    if key.contains(APPLY_REPLACE) {
        for (from, to) in table {
            if from.is_empty() {
                continue;
            }
            result = result.replace(from.as_str(), to);
        }
    }
    result
}

/// Replaces the `len`-byte match at each sorted, non-overlapping offset in `hits`.
fn splice_all(haystack: &[u8], hits: &[usize], len: usize, replacement: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(haystack.len() + hits.len() * replacement.len());
    let mut cursor = 0;
    for &found in hits {
        output.extend_from_slice(&haystack[cursor..found]);
        output.extend_from_slice(replacement);
        cursor = found + len;
    }
    output.extend_from_slice(&haystack[cursor..]);
    output
}
