use anyhow::Result;
use indexmap::IndexMap;
use inquire::Text;
use tokensmith_core::{AnalysisReport, Replacement, ReplacementSet};

/// Provided values by key; a repeated key keeps its last value.
pub fn provided_values(provided: &ReplacementSet) -> IndexMap<String, String> {
    provided
        .effective()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub fn discovered_table(report: &AnalysisReport, values: &IndexMap<String, String>) -> Vec<String> {
    report
        .iter()
        .map(|(key, count)| {
            let value = values
                .get(key)
                .filter(|v| !v.is_empty())
                .map(String::as_str)
                .unwrap_or("(unset)");
            format!("  {:<24}  matches={:<6}  value={}", key, count, value)
        })
        .collect()
}

/// Asks for every discovered key; pressing Enter keeps the current value.
pub fn prompt_values(report: &AnalysisReport, values: &mut IndexMap<String, String>) -> Result<()> {
    for key in report.keys() {
        let current = values.get(key).cloned().unwrap_or_default();
        let message = format!("Enter value for {}", key);
        let mut text = Text::new(&message);
        if !current.is_empty() {
            text = text.with_default(&current);
        }
        let answer = text.prompt()?;
        let answer = answer.trim();
        if !answer.is_empty() {
            values.insert(key.to_string(), answer.to_string());
        }
    }
    Ok(())
}

/// The set actually applied: discovered keys that ended up with a value, plus the
/// provided ignore patterns and functions. Nothing discovered means the provided set is used.
pub fn final_set(
    report: &AnalysisReport,
    values: &IndexMap<String, String>,
    provided: ReplacementSet,
) -> ReplacementSet {
    if report.is_empty() {
        return provided;
    }

    let variables = report
        .keys()
        .filter_map(|key| {
            values
                .get(key)
                .filter(|value| !value.is_empty())
                .map(|value| Replacement::new(key, value.as_str()))
        })
        .collect();

    ReplacementSet {
        variables,
        ignore_patterns: provided.ignore_patterns,
        functions: provided.functions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(keys: &[&str]) -> AnalysisReport {
        let mut report = AnalysisReport::new();
        for key in keys {
            report.record(key);
        }
        report
    }

    #[test]
    fn test_discovered_table() {
        let report = report(&["PROJECT_NAME", "AUTHOR", "PROJECT_NAME"]);
        let provided = ReplacementSet::new().with("PROJECT_NAME", "demo");
        let lines = discovered_table(&report, &provided_values(&provided));

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  AUTHOR "));
        assert!(lines[0].contains("matches=1 "));
        assert!(lines[0].ends_with("value=(unset)"));
        assert!(lines[1].contains("matches=2 "));
        assert!(lines[1].ends_with("value=demo"));
    }

    #[test]
    fn test_final_set_keeps_discovered_keys_with_values() {
        let report = report(&["A", "B", "C"]);
        let mut provided = ReplacementSet::new()
            .with("A", "1")
            .with("B", "")
            .with("UNUSED", "x")
            .with("A", "2");
        provided.ignore_patterns.push("fixtures".to_string());
        provided.functions.apply_replace.insert("-".into(), "_".into());

        let values = provided_values(&provided);
        let set = final_set(&report, &values, provided);

        assert_eq!(set.variables, vec![Replacement::new("A", "2")]);
        assert_eq!(set.ignore_patterns, vec!["fixtures".to_string()]);
        assert_eq!(set.functions.apply_replace.len(), 1);
    }

    #[test]
    fn test_nothing_discovered_uses_provided_set() {
        let provided = ReplacementSet::new().with("[[LITERAL]]", "x");
        let values = provided_values(&provided);
        let set = final_set(&AnalysisReport::new(), &values, provided.clone());
        assert_eq!(set, provided);
    }
}
