use anyhow::Result;
use inquire::Select;

use crate::settings::TemplateRepo;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_OUTPUT_DIR: &str = "./new-project";

fn is_repo_url(text: &str) -> bool {
    text.contains("://") || text.starts_with("git@")
}

/// Configured templates whose name or URL contains `filter`, ignoring case.
///
/// A filter that is itself a repository URL is offered too, so it can be generated from
/// without being configured first.
pub fn matching_templates(templates: &[TemplateRepo], filter: Option<&str>) -> Vec<TemplateRepo> {
    let mut candidates = templates.to_vec();
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
        return candidates;
    };

    if is_repo_url(filter) {
        candidates.push(TemplateRepo {
            name: filter.to_string(),
            url: filter.to_string(),
            description: String::new(),
            default_branch: Some(DEFAULT_BRANCH.to_string()),
        });
    }

    let needle = filter.to_lowercase();
    candidates.retain(|t| {
        t.name.to_lowercase().contains(&needle) || t.url.to_lowercase().contains(&needle)
    });
    candidates
}

/// The `--branch` flag, else the template's default branch, else `main`.
pub fn resolve_branch(template: &TemplateRepo, flag: Option<&str>) -> String {
    flag.filter(|b| !b.is_empty())
        .or_else(|| template.default_branch.as_deref().filter(|b| !b.is_empty()))
        .unwrap_or(DEFAULT_BRANCH)
        .to_string()
}

/// Takes the first candidate, or asks when several match and prompting is allowed.
pub fn choose_template(mut candidates: Vec<TemplateRepo>, ask: bool) -> Result<TemplateRepo> {
    if candidates.is_empty() {
        anyhow::bail!("No templates configured or matched; add some under `templates` in the configuration");
    }
    if ask && candidates.len() > 1 {
        return Ok(Select::new("Template", candidates).prompt()?);
    }
    Ok(candidates.swap_remove(0))
}
