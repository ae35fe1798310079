use anyhow::{bail, Context, Result};
use inquire::Confirm;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub fn is_ssh_url(url: &str) -> bool {
    url.starts_with("git@") || url.starts_with("ssh://")
}

fn ssh_key_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(".ssh").join("id_rsa"))
}

/// Makes sure `output_dir` can receive a clone, asking before replacing a non-empty directory.
pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    if !output_dir.exists() {
        return Ok(());
    }
    if !output_dir.is_dir() {
        bail!("Output path exists and is not a directory: {:?}", output_dir);
    }

    let is_empty = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read directory: {:?}", output_dir))?
        .next()
        .is_none();
    if is_empty {
        return Ok(());
    }

    let replace = Confirm::new(&format!(
        "Directory '{}' already exists and is not empty. Replace it?",
        output_dir.display()
    ))
    .with_default(false)
    .prompt()?;
    if !replace {
        bail!("Refusing to clone into non-empty directory: {:?}", output_dir);
    }

    fs::remove_dir_all(output_dir)
        .with_context(|| format!("Failed to remove directory: {:?}", output_dir))?;
    Ok(())
}

pub fn clone_repository(repo: &str, output_dir: &Path, branch: Option<&str>) -> Result<()> {
    debug!("Cloning repository '{}' into {:?}", repo, output_dir);

    let mut fetch_opts = git2::FetchOptions::new();
    if is_ssh_url(repo) {
        let key_path = ssh_key_path()?;
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, _allowed_types| {
            git2::Cred::ssh_key(username_from_url.unwrap_or("git"), None, &key_path, None)
        });
        fetch_opts.remote_callbacks(callbacks);
    }

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_opts);
    if let Some(branch) = branch {
        builder.branch(branch);
    }

    builder
        .clone(repo, output_dir)
        .with_context(|| format!("Failed to clone the repository: {}", repo))?;

    info!("Cloned into {:?}", output_dir);
    Ok(())
}

/// Drops the clone's history so the output starts fresh. Returns whether anything was removed.
pub fn remove_git_dir(output_dir: &Path) -> Result<bool> {
    let git_dir = output_dir.join(".git");
    if !git_dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&git_dir)
        .with_context(|| format!("Failed to remove directory: {:?}", git_dir))?;
    debug!("Removed {:?}", git_dir);
    Ok(true)
}
