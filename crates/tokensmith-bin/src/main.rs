mod cli;
mod clone;
mod diff;
mod generate;
mod prompt;
mod settings;

use anyhow::{Context, Result};
use cli::{Cli, Commands, RunArgs};
use inquire::Text;
use settings::{settings_path, Settings};
use std::path::{Path, PathBuf};
use tokensmith_core::filter::parse_size_limit;
use tokensmith_core::{load_values, Engine, EngineConfig, ReplacementSet};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting tokensmith");

    let verbose = cli.verbose;
    match cli.command {
        Commands::Template { dir, run } => {
            handle_template_command(dir, run, verbose)?;
        }
        Commands::Clone { repo, output_dir, branch, fresh, run } => {
            handle_clone_command(repo, output_dir, branch, fresh, run, verbose)?;
        }
        Commands::Generate { template, branch, output_dir, run } => {
            handle_generate_command(template, branch, output_dir, run, verbose)?;
        }
        Commands::Setup { show, reset } => {
            handle_setup_command(show, reset)?;
        }
    }

    info!("Tokensmith completed successfully");
    Ok(())
}

fn handle_template_command(dir: PathBuf, run: RunArgs, verbose: bool) -> Result<()> {
    info!("Target directory: {:?}", dir);

    if !dir.exists() {
        anyhow::bail!("Target directory does not exist: {:?}", dir);
    }

    if !dir.is_dir() {
        anyhow::bail!("Target must be a directory: {:?}", dir);
    }

    let config = resolve_config(&run)?;
    run_engine(&dir, config, &run, verbose)
}

fn handle_clone_command(
    repo: String,
    output_dir: PathBuf,
    branch: Option<String>,
    fresh: bool,
    run: RunArgs,
    verbose: bool,
) -> Result<()> {
    info!("Repository: {}", repo);
    info!("Output directory: {:?}", output_dir);

    // Fail on bad settings before anything is cloned.
    let config = resolve_config(&run)?;

    clone::prepare_output_dir(&output_dir)?;
    clone::clone_repository(&repo, &output_dir, branch.as_deref())?;
    if fresh && clone::remove_git_dir(&output_dir)? {
        info!("Removed git history from {:?}", output_dir);
    }

    run_engine(&output_dir, config, &run, verbose)
}

fn handle_generate_command(
    template: Option<String>,
    branch: Option<String>,
    output_dir: Option<PathBuf>,
    run: RunArgs,
    verbose: bool,
) -> Result<()> {
    let settings = Settings::load()?;
    let config = settings.engine_config(&run);
    parse_size_limit(&config.file_size_limit)?;

    let candidates = generate::matching_templates(&settings.templates, template.as_deref());
    let chosen = generate::choose_template(candidates, run.interactive)?;
    let branch = generate::resolve_branch(&chosen, branch.as_deref());

    let output_dir = match output_dir {
        Some(dir) => dir,
        None => PathBuf::from(
            Text::new("Output directory")
                .with_default(generate::DEFAULT_OUTPUT_DIR)
                .prompt()?,
        ),
    };

    clone::prepare_output_dir(&output_dir)?;
    clone::clone_repository(&chosen.url, &output_dir, Some(&branch))?;
    info!("Cloned {}@{} into {:?}", chosen.name, branch, output_dir);
    if clone::remove_git_dir(&output_dir)? {
        info!("Removed git history from {:?}", output_dir);
    }

    run_engine(&output_dir, config, &run, verbose)
}

fn handle_setup_command(show: bool, reset: bool) -> Result<()> {
    let path = settings_path()?;

    if reset {
        if Settings::reset_at(&path)? {
            println!("Configuration removed: {}", path.display());
        } else {
            println!("No configuration found at {}", path.display());
        }
        return Ok(());
    }

    let mut settings = Settings::load_from(&path)?;

    if show {
        print_settings(&path, &settings);
        return Ok(());
    }

    let defaults = EngineConfig::default();
    let start = settings.start_delim.clone().unwrap_or(defaults.start_delimiter);
    let end = settings.end_delim.clone().unwrap_or(defaults.end_delimiter);
    let limit = settings.file_size_limit.clone().unwrap_or(defaults.file_size_limit);

    let start = Text::new("Template start delimiter").with_default(&start).prompt()?;
    let end = Text::new("Template end delimiter").with_default(&end).prompt()?;
    let limit = Text::new("File size limit (e.g. 3 mb)").with_default(&limit).prompt()?;

    if start.is_empty() || end.is_empty() {
        anyhow::bail!("Delimiters must not be empty");
    }
    parse_size_limit(&limit)?;

    settings.start_delim = Some(start);
    settings.end_delim = Some(end);
    settings.file_size_limit = Some(limit);
    settings.save_to(&path)?;

    info!("Configuration saved to {:?}", path);
    Ok(())
}

fn print_settings(path: &Path, settings: &Settings) {
    let defaults = EngineConfig::default();
    println!("Current configuration ({}):", path.display());
    println!();
    println!(
        "  start_delim:     {}",
        settings.start_delim.as_deref().unwrap_or(&defaults.start_delimiter)
    );
    println!(
        "  end_delim:       {}",
        settings.end_delim.as_deref().unwrap_or(&defaults.end_delimiter)
    );
    println!(
        "  file_size_limit: {}",
        settings.file_size_limit.as_deref().unwrap_or(&defaults.file_size_limit)
    );
    if !settings.ignore_patterns.is_empty() {
        println!("  ignore_patterns: {}", settings.ignore_patterns.join(", "));
    }
    for (from, to) in &settings.functions.apply_replace {
        println!("  APPLY_REPLACE:   {:?} -> {:?}", from, to);
    }
    for template in &settings.templates {
        println!("  template:        {} ({})", template.name, template.url);
    }
    println!();
}

fn resolve_config(run: &RunArgs) -> Result<EngineConfig> {
    let settings = Settings::load()?;
    let config = settings.engine_config(run);
    parse_size_limit(&config.file_size_limit)?;
    Ok(config)
}

fn run_engine(dir: &Path, mut config: EngineConfig, run: &RunArgs, verbose: bool) -> Result<()> {
    let provided = match &run.input {
        Some(input) => load_values(input)
            .with_context(|| format!("Failed to load values from {:?}", input))?,
        None => ReplacementSet::default(),
    };
    config
        .ignore_patterns
        .extend(provided.ignore_patterns.iter().cloned());

    let sink = diff::PreviewSink::new(verbose, run.diff);
    let engine = Engine::new(config, &sink)?;

    if engine.config().dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    let report = engine.analyze(dir, run.only_templates)?;
    let mut values = prompt::provided_values(&provided);
    if !report.is_empty() {
        info!("Discovered placeholders:");
        for line in prompt::discovered_table(&report, &values) {
            println!("{}", line);
        }
        if run.interactive {
            prompt::prompt_values(&report, &mut values)?;
            println!();
        }
    }
    let values = prompt::final_set(&report, &values, provided);

    if !run.only_templates {
        let summary = engine.replace(dir, &values)?;
        println!("Replacement complete!");
        println!("  Files visited: {}", summary.files_visited);
        println!("  Files changed: {}", summary.files_changed);
        println!("  Replacements: {}", summary.replacements);
    }

    if run.process_templates {
        let summary = engine.materialize(dir, &values)?;
        println!("Template processing complete!");
        println!("  Templates processed: {}", summary.files_changed);
        println!("  Replacements: {}", summary.replacements);
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}
