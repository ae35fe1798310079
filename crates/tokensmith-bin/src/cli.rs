use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tokensmith")]
#[command(version)]
#[command(about = "Scaffold projects by filling placeholders in template repositories")]
#[command(long_about = "A CLI tool that clones template repositories (or takes an existing directory) and replaces delimited placeholders such as [[PROJECT_NAME]] with your values, optionally applying transformations and materializing .tpl files.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Replace placeholders in an existing directory")]
    Template {
        #[arg(short, long, help = "Directory to process")]
        dir: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    #[command(about = "Clone a template repository and replace its placeholders")]
    Clone {
        #[arg(short, long, help = "Repository URL or local path")]
        repo: String,

        #[arg(short, long, help = "Directory to clone into")]
        output_dir: PathBuf,

        #[arg(short, long, help = "Branch to check out instead of the remote HEAD")]
        branch: Option<String>,

        #[arg(long, help = "Remove the .git directory after cloning")]
        fresh: bool,

        #[command(flatten)]
        run: RunArgs,
    },

    #[command(about = "Start a new project from a configured template repository")]
    Generate {
        #[arg(short, long, help = "Pick the template whose name or URL contains this text, or a repository URL")]
        template: Option<String>,

        #[arg(short, long, help = "Branch to check out instead of the template's default branch")]
        branch: Option<String>,

        #[arg(short, long, help = "Directory to create the project in (asked for when omitted)")]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    #[command(about = "Configure default delimiters and size limit")]
    Setup {
        #[arg(long, help = "Print the current configuration and exit")]
        show: bool,

        #[arg(long, conflicts_with = "show", help = "Delete the configuration file")]
        reset: bool,
    },
}

/// Flags shared by every command that runs the engine.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[arg(short, long, help = "Values file (.yaml, .yml or .json)")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Placeholder start delimiter (default [[)")]
    pub start_delim: Option<String>,

    #[arg(long, help = "Placeholder end delimiter (default ]])")]
    pub end_delim: Option<String>,

    #[arg(long, help = "Skip files larger than this, e.g. '3 mb' or '50kb'")]
    pub file_size_limit: Option<String>,

    #[arg(long, value_name = "SUBSTR", help = "Skip paths containing this text (repeatable)")]
    pub ignore: Vec<String>,

    #[arg(short = 'p', long, help = "Prompt for a value for each discovered placeholder")]
    pub interactive: bool,

    #[arg(long, help = "Materialize .tpl files into their final names")]
    pub process_templates: bool,

    #[arg(long, requires = "process_templates", help = "Only touch .tpl files")]
    pub only_templates: bool,

    #[arg(long, help = "Use literal key replacement with the APPLY_* naming convention")]
    pub literal: bool,

    #[arg(long, help = "Perform a dry run without making changes")]
    pub dry_run: bool,

    #[arg(long, requires = "dry_run", help = "Show a diff of every change during a dry run")]
    pub diff: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
