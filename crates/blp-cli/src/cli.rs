use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blpatch",
    about = "Generate a merged items patch module for Mount & Blade II: Bannerlord",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub merge: MergeArgs,

    /// Print every computed edit action
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the edit script turning one document into another
    Diff(DiffArgs),
    /// Replay a JSON edit script onto a document
    Apply(ApplyArgs),
}

/// Arguments of the default merge run.
#[derive(Args, Debug, Default)]
pub struct MergeArgs {
    /// Game directory
    #[arg(long)]
    pub base: Option<PathBuf>,
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Launcher data file
    #[arg(long)]
    pub launcher_data: Option<PathBuf>,
    /// Name of the generated module
    #[arg(long)]
    pub patch_name: Option<String>,
    /// Leave the launcher's selection record untouched
    #[arg(long)]
    pub no_launcher_update: bool,
    /// Modules to merge, in load order. Defaults to the launcher's selection
    pub mods: Vec<String>,
}

#[derive(Args)]
pub struct DiffArgs {
    pub base: PathBuf,
    pub modified: PathBuf,
    /// Treat whitespace-only text as significant
    #[arg(long)]
    pub strict_whitespace: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    pub script: PathBuf,
    pub target: PathBuf,
    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
