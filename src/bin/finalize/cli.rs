//! CLI definitions using clap.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dotnet_finalize::util::shell::{ColorChoice, Shell};

/// Finalize stage of the .NET Core buildpack
#[derive(Parser)]
#[command(name = "finalize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn shell(&self) -> Shell {
        Shell::from_flags(self.quiet, self.verbose, self.color)
    }

    /// Whether diagnostics on stderr should be colored.
    pub fn use_color(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stderr().is_terminal(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full finalize stage
    Run(RunArgs),

    /// Classify the app and print the framework versions it needs
    Resolve(ResolveArgs),

    /// Remove build-time directories from the dependency directory
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Application directory
    pub build_dir: PathBuf,

    /// Build cache directory
    pub cache_dir: PathBuf,

    /// Dependencies directory
    pub deps_dir: PathBuf,

    /// Index of this buildpack's directory under the dependencies directory
    pub deps_idx: String,

    /// Buildpack manifest listing installable dependencies
    #[arg(long, env = "BUILDPACK_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Application directory
    pub build_dir: PathBuf,

    /// Dependencies directory
    pub deps_dir: PathBuf,

    /// Index of this buildpack's directory under the dependencies directory
    pub deps_idx: String,

    /// Buildpack manifest listing installable dependencies
    #[arg(long, env = "BUILDPACK_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Platform stack used to filter the manifest
    #[arg(long, env = "CF_STACK")]
    pub stack: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Dependencies directory
    pub deps_dir: PathBuf,

    /// Index of this buildpack's directory under the dependencies directory
    pub deps_idx: String,

    /// Command that launches the app; a `.dll` keeps the SDK
    #[arg(long, default_value = "")]
    pub start_command: String,

    /// Keep the node install
    #[arg(long)]
    pub install_node: bool,
}
