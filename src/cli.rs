use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::{logging::level_from_flags, outside::Credentials, types::ListingStrategy};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("SERMON_", $v)
    };
}

/// Download sermon video details and transcripts, then merge them into one dataset.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Path to a TOML settings file
    #[arg(long, global = true, env = arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// Root of the local data directory. Overrides the settings
    #[arg(long, global = true, env = arg_env!("DATA_DIR"))]
    pub data_dir: Option<PathBuf>,

    /// User name for the remote repository authentication
    #[arg(long, global = true, env = "GITHUB_USERNAME")]
    pub github_username: Option<String>,

    /// Token for the remote repository authentication
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Log more. Can be repeated
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the video details and the missing transcripts
    Fetch(FetchArgs),

    /// Merge the local transcripts into the video details
    Merge(MergeArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Do not download the video details file
    #[arg(long, conflicts_with = "skip_transcripts")]
    pub skip_details: bool,

    /// Do not download the transcripts
    #[arg(long)]
    pub skip_transcripts: bool,

    /// How to list the remote transcripts. Overrides the settings
    #[arg(long, value_enum)]
    pub listing: Option<ListingStrategy>,
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Video details file to read. Defaults to the downloaded one
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// File to write the merged details to. Defaults to the processed data directory
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn log_level(&self) -> tracing::Level {
        level_from_flags(self.verbose, self.quiet)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.github_username.clone(), self.github_token.clone())
    }
}
