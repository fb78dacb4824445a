mod cli;
mod config;
mod fetch;
mod io;
mod logging;
mod merge;
mod outside;
mod result;
mod types;

use clap::Parser;
use miette::Result;
use tracing::{debug, info};

use crate::{
    cli::{Args, Command, FetchArgs, MergeArgs},
    config::{Paths, Settings},
    fetch::Downloader,
    outside::{GithubRemote, HttpTransport},
};

fn main() -> Result<()> {
    // Initialize the environment & CLI
    dotenvy::dotenv().ok();
    let args = Args::parse();
    logging::init_logging(args.log_level())?;

    let settings = Settings::load(args.config.as_deref(), args.data_dir.as_deref())?;
    let paths = Paths::new(&settings.data_dir);
    debug!("Data directory: {}", settings.data_dir.display());

    match &args.command {
        Command::Fetch(fetch_args) => run_fetch(&args, fetch_args, &settings, &paths),
        Command::Merge(merge_args) => run_merge(merge_args, &paths),
    }
}

fn run_fetch(args: &Args, fetch_args: &FetchArgs, settings: &Settings, paths: &Paths) -> Result<()> {
    let transport = HttpTransport::new(args.credentials(), settings.timeout())?;
    let remote = GithubRemote::new(&transport, &settings.remote);
    let downloader = Downloader::new(&remote, paths);

    if !fetch_args.skip_details {
        downloader.download_video_details()?;
    }

    if !fetch_args.skip_transcripts {
        let strategy = fetch_args.listing.unwrap_or(settings.remote.listing);
        downloader.download_transcripts(strategy)?;
    }

    info!("Fetch completed");
    Ok(())
}

fn run_merge(merge_args: &MergeArgs, paths: &Paths) -> Result<()> {
    let input = merge_args
        .input
        .clone()
        .unwrap_or_else(|| paths.video_details_file());
    let output = merge_args
        .output
        .clone()
        .unwrap_or_else(|| paths.processed_file());

    merge::merge_files(&input, &paths.transcripts_dir, &output)?;

    info!("Merge completed");
    Ok(())
}
