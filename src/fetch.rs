use std::{
    fs,
    path::{Path, PathBuf},
};

use miette::{Context, IntoDiagnostic, Result};
use tracing::{debug, info, warn};

use crate::{
    config::Paths,
    io::write_atomic,
    outside::GithubRemote,
    result::{self, Error},
    types::{ListingStrategy, LocalFileIndex, RemoteFileEntry},
};

/// Counters of a transcript download run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped_existing: usize,
    /// Entries that could not be downloaded: no download URL or no usable file name
    pub skipped_unavailable: usize,
}

pub struct Downloader<'a> {
    remote: &'a GithubRemote<'a>,
    paths: &'a Paths,
}

impl<'a> Downloader<'a> {
    pub fn new(remote: &'a GithubRemote<'a>, paths: &'a Paths) -> Self {
        Self { remote, paths }
    }

    /// Download the video details file, replacing the local copy.
    /// Return the path of the written file.
    pub fn download_video_details(&self) -> Result<PathBuf> {
        let remote_path = &self.remote.settings().video_details_path;

        let url = self
            .remote
            .file_download_url(remote_path)
            .map_err(|err| err.into_fatal("Could not get the video details metadata"))?;

        let content = self
            .remote
            .download(&url)
            .wrap_err("Could not download the video details")?;

        let path = self.paths.video_details_file();
        write_atomic(&path, content.as_bytes())?;

        info!("Downloaded video details to {}", path.display());
        Ok(path)
    }

    /// Download every remote transcript missing from the local transcripts directory
    pub fn download_transcripts(&self, strategy: ListingStrategy) -> Result<DownloadReport> {
        let remote_dir = &self.remote.settings().transcripts_dir;

        debug!("Listing remote transcripts with the {strategy:?} strategy");
        let entries = self
            .remote
            .list(strategy, remote_dir)
            .wrap_err("Could not list the remote transcripts")?;
        info!("{} transcripts available on the remote", entries.len());

        let report = download_missing(self.remote, &entries, &self.paths.transcripts_dir)?;
        info!(
            "{} transcripts downloaded, {} already present, {} unavailable",
            report.downloaded, report.skipped_existing, report.skipped_unavailable
        );

        Ok(report)
    }
}

/// Download the entries whose file name is not already in the directory.
///
/// The first entry wins when several entries share the same file name.
pub fn download_missing(
    remote: &GithubRemote,
    entries: &[RemoteFileEntry],
    dir: &Path,
) -> Result<DownloadReport> {
    fs::create_dir_all(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not create directory {}", dir.display()))?;

    let mut index = LocalFileIndex::scan(dir)?;
    debug!("{} files already in {}", index.len(), dir.display());

    let mut report = DownloadReport::default();

    for entry in entries {
        let Some(name) = entry.file_name() else {
            warn!("Remote entry '{}' has no file name. Skipping it", entry.path);
            report.skipped_unavailable += 1;
            continue;
        };

        if index.contains(name) {
            info!("Skipping {name} (already downloaded)");
            report.skipped_existing += 1;
            continue;
        }

        let path = dir.join(name);
        match download_entry(remote, entry, &path) {
            Ok(()) => {
                info!("Downloaded transcript {}", path.display());
                index.insert(name.to_owned());
                report.downloaded += 1;
            }
            Err(Error::MissingDownloadUrl(remote_path)) => {
                warn!("No download URL for '{remote_path}'. Skipping it");
                report.skipped_unavailable += 1;
            }
            Err(err) => return Err(err.into_fatal(format!("Could not download '{}'", entry.path))),
        }
    }

    Ok(report)
}

fn download_entry(
    remote: &GithubRemote,
    entry: &RemoteFileEntry,
    path: &Path,
) -> result::Result<()> {
    let url = entry.download_url()?;
    let content = remote.download(url)?;
    write_atomic(path, content.as_bytes())?;
    Ok(())
}
