use miette::{Context, IntoDiagnostic, Result};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use super::Transport;
use crate::{
    config::RemoteSettings,
    result::{self, Error},
    types::{ListingStrategy, RemoteFileEntry},
};

/// Response of the contents API for a single file
#[derive(Debug, Deserialize)]
struct FileMetadata {
    download_url: Option<String>,
}

/// One item of a contents API directory listing
#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    download_url: Option<String>,
}

/// Response of the Git Trees API
#[derive(Debug, Deserialize)]
struct Tree {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

/// Read access to a GitHub repository, at a fixed branch
pub struct GithubRemote<'a> {
    transport: &'a dyn Transport,
    settings: &'a RemoteSettings,
}

impl<'a> GithubRemote<'a> {
    pub fn new(transport: &'a dyn Transport, settings: &'a RemoteSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &RemoteSettings {
        self.settings
    }

    /// Fetch raw content, e.g. from a download URL
    pub fn download(&self, url: &str) -> Result<String> {
        self.transport.get_text(url)
    }

    /// Find the download URL of the file at the given repository path.
    ///
    /// Return [`Error::MissingDownloadUrl`] if the remote does not give any.
    pub fn file_download_url(&self, path: &str) -> result::Result<String> {
        let metadata: FileMetadata = self.get_json(&self.contents_url(path))?;

        metadata
            .download_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::MissingDownloadUrl(path.to_owned()))
    }

    /// List the files under the directory with the given strategy
    pub fn list(&self, strategy: ListingStrategy, dir: &str) -> Result<Vec<RemoteFileEntry>> {
        match strategy {
            ListingStrategy::Tree => self.list_tree(dir),
            ListingStrategy::Flat => self.list_directory(dir),
        }
    }

    /// List every file under the directory, at any depth, from the recursive repository tree.
    /// An empty directory stands for the repository root.
    ///
    /// Download URLs point to the raw content of the files at the configured branch.
    pub fn list_tree(&self, dir: &str) -> Result<Vec<RemoteFileEntry>> {
        let s = self.settings;
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            s.api_base.trim_end_matches('/'),
            s.owner,
            s.repo,
            s.branch
        );

        let tree: Tree = self.get_json(&url)?;
        if tree.truncated {
            warn!("The remote tree listing is truncated, some files may be missing");
        }

        let prefix = match dir.trim_matches('/') {
            "" => String::new(),
            dir => format!("{dir}/"),
        };
        let entries: Vec<_> = tree
            .tree
            .into_iter()
            .filter(|item| item.kind == "blob" && item.path.starts_with(&prefix))
            .map(|item| {
                let url = self.raw_url(&item.path);
                RemoteFileEntry::new(item.path, Some(url))
            })
            .collect();

        debug!("{} files under '{prefix}' in the remote tree", entries.len());
        Ok(entries)
    }

    /// List the files directly inside the directory.
    ///
    /// The contents API truncates listings to 1000 items,
    /// prefer [`Self::list_tree`] for larger directories.
    pub fn list_directory(&self, dir: &str) -> Result<Vec<RemoteFileEntry>> {
        let dir = dir.trim_matches('/');
        let items: Vec<ContentItem> = self.get_json(&self.contents_url(dir))?;

        let entries: Vec<_> = items
            .into_iter()
            .filter(|item| item.kind == "file")
            .map(|item| {
                let path = if dir.is_empty() {
                    item.name
                } else {
                    format!("{dir}/{}", item.name)
                };
                RemoteFileEntry::new(path, item.download_url)
            })
            .collect();

        debug!("{} files in remote directory '{dir}'", entries.len());
        Ok(entries)
    }

    fn contents_url(&self, path: &str) -> String {
        let s = self.settings;
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            s.api_base.trim_end_matches('/'),
            s.owner,
            s.repo,
            path.trim_matches('/'),
            s.branch
        )
    }

    fn raw_url(&self, path: &str) -> String {
        let s = self.settings;
        format!(
            "{}/{}/{}/{}/{}",
            s.raw_base.trim_end_matches('/'),
            s.owner,
            s.repo,
            s.branch,
            path
        )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.transport.get_text(url)?;
        serde_json::from_str(&body)
            .into_diagnostic()
            .wrap_err_with(|| format!("Unexpected response from {url}"))
    }
}
