use crate::result::{Error, Result};

/// A file available on the remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileEntry {
    /// Path relative to the repository root
    pub path: String,
    pub download_url: Option<String>,
}

impl RemoteFileEntry {
    pub fn new(path: impl Into<String>, download_url: Option<String>) -> Self {
        Self {
            path: path.into(),
            download_url,
        }
    }

    /// Name of the local file: the last segment of the path.
    ///
    /// Return None if the path does not end with a usable file name.
    pub fn file_name(&self) -> Option<&str> {
        self.path
            .rsplit('/')
            .next()
            .filter(|name| !matches!(*name, "" | "." | ".."))
    }

    /// Return [`Error::MissingDownloadUrl`] if the entry cannot be downloaded.
    pub fn download_url(&self) -> Result<&str> {
        self.download_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::MissingDownloadUrl(self.path.clone()))
    }
}
