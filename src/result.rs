use std::fmt::Display;

use miette::{miette, Report};

/// Failure to retrieve one remote file.
///
/// Only a missing download URL lets the download run go on with the next file.
#[derive(Debug)]
pub enum Error {
    /// The remote listed the file without any way to download it.
    /// Contains the remote path of the file.
    MissingDownloadUrl(String),

    Fatal(Report),
}

impl From<Report> for Error {
    fn from(err: Report) -> Self {
        Error::Fatal(err)
    }
}

impl Error {
    /// Give up on the error: turn it into a report with the context on top
    pub fn into_fatal<D>(self, context: D) -> Report
    where
        D: Display + Send + Sync + 'static,
    {
        let report = match self {
            Error::MissingDownloadUrl(path) => miette!(
                help = "the remote may only serve this file through its blob API",
                "Download URL not found for '{path}'"
            ),
            Error::Fatal(report) => report,
        };

        report.wrap_err(context)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
