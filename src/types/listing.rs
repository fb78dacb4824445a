use clap::ValueEnum;
use serde::Deserialize;

/// How to enumerate the transcript files of the remote repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListingStrategy {
    /// Recursive listing of the whole repository tree, filtered by directory.
    /// Not subject to the item cap of directory listings.
    #[default]
    Tree,

    /// Listing of the immediate children of the directory.
    /// The remote API caps it at 1000 items.
    Flat,
}
