use std::{collections::BTreeSet, path::Path};

use miette::Result;

use crate::io::list_files;

/// Names of the files already present in a local directory.
///
/// Rebuilt from the directory content at the start of every download run.
#[derive(Debug, Default)]
pub struct LocalFileIndex {
    names: BTreeSet<String>,
}

impl LocalFileIndex {
    /// Index the regular files of the directory.
    /// File names that are not valid UTF-8 cannot match a remote name and are ignored.
    pub fn scan(dir: &Path) -> Result<Self> {
        let names = list_files(dir)?
            .into_iter()
            .filter_map(|path| path.file_name()?.to_str().map(str::to_owned))
            .collect();

        Ok(Self { names })
    }

    /// Record a new file. Return false if it was already known.
    pub fn insert(&mut self, name: String) -> bool {
        self.names.insert(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
