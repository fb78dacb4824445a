use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use miette::{Context, IntoDiagnostic, Result};

/// Write the content to the path, replacing any existing file.
///
/// The content is first written to a temporary file in the destination directory
/// which is then renamed over the destination, so an interrupted write never
/// leaves a truncated file behind. Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not create directory {}", dir.display()))?;

    let mut file = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)
        .into_diagnostic()
        .wrap_err("Could not create temporary file")?;

    file.write_all(contents)
        .and_then(|_| file.flush())
        .into_diagnostic()
        .wrap_err("Could not write temporary file")?;

    file.persist(path)
        .map_err(|err| err.error)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not write {}", path.display()))?;

    Ok(())
}

/// List the regular files directly inside the directory, sorted by path.
///
/// Symbolic links are followed: a link to a regular file is listed.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = dir
        .read_dir()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.into_diagnostic()?.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
