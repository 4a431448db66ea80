//! Local bundle enumeration for uploads.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, StagingError};

/// A file inside a bundle and its path relative to the bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub path: PathBuf,
    /// Forward-slash separated, used as the remote path
    pub relative: String,
}

/// List every regular file under `bundle_dir`, sorted by relative path.
pub fn bundle_files(bundle_dir: &Path) -> Result<Vec<BundleFile>> {
    if !bundle_dir.is_dir() {
        return Err(StagingError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Bundle directory not found: {}", bundle_dir.display()),
        )));
    }

    let root = glob::Pattern::escape(&bundle_dir.to_string_lossy());
    let pattern = format!("{root}/**/*");
    let entries = glob::glob(&pattern)
        .map_err(|e| StagingError::Config(format!("Invalid bundle path: {e}")))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StagingError::Io(e.into_error()))?;
        if !path.is_file() {
            continue;
        }
        let relative = match path.strip_prefix(bundle_dir) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => continue,
        };
        files.push(BundleFile { path, relative });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}
