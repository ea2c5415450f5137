use std::path::{Path, PathBuf};

use rand::{Rng, seq::IndexedRandom};
use thiserror::Error;
use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("{} does not end with {suffix}", .path.display())]
    WrongSuffix { path: PathBuf, suffix: String },
    #[error("no files ending with {suffix} found under {}", .root.display())]
    NoMatches { root: PathBuf, suffix: String },
    #[error("could not walk {}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Suffix check on the whole path, not just the file name.
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.as_os_str().to_string_lossy().ends_with(suffix)
}

/// Every regular file below `root` whose path ends with `suffix`, sorted.
#[instrument(skip(root), fields(root = %root.display()))]
pub fn candidates(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, SelectError> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| SelectError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        // Follows file symlinks; linked directories are not descended into.
        if !entry.path().is_file() {
            continue;
        }

        if has_suffix(entry.path(), suffix) {
            trace!(path = %entry.path().display(), "found candidate");
            found.push(entry.into_path());
        }
    }

    found.sort();
    debug!(count = found.len(), "collected candidates");

    Ok(found)
}

/// Pick the file to load.
///
/// In single mode `root` is returned as-is once its suffix checks out.
/// Otherwise one matching file under `root` is drawn uniformly from `rng`.
pub fn select<R: Rng + ?Sized>(
    root: &Path,
    suffix: &str,
    single: bool,
    rng: &mut R,
) -> Result<PathBuf, SelectError> {
    if single {
        if !has_suffix(root, suffix) {
            return Err(SelectError::WrongSuffix {
                path: root.to_path_buf(),
                suffix: suffix.to_string(),
            });
        }

        return Ok(root.to_path_buf());
    }

    let found = candidates(root, suffix)?;
    found
        .choose(rng)
        .cloned()
        .ok_or_else(|| SelectError::NoMatches {
            root: root.to_path_buf(),
            suffix: suffix.to_string(),
        })
}
