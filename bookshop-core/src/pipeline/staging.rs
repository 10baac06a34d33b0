//! Filesystem helpers for cleaning and staging build directories

use crate::error::StageError;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Remove everything inside `dir`, creating it if it does not exist
///
/// Safe to call repeatedly; an empty or missing directory is not an error.
pub fn clean_dir(dir: &Path) -> Result<(), StageError> {
    if !dir.exists() {
        return fs::create_dir_all(dir).map_err(|e| StageError::io("creating", dir, e));
    }

    let entries = fs::read_dir(dir).map_err(|e| StageError::io("reading", dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StageError::io("reading", dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| StageError::io("inspecting", &path, e))?;
        let result = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| StageError::io("removing", &path, e))?;
        tracing::debug!("Removed {}", path.display());
    }
    Ok(())
}

/// Recursively copy the directory `src` to `dest`
///
/// `dest` is created if needed; existing files are overwritten.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<usize, StageError> {
    if !src.is_dir() {
        return Err(StageError::MissingSource(src.to_path_buf()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            StageError::io("walking", path, e.into())
        })?;
        let rel = relative(entry.path(), src)?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| StageError::io("creating", &target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| StageError::io("copying", entry.path(), e))?;
            tracing::debug!("{} -> {}", entry.path().display(), target.display());
            copied += 1;
        }
    }
    Ok(copied)
}

/// `path` relative to `base`
pub(crate) fn relative<'a>(path: &'a Path, base: &Path) -> Result<&'a Path, StageError> {
    path.strip_prefix(base).map_err(|e| {
        StageError::io(
            "resolving",
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        )
    })
}

/// Copy a single file, failing with `MissingSource` if it does not exist
pub fn copy_file(src: &Path, dest: &Path) -> Result<(), StageError> {
    if !src.is_file() {
        return Err(StageError::MissingSource(src.to_path_buf()));
    }
    fs::copy(src, dest).map_err(|e| StageError::io("copying", src, e))?;
    tracing::debug!("{} -> {}", src.display(), dest.display());
    Ok(())
}

/// Delete the named stylesheets from `css_dir`
///
/// Returns the names that were not present.
pub fn prune_stylesheets(css_dir: &Path, names: &[String]) -> Result<Vec<String>, StageError> {
    let mut missing = Vec::new();
    for name in names {
        let path = css_dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => missing.push(name.clone()),
            Err(e) => return Err(StageError::io("removing", path, e)),
        }
    }
    Ok(missing)
}
