//! EPUB container packaging

use super::staging::relative;
use crate::error::StageError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the container's media-type entry
pub const MIMETYPE: &str = "mimetype";

/// Suffix of file names never added to an archive
const IGNORED_SUFFIX: &str = ".DS_Store";

/// Produces a single archive from a staged build directory
pub trait Archiver: Send + Sync {
    /// Archive the contents of `source_dir` into `archive`
    fn archive(&self, source_dir: &Path, archive: &Path) -> Result<(), StageError>;
}

/// Zip archiver following the EPUB container rules
///
/// `mimetype` is written first and stored uncompressed; every other file
/// follows in name order at maximum deflate compression. Directory
/// entries, OS metadata files and the archive itself are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

fn zip_error(e: zip::result::ZipError) -> StageError {
    StageError::Archive(e.to_string())
}

impl Archiver for ZipArchiver {
    fn archive(&self, source_dir: &Path, archive: &Path) -> Result<(), StageError> {
        let mimetype_path = source_dir.join(MIMETYPE);
        let mimetype = std::fs::read(&mimetype_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StageError::MissingSource(mimetype_path.clone()),
            _ => StageError::io("reading", &mimetype_path, e),
        })?;

        let file = File::create(archive).map_err(|e| StageError::io("creating", archive, e))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));

        let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9));

        writer.start_file(MIMETYPE, stored).map_err(zip_error)?;
        writer
            .write_all(&mimetype)
            .map_err(|e| StageError::io("writing", archive, e))?;

        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source_dir).to_path_buf();
                StageError::io("walking", path, e.into())
            })?;
            if !entry.file_type().is_file() || entry.path() == archive {
                continue;
            }

            let rel = relative(entry.path(), source_dir)?;
            let file_name = entry.file_name().to_string_lossy();
            if rel == Path::new(MIMETYPE) || file_name.ends_with(IGNORED_SUFFIX) {
                continue;
            }

            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let data = std::fs::read(entry.path())
                .map_err(|e| StageError::io("reading", entry.path(), e))?;

            writer.start_file(name.as_str(), deflated).map_err(zip_error)?;
            writer
                .write_all(&data)
                .map_err(|e| StageError::io("writing", archive, e))?;
            tracing::debug!("Added {} to {}", name, archive.display());
        }

        let mut inner = writer.finish().map_err(zip_error)?;
        inner.flush().map_err(|e| StageError::io("writing", archive, e))?;
        Ok(())
    }
}
