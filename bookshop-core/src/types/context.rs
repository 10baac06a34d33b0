//! Per-build context threaded through every stage

use super::{BookConfig, OutputFormat};
use std::path::{Path, PathBuf};

/// Directory holding the book sources, relative to the project root
pub const SOURCE_DIR: &str = "book";

/// Everything a single build needs to know
///
/// Created once per invocation and passed by reference. The output format
/// is exposed to templates as the `output` variable.
#[derive(Debug, Clone)]
pub struct BuildContext {
    format: OutputFormat,
    root: PathBuf,
    build_dir: PathBuf,
    config: BookConfig,
}

impl BuildContext {
    /// Create a context for `format`, with `build_dir` relative to `root`
    pub fn new(
        format: OutputFormat,
        root: impl Into<PathBuf>,
        build_dir: impl AsRef<Path>,
        config: BookConfig,
    ) -> Self {
        let root = root.into();
        let build_dir = root.join(build_dir);
        Self {
            format,
            root,
            build_dir,
            config,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Project root every relative path is resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Book-source root (`<root>/book`)
    pub fn source_root(&self) -> PathBuf {
        self.root.join(SOURCE_DIR)
    }

    /// Absolute build subdirectory for this format
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }
}
