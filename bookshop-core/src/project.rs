//! Build orchestration: format lookup, config loading, pipeline execution

use crate::error::{BuildError, ConfigError, Result};
use crate::pipeline::{BuildReport, Pipeline, ProcessRunner};
use crate::registry::{self, FormatSpec};
use crate::types::{BookConfig, BuildContext};
use std::path::{Path, PathBuf};

/// A book project rooted at a directory containing `config/` and `book/`
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: BookConfig,
}

impl Project {
    /// Load `config/book.yml` beneath `root`
    pub fn open(root: impl Into<PathBuf>) -> std::result::Result<Self, ConfigError> {
        let root = root.into();
        let config = BookConfig::load(&root)?;
        Ok(Self { root, config })
    }

    /// Project with an already-loaded configuration
    pub fn with_config(root: impl Into<PathBuf>, config: BookConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Build context for one format
    pub fn context(&self, spec: &FormatSpec) -> BuildContext {
        BuildContext::new(spec.format, &self.root, spec.build_dir, self.config.clone())
    }

    /// Pipeline with real tools, honouring the configured tool timeout
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new().with_runner(ProcessRunner::new().with_timeout(self.config.tools.timeout()))
    }

    /// Build a format by name or alias with the default tools
    pub fn build(&self, format_name: &str) -> Result<BuildReport> {
        let spec = registry::lookup(format_name)?;
        Ok(self.build_with(spec, &self.pipeline())?)
    }

    /// Run `pipeline` for `spec`
    pub fn build_with(
        &self,
        spec: &FormatSpec,
        pipeline: &Pipeline,
    ) -> std::result::Result<BuildReport, BuildError> {
        let ctx = self.context(spec);
        pipeline.run(spec, &ctx)
    }
}

/// Build `format_name` for the project at `root` with the default tools
///
/// The format is resolved before anything is read or written, so an unknown
/// name leaves the project untouched.
pub fn build(root: impl Into<PathBuf>, format_name: &str) -> Result<BuildReport> {
    let spec = registry::lookup(format_name)?;
    let project = Project::open(root)?;
    let report = project.build_with(spec, &project.pipeline())?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookshopError;
    use std::fs;
    use tempfile::TempDir;

    fn html_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::create_dir_all(dir.path().join("book/assets")).unwrap();
        fs::write(dir.path().join("config/book.yml"), "title: T\nauthor: A\n").unwrap();
        fs::write(dir.path().join("book/book.html.erb"), "<title><%= title %></title>\n").unwrap();
        dir
    }

    #[test]
    fn test_project_build_by_name() {
        let dir = html_project();
        let project = Project::open(dir.path()).unwrap();
        let report = project.build("html").unwrap();

        assert_eq!(report.artifact, dir.path().join("builds/html/book.html"));
        assert_eq!(fs::read_to_string(&report.artifact).unwrap(), "<title>T</title>");
    }

    #[test]
    fn test_unknown_name_on_open_project() {
        let dir = html_project();
        let project = Project::open(dir.path()).unwrap();
        let err = project.build("azw3").unwrap_err();

        assert!(matches!(err, BookshopError::UnknownFormat(_)));
        assert!(!dir.path().join("builds").exists());
    }

    #[test]
    fn test_missing_config() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
