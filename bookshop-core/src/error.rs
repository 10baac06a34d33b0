//! Error types for Bookshop Core

use crate::registry::Stage;
use crate::types::OutputFormat;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using BookshopError
pub type Result<T> = std::result::Result<T, BookshopError>;

/// Top-level error type for all Bookshop operations
#[derive(Debug, Error)]
pub enum BookshopError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormatError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while loading `config/book.yml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("malformed configuration in {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A format name that is neither canonical nor an alias
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Command not recognized: {name}")]
pub struct UnknownFormatError {
    pub name: String,
}

/// Classification of template failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// The template or an imported file does not exist
    NotFound,
    /// Malformed or unterminated tag or expression
    SyntaxError,
    /// Well-formed expression that cannot be evaluated (undefined variable, bad operand)
    Evaluation,
    /// An import refers to a file that is still being resolved
    ImportCycle,
    /// Import nesting went past the configured limit
    DepthExceeded,
}

impl fmt::Display for TemplateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::SyntaxError => "syntax error",
            Self::Evaluation => "evaluation error",
            Self::ImportCycle => "import cycle",
            Self::DepthExceeded => "import depth exceeded",
        };
        f.write_str(s)
    }
}

/// Failure to resolve a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template {kind} in {}: {cause}", path.display())]
pub struct TemplateError {
    pub kind: TemplateErrorKind,
    /// Path of the template (relative to the book-source root) that failed
    pub path: PathBuf,
    pub cause: String,
}

impl TemplateError {
    pub fn new(kind: TemplateErrorKind, path: impl Into<PathBuf>, cause: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            cause: cause.into(),
        }
    }

    pub fn not_found(path: impl Into<PathBuf>, cause: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::NotFound, path, cause)
    }

    pub fn syntax(path: impl Into<PathBuf>, cause: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::SyntaxError, path, cause)
    }

    pub fn evaluation(path: impl Into<PathBuf>, cause: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Evaluation, path, cause)
    }
}

/// Device conversion requested on a host with no known converter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no device converter available for platform '{platform}'")]
pub struct UnsupportedPlatformError {
    pub platform: String,
}

/// Failure of an external tool invocation
#[derive(Debug, Error)]
pub enum ExternalToolError {
    #[error("{tool} ({program}) exited with {status}")]
    Failed {
        tool: String,
        program: String,
        status: String,
    },

    #[error("failed to launch {tool} ({program}): {source}")]
    Spawn {
        tool: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} ({program}) timed out after {seconds}s")]
    TimedOut {
        tool: String,
        program: String,
        seconds: u64,
    },

    #[error("{tool} ({program}) was cancelled")]
    Cancelled { tool: String, program: String },

    #[error("{tool} has no configured command")]
    NotConfigured { tool: String },
}

/// Errors raised inside a single pipeline stage
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("required source missing: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive error: {0}")]
    Archive(String),

    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatformError),

    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),

    #[error("build cancelled")]
    Cancelled,

    #[error("build context is for {context}, but the stages are for {spec}")]
    FormatMismatch {
        spec: OutputFormat,
        context: OutputFormat,
    },
}

impl StageError {
    /// Error class, as reported in stage results
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::Template(_) => "TemplateError",
            StageError::MissingSource(_) => "MissingSource",
            StageError::Io { .. } => "IoError",
            StageError::Archive(_) => "ArchiveError",
            StageError::UnsupportedPlatform(_) => "UnsupportedPlatformError",
            StageError::ExternalTool(_) => "ExternalToolError",
            StageError::Cancelled => "Cancelled",
            StageError::FormatMismatch { .. } => "FormatMismatch",
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// A pipeline halted at `stage`
#[derive(Debug, Error)]
#[error("{stage} failed: {cause}")]
pub struct BuildError {
    pub stage: Stage,
    #[source]
    pub cause: StageError,
}

impl BuildError {
    /// Whether the failing stage reported a template of the given kind
    pub fn is_template(&self, kind: TemplateErrorKind) -> bool {
        matches!(&self.cause, StageError::Template(e) if e.kind == kind)
    }
}
