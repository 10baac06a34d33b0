//! Bookshop Core Library
//!
//! Turns a book source tree (templates, configuration, assets) into HTML,
//! EPUB, MOBI or PDF. Templates are resolved by the [`template`] engine;
//! each output format is a fixed stage list from the [`registry`], executed
//! in order by the [`pipeline`].

pub mod error;
pub mod pipeline;
pub mod project;
pub mod registry;
pub mod template;
pub mod types;

pub use error::{
    BookshopError, BuildError, ConfigError, ExternalToolError, Result, StageError, TemplateError,
    TemplateErrorKind, UnknownFormatError, UnsupportedPlatformError,
};
pub use pipeline::{BuildReport, BuildResult, Pipeline, StageObserver, StageRecord, StageResult};
pub use project::{build, Project};
pub use registry::{FormatSpec, Stage};
pub use template::{Binding, TemplateEngine, Value};
pub use types::{BookConfig, BuildContext, Chapter, OutputFormat, ToolConfig};
