//! Core types shared by the template engine and the build pipeline

mod config;
mod context;
mod format;

pub use config::{BookConfig, Chapter, KindlegenConfig, ToolConfig, CONFIG_PATH};
pub use context::{BuildContext, SOURCE_DIR};
pub use format::OutputFormat;
