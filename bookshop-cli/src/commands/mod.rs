//! CLI command implementations

mod build;
mod progress;

pub use build::build;
