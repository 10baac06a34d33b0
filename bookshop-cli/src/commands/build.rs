//! Build command implementation

use super::progress::StageSpinner;
use anyhow::{Context, Result};
use bookshop_core::registry;
use bookshop_core::Project;
use std::path::Path;
use std::process::ExitCode;

/// Exit status for an unrecognized format token
const EXIT_USAGE: u8 = 2;

/// Build one format of the project at `root`
pub fn build(root: &Path, format: Option<&str>, json: bool) -> Result<ExitCode> {
    let name = match format {
        None | Some("-h") | Some("--help") => {
            print!("{}", registry::usage());
            return Ok(ExitCode::SUCCESS);
        }
        Some(name) => name,
    };

    // Resolve the format before touching the project
    let spec = match registry::lookup(name) {
        Ok(spec) => spec,
        Err(e) => {
            tracing::debug!("{}", e);
            eprintln!("Error: Command not recognized");
            eprint!("{}", registry::usage());
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    let project = Project::open(root)
        .with_context(|| format!("Failed to load project at {}", root.display()))?;
    tracing::info!(
        "Building '{}' by {} as {}",
        project.config().title,
        project.config().author,
        spec.name()
    );

    let spinner = StageSpinner::new(spec.name());
    let pipeline = project.pipeline().with_observer(spinner.observer());
    let report = match project.build_with(spec, &pipeline) {
        Ok(report) => report,
        Err(e) => {
            spinner.abandon();
            return Err(e).with_context(|| format!("Failed to build {}", spec.name()));
        }
    };

    let warnings = report.warnings().count();
    spinner.finish(format!(
        "Built {} -> {}{}",
        spec.name(),
        report.artifact.display(),
        match warnings {
            0 => String::new(),
            n => format!(" ({} warnings)", n),
        }
    ));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.artifact.display());
    }
    Ok(ExitCode::SUCCESS)
}
