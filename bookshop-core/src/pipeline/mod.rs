//! Build pipeline
//!
//! Runs the stage list of a [`FormatSpec`] against a [`BuildContext`],
//! strictly in order. The first fatal stage failure halts the build;
//! completed stages are not rolled back (the next build's `Clean` stage
//! is the recovery path). Validation failures are advisory and only
//! recorded as warnings.
//!
//! Builds are not safe to run concurrently against the same build directory.

mod package;
mod staging;
mod tools;

pub use package::{Archiver, ZipArchiver, MIMETYPE};
pub use staging::{clean_dir, copy_dir, copy_file, prune_stylesheets};
pub use tools::{Platform, ProcessRunner, ToolInvocation, ToolOutcome, ToolRunner};

use crate::error::{BuildError, StageError};
use crate::registry::{FormatSpec, Stage, RENDERED_BOOK};
use crate::template::{Binding, TemplateEngine, DEFAULT_MAX_DEPTH};
use crate::types::{BuildContext, OutputFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a whole pipeline run
pub type BuildResult = Result<BuildReport, BuildError>;

/// Outcome of a single stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageResult {
    Success {
        /// File the stage produced, if any
        artifact: Option<PathBuf>,
        warnings: Vec<String>,
    },
    Failure {
        kind: &'static str,
        message: String,
    },
}

impl StageResult {
    fn failure(error: &StageError) -> Self {
        StageResult::Failure {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StageResult::Success { .. })
    }
}

/// A finished stage and its result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub result: StageResult,
}

/// Summary of a successful build
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub format: OutputFormat,
    /// Final artifact path
    pub artifact: PathBuf,
    pub stages: Vec<StageRecord>,
}

impl BuildReport {
    /// Every warning recorded by any stage
    pub fn warnings(&self) -> impl Iterator<Item = (Stage, &str)> + '_ {
        self.stages.iter().flat_map(|record| {
            let warnings: &[String] = match &record.result {
                StageResult::Success { warnings, .. } => warnings,
                StageResult::Failure { .. } => &[],
            };
            warnings.iter().map(move |w| (record.stage, w.as_str()))
        })
    }
}

/// Hook for progress reporting
pub trait StageObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage, _result: &StageResult) {}
}

/// Output of a successful stage
#[derive(Debug, Default)]
struct StageOutput {
    artifact: Option<PathBuf>,
    warnings: Vec<String>,
}

impl StageOutput {
    fn artifact(path: PathBuf) -> Self {
        Self {
            artifact: Some(path),
            warnings: Vec::new(),
        }
    }
}

/// Sequential stage executor
pub struct Pipeline {
    runner: Box<dyn ToolRunner>,
    archiver: Box<dyn Archiver>,
    platform: Platform,
    observer: Option<Box<dyn StageObserver>>,
    cancel: Option<Arc<AtomicBool>>,
    max_import_depth: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline with real processes, the zip archiver, and the host platform
    pub fn new() -> Self {
        Self {
            runner: Box::new(ProcessRunner::new()),
            archiver: Box::new(ZipArchiver::new()),
            platform: Platform::current(),
            observer: None,
            cancel: None,
            max_import_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_archiver(mut self, archiver: impl Archiver + 'static) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    /// Override the platform used to pick the device converter
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_observer(mut self, observer: impl StageObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Stop before the next stage once `flag` becomes true
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }

    /// Run every stage of `spec` in order
    ///
    /// Fails at the first stage, before touching the build directory, when
    /// `ctx` was created for a different format than `spec`.
    pub fn run(&self, spec: &FormatSpec, ctx: &BuildContext) -> BuildResult {
        if spec.format != ctx.format() {
            return Err(BuildError {
                stage: spec.stages.first().copied().unwrap_or(Stage::Clean),
                cause: StageError::FormatMismatch {
                    spec: spec.format,
                    context: ctx.format(),
                },
            });
        }
        tracing::info!("Building {} into {}", spec.name(), ctx.build_dir().display());

        let env = StageEnv::new(spec, ctx, self.max_import_depth);
        let mut records = Vec::with_capacity(spec.stages.len());

        for &stage in spec.stages {
            if self.is_cancelled() {
                return Err(BuildError {
                    stage,
                    cause: StageError::Cancelled,
                });
            }
            if let Some(observer) = &self.observer {
                observer.stage_started(stage);
            }

            let result = match self.execute(stage, &env) {
                Ok(output) => StageResult::Success {
                    artifact: output.artifact,
                    warnings: output.warnings,
                },
                Err(cause) if stage.is_advisory() => {
                    tracing::warn!("{} reported a problem: {}", stage, cause);
                    StageResult::Success {
                        artifact: None,
                        warnings: vec![cause.to_string()],
                    }
                }
                Err(cause) => {
                    tracing::error!("{} failed: {}", stage, cause);
                    if let Some(observer) = &self.observer {
                        observer.stage_finished(stage, &StageResult::failure(&cause));
                    }
                    return Err(BuildError { stage, cause });
                }
            };

            if let Some(observer) = &self.observer {
                observer.stage_finished(stage, &result);
            }
            records.push(StageRecord { stage, result });
        }

        let artifact = ctx.build_dir().join(spec.artifact);
        tracing::info!("Built {}", artifact.display());
        Ok(BuildReport {
            format: spec.format,
            artifact,
            stages: records,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn execute(&self, stage: Stage, env: &StageEnv<'_>) -> Result<StageOutput, StageError> {
        match stage {
            Stage::Clean => env.clean(),
            Stage::ScaffoldContainer => env.scaffold_container(),
            Stage::RenderBook
            | Stage::RenderCover
            | Stage::RenderNav
            | Stage::RenderPackageDocument
            | Stage::RenderNavigationControlFile => env.render(stage),
            Stage::CopyAssets => env.copy_assets(),
            Stage::Package => env.package(self.archiver.as_ref()),
            Stage::Validate => env.validate(self.runner.as_ref()),
            Stage::ConvertToDevice => env.convert_to_device(self.runner.as_ref(), &self.platform),
            Stage::ConvertToPdf => env.convert_to_pdf(self.runner.as_ref()),
        }
    }
}

/// Paths and services shared by the stages of one run
struct StageEnv<'a> {
    spec: &'a FormatSpec,
    ctx: &'a BuildContext,
    engine: TemplateEngine,
    binding: Binding,
    content_dir: PathBuf,
}

impl<'a> StageEnv<'a> {
    fn new(spec: &'a FormatSpec, ctx: &'a BuildContext, max_import_depth: usize) -> Self {
        Self {
            spec,
            ctx,
            engine: TemplateEngine::new(ctx.source_root()).with_max_depth(max_import_depth),
            binding: Binding::for_build(ctx),
            content_dir: ctx.build_dir().join(spec.content_dir),
        }
    }

    fn build_dir(&self) -> &Path {
        self.ctx.build_dir()
    }

    fn archive_path(&self) -> Result<PathBuf, StageError> {
        self.spec
            .archive
            .map(|name| self.build_dir().join(name))
            .ok_or_else(|| StageError::MissingSource(self.build_dir().join("book.epub")))
    }

    fn clean(&self) -> Result<StageOutput, StageError> {
        tracing::info!("Deleting any old builds");
        clean_dir(self.build_dir())?;
        Ok(StageOutput::default())
    }

    fn scaffold_container(&self) -> Result<StageOutput, StageError> {
        let packaging = self.ctx.source_root().join("epub");
        tracing::info!("Copying container files from {}", packaging.display());

        copy_dir(&packaging.join("META-INF"), &self.build_dir().join("META-INF"))?;
        std::fs::create_dir_all(&self.content_dir)
            .map_err(|e| StageError::io("creating", &self.content_dir, e))?;
        copy_file(&packaging.join(MIMETYPE), &self.build_dir().join(MIMETYPE))?;
        Ok(StageOutput::default())
    }

    fn render(&self, stage: Stage) -> Result<StageOutput, StageError> {
        let Some((template, output)) = stage.render_target() else {
            return Ok(StageOutput::default());
        };
        tracing::info!("Generating new {} from {}", output, template);

        let text = self.engine.resolve(template, &self.binding)?;
        let dest = self.content_dir.join(output);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StageError::io("creating", parent, e))?;
        }
        // Truncate-or-create: output never accumulates across runs
        std::fs::write(&dest, text).map_err(|e| StageError::io("writing", &dest, e))?;
        Ok(StageOutput::artifact(dest))
    }

    fn copy_assets(&self) -> Result<StageOutput, StageError> {
        let src = self.ctx.source_root().join("assets");
        let dest = self.content_dir.join("assets");
        tracing::info!("Copying assets to {}", dest.display());

        let copied = copy_dir(&src, &dest)?;
        tracing::debug!("Copied {} asset files", copied);

        let mut output = StageOutput::default();
        let pruned = self.spec.pruned_stylesheets();
        if !pruned.is_empty() {
            for name in prune_stylesheets(&dest.join("css"), &pruned)? {
                tracing::warn!("Stylesheet {} not found, nothing to remove", name);
                output.warnings.push(format!("stylesheet {} was not present", name));
            }
        }
        Ok(output)
    }

    fn package(&self, archiver: &dyn Archiver) -> Result<StageOutput, StageError> {
        let archive = self.archive_path()?;
        tracing::info!("Zipping up into {}", archive.display());
        archiver.archive(self.build_dir(), &archive)?;
        Ok(StageOutput::artifact(archive))
    }

    fn validate(&self, runner: &dyn ToolRunner) -> Result<StageOutput, StageError> {
        let archive = self.archive_path()?;
        tracing::info!("Validating with epubcheck");

        let tools = &self.ctx.config().tools;
        let invocation = ToolInvocation::from_command("epubcheck", &tools.epubcheck, self.ctx.root())?
            .arg(&archive);
        runner.run(&invocation)?.check(&invocation)?;
        Ok(StageOutput::default())
    }

    fn convert_to_device(
        &self,
        runner: &dyn ToolRunner,
        platform: &Platform,
    ) -> Result<StageOutput, StageError> {
        let converter = self.ctx.config().tools.kindlegen.for_platform(platform)?;
        let archive = self.archive_path()?;
        tracing::info!("Generating {} file with KindleGen", self.spec.format);

        let command = vec![converter.to_string_lossy().into_owned()];
        let invocation =
            ToolInvocation::from_command("kindlegen", &command, self.ctx.root())?.arg(&archive);
        runner.run(&invocation)?.check(&invocation)?;
        Ok(StageOutput::artifact(self.build_dir().join(self.spec.artifact)))
    }

    fn convert_to_pdf(&self, runner: &dyn ToolRunner) -> Result<StageOutput, StageError> {
        let input = self.content_dir.join(RENDERED_BOOK);
        let output = self.build_dir().join(self.spec.artifact);
        tracing::info!("Building new pdf at {} from new html build", output.display());

        let tools = &self.ctx.config().tools;
        let invocation = ToolInvocation::from_command("prince", &tools.prince, self.ctx.root())?
            .arg(&input)
            .arg("-o")
            .arg(&output);
        runner.run(&invocation)?.check(&invocation)?;
        Ok(StageOutput::artifact(output))
    }
}
