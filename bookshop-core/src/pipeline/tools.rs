//! External tool invocation
//!
//! The pipeline only depends on the invocation contract of its tools: a
//! program, its arguments, and the exit status. [`ToolRunner`] is the seam
//! between the two; [`ProcessRunner`] is the real implementation.

use crate::error::{ExternalToolError, UnsupportedPlatformError};
use crate::types::KindlegenConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A fully specified tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Human-readable tool name for logs and errors (e.g. "epubcheck")
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub current_dir: PathBuf,
}

impl ToolInvocation {
    /// Build an invocation from a configured command line (`program` + leading args)
    ///
    /// Relative programs with a directory part are resolved against `root`;
    /// bare names are looked up on `PATH`.
    pub fn from_command(
        tool: impl Into<String>,
        command: &[String],
        root: &Path,
    ) -> Result<Self, ExternalToolError> {
        let tool = tool.into();
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ExternalToolError::NotConfigured { tool: tool.clone() })?;
        Ok(Self {
            tool,
            program: resolve_program(root, Path::new(program)),
            args: args.iter().map(OsString::from).collect(),
            current_dir: root.to_path_buf(),
        })
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn program_display(&self) -> String {
        self.program.display().to_string()
    }
}

fn resolve_program(root: &Path, program: &Path) -> PathBuf {
    if program.is_relative() && program.components().count() > 1 {
        root.join(program)
    } else {
        program.to_path_buf()
    }
}

/// Exit status of a finished tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOutcome {
    /// Exit code; `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl ToolOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn exit(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into an error
    pub fn check(self, invocation: &ToolInvocation) -> Result<(), ExternalToolError> {
        if self.is_success() {
            return Ok(());
        }
        let status = match self.code {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        };
        Err(ExternalToolError::Failed {
            tool: invocation.tool.clone(),
            program: invocation.program_display(),
            status,
        })
    }
}

/// Runs external tools on behalf of the pipeline
pub trait ToolRunner: Send + Sync {
    /// Run the tool to completion
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ExternalToolError>;
}

/// Spawns real processes
///
/// Blocks until the tool exits unless a timeout or cancellation flag is set.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill tools that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kill the running tool once `flag` becomes true
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ExternalToolError> {
        tracing::debug!(
            "Running {}: {} {:?}",
            invocation.tool,
            invocation.program.display(),
            invocation.args
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.current_dir)
            .stdin(Stdio::null());

        let spawn_error = |source: std::io::Error| ExternalToolError::Spawn {
            tool: invocation.tool.clone(),
            program: invocation.program_display(),
            source,
        };

        if self.timeout.is_none() && self.cancel.is_none() {
            let status = cmd.status().map_err(spawn_error)?;
            return Ok(ToolOutcome {
                code: status.code(),
            });
        }

        let mut child = cmd.spawn().map_err(spawn_error)?;
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(spawn_error)? {
                return Ok(ToolOutcome {
                    code: status.code(),
                });
            }

            if self.cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExternalToolError::Cancelled {
                    tool: invocation.tool.clone(),
                    program: invocation.program_display(),
                });
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExternalToolError::TimedOut {
                        tool: invocation.tool.clone(),
                        program: invocation.program_display(),
                        seconds: timeout.as_secs(),
                    });
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Host operating system, as far as device conversion cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other(String),
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other(name) => name,
        }
    }
}

impl KindlegenConfig {
    /// Converter executable for `platform`
    pub fn for_platform(&self, platform: &Platform) -> Result<&Path, UnsupportedPlatformError> {
        match platform {
            Platform::Linux => Ok(&self.linux),
            Platform::MacOs => Ok(&self.macos),
            Platform::Windows => Ok(&self.windows),
            Platform::Other(name) => Err(UnsupportedPlatformError {
                platform: name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_resolves_relative_programs() {
        let root = Path::new("/project");
        let command = vec![
            "java".to_string(),
            "-jar".to_string(),
            "script/epubcheck/epubcheck.jar".to_string(),
        ];
        let inv = ToolInvocation::from_command("epubcheck", &command, root)
            .unwrap()
            .arg("builds/epub/book.epub");
        assert_eq!(inv.program, PathBuf::from("java"));
        assert_eq!(inv.args.len(), 3);
        assert_eq!(inv.current_dir, root);

        let command = vec!["script/kindlegen/kindlegen_linux".to_string()];
        let inv = ToolInvocation::from_command("kindlegen", &command, root).unwrap();
        assert_eq!(inv.program, root.join("script/kindlegen/kindlegen_linux"));
    }

    #[test]
    fn test_empty_command_is_not_configured() {
        let err = ToolInvocation::from_command("prince", &[], Path::new(".")).unwrap_err();
        assert!(matches!(err, ExternalToolError::NotConfigured { .. }));
    }

    #[test]
    fn test_outcome_check() {
        let inv = ToolInvocation::from_command("prince", &["prince".to_string()], Path::new("."))
            .unwrap();
        assert!(ToolOutcome::success().check(&inv).is_ok());
        let err = ToolOutcome::exit(3).check(&inv).unwrap_err();
        assert!(err.to_string().contains("exit code 3"));
    }

    #[test]
    fn test_platform_dispatch() {
        let config = KindlegenConfig::default();
        assert_eq!(
            config.for_platform(&Platform::Linux).unwrap(),
            Path::new("script/kindlegen/kindlegen_linux")
        );
        assert_eq!(
            config.for_platform(&Platform::MacOs).unwrap(),
            Path::new("script/kindlegen/kindlegen_mac")
        );
        assert_eq!(
            config.for_platform(&Platform::Windows).unwrap(),
            Path::new("script/kindlegen/kindlegen.exe")
        );
        let err = config.for_platform(&Platform::from_os("freebsd")).unwrap_err();
        assert_eq!(err.platform, "freebsd");
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let inv = ToolInvocation::from_command(
            "missing",
            &["definitely-not-a-real-bookshop-tool".to_string()],
            Path::new("."),
        )
        .unwrap();
        let err = ProcessRunner::new().run(&inv).unwrap_err();
        assert!(matches!(err, ExternalToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_exit_codes() {
        let runner = ProcessRunner::new();
        let ok = ToolInvocation::from_command("true", &["true".to_string()], Path::new("."))
            .unwrap();
        assert!(runner.run(&ok).unwrap().is_success());

        let fail = ToolInvocation::from_command("false", &["false".to_string()], Path::new("."))
            .unwrap();
        assert_eq!(runner.run(&fail).unwrap(), ToolOutcome::exit(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_the_tool() {
        let runner = ProcessRunner::new().with_timeout(Some(Duration::from_millis(100)));
        let inv = ToolInvocation::from_command(
            "sleep",
            &["sleep".to_string(), "5".to_string()],
            Path::new("."),
        )
        .unwrap();
        let err = runner.run(&inv).unwrap_err();
        assert!(matches!(err, ExternalToolError::TimedOut { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_flag_kills_the_tool() {
        let flag = Arc::new(AtomicBool::new(true));
        let runner = ProcessRunner::new().with_cancel_flag(flag);
        let inv = ToolInvocation::from_command(
            "sleep",
            &["sleep".to_string(), "5".to_string()],
            Path::new("."),
        )
        .unwrap();
        let err = runner.run(&inv).unwrap_err();
        assert!(matches!(err, ExternalToolError::Cancelled { .. }));
    }
}
