//! Archive extraction through an external tool (`unrar` by default).
//!
//! The tool is a black box: only its exit code and combined output are
//! looked at. [`ToolRunner`] is the seam tests use to avoid a real binary.

use crate::config::ExtractorConfig;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};

/// Sentinel diagnostic reported when extraction is skipped in dry-run mode
pub const DRY_RUN_MARKER: &str = "DRY_RUN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// stdout and stderr interleaved in write order, lossily decoded
    pub output: String,
}

impl ToolOutput {
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

pub trait ToolRunner {
    /// Run `program` to completion and capture its output.
    ///
    /// # Errors
    /// Returns `io::Error` only when the process cannot be started.
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ToolOutput>;
}

/// Runs tools with `std::process::Command`, both output streams sharing one pipe
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

impl ToolRunner for CommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ToolOutput> {
        let (mut reader, writer) = io::pipe()?;

        // The Command holds the parent's copies of the write end; it must be
        // dropped before reading or read_to_end never sees EOF.
        let mut child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn()?
        };

        let mut captured = Vec::new();
        let read = reader.read_to_end(&mut captured);
        let status = child.wait()?;
        read?;

        Ok(ToolOutput {
            exit_code: status.code(),
            output: String::from_utf8_lossy(&captured).into_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub succeeded: bool,
    pub output: String,
}

/// Builds and runs `<program> <args..> <archive> <dest>`
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    program: String,
    args: Vec<String>,
}

impl ArchiveExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    pub fn arguments(&self, archive: &Path, dest_dir: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(OsString::from)
            .chain([archive.as_os_str().to_owned(), dest_dir.as_os_str().to_owned()])
            .collect()
    }

    /// Human readable command line, as logged
    pub fn command_line(&self, archive: &Path, dest_dir: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(
            self.arguments(archive, dest_dir)
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }

    /// Extract `archive` into `dest_dir`, overwriting without prompting.
    ///
    /// Nothing is cleaned up on failure.
    pub fn extract(
        &self,
        runner: &dyn ToolRunner,
        archive: &Path,
        dest_dir: &Path,
        perform: bool,
    ) -> Extraction {
        tracing::info!("{}", self.command_line(archive, dest_dir));

        if !perform {
            return Extraction {
                succeeded: true,
                output: DRY_RUN_MARKER.to_string(),
            };
        }

        match runner.run(&self.program, &self.arguments(archive, dest_dir)) {
            Ok(result) => {
                if !result.success() {
                    tracing::debug!(
                        "{} exited with {:?} for {}",
                        self.program,
                        result.exit_code,
                        archive.display()
                    );
                }
                Extraction {
                    succeeded: result.success(),
                    output: result.output,
                }
            }
            Err(e) => Extraction {
                succeeded: false,
                output: format!("failed to start {}: {e}", self.program),
            },
        }
    }
}
