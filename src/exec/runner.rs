//! External command runner
//!
//! `CommandSpec` describes one invocation; `CommandRunner` executes it.
//! The streamed variant pipes the child's stdout into a caller-supplied
//! writer so large outputs (database dumps) are never buffered whole.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{SnapError, SnapResult};

/// Description of one external command invocation
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Argument list
    pub args: Vec<String>,
    /// Bytes fed to the child's stdin, if any
    pub stdin: Option<Vec<u8>>,
    /// Working directory, if different from the caller's
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a spec for a program with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            cwd: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Render the invocation for error messages
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Result of a completed command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code; `None` when the child died to a signal
    pub status_code: Option<i32>,
    /// Captured stdout (empty when streamed)
    pub stdout: Vec<u8>,
    /// Captured stderr
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the command exited zero
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Stderr as lossy UTF-8, trimmed, for error messages
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Executes external commands
pub trait CommandRunner {
    /// Run a command to completion, capturing stdout and stderr
    fn run(&self, spec: &CommandSpec) -> SnapResult<CommandOutput>;

    /// Run a command, streaming its stdout into `sink`
    ///
    /// The returned output has an empty stdout; stderr is still captured
    /// for error reporting.
    fn run_streamed(&self, spec: &CommandSpec, sink: &mut dyn Write) -> SnapResult<CommandOutput>;
}

/// Runs commands as real system processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn build_command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if spec.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }

        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    fn feed_stdin(child: &mut std::process::Child, spec: &CommandSpec) -> SnapResult<()> {
        if let Some(bytes) = &spec.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(bytes)
                    .map_err(|e| SnapError::Io(format!("Failed to write to child stdin: {}", e)))?;
            }
        }
        Ok(())
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> SnapResult<CommandOutput> {
        let mut child = self
            .build_command(spec)
            .spawn()
            .map_err(|e| SnapError::Io(format!("Failed to spawn '{}': {}", spec.program, e)))?;

        Self::feed_stdin(&mut child, spec)?;

        let output = child
            .wait_with_output()
            .map_err(|e| SnapError::Io(format!("Failed to wait for '{}': {}", spec.program, e)))?;

        Ok(CommandOutput {
            status_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn run_streamed(&self, spec: &CommandSpec, sink: &mut dyn Write) -> SnapResult<CommandOutput> {
        let mut child = self
            .build_command(spec)
            .spawn()
            .map_err(|e| SnapError::Io(format!("Failed to spawn '{}': {}", spec.program, e)))?;

        Self::feed_stdin(&mut child, spec)?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SnapError::Io("Child stdout not captured".into()))?;

        // Drain stderr on a helper thread; reading stdout alone can
        // deadlock if the child fills its stderr pipe.
        let stderr = child.stderr.take();
        let stderr_thread = std::thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf);
            }
            buf
        });

        std::io::copy(&mut stdout, sink)
            .map_err(|e| SnapError::Io(format!("Failed to stream '{}' output: {}", spec.program, e)))?;

        let status = child
            .wait()
            .map_err(|e| SnapError::Io(format!("Failed to wait for '{}': {}", spec.program, e)))?;

        let stderr_buf = stderr_thread.join().unwrap_or_default();

        Ok(CommandOutput {
            status_code: status.code(),
            stdout: Vec::new(),
            stderr: stderr_buf,
        })
    }
}
