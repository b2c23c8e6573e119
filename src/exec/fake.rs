//! Scripted command runner for tests
//!
//! Responses are consumed in FIFO order; every invocation is recorded
//! so tests can assert on the exact external commands the engine built.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;

use super::runner::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::SnapResult;

/// One scripted response
pub struct FakeResponse {
    pub status_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// File written as a side effect before returning, standing in for
    /// an external helper that writes into a bind-mounted directory
    pub creates_file: Option<(PathBuf, Vec<u8>)>,
    /// Host directory where the `/backup/<name>` argument of the
    /// invocation is materialized, for helpers whose target filename is
    /// chosen by the engine at run time
    pub materializes_backup_arg_in: Option<PathBuf>,
}

impl FakeResponse {
    pub fn ok() -> Self {
        Self {
            status_code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
            creates_file: None,
            materializes_backup_arg_in: None,
        }
    }

    pub fn ok_with_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::ok()
        }
    }

    pub fn ok_creating_file(path: PathBuf, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            creates_file: Some((path, contents.into())),
            ..Self::ok()
        }
    }

    /// Succeed and write the invocation's `/backup/<name>` target into
    /// `host_dir`, the way the real archive helper would through its
    /// bind mount
    pub fn ok_materializing_backup_arg(host_dir: PathBuf) -> Self {
        Self {
            materializes_backup_arg_in: Some(host_dir),
            ..Self::ok()
        }
    }

    pub fn failed(status_code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            stdout: Vec::new(),
            stderr: stderr.into(),
            creates_file: None,
            materializes_backup_arg_in: None,
        }
    }
}

/// Command runner that replays scripted responses
#[derive(Default)]
pub struct FakeRunner {
    responses: RefCell<VecDeque<FakeResponse>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: FakeResponse) {
        self.responses.borrow_mut().push_back(response);
    }

    /// All invocations seen so far
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    fn next_response(&self, spec: &CommandSpec) -> CommandOutput {
        self.calls.borrow_mut().push(spec.clone());

        let response = self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(FakeResponse::ok);

        if let Some((path, contents)) = &response.creates_file {
            std::fs::write(path, contents).expect("fake side-effect write failed");
        }

        if let Some(host_dir) = &response.materializes_backup_arg_in {
            let name = spec
                .args
                .iter()
                .find_map(|arg| arg.strip_prefix("/backup/"))
                .expect("no /backup/ argument in invocation");
            std::fs::write(host_dir.join(name), b"tarball").expect("fake side-effect write failed");
        }

        CommandOutput {
            status_code: Some(response.status_code),
            stdout: response.stdout,
            stderr: response.stderr,
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> SnapResult<CommandOutput> {
        Ok(self.next_response(spec))
    }

    fn run_streamed(&self, spec: &CommandSpec, sink: &mut dyn Write) -> SnapResult<CommandOutput> {
        let mut output = self.next_response(spec);
        sink.write_all(&output.stdout)
            .expect("fake sink write failed");
        output.stdout = Vec::new();
        Ok(output)
    }
}
