//! Common utilities for CLI E2E tests.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// The built binary, pointed at a private data directory.
pub struct Cli {
    dir: TempDir,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_smart-pomodoro"));
        cmd.args(args)
            .env("SMART_POMODORO_DATA_DIR", self.dir.path())
            .env_remove("SMART_POMODORO_LOG");
        cmd
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        self.run_with_stdin(args, "")
    }

    /// Invoke a CLI command feeding `input` on stdin.
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> (String, String, i32) {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to execute CLI command");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
        let output = child.wait_with_output().expect("Failed to wait for CLI");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command {args:?} failed with code {code}: {stderr}");
        stdout
    }

    /// Invoke a CLI command and expect failure.
    pub fn run_failure(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert_ne!(code, 0, "CLI command unexpectedly succeeded: {args:?}");
        stderr
    }

    /// Invoke a CLI command and parse its stdout as JSON.
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }

    /// Add a task and return its id.
    pub fn add_task(&self, name: &str) -> String {
        let stdout = self.run_success(&["task", "add", name]);
        stdout
            .lines()
            .find_map(|l| l.strip_prefix("Task added: "))
            .expect("task id in output")
            .trim()
            .to_string()
    }
}
