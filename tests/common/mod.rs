//! Shared test infrastructure for integration tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Environment variables that would leak a developer's setup into a test run.
const SCRUBBED_ENV: &[&str] = &[
    "GEMINI_API_KEY",
    "GOOGLE_GENAI_API_KEY",
    "GOOGLE_API_KEY",
    "STUDYFLOW_LM_COMMAND",
    "STUDYFLOW_MODEL",
    "STUDYFLOW_API_BASE",
    "STUDYFLOW_LM_LOG",
    "RUST_LOG",
];

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// An isolated working directory for running `studyflow`.
///
/// HOME and the config directory point into the sandbox so no user config
/// file or `.env` is picked up.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_studyflow"));
        command
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"));
        for name in SCRUBBED_ENV {
            command.env_remove(name);
        }
        command
    }

    /// Run with `args`, feeding `stdin` when given.
    pub fn run(&self, args: &[&str], stdin: Option<&str>) -> Output {
        let mut command = self.command();
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = command.spawn().expect("spawn studyflow");
        if let (Some(mut pipe), Some(text)) = (child.stdin.take(), stdin) {
            pipe.write_all(text.as_bytes()).expect("write stdin");
        }
        child.wait_with_output().expect("wait for studyflow")
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

/// A local LM command that prints a canned reply.
pub fn canned_lm(reply: &str) -> String {
    format!("cat '{}'", fixture(reply).display())
}

/// A local LM command that records its stdin and invocation, then replies.
pub fn recording_lm(sandbox: &Sandbox, reply: &str) -> String {
    format!(
        "sh -c 'cat > \"{}\"; cat \"{}\"'",
        sandbox.path("prompt.txt").display(),
        fixture(reply).display()
    )
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
