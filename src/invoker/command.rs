//! Local-command transport.
//!
//! Delegates generation to a user-configured command (e.g. `llm`, `ollama
//! run`, a wrapper script). The command line is split with shell quoting
//! rules; an argument equal to `{prompt}` or `{schema}` is replaced with the
//! prompt text or the JSON Schema of the expected reply. Without a `{prompt}`
//! placeholder the prompt goes to stdin, and without a `{schema}` placeholder
//! a response-format section carrying the schema is appended to it.
use super::{GenerationRequest, ModelTransport};
use crate::prompt;
use crate::templates;
use anyhow::{anyhow, Context, Result};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

const PROMPT_PLACEHOLDER: &str = "{prompt}";
const SCHEMA_PLACEHOLDER: &str = "{schema}";

/// Runs a local command once per generation.
#[derive(Debug)]
pub struct CommandTransport {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandTransport {
    /// Parse and resolve a command line. Fails if the program cannot be found.
    pub fn new(command: &str) -> Result<Self> {
        let mut argv =
            shell_words::split(command).with_context(|| format!("parse LM command: {command}"))?;
        if argv.is_empty() {
            return Err(anyhow!("LM command is empty"));
        }
        let name = argv.remove(0);
        let program =
            which::which(&name).with_context(|| format!("LM command not found: {name}"))?;
        Ok(Self {
            program,
            args: argv,
        })
    }

    fn has_placeholder(&self, placeholder: &str) -> bool {
        self.args.iter().any(|arg| arg == placeholder)
    }

    /// Argument list and stdin payload for one request.
    fn prepare(&self, request: &GenerationRequest<'_>) -> Result<(Vec<String>, Option<String>)> {
        let schema = serde_json::to_string(&request.schema.to_json_schema())
            .context("serialize reply schema")?;
        let args = self
            .args
            .iter()
            .map(|arg| match arg.as_str() {
                PROMPT_PLACEHOLDER => request.prompt.to_string(),
                SCHEMA_PLACEHOLDER => schema.clone(),
                _ => arg.clone(),
            })
            .collect();

        if self.has_placeholder(PROMPT_PLACEHOLDER) {
            return Ok((args, None));
        }
        let stdin = if self.has_placeholder(SCHEMA_PLACEHOLDER) {
            request.prompt.to_string()
        } else {
            let format =
                prompt::fill(templates::RESPONSE_FORMAT_MD, &[("schema", schema.as_str())]);
            prompt::assemble(vec![request.prompt.to_string(), format])
        };
        Ok((args, Some(stdin)))
    }
}

impl ModelTransport for CommandTransport {
    fn name(&self) -> &'static str {
        "command"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let (args, stdin) = self.prepare(request)?;

        let start = Instant::now();
        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = command
            .spawn()
            .with_context(|| format!("spawn LM command: {}", self.program.display()))?;

        if let (Some(mut pipe), Some(text)) = (child.stdin.take(), stdin.as_deref()) {
            match pipe.write_all(text.as_bytes()) {
                Ok(()) => {}
                // The command may exit without reading its input.
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
                Err(err) => return Err(err).context("write prompt to LM stdin"),
            }
        }

        let output = child.wait_with_output().context("wait for LM command")?;
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_bytes = output.stdout.len(),
            "lm command finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "LM command failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")
    }
}
