//! Model invocation.
//!
//! The [`Invoker`] sends one rendered prompt through a [`ModelTransport`] and
//! checks the raw reply against the flow's output [`Shape`]. Each call to
//! [`Invoker::invoke`] makes exactly one transport call: there is no retry and
//! no backoff. Repeated submissions are independent generations.
//!
//! # Transports
//!
//! - [`GeminiTransport`]: the Google Generative Language API over HTTPS.
//! - [`CommandTransport`]: a user-configured local command that reads the
//!   prompt on stdin and writes the JSON reply on stdout.
mod command;
mod gemini;
mod log;
mod reply;
#[cfg(test)]
pub(crate) mod testing;

pub use command::CommandTransport;
pub use gemini::GeminiTransport;
pub use self::log::InvocationLog;

use crate::config::{Backend, ModelConfig};
use crate::schema::{SchemaMismatch, Shape};
use anyhow::Result;
use self::log::{InvocationOutcome, InvocationRecord};
use serde::de::DeserializeOwned;
use std::time::Instant;

/// Everything a transport needs for one generation.
#[derive(Debug)]
pub struct GenerationRequest<'a> {
    /// Flow name, for logs.
    pub flow: &'a str,
    pub prompt: &'a str,
    /// Structural constraint for the reply.
    pub schema: &'a Shape,
}

/// A way of reaching a generative-text model.
pub trait ModelTransport {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Perform one generation and return the raw reply text.
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Failure of a single model invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The endpoint could not be reached or returned an error.
    #[error("model call failed: {0:#}")]
    Transport(anyhow::Error),
    /// The reply arrived but does not have the declared shape.
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),
}

impl InvocationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::SchemaMismatch(_) => "schema_mismatch",
        }
    }
}

/// Sends prompts to the configured model and validates replies.
pub struct Invoker {
    transport: Box<dyn ModelTransport>,
    log: Option<InvocationLog>,
}

impl Invoker {
    pub fn new(transport: Box<dyn ModelTransport>) -> Self {
        Self {
            transport,
            log: None,
        }
    }

    /// Build the transport selected by a resolved config.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let transport: Box<dyn ModelTransport> = match &config.backend {
            Backend::Gemini {
                model,
                api_base,
                api_key,
            } => Box::new(GeminiTransport::new(api_base, model, api_key)),
            Backend::Command { command } => Box::new(CommandTransport::new(command)?),
        };
        let mut invoker = Self::new(transport);
        if let Some(path) = &config.lm_log {
            invoker = invoker.with_log(
                InvocationLog::new(path.clone()).with_full_capture(config.lm_log_full),
            );
        }
        Ok(invoker)
    }

    pub fn with_log(mut self, log: InvocationLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Run one generation and deserialize the schema-checked reply.
    pub fn invoke<T: DeserializeOwned>(
        &self,
        flow: &str,
        prompt: &str,
        schema: &Shape,
    ) -> Result<T, InvocationError> {
        let request = GenerationRequest {
            flow,
            prompt,
            schema,
        };
        let start = Instant::now();
        let raw = self.transport.generate(&request);
        let elapsed = start.elapsed();

        let (result, reply_text) = match raw {
            Ok(text) => {
                let parsed = reply::parse_reply(&text, schema).map_err(InvocationError::from);
                (parsed, Some(text))
            }
            Err(err) => (Err(InvocationError::Transport(err)), None),
        };

        match &result {
            Ok(_) => tracing::info!(
                flow,
                transport = self.transport.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                prompt_bytes = prompt.len(),
                "model invoke complete"
            ),
            Err(err) => tracing::warn!(
                flow,
                transport = self.transport.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                kind = err.kind(),
                error = %err,
                "model invoke failed"
            ),
        }

        if let Some(log) = &self.log {
            let record = InvocationRecord {
                flow,
                transport: self.transport.name(),
                duration: elapsed,
                prompt,
                response: reply_text.as_deref(),
                outcome: match &result {
                    Ok(_) => InvocationOutcome::Success,
                    Err(_) => InvocationOutcome::Failed,
                },
                error: result.as_ref().err().map(|err| err.to_string()),
            };
            // Log write failures never fail the invocation itself.
            if let Err(err) = log.append(&record) {
                tracing::warn!(error = %err, "failed to append invocation log");
            }
        }

        result
    }
}
