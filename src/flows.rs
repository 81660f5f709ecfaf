//! Flow facades.
//!
//! A flow is the validate → render → invoke pipeline for one feature. Every
//! feature implements [`Flow`]; [`run`] drives any of them through
//!
//! ```text
//! Idle → Validating → Rendering → Invoking → Succeeded | Failed
//! ```
//!
//! in a single pass. A validation failure never reaches the model, and there
//! is no retry transition.
pub mod notes;
pub mod planner;
pub mod tutor;

use crate::invoker::{InvocationError, Invoker};
use crate::prompt;
use crate::schema::{FieldMap, Shape, ValidationError};
use serde::de::DeserializeOwned;
use std::fmt;

/// One feature's request, prompt, and reply contract.
pub trait Flow {
    /// Stable name used in logs.
    const NAME: &'static str;
    /// What the user is told when the model call fails, for any reason.
    const FAILURE_NOTICE: &'static str;

    type Request;
    type Response: DeserializeOwned;

    fn validate(fields: &FieldMap) -> Result<Self::Request, ValidationError>;

    /// Prompt sections in order; blank sections are dropped.
    fn sections(request: &Self::Request) -> Vec<String>;

    fn output_schema() -> Shape;

    fn render(request: &Self::Request) -> String {
        prompt::assemble(Self::sections(request))
    }
}

/// Where a flow run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Idle,
    Validating,
    Rendering,
    Invoking,
    Succeeded,
    Failed,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Rendering => "rendering",
            Self::Invoking => "invoking",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a flow run failed.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The request broke a field constraint; the model was not called.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    /// The model call failed or its reply had the wrong shape.
    #[error("{flow}: {source}")]
    Invocation {
        flow: &'static str,
        notice: &'static str,
        #[source]
        source: InvocationError,
    },
}

impl FlowError {
    /// Text to show the user. Transport failures and malformed replies are
    /// deliberately indistinguishable here.
    pub fn user_notice(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Invocation { notice, .. } => (*notice).to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Run a flow end to end.
pub fn run<F: Flow>(invoker: &Invoker, fields: &FieldMap) -> Result<F::Response, FlowError> {
    run_observed::<F>(invoker, fields, &mut |_| {})
}

/// Run a flow, reporting each stage transition to `observe`.
pub fn run_observed<F: Flow>(
    invoker: &Invoker,
    fields: &FieldMap,
    observe: &mut dyn FnMut(FlowStage),
) -> Result<F::Response, FlowError> {
    let mut enter = |stage: FlowStage| {
        tracing::debug!(flow = F::NAME, %stage, "flow stage");
        observe(stage);
    };
    enter(FlowStage::Idle);

    enter(FlowStage::Validating);
    let request = match F::validate(fields) {
        Ok(request) => request,
        Err(err) => {
            tracing::info!(flow = F::NAME, field = %err.field, error = %err, "request rejected");
            enter(FlowStage::Failed);
            return Err(FlowError::Validation(err));
        }
    };

    enter(FlowStage::Rendering);
    let prompt = F::render(&request);

    enter(FlowStage::Invoking);
    match invoker.invoke::<F::Response>(F::NAME, &prompt, &F::output_schema()) {
        Ok(response) => {
            enter(FlowStage::Succeeded);
            Ok(response)
        }
        Err(source) => {
            enter(FlowStage::Failed);
            Err(FlowError::Invocation {
                flow: F::NAME,
                notice: F::FAILURE_NOTICE,
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::notes::NotesFlow;
    use super::*;
    use crate::invoker::testing::ScriptedTransport;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> FieldMap {
        value.as_object().cloned().expect("object literal")
    }

    fn run_collecting(
        invoker: &Invoker,
        fields: &FieldMap,
    ) -> (Vec<FlowStage>, Result<notes::NotesResponse, FlowError>) {
        let mut stages = Vec::new();
        let result = run_observed::<NotesFlow>(invoker, fields, &mut |stage| stages.push(stage));
        (stages, result)
    }

    #[test]
    fn successful_run_walks_every_stage_once() {
        let transport = ScriptedTransport::new();
        transport.reply(r##"{"notes": "# Optics"}"##);
        let invoker = Invoker::new(Box::new(transport.clone()));

        let (stages, result) =
            run_collecting(&invoker, &fields(json!({"topic": "Optics", "language": "English"})));
        assert_eq!(result.unwrap().notes, "# Optics");
        assert_eq!(
            stages,
            vec![
                FlowStage::Idle,
                FlowStage::Validating,
                FlowStage::Rendering,
                FlowStage::Invoking,
                FlowStage::Succeeded,
            ]
        );
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn validation_failure_stops_before_rendering() {
        let transport = ScriptedTransport::new();
        let invoker = Invoker::new(Box::new(transport.clone()));

        let (stages, result) =
            run_collecting(&invoker, &fields(json!({"topic": "Ph", "language": "English"})));
        let err = result.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.user_notice(), "topic: must be at least 3 characters");
        assert_eq!(
            stages,
            vec![FlowStage::Idle, FlowStage::Validating, FlowStage::Failed]
        );
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn transport_and_shape_failures_share_one_notice() {
        let transport = ScriptedTransport::new();
        transport.fail("503 service unavailable");
        transport.reply(r#"{"summary": "wrong shape"}"#);
        let invoker = Invoker::new(Box::new(transport.clone()));
        let request = fields(json!({"topic": "Optics", "language": "Bengali"}));

        let unreachable = run::<NotesFlow>(&invoker, &request).unwrap_err();
        let malformed = run::<NotesFlow>(&invoker, &request).unwrap_err();
        assert!(!unreachable.is_validation());
        assert_eq!(unreachable.user_notice(), malformed.user_notice());
        assert_eq!(unreachable.user_notice(), NotesFlow::FAILURE_NOTICE);
        assert_eq!(transport.calls(), 2);
    }
}
