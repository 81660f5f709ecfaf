//! Tutor chat and the in-memory conversation that drives it.
//!
//! The tutor answers one message per call. A [`Conversation`] keeps the
//! visible history, but earlier turns are not sent back to the model.
use super::{run, Flow, FlowError};
use crate::invoker::Invoker;
use crate::prompt;
use crate::schema::{FieldMap, FieldReader, Shape, ValidationError};
use crate::templates;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorReply {
    pub response: String,
}

pub struct TutorFlow;

impl Flow for TutorFlow {
    const NAME: &'static str = "tutor_chat";
    const FAILURE_NOTICE: &'static str = "Failed to get a response. Please try again.";

    type Request = TutorRequest;
    type Response = TutorReply;

    fn validate(fields: &FieldMap) -> Result<TutorRequest, ValidationError> {
        let reader = FieldReader::new(fields);
        Ok(TutorRequest {
            message: reader.text("message", 1)?,
        })
    }

    fn sections(request: &TutorRequest) -> Vec<String> {
        vec![
            templates::TUTOR_MD.to_string(),
            prompt::fill(
                "User: {message}\nVidyasagar:",
                &[("message", request.message.as_str())],
            ),
        ]
    }

    fn output_schema() -> Shape {
        Shape::object(vec![(
            "response",
            Shape::text("The tutor's reply to the student."),
        )])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Ordered chat history for one session. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Send one message to the tutor.
    ///
    /// On any failure the history is left exactly as it was before the call.
    pub fn send(&mut self, invoker: &Invoker, message: &str) -> Result<TutorReply, FlowError> {
        let mut fields = FieldMap::new();
        fields.insert("message".to_string(), Value::String(message.to_string()));
        let request = TutorFlow::validate(&fields)?;

        self.turns.push(ChatTurn {
            role: ChatRole::User,
            content: request.message,
        });
        match run::<TutorFlow>(invoker, &fields) {
            Ok(reply) => {
                self.turns.push(ChatTurn {
                    role: ChatRole::Assistant,
                    content: reply.response.clone(),
                });
                Ok(reply)
            }
            Err(err) => {
                self.turns.pop();
                Err(err)
            }
        }
    }
}
