//! Scripted transport for unit tests.
use super::{GenerationRequest, ModelTransport};
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<String, String>>,
    prompts: Vec<String>,
}

/// Returns queued replies in order and records every prompt it receives.
///
/// Clones share the same script, so a test can keep a handle after giving
/// the transport to an [`Invoker`](super::Invoker).
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, text: &str) {
        self.script
            .borrow_mut()
            .replies
            .push_back(Ok(text.to_string()));
    }

    pub(crate) fn fail(&self, message: &str) {
        self.script
            .borrow_mut()
            .replies
            .push_back(Err(message.to_string()));
    }

    pub(crate) fn calls(&self) -> usize {
        self.script.borrow().prompts.len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.script.borrow().prompts.clone()
    }
}

impl ModelTransport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let mut script = self.script.borrow_mut();
        script.prompts.push(request.prompt.to_string());
        match script.replies.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted transport has no reply queued")),
        }
    }
}
