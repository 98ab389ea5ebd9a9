//! Scripted completion backend for unit tests.

use std::collections::VecDeque;
use std::future::Future;

use innotrend_core::{Error, Result};
use parking_lot::Mutex;

use crate::client::CompletionBackend;

/// Replays queued responses and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl CompletionBackend for ScriptedBackend {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send {
        self.prompts.lock().push(prompt.to_string());
        let response = self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Llm("script exhausted".into())));
        async move { response }
    }
}
