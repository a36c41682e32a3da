// Test doubles shared by the unit tests in this crate.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::ContentGenerator;
use crate::errors::{GeminiError, GeminiResult};
use crate::types::Part;

/// Generator that returns a fixed reply and records every call
pub(crate) struct ScriptedGenerator {
    reply: Result<String, String>,
    calls: Mutex<Vec<Vec<Part>>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<Vec<Part>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, parts: Vec<Part>) -> GeminiResult<String> {
        self.calls.lock().unwrap().push(parts);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(GeminiError::HttpError {
                status_code: 429,
                message: message.clone(),
            }),
        }
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}
