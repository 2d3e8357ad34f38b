use std::path::Path;
use std::sync::{Arc, Mutex};

use agent_collab::errors::CollabError;
use agent_collab::worker::{CodeRunner, RunnerFuture};

/// `CodeRunner` that returns a fixed answer and records every prompt.
#[derive(Debug, Clone)]
pub struct ScriptedRunner {
    answer: Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn succeeding(output: &str) -> Self {
        Self {
            answer: Ok(output.to_string()),
            prompts: Arc::default(),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            answer: Err(error.to_string()),
            prompts: Arc::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CodeRunner for ScriptedRunner {
    fn run<'a>(&'a self, prompt: &'a str, _workdir: &'a Path) -> RunnerFuture<'a> {
        Box::pin(async move {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer
                .clone()
                .map_err(CollabError::TaskExecution)
        })
    }
}
