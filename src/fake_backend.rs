//! Scripted backend for tests.
//!
//! Replays queued outcomes in order and records every request it receives,
//! so tests can assert on the prompt, the schema and the request count
//! without network access.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::errors::{RecipeError, Result};
use crate::gemini::{GenerateRequest, GenerativeBackend};

#[derive(Debug, Default)]
pub struct FakeBackend {
    outcomes: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<(String, GenerateRequest)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend answering once with `text`
    pub fn with_response(text: &str) -> Self {
        let backend = Self::new();
        backend.push_response(text);
        backend
    }

    /// Queue a successful answer
    pub fn push_response(&self, text: &str) {
        lock(&self.outcomes).push_back(Ok(text.to_string()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: RecipeError) {
        lock(&self.outcomes).push_back(Err(error));
    }

    /// Queue an HTTP 503 overload failure
    pub fn push_overloaded(&self) {
        self.push_error(RecipeError::TransientServiceUnavailable {
            status: 503,
            message: "The model is overloaded. Please try again later.".to_string(),
        });
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Copies of the requests received so far
    pub fn requests(&self) -> Vec<GenerateRequest> {
        lock(&self.requests).iter().map(|(_, r)| r.clone()).collect()
    }

    /// API keys sent with each request
    pub fn api_keys(&self) -> Vec<String> {
        lock(&self.requests).iter().map(|(k, _)| k.clone()).collect()
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    async fn generate(&self, api_key: &str, request: &GenerateRequest) -> Result<String> {
        lock(&self.requests).push((api_key.to_string(), request.clone()));
        lock(&self.outcomes).pop_front().unwrap_or_else(|| {
            Err(RecipeError::ServiceError {
                status: 0,
                message: "FakeBackend: no response queued".to_string(),
            })
        })
    }
}
