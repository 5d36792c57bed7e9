//! Deterministic backend for tests; no network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::interface::{BackendError, GenerationParams, ModelBackend, ModelSpec};

#[derive(Debug, Clone)]
pub enum MockMode {
    /// Answer with `"EN[<last prompt line>]"`
    Echo,
    /// Fixed answer for every chunk
    Fixed(String),
    /// Fail the n-th generate call (zero based), succeed otherwise
    FailOnCall(usize),
}

#[derive(Debug)]
pub struct MockBackend {
    mode: MockMode,
    fail_load: bool,
    delay: Option<Duration>,
    generate_calls: AtomicUsize,
    load_calls: AtomicUsize,
    prompts: Mutex<Vec<(String, GenerationParams)>>,
}

impl MockBackend {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            fail_load: false,
            delay: None,
            generate_calls: AtomicUsize::new(0),
            load_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::new(MockMode::Echo)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, GenerationParams)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn load(&self, spec: &ModelSpec) -> Result<String, BackendError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(BackendError::Load("weights not found".to_string()));
        }
        Ok(spec.device.clone())
    }

    async fn generate(
        &self,
        _spec: &ModelSpec,
        text: &str,
        params: &GenerationParams,
    ) -> Result<String, BackendError> {
        let call = self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((text.to_string(), params.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.mode {
            MockMode::Echo => {
                let source = text.lines().last().unwrap_or_default();
                Ok(format!("EN[{}]", source))
            }
            MockMode::Fixed(answer) => Ok(answer.clone()),
            MockMode::FailOnCall(n) if *n == call => {
                Err(BackendError::Generation("CUDA out of memory".to_string()))
            }
            MockMode::FailOnCall(_) => Ok(format!("chunk {}", call)),
        }
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
