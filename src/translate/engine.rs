//! Translation engine: owns the model backend, its load state and the active preset.
//!
//! `translate` normalizes the input, splits it into sentence-aligned chunks,
//! sends each chunk with the preset's instruction prompt to the backend and
//! joins the outputs with a single space. The first failing chunk aborts the
//! whole translation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::interface::{BackendError, GenerationParams, ModelBackend, ModelSpec};
use super::preset::TranslationPreset;
use crate::utils::sentence_divider::split_into_chunks;
use crate::utils::text_cleaner::clean_text;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready {
        device: String,
        loaded_at: DateTime<Utc>,
    },
    Failed {
        reason: String,
    },
}

impl EngineState {
    pub fn label(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Loading => "loading",
            EngineState::Ready { .. } => "ready",
            EngineState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("translation engine is not ready ({0})")]
    NotReady(&'static str),
    #[error("load() called in state {0}")]
    InvalidTransition(&'static str),
    #[error("model load failed: {0}")]
    Load(#[source] BackendError),
    #[error("chunk {index} of {total} failed: {source}")]
    Chunk {
        index: usize,
        total: usize,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Clone)]
pub struct TranslationOutput {
    pub text: String,
    pub elapsed: Duration,
    pub chunks: usize,
}

pub struct TranslationEngine {
    backend: Arc<dyn ModelBackend>,
    spec: ModelSpec,
    max_chunk_length: usize,
    state: RwLock<EngineState>,
    active_preset: RwLock<TranslationPreset>,
}

impl TranslationEngine {
    pub fn new(backend: Arc<dyn ModelBackend>, spec: ModelSpec, max_chunk_length: usize) -> Self {
        Self {
            backend,
            spec,
            max_chunk_length,
            state: RwLock::new(EngineState::Uninitialized),
            active_preset: RwLock::new(TranslationPreset::DEFAULT),
        }
    }

    pub async fn state(&self) -> EngineState {
        self.state.read().await.clone()
    }

    /// Load the model through the backend. Not retried on failure.
    pub async fn load(&self) -> Result<(), EngineError> {
        {
            let mut state = self.state.write().await;
            if *state != EngineState::Uninitialized {
                return Err(EngineError::InvalidTransition(state.label()));
            }
            *state = EngineState::Loading;
        }

        info!(
            "Loading {} ({} -> {}) on {} via {}",
            self.spec.model_name,
            self.spec.src_lang,
            self.spec.tgt_lang,
            self.spec.device,
            self.backend.backend_name()
        );

        match self.backend.load(&self.spec).await {
            Ok(device) => {
                info!("Model loaded successfully on device: {}", device);
                *self.state.write().await = EngineState::Ready {
                    device,
                    loaded_at: Utc::now(),
                };
                Ok(())
            }
            Err(e) => {
                error!("Error loading model: {}", e);
                *self.state.write().await = EngineState::Failed {
                    reason: e.to_string(),
                };
                Err(EngineError::Load(e))
            }
        }
    }

    pub async fn set_preset(&self, preset: TranslationPreset) {
        *self.active_preset.write().await = preset;
        info!("Translation configuration updated");
    }

    pub async fn active_preset(&self) -> TranslationPreset {
        self.active_preset.read().await.clone()
    }

    /// Translate with the active preset.
    pub async fn translate(&self, text: &str) -> Result<TranslationOutput, EngineError> {
        let preset = self.active_preset().await;
        self.translate_with(text, &preset).await
    }

    /// Translate with a caller-supplied preset, leaving the active one untouched.
    pub async fn translate_with(
        &self,
        text: &str,
        preset: &TranslationPreset,
    ) -> Result<TranslationOutput, EngineError> {
        {
            let state = self.state.read().await;
            if !matches!(*state, EngineState::Ready { .. }) {
                error!("Model or tokenizer not loaded (state: {})", state.label());
                return Err(EngineError::NotReady(state.label()));
            }
        }

        let start = Instant::now();
        let chunks = self.prepare_chunks(text);
        let params = GenerationParams::from(preset);
        let total = chunks.len();
        debug!("Translating {} chunk(s)", total);

        let mut translations = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let prompt = preset.build_prompt(chunk);
            let translated = self
                .backend
                .generate(&self.spec, &prompt, &params)
                .await
                .map_err(|source| {
                    error!("Error translating chunk {}/{}: {}", index + 1, total, source);
                    EngineError::Chunk {
                        index,
                        total,
                        source,
                    }
                })?;
            translations.push(translated);
        }

        Ok(TranslationOutput {
            text: translations.join(" "),
            elapsed: start.elapsed(),
            chunks: total,
        })
    }

    /// Normalize and chunk; on utility errors fall back to the raw input.
    fn prepare_chunks(&self, text: &str) -> Vec<String> {
        let cleaned = clean_text(text).unwrap_or_else(|e| {
            warn!("Error cleaning text: {}", e);
            text.to_string()
        });

        split_into_chunks(&cleaned, self.max_chunk_length).unwrap_or_else(|e| {
            warn!("Error splitting text: {}", e);
            vec![cleaned.clone()]
        })
    }
}
