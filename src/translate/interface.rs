//! Model backend interface - the model and tokenizer live in the inference service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::preset::TranslationPreset;

/// What to load and where to run it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub model_name: String,
    pub src_lang: String,
    pub tgt_lang: String,
    pub device: String,
}

/// Decoding parameters for one `generate` call.
///
/// `max_length` bounds both the tokenized input (truncation) and the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_length: usize,
    pub num_beams: usize,
    pub early_stopping: bool,
    pub temperature: f32,
    pub top_k: Option<usize>,
    pub top_p: Option<f32>,
    pub repetition_penalty: f32,
    pub length_penalty: f32,
    pub no_repeat_ngram_size: usize,
}

impl From<&TranslationPreset> for GenerationParams {
    fn from(preset: &TranslationPreset) -> Self {
        Self {
            max_length: preset.max_length,
            num_beams: preset.num_beams,
            early_stopping: preset.early_stopping,
            temperature: preset.temperature,
            top_k: preset.top_k,
            top_p: preset.top_p,
            repetition_penalty: preset.repetition_penalty,
            length_penalty: preset.length_penalty,
            no_repeat_ngram_size: preset.no_repeat_ngram_size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadRequest {
    #[serde(flatten)]
    pub spec: ModelSpec,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadResponse {
    pub success: bool,
    pub device: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model_name: String,
    pub text: String,
    pub src_lang: String,
    pub tgt_lang: String,
    pub params: GenerationParams,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub translated_text: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("inference service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model load failed: {0}")]
    Load(String),
    #[error("generation failed: {0}")]
    Generation(String),
}

/// A model + tokenizer pair the engine can drive.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Load the model and tokenizer and bind them to a device.
    ///
    /// Returns the device the backend actually bound to.
    async fn load(&self, spec: &ModelSpec) -> Result<String, BackendError>;

    /// Tokenize `text` with truncation, generate, and decode without special tokens.
    async fn generate(
        &self,
        spec: &ModelSpec,
        text: &str,
        params: &GenerationParams,
    ) -> Result<String, BackendError>;

    fn backend_name(&self) -> &str;
}
