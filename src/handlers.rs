use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::state::AppState;
use crate::translate::cache::CacheKey;
use crate::translate::engine::EngineError;
use crate::translate::preset::{merge, ContextName, PresetError, PresetName};

#[derive(Debug, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

/// A request whose preset and context names have been checked.
struct ValidatedRequest {
    text: String,
    config: PresetName,
    context: ContextName,
}

impl TranslationRequest {
    fn validate(self) -> Result<ValidatedRequest, PresetError> {
        let config = match self.config.as_deref() {
            Some(name) => name.parse()?,
            None => PresetName::default(),
        };
        let context = match self.context.as_deref() {
            Some(name) => name.parse()?,
            None => ContextName::default(),
        };
        Ok(ValidatedRequest {
            text: self.text,
            config,
            context,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_text: String,
    pub processing_time: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CachedTranslationResponse {
    pub translated_text: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] PresetError),
    #[error("Translation service not ready")]
    NotReady,
    #[error("Translation failed")]
    Translation,
    #[error("Unable to fetch logs.")]
    Logs,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NotReady(_) => ApiError::NotReady,
            other => {
                error!("Translation error: {}", other);
                ApiError::Translation
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Translation | ApiError::Logs => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

/// Uncached translation, reports processing time in seconds.
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let request = request.validate()?;
    let preset = merge(request.config.preset(), request.context);
    info!(
        "Translating {} chars (config: {}, context: {})",
        request.text.chars().count(),
        request.config,
        request.context
    );

    let output = state.engine.translate_with(&request.text, &preset).await?;

    info!(
        "Translated {} chunk(s) in {:.2}s",
        output.chunks,
        output.elapsed.as_secs_f64()
    );
    Ok(Json(TranslationResponse {
        translated_text: output.text,
        processing_time: output.elapsed.as_secs_f64(),
    }))
}

/// Translation served through the process-wide LRU cache.
pub async fn translate_cached(
    State(state): State<AppState>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<CachedTranslationResponse>, ApiError> {
    let request = request.validate()?;
    let key = CacheKey {
        text: request.text,
        config: request.config,
        context: request.context,
    };

    if let Some(translated_text) = state.cache.get(&key).await {
        return Ok(Json(CachedTranslationResponse { translated_text }));
    }

    let preset = merge(key.config.preset(), key.context);
    let output = state.engine.translate_with(&key.text, &preset).await?;
    state.cache.put(key, output.text.clone()).await;

    Ok(Json(CachedTranslationResponse {
        translated_text: output.text,
    }))
}
