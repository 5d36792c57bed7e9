use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::translate::cache::TranslationCache;
use crate::translate::engine::TranslationEngine;
use crate::translate::inference_client::InferenceServiceClient;
use crate::translate::interface::ModelBackend;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<TranslationEngine>,
    pub cache: Arc<TranslationCache>,
    pub log_file: PathBuf,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let model_config = &config.model_config;
        let backend = Arc::new(InferenceServiceClient::new(
            model_config.inference_url.clone(),
            model_config.request_timeout(),
        )?);
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: Config, backend: Arc<dyn ModelBackend>) -> anyhow::Result<Self> {
        let engine = Arc::new(TranslationEngine::new(
            backend,
            config.model_config.model_spec(),
            config.model_config.max_chunk_length,
        ));
        let cache = Arc::new(TranslationCache::new(config.cache_capacity()?));
        let log_file = config.system_config.log_file_path();

        Ok(Self {
            config,
            engine,
            cache,
            log_file,
        })
    }
}
