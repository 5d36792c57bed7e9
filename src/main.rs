use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use indietalk_backend::config::Config;
use indietalk_backend::logging;
use indietalk_backend::routes;
use indietalk_backend::state::AppState;
use indietalk_backend::translate::engine::TranslationEngine;

/// Sentence translated once after the model loads, to surface backend problems early
const WARMUP_TEXT: &str = "यह एक परीक्षण वाक्य है।";

#[tokio::main]
async fn main() -> Result<()> {
    let (mut config, loaded_path) = Config::discover().context("failed to load configuration")?;
    config.apply_env_overrides();
    config.validate()?;

    logging::init_logging(&config.system_config)?;

    match &loaded_path {
        Some(path) => info!("Loaded configuration from: {}", path),
        None => info!("No configuration file found, using built-in defaults"),
    }

    let app_state = AppState::new(config.clone())?;

    let default_preset = config.default_preset()?;
    app_state
        .engine
        .set_preset(default_preset.preset().clone())
        .await;

    // The model loads in the background; /translate answers 503 until it is ready.
    tokio::spawn(load_and_warm_up(
        app_state.engine.clone(),
        config.system_config.warmup_on_start,
    ));

    let app = routes::create_routes(app_state);

    let addr: SocketAddr = format!("{}:{}", config.system_config.host, config.system_config.port)
        .parse()?;
    info!(
        "Starting server on {} ({:?} mode)",
        addr, config.system_config.service_mode
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn load_and_warm_up(engine: Arc<TranslationEngine>, warm_up: bool) {
    if let Err(e) = engine.load().await {
        error!("Failed to load translation model: {}", e);
        return;
    }
    info!("Model loaded successfully. Ready for translation.");

    if !warm_up {
        return;
    }
    match engine.translate(WARMUP_TEXT).await {
        Ok(output) => info!(
            "Warm-up translation: {} -> {} ({:.2}s)",
            WARMUP_TEXT,
            output.text,
            output.elapsed.as_secs_f64()
        ),
        Err(e) => warn!("Warm-up translation failed: {}", e),
    }
}
