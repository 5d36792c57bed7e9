//! Runs the labelled evaluation corpus through the configured inference service
//! under the default, fast and high_quality presets and prints a report for each.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use indietalk_backend::config::Config;
use indietalk_backend::evaluation::{run_evaluation, EVAL_CASES};
use indietalk_backend::translate::engine::TranslationEngine;
use indietalk_backend::translate::inference_client::InferenceServiceClient;
use indietalk_backend::translate::preset::PresetName;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("indietalk_backend=info")),
        )
        .init();

    let (mut config, _) = Config::discover().context("failed to load configuration")?;
    config.apply_env_overrides();
    config.validate()?;

    let model_config = &config.model_config;
    let backend = Arc::new(InferenceServiceClient::new(
        model_config.inference_url.clone(),
        model_config.request_timeout(),
    )?);
    let engine = TranslationEngine::new(
        backend,
        model_config.model_spec(),
        model_config.max_chunk_length,
    );
    engine
        .load()
        .await
        .context("failed to load translation model")?;

    info!("Evaluating {} cases", EVAL_CASES.len());
    for name in PresetName::ALL {
        println!("\n=== {} preset ===", name);
        let report = run_evaluation(&engine, EVAL_CASES, name.preset()).await;
        println!("{}", report);
    }

    Ok(())
}
