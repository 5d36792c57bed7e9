use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info};

use super::interface::{
    BackendError, GenerateRequest, GenerateResponse, GenerationParams, LoadRequest, LoadResponse,
    ModelBackend, ModelSpec,
};

/// HTTP client for the inference service hosting the seq2seq model
#[derive(Debug, Clone)]
pub struct InferenceServiceClient {
    client: Client,
    base_url: String,
}

impl InferenceServiceClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ModelBackend for InferenceServiceClient {
    async fn load(&self, spec: &ModelSpec) -> Result<String, BackendError> {
        let url = format!("{}/models/load", self.base_url);
        info!("Requesting model load of {} from {}", spec.model_name, url);

        let request = LoadRequest { spec: spec.clone() };
        let response = self.client.post(&url).json(&request).send().await?;
        let result: LoadResponse = Self::check_status(response).await?.json().await?;

        if !result.success {
            return Err(BackendError::Load(
                result.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(result.device.unwrap_or_else(|| spec.device.clone()))
    }

    async fn generate(
        &self,
        spec: &ModelSpec,
        text: &str,
        params: &GenerationParams,
    ) -> Result<String, BackendError> {
        let url = format!("{}/generate", self.base_url);
        let request = GenerateRequest {
            model_name: spec.model_name.clone(),
            text: text.to_string(),
            src_lang: spec.src_lang.clone(),
            tgt_lang: spec.tgt_lang.clone(),
            params: params.clone(),
        };
        debug!("POST {} ({} chars, {} beams)", url, text.chars().count(), params.num_beams);

        let response = self.client.post(&url).json(&request).send().await?;
        let result: GenerateResponse = Self::check_status(response).await?.json().await?;

        match (result.success, result.translated_text) {
            (true, Some(text)) => Ok(text),
            (true, None) => Err(BackendError::Generation(
                "response carried no translated_text".to_string(),
            )),
            (false, _) => Err(BackendError::Generation(
                result.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }

    fn backend_name(&self) -> &str {
        "inference-service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use crate::translate::preset::TranslationPreset;

    type Seen = Arc<Mutex<Vec<Value>>>;

    fn spec() -> ModelSpec {
        ModelSpec {
            model_name: "facebook/mbart-large-50-many-to-many-mmt".to_string(),
            src_lang: "hi_IN".to_string(),
            tgt_lang: "en_XX".to_string(),
            device: "auto".to_string(),
        }
    }

    /// Inference service stand-in: records request bodies and answers every
    /// call with the same status and body.
    async fn serve(status: StatusCode, body: Value) -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let handler = move |Json(request): Json<Value>| {
            let recorder = recorder.clone();
            let body = body.clone();
            async move {
                recorder.lock().unwrap().push(request);
                (status, Json(body))
            }
        };
        let router = Router::new()
            .route("/models/load", post(handler.clone()))
            .route("/generate", post(handler));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn client(base_url: String) -> InferenceServiceClient {
        InferenceServiceClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_load_sends_flat_model_spec() {
        let (url, seen) = serve(StatusCode::OK, json!({"success": true, "device": "cuda"})).await;
        // trailing slash is trimmed
        let client = client(format!("{}/", url));

        let device = client.load(&spec()).await.unwrap();
        assert_eq!(device, "cuda");

        let requests = seen.lock().unwrap().clone();
        assert_eq!(
            requests[0],
            json!({
                "model_name": "facebook/mbart-large-50-many-to-many-mmt",
                "src_lang": "hi_IN",
                "tgt_lang": "en_XX",
                "device": "auto",
            })
        );
    }

    #[tokio::test]
    async fn test_load_without_device_falls_back_to_requested() {
        let (url, _) = serve(StatusCode::OK, json!({"success": true})).await;
        assert_eq!(client(url).load(&spec()).await.unwrap(), "auto");
    }

    #[tokio::test]
    async fn test_load_reported_failure() {
        let (url, _) = serve(
            StatusCode::OK,
            json!({"success": false, "error": "weights not found"}),
        )
        .await;

        match client(url).load(&spec()).await {
            Err(BackendError::Load(reason)) => assert_eq!(reason, "weights not found"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_sends_nested_params() {
        let (url, seen) = serve(
            StatusCode::OK,
            json!({"success": true, "translated_text": "This is a test sentence."}),
        )
        .await;
        let params = GenerationParams::from(&TranslationPreset::DEFAULT);

        let text = client(url)
            .generate(&spec(), "यह एक परीक्षण वाक्य है।", &params)
            .await
            .unwrap();
        assert_eq!(text, "This is a test sentence.");

        let requests = seen.lock().unwrap().clone();
        let request = &requests[0];
        assert_eq!(request["model_name"], "facebook/mbart-large-50-many-to-many-mmt");
        assert_eq!(request["text"], "यह एक परीक्षण वाक्य है।");
        assert_eq!(request["src_lang"], "hi_IN");
        assert_eq!(request["tgt_lang"], "en_XX");
        assert!(request.get("device").is_none());
        assert_eq!(request["params"]["max_length"], 512);
        assert_eq!(request["params"]["num_beams"], 4);
        assert_eq!(request["params"]["early_stopping"], true);
        assert_eq!(request["params"]["no_repeat_ngram_size"], 3);
        assert!(request["params"]["top_k"].is_null());
    }

    #[tokio::test]
    async fn test_generate_reported_failure() {
        let (url, _) = serve(
            StatusCode::OK,
            json!({"success": false, "error": "CUDA out of memory"}),
        )
        .await;
        let params = GenerationParams::from(&TranslationPreset::FAST);

        match client(url).generate(&spec(), "नमस्ते", &params).await {
            Err(BackendError::Generation(reason)) => assert_eq!(reason, "CUDA out of memory"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_success_without_text() {
        let (url, _) = serve(StatusCode::OK, json!({"success": true})).await;
        let params = GenerationParams::from(&TranslationPreset::FAST);

        let err = client(url).generate(&spec(), "नमस्ते", &params).await.unwrap_err();
        assert!(matches!(err, BackendError::Generation(_)));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (url, _) = serve(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"detail": "model crashed"}),
        )
        .await;
        let client = client(url);
        let params = GenerationParams::from(&TranslationPreset::FAST);

        match client.generate(&spec(), "नमस्ते", &params).await {
            Err(BackendError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("model crashed"));
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            client.load(&spec()).await,
            Err(BackendError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{}", addr)).load(&spec()).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
