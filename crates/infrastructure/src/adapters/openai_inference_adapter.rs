//! OpenAI inference adapter - Implements InferencePort using ai_core

use std::{sync::Arc, time::Instant};

use ai_core::{InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OpenAiInferenceEngine};
use application::{
    error::ApplicationError,
    ports::{InferencePort, InferenceResult},
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Adapter for OpenAI-compatible chat completion APIs
pub struct OpenAiInferenceAdapter {
    engine: Arc<dyn InferenceEngine>,
}

impl std::fmt::Debug for OpenAiInferenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiInferenceAdapter")
            .field("model", &self.engine.default_model())
            .field("configured", &self.engine.is_configured())
            .finish()
    }
}

impl OpenAiInferenceAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = OpenAiInferenceEngine::new(config).map_err(Self::map_error)?;
        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Wrap an existing engine
    #[must_use]
    pub fn with_engine(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::RateLimited => ApplicationError::RateLimited,
            InferenceError::ConnectionFailed(msg) => {
                ApplicationError::ExternalService(format!("Inference connection failed: {msg}"))
            },
            InferenceError::Timeout(ms) => {
                ApplicationError::ExternalService(format!("Inference timeout after {ms}ms"))
            },
            other => ApplicationError::Inference(other.to_string()),
        }
    }

    /// Whether the API answers and accepts the key
    pub async fn health_check(&self) -> Result<bool, ApplicationError> {
        self.engine.health_check().await.map_err(Self::map_error)
    }
}

#[async_trait]
impl InferencePort for OpenAiInferenceAdapter {
    #[instrument(skip(self, system_prompt, message), fields(message_len = message.len()))]
    async fn generate_with_system(
        &self,
        system_prompt: &str,
        message: &str,
    ) -> Result<InferenceResult, ApplicationError> {
        let start = Instant::now();
        let response = self
            .engine
            .generate(InferenceRequest::with_system(system_prompt, message))
            .await
            .map_err(Self::map_error)?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            model = %response.model,
            latency_ms,
            response_len = response.content.len(),
            "Script generated"
        );

        Ok(InferenceResult {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|u| u.total_tokens),
            latency_ms,
        })
    }

    fn is_configured(&self) -> bool {
        self.engine.is_configured()
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}

#[cfg(test)]
mod tests {
    use ai_core::{InferenceResponse, TokenUsage};

    use super::*;

    struct CannedEngine {
        result: fn() -> Result<InferenceResponse, InferenceError>,
    }

    #[async_trait]
    impl InferenceEngine for CannedEngine {
        async fn generate(
            &self,
            request: InferenceRequest,
        ) -> Result<InferenceResponse, InferenceError> {
            assert_eq!(request.messages.len(), 2);
            assert_eq!(request.messages[0].role, "system");
            (self.result)()
        }

        async fn health_check(&self) -> Result<bool, InferenceError> {
            Ok(true)
        }

        fn is_configured(&self) -> bool {
            true
        }

        fn default_model(&self) -> &str {
            "gpt-4o-mini"
        }
    }

    fn adapter(result: fn() -> Result<InferenceResponse, InferenceError>) -> OpenAiInferenceAdapter {
        OpenAiInferenceAdapter::with_engine(Arc::new(CannedEngine { result }))
    }

    #[tokio::test]
    async fn maps_response() {
        let adapter = adapter(|| {
            Ok(InferenceResponse {
                content: "Good morning, listeners.".to_string(),
                model: "gpt-4o-mini-2024-07-18".to_string(),
                usage: Some(TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                finish_reason: Some("stop".to_string()),
            })
        });

        let result = adapter
            .generate_with_system("You write scripts.", "Newsletter text")
            .await
            .unwrap();
        assert_eq!(result.content, "Good morning, listeners.");
        assert_eq!(result.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(result.tokens_used, Some(15));
        assert!(adapter.is_configured());
        assert_eq!(adapter.current_model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let adapter = adapter(|| Err(InferenceError::RateLimited));
        let err = adapter.generate_with_system("s", "m").await.unwrap_err();
        assert!(matches!(err, ApplicationError::RateLimited));
        assert!(!err.is_fatal());
    }

    #[test]
    fn map_error_variants() {
        assert!(matches!(
            OpenAiInferenceAdapter::map_error(InferenceError::Timeout(100)),
            ApplicationError::ExternalService(_)
        ));
        assert!(matches!(
            OpenAiInferenceAdapter::map_error(InferenceError::NotConfigured),
            ApplicationError::Inference(_)
        ));
        assert!(matches!(
            OpenAiInferenceAdapter::map_error(InferenceError::Unauthorized("bad key".into())),
            ApplicationError::Inference(_)
        ));
    }

    #[test]
    fn placeholder_key_leaves_adapter_unconfigured() {
        let adapter = OpenAiInferenceAdapter::new(InferenceConfig {
            api_key: Some("YOUR_OPENAI_API_KEY".to_string()),
            ..InferenceConfig::default()
        })
        .unwrap();
        assert!(!adapter.is_configured());
    }
}
