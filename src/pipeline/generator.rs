//! Generator: runs one request through the pipeline.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use super::classify::classify_failure;
use crate::cache::{CacheKey, ContentCache};
use crate::history::{HistoryStore, NewHistoryRecord};
use crate::providers::ChatProvider;
use crate::templates::TemplateRegistry;
use crate::types::{ChatOptions, GenerationRequest, Message};
use crate::{Result, SkaldError, telemetry};

/// Sampling temperature sent with every generation request.
pub const GENERATION_TEMPERATURE: f32 = 0.8;

/// Turns (content type, input, model) into generated text.
///
/// Owns the content cache; shares the template registry, provider and
/// history store. Build one with [`Skald::builder()`](super::Skald::builder).
pub struct Generator {
    registry: Arc<TemplateRegistry>,
    provider: Arc<dyn ChatProvider>,
    cache: ContentCache,
    history: Arc<HistoryStore>,
}

impl Generator {
    pub(crate) fn new(
        registry: Arc<TemplateRegistry>,
        provider: Arc<dyn ChatProvider>,
        cache: ContentCache,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            registry,
            provider,
            cache,
            history,
        }
    }

    /// Generate content for one input.
    ///
    /// A cache hit returns immediately: no remote call, no history record.
    /// On a miss the template is rendered, the provider is called once, and
    /// on success the text is cached and logged to history before it is
    /// returned. Provider failures come back as `RateLimited` or
    /// `GenerationFailed` and leave cache and history untouched.
    #[instrument(skip(self, input_text), fields(provider = self.provider.name()))]
    pub async fn generate(&self, content_type: &str, input_text: &str, model: &str) -> Result<String> {
        if input_text.trim().is_empty() {
            return Err(SkaldError::EmptyInput);
        }

        let key = CacheKey::new(content_type, input_text, model);
        if let Some(text) = self.cache.get(&key).await {
            debug!("cache hit");
            return Ok(text);
        }
        debug!("cache miss");

        let template = self.registry.lookup(content_type)?;
        let messages = [
            Message::system(template.system_prompt.as_str()),
            Message::user(template.render(input_text)),
        ];
        let options = ChatOptions::new(model).temperature(GENERATION_TEMPERATURE);

        let start = Instant::now();
        let result = self.provider.chat(&messages, &options).await;
        metrics::histogram!(telemetry::GENERATION_DURATION_SECONDS, "model" => model.to_string())
            .record(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                let err = classify_failure(err);
                let status = if err.is_retryable() {
                    "rate_limited"
                } else {
                    "error"
                };
                metrics::counter!(
                    telemetry::GENERATIONS_TOTAL,
                    "content_type" => content_type.to_string(),
                    "status" => status
                )
                .increment(1);
                warn!(error = %err, "generation failed");
                return Err(err);
            }
        };

        let text = response.content;
        self.cache.insert(key.clone(), text.clone()).await;

        let record = NewHistoryRecord {
            content_type,
            input_text,
            output_text: &text,
            model,
        };
        if let Err(err) = self.history.append(&record) {
            // keep cache and history in step: neither write survives
            self.cache.invalidate(&key).await;
            error!(error = %err, "failed to record generation");
            return Err(err);
        }

        metrics::counter!(
            telemetry::GENERATIONS_TOTAL,
            "content_type" => content_type.to_string(),
            "status" => "ok"
        )
        .increment(1);
        info!(chars = text.chars().count(), "generated content");
        Ok(text)
    }

    /// [`generate`](Self::generate) for a prepared request value.
    pub async fn generate_request(&self, request: &GenerationRequest) -> Result<String> {
        self.generate(&request.content_type, &request.input_text, &request.model)
            .await
    }

    /// Template registry used for lookups.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Content cache owned by this generator.
    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// History store successful generations are appended to.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Name of the remote provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
