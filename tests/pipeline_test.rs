//! Tests for the generation pipeline: cache, history and error contracts.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use skald::providers::ChatProvider;
use skald::{
    CacheConfig, CacheKey, ChatOptions, ChatResponse, GENERATION_TEMPERATURE, GenerationRequest,
    Generator, HistoryStore, Message, Result, Role, Skald, SkaldError, TemplateRegistry,
};

// ============================================================================
// Mock provider
// ============================================================================

type Reply = Box<dyn Fn(&[Message]) -> Result<ChatResponse> + Send + Sync>;

/// Records every call and answers with a scripted reply.
struct MockProvider {
    reply: Reply,
    calls: Mutex<Vec<(Vec<Message>, ChatOptions)>>,
}

impl MockProvider {
    fn replying(reply: impl Fn(&[Message]) -> Result<ChatResponse> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn text(text: &'static str) -> Arc<Self> {
        Self::replying(move |_| Ok(ChatResponse::text(text)))
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.clone()));
        (self.reply)(messages)
    }
}

fn generator(provider: Arc<MockProvider>) -> Generator {
    Skald::builder()
        .shared_provider(provider)
        .build()
        .expect("generator should build")
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn end_to_end_recipe() {
    let provider = MockProvider::text("A delicious recipe for braised pork...");
    let generator = generator(provider.clone());

    let text = generator
        .generate("recipe", "braised pork", "model-A")
        .await
        .unwrap();
    assert_eq!(text, "A delicious recipe for braised pork...");

    let records = generator.history().list_all().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.content_type, "recipe");
    assert_eq!(record.input_text, "braised pork");
    assert_eq!(record.model, "model-A");
    assert_eq!(record.output_text, "A delicious recipe for braised pork...");

    let cached = generator
        .cache()
        .get(&CacheKey::new("recipe", "braised pork", "model-A"))
        .await;
    assert_eq!(cached.as_deref(), Some("A delicious recipe for braised pork..."));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn request_uses_template_and_fixed_temperature() {
    let provider = MockProvider::text("ok");
    let generator = generator(provider.clone());
    let registry = TemplateRegistry::builtin().unwrap();
    let template = registry.lookup("travel_guide").unwrap();

    generator
        .generate("travel_guide", "Tokyo in five days", "gpt-4o")
        .await
        .unwrap();

    let calls = provider.calls.lock().unwrap();
    let (messages, options) = &calls[0];
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[0].content, template.system_prompt);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, template.render("Tokyo in five days"));
    assert!(messages[1].content.contains("Tokyo in five days"));
    assert_eq!(options.model, "gpt-4o");
    assert_eq!(options.temperature, Some(GENERATION_TEMPERATURE));
}

#[tokio::test]
async fn generate_request_delegates() {
    let provider = MockProvider::text("notes");
    let generator = generator(provider.clone());

    let request = GenerationRequest::new("book_notes", "To Live", "gpt-4o-mini");
    assert_eq!(generator.generate_request(&request).await.unwrap(), "notes");
    assert_eq!(provider.call_count(), 1);
}

// ============================================================================
// Cache behaviour
// ============================================================================

#[tokio::test]
async fn repeat_request_hits_cache() {
    let provider = MockProvider::text("cached text");
    let generator = generator(provider.clone());

    let first = generator.generate("recipe", "tea eggs", "m").await.unwrap();
    let second = generator.generate("recipe", "tea eggs", "m").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.call_count(), 1, "second call must not reach the API");
    assert_eq!(
        generator.history().len().unwrap(),
        1,
        "cache hits are not re-logged"
    );
}

#[tokio::test]
async fn any_key_field_change_misses() {
    let provider = MockProvider::text("text");
    let generator = generator(provider.clone());

    generator.generate("recipe", "tea", "m1").await.unwrap();
    generator.generate("recipe", "tea", "m2").await.unwrap();
    generator.generate("recipe", "coffee", "m1").await.unwrap();
    generator.generate("social_post", "tea", "m1").await.unwrap();

    assert_eq!(provider.call_count(), 4);
    assert_eq!(generator.history().len().unwrap(), 4);
}

#[tokio::test]
async fn expired_entry_triggers_fresh_call() {
    let provider = MockProvider::text("text");
    let generator = Skald::builder()
        .shared_provider(provider.clone())
        .cache(CacheConfig::new().ttl(Duration::from_millis(50)))
        .build()
        .unwrap();

    generator.generate("recipe", "tea", "m").await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    generator.generate("recipe", "tea", "m").await.unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(generator.history().len().unwrap(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn unknown_content_type_is_fatal_for_call() {
    let provider = MockProvider::text("unused");
    let generator = generator(provider.clone());

    let err = generator
        .generate("limerick", "cats", "m")
        .await
        .unwrap_err();

    assert!(matches!(err, SkaldError::UnknownTemplate(ref t) if t == "limerick"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn empty_input_makes_no_call() {
    let provider = MockProvider::text("unused");
    let generator = generator(provider.clone());

    for input in ["", "   ", "\n\t"] {
        let err = generator.generate("recipe", input, "m").await.unwrap_err();
        assert!(matches!(err, SkaldError::EmptyInput));
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn rate_limit_message_classified() {
    let provider = MockProvider::replying(|_| {
        Err(SkaldError::Api {
            status: 400,
            message: "Rate Limit reached for gpt-4o in organization org-x".into(),
        })
    });
    let generator = generator(provider.clone());

    let err = generator.generate("recipe", "tea", "m").await.unwrap_err();

    assert!(matches!(err, SkaldError::RateLimited { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn other_failure_surfaces_message() {
    let provider = MockProvider::replying(|_| {
        Err(SkaldError::Api {
            status: 503,
            message: "model overloaded".into(),
        })
    });
    let generator = generator(provider.clone());

    let err = generator.generate("recipe", "tea", "m").await.unwrap_err();

    match err {
        SkaldError::GenerationFailed(msg) => assert_eq!(msg, "model overloaded"),
        other => panic!("expected GenerationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failure_leaves_no_cache_or_history() {
    let provider = MockProvider::replying(|_| Err(SkaldError::Http("connection reset".into())));
    let generator = generator(provider.clone());

    assert!(generator.generate("recipe", "tea", "m").await.is_err());
    assert!(generator.generate("recipe", "tea", "m").await.is_err());

    assert_eq!(provider.call_count(), 2, "failures are not cached");
    assert!(generator.history().is_empty().unwrap());
    assert!(generator.cache().is_empty().await);
}

#[tokio::test]
async fn caller_can_retry_after_failure() {
    let attempts = Arc::new(Mutex::new(0));
    let counter = attempts.clone();
    let provider = MockProvider::replying(move |_| {
        let mut n = counter.lock().unwrap();
        *n += 1;
        if *n == 1 {
            Err(SkaldError::Http("timeout".into()))
        } else {
            Ok(ChatResponse::text("second time lucky"))
        }
    });
    let generator = generator(provider.clone());

    assert!(generator.generate("recipe", "tea", "m").await.is_err());
    let text = generator.generate("recipe", "tea", "m").await.unwrap();

    assert_eq!(text, "second time lucky");
    assert_eq!(generator.history().len().unwrap(), 1);
}

// ============================================================================
// History ordering through the pipeline
// ============================================================================

#[tokio::test]
async fn history_newest_first_with_unique_ids() {
    let provider = MockProvider::replying(|messages| {
        Ok(ChatResponse::text(format!("out: {}", messages[1].content.len())))
    });
    let generator = generator(provider);

    let inputs = ["one", "two", "three", "four"];
    for input in inputs {
        generator.generate("recipe", input, "m").await.unwrap();
    }

    let records = generator.history().list_all().unwrap();
    assert_eq!(records.len(), inputs.len());

    let got: Vec<_> = records.iter().map(|r| r.input_text.as_str()).collect();
    assert_eq!(got, ["four", "three", "two", "one"]);

    let mut ids: Vec<_> = records.iter().map(|r| r.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), inputs.len());
    assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[tokio::test]
async fn shared_history_store_sees_generations() {
    let store = Arc::new(HistoryStore::open_in_memory().unwrap());
    let generator = Skald::builder()
        .shared_provider(MockProvider::text("text"))
        .history(store.clone())
        .build()
        .unwrap();

    generator.generate("recipe", "tea", "m").await.unwrap();

    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn failed_history_append_rolls_back_cache() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("history.db");
    let store = Arc::new(HistoryStore::open(&path).unwrap());
    let provider = MockProvider::text("text");
    let generator = Skald::builder()
        .shared_provider(provider.clone())
        .history(store)
        .build()
        .unwrap();

    // Remove the table behind the store's back so the append fails.
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("DROP TABLE history")
        .unwrap();

    let err = generator.generate("recipe", "tea", "m").await.unwrap_err();

    assert!(matches!(err, SkaldError::Storage(_)));
    assert_eq!(provider.call_count(), 1);
    let cached = generator
        .cache()
        .get(&CacheKey::new("recipe", "tea", "m"))
        .await;
    assert!(cached.is_none(), "cache entry must not outlive a failed append");
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn builder_without_provider_fails() {
    let result = Skald::builder().build();
    assert!(matches!(result, Err(SkaldError::NoProvider)));
}

#[test]
fn builder_rejects_zero_capacity_cache() {
    let result = Skald::builder()
        .shared_provider(MockProvider::text("x"))
        .cache(CacheConfig::new().max_entries(0))
        .build();
    assert!(matches!(result, Err(SkaldError::Configuration(_))));
}

#[test]
fn builder_with_openai_compiles() {
    let generator = Skald::builder()
        .openai("sk-test", "http://localhost:1/v1", Some(Duration::from_secs(5)))
        .build()
        .unwrap();
    assert_eq!(generator.provider_name(), "openai");
    assert_eq!(generator.registry().len(), 4);
}
