//! Session-scoped recommendation engine.
//!
//! The engine is the only component with cross-turn memory. Each call for a
//! session sees every completed exchange of that session, and calls for the
//! same session run one at a time.

use podify_core::{ChatMessage, LLMProvider, PodcastResult, prompts::RECOMMENDER_SYSTEM_PROMPT};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::SessionStore;

/// Configuration for the recommendation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model to use for completions
    pub model: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

/// Render the user turn the model sees: the raw message plus the podcasts
/// just found for it.
#[must_use]
pub fn render_turn_prompt(user_text: &str, podcasts: &[PodcastResult]) -> String {
    if podcasts.is_empty() {
        return format!("User message: {user_text}\n\nPodcasts found: none.");
    }

    let listing = serde_json::to_string_pretty(podcasts).unwrap_or_default();

    format!(
        "User message: {user_text}\n\nPodcasts found ({}):\n{listing}",
        podcasts.len()
    )
}

pub struct RecommendationEngine<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    store: Arc<SessionStore>,
    config: EngineConfig,
}

impl<P> RecommendationEngine<P>
where
    P: LLMProvider + Send + Sync,
{
    pub const fn new(provider: P, store: Arc<SessionStore>, config: EngineConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Engine backed by a fresh store seeded with the recommender persona.
    pub fn with_default_store(provider: P, config: EngineConfig) -> Self {
        Self::new(
            provider,
            Arc::new(SessionStore::new(RECOMMENDER_SYSTEM_PROMPT)),
            config,
        )
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Produce a recommendation for one turn of `session_id`.
    ///
    /// The session guard is held across the model call, so a second call for
    /// the same session waits and then sees this exchange in full. On failure
    /// the transcript is left exactly as it was.
    pub async fn respond(
        &self,
        session_id: &str,
        user_text: &str,
        podcasts: &[PodcastResult],
    ) -> Result<String> {
        let session = self.store.get_or_create(session_id).await;
        let mut session = session.lock().await;

        let turn_number = session.exchange_count() + 1;
        info!("Processing turn {turn_number} for session: {session_id}");

        let turn = ChatMessage::user(render_turn_prompt(user_text, podcasts));
        let messages = session.context_with(&turn);
        debug!(
            "Recommendation context: {} messages, {} podcasts",
            messages.len(),
            podcasts.len()
        );

        let response = self
            .provider
            .chat(&messages, &self.config.model)
            .await
            .map_err(Error::RecommendationUnavailable)?;

        if response.content.trim().is_empty() {
            return Err(Error::RecommendationUnavailable(anyhow::anyhow!(
                "Empty response from LLM"
            )));
        }

        if let Some(usage) = &response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        session.record_exchange(turn, ChatMessage::assistant(response.content.clone()));
        debug!("Turn {turn_number} completed for session: {session_id}");

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use podify_core::LLMResponse;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Replies with a numbered answer after a short delay and records every
    /// context it was given. Calls listed in `fail_on` return an error.
    struct Scripted {
        calls: AtomicUsize,
        contexts: Mutex<Vec<Vec<ChatMessage>>>,
        fail_on: Vec<usize>,
        reply_blank: bool,
    }

    impl Scripted {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                contexts: Mutex::new(Vec::new()),
                fail_on: Vec::new(),
                reply_blank: false,
            }
        }

        fn contexts(&self) -> Vec<Vec<ChatMessage>> {
            self.contexts.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _model: &str,
        ) -> anyhow::Result<LLMResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Ok(mut contexts) = self.contexts.lock() {
                contexts.push(messages.to_vec());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;

            if self.fail_on.contains(&call) {
                anyhow::bail!("rate limited");
            }
            let content = if self.reply_blank {
                "  ".to_string()
            } else {
                format!("reply {call}")
            };
            Ok(LLMResponse {
                content,
                usage: None,
            })
        }

        fn get_default_model(&self) -> &'static str {
            "scripted"
        }
    }

    fn podcast(title: &str) -> PodcastResult {
        PodcastResult {
            id: title.to_lowercase(),
            title: title.to_string(),
            description: Some("About calm".to_string()),
            web_url: None,
            image_url: None,
        }
    }

    fn engine(provider: &Arc<Scripted>) -> RecommendationEngine<Arc<Scripted>> {
        RecommendationEngine::with_default_store(Arc::clone(provider), EngineConfig::default())
    }

    #[test]
    fn test_turn_prompt_serializes_podcasts() {
        let prompt = render_turn_prompt("stressed", &[podcast("Calm Minds")]);

        assert!(prompt.starts_with("User message: stressed"));
        assert!(prompt.contains("Podcasts found (1):"));
        assert!(prompt.contains(r#""title": "Calm Minds""#));
    }

    #[test]
    fn test_turn_prompt_marks_empty_results() {
        let prompt = render_turn_prompt("stressed", &[]);
        assert!(prompt.ends_with("Podcasts found: none."));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn test_unseen_session_created_once() {
        let provider = Arc::new(Scripted::new());
        let engine = engine(&provider);

        engine.respond("fresh", "one", &[]).await.expect("first call");
        engine.respond("fresh", "two", &[]).await.expect("second call");

        assert_eq!(engine.store().len().await, 1);
        let session = engine.store().get("fresh").await.expect("session exists");
        assert_eq!(session.lock().await.exchange_count(), 2);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn test_second_turn_sees_first_exchange() {
        let provider = Arc::new(Scripted::new());
        let engine = engine(&provider);

        engine.respond("s", "T1", &[]).await.expect("first call");
        engine.respond("s", "T2", &[]).await.expect("second call");

        let contexts = provider.contexts();
        let second: Vec<&str> = contexts[1].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(second.len(), 4);
        assert!(second[1].contains("T1"));
        assert_eq!(second[2], "reply 1");
        assert!(second[3].contains("T2"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_same_session_are_serialized() {
        let provider = Arc::new(Scripted::new());
        let engine = engine(&provider);

        let (a, b) = tokio::join!(
            engine.respond("shared", "A", &[]),
            engine.respond("shared", "B", &[])
        );
        assert!(a.is_ok() && b.is_ok());

        let contexts = provider.contexts();
        assert_eq!(contexts[0].len(), 2);
        assert_eq!(contexts[1].len(), 4);
        assert_eq!(contexts[1][2].content, "reply 1");
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_share_history() {
        let provider = Arc::new(Scripted::new());
        let engine = engine(&provider);

        let (a, b) = tokio::join!(
            engine.respond("left", "A", &[]),
            engine.respond("right", "B", &[])
        );
        assert!(a.is_ok() && b.is_ok());

        for context in provider.contexts() {
            assert_eq!(context.len(), 2);
        }
        assert_eq!(engine.store().len().await, 2);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn test_failed_call_leaves_transcript_untouched() {
        let provider = Arc::new(Scripted {
            fail_on: vec![2],
            ..Scripted::new()
        });
        let engine = engine(&provider);

        engine.respond("s", "ok", &[]).await.expect("first call");
        let err = engine.respond("s", "boom", &[]).await.err();
        assert!(matches!(err, Some(Error::RecommendationUnavailable(_))));

        let session = engine.store().get("s").await.expect("session exists");
        assert_eq!(session.lock().await.exchange_count(), 1);

        engine.respond("s", "again", &[]).await.expect("session still usable");
        assert_eq!(provider.contexts()[2].len(), 4);
    }

    #[tokio::test]
    async fn test_blank_reply_is_unavailable() {
        let provider = Arc::new(Scripted {
            reply_blank: true,
            ..Scripted::new()
        });
        let engine = engine(&provider);

        let err = engine.respond("s", "hi", &[]).await.err();
        assert!(matches!(err, Some(Error::RecommendationUnavailable(_))));
    }
}
