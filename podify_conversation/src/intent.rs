//! Single-turn extraction of a podcast search phrase from free text.

use podify_core::{ChatMessage, LLMProvider, prompts::EXTRACTOR_SYSTEM_PROMPT};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// The phrase to search the catalog with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchIntent {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
}

/// Pull the `{"searchTerm": ...}` object out of free-form model output.
///
/// Only the span from the first `{` to the last `}` is parsed, so prose or
/// code fences around the object are ignored.
pub fn parse_search_intent(raw: &str) -> Result<SearchIntent> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(Error::MalformedModelOutput(format!(
            "no JSON object in model output: {raw:?}"
        )));
    };

    if end < start {
        return Err(Error::MalformedModelOutput(format!(
            "no JSON object in model output: {raw:?}"
        )));
    }

    let intent: SearchIntent = serde_json::from_str(&raw[start..=end])
        .map_err(|e| Error::MalformedModelOutput(format!("{e}: {raw:?}")))?;

    let search_term = intent.search_term.trim();
    if search_term.is_empty() {
        return Err(Error::MalformedModelOutput("searchTerm is blank".to_string()));
    }

    Ok(SearchIntent {
        search_term: search_term.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub model: String,
    pub system_prompt: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            system_prompt: EXTRACTOR_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ExtractorConfig {
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

/// Memoryless extractor: every call sends only the instruction and the
/// current utterance.
pub struct IntentExtractor<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    config: ExtractorConfig,
}

impl<P> IntentExtractor<P>
where
    P: LLMProvider + Send + Sync,
{
    pub const fn new(provider: P, config: ExtractorConfig) -> Self {
        Self { provider, config }
    }

    /// Map `user_text` to a search phrase. Callers reject blank input first.
    pub async fn extract(&self, user_text: &str) -> Result<SearchIntent> {
        let messages = [
            ChatMessage::system(self.config.system_prompt.clone()),
            ChatMessage::user(format!("User message: {user_text}")),
        ];

        let response = self
            .provider
            .chat(&messages, &self.config.model)
            .await
            .map_err(Error::ExtractionUnavailable)?;

        debug!("Extractor raw output: {:?}", response.content);

        let intent = parse_search_intent(&response.content)?;
        info!("Resolved search phrase: {:?}", intent.search_term);
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use podify_core::{LLMResponse, Role};
    use std::sync::Mutex;

    struct Recording {
        reply: String,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl LLMProvider for Recording {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _model: &str,
        ) -> anyhow::Result<LLMResponse> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(messages.to_vec());
            }
            Ok(LLMResponse {
                content: self.reply.clone(),
                usage: None,
            })
        }

        fn get_default_model(&self) -> &'static str {
            "recording"
        }
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_parses_object_wrapped_in_prose() {
        let intent =
            parse_search_intent(r#"Sure! {"searchTerm": "true crime"} Hope that helps!"#)
                .expect("object present");
        assert_eq!(intent.search_term, "true crime");
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_parses_fenced_object() {
        let raw = "```json\n{\"searchTerm\": \"  Ghosting \"}\n```";
        let intent = parse_search_intent(raw).expect("object present");
        assert_eq!(intent.search_term, "Ghosting");
    }

    #[test]
    fn test_rejects_output_without_braces() {
        let err = parse_search_intent("relaxation").err();
        assert!(matches!(err, Some(Error::MalformedModelOutput(_))));
    }

    #[test]
    fn test_rejects_reversed_braces() {
        let err = parse_search_intent("} nothing here {").err();
        assert!(matches!(err, Some(Error::MalformedModelOutput(_))));
    }

    #[test]
    fn test_rejects_missing_key() {
        let err = parse_search_intent(r#"{"topic": "sleep"}"#).err();
        assert!(matches!(err, Some(Error::MalformedModelOutput(_))));
    }

    #[test]
    fn test_rejects_blank_term() {
        let err = parse_search_intent(r#"{"searchTerm": "   "}"#).err();
        assert!(matches!(err, Some(Error::MalformedModelOutput(_))));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn test_extract_sends_no_history() {
        let provider = Arc::new(Recording {
            reply: r#"{"searchTerm": "relaxation"}"#.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let extractor = IntentExtractor::new(Arc::clone(&provider), ExtractorConfig::default());

        extractor.extract("first").await.expect("extracts");
        let intent = extractor.extract("second").await.expect("extracts");

        assert_eq!(intent.search_term, "relaxation");
        let seen = provider.seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        for call in seen.iter() {
            assert_eq!(call.len(), 2);
            assert_eq!(call[0].role, Role::System);
        }
        assert_eq!(seen[1][1].content, "User message: second");
    }
}
