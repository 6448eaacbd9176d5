//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! from `main` without trait objects.

use podify_config::Config;
use podify_conversation::{
    EngineConfig, ExtractorConfig, IntentExtractor, Orchestrator, PodcastSearchClient,
    RecommendationEngine, SessionStore,
};
use podify_core::{LLMProvider, PodcastCatalog, prompts::RECOMMENDER_SYSTEM_PROMPT};
use podify_providers::{GeminiProvider, PodchaserCatalog};
use std::sync::Arc;
use tracing::info;

mod chat;
mod info;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// adding a command only requires implementing this trait.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

fn gemini(config: &Config, max_output_tokens: u32) -> anyhow::Result<GeminiProvider> {
    let gemini = &config.providers.gemini;
    let mut provider = GeminiProvider::new(gemini.api_key.clone(), config.http.request_timeout())?
        .with_max_output_tokens(max_output_tokens);
    if let Some(base_url) = &gemini.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(provider)
}

/// Wire the extractor, search client and recommendation engine from config.
fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    let extractor_llm: Arc<dyn LLMProvider> =
        Arc::new(gemini(config, config.agents.extractor.max_output_tokens)?);
    let recommender_llm: Arc<dyn LLMProvider> =
        Arc::new(gemini(config, config.agents.recommender.max_output_tokens)?);

    let podchaser = &config.providers.podchaser;
    let mut catalog =
        PodchaserCatalog::new(podchaser.api_key.clone(), config.http.request_timeout())?;
    if let Some(endpoint) = &podchaser.endpoint {
        catalog = catalog.with_endpoint(endpoint.clone());
    }
    let catalog: Arc<dyn PodcastCatalog> = Arc::new(catalog);

    info!(
        "Models: extractor={}, recommender={}",
        config.agents.extractor.model, config.agents.recommender.model
    );

    let extractor = IntentExtractor::new(
        extractor_llm,
        ExtractorConfig::default().with_model(config.agents.extractor.model.clone()),
    );
    let engine = RecommendationEngine::new(
        recommender_llm,
        Arc::new(SessionStore::new(RECOMMENDER_SYSTEM_PROMPT)),
        EngineConfig::default().with_model(config.agents.recommender.model.clone()),
    );

    Ok(Orchestrator::new(
        extractor,
        PodcastSearchClient::new(catalog),
        Arc::new(engine),
        config.search,
    ))
}
