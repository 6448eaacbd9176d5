use podify_core::FilterParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const GEMINI_API_KEY_ENV: &str = "PODIFY_GEMINI_API_KEY";
pub const PODCHASER_API_KEY_ENV: &str = "PODIFY_PODCHASER_API_KEY";

const PLACEHOLDER_PREFIX: &str = "your-";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub search: FilterParams,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentsConfig {
    #[serde(default = "AgentConfig::extractor")]
    pub extractor: AgentConfig,
    #[serde(default = "AgentConfig::recommender")]
    pub recommender: AgentConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            extractor: AgentConfig::extractor(),
            recommender: AgentConfig::recommender(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub max_output_tokens: u32,
}

impl AgentConfig {
    fn extractor() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            max_output_tokens: 1000,
        }
    }

    fn recommender() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            max_output_tokens: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub podchaser: PodchaserConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PodchaserConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "HttpConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl HttpConfig {
    const fn default_request_timeout_secs() -> u64 {
        30
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with(PLACEHOLDER_PREFIX)
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("podify"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/podify/config.json`, apply credential overrides from the
    /// environment, and check that both credentials are present.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'podify init' to create config.",
                config_path.display()
            );
        }

        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Replace credentials with values from `lookup` when it has them.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(GEMINI_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            info!("Using Gemini API key from {GEMINI_API_KEY_ENV}");
            self.providers.gemini.api_key = key;
        }
        if let Some(key) = lookup(PODCHASER_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            info!("Using Podchaser API key from {PODCHASER_API_KEY_ENV}");
            self.providers.podchaser.api_key = key;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if is_unset(&self.providers.gemini.api_key) {
            anyhow::bail!(
                "Missing Gemini API key: set providers.gemini.api_key or {GEMINI_API_KEY_ENV}"
            );
        }
        if is_unset(&self.providers.podchaser.api_key) {
            anyhow::bail!(
                "Missing Podchaser API key: set providers.podchaser.api_key or {PODCHASER_API_KEY_ENV}"
            );
        }
        if !self.search.contains_rating(self.search.min_rating) {
            anyhow::bail!(
                "Invalid search filter: empty rating window {} - {}",
                self.search.min_rating,
                self.search.max_rating
            );
        }
        if self.search.page_size == 0 {
            anyhow::bail!("Invalid search filter: page_size must be at least 1");
        }
        Ok(())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "agents": {
    "extractor": {
      "model": "gemini-2.0-flash",
      "max_output_tokens": 1000
    },
    "recommender": {
      "model": "gemini-2.0-flash",
      "max_output_tokens": 1000
    }
  },
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here"
    },
    "podchaser": {
      "api_key": "your-podchaser-api-token-here"
    }
  },
  "search": {
    "min_rating": 4,
    "max_rating": 5,
    "page_size": 4,
    "page": 0
  },
  "http": {
    "request_timeout_secs": 30
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your Gemini API key (or export {GEMINI_API_KEY_ENV})");
        println!("   2. Add your Podchaser API token (or export {PODCHASER_API_KEY_ENV})");
        println!("   3. Run 'podify chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - agents.*.model: Gemini model for each persona");
        println!("   - search: rating window and page size for podcast lookups");
        println!("   - http.request_timeout_secs: upper bound for every remote call");
        println!();
        Ok(())
    }
}
