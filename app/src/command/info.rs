use podify_config::{AgentConfig, Config};

/// Strategy for displaying the effective configuration.
///
/// Credentials are masked; environment overrides are already applied.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== podify Configuration ===\n");

        println!("API Keys:");
        println!("  Gemini: {}", mask_secret(&config.providers.gemini.api_key));
        println!(
            "  Podchaser: {}",
            mask_secret(&config.providers.podchaser.api_key)
        );
        println!();

        println!("Endpoints:");
        println!(
            "  Gemini: {}",
            config
                .providers
                .gemini
                .base_url
                .as_deref()
                .unwrap_or("(default)")
        );
        println!(
            "  Podchaser: {}",
            config
                .providers
                .podchaser
                .endpoint
                .as_deref()
                .unwrap_or("(default)")
        );
        println!("  Request Timeout: {}s", config.http.request_timeout_secs);
        println!();

        print_agent("Extractor", &config.agents.extractor);
        print_agent("Recommender", &config.agents.recommender);

        println!("Search Filter:");
        println!(
            "  Rating: {} - {}",
            config.search.min_rating, config.search.max_rating
        );
        println!("  Page Size: {}", config.search.page_size);
        println!("  Page: {}", config.search.page);

        Ok(())
    }
}

fn print_agent(name: &str, agent: &AgentConfig) {
    println!("{name}:");
    println!("  Model: {}", agent.model);
    println!("  Max Output Tokens: {}", agent.max_output_tokens);
    println!();
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret_keeps_ends() {
        assert_eq!(mask_secret("abcd1234efgh5678"), "abcd...5678");
    }

    #[test]
    fn test_mask_secret_hides_short_values() {
        assert_eq!(mask_secret("short"), "***");
    }
}
