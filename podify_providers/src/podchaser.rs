use anyhow::Context;
use async_trait::async_trait;
use podify_core::{FilterParams, PodcastCatalog, PodcastResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_ENDPOINT: &str = "https://api.podchaser.com/graphql";

/// Podcast search against the Podchaser GraphQL API.
pub struct PodchaserCatalog {
    client: Client,
    api_token: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PodcastsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PodcastsData {
    podcasts: Option<PodcastPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodcastPage {
    paginator_info: Option<PaginatorInfo>,
    data: Option<Vec<PodcastResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginatorInfo {
    current_page: Option<u32>,
    has_more_pages: Option<bool>,
    last_page: Option<u32>,
}

impl PodchaserCatalog {
    pub fn new(api_token: String, timeout: Duration) -> anyhow::Result<Self> {
        info!("Creating PodchaserCatalog");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_token,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// Render the `podcasts` query for one search.
///
/// The search term goes in as a JSON string literal, which is also a valid
/// GraphQL string literal, so quotes in model-produced phrases stay inert.
fn build_query(search_term: &str, filter: &FilterParams) -> String {
    let term = serde_json::Value::String(search_term.to_string());
    format!(
        "query {{
  podcasts(
    searchTerm: {term},
    first: {first},
    page: {page},
    filters: {{rating: {{minRating: {min}, maxRating: {max}}}}}
  ) {{
    paginatorInfo {{ currentPage hasMorePages lastPage }}
    data {{ id title description webUrl imageUrl }}
  }}
}}",
        first = filter.page_size,
        page = filter.page,
        min = filter.min_rating,
        max = filter.max_rating,
    )
}

fn parse_page(body: GraphQlResponse) -> anyhow::Result<Vec<PodcastResult>> {
    let page = body.data.and_then(|data| data.podcasts);

    let Some(page) = page else {
        let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
        if messages.is_empty() {
            anyhow::bail!("Unexpected API response structure: missing data.podcasts");
        }
        anyhow::bail!("Podchaser returned errors: {}", messages.join("; "));
    };

    if let Some(info) = &page.paginator_info {
        debug!(
            "Podchaser page {:?} of {:?}, more pages: {:?}",
            info.current_page, info.last_page, info.has_more_pages
        );
    }

    page.data.ok_or_else(|| {
        anyhow::anyhow!("Unexpected API response structure: missing data.podcasts.data")
    })
}

#[async_trait]
impl PodcastCatalog for PodchaserCatalog {
    async fn search(
        &self,
        search_term: &str,
        filter: &FilterParams,
    ) -> anyhow::Result<Vec<PodcastResult>> {
        let query = build_query(search_term, filter);

        info!(
            "Searching Podchaser: term={search_term:?}, first={}",
            filter.page_size
        );

        let body = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&json!({ "query": query }))
            .send()
            .await?
            .error_for_status()?
            .json::<GraphQlResponse>()
            .await?;

        let podcasts = parse_page(body)?;

        info!("Podchaser returned {} podcasts", podcasts.len());
        Ok(podcasts)
    }
}
