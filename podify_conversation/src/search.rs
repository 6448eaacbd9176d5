use podify_core::{FilterParams, PodcastCatalog, PodcastResult};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Error;

/// Catalog search that never fails.
///
/// Any transport or decoding failure is logged as `SearchUnavailable` and
/// reported to the caller as an empty result set.
pub struct PodcastSearchClient<C = Arc<dyn PodcastCatalog>>
where
    C: Send + Sync,
{
    catalog: C,
}

impl<C> PodcastSearchClient<C>
where
    C: PodcastCatalog + Send + Sync,
{
    pub const fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub async fn search(&self, phrase: &str, filter: &FilterParams) -> Vec<PodcastResult> {
        match self.catalog.search(phrase, filter).await {
            Ok(mut podcasts) => {
                podcasts.truncate(filter.max_results());
                info!("Found {} podcasts for {phrase:?}", podcasts.len());
                podcasts
            }
            Err(e) => {
                let err = Error::SearchUnavailable(e);
                warn!("{err}; continuing with no podcasts");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(Result<Vec<PodcastResult>, String>);

    #[async_trait]
    impl PodcastCatalog for Fixed {
        async fn search(
            &self,
            _search_term: &str,
            _filter: &FilterParams,
        ) -> anyhow::Result<Vec<PodcastResult>> {
            self.0.clone().map_err(anyhow::Error::msg)
        }
    }

    fn podcast(id: &str) -> PodcastResult {
        PodcastResult {
            id: id.to_string(),
            title: format!("Podcast {id}"),
            description: None,
            web_url: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_transport_error_degrades_to_empty() {
        let client = PodcastSearchClient::new(Fixed(Err("connection refused".to_string())));
        assert!(client.search("sleep", &FilterParams::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_results_keep_order_and_page_bound() {
        let all = (1..=6).map(|i| podcast(&i.to_string())).collect();
        let client = PodcastSearchClient::new(Fixed(Ok(all)));

        let found = client.search("sleep", &FilterParams::default()).await;

        let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);
    }
}
