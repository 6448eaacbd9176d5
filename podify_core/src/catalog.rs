//! Podcast catalog vocabulary shared by the search transport and the
//! recommendation pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single podcast returned by the catalog.
///
/// Field names follow the catalog's wire shape (`webUrl`, `imageUrl`), so the
/// same type decodes the search response and is serialized into model prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastResult {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Query-time filter applied to every catalog search.
///
/// These are policy, not user input. They live in configuration so they can
/// change without touching the orchestration code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default = "FilterParams::default_min_rating")]
    pub min_rating: f32,
    #[serde(default = "FilterParams::default_max_rating")]
    pub max_rating: f32,
    #[serde(default = "FilterParams::default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub page: u32,
}

impl FilterParams {
    const fn default_min_rating() -> f32 {
        4.0
    }

    const fn default_max_rating() -> f32 {
        5.0
    }

    const fn default_page_size() -> u32 {
        4
    }

    /// Whether `rating` falls inside the inclusive rating window.
    #[must_use]
    pub fn contains_rating(&self, rating: f32) -> bool {
        (self.min_rating..=self.max_rating).contains(&rating)
    }

    /// Page size as a `usize` bound for result truncation.
    #[must_use]
    pub fn max_results(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(usize::MAX)
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_rating: Self::default_min_rating(),
            max_rating: Self::default_max_rating(),
            page_size: Self::default_page_size(),
            page: 0,
        }
    }
}

/// Raw transport to a podcast directory.
///
/// Implementations report every failure as an error; turning failures into an
/// empty result set is the caller's job.
#[async_trait]
pub trait PodcastCatalog: Send + Sync {
    async fn search(
        &self,
        search_term: &str,
        filter: &FilterParams,
    ) -> anyhow::Result<Vec<PodcastResult>>;
}

#[async_trait]
impl<T: PodcastCatalog + ?Sized> PodcastCatalog for Arc<T> {
    async fn search(
        &self,
        search_term: &str,
        filter: &FilterParams,
    ) -> anyhow::Result<Vec<PodcastResult>> {
        (**self).search(search_term, filter).await
    }
}
