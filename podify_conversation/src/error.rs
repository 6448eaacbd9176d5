use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures a turn can run into.
///
/// `SearchUnavailable` never escapes `PodcastSearchClient`; it exists so the
/// absorbed failure is logged under a named kind.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("Intent extraction unavailable: {0}")]
    ExtractionUnavailable(anyhow::Error),

    #[error("Podcast search unavailable: {0}")]
    SearchUnavailable(anyhow::Error),

    #[error("Recommendation unavailable: {0}")]
    RecommendationUnavailable(anyhow::Error),
}
