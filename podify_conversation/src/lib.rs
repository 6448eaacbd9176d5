#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Multi-turn podcast recommendation.
//!
//! A user turn runs through three stages, in order:
//! - `IntentExtractor` turns the message into a short search phrase, with no memory
//! - `PodcastSearchClient` looks that phrase up in the catalog, degrading to no results
//! - `RecommendationEngine` answers with the session's full history as context
//!
//! `Orchestrator` sequences the stages, keeps the display transcript, and
//! turns failures into a user-visible apology.

mod engine;
mod error;
mod intent;
mod orchestrator;
mod search;
mod session;
mod store;

pub use engine::{EngineConfig, RecommendationEngine, render_turn_prompt};
pub use error::{Error, Result};
pub use intent::{ExtractorConfig, IntentExtractor, SearchIntent, parse_search_intent};
pub use orchestrator::{
    APOLOGY_MESSAGE, Orchestrator, Sender, TurnListener, TurnOutcome, TurnRecord, TurnState,
    searching_message,
};
pub use search::PodcastSearchClient;
pub use session::ConversationSession;
pub use store::{EvictionPolicy, IdleFor, NeverEvict, SessionStore, SharedSession};
