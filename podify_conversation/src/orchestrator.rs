//! Per-turn orchestration: extract, search, recommend.
//!
//! The orchestrator owns the display state a front-end renders (turn records,
//! the current podcast set, the loading flag) and is the single place where
//! user-visible failure text is produced.

use std::fmt;
use std::sync::Arc;

use podify_core::{FilterParams, LLMProvider, PodcastCatalog, PodcastResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::RecommendationEngine;
use crate::intent::IntentExtractor;
use crate::search::PodcastSearchClient;

pub const APOLOGY_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

#[must_use]
pub fn searching_message(search_term: &str) -> String {
    format!("🔎 Finding podcasts about \"{search_term}\"...")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
    Assistant,
}

/// One entry of the display transcript. Never changed after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub sender: Sender,
    pub text: String,
}

impl TurnRecord {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Extracting,
    Searching,
    Recommending,
    Failed,
}

impl TurnState {
    /// Whether the turn state machine allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Extracting)
                | (Self::Extracting, Self::Searching)
                | (Self::Searching, Self::Recommending)
                | (Self::Recommending, Self::Idle)
                | (
                    Self::Extracting | Self::Searching | Self::Recommending,
                    Self::Failed
                )
                | (Self::Failed, Self::Idle)
        )
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Searching => "searching",
            Self::Recommending => "recommending",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a call to [`Orchestrator::handle_turn`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// An assistant record was appended.
    Completed,
    /// An apology record was appended.
    Failed,
}

/// Receives display updates while a turn is running.
pub trait TurnListener: Send + Sync {
    fn on_state(&self, _state: TurnState) {}
    fn on_record(&self, _record: &TurnRecord) {}
    fn on_podcasts(&self, _podcasts: &[PodcastResult]) {}
}

pub struct Orchestrator<P = Arc<dyn LLMProvider>, C = Arc<dyn PodcastCatalog>>
where
    P: Send + Sync,
    C: Send + Sync,
{
    extractor: IntentExtractor<P>,
    search: PodcastSearchClient<C>,
    engine: Arc<RecommendationEngine<P>>,
    filter: FilterParams,
    records: Vec<TurnRecord>,
    podcasts: Vec<PodcastResult>,
    state: TurnState,
    listener: Option<Box<dyn TurnListener>>,
}

impl<P, C> Orchestrator<P, C>
where
    P: LLMProvider + Send + Sync,
    C: PodcastCatalog + Send + Sync,
{
    pub fn new(
        extractor: IntentExtractor<P>,
        search: PodcastSearchClient<C>,
        engine: Arc<RecommendationEngine<P>>,
        filter: FilterParams,
    ) -> Self {
        Self {
            extractor,
            search,
            engine,
            filter,
            records: Vec::new(),
            podcasts: Vec::new(),
            state: TurnState::Idle,
            listener: None,
        }
    }

    #[must_use]
    pub fn with_listener(mut self, listener: impl TurnListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    #[must_use]
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    #[must_use]
    pub fn podcasts(&self) -> &[PodcastResult] {
        &self.podcasts
    }

    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state != TurnState::Idle
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterParams {
        &self.filter
    }

    /// Run one user turn to completion.
    ///
    /// The user record is appended before any remote call starts. Extraction
    /// failure stops the turn before search; search failure only empties the
    /// podcast set; recommendation failure adds an apology. The orchestrator
    /// is back in `Idle` when this returns.
    pub async fn handle_turn(&mut self, session_id: &str, user_text: &str) -> TurnOutcome {
        if user_text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        if self.is_loading() {
            // A previous turn future was dropped before finishing.
            warn!("Abandoned turn left state {}; resetting", self.state);
            self.state = TurnState::Idle;
        }

        self.transition(TurnState::Extracting);
        self.push_record(Sender::User, user_text);

        let intent = match self.extractor.extract(user_text).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Turn failed during extraction: {e}");
                return self.fail();
            }
        };

        self.push_record(Sender::System, searching_message(&intent.search_term));
        self.transition(TurnState::Searching);

        let podcasts = self.search.search(&intent.search_term, &self.filter).await;
        self.replace_podcasts(podcasts);
        self.transition(TurnState::Recommending);

        let reply = self
            .engine
            .respond(session_id, user_text, &self.podcasts)
            .await;

        match reply {
            Ok(reply) => {
                self.push_record(Sender::Assistant, reply);
                self.transition(TurnState::Idle);
                info!("Turn completed for session: {session_id}");
                TurnOutcome::Completed
            }
            Err(e) => {
                warn!("Turn failed during recommendation: {e}");
                self.fail()
            }
        }
    }

    fn fail(&mut self) -> TurnOutcome {
        self.transition(TurnState::Failed);
        self.push_record(Sender::System, APOLOGY_MESSAGE);
        self.transition(TurnState::Idle);
        TurnOutcome::Failed
    }

    fn transition(&mut self, next: TurnState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid turn transition {} -> {next}",
            self.state
        );
        debug!("Turn state: {} -> {next}", self.state);
        self.state = next;
        if let Some(listener) = &self.listener {
            listener.on_state(next);
        }
    }

    fn push_record(&mut self, sender: Sender, text: impl Into<String>) {
        let record = TurnRecord::new(sender, text);
        if let Some(listener) = &self.listener {
            listener.on_record(&record);
        }
        self.records.push(record);
    }

    fn replace_podcasts(&mut self, podcasts: Vec<PodcastResult>) {
        self.podcasts = podcasts;
        if let Some(listener) = &self.listener {
            listener.on_podcasts(&self.podcasts);
        }
    }
}
