//! Process-lifetime session store.
//!
//! Maps a session key to its transcript. Each transcript sits behind its own
//! async mutex; holding that guard is what serializes model calls for one
//! session while other sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::session::ConversationSession;

pub type SharedSession = Arc<Mutex<ConversationSession>>;

/// Decides whether an idle session may be dropped from the store.
pub trait EvictionPolicy: Send + Sync {
    fn should_evict(&self, session: &ConversationSession) -> bool;
}

/// Keep every session for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn should_evict(&self, _session: &ConversationSession) -> bool {
        false
    }
}

/// Drop sessions that have not been extended for at least the given duration.
#[derive(Debug, Clone, Copy)]
pub struct IdleFor(pub Duration);

impl EvictionPolicy for IdleFor {
    fn should_evict(&self, session: &ConversationSession) -> bool {
        let idle = Utc::now().signed_duration_since(session.updated_at());
        idle.to_std().is_ok_and(|idle| idle >= self.0)
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, SharedSession>>,
    system_prompt: String,
    eviction: Box<dyn EvictionPolicy>,
}

impl SessionStore {
    /// Create a store whose new sessions are seeded with `system_prompt`.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            system_prompt: system_prompt.into(),
            eviction: Box::new(NeverEvict),
        }
    }

    #[must_use]
    pub fn with_eviction(mut self, policy: impl EvictionPolicy + 'static) -> Self {
        self.eviction = Box::new(policy);
        self
    }

    /// Look up the session for `key`, creating it on first reference.
    ///
    /// Repeated calls with the same key return handles to the same transcript.
    pub async fn get_or_create(&self, key: &str) -> SharedSession {
        let mut sessions = self.sessions.lock().await;
        self.sweep_locked(&mut sessions);

        if let Some(session) = sessions.get(key) {
            return Arc::clone(session);
        }

        info!("Creating session: {key}");
        let session = Arc::new(Mutex::new(ConversationSession::new(
            key,
            self.system_prompt.clone(),
        )));
        sessions.insert(key.to_string(), Arc::clone(&session));
        session
    }

    /// Existing session for `key`, if any. Never creates one.
    pub async fn get(&self, key: &str) -> Option<SharedSession> {
        self.sessions.lock().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.sessions.lock().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Apply the eviction policy now. Returns how many sessions were dropped.
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.sweep_locked(&mut sessions)
    }

    /// Sessions still referenced or locked by a caller are never dropped.
    fn sweep_locked(&self, sessions: &mut HashMap<String, SharedSession>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| {
            if Arc::strong_count(session) > 1 {
                return true;
            }
            session
                .try_lock()
                .map_or(true, |guard| !self.eviction.should_evict(&guard))
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {evicted} idle sessions");
        }
        evicted
    }
}
