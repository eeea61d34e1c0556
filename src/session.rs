//! Session ownership
//!
//! Every workout session owns its own `RepCounter`, looked up by an explicit
//! `SessionId`. There is no process-wide registry and no fallback to "whichever
//! session is active": an unknown id is an error.

use crate::config::CounterConfig;
use crate::error::RepError;
use crate::pipeline::RepCounter;
use crate::types::{PoseEstimate, RepRecord, WorkoutSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::info;
use uuid::Uuid;

/// Opaque session handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, RepError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| RepError::UnknownSession(format!("{s}: {e}")))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owned set of live sessions. Hosts that share it across threads wrap it in
/// their own lock.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, RepCounter>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with its own detector states and totals
    pub fn create_session(&mut self, config: CounterConfig) -> Result<SessionId, RepError> {
        let id = SessionId::new();
        let counter = RepCounter::with_session_id(config, id.clone())?;
        self.sessions.insert(id.clone(), counter);
        info!(session = %id, "session started");
        Ok(id)
    }

    /// Process one frame for a specific session
    pub fn process_frame(
        &mut self,
        id: &SessionId,
        pose: &PoseEstimate,
    ) -> Result<Option<RepRecord>, RepError> {
        Ok(self.counter_mut(id)?.process_frame(pose))
    }

    pub fn counter(&self, id: &SessionId) -> Result<&RepCounter, RepError> {
        self.sessions
            .get(id)
            .ok_or_else(|| RepError::UnknownSession(id.to_string()))
    }

    pub fn counter_mut(&mut self, id: &SessionId) -> Result<&mut RepCounter, RepError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| RepError::UnknownSession(id.to_string()))
    }

    pub fn summary(&self, id: &SessionId) -> Result<WorkoutSummary, RepError> {
        Ok(self.counter(id)?.summary())
    }

    /// Tear down a session, discarding its state, and return the final summary
    pub fn end_session(&mut self, id: &SessionId) -> Result<WorkoutSummary, RepError> {
        let mut counter = self
            .sessions
            .remove(id)
            .ok_or_else(|| RepError::UnknownSession(id.to_string()))?;
        let summary = counter.finish();
        info!(session = %id, total_reps = summary.total_reps, "session ended");
        Ok(summary)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
