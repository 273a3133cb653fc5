use std::collections::HashMap;

use uuid::Uuid;

use crate::pipeline::Pipeline;

/// Ephemeral map from session id to the one active pipeline. Sessions are
/// created at chat start and discarded at chat end; rebinding a session
/// replaces its pipeline (last write wins). Nothing is persisted.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, Pipeline>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh session id with no pipeline bound yet
    pub fn create(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        tracing::debug!(session = %id, "session created");
        id
    }

    pub fn bind(&mut self, id: &str, pipeline: Pipeline) {
        if self.sessions.insert(id.to_string(), pipeline).is_some() {
            tracing::debug!(session = %id, "session pipeline replaced");
        }
    }

    pub fn get(&self, id: &str) -> Option<&Pipeline> {
        self.sessions.get(id)
    }

    pub fn end(&mut self, id: &str) -> Option<Pipeline> {
        tracing::debug!(session = %id, "session ended");
        self.sessions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
