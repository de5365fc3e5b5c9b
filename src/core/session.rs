//! Comparison session state machine.
//!
//! A conversation is either idle (every message goes through the query
//! classifier) or collecting (every message is consumed here until the
//! user types "done"). One session per conversation, never shared.

use di::{inject, injectable};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Multi-turn accumulator for the products to compare.
///
/// The selection keeps insertion order and allows duplicates. It is
/// unbounded; an abandoned session stays collecting until "done" arrives,
/// there is no expiry.
#[derive(Debug, Default)]
pub struct ComparisonSession {
    active: bool,
    selected: Vec<Uuid>,
}

impl ComparisonSession {
    pub fn is_collecting(&self) -> bool {
        self.active
    }

    pub fn selected(&self) -> &[Uuid] {
        &self.selected
    }

    /// Enter collection mode, discarding any previous selection.
    pub fn begin(&mut self) {
        self.active = true;
        self.selected.clear();
    }

    /// Record one more product to compare.
    pub fn add(&mut self, product_id: Uuid) {
        self.selected.push(product_id);
    }

    /// Leave collection mode, returning whatever was collected.
    pub fn finish(&mut self) -> Vec<Uuid> {
        self.active = false;
        std::mem::take(&mut self.selected)
    }
}

/// Process-wide map of per-conversation sessions.
///
/// Each conversation gets its own async mutex; holding it for the whole
/// turn serializes messages within a conversation without blocking other
/// conversations.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<ComparisonSession>>>>,
}

#[injectable]
impl SessionStore {
    #[inject]
    pub fn create() -> SessionStore {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn session_for(&self, conversation_id: Uuid) -> Arc<tokio::sync::Mutex<ComparisonSession>> {
        self.sessions
            .lock()
            .unwrap()
            .entry(conversation_id)
            .or_default()
            .clone()
    }
}
