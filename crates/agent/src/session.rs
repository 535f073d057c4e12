//! Conversation store
//!
//! Holds one tracker per conversation id. Each tracker sits behind its own
//! mutex: turns of one conversation run one at a time, different
//! conversations proceed in parallel.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use crate::controller::{ConversationController, TurnOutcome};
use crate::dst::{DialogueStateTracker, SlotSnapshot};
use crate::error::{AgentError, Result};

type SharedTracker = Arc<Mutex<DialogueStateTracker>>;

pub struct ConversationStore {
    controller: Arc<ConversationController>,
    sessions: DashMap<String, SharedTracker>,
}

impl ConversationStore {
    pub fn new(controller: Arc<ConversationController>) -> Self {
        Self {
            controller,
            sessions: DashMap::new(),
        }
    }

    pub fn controller(&self) -> &Arc<ConversationController> {
        &self.controller
    }

    /// Open a conversation under a fresh id
    pub fn start(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), SharedTracker::default());
        tracing::debug!(conversation = %id, "Conversation started");
        id
    }

    /// Run one turn; unknown ids start a new conversation
    pub fn handle(&self, conversation_id: &str, message: &str) -> TurnOutcome {
        // Clone the Arc so the map shard is not locked while the turn runs
        let tracker = self
            .sessions
            .entry(conversation_id.to_string())
            .or_default()
            .value()
            .clone();
        let mut tracker = tracker.lock();
        self.controller.handle_turn(&mut tracker, message)
    }

    pub fn reset(&self, conversation_id: &str) -> Result<()> {
        let tracker = self.get(conversation_id)?;
        tracker.lock().reset();
        tracing::debug!(conversation = %conversation_id, "Conversation reset");
        Ok(())
    }

    pub fn end(&self, conversation_id: &str) -> Result<()> {
        if self.sessions.remove(conversation_id).is_none() {
            return Err(AgentError::UnknownConversation(conversation_id.to_string()));
        }
        tracing::debug!(conversation = %conversation_id, "Conversation ended");
        Ok(())
    }

    pub fn snapshot(&self, conversation_id: &str) -> Result<SlotSnapshot> {
        let tracker = self.get(conversation_id)?;
        let snapshot = tracker.lock().state().snapshot();
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get(&self, conversation_id: &str) -> Result<SharedTracker> {
        self.sessions
            .get(conversation_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AgentError::UnknownConversation(conversation_id.to_string()))
    }
}
