//! Slot-filling dialogue engine for hotel planning
//!
//! Turns free-text messages into structured hotel requirements:
//! - Slot extraction and dialogue state tracking (`dst`)
//! - City tier classification (`city`)
//! - Question policy by city tier (`policy`)
//! - One-turn orchestration (`controller`) and per-conversation store (`session`)

pub mod city;
pub mod controller;
pub mod dst;
pub mod error;
pub mod policy;
pub mod session;

pub use city::{CityClassification, CityClassifier};
pub use controller::{ConversationController, RecommendationRequest, TurnOutcome};
pub use dst::{
    ApplyReport, ChangeSource, DialogueStateTracker, HotelDialogueState, SlotExtractor,
    SlotSnapshot, SlotUpdate, StateChange,
};
pub use error::{AgentError, Result};
pub use policy::{NextAction, PolicyDecision, PolicyEngine};
pub use session::ConversationStore;
