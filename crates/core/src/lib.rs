//! Core types for the hotel planner dialogue engine
//!
//! This crate holds the vocabulary shared by every other crate:
//! - slot identifiers, filled values and raw candidates
//! - the slot schema (pure validation of raw candidates)
//! - tagged questions and dialogue phases
//! - seam traits for the city reference table and question rendering

pub mod domain;

pub use domain::{
    validate, BudgetRange, CityRecord, CityReference, CityTier, DialoguePhase, NarrowingCategory,
    Party, Question, QuestionContext, QuestionRenderer, RawSlotValue, RequiredPrompt, SlotId,
    SlotRejection, SlotValue, StarLevel, ValidationContext,
};
