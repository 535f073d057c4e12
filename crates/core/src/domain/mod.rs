//! Domain Module
//!
//! Hotel slot schema and the traits other crates implement.
//! Nothing here performs I/O.

mod questions;
mod schema;
mod slots;
mod traits;

pub use questions::{DialoguePhase, NarrowingCategory, Question, RequiredPrompt};
pub use schema::{limits, validate, SlotRejection, ValidationContext};
pub use slots::{BudgetRange, CityTier, Party, RawSlotValue, SlotId, SlotValue, StarLevel};
pub use traits::{CityRecord, CityReference, QuestionContext, QuestionRenderer};
