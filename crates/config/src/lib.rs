//! Configuration for the hotel planner
//!
//! Layered settings (embedded defaults, optional file, environment), the city
//! reference table, the narrowing policy and the question templates.

pub mod constants;
pub mod domain;
pub mod error;
pub mod prompts;
pub mod settings;

pub use domain::{CityTable, NarrowingTable, PolicyConfig, ShortlistHint, TierNarrowing};
pub use error::ConfigError;
pub use prompts::{Language, TemplateRenderer};
pub use settings::Settings;
