//! Domain Configuration
//!
//! City reference data and the tier-aware narrowing policy.

mod cities;
mod policy;

pub use cities::{CityTable, CityTableFile};
pub use policy::{NarrowingTable, PolicyConfig, ShortlistHint, TierNarrowing};
