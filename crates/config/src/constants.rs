//! Default values shared across the planner
//!
//! Settings fall back to these when a field is absent from every source.

/// City tier thresholds, counted in five-star hotels
pub mod tiers {
    /// At or above this count a city is tier A
    pub const TIER_A_MIN_FIVE_STAR: u32 = 30;

    /// At or above this count (and below tier A) a city is tier B
    pub const TIER_B_MIN_FIVE_STAR: u32 = 5;
}

/// Narrowing floors per tier
pub mod narrowing {
    pub const TIER_A_MIN_SATISFIED: usize = 2;
    pub const TIER_B_MIN_SATISFIED: usize = 1;
    pub const TIER_C_MIN_SATISFIED: usize = 0;
}

/// Number of hotels the generation step should propose, per tier
pub mod shortlist {
    pub const TIER_A: (u32, u32) = (5, 8);
    pub const TIER_B: (u32, u32) = (4, 6);
    pub const TIER_C: (u32, u32) = (3, 5);
}

/// Environment variable layering
pub mod env {
    /// `HOTEL_PLANNER__LANGUAGE=en`, `HOTEL_PLANNER__POLICY__TIER_A_MIN_FIVE_STAR=40`
    pub const PREFIX: &str = "HOTEL_PLANNER";
    pub const SEPARATOR: &str = "__";
}
