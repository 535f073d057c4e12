//! Text processing helpers for the hotel planner
//!
//! Small, pure building blocks used by the slot extractor and the city table:
//! - width and case normalization of messages and city names
//! - Chinese numeral parsing (`两`, `十二`, `三千`)
//! - month/day resolution against a reference date
//! - word-boundary aware term search

pub mod dates;
pub mod normalize;
pub mod numbers;
pub mod search;

pub use dates::{
    add_nights, month_from_english, parse_ymd, relative_day_offset, resolve_end, resolve_month_day,
    to_iso,
};
pub use normalize::{normalize_city_name, normalize_message, to_half_width};
pub use numbers::{
    parse_cn_number, parse_en_number, parse_number, EN_NUMBER_PATTERN, NUMBER_PATTERN,
};
pub use search::find_term;
