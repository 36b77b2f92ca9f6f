//! Core reservation logic: calendar, identifier families, month builder

pub mod builder;
pub mod calendar;
pub mod family;

// Re-export commonly used items
pub use builder::build_month;
pub use calendar::{
    days_in_month, first_weekday_of_month, is_first_monday, last_weekday_of_month,
    weekday_occurrences,
};
pub use family::{derive_family, try_derive_family};
