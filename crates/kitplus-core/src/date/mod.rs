//! Date arithmetic, decomposition and formatting.
//!
//! This module provides functionality for:
//! - Day, week and month boundaries in a caller-supplied [`Calendar`]
//! - Calendar-aware addition of seconds through years
//! - Decomposing instants into wall-clock components
//! - Formatting and parsing with explicit [`DateFormat`] values
//!
//! # Examples
//!
//! ```ignore
//! use chrono::Utc;
//! use kitplus_core::date::{Calendar, DateFormat};
//!
//! let calendar = Calendar::utc();
//! let midnight = calendar.start_of_day(&Utc::now()).unwrap();
//! println!("{}", DateFormat::iso8601().format(&midnight).unwrap());
//! ```

mod calendar;
mod compare;
mod format;

pub use calendar::{seconds_to_hms, Calendar, DateError};
pub use compare::{
    closest_future_date, closest_past_date, is_earlier_than, is_equal_or_earlier_than,
    is_equal_or_later_than, is_later_than,
};
pub use format::DateFormat;
