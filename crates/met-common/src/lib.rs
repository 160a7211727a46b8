//! Common types and utilities shared across the CMIP6 to MET workspace.

pub mod error;
pub mod grid;
pub mod time;
pub mod variable;

pub use error::{MetError, MetResult};
pub use grid::{GridCoordinate, ResolvedIndex, DEFAULT_TOLERANCE_DEG};
pub use time::{
    add_days, consecutive_days, day_of_year, days_in_year, is_leap_year, parse_date, year_end,
    DateSpan,
};
pub use variable::{ClimateVariable, REQUIRED_VARIABLES};
