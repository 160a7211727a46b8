//! NetCDF reader for CMIP6 daily climate projections.
//!
//! This crate opens gridded NetCDF-4 files, works out which variables hold
//! the data field and the latitude/longitude/time axes, and reads the daily
//! series at a single grid cell.
//!
//! # Layout assumptions
//!
//! A data field is any variable spanning both horizontal dimensions; its
//! name is matched against the requested variable id with the ordered
//! predicates in [`schema`]. Fill values are returned as NaN.
//!
//! # Time axes
//!
//! [`cf_time`] decodes CF `units`/`calendar` pairs. Non-Gregorian model
//! calendars are reported as unsupported rather than approximated.

pub mod cf_time;
pub mod error;
pub mod native;
pub mod schema;
pub mod source;

pub use error::{NetCdfError, NetCdfResult};
pub use native::{silence_hdf5_errors, NetCdfGridFile};
pub use schema::{resolve_schema, Axis, GridSchema, NamePredicate};
pub use source::{GridSource, TimeAxisInfo, VariableInfo};
