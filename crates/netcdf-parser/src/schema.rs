//! Field and axis name resolution.
//!
//! CMIP6 archives are not consistent about names: the data field may be
//! `tasmax`, `TASMAX`, `tasmax_day` or something else entirely, and the axes
//! may be `lat`/`latitude`/`nav_lat`. Each lookup is an ordered list of
//! [`NamePredicate`]s; the first predicate that matches any candidate wins.

use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::source::{GridSource, VariableInfo};

/// One way of recognising a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePredicate {
    /// Byte-for-byte equal
    Exact(String),
    /// Equal ignoring ASCII case
    ExactIgnoreCase(String),
    /// Candidate contains the needle, ignoring case
    Contains(String),
    /// Candidate contains the needle or the needle contains the candidate,
    /// ignoring case
    EitherContains(String),
}

impl NamePredicate {
    pub fn matches(&self, candidate: &str) -> bool {
        let lower = candidate.to_lowercase();
        match self {
            NamePredicate::Exact(name) => candidate == name,
            NamePredicate::ExactIgnoreCase(name) => lower == name.to_lowercase(),
            NamePredicate::Contains(needle) => lower.contains(&needle.to_lowercase()),
            NamePredicate::EitherContains(needle) => {
                let needle = needle.to_lowercase();
                !lower.is_empty() && (lower.contains(&needle) || needle.contains(&lower))
            }
        }
    }
}

/// Return the first candidate matched by the earliest predicate.
pub fn first_match<'a>(predicates: &[NamePredicate], candidates: &'a [String]) -> Option<&'a str> {
    predicates.iter().find_map(|p| {
        candidates
            .iter()
            .find(|c| p.matches(c))
            .map(|c| c.as_str())
    })
}

/// Geographic and temporal axes of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
    Time,
}

impl Axis {
    pub fn predicates(&self) -> Vec<NamePredicate> {
        let (exact, long, needle) = match self {
            Axis::Latitude => ("lat", "latitude", "lat"),
            Axis::Longitude => ("lon", "longitude", "lon"),
            Axis::Time => ("time", "t", "time"),
        };
        vec![
            NamePredicate::ExactIgnoreCase(exact.to_string()),
            NamePredicate::ExactIgnoreCase(long.to_string()),
            NamePredicate::Contains(needle.to_string()),
        ]
    }
}

/// Alternate field names tried after exact and substring matching.
fn alternate_field_names(variable_id: &str) -> Vec<String> {
    let mut names = vec![variable_id.to_uppercase(), format!("{}_day", variable_id)];
    if variable_id.eq_ignore_ascii_case("rsds") {
        names.push("rad".to_string());
        names.push("radiation".to_string());
        names.push("surface_downwelling_shortwave_flux_in_air".to_string());
    }
    names
}

/// Ordered predicates for locating the data field of `variable_id`.
pub fn field_predicates(variable_id: &str) -> Vec<NamePredicate> {
    let mut predicates = vec![
        NamePredicate::Exact(variable_id.to_string()),
        NamePredicate::EitherContains(variable_id.to_string()),
    ];
    predicates.extend(
        alternate_field_names(variable_id)
            .into_iter()
            .map(NamePredicate::ExactIgnoreCase),
    );
    predicates
}

/// Resolved names for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSchema {
    /// Data field holding the daily values
    pub field: String,
    /// Latitude coordinate variable
    pub lat_axis: String,
    /// Longitude coordinate variable
    pub lon_axis: String,
    /// Dimension indexed by the latitude axis
    pub lat_dim: String,
    /// Dimension indexed by the longitude axis
    pub lon_dim: String,
    /// Time coordinate variable, if the file has one
    pub time_axis: Option<String>,
}

fn find_axis<'a>(variables: &'a [VariableInfo], axis: Axis) -> Option<&'a VariableInfo> {
    let predicates = axis.predicates();
    let coordinates: Vec<String> = variables
        .iter()
        .filter(|v| v.is_coordinate())
        .map(|v| v.name.clone())
        .collect();
    let one_dimensional: Vec<String> = variables
        .iter()
        .filter(|v| v.is_one_dimensional())
        .map(|v| v.name.clone())
        .collect();

    first_match(&predicates, &coordinates)
        .or_else(|| first_match(&predicates, &one_dimensional))
        .and_then(|name| variables.iter().find(|v| v.name == name))
}

/// Resolve field and axis names for `variable_id` in `source`.
pub fn resolve_schema(source: &dyn GridSource, variable_id: &str) -> NetCdfResult<GridSchema> {
    let variables = source.variables();
    let not_recognized = |reason: String| NetCdfError::SchemaNotRecognized {
        path: source.path().to_path_buf(),
        reason,
    };

    let lat = find_axis(&variables, Axis::Latitude)
        .ok_or_else(|| not_recognized("no latitude axis".to_string()))?;
    let lon = find_axis(&variables, Axis::Longitude)
        .ok_or_else(|| not_recognized("no longitude axis".to_string()))?;
    let time = find_axis(&variables, Axis::Time);

    let lat_dim = lat.dimensions[0].clone();
    let lon_dim = lon.dimensions[0].clone();

    let fields: Vec<String> = variables
        .iter()
        .filter(|v| !v.is_coordinate())
        .filter(|v| v.has_dimension(&lat_dim) && v.has_dimension(&lon_dim))
        .map(|v| v.name.clone())
        .collect();

    let field = first_match(&field_predicates(variable_id), &fields).ok_or_else(|| {
        not_recognized(format!(
            "no field matching '{}' among {:?}",
            variable_id, fields
        ))
    })?;

    let schema = GridSchema {
        field: field.to_string(),
        lat_axis: lat.name.clone(),
        lon_axis: lon.name.clone(),
        lat_dim,
        lon_dim,
        time_axis: time.map(|t| t.name.clone()),
    };

    debug!(
        path = ?source.path(),
        variable = variable_id,
        field = %schema.field,
        lat = %schema.lat_axis,
        lon = %schema.lon_axis,
        time = ?schema.time_axis,
        "Resolved grid schema"
    );

    Ok(schema)
}
