//! Abstraction over an opened gridded dataset.

use std::path::Path;

use crate::error::NetCdfResult;

/// Shape and naming of one variable in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    /// Dimension names in storage order
    pub dimensions: Vec<String>,
    /// Dimension lengths in storage order
    pub shape: Vec<usize>,
}

impl VariableInfo {
    pub fn new(name: impl Into<String>, dimensions: &[&str], shape: &[usize]) -> Self {
        Self {
            name: name.into(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            shape: shape.to_vec(),
        }
    }

    /// A 1-D variable named after its own dimension (a CF coordinate variable).
    pub fn is_coordinate(&self) -> bool {
        self.dimensions.len() == 1 && self.dimensions[0] == self.name
    }

    pub fn is_one_dimensional(&self) -> bool {
        self.dimensions.len() == 1
    }

    pub fn has_dimension(&self, dim: &str) -> bool {
        self.dimensions.iter().any(|d| d == dim)
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw time coordinate as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxisInfo {
    /// Numeric offsets, undecoded
    pub values: Vec<f64>,
    /// CF `units` attribute, e.g. `days since 1850-01-01`
    pub units: Option<String>,
    /// CF `calendar` attribute
    pub calendar: Option<String>,
}

/// Read-only access to the parts of a gridded file the extractor needs.
///
/// Implemented by [`crate::NetCdfGridFile`]; kept as a trait so schema
/// resolution can run against any dataset layout.
pub trait GridSource {
    /// Path the dataset was opened from.
    fn path(&self) -> &Path;

    /// All variables in the dataset.
    fn variables(&self) -> Vec<VariableInfo>;

    /// Read a 1-D variable as `f64` values.
    fn read_axis(&self, name: &str) -> NetCdfResult<Vec<f64>>;

    /// Read every value of `field` at one (lat, lon) cell, flattened in
    /// storage order of the remaining dimensions. Fill values become NaN.
    fn read_cell_series(
        &self,
        field: &str,
        lat_dim: &str,
        lon_dim: &str,
        lat_index: usize,
        lon_index: usize,
    ) -> NetCdfResult<Vec<f64>>;

    /// Read a time coordinate with its CF metadata.
    fn time_axis(&self, name: &str) -> NetCdfResult<TimeAxisInfo>;
}
