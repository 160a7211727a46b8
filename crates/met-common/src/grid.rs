//! Grid coordinates and resolved grid cells.

use serde::{Deserialize, Serialize};

use crate::error::{MetError, MetResult};

/// Default distance tolerance between a requested point and its grid cell.
pub const DEFAULT_TOLERANCE_DEG: f64 = 0.01;

/// A requested site location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GridCoordinate {
    /// Create a coordinate, rejecting values outside the valid geographic range.
    pub fn new(latitude: f64, longitude: f64) -> MetResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(MetError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(MetError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Coordinate label used in output file names (two decimals each).
    pub fn file_label(&self) -> String {
        format!("{:.2}_{:.2}", self.latitude, self.longitude)
    }
}

/// The grid cell chosen for a requested coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIndex {
    /// Index into the latitude axis
    pub lat_index: usize,
    /// Index into the longitude axis
    pub lon_index: usize,
    /// Latitude of the chosen cell
    pub actual_lat: f64,
    /// Longitude of the chosen cell
    pub actual_lon: f64,
    /// Absolute latitude difference to the requested point
    pub lat_distance: f64,
    /// Absolute longitude difference to the requested point
    pub lon_distance: f64,
    /// Whether both distances are within the requested tolerance
    pub within_tolerance: bool,
}

impl ResolvedIndex {
    /// Largest per-axis distance to the requested point.
    pub fn distance(&self) -> f64 {
        self.lat_distance.max(self.lon_distance)
    }

    pub fn actual_coordinate(&self) -> GridCoordinate {
        GridCoordinate {
            latitude: self.actual_lat,
            longitude: self.actual_lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_accepts_bounds() {
        assert!(GridCoordinate::new(-90.0, -180.0).is_ok());
        assert!(GridCoordinate::new(90.0, 180.0).is_ok());
        assert!(GridCoordinate::new(-31.75, 117.6).is_ok());
    }

    #[test]
    fn test_coordinate_rejects_out_of_range() {
        let err = GridCoordinate::new(91.0, 0.0).unwrap_err();
        assert!(matches!(err, MetError::InvalidLatitude(_)));
        assert!(err.is_fatal());

        let err = GridCoordinate::new(0.0, -180.5).unwrap_err();
        assert!(matches!(err, MetError::InvalidLongitude(_)));
    }

    #[test]
    fn test_file_label() {
        let coord = GridCoordinate::new(-31.75, 117.5999984741211).unwrap();
        assert_eq!(coord.file_label(), "-31.75_117.60");
    }

    #[test]
    fn test_resolved_distance() {
        let idx = ResolvedIndex {
            lat_index: 3,
            lon_index: 7,
            actual_lat: -31.75,
            actual_lon: 117.65,
            lat_distance: 0.0,
            lon_distance: 0.05,
            within_tolerance: false,
        };
        assert!((idx.distance() - 0.05).abs() < 1e-12);
        assert_eq!(idx.actual_coordinate().longitude, 117.65);
    }
}
