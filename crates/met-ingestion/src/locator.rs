//! Grid Locator: nearest grid cell to a requested coordinate.
//!
//! Each axis is searched independently for the value with the smallest
//! absolute difference to the target. This is a per-dimension nearest
//! neighbour, not a true 2-D nearest point.

use met_common::{GridCoordinate, ResolvedIndex};
use tracing::{info, warn};

use crate::error::{IngestionError, Result};

/// Index of the axis value closest to `target`.
///
/// Ties resolve to the first minimal index; NaN entries are never chosen.
pub fn nearest_index(axis: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in axis.iter().enumerate() {
        let diff = (value - target).abs();
        if diff.is_nan() {
            continue;
        }
        match best {
            Some((_, d)) if diff >= d => {}
            _ => best = Some((i, diff)),
        }
    }
    best.map(|(i, _)| i)
}

/// Resolve the grid cell for `target` on the given 1-D axes.
///
/// Exceeding `tolerance` on either axis is logged, not rejected.
pub fn locate(
    lats: &[f64],
    lons: &[f64],
    target: &GridCoordinate,
    tolerance: f64,
) -> Result<ResolvedIndex> {
    let lat_index = nearest_index(lats, target.latitude).ok_or_else(|| IngestionError::NoData {
        variable: "latitude axis".to_string(),
    })?;
    let lon_index = nearest_index(lons, target.longitude).ok_or_else(|| IngestionError::NoData {
        variable: "longitude axis".to_string(),
    })?;

    let actual_lat = lats[lat_index];
    let actual_lon = lons[lon_index];
    let lat_distance = (actual_lat - target.latitude).abs();
    let lon_distance = (actual_lon - target.longitude).abs();
    let within_tolerance = lat_distance <= tolerance && lon_distance <= tolerance;

    let resolved = ResolvedIndex {
        lat_index,
        lon_index,
        actual_lat,
        actual_lon,
        lat_distance,
        lon_distance,
        within_tolerance,
    };

    if within_tolerance {
        info!(
            lat_index,
            lon_index, actual_lat, actual_lon, "Resolved grid cell"
        );
    } else {
        warn!(
            requested_lat = target.latitude,
            requested_lon = target.longitude,
            actual_lat,
            actual_lon,
            lat_distance,
            lon_distance,
            tolerance,
            "Nearest grid cell is outside tolerance, using it anyway"
        );
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> GridCoordinate {
        GridCoordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_nearest_index_first_minimum_wins() {
        // 1.0 and 3.0 are equally close to 2.0
        assert_eq!(nearest_index(&[1.0, 3.0, 5.0], 2.0), Some(0));
        assert_eq!(nearest_index(&[5.0, 3.0, 1.0], 2.0), Some(1));
        assert_eq!(nearest_index(&[], 2.0), None);
        assert_eq!(nearest_index(&[f64::NAN, 4.0], 2.0), Some(1));
    }

    #[test]
    fn test_nearest_index_unsorted_uneven_axis() {
        let axis = [10.0, -3.5, 7.25, 0.1, -20.0];
        assert_eq!(nearest_index(&axis, 0.0), Some(3));
        assert_eq!(nearest_index(&axis, 8.0), Some(2));
        assert_eq!(nearest_index(&axis, -100.0), Some(4));
    }

    #[test]
    fn test_locate_is_per_axis() {
        let lats = [-30.0, -29.0, -28.0, -27.0];
        let lons = [150.0, 151.0, 152.0, 153.0];
        let idx = locate(&lats, &lons, &coord(-27.004, 152.996), 0.01).unwrap();
        assert_eq!((idx.lat_index, idx.lon_index), (3, 3));
        assert!(idx.within_tolerance);
        assert!((idx.lat_distance - 0.004).abs() < 1e-9);
    }

    #[test]
    fn test_locate_out_of_tolerance_still_resolves() {
        let lats = [-30.0, -29.0, -28.0, -27.0];
        let lons = [150.0, 151.0, 152.0, 153.0];
        let idx = locate(&lats, &lons, &coord(-27.4, 152.6), 0.01).unwrap();
        assert_eq!((idx.lat_index, idx.lon_index), (3, 3));
        assert!(!idx.within_tolerance);
        assert_eq!(idx.actual_coordinate(), coord(-27.0, 153.0));
    }

    #[test]
    fn test_locate_one_axis_out_of_tolerance() {
        let idx = locate(&[-27.0], &[153.05], &coord(-27.0, 153.0), 0.01).unwrap();
        assert!(!idx.within_tolerance);
    }

    #[test]
    fn test_locate_empty_axis() {
        let err = locate(&[], &[153.0], &coord(-27.0, 153.0), 0.01).unwrap_err();
        assert!(err.is_not_found());
    }
}
