//! Common test fixtures for CMIP6 extraction tests.

/// Grid coordinates used across the suite.
pub mod grid {
    /// Regular 1-degree grid over south-east Queensland.
    pub const SEQ_1DEG: GridSpec = GridSpec {
        lat_start: -30.0,
        lat_step: 1.0,
        lat_count: 6,
        lon_start: 150.0,
        lon_step: 1.0,
        lon_count: 5,
    };

    /// Regular lat/lon grid description.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub lat_start: f64,
        pub lat_step: f64,
        pub lat_count: usize,
        pub lon_start: f64,
        pub lon_step: f64,
        pub lon_count: usize,
    }

    impl GridSpec {
        pub fn lats(&self) -> Vec<f64> {
            (0..self.lat_count)
                .map(|i| self.lat_start + i as f64 * self.lat_step)
                .collect()
        }

        pub fn lons(&self) -> Vec<f64> {
            (0..self.lon_count)
                .map(|i| self.lon_start + i as f64 * self.lon_step)
                .collect()
        }

        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.lat_count * self.lon_count
        }
    }
}

/// Points of interest.
pub mod points {
    /// Lies exactly on a [`super::grid::SEQ_1DEG`] node (lat index 3, lon index 3).
    pub const ON_NODE: (f64, f64) = (-27.0, 153.0);

    /// Within 0.01 degrees of the same node.
    pub const NEAR_NODE: (f64, f64) = (-27.004, 152.996);

    /// Nearest node is (-27, 153) but 0.4 degrees away.
    pub const OFF_GRID: (f64, f64) = (-27.4, 152.6);
}

/// Model and scenario names.
pub mod runs {
    pub const MODEL: &str = "ACCESS-CM2";
    pub const MODEL_WITH_SPACE: &str = "EC Earth3";
    pub const SCENARIO: &str = "ssp245";
}

/// CF time metadata.
pub mod time {
    pub const DAYS_SINCE_1850: &str = "days since 1850-01-01";
    pub const HOURS_SINCE_2015: &str = "hours since 2015-01-01 00:00:00";
    pub const CALENDAR_STANDARD: &str = "standard";
    pub const CALENDAR_NOLEAP: &str = "noleap";
    pub const CALENDAR_360: &str = "360_day";
}
