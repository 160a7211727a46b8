//! Writer for small synthetic CMIP6-style daily NetCDF files.
//!
//! The value stored at cell `(lat_index, lon_index)` for day `t` is
//! `series[t] + cell_offset * (lat_index * 100 + lon_index)`, so a test can
//! tell from the extracted numbers which cell was read. NaN entries in
//! `series` are written as `_FillValue`.

use std::path::Path;

use chrono::NaiveDate;

use crate::fixtures::grid::GridSpec;
use crate::generators::days_since_1850;

/// Fill value used by CMIP6 publishers.
pub const CMIP6_FILL_VALUE: f64 = 1.0e20;

/// Description of one synthetic file.
#[derive(Debug, Clone)]
pub struct Cmip6File {
    /// Name of the data field
    pub field: String,
    pub lat_name: String,
    pub lon_name: String,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Raw time offsets; `None` writes no time coordinate variable
    pub time_values: Option<Vec<f64>>,
    pub time_units: String,
    pub calendar: Option<String>,
    /// One value per time step
    pub series: Vec<f64>,
    pub cell_offset: f64,
    /// Extra 1-D variables written alongside, as (name, values)
    pub extra_axes: Vec<(String, Vec<f64>)>,
}

impl Cmip6File {
    /// Daily file on `grid` with a standard-calendar `days since 1850-01-01`
    /// axis starting at `start`.
    pub fn daily(field: &str, grid: &GridSpec, start: NaiveDate, series: Vec<f64>) -> Self {
        let dates: Vec<NaiveDate> = start.iter_days().take(series.len()).collect();
        Self {
            field: field.to_string(),
            lat_name: "lat".to_string(),
            lon_name: "lon".to_string(),
            lats: grid.lats(),
            lons: grid.lons(),
            time_values: Some(days_since_1850(&dates)),
            time_units: "days since 1850-01-01".to_string(),
            calendar: Some("standard".to_string()),
            series,
            cell_offset: 0.0,
            extra_axes: Vec::new(),
        }
    }

    pub fn with_axis_names(mut self, lat: &str, lon: &str) -> Self {
        self.lat_name = lat.to_string();
        self.lon_name = lon.to_string();
        self
    }

    pub fn with_calendar(mut self, calendar: &str) -> Self {
        self.calendar = Some(calendar.to_string());
        self
    }

    pub fn with_time(mut self, units: &str, values: Vec<f64>) -> Self {
        self.time_units = units.to_string();
        self.time_values = Some(values);
        self
    }

    pub fn without_time_axis(mut self) -> Self {
        self.time_values = None;
        self
    }

    pub fn with_cell_offset(mut self, offset: f64) -> Self {
        self.cell_offset = offset;
        self
    }

    pub fn with_extra_axis(mut self, name: &str, values: Vec<f64>) -> Self {
        self.extra_axes.push((name.to_string(), values));
        self
    }

    /// Value written at one cell and time step.
    pub fn value_at(&self, t: usize, lat_index: usize, lon_index: usize) -> f64 {
        self.series[t] + self.cell_offset * (lat_index * 100 + lon_index) as f64
    }

    /// Write the file to `path`.
    pub fn write(&self, path: &Path) -> netcdf::Result<()> {
        let mut file = netcdf::create(path)?;
        let n_time = self.series.len();

        file.add_dimension("time", n_time)?;
        file.add_dimension(&self.lat_name, self.lats.len())?;
        file.add_dimension(&self.lon_name, self.lons.len())?;

        if let Some(values) = &self.time_values {
            let mut time_var = file.add_variable::<f64>("time", &["time"])?;
            time_var.put_attribute("standard_name", "time")?;
            time_var.put_attribute("units", self.time_units.as_str())?;
            if let Some(calendar) = &self.calendar {
                time_var.put_attribute("calendar", calendar.as_str())?;
            }
            time_var.put_values(values, ..)?;
        }

        {
            let mut lat_var = file.add_variable::<f64>(&self.lat_name, &[self.lat_name.as_str()])?;
            lat_var.put_attribute("units", "degrees_north")?;
            lat_var.put_values(&self.lats, ..)?;
        }

        {
            let mut lon_var = file.add_variable::<f64>(&self.lon_name, &[self.lon_name.as_str()])?;
            lon_var.put_attribute("units", "degrees_east")?;
            lon_var.put_values(&self.lons, ..)?;
        }

        for (name, values) in &self.extra_axes {
            file.add_dimension(name, values.len())?;
            let mut var = file.add_variable::<f64>(name, &[name.as_str()])?;
            var.put_values(values, ..)?;
        }

        let mut data = Vec::with_capacity(n_time * self.lats.len() * self.lons.len());
        for t in 0..n_time {
            for i in 0..self.lats.len() {
                for j in 0..self.lons.len() {
                    let v = self.value_at(t, i, j);
                    data.push(if v.is_nan() { CMIP6_FILL_VALUE } else { v });
                }
            }
        }

        let mut field_var = file.add_variable::<f64>(
            &self.field,
            &["time", self.lat_name.as_str(), self.lon_name.as_str()],
        )?;
        field_var.put_attribute("_FillValue", CMIP6_FILL_VALUE)?;
        field_var.put_attribute("missing_value", CMIP6_FILL_VALUE)?;
        field_var.put_values(&data, ..)?;

        Ok(())
    }
}

/// Write a single-variable daily file into `dir` named like
/// `{field}_day_{model}_{scenario}_r1i1p1f1_gn_{year}.nc` and return its path.
pub fn write_daily_file(
    dir: &Path,
    spec: &Cmip6File,
    model: &str,
    scenario: &str,
    year: i32,
) -> std::path::PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create output directory");
    let path = dir.join(format!(
        "{}_day_{}_{}_r1i1p1f1_gn_{}.nc",
        spec.field, model, scenario, year
    ));
    spec.write(&path).expect("Failed to write synthetic CMIP6 file");
    path
}
