//! Native NetCDF reading using the netcdf library.
//!
//! Files are opened in place and only the slabs the extractor asks for are
//! read: the 1-D axes, the time coordinate, and a single (lat, lon) column of
//! the data field.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::trace;

use crate::error::{NetCdfError, NetCdfResult};
use crate::source::{GridSource, TimeAxisInfo, VariableInfo};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Safe to call multiple times; only the first call has an effect. Call it
/// early in `main()` before any HDF5/NetCDF operations occur.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An opened NetCDF file.
pub struct NetCdfGridFile {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for NetCdfGridFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetCdfGridFile")
            .field("path", &self.path)
            .finish()
    }
}

impl NetCdfGridFile {
    /// Open a file read-only.
    pub fn open(path: impl AsRef<Path>) -> NetCdfResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        let file = netcdf::open(path).map_err(|e| {
            NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    fn variable(&self, name: &str) -> NetCdfResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))
    }
}

impl GridSource for NetCdfGridFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn variables(&self) -> Vec<VariableInfo> {
        self.file
            .variables()
            .map(|var| {
                let dims = var.dimensions();
                VariableInfo {
                    name: var.name(),
                    dimensions: dims.iter().map(|d| d.name()).collect(),
                    shape: dims.iter().map(|d| d.len()).collect(),
                }
            })
            .collect()
    }

    fn read_axis(&self, name: &str) -> NetCdfResult<Vec<f64>> {
        let var = self.variable(name)?;
        if var.dimensions().len() != 1 {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} is not one-dimensional",
                name
            )));
        }
        let raw: Vec<f64> = var.get_values(..)?;
        Ok(unpack(&var, raw))
    }

    fn read_cell_series(
        &self,
        field: &str,
        lat_dim: &str,
        lon_dim: &str,
        lat_index: usize,
        lon_index: usize,
    ) -> NetCdfResult<Vec<f64>> {
        let var = self.variable(field)?;

        let mut slab = Vec::with_capacity(var.dimensions().len());
        for dim in var.dimensions() {
            let name = dim.name();
            let len = dim.len();
            let index = if name == lat_dim {
                Some(lat_index)
            } else if name == lon_dim {
                Some(lon_index)
            } else {
                None
            };
            match index {
                Some(i) if i >= len => {
                    return Err(NetCdfError::InvalidFormat(format!(
                        "index {} out of bounds for dimension {} (len {})",
                        i, name, len
                    )))
                }
                Some(i) => slab.push(i..i + 1),
                None => slab.push(0..len),
            }
        }

        trace!(path = ?self.path, field = field, slab = ?slab, "Reading cell hyperslab");

        let raw = read_hyperslab(&var, &slab)?;
        Ok(unpack(&var, raw))
    }

    fn time_axis(&self, name: &str) -> NetCdfResult<TimeAxisInfo> {
        let var = self.variable(name)?;
        let values: Vec<f64> = var.get_values(..)?;
        Ok(TimeAxisInfo {
            values,
            units: get_string_attr(&var, "units"),
            calendar: get_string_attr(&var, "calendar"),
        })
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Read a rectangular slab given one range per dimension. A data field has at
/// least the two horizontal dimensions.
fn read_hyperslab(var: &netcdf::Variable, slab: &[Range<usize>]) -> NetCdfResult<Vec<f64>> {
    let values = match slab {
        [a, b] => var.get_values::<f64, _>((a.clone(), b.clone()))?,
        [a, b, c] => var.get_values::<f64, _>((a.clone(), b.clone(), c.clone()))?,
        [a, b, c, d] => {
            var.get_values::<f64, _>((a.clone(), b.clone(), c.clone(), d.clone()))?
        }
        _ => {
            return Err(NetCdfError::InvalidFormat(format!(
                "unsupported rank {} for {}",
                slab.len(),
                var.name()
            )))
        }
    };
    Ok(values)
}

/// Mask fill values to NaN and apply CF packing attributes.
fn unpack(var: &netcdf::Variable, raw: Vec<f64>) -> Vec<f64> {
    let fill_value = get_f64_attr(var, "_FillValue");
    let missing_value = get_f64_attr(var, "missing_value");
    let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);

    raw.into_iter()
        .map(|val| {
            if Some(val) == fill_value || Some(val) == missing_value || !val.is_finite() {
                f64::NAN
            } else {
                val * scale_factor + add_offset
            }
        })
        .collect()
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get string attribute.
fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
