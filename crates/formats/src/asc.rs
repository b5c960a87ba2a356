//! ESRI ASCII grid (`.asc`) reader.
//!
//! Header keys are matched case-insensitively. Center-origin headers
//! (`xllcenter`/`yllcenter`) are normalized to corner origin so nothing
//! downstream ever sees a center coordinate.

use std::collections::HashMap;

use foundation::math::GeoCoordinate;
use tracing::{debug, warn};

use crate::error::FormatError;

/// Sentinel used when the header omits `NODATA_value`.
pub const DEFAULT_NODATA: f64 = -9999.0;

/// `min`/`max` of a grid without a single valid cell.
pub const FALLBACK_VALUE: f64 = 0.0;

const HEADER_KEYS: usize = 6;

/// A parsed raster. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    pub ncols: usize,
    pub nrows: usize,
    pub cellsize: f64,
    pub xllcorner: f64,
    pub yllcorner: f64,
    pub nodata: f64,
    /// Smallest valid value (excludes nodata and non-finite cells).
    pub min: f64,
    /// Largest valid value (excludes nodata and non-finite cells).
    pub max: f64,
    cells: Vec<f64>,
}

impl RasterGrid {
    /// Builds a grid from row-major `cells` (row 0 is the northernmost row).
    ///
    /// `cells` is truncated to `nrows * ncols`, or padded with NaN when the
    /// shortfall is under one row and no larger than the data supplied.
    pub fn new(
        ncols: usize,
        nrows: usize,
        xllcorner: f64,
        yllcorner: f64,
        cellsize: f64,
        nodata: f64,
        mut cells: Vec<f64>,
    ) -> Result<Self, FormatError> {
        let expected = cell_count(ncols, nrows)?;
        if cells.len() < expected {
            let missing = expected - cells.len();
            if missing >= ncols || missing > cells.len() {
                return Err(FormatError::TruncatedData {
                    expected,
                    found: cells.len(),
                });
            }
        }
        cells.resize(expected, f64::NAN);

        let mut range: Option<(f64, f64)> = None;
        for &v in &cells {
            if !is_valid_value(v, nodata) {
                continue;
            }
            range = Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        let (min, max) = range.unwrap_or((FALLBACK_VALUE, FALLBACK_VALUE));

        Ok(Self {
            ncols,
            nrows,
            cellsize,
            xllcorner,
            yllcorner,
            nodata,
            min,
            max,
            cells,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.cells.get(row * self.ncols + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.nrows {
            return None;
        }
        let start = row * self.ncols;
        self.cells.get(start..start + self.ncols)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `max(1)` keeps `chunks` happy for a zero-column grid; it yields nothing anyway.
        self.cells.chunks(self.ncols.max(1))
    }

    pub fn is_valid(&self, v: f64) -> bool {
        is_valid_value(v, self.nodata)
    }

    pub fn valid_cell_count(&self) -> usize {
        self.cells.iter().filter(|v| self.is_valid(**v)).count()
    }

    /// Whether any valid cell exists (otherwise `min`/`max` are the fallback).
    pub fn has_data(&self) -> bool {
        self.cells.iter().any(|v| self.is_valid(*v))
    }

    /// Geographic center of a cell.
    pub fn cell_center(&self, row: usize, col: usize) -> GeoCoordinate {
        let lon = self.xllcorner + (col as f64 + 0.5) * self.cellsize;
        let lat = self.yllcorner + ((self.nrows - 1 - row) as f64 + 0.5) * self.cellsize;
        GeoCoordinate::new(lat, lon)
    }
}

fn is_valid_value(v: f64, nodata: f64) -> bool {
    v.is_finite() && v != nodata
}

fn cell_count(ncols: usize, nrows: usize) -> Result<usize, FormatError> {
    ncols
        .checked_mul(nrows)
        .ok_or_else(|| FormatError::InvalidHeaderValue {
            key: "nrows",
            value: nrows.to_string(),
        })
}

/// Parses an ESRI ASCII grid.
///
/// The header is read as `key value` lines until six keys are collected, the
/// input runs out, or a line starts with a number (data has begun).
pub fn parse_asc(text: &str) -> Result<RasterGrid, FormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().filter(|l| !l.trim().is_empty()).peekable();
    if lines.peek().is_none() {
        return Err(FormatError::EmptyInput);
    }

    let mut header: HashMap<String, String> = HashMap::new();
    while header.len() < HEADER_KEYS {
        let Some(line) = lines.peek() else {
            break;
        };
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            lines.next();
            continue;
        };
        if key.parse::<f64>().is_ok() {
            break;
        }
        if let Some(value) = tokens.next() {
            header.insert(key.to_ascii_lowercase(), value.to_string());
        }
        lines.next();
    }

    let ncols = header_count(&header, "ncols")?;
    let nrows = header_count(&header, "nrows")?;
    let cellsize = header_number(&header, "cellsize")?;
    if !(cellsize > 0.0) {
        return Err(FormatError::InvalidHeaderValue {
            key: "cellsize",
            value: header.get("cellsize").cloned().unwrap_or_default(),
        });
    }

    let xllcorner = origin(&header, "xllcorner", "xllcenter", cellsize)?;
    let yllcorner = origin(&header, "yllcorner", "yllcenter", cellsize)?;
    let nodata = match header.get("nodata_value") {
        Some(_) => header_number(&header, "nodata_value")?,
        None => DEFAULT_NODATA,
    };

    let expected = cell_count(ncols, nrows)?;
    // Every token needs at least one byte plus a separator.
    let mut cells: Vec<f64> = Vec::with_capacity(expected.min(text.len() / 2 + 1));
    let mut data_lines = 0usize;
    let mut extra = 0usize;
    for line in lines {
        data_lines += 1;
        for token in line.split_whitespace() {
            if cells.len() == expected {
                extra += 1;
                continue;
            }
            cells.push(token.parse::<f64>().unwrap_or(f64::NAN));
        }
    }
    if data_lines == 0 {
        return Err(FormatError::NoDataRows);
    }
    if cells.len() < expected {
        warn!(
            expected,
            found = cells.len(),
            "ascii grid is short; padding with nodata"
        );
    }
    if extra > 0 {
        warn!(extra, "ascii grid has trailing values; ignoring them");
    }

    let grid = RasterGrid::new(ncols, nrows, xllcorner, yllcorner, cellsize, nodata, cells)?;
    debug!(
        ncols = grid.ncols,
        nrows = grid.nrows,
        min = grid.min,
        max = grid.max,
        "parsed ascii grid"
    );
    Ok(grid)
}

fn header_number(header: &HashMap<String, String>, key: &'static str) -> Result<f64, FormatError> {
    let raw = header.get(key).ok_or(FormatError::MissingHeaderKey(key))?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormatError::InvalidHeaderValue {
            key,
            value: raw.clone(),
        }),
    }
}

fn header_count(header: &HashMap<String, String>, key: &'static str) -> Result<usize, FormatError> {
    let v = header_number(header, key)?;
    if v < 1.0 || v.fract() != 0.0 {
        return Err(FormatError::InvalidHeaderValue {
            key,
            value: header.get(key).cloned().unwrap_or_default(),
        });
    }
    Ok(v as usize)
}

fn origin(
    header: &HashMap<String, String>,
    corner_key: &'static str,
    center_key: &'static str,
    cellsize: f64,
) -> Result<f64, FormatError> {
    if header.contains_key(center_key) {
        return Ok(header_number(header, center_key)? - cellsize * 0.5);
    }
    if header.contains_key(corner_key) {
        return header_number(header, corner_key);
    }
    Err(FormatError::MissingHeaderKey(corner_key))
}
