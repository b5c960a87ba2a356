//! Raster grid to batched extruded-cell mesh.
//!
//! Every surviving cell (or decimated block) becomes one box: four top
//! corners at `base_radius + height`, four bottom corners at `base_radius`,
//! drawn as the top face plus four sides. Bottom faces sit on the globe and
//! are never visible, so they are not emitted. All boxes share one vertex
//! and index buffer.

use foundation::math::{GeoCoordinate, Projection};
use formats::RasterGrid;
use scene::components::{CellRef, GeoMesh, MeshVertex};
use tracing::debug;

use crate::ramp::ColorRamp;

/// Normalized value used when the grid range collapses to a single value.
pub const FLAT_RANGE_VALUE: f64 = 0.5;

/// Default primitive budget per raster layer.
pub const DEFAULT_CELL_BUDGET: usize = 150_000;

pub const VERTICES_PER_CELL: usize = 8;
pub const INDICES_PER_CELL: usize = 30;

// Top face, then north, east, south, west walls. Corner order per ring is
// NW, NE, SE, SW; top ring uses 0..4, bottom ring 4..8.
const BOX_INDICES: [u32; INDICES_PER_CELL] = [
    0, 1, 2, 0, 2, 3, // top
    4, 5, 1, 4, 1, 0, // north
    5, 6, 2, 5, 2, 1, // east
    6, 7, 3, 6, 3, 2, // south
    7, 4, 0, 7, 0, 3, // west
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshOptions {
    /// Radius of the box floors.
    pub base_radius: f64,
    /// Extrusion for a normalized value of 0.
    pub min_height: f64,
    /// Extrusion for a normalized value of 1.
    pub max_height: f64,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            base_radius: 1.0,
            min_height: 0.002,
            max_height: 0.06,
        }
    }
}

impl MeshOptions {
    pub fn height_for(&self, t: f64) -> f64 {
        self.min_height + (self.max_height - self.min_height) * t.clamp(0.0, 1.0)
    }
}

/// `(v - min) / (max - min)` clamped into `[0, 1]`.
///
/// A collapsed range yields [`FLAT_RANGE_VALUE`]; non-finite input yields 0.
pub fn normalize_value(v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() || !min.is_finite() || !max.is_finite() {
        return 0.0;
    }
    let span = max - min;
    if span.abs() <= f64::EPSILON * min.abs().max(max.abs()).max(1.0) {
        return FLAT_RANGE_VALUE;
    }
    ((v - min) / span).clamp(0.0, 1.0)
}

/// Side length (in cells) of the square blocks needed to stay within
/// `budget` primitives. Returns 0 for a zero budget, 1 when no decimation is
/// needed.
pub fn decimation_stride(grid: &RasterGrid, budget: usize) -> usize {
    if budget == 0 {
        return 0;
    }
    if grid.valid_cell_count() <= budget {
        return 1;
    }
    let limit = grid.nrows.max(grid.ncols).max(1);
    (1..=limit)
        .find(|&s| grid.nrows.div_ceil(s) * grid.ncols.div_ceil(s) <= budget)
        .unwrap_or(limit)
}

/// Builds one mesh for the whole grid.
///
/// Nodata and non-finite cells contribute nothing. When the grid holds more
/// valid cells than `budget`, cells are averaged over square blocks (see
/// [`decimation_stride`]) so the output never exceeds `budget` boxes while
/// still covering the full extent.
pub fn build_mesh(
    grid: &RasterGrid,
    ramp: &ColorRamp,
    budget: usize,
    projection: &Projection,
    options: &MeshOptions,
) -> GeoMesh {
    let stride = decimation_stride(grid, budget);
    let mut mesh = GeoMesh::default();
    if stride == 0 || !grid.has_data() {
        return mesh;
    }

    let blocks_hint = grid.nrows.div_ceil(stride) * grid.ncols.div_ceil(stride);
    let reserve = blocks_hint.min(grid.valid_cell_count());
    mesh.vertices.reserve(reserve * VERTICES_PER_CELL);
    mesh.indices.reserve(reserve * INDICES_PER_CELL);
    mesh.cells.reserve(reserve);

    for r0 in (0..grid.nrows).step_by(stride) {
        let r1 = (r0 + stride).min(grid.nrows);
        for c0 in (0..grid.ncols).step_by(stride) {
            let c1 = (c0 + stride).min(grid.ncols);
            let Some(value) = block_mean(grid, r0..r1, c0..c1) else {
                continue;
            };

            let t = normalize_value(value, grid.min, grid.max);
            let color = ramp.sample(t).to_array();
            let height = options.height_for(t);

            let west = grid.xllcorner + c0 as f64 * grid.cellsize;
            let east = grid.xllcorner + c1 as f64 * grid.cellsize;
            let north = grid.yllcorner + (grid.nrows - r0) as f64 * grid.cellsize;
            let south = grid.yllcorner + (grid.nrows - r1) as f64 * grid.cellsize;
            let corners = [
                GeoCoordinate::new(north, west),
                GeoCoordinate::new(north, east),
                GeoCoordinate::new(south, east),
                GeoCoordinate::new(south, west),
            ];

            push_box(
                &mut mesh,
                projection,
                &corners,
                options.base_radius,
                options.base_radius + height,
                color,
            );
            mesh.cells.push(CellRef {
                row: r0 as u32,
                col: c0 as u32,
                span: stride as u32,
                value,
            });
        }
    }

    debug!(
        ncols = grid.ncols,
        nrows = grid.nrows,
        stride,
        cells = mesh.cell_count(),
        vertices = mesh.vertices.len(),
        "raster mesh built"
    );
    mesh
}

fn block_mean(
    grid: &RasterGrid,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for r in rows {
        let Some(row) = grid.row(r) else {
            continue;
        };
        for &v in &row[cols.clone()] {
            if grid.is_valid(v) {
                sum += v;
                n += 1;
            }
        }
    }
    (n > 0).then(|| sum / n as f64)
}

fn push_box(
    mesh: &mut GeoMesh,
    projection: &Projection,
    corners: &[GeoCoordinate; 4],
    bottom: f64,
    top: f64,
    color: [f32; 4],
) {
    let base = mesh.vertices.len() as u32;
    for radius in [top, bottom] {
        for c in corners {
            mesh.vertices.push(MeshVertex {
                position: projection.project_at(*c, radius).position().to_f32(),
                color,
            });
        }
    }
    mesh.indices.extend(BOX_INDICES.iter().map(|i| base + i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::color::Rgba;
    use formats::parse_asc;

    fn ramp() -> ColorRamp {
        ColorRamp::two(Rgba::new(0.0, 0.0, 0.0, 1.0), Rgba::new(1.0, 1.0, 1.0, 1.0))
    }

    fn build(grid: &RasterGrid, budget: usize) -> GeoMesh {
        build_mesh(grid, &ramp(), budget, &Projection::default(), &MeshOptions::default())
    }

    fn grid_4x4() -> RasterGrid {
        parse_asc(
            "ncols 4\nnrows 4\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -9999\n\
             1 2 3 -9999\n1 2 3 -9999\n1 2 3 -9999\n1 2 3 -9999\n",
        )
        .expect("grid")
    }

    #[test]
    fn normalize_endpoints_and_flat_range() {
        assert_eq!(normalize_value(1.0, 1.0, 3.0), 0.0);
        assert_eq!(normalize_value(3.0, 1.0, 3.0), 1.0);
        assert_eq!(normalize_value(2.0, 1.0, 3.0), 0.5);
        assert_eq!(normalize_value(5.0, 5.0, 5.0), FLAT_RANGE_VALUE);
        assert_eq!(normalize_value(f64::NAN, 1.0, 3.0), 0.0);
    }

    #[test]
    fn end_to_end_4x4_grid() {
        let grid = grid_4x4();
        assert_eq!((grid.min, grid.max), (1.0, 3.0));
        let mesh = build_mesh(
            &grid,
            &ramp(),
            DEFAULT_CELL_BUDGET,
            &Projection::default(),
            &MeshOptions::default(),
        );
        assert_eq!(mesh.cell_count(), 12);
        assert_eq!(mesh.vertices.len(), 12 * VERTICES_PER_CELL);
        assert_eq!(mesh.indices.len(), 12 * INDICES_PER_CELL);
        assert!(!mesh.contains_cell(0, 3));
        assert!(mesh.cells.iter().all(|c| c.col != 3));
    }

    #[test]
    fn ramp_endpoints_reach_vertex_colors() {
        let mesh = build_mesh(
            &grid_4x4(),
            &ramp(),
            DEFAULT_CELL_BUDGET,
            &Projection::default(),
            &MeshOptions::default(),
        );
        let color_of = |col: u32| {
            let i = mesh.cells.iter().position(|c| c.col == col).expect("cell");
            mesh.vertices[i * VERTICES_PER_CELL].color
        };
        assert_eq!(color_of(0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(color_of(2), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn all_nodata_grid_emits_nothing() {
        let grid = parse_asc(
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -1\n-1 -1\n-1 -1\n",
        )
        .expect("grid");
        assert_eq!(grid.min, grid.max);
        assert_eq!(grid.min, formats::asc::FALLBACK_VALUE);
        let mesh = build(&grid, 100);
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn nodata_never_contributes_for_random_grids() {
        let mut seed = 0x2545_f491_u64;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };
        for _ in 0..20 {
            let ncols = (next() % 9 + 1) as usize;
            let nrows = (next() % 9 + 1) as usize;
            let cells: Vec<f64> = (0..ncols * nrows)
                .map(|_| if next() % 3 == 0 { -9999.0 } else { (next() % 100) as f64 })
                .collect();
            let grid = RasterGrid::new(ncols, nrows, 0.0, 0.0, 1.0, -9999.0, cells).expect("grid");
            let mesh = build(&grid, 10_000);
            assert_eq!(mesh.cell_count(), grid.valid_cell_count());
            for c in &mesh.cells {
                let v = grid.get(c.row as usize, c.col as usize).expect("in range");
                assert!(grid.is_valid(v));
            }
        }
    }

    #[test]
    fn decimation_caps_primitives_and_keeps_coverage() {
        let cells: Vec<f64> = (0..100 * 100).map(|i| i as f64).collect();
        let grid = RasterGrid::new(100, 100, -50.0, -50.0, 1.0, -9999.0, cells).expect("grid");
        let budget = 1_000;
        let stride = decimation_stride(&grid, budget);
        assert_eq!(stride, 4);
        let mesh = build(&grid, budget);
        assert!(mesh.cell_count() <= budget);
        assert_eq!(mesh.cell_count(), 625);
        assert!(mesh.contains_cell(99, 99));
        assert!(mesh.contains_cell(0, 0));
    }

    #[test]
    fn decimation_skips_blocks_without_data() {
        // 8x8 with the north-east 4x4 quadrant entirely nodata.
        let cells: Vec<f64> = (0..8 * 8)
            .map(|i| if i / 8 < 4 && i % 8 >= 4 { -9999.0 } else { (i % 5) as f64 })
            .collect();
        let grid = RasterGrid::new(8, 8, 0.0, 0.0, 1.0, -9999.0, cells).expect("grid");
        let budget = 4;
        assert_eq!(decimation_stride(&grid, budget), 4);

        let mesh = build(&grid, budget);
        assert_eq!(mesh.cell_count(), 3);
        assert!(!mesh.cells.iter().any(|c| (c.row, c.col) == (0, 4)));
        assert!(mesh.cells.iter().all(|c| c.span == 4));
        for row in 0..4 {
            for col in 4..8 {
                assert!(!mesh.contains_cell(row, col));
            }
        }
        assert_eq!(mesh.vertices.len(), 3 * VERTICES_PER_CELL);
    }

    #[test]
    fn zero_budget_emits_nothing() {
        let mesh = build(&grid_4x4(), 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn boxes_stand_on_base_radius() {
        let options = MeshOptions::default();
        let mesh = build_mesh(&grid_4x4(), &ramp(), 100, &Projection::default(), &options);
        for cell in 0..mesh.cell_count() {
            let v = &mesh.vertices[cell * VERTICES_PER_CELL..(cell + 1) * VERTICES_PER_CELL];
            let r = |p: [f32; 3]| ((p[0] * p[0] + p[1] * p[1] + p[2] * p[2]) as f64).sqrt();
            for top in &v[..4] {
                assert!(r(top.position) > options.base_radius + options.min_height * 0.5);
            }
            for bottom in &v[4..] {
                assert!((r(bottom.position) - options.base_radius).abs() < 1e-5);
            }
        }
    }
}
