use bytemuck::{Pod, Zeroable};

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// The raster cell (or decimated block of cells) a primitive came from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CellRef {
    /// Top-left grid row of the block.
    pub row: u32,
    /// Top-left grid column of the block.
    pub col: u32,
    /// Block edge length in cells (1 without decimation).
    pub span: u32,
    pub value: f64,
}

/// One batched, indexed triangle mesh: a single GPU submission.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeoMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// One entry per emitted primitive, in emission order.
    pub cells: Vec<CellRef>,
}

impl GeoMesh {
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn contains_cell(&self, row: u32, col: u32) -> bool {
        self.cells.iter().any(|c| {
            row >= c.row && row < c.row + c.span && col >= c.col && col < c.col + c.span
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CellRef, GeoMesh, MeshVertex};

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 28);
        let mesh = GeoMesh {
            vertices: vec![MeshVertex {
                position: [0.0; 3],
                color: [1.0; 4],
            }],
            indices: vec![0, 0, 0],
            cells: vec![],
        };
        assert_eq!(mesh.vertex_bytes().len(), 28);
        assert_eq!(mesh.index_bytes().len(), 12);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn contains_cell_respects_block_span() {
        let mesh = GeoMesh {
            cells: vec![CellRef {
                row: 2,
                col: 4,
                span: 2,
                value: 1.0,
            }],
            ..GeoMesh::default()
        };
        assert!(mesh.contains_cell(3, 5));
        assert!(!mesh.contains_cell(4, 5));
        assert!(!mesh.contains_cell(2, 3));
    }
}
