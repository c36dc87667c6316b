//! Triangulated adjacency mesh over a sample grid.
//!
//! Each grid cell is split by a diagonal into a lower and an upper triangle.
//! Edges and triangles live in index-addressed arenas; an edge knows the up
//! to two triangles that own it, and a triangle knows its three edges, which
//! is all the adjacency the contour tracer needs for O(1) walks.
//!
//! Edges are created only between two `InRange` grid points, so cells with
//! missing samples silently contribute no triangles. After construction,
//! every edge owned by fewer than two triangles is reclassified as a
//! boundary edge (this overrides the diagonal classification, as the outer
//! rim of a partially defined grid can run along cell diagonals).

use field_grid::{Grid, SamplePoint};

/// Index of an edge in the mesh arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeId(pub(crate) u32);

/// Index of a triangle in the mesh arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriId(pub(crate) u32);

/// Where an edge sits in the mesh topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePosition {
    InnerMesh,
    Boundary,
    Diagonal,
}

/// One side of a triangle, referencing two grid points by flat index.
#[derive(Debug, Clone)]
pub struct Edge {
    verts: [u32; 2],
    tris: [Option<TriId>; 2],
    pub position: EdgePosition,
    pub is_active: bool,
}

impl Edge {
    pub fn triangles(&self) -> [Option<TriId>; 2] {
        self.tris
    }

    pub fn has_triangle(&self) -> bool {
        self.tris[0].is_some() || self.tris[1].is_some()
    }
}

/// A triangle owning exactly three edges.
#[derive(Debug, Clone)]
pub struct Triangle {
    edges: [EdgeId; 3],
}

impl Triangle {
    pub fn edges(&self) -> [EdgeId; 3] {
        self.edges
    }
}

/// The full edge/triangle mesh for one grid, rebuilt per contouring call.
#[derive(Debug)]
pub struct Mesh {
    edges: Vec<Edge>,
    tris: Vec<Triangle>,
    /// Edge traversal order used by the seed scans. Horizontal edges of each
    /// row are deferred to the end of that row's block, so scanning favors
    /// the verticals and diagonals created while the row was built. The
    /// order in which seeds are found decides which trace emits which
    /// contour, so it is part of the engine's observable behavior.
    scan: Vec<EdgeId>,
    row_len: usize,
}

impl Mesh {
    /// Triangulate a grid.
    pub fn build(grid: &Grid) -> Self {
        let cols = grid.row_len();
        let mut mesh = Mesh {
            edges: Vec::new(),
            tris: Vec::new(),
            scan: Vec::new(),
            row_len: cols,
        };

        // Horizontal edges of the first row.
        let mut bottom: Vec<Option<EdgeId>> = (0..cols - 1)
            .map(|j| mesh.add_edge(grid, (0, j), (0, j + 1), true))
            .collect();

        for r in 1..grid.num_rows() {
            let mut top: Vec<Option<EdgeId>> = Vec::with_capacity(cols - 1);
            let mut row_horiz: Vec<EdgeId> = Vec::new();

            // Leading vertical edge of this row pair.
            let mut right_vert = mesh.add_edge(grid, (r - 1, 0), (r, 0), true);

            for j in 0..cols - 1 {
                let left_vert = right_vert;
                let lower_horiz = bottom[j];

                let diag = mesh.add_edge(grid, (r - 1, j + 1), (r, j), true);
                if let Some(id) = diag {
                    mesh.edges[id.0 as usize].position = EdgePosition::Diagonal;
                }

                mesh.add_triangle(left_vert, diag, lower_horiz);

                let upper_horiz = mesh.add_edge(grid, (r, j), (r, j + 1), false);
                if let Some(id) = upper_horiz {
                    row_horiz.push(id);
                }
                right_vert = mesh.add_edge(grid, (r - 1, j + 1), (r, j + 1), true);

                mesh.add_triangle(diag, upper_horiz, right_vert);

                top.push(upper_horiz);
            }

            // The row's horizontal edges join the scan order after its
            // verticals and diagonals.
            mesh.scan.extend(row_horiz);
            bottom = top;
        }

        for edge in &mut mesh.edges {
            if edge.tris[0].is_none() || edge.tris[1].is_none() {
                edge.position = EdgePosition::Boundary;
            }
        }

        mesh
    }

    /// Create an edge between two grid positions, if both are in range.
    fn add_edge(
        &mut self,
        grid: &Grid,
        a: (usize, usize),
        b: (usize, usize),
        into_scan: bool,
    ) -> Option<EdgeId> {
        if !grid.point(a.0, a.1).is_in_range() || !grid.point(b.0, b.1).is_in_range() {
            return None;
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            verts: [
                (a.0 * self.row_len + a.1) as u32,
                (b.0 * self.row_len + b.1) as u32,
            ],
            tris: [None, None],
            position: EdgePosition::InnerMesh,
            is_active: false,
        });
        if into_scan {
            self.scan.push(id);
        }
        Some(id)
    }

    /// Create a triangle and wire it into its edges, if all three exist.
    fn add_triangle(
        &mut self,
        e0: Option<EdgeId>,
        e1: Option<EdgeId>,
        e2: Option<EdgeId>,
    ) -> Option<TriId> {
        let (e0, e1, e2) = (e0?, e1?, e2?);
        let id = TriId(self.tris.len() as u32);
        self.tris.push(Triangle {
            edges: [e0, e1, e2],
        });
        for edge_id in [e0, e1, e2] {
            let slots = &mut self.edges[edge_id.0 as usize].tris;
            if slots[0].is_some() {
                slots[1] = Some(id);
            } else {
                slots[0] = Some(id);
            }
        }
        Some(id)
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0 as usize]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0 as usize]
    }

    pub fn triangle(&self, id: TriId) -> &Triangle {
        &self.tris[id.0 as usize]
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.iter_mut()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.tris.len()
    }

    /// Edge ids in seed-scan order.
    pub fn scan_order(&self) -> &[EdgeId] {
        &self.scan
    }

    /// The two endpoint samples of an edge.
    pub fn endpoints<'a>(&self, grid: &'a Grid, id: EdgeId) -> [&'a SamplePoint; 2] {
        let e = &self.edges[id.0 as usize];
        let fetch = |v: u32| grid.point(v as usize / self.row_len, v as usize % self.row_len);
        [fetch(e.verts[0]), fetch(e.verts[1])]
    }
}
