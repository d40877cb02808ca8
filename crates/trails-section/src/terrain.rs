//! Triangulated terrain with a 2D grid index for vertical queries.

use std::collections::HashMap;

use tracing::debug;
use trails_geom::{LineSegment, Point3, Vec3};

use crate::error::{Result, SectionError};
use crate::surface::SurfaceIntersector;

/// A terrain triangle with precomputed plane and XY bounds.
#[derive(Debug, Clone)]
pub struct TerrainTriangle {
    /// Vertex positions.
    pub v: [Point3; 3],
    /// Unit plane normal.
    pub normal: Vec3,
    /// Plane equation: normal · p = d
    pub d: f64,
    /// 2D bounding box [min_x, min_y, max_x, max_y].
    pub bbox_2d: [f64; 4],
    /// Indices into the mesh's unique edge list.
    edges: [usize; 3],
}

impl TerrainTriangle {
    fn new(v0: Point3, v1: Point3, v2: Point3, edges: [usize; 3]) -> Self {
        let n = (v1 - v0).cross(&(v2 - v0));
        let len = n.norm();
        let normal = if len > 1e-10 { n / len } else { Vec3::z() };
        let d = normal.dot(&v0.coords);

        Self {
            v: [v0, v1, v2],
            normal,
            d,
            bbox_2d: [
                v0.x.min(v1.x).min(v2.x),
                v0.y.min(v1.y).min(v2.y),
                v0.x.max(v1.x).max(v2.x),
                v0.y.max(v1.y).max(v2.y),
            ],
            edges,
        }
    }

    /// Z on the triangle plane at (x, y).
    /// Returns None if the triangle is vertical.
    pub fn z_at_xy(&self, x: f64, y: f64) -> Option<f64> {
        if self.normal.z.abs() < 1e-10 {
            return None;
        }
        Some((self.d - self.normal.x * x - self.normal.y * y) / self.normal.z)
    }

    /// Check if (x, y) is inside the triangle's XY projection.
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        let [v0, v1, v2] = &self.v;

        let d00 = (v1.x - v0.x) * (v1.x - v0.x) + (v1.y - v0.y) * (v1.y - v0.y);
        let d01 = (v1.x - v0.x) * (v2.x - v0.x) + (v1.y - v0.y) * (v2.y - v0.y);
        let d11 = (v2.x - v0.x) * (v2.x - v0.x) + (v2.y - v0.y) * (v2.y - v0.y);
        let d20 = (x - v0.x) * (v1.x - v0.x) + (y - v0.y) * (v1.y - v0.y);
        let d21 = (x - v0.x) * (v2.x - v0.x) + (y - v0.y) * (v2.y - v0.y);

        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-10 {
            return false;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;

        // Small negative slack keeps points on shared edges inside.
        let eps = -1e-8;
        u >= eps && v >= eps && w >= eps
    }
}

/// A triangulated terrain surface.
///
/// Triangles are bucketed into a uniform XY grid so that vertical queries
/// only test nearby triangles.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    vertices: Vec<Point3>,
    triangles: Vec<TerrainTriangle>,
    edges: Vec<[usize; 2]>,
    cell_size: f64,
    bounds: [f64; 4],
    grid_nx: usize,
    grid_ny: usize,
    cells: HashMap<(usize, usize), Vec<usize>>,
}

impl TerrainMesh {
    /// Build a terrain from vertices and triangle indices (groups of 3).
    ///
    /// The grid cell size is chosen from the mesh extent and triangle count.
    pub fn new(vertices: Vec<Point3>, indices: &[u32]) -> Result<Self> {
        let (min, max) = xy_extent(&vertices)
            .ok_or_else(|| SectionError::InvalidMesh("no vertices".into()))?;
        let extent = (max[0] - min[0]).max(max[1] - min[1]);
        let tri_count = (indices.len() / 3).max(1) as f64;
        let cell_size = (extent / tri_count.sqrt()).max(1e-3);
        Self::with_cell_size(vertices, indices, cell_size)
    }

    /// Build a terrain from interleaved `[x, y, z, ...]` coordinates.
    pub fn from_flat(vertices: &[f64], indices: &[u32]) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(SectionError::InvalidMesh(format!(
                "vertex array length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        let verts = vertices
            .chunks(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        Self::new(verts, indices)
    }

    /// Build a terrain with an explicit grid cell size.
    pub fn with_cell_size(vertices: Vec<Point3>, indices: &[u32], cell_size: f64) -> Result<Self> {
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(SectionError::InvalidMesh(format!(
                "index count {} is not a positive multiple of 3",
                indices.len()
            )));
        }
        if !(cell_size > 0.0) {
            return Err(SectionError::InvalidMesh(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(SectionError::InvalidMesh(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        let (mut min, mut max) = xy_extent(&vertices)
            .ok_or_else(|| SectionError::InvalidMesh("no vertices".into()))?;

        let padding = cell_size * 0.1;
        min[0] -= padding;
        min[1] -= padding;
        max[0] += padding;
        max[1] += padding;
        let bounds = [min[0], min[1], max[0], max[1]];

        let mut edge_ids: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges = Vec::new();
        let mut edge_id = |a: usize, b: usize| -> usize {
            let key = (a.min(b), a.max(b));
            *edge_ids.entry(key).or_insert_with(|| {
                edges.push([key.0, key.1]);
                edges.len() - 1
            })
        };

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for chunk in indices.chunks(3) {
            let (i0, i1, i2) = (chunk[0] as usize, chunk[1] as usize, chunk[2] as usize);
            let tri_edges = [edge_id(i0, i1), edge_id(i1, i2), edge_id(i2, i0)];
            triangles.push(TerrainTriangle::new(
                vertices[i0],
                vertices[i1],
                vertices[i2],
                tri_edges,
            ));
        }

        let grid_nx = ((max[0] - min[0]) / cell_size).ceil() as usize + 1;
        let grid_ny = ((max[1] - min[1]) / cell_size).ceil() as usize + 1;

        let mut cells: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (tri_idx, tri) in triangles.iter().enumerate() {
            let x0 = ((tri.bbox_2d[0] - min[0]) / cell_size).floor() as usize;
            let y0 = ((tri.bbox_2d[1] - min[1]) / cell_size).floor() as usize;
            let x1 = ((tri.bbox_2d[2] - min[0]) / cell_size).floor() as usize;
            let y1 = ((tri.bbox_2d[3] - min[1]) / cell_size).floor() as usize;

            for iy in y0..=y1.min(grid_ny - 1) {
                for ix in x0..=x1.min(grid_nx - 1) {
                    cells.entry((ix, iy)).or_default().push(tri_idx);
                }
            }
        }

        debug!(
            vertices = vertices.len(),
            triangles = triangles.len(),
            edges = edges.len(),
            cell_size,
            "built terrain grid {}x{}",
            grid_nx,
            grid_ny
        );

        Ok(Self {
            vertices,
            triangles,
            edges,
            cell_size,
            bounds,
            grid_nx,
            grid_ny,
            cells,
        })
    }

    /// Triangles whose grid cells overlap the XY rectangle.
    pub fn query_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<usize> {
        let mut result = Vec::new();

        let x0 = ((min_x - self.bounds[0]) / self.cell_size).floor() as isize;
        let y0 = ((min_y - self.bounds[1]) / self.cell_size).floor() as isize;
        let x1 = ((max_x - self.bounds[0]) / self.cell_size).floor() as isize;
        let y1 = ((max_y - self.bounds[1]) / self.cell_size).floor() as isize;

        for iy in y0.max(0)..=y1.min(self.grid_ny as isize - 1) {
            for ix in x0.max(0)..=x1.min(self.grid_nx as isize - 1) {
                if let Some(indices) = self.cells.get(&(ix as usize, iy as usize)) {
                    result.extend_from_slice(indices);
                }
            }
        }

        result.sort_unstable();
        result.dedup();
        result
    }

    /// Elevation of the terrain at (x, y), if the point lies on it.
    pub fn elevation_at(&self, x: f64, y: f64) -> Option<f64> {
        self.query_rect(x, y, x, y)
            .into_iter()
            .map(|idx| &self.triangles[idx])
            .filter(|tri| tri.contains_xy(x, y))
            .find_map(|tri| tri.z_at_xy(x, y))
    }
}

impl SurfaceIntersector for TerrainMesh {
    fn find_section_parameters(&self, edge: &LineSegment) -> Vec<f64> {
        let (a, b) = (edge.start, edge.end);
        let length = edge.length();

        let mut edge_ids: Vec<usize> = self
            .query_rect(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
            .into_iter()
            .flat_map(|idx| self.triangles[idx].edges)
            .collect();
        edge_ids.sort_unstable();
        edge_ids.dedup();

        let mut params: Vec<f64> = edge_ids
            .into_iter()
            .filter_map(|id| {
                let [i, j] = self.edges[id];
                crossing_fraction(&a, &b, &self.vertices[i], &self.vertices[j])
            })
            .map(|t| t * length)
            .collect();
        params.sort_by(f64::total_cmp);
        params
    }

    fn project_points(&self, points: &[Point3]) -> Vec<Option<Point3>> {
        points
            .iter()
            .map(|p| self.elevation_at(p.x, p.y).map(|z| Point3::new(p.x, p.y, z)))
            .collect()
    }
}

/// Fraction along `a -> b` where it crosses `p -> q`, both projected to XY.
fn crossing_fraction(a: &Point3, b: &Point3, p: &Point3, q: &Point3) -> Option<f64> {
    let r = (b.x - a.x, b.y - a.y);
    let s = (q.x - p.x, q.y - p.y);
    let denom = r.0 * s.1 - r.1 * s.0;
    if denom.abs() < 1e-12 {
        return None;
    }
    let w = (p.x - a.x, p.y - a.y);
    let t = (w.0 * s.1 - w.1 * s.0) / denom;
    let u = (w.0 * r.1 - w.1 * r.0) / denom;
    let eps = 1e-12;
    if (-eps..=1.0 + eps).contains(&t) && (-eps..=1.0 + eps).contains(&u) {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}

fn xy_extent(vertices: &[Point3]) -> Option<([f64; 2], [f64; 2])> {
    if vertices.is_empty() {
        return None;
    }
    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for v in vertices {
        min[0] = min[0].min(v.x);
        min[1] = min[1].min(v.y);
        max[0] = max[0].max(v.x);
        max[1] = max[1].max(v.y);
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two triangles covering [0, 10] x [0, 10], sloping up in X (z = x).
    fn make_ramp() -> TerrainMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(10.0, 10.0, 10.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        TerrainMesh::new(vertices, &[0, 1, 2, 0, 2, 3]).unwrap()
    }

    #[test]
    fn test_triangle_z_at_xy() {
        let tri = TerrainTriangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(5.0, 10.0, 5.0),
            [0, 1, 2],
        );
        assert_relative_eq!(tri.z_at_xy(0.0, 0.0).unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(tri.z_at_xy(5.0, 10.0).unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_triangle_contains_xy() {
        let tri = TerrainTriangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(5.0, 10.0, 0.0),
            [0, 1, 2],
        );
        assert!(tri.contains_xy(5.0, 3.0));
        assert!(!tri.contains_xy(-1.0, 0.0));
        assert!(!tri.contains_xy(5.0, 15.0));
    }

    #[test]
    fn test_elevation_on_ramp() {
        let mesh = make_ramp();
        assert_relative_eq!(mesh.elevation_at(2.5, 7.0).unwrap(), 2.5, epsilon = 1e-9);
        assert_relative_eq!(mesh.elevation_at(9.0, 1.0).unwrap(), 9.0, epsilon = 1e-9);
        assert!(mesh.elevation_at(20.0, 5.0).is_none());
    }

    #[test]
    fn test_project_points_marks_misses() {
        let mesh = make_ramp();
        let projected = mesh.project_points(&[
            Point3::new(4.0, 4.0, 100.0),
            Point3::new(-5.0, 4.0, 0.0),
        ]);
        assert_eq!(projected.len(), 2);
        assert_relative_eq!(projected[0].unwrap().z, 4.0, epsilon = 1e-9);
        assert!(projected[1].is_none());
    }

    #[test]
    fn test_section_parameters_cross_diagonal() {
        let mesh = make_ramp();
        // Horizontal line at y = 4 crosses the diagonal (0,0)-(10,10) at x = 4,
        // plus the two outer edges at x = 0 and x = 10.
        let edge = LineSegment::new(Point3::new(-2.0, 4.0, 0.0), Point3::new(12.0, 4.0, 0.0));
        let params = mesh.find_section_parameters(&edge);
        assert_eq!(params.len(), 3);
        assert_relative_eq!(params[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(params[1], 6.0, epsilon = 1e-9);
        assert_relative_eq!(params[2], 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_meshes() {
        assert!(TerrainMesh::new(Vec::new(), &[0, 1, 2]).is_err());
        let verts = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert!(matches!(
            TerrainMesh::new(verts, &[0, 1, 2]),
            Err(SectionError::InvalidMesh(_))
        ));
        assert!(TerrainMesh::from_flat(&[0.0, 1.0], &[0, 0, 0]).is_err());
    }
}
