// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle mesh produced by the mesh-backed solid service

use nalgebra::{Point3, Vector3};

/// Triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// All positions and normals are finite and every index is in range
    pub fn is_well_formed(&self) -> bool {
        let count = self.vertex_count() as u32;
        self.positions.len() % 3 == 0
            && self.normals.len() == self.positions.len()
            && self.indices.len() % 3 == 0
            && self.positions.iter().chain(self.normals.iter()).all(|v| v.is_finite())
            && self.indices.iter().all(|&i| i < count)
    }

    /// Signed enclosed volume (divergence theorem), positive for outward
    /// facing triangles. Only meaningful for closed meshes.
    pub fn volume(&self) -> f64 {
        let point = |i: u32| {
            let base = i as usize * 3;
            Vector3::new(
                self.positions[base] as f64,
                self.positions[base + 1] as f64,
                self.positions[base + 2] as f64,
            )
        };
        self.indices
            .chunks_exact(3)
            .map(|tri| {
                let (a, b, c) = (point(tri[0]), point(tri[1]), point(tri[2]));
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        let n = Vector3::z();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), n);
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), n);
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), n);
        mesh.add_vertex(Point3::new(0.0, 0.0, 1.0), n);
        mesh.add_triangle(0, 2, 1);
        mesh.add_triangle(0, 1, 3);
        mesh.add_triangle(0, 3, 2);
        mesh.add_triangle(1, 2, 3);
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = tetrahedron();
        let b = tetrahedron();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.triangle_count(), 8);
        assert_eq!(a.indices[12], 4);
        assert!(a.is_well_formed());
    }

    #[test]
    fn test_volume_of_outward_tetrahedron() {
        let mesh = tetrahedron();
        assert_relative_eq!(mesh.volume(), 1.0 / 6.0, epsilon = 1e-9);
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_out_of_range_index_is_malformed() {
        let mut mesh = tetrahedron();
        mesh.add_triangle(0, 1, 9);
        assert!(!mesh.is_well_formed());
    }
}
