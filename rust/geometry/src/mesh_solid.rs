// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh-backed solid service
//!
//! Tessellates every loop, triangulates the two caps with earcutr and
//! stitches side walls between them. The mesh fallback is the same
//! construction at a coarser arc density.

use crate::curve::Frame;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::Profile;
use crate::solid::SolidBuilder;
use crate::triangulation::{signed_area_2d, triangulate_polygon_with_holes};
use nalgebra::{Point2, Point3, Vector3};

/// Default arc density (segments per full turn)
pub const DEFAULT_ARC_SEGMENTS: usize = 32;

/// Arc density used for the coarse mesh fallback
pub const DEFAULT_COARSE_ARC_SEGMENTS: usize = 8;

/// Solids below this volume (m³) are rejected by the validity check
const MIN_VOLUME: f64 = 1e-12;

/// Reference [`SolidBuilder`] producing closed triangle meshes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshSolidBuilder {
    arc_segments: usize,
    coarse_arc_segments: usize,
}

impl MeshSolidBuilder {
    pub fn new(arc_segments: usize, coarse_arc_segments: usize) -> Self {
        Self {
            arc_segments: arc_segments.max(4),
            coarse_arc_segments: coarse_arc_segments.max(4),
        }
    }

    #[inline]
    pub fn arc_segments(&self) -> usize {
        self.arc_segments
    }

    #[inline]
    pub fn coarse_arc_segments(&self) -> usize {
        self.coarse_arc_segments
    }

    fn build(&self, profiles: &[Profile], direction: &Vector3<f64>, depth: f64, segments: usize) -> Result<Mesh> {
        if !(depth.is_finite() && depth > 0.0) {
            return Err(Error::InvalidExtrusion(format!("Depth must be positive, got {depth}")));
        }
        let direction = direction
            .try_normalize(1e-12)
            .ok_or_else(|| Error::extrusion("Extrusion direction has zero length"))?;

        let mut mesh = Mesh::new();
        for profile in profiles {
            mesh.merge(&extrude_profile(profile, &direction, depth, segments)?);
        }
        if mesh.is_empty() {
            return Err(Error::SolidConstruction("No profile to extrude".to_string()));
        }
        Ok(mesh)
    }
}

impl Default for MeshSolidBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ARC_SEGMENTS, DEFAULT_COARSE_ARC_SEGMENTS)
    }
}

impl SolidBuilder for MeshSolidBuilder {
    type Solid = Mesh;

    fn extrude(&self, profiles: &[Profile], direction: &Vector3<f64>, depth: f64) -> Result<Mesh> {
        self.build(profiles, direction, depth, self.arc_segments)
    }

    fn is_valid(&self, solid: &Mesh) -> bool {
        !solid.is_empty() && solid.is_well_formed() && solid.volume() > MIN_VOLUME
    }

    fn extrude_mesh(&self, profiles: &[Profile], direction: &Vector3<f64>, depth: f64) -> Result<Mesh> {
        self.build(profiles, direction, depth, self.coarse_arc_segments)
    }
}

/// One closed ring in world and plane coordinates
struct Ring {
    world: Vec<Point3<f64>>,
    plane: Vec<Point2<f64>>,
}

impl Ring {
    fn new(world: Vec<Point3<f64>>, frame: &Frame, counter_clockwise: bool) -> Self {
        let plane: Vec<Point2<f64>> = world
            .iter()
            .map(|p| {
                let (u, v) = frame.to_local(p);
                Point2::new(u, v)
            })
            .collect();
        let ring = Self { world, plane };
        if (signed_area_2d(&ring.plane) > 0.0) == counter_clockwise {
            ring
        } else {
            Self {
                world: ring.world.into_iter().rev().collect(),
                plane: ring.plane.into_iter().rev().collect(),
            }
        }
    }
}

fn extrude_profile(profile: &Profile, direction: &Vector3<f64>, depth: f64, segments: usize) -> Result<Mesh> {
    let outer_points = profile.outer.tessellate(segments);
    if outer_points.len() < 3 {
        return Err(Error::SolidConstruction(
            "Profile outline has fewer than 3 distinct points".to_string(),
        ));
    }
    let normal = profile
        .outer
        .normal(segments)
        .ok_or_else(|| Error::SolidConstruction("Profile encloses no area".to_string()))?;
    let facing = direction.dot(&normal);
    if facing.abs() < 1e-9 {
        return Err(Error::extrusion("Extrusion direction lies in the profile plane"));
    }

    let frame = Frame::from_normal(outer_points[0], normal)?;
    let outer = Ring::new(outer_points, &frame, true);
    let holes: Vec<Ring> = profile
        .inner
        .iter()
        .map(|lp| Ring::new(lp.tessellate(segments), &frame, false))
        .collect();

    let hole_plane: Vec<Vec<Point2<f64>>> = holes.iter().map(|h| h.plane.clone()).collect();
    let triangles = triangulate_polygon_with_holes(&outer.plane, &hole_plane)?;

    let offset = direction * depth;
    // Caps and walls are wound for a direction along the outline normal
    let flip = facing < 0.0;
    let cap_points: Vec<Point3<f64>> = outer
        .world
        .iter()
        .chain(holes.iter().flat_map(|h| h.world.iter()))
        .copied()
        .collect();

    let wall_vertices: usize = 4 * (outer.world.len() + holes.iter().map(|h| h.world.len()).sum::<usize>());
    let mut mesh = Mesh::with_capacity(cap_points.len() * 2 + wall_vertices, triangles.len() * 2 + wall_vertices * 3 / 2);

    let bottom_normal = if flip { normal } else { -normal };
    add_cap(&mut mesh, &cap_points, &triangles, &Vector3::zeros(), bottom_normal, !flip);
    add_cap(&mut mesh, &cap_points, &triangles, &offset, -bottom_normal, flip);

    add_walls(&mut mesh, &outer.world, &offset, flip);
    for hole in &holes {
        add_walls(&mut mesh, &hole.world, &offset, flip);
    }
    Ok(mesh)
}

fn add_cap(
    mesh: &mut Mesh,
    points: &[Point3<f64>],
    triangles: &[usize],
    offset: &Vector3<f64>,
    normal: Vector3<f64>,
    reverse: bool,
) {
    let base = mesh.vertex_count() as u32;
    for p in points {
        mesh.add_vertex(p + offset, normal);
    }
    for tri in triangles.chunks_exact(3) {
        let (a, b, c) = (base + tri[0] as u32, base + tri[1] as u32, base + tri[2] as u32);
        if reverse {
            mesh.add_triangle(a, c, b);
        } else {
            mesh.add_triangle(a, b, c);
        }
    }
}

fn add_walls(mesh: &mut Mesh, ring: &[Point3<f64>], offset: &Vector3<f64>, flip: bool) {
    let n = ring.len();
    for i in 0..n {
        let (p0, p1) = (ring[i], ring[(i + 1) % n]);
        let Some(mut normal) = (p1 - p0).cross(offset).try_normalize(1e-12) else {
            continue;
        };
        if flip {
            normal = -normal;
        }

        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(p0, normal);
        mesh.add_vertex(p1, normal);
        mesh.add_vertex(p1 + offset, normal);
        mesh.add_vertex(p0 + offset, normal);

        if flip {
            mesh.add_triangle(idx, idx + 2, idx + 1);
            mesh.add_triangle(idx, idx + 3, idx + 2);
        } else {
            mesh.add_triangle(idx, idx + 1, idx + 2);
            mesh.add_triangle(idx, idx + 2, idx + 3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveSegment;
    use crate::curve_loop::CurveLoop;
    use crate::tolerance::ToleranceContext;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn square(size: f64) -> CurveLoop {
        let p = |x: f64, y: f64| Point3::new(x, y, 0.0);
        let corners = [p(0.0, 0.0), p(size, 0.0), p(size, size), p(0.0, size)];
        let segments = (0..4)
            .map(|i| CurveSegment::line(corners[i], corners[(i + 1) % 4]))
            .collect();
        CurveLoop::from_segments(segments, &ToleranceContext::default()).unwrap()
    }

    #[test]
    fn test_box_volume() {
        let builder = MeshSolidBuilder::default();
        let mesh = builder
            .extrude(&[Profile::new(square(2.0))], &Vector3::z(), 3.0)
            .unwrap();
        assert!(builder.is_valid(&mesh));
        assert_relative_eq!(mesh.volume(), 12.0, epsilon = 1e-5);
        let (min, max) = mesh.bounds();
        assert_eq!(min.z, 0.0);
        assert_eq!(max.z, 3.0);
    }

    #[test]
    fn test_reversed_direction_stays_outward() {
        let builder = MeshSolidBuilder::default();
        let mesh = builder
            .extrude(&[Profile::new(square(2.0))], &-Vector3::z(), 1.0)
            .unwrap();
        assert_relative_eq!(mesh.volume(), 4.0, epsilon = 1e-5);

        let clockwise = Profile::new(square(2.0).reversed());
        let mesh = builder.extrude(&[clockwise], &Vector3::z(), 1.0).unwrap();
        assert_relative_eq!(mesh.volume(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_hole_removes_volume() {
        let builder = MeshSolidBuilder::default();
        let hole = square(1.0).translated(&Vector3::new(0.5, 0.5, 0.0));
        let profile = Profile::with_holes(square(2.0), vec![hole]);
        let mesh = builder.extrude(&[profile], &Vector3::z(), 1.0).unwrap();
        assert_relative_eq!(mesh.volume(), 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_coarse_fallback_is_lower_fidelity() {
        let builder = MeshSolidBuilder::new(64, 8);
        let frame = Frame::xy(Point3::origin());
        let circle = CurveLoop::from_segments(
            vec![
                CurveSegment::arc(frame, 1.0, 0.0, PI),
                CurveSegment::arc(frame, 1.0, PI, 2.0 * PI),
            ],
            &ToleranceContext::default(),
        )
        .unwrap();
        let profiles = [Profile::new(circle)];
        let fine = builder.extrude(&profiles, &Vector3::z(), 1.0).unwrap();
        let coarse = builder.extrude_mesh(&profiles, &Vector3::z(), 1.0).unwrap();
        assert!(coarse.vertex_count() < fine.vertex_count());
        assert!(coarse.volume() < fine.volume());
        assert!(fine.volume() < PI);
    }

    #[test]
    fn test_direction_in_plane_is_rejected() {
        let builder = MeshSolidBuilder::default();
        let result = builder.extrude(&[Profile::new(square(1.0))], &Vector3::x(), 1.0);
        assert!(matches!(result, Err(Error::InvalidExtrusion(_))));
    }
}
