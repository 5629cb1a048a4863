// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cap triangulation
//!
//! Wrapper around earcutr. Returned triangles are always counter-clockwise
//! in the input's 2D coordinates.

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Twice the signed area of a 2D ring; positive when counter-clockwise
pub fn signed_area_2d(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (p, q) = (&ring[i], &ring[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum()
}

/// Triangulate an outer ring with holes. Indices address the concatenation
/// of `outer` followed by every hole in order.
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }
    if holes.iter().any(|h| h.len() < 3) {
        return Err(Error::TriangulationError(
            "Need at least 3 points in every hole".to_string(),
        ));
    }

    // Triangle: nothing to do
    if outer.len() == 3 && holes.is_empty() {
        return Ok(ccw_triangles(vec![0, 1, 2], outer, holes));
    }

    let total: usize = outer.len() + holes.iter().map(Vec::len).sum::<usize>();
    let mut vertices = Vec::with_capacity(total * 2);
    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    let indices = earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;
    if indices.is_empty() {
        return Err(Error::TriangulationError(
            "Polygon produced no triangles".to_string(),
        ));
    }

    Ok(ccw_triangles(indices, outer, holes))
}

/// Flip any clockwise triangle so the winding is uniform
fn ccw_triangles(mut indices: Vec<usize>, outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Vec<usize> {
    let point = |i: usize| -> Point2<f64> {
        if i < outer.len() {
            return outer[i];
        }
        let mut i = i - outer.len();
        for hole in holes {
            if i < hole.len() {
                return hole[i];
            }
            i -= hole.len();
        }
        Point2::origin()
    };

    for tri in indices.chunks_exact_mut(3) {
        let (a, b, c) = (point(tri[0]), point(tri[1]), point(tri[2]));
        if (b - a).perp(&(c - a)) < 0.0 {
            tri.swap(1, 2);
        }
    }
    indices
}
