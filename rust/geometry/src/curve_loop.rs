// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered chains of curve segments

use crate::curve::CurveSegment;
use crate::error::{Error, Result};
use crate::tolerance::ToleranceContext;
use nalgebra::{Isometry3, Point3, Vector3};

/// Ordered segments where each end meets the next start within the vertex
/// tolerance. Closed when the last end meets the first start.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveLoop {
    segments: Vec<CurveSegment>,
}

impl CurveLoop {
    /// Build a loop, checking connectivity between successive segments
    pub fn from_segments(segments: Vec<CurveSegment>, tol: &ToleranceContext) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::curve("curve loop needs at least one segment"));
        }
        for (i, pair) in segments.windows(2).enumerate() {
            let gap = (pair[1].start_point() - pair[0].end_point()).norm();
            if gap > tol.vertex_epsilon() {
                return Err(Error::curve(format!(
                    "segments {} and {} are disconnected by {}",
                    i,
                    i + 1,
                    tol.format_length(gap)
                )));
            }
        }
        Ok(Self { segments })
    }

    /// Wrap segments whose connectivity the caller already guarantees
    pub(crate) fn from_connected(segments: Vec<CurveSegment>) -> Self {
        Self { segments }
    }

    pub fn single(segment: CurveSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    #[inline]
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    #[inline]
    pub fn into_segments(self) -> Vec<CurveSegment> {
        self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start_point(&self) -> Option<Point3<f64>> {
        self.segments.first().map(CurveSegment::start_point)
    }

    pub fn end_point(&self) -> Option<Point3<f64>> {
        self.segments.last().map(CurveSegment::end_point)
    }

    /// Distance between the loop's end and its start
    pub fn closure_gap(&self) -> f64 {
        match (self.start_point(), self.end_point()) {
            (Some(s), Some(e)) => (e - s).norm(),
            _ => f64::INFINITY,
        }
    }

    pub fn is_closed(&self, tol: &ToleranceContext) -> bool {
        tol.is_coincident(self.closure_gap())
    }

    pub fn length(&self) -> f64 {
        self.segments.iter().map(CurveSegment::length).sum()
    }

    pub fn reversed(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(CurveSegment::reversed).collect(),
        }
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.translated(offset)).collect(),
        }
    }

    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.transformed(transform)).collect(),
        }
    }

    /// Polyline approximation without the duplicated joint vertices.
    /// For a closed loop the first point is not repeated at the end.
    pub fn tessellate(&self, segments_per_turn: usize) -> Vec<Point3<f64>> {
        let mut points: Vec<Point3<f64>> = Vec::new();
        for segment in &self.segments {
            let pts = segment.tessellate(segments_per_turn);
            let skip = usize::from(!points.is_empty());
            points.extend(pts.into_iter().skip(skip));
        }
        if points.len() > 1 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                if (first - last).norm() < 1e-9 {
                    points.pop();
                }
            }
        }
        points
    }

    /// Newell normal of the tessellated loop (unnormalized; length is twice
    /// the enclosed area)
    pub fn area_vector(&self, segments_per_turn: usize) -> Vector3<f64> {
        let pts = self.tessellate(segments_per_turn);
        let mut n = Vector3::zeros();
        for (i, p) in pts.iter().enumerate() {
            let q = &pts[(i + 1) % pts.len()];
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        n
    }

    /// Unit plane normal following the loop's winding
    pub fn normal(&self, segments_per_turn: usize) -> Option<Vector3<f64>> {
        self.area_vector(segments_per_turn).try_normalize(1e-15)
    }

    /// Signed area measured about `axis`: positive when counter-clockwise
    pub fn signed_area(&self, axis: &Vector3<f64>, segments_per_turn: usize) -> f64 {
        0.5 * self.area_vector(segments_per_turn).dot(axis)
    }

    /// The loop wound counter-clockwise about `axis`, or clockwise when
    /// `counter_clockwise` is false
    pub fn oriented(self, axis: &Vector3<f64>, counter_clockwise: bool, segments_per_turn: usize) -> Self {
        let positive = self.signed_area(axis, segments_per_turn) >= 0.0;
        if positive == counter_clockwise {
            self
        } else {
            self.reversed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<CurveSegment> {
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(size, 0.0, 0.0),
            Point3::new(size, size, 0.0),
            Point3::new(0.0, size, 0.0),
        ];
        (0..4).map(|i| CurveSegment::line(p[i], p[(i + 1) % 4])).collect()
    }

    #[test]
    fn test_closed_square() {
        let tol = ToleranceContext::default();
        let lp = CurveLoop::from_segments(square(2.0), &tol).unwrap();
        assert!(lp.is_closed(&tol));
        assert_relative_eq!(lp.length(), 8.0);
        assert_relative_eq!(lp.signed_area(&Vector3::z(), 32), 4.0);
        assert_relative_eq!(lp.reversed().signed_area(&Vector3::z(), 32), -4.0);
        assert_eq!(lp.tessellate(32).len(), 4);
    }

    #[test]
    fn test_disconnected_segments_rejected() {
        let tol = ToleranceContext::default();
        let mut segs = square(1.0);
        segs[2] = segs[2].translated(&Vector3::new(0.0, 0.01, 0.0));
        assert!(CurveLoop::from_segments(segs, &tol).is_err());
    }
}
