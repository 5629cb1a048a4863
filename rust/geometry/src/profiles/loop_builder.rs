// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batched loop construction from segment descriptors
//!
//! Shape builders describe a boundary as lines and arcs in the profile plane,
//! then commit them with [`LoopBuilder::append_segments`]. A batch is
//! all-or-nothing: if any descriptor cannot be materialized the pending list
//! is cleared and the caller gets a [`FalloffReason`], leaving the committed
//! segments untouched so it can retry with a simpler shape.

use crate::curve::{CurveSegment, Frame};
use crate::curve_loop::CurveLoop;
use crate::tolerance::ToleranceContext;
use nalgebra::{Point2, Point3, Vector2};
use std::f64::consts::PI;
use thiserror::Error;

/// Why a filleted or otherwise optional construction was abandoned
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FalloffReason {
    #[error("segment {index} is too short ({length:.6})")]
    ShortSegment { index: usize, length: f64 },

    #[error("arc {index} has a degenerate radius ({radius:.6})")]
    DegenerateArc { index: usize, radius: f64 },

    #[error("fillet radius {radius:.6} does not fit an edge of length {limit:.6}")]
    FilletTooLarge { radius: f64, limit: f64 },

    #[error("corner is straight or folded back")]
    DegenerateCorner,

    #[error("segment {index} does not connect to its predecessor (gap {gap:.6})")]
    Disconnected { index: usize, gap: f64 },

    #[error("loop does not close (gap {gap:.6})")]
    OpenLoop { gap: f64 },

    #[error("no segments")]
    Empty,
}

/// One boundary piece, not yet materialized
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentDescriptor {
    Line {
        start: Point2<f64>,
        end: Point2<f64>,
    },
    /// Counter-clockwise arc from `start_angle` to `end_angle`, traversed
    /// backwards when `reverse` is set
    Arc {
        center: Point2<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        reverse: bool,
    },
}

#[inline]
pub(crate) fn lift(p: &Point2<f64>) -> Point3<f64> {
    Point3::new(p.x, p.y, 0.0)
}

impl SegmentDescriptor {
    fn materialize(&self, index: usize, tol: &ToleranceContext) -> Result<CurveSegment, FalloffReason> {
        let segment = match *self {
            Self::Line { start, end } => CurveSegment::line(lift(&start), lift(&end)),
            Self::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                reverse,
            } => {
                if !(radius >= tol.vertex_epsilon()) {
                    return Err(FalloffReason::DegenerateArc { index, radius });
                }
                let arc = CurveSegment::arc(Frame::xy(lift(&center)), radius, start_angle, end_angle);
                if reverse {
                    arc.reversed()
                } else {
                    arc
                }
            }
        };
        let length = segment.length();
        if !(length >= tol.short_curve_tolerance()) {
            return Err(FalloffReason::ShortSegment { index, length });
        }
        Ok(segment)
    }
}

/// Rounded corner replacing a polygon vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fillet {
    pub tangent_in: Point2<f64>,
    pub tangent_out: Point2<f64>,
    /// Distance from the vertex to either tangent point
    pub setback: f64,
    pub descriptor: SegmentDescriptor,
}

/// Fillet of `radius` at `vertex` between the edges from `prev` and to `next`
pub fn corner_fillet(
    prev: &Point2<f64>,
    vertex: &Point2<f64>,
    next: &Point2<f64>,
    radius: f64,
) -> Result<Fillet, FalloffReason> {
    let d1 = (prev - vertex)
        .try_normalize(1e-12)
        .ok_or(FalloffReason::DegenerateCorner)?;
    let d2 = (next - vertex)
        .try_normalize(1e-12)
        .ok_or(FalloffReason::DegenerateCorner)?;
    let phi = d1.dot(&d2).clamp(-1.0, 1.0).acos();
    if phi < 1e-6 || PI - phi < 1e-6 {
        return Err(FalloffReason::DegenerateCorner);
    }

    let half = phi / 2.0;
    let setback = radius / half.tan();
    let bisector = (d1 + d2).normalize();
    let center = vertex + bisector * (radius / half.sin());
    let tangent_in = vertex + d1 * setback;
    let tangent_out = vertex + d2 * setback;

    let angle = |p: &Point2<f64>| {
        let v: Vector2<f64> = p - center;
        v.y.atan2(v.x)
    };
    let a_in = angle(&tangent_in);
    let a_out = angle(&tangent_out);

    let turn = cross(&(vertex - prev), &(next - vertex));
    let descriptor = if turn > 0.0 {
        SegmentDescriptor::Arc {
            center,
            radius,
            start_angle: a_in,
            end_angle: a_out,
            reverse: false,
        }
    } else {
        SegmentDescriptor::Arc {
            center,
            radius,
            start_angle: a_out,
            end_angle: a_in,
            reverse: true,
        }
    };

    Ok(Fillet {
        tangent_in,
        tangent_out,
        setback,
        descriptor,
    })
}

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Accumulates committed segments and a pending descriptor batch
#[derive(Debug, Clone)]
pub struct LoopBuilder<'a> {
    tolerance: &'a ToleranceContext,
    pending: Vec<SegmentDescriptor>,
    segments: Vec<CurveSegment>,
}

impl<'a> LoopBuilder<'a> {
    pub fn new(tolerance: &'a ToleranceContext) -> Self {
        Self {
            tolerance,
            pending: Vec::with_capacity(16),
            segments: Vec::with_capacity(16),
        }
    }

    /// Queue a straight line
    pub fn line(&mut self, start: Point2<f64>, end: Point2<f64>) -> &mut Self {
        self.pending.push(SegmentDescriptor::Line { start, end });
        self
    }

    /// Queue a line unless it is shorter than the vertex tolerance
    pub fn line_if_needed(&mut self, start: Point2<f64>, end: Point2<f64>) -> &mut Self {
        if (end - start).norm() >= self.tolerance.vertex_epsilon() {
            self.line(start, end);
        }
        self
    }

    pub fn arc(
        &mut self,
        center: Point2<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        reverse: bool,
    ) -> &mut Self {
        self.pending.push(SegmentDescriptor::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            reverse,
        });
        self
    }

    pub fn descriptor(&mut self, descriptor: SegmentDescriptor) -> &mut Self {
        self.pending.push(descriptor);
        self
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// End point of the committed segments
    pub fn cursor(&self) -> Option<Point2<f64>> {
        self.segments
            .last()
            .map(|s| {
                let p = s.end_point();
                Point2::new(p.x, p.y)
            })
    }

    /// Drop the pending batch
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// Materialize the pending batch and commit it.
    ///
    /// On failure nothing is committed and the pending list is cleared.
    pub fn append_segments(&mut self) -> Result<(), FalloffReason> {
        let batch = std::mem::take(&mut self.pending);
        let mut materialized = Vec::with_capacity(batch.len());
        let mut cursor = self.segments.last().map(CurveSegment::end_point);

        for (offset, descriptor) in batch.iter().enumerate() {
            let index = self.segments.len() + offset;
            let segment = descriptor.materialize(index, self.tolerance)?;
            if let Some(prev) = cursor {
                let gap = (segment.start_point() - prev).norm();
                if gap > self.tolerance.vertex_epsilon() {
                    return Err(FalloffReason::Disconnected { index, gap });
                }
            }
            cursor = Some(segment.end_point());
            materialized.push(segment);
        }

        self.segments.extend(materialized);
        Ok(())
    }

    /// Commit a closed polygon with an optional fillet radius per vertex
    /// (zero or negative means a sharp corner)
    pub fn polygon(&mut self, vertices: &[Point2<f64>], radii: &[f64]) -> Result<(), FalloffReason> {
        let n = vertices.len();
        if n < 3 {
            return Err(FalloffReason::Empty);
        }

        let mut fillets: Vec<Option<Fillet>> = Vec::with_capacity(n);
        for i in 0..n {
            let radius = radii.get(i).copied().unwrap_or(0.0);
            if radius > 0.0 {
                let prev = &vertices[(i + n - 1) % n];
                let next = &vertices[(i + 1) % n];
                fillets.push(Some(corner_fillet(prev, &vertices[i], next, radius)?));
            } else {
                fillets.push(None);
            }
        }

        for i in 0..n {
            let j = (i + 1) % n;
            let limit = (vertices[j] - vertices[i]).norm();
            let used = fillets[i].map_or(0.0, |f| f.setback) + fillets[j].map_or(0.0, |f| f.setback);
            if used > limit + self.tolerance.vertex_epsilon() {
                let radius = radii.get(i).copied().unwrap_or(0.0).max(radii.get(j).copied().unwrap_or(0.0));
                self.discard();
                return Err(FalloffReason::FilletTooLarge { radius, limit });
            }
        }

        let entry = |i: usize| fillets[i].map_or(vertices[i], |f| f.tangent_in);
        let exit = |i: usize| fillets[i].map_or(vertices[i], |f| f.tangent_out);

        for i in 0..n {
            if let Some(f) = fillets[i] {
                self.descriptor(f.descriptor);
            }
            self.line_if_needed(exit(i), entry((i + 1) % n));
        }
        self.append_segments()
    }

    /// Close out the loop; fails if it is empty or does not close
    pub fn finish(self) -> Result<CurveLoop, FalloffReason> {
        if self.segments.is_empty() {
            return Err(FalloffReason::Empty);
        }
        let lp = CurveLoop::from_connected(self.segments);
        if !lp.is_closed(self.tolerance) {
            return Err(FalloffReason::OpenLoop {
                gap: lp.closure_gap(),
            });
        }
        Ok(lp)
    }
}
