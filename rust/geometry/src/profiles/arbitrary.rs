// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arbitrary profiles: closed curves with voids, open curves and
//! centre-line curves thickened into an area

use super::ProfileBuilder;
use crate::arena::{CurveKey, GeometryArena};
use crate::composite::CompositeCurveAssembler;
use crate::curve::{CurveSegment, Frame};
use crate::curve_loop::CurveLoop;
use crate::diagnostics::{Diagnostics, EntityId};
use crate::error::{Error, Result};
use crate::intersect::{intersect, Carrier};
use crate::profile::{Profile, ProfileCurve};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;
use std::f64::consts::{PI, TAU};

/// Tessellation density used only to decide loop orientation
const ORIENTATION_SEGMENTS: usize = 32;

/// Miter joins further than this many offsets from the corner become bevels
const MITER_LIMIT: f64 = 4.0;

impl<'a> ProfileBuilder<'a> {
    pub(crate) fn build_arbitrary_closed(
        &self,
        outer_key: CurveKey,
        voids: &[Option<CurveKey>],
        arena: &GeometryArena,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let outer = self.resolve_closed(arena.curve(outer_key)?, diagnostics, entity)?;
        let outer = orient(outer, true);

        let mut seen: FxHashSet<CurveKey> = FxHashSet::default();
        let mut inner = Vec::with_capacity(voids.len());

        for (i, void) in voids.iter().enumerate() {
            let Some(key) = *void else {
                diagnostics.log_warning(entity, &format!("Void {i} is unset; skipped"));
                continue;
            };
            if key == outer_key {
                return Err(Error::profile(format!(
                    "void {i} is the same curve as the outer boundary"
                )));
            }
            if !seen.insert(key) {
                return Err(Error::profile(format!("void {i} repeats an earlier void")));
            }

            let lp = self
                .resolve_closed(arena.curve(key)?, diagnostics, entity)
                .map_err(|e| match e {
                    Error::InvalidProfile(message) => Error::profile(format!("void {i}: {message}")),
                    other => other,
                })?;
            if self.encloses_area(&lp) {
                inner.push(orient(lp, false));
            } else {
                diagnostics.log_warning(entity, &format!("Void {i} encloses no area; skipped"));
            }
        }

        Ok(Profile::with_holes(outer, inner))
    }

    pub(crate) fn build_arbitrary_open(
        &self,
        key: CurveKey,
        arena: &GeometryArena,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let curve = self.resolve_open(arena.curve(key)?, diagnostics, entity)?;
        Ok(Profile::open(curve))
    }

    /// Thicken a curve by `thickness`, half on each side, in the profile plane
    pub(crate) fn build_center_line(
        &self,
        key: CurveKey,
        thickness: f64,
        arena: &GeometryArena,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        if !(thickness.is_finite() && thickness > 0.0) {
            return Err(Error::profile(format!(
                "centre-line profile thickness must be positive, got {thickness}"
            )));
        }
        let center = self.resolve_open(arena.curve(key)?, diagnostics, entity)?;
        let closed = center.is_closed(self.tolerance);
        let normal = Vector3::z();
        let half = thickness / 2.0;

        let right = self.offset_chain(center.segments(), -half, &normal, closed)?;
        let left = self.offset_chain(center.segments(), half, &normal, closed)?;

        if closed {
            let right = CurveLoop::from_connected(right);
            let left = CurveLoop::from_connected(left);
            let (outer, hole) = if area(&right) >= area(&left) {
                (right, left)
            } else {
                (left, right)
            };
            return Ok(Profile::with_holes(orient(outer, true), vec![orient(hole, false)]));
        }

        let (Some(right_first), Some(right_last), Some(left_first), Some(left_last)) =
            (right.first(), right.last(), left.first(), left.last())
        else {
            return Err(Error::profile("centre-line curve has no segments"));
        };
        let end_cap = CurveSegment::line(right_last.end_point(), left_last.end_point());
        let start_cap = CurveSegment::line(left_first.start_point(), right_first.start_point());

        let mut segments = Vec::with_capacity(right.len() + left.len() + 2);
        segments.extend(right.iter().copied());
        segments.push(end_cap);
        segments.extend(left.iter().rev().map(CurveSegment::reversed));
        segments.push(start_cap);

        let lp = CurveLoop::from_segments(segments, self.tolerance)?;
        Ok(Profile::new(orient(lp, true)))
    }

    /// Resolve a curve that must bound an area.
    ///
    /// Loops open by less than the short-curve tolerance are kept; healing
    /// closes them at extrusion time.
    pub(crate) fn resolve_closed(
        &self,
        curve: &ProfileCurve,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<CurveLoop> {
        let lp = self.resolve_loop(curve, diagnostics, entity)?;
        let gap = lp.closure_gap();
        if gap >= self.tolerance.short_curve_tolerance() {
            return Err(Error::profile(format!(
                "a closed profile needs a closed curve, the {} is open by {}",
                curve.kind_name(),
                self.tolerance.format_length(gap)
            )));
        }
        Ok(lp)
    }

    fn resolve_loop(
        &self,
        curve: &ProfileCurve,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<CurveLoop> {
        match curve {
            ProfileCurve::Composite(segments) => {
                CompositeCurveAssembler::new(self.tolerance).assemble(segments, diagnostics, entity)
            }
            ProfileCurve::Polyline(points) => self.polyline_loop(points),
            ProfileCurve::Circle { frame, radius } => {
                self.split_full(CurveSegment::arc(*frame, *radius, 0.0, TAU))
            }
            ProfileCurve::Ellipse {
                frame,
                radius_x,
                radius_y,
            } => self.split_full(CurveSegment::ellipse(*frame, *radius_x, *radius_y, 0.0, TAU)),
            ProfileCurve::Segment(segment) if !segment.is_line() && segment.sweep() >= TAU - 1e-9 => {
                self.split_full(*segment)
            }
            other => Err(Error::profile(format!(
                "a closed profile needs a closed curve, got an open {}",
                other.kind_name()
            ))),
        }
    }

    /// Resolve a curve used as an open boundary or centre line
    pub(crate) fn resolve_open(
        &self,
        curve: &ProfileCurve,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<CurveLoop> {
        match curve {
            ProfileCurve::Segment(segment) if segment.is_line() || segment.sweep() < TAU - 1e-9 => {
                segment.validate(self.tolerance)?;
                Ok(CurveLoop::single(*segment))
            }
            ProfileCurve::Line { .. } => Err(Error::profile("an unbounded line cannot be used as a profile curve")),
            other => self.resolve_loop(other, diagnostics, entity),
        }
    }

    /// Full conic split at its half period
    fn split_full(&self, full: CurveSegment) -> Result<CurveLoop> {
        full.validate(self.tolerance)?;
        let (start, _) = full.param_range();
        let halves = vec![
            full.rebound(start, start + PI)?,
            full.rebound(start + PI, start + TAU)?,
        ];
        CurveLoop::from_segments(halves, self.tolerance)
    }

    fn polyline_loop(&self, points: &[Point3<f64>]) -> Result<CurveLoop> {
        let mut segments = Vec::with_capacity(points.len());
        let mut last: Option<Point3<f64>> = None;
        for p in points {
            match last {
                Some(prev) if self.tolerance.is_coincident((p - prev).norm()) => {}
                Some(prev) => {
                    segments.push(CurveSegment::line(prev, *p));
                    last = Some(*p);
                }
                None => last = Some(*p),
            }
        }
        if segments.is_empty() {
            return Err(Error::profile("polyline has fewer than two distinct points"));
        }
        for s in &segments {
            s.validate(self.tolerance)?;
        }
        CurveLoop::from_segments(segments, self.tolerance)
    }

    fn encloses_area(&self, lp: &CurveLoop) -> bool {
        let eps = self.tolerance.vertex_epsilon();
        area(lp) > eps * eps
    }

    /// Offset every segment by `distance` and rebuild the joints by
    /// intersecting neighbouring carriers; joints without a usable
    /// intersection get a straight connector
    fn offset_chain(
        &self,
        segments: &[CurveSegment],
        distance: f64,
        normal: &Vector3<f64>,
        closed: bool,
    ) -> Result<Vec<CurveSegment>> {
        let offsets = segments
            .iter()
            .map(|s| s.offset(distance, normal))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::profile(format!("cannot thicken centre line: {e}")))?;
        let n = offsets.len();
        let mut starts: Vec<Point3<f64>> = offsets.iter().map(CurveSegment::start_point).collect();
        let mut ends: Vec<Point3<f64>> = offsets.iter().map(CurveSegment::end_point).collect();
        let mut connectors: Vec<Option<CurveSegment>> = vec![None; n];

        let joints = if closed { n } else { n.saturating_sub(1) };
        for i in 0..joints {
            let j = (i + 1) % n;
            if (ends[i] - starts[j]).norm() < self.tolerance.vertex_epsilon() {
                continue;
            }
            let corner = segments[i].end_point();
            let plane = Frame::from_normal(corner, *normal)?;
            let reach = MITER_LIMIT * distance.abs() + self.tolerance.vertex_epsilon();
            let hit = match (offsets[i].carrier(), offsets[j].carrier()) {
                (Some(a), Some(b)) => intersect(&a, &b, &plane)
                    .into_iter()
                    .map(|p| ((p - corner).norm(), p))
                    .filter(|(d, _)| *d <= reach)
                    .min_by(|x, y| x.0.total_cmp(&y.0))
                    .map(|(_, p)| p),
                _ => None,
            };
            match hit {
                Some(p) => {
                    ends[i] = p;
                    starts[j] = p;
                }
                None => connectors[i] = Some(CurveSegment::line(ends[i], starts[j])),
            }
        }

        let mut out = Vec::with_capacity(n * 2);
        for (i, offset) in offsets.iter().enumerate() {
            let rebuilt = match *offset {
                CurveSegment::Line { start, end } => {
                    if (ends[i] - starts[i]).dot(&(end - start)) <= 0.0 {
                        return Err(Error::profile(
                            "centre-line thickness is too large for a segment of the curve",
                        ));
                    }
                    CurveSegment::line(starts[i], ends[i])
                }
                CurveSegment::Arc { frame, radius, .. } => {
                    Carrier::Circle { frame, radius }.segment_between(starts[i], ends[i], true)
                }
                CurveSegment::Ellipse { .. } => {
                    return Err(Error::profile("cannot thicken an elliptical centre line"))
                }
            };
            rebuilt.validate(self.tolerance)?;
            out.push(rebuilt);
            if let Some(connector) = connectors[i] {
                out.push(connector);
            }
        }
        Ok(out)
    }
}

fn area(lp: &CurveLoop) -> f64 {
    lp.signed_area(&Vector3::z(), ORIENTATION_SEGMENTS).abs()
}

fn orient(lp: CurveLoop, ccw: bool) -> CurveLoop {
    lp.oriented(&Vector3::z(), ccw, ORIENTATION_SEGMENTS)
}
