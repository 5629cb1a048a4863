// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composite curve assembly
//!
//! Stitches independently authored segments into one oriented chain. Each
//! incoming segment is attached to whichever chain end it is closest to,
//! reversed when needed, and small gaps are healed by stretching a line or
//! inserting a short connector. The chain is not closed here; healing an
//! open result is left to the extrusion step.

use crate::curve::CurveSegment;
use crate::curve_loop::CurveLoop;
use crate::diagnostics::{Diagnostics, EntityId};
use crate::error::{Error, Result};
use crate::tolerance::ToleranceContext;
use nalgebra::Point3;
use std::collections::VecDeque;
use std::f64::consts::TAU;

/// Which end of the chain an incoming segment joins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    End,
    Start,
}

/// Closest pairing between the chain ends and an incoming segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub gap: f64,
    pub attach: Attachment,
    pub reverse: bool,
}

/// How a step joined its segment to the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    None,
    StretchedIncoming,
    StretchedChain,
    Connector,
}

/// Pick the closest of the four endpoint pairings.
///
/// Candidates are checked in the order end/start, end/end, start/end,
/// start/start and a later candidate only wins when strictly closer, so exact
/// ties resolve to the earliest pairing.
pub fn classify(
    chain_start: &Point3<f64>,
    chain_end: &Point3<f64>,
    segment: &CurveSegment,
) -> Classification {
    let s = segment.start_point();
    let e = segment.end_point();
    let candidates = [
        ((chain_end - s).norm(), Attachment::End, false),
        ((chain_end - e).norm(), Attachment::End, true),
        ((chain_start - e).norm(), Attachment::Start, false),
        ((chain_start - s).norm(), Attachment::Start, true),
    ];

    let mut best = Classification {
        gap: candidates[0].0,
        attach: candidates[0].1,
        reverse: candidates[0].2,
    };
    for &(gap, attach, reverse) in &candidates[1..] {
        if gap < best.gap {
            best = Classification {
                gap,
                attach,
                reverse,
            };
        }
    }
    best
}

/// Running state of the assembly fold
#[derive(Debug, Clone)]
pub struct ChainState {
    chain: VecDeque<CurveSegment>,
    start: Point3<f64>,
    end: Point3<f64>,
    /// Head of the chain is a line and may be re-bound
    can_repair_first: bool,
}

impl ChainState {
    pub fn new(first: CurveSegment) -> Self {
        let mut chain = VecDeque::with_capacity(8);
        chain.push_back(first);
        Self {
            chain,
            start: first.start_point(),
            end: first.end_point(),
            can_repair_first: first.is_line(),
        }
    }

    #[inline]
    pub fn start(&self) -> Point3<f64> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point3<f64> {
        self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    #[inline]
    pub fn can_repair_first(&self) -> bool {
        self.can_repair_first
    }

    /// Attach the segment at input position `index` to the chain
    pub fn step(
        &mut self,
        index: usize,
        segment: CurveSegment,
        tol: &ToleranceContext,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Repair> {
        let class = classify(&self.start, &self.end, &segment);

        if class.gap > tol.gap_epsilon() {
            return Err(Error::UnrepairableGap {
                previous: index.saturating_sub(1),
                index,
                gap: tol.to_display(class.gap),
                threshold: tol.to_display(tol.gap_epsilon()),
                unit: tol.unit_label().to_string(),
            });
        }

        let segment = if class.reverse {
            segment.reversed()
        } else {
            segment
        };

        if class.gap < tol.vertex_epsilon() {
            self.splice(segment, class.attach);
            return Ok(Repair::None);
        }

        let repair = match class.attach {
            Attachment::End => self.repair_at_end(segment, class.gap, tol)?,
            Attachment::Start => self.repair_at_start(segment, class.gap, tol)?,
        }
        .ok_or_else(|| Error::UnrepairableCurvedGap {
            previous: index.saturating_sub(1),
            index,
            gap: tol.to_display(class.gap),
            unit: tol.unit_label().to_string(),
        })?;

        let action = match repair {
            Repair::StretchedIncoming => "stretched the incoming line",
            Repair::StretchedChain => "stretched the adjacent line",
            Repair::Connector => "inserted a connecting line",
            Repair::None => "joined",
        };
        diagnostics.log_warning(
            entity,
            &format!(
                "Repaired gap of {} between composite segments {} and {}: {}",
                tol.format_length(class.gap),
                index.saturating_sub(1),
                index,
                action
            ),
        );
        Ok(repair)
    }

    /// The incoming segment starts near the chain end
    fn repair_at_end(
        &mut self,
        segment: CurveSegment,
        gap: f64,
        tol: &ToleranceContext,
    ) -> Result<Option<Repair>> {
        if segment.is_line() {
            let stretched = CurveSegment::line(self.end, segment.end_point());
            if stretched.length() >= tol.vertex_epsilon() {
                self.splice(stretched, Attachment::End);
                return Ok(Some(Repair::StretchedIncoming));
            }
        }

        if let Some(last @ CurveSegment::Line { .. }) = self.chain.back().copied() {
            let stretched = CurveSegment::line(last.start_point(), segment.start_point());
            if stretched.length() >= tol.vertex_epsilon() {
                if let Some(slot) = self.chain.back_mut() {
                    *slot = stretched;
                }
                if self.chain.len() == 1 {
                    self.start = stretched.start_point();
                }
                self.splice(segment, Attachment::End);
                return Ok(Some(Repair::StretchedChain));
            }
        }

        if gap > tol.short_curve_tolerance() {
            self.splice(CurveSegment::line(self.end, segment.start_point()), Attachment::End);
            self.splice(segment, Attachment::End);
            return Ok(Some(Repair::Connector));
        }

        Ok(None)
    }

    /// The incoming segment ends near the chain start
    fn repair_at_start(
        &mut self,
        segment: CurveSegment,
        gap: f64,
        tol: &ToleranceContext,
    ) -> Result<Option<Repair>> {
        if segment.is_line() {
            let stretched = CurveSegment::line(segment.start_point(), self.start);
            if stretched.length() >= tol.vertex_epsilon() {
                self.splice(stretched, Attachment::Start);
                return Ok(Some(Repair::StretchedIncoming));
            }
        }

        if self.can_repair_first {
            if let Some(first) = self.chain.front().copied() {
                let stretched = CurveSegment::line(segment.end_point(), first.end_point());
                if stretched.length() >= tol.vertex_epsilon() {
                    if let Some(slot) = self.chain.front_mut() {
                        *slot = stretched;
                    }
                    if self.chain.len() == 1 {
                        self.end = stretched.end_point();
                    }
                    self.splice(segment, Attachment::Start);
                    return Ok(Some(Repair::StretchedChain));
                }
            }
        }

        if gap > tol.short_curve_tolerance() {
            self.splice(CurveSegment::line(segment.end_point(), self.start), Attachment::Start);
            self.splice(segment, Attachment::Start);
            return Ok(Some(Repair::Connector));
        }

        Ok(None)
    }

    fn splice(&mut self, segment: CurveSegment, attach: Attachment) {
        match attach {
            Attachment::End => {
                self.end = segment.end_point();
                self.chain.push_back(segment);
            }
            Attachment::Start => {
                self.start = segment.start_point();
                self.can_repair_first = segment.is_line();
                self.chain.push_front(segment);
            }
        }
    }

    /// Chain in its final order
    pub fn finish(self) -> CurveLoop {
        CurveLoop::from_connected(self.chain.into_iter().collect())
    }
}

/// Assembles composite curves under one tolerance context
pub struct CompositeCurveAssembler<'a> {
    tolerance: &'a ToleranceContext,
}

impl<'a> CompositeCurveAssembler<'a> {
    pub fn new(tolerance: &'a ToleranceContext) -> Self {
        Self { tolerance }
    }

    /// Assemble `segments` into a single oriented chain.
    ///
    /// Fails with [`Error::UnrepairableGap`] as soon as two logically adjacent
    /// segments are further apart than the gap tolerance. Repairs are logged
    /// as warnings here, but a returned error is not: the caller owns the
    /// fatal report (see [`crate::report_fatal`]).
    pub fn assemble(
        &self,
        segments: &[CurveSegment],
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<CurveLoop> {
        let (first, rest) = segments
            .split_first()
            .ok_or_else(|| Error::curve("composite curve has no segments"))?;

        let state = rest.iter().enumerate().try_fold(
            ChainState::new(*first),
            |mut state, (offset, segment)| {
                state.step(offset + 1, *segment, self.tolerance, diagnostics, entity)?;
                Ok::<_, Error>(state)
            },
        )?;

        Ok(state.finish())
    }

    /// Collapse a loop of uniform segments into one curve.
    ///
    /// Collinear, same-direction lines become one line; arcs (or ellipses,
    /// allowing swapped axes) on one carrier become one arc, a full turn when
    /// the loop is closed. Returns `None` on any mismatch.
    pub fn collapse_if_uniform(&self, curve_loop: &CurveLoop) -> Option<CurveSegment> {
        let segments = curve_loop.segments();
        let first = *segments.first()?;
        if segments.len() == 1 {
            return Some(first);
        }
        let tol = self.tolerance;

        match first {
            CurveSegment::Line { start, end } => {
                let dir = (end - start).try_normalize(1e-15)?;
                for seg in &segments[1..] {
                    let CurveSegment::Line { start: s, end: e } = seg else {
                        return None;
                    };
                    let d = (e - s).try_normalize(1e-15)?;
                    if dir.dot(&d) < 1.0 - crate::tolerance::ANGULAR_EPSILON {
                        return None;
                    }
                }
                let last = segments.last()?.end_point();
                Some(CurveSegment::line(start, last))
            }
            CurveSegment::Arc {
                frame,
                radius,
                start,
                ..
            } => {
                for seg in &segments[1..] {
                    let CurveSegment::Arc {
                        frame: f,
                        radius: r,
                        ..
                    } = seg
                    else {
                        return None;
                    };
                    if (f.origin - frame.origin).norm() > tol.vertex_epsilon()
                        || (r - radius).abs() > tol.vertex_epsilon()
                        || f.normal().dot(&frame.normal()) < 1.0 - crate::tolerance::ANGULAR_EPSILON
                    {
                        return None;
                    }
                }
                let end = collapsed_end(&first, segments, start)?;
                Some(CurveSegment::Arc {
                    frame,
                    radius,
                    start,
                    end,
                })
            }
            CurveSegment::Ellipse {
                frame,
                radius_x,
                radius_y,
                start,
                ..
            } => {
                for seg in &segments[1..] {
                    let CurveSegment::Ellipse {
                        frame: f,
                        radius_x: rx,
                        radius_y: ry,
                        ..
                    } = seg
                    else {
                        return None;
                    };
                    if (f.origin - frame.origin).norm() > tol.vertex_epsilon()
                        || f.normal().dot(&frame.normal()) < 1.0 - crate::tolerance::ANGULAR_EPSILON
                    {
                        return None;
                    }
                    let eps = tol.vertex_epsilon();
                    let aligned = (rx - radius_x).abs() <= eps
                        && (ry - radius_y).abs() <= eps
                        && f.x_axis.dot(&frame.x_axis).abs() >= 1.0 - crate::tolerance::ANGULAR_EPSILON;
                    let permuted = (rx - radius_y).abs() <= eps
                        && (ry - radius_x).abs() <= eps
                        && f.x_axis.dot(&frame.y_axis).abs() >= 1.0 - crate::tolerance::ANGULAR_EPSILON;
                    if !aligned && !permuted {
                        return None;
                    }
                }
                let end = collapsed_end(&first, segments, start)?;
                Some(CurveSegment::Ellipse {
                    frame,
                    radius_x,
                    radius_y,
                    start,
                    end,
                })
            }
        }
    }
}

/// End parameter of a collapsed conic: the last end point projected onto the
/// first segment's carrier, pushed one turn forward when it does not lie
/// after the start. Rejects results whose sweep disagrees with the segments.
fn collapsed_end(first: &CurveSegment, segments: &[CurveSegment], start: f64) -> Option<f64> {
    let last_end = segments.last()?.end_point();
    let projected = first.project(&last_end);
    let mut end = start + (projected - start).rem_euclid(TAU);
    if end <= start + 1e-9 {
        end += TAU;
    }

    let total: f64 = segments.iter().map(CurveSegment::sweep).sum();
    if total > TAU + 1e-6 || (total - (end - start)).abs() > 1e-6 {
        return None;
    }
    Some(end)
}
