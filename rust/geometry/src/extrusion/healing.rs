// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closing loops that arrive slightly open

use super::ExtrusionSolidSynthesizer;
use crate::curve::CurveSegment;
use crate::curve_loop::CurveLoop;
use crate::diagnostics::{Diagnostics, EntityId};
use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::solid::SolidBuilder;
use crate::tolerance::ToleranceContext;

/// Samples taken along a straight last segment while looking for a cut point
const LINE_SAMPLES: usize = 16;

/// Arc density used to sample a curved last segment
const CONIC_SEGMENTS_PER_TURN: usize = 64;

/// Close a loop whose end misses its start by less than the short-curve
/// tolerance.
///
/// Such a gap is too small for a connecting line of its own, so the last
/// segment is cut back at the last sample point far enough from the start
/// and a line closes the loop from there. Already closed loops are returned
/// unchanged.
pub fn heal_open_loop(lp: &CurveLoop, tol: &ToleranceContext) -> Result<CurveLoop> {
    if lp.is_closed(tol) {
        return Ok(lp.clone());
    }
    let (Some(start), Some(last)) = (lp.start_point(), lp.segments().last()) else {
        return Err(Error::curve("loop has no segments"));
    };

    let gap = lp.closure_gap();
    let short = tol.short_curve_tolerance();
    if gap >= short {
        return Err(Error::curve(format!(
            "loop is open by {}, at least the short-curve tolerance of {}",
            tol.format_length(gap),
            tol.format_length(short)
        )));
    }

    let (t0, t1) = last.param_range();
    let samples = match last {
        CurveSegment::Line { .. } => LINE_SAMPLES,
        _ => last.tessellate(CONIC_SEGMENTS_PER_TURN).len().saturating_sub(1).max(2),
    };
    let cut = (1..samples)
        .rev()
        .map(|i| t0 + (t1 - t0) * i as f64 / samples as f64)
        .find(|t| (last.point_at(*t) - start).norm() >= short)
        .ok_or_else(|| {
            Error::curve("last segment is too short to be trimmed back for a closing line")
        })?;

    let trimmed = last.rebound(t0, cut)?;
    trimmed.validate(tol)?;
    let closer = CurveSegment::line(trimmed.end_point(), start);
    closer.validate(tol)?;

    let mut segments = lp.segments()[..lp.len() - 1].to_vec();
    segments.push(trimmed);
    segments.push(closer);
    CurveLoop::from_segments(segments, tol)
}

impl<'a, B: SolidBuilder> ExtrusionSolidSynthesizer<'a, B> {
    /// Heal every loop; loops that cannot be closed are dropped with a
    /// non-fatal error, and a profile whose outer loop is dropped goes with it
    pub(super) fn heal_profiles(
        &self,
        profiles: &[Profile],
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Vec<Profile> {
        let mut healed = Vec::with_capacity(profiles.len());
        for (i, profile) in profiles.iter().enumerate() {
            let Some(outer) = self.heal_loop(&profile.outer, &format!("profile {i} outer loop"), diagnostics, entity)
            else {
                continue;
            };
            let mut inner = Vec::with_capacity(profile.inner.len());
            for (j, hole) in profile.inner.iter().enumerate() {
                if let Some(lp) = self.heal_loop(hole, &format!("profile {i} inner loop {j}"), diagnostics, entity) {
                    inner.push(lp);
                }
            }
            healed.push(Profile::with_holes(outer, inner));
        }
        healed
    }

    fn heal_loop(
        &self,
        lp: &CurveLoop,
        label: &str,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Option<CurveLoop> {
        if lp.is_closed(self.tolerance) {
            return Some(lp.clone());
        }
        match heal_open_loop(lp, self.tolerance) {
            Ok(closed) => {
                diagnostics.log_warning(
                    entity,
                    &format!(
                        "Closed a gap of {} in the {label}",
                        self.tolerance.format_length(lp.closure_gap())
                    ),
                );
                Some(closed)
            }
            Err(e) => {
                diagnostics.log_error(entity, &format!("Dropped the open {label}: {e}"), false);
                None
            }
        }
    }
}
