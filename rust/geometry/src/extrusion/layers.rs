// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material layer decomposition
//!
//! Along the extrusion every layer is the whole profile moved to its depth.
//! Across the profile (walls) the four-curve outline is cut into bands:
//! each layer gets two rails offset from the axis curve, and the two side
//! curves are re-trimmed where they meet the rails.

use super::{ExtrusionSolidSynthesizer, Slice};
use crate::curve::{CurveSegment, Frame};
use crate::curve_loop::CurveLoop;
use crate::diagnostics::{Diagnostics, EntityId};
use crate::error::{Error, Result};
use crate::intersect::{intersect, param_distance, Carrier};
use crate::material::{DirectionSense, Material, MaterialLayerUsage};
use crate::profile::Profile;
use crate::solid::SolidBuilder;
use nalgebra::{Point3, Vector3};

const ORIENTATION_SEGMENTS: usize = 32;

impl<'a, B: SolidBuilder> ExtrusionSolidSynthesizer<'a, B> {
    /// One slice per layer, stacked along the extrusion. `None` when the
    /// layers do not add up to the depth; that case is ambiguous and falls
    /// back to a single solid without a diagnostic.
    pub(super) fn split_along_depth(
        &self,
        profiles: &[Profile],
        direction: &Vector3<f64>,
        depth: f64,
        usage: &MaterialLayerUsage,
        base: Option<&Material>,
    ) -> Option<Vec<Slice>> {
        let total = usage.total_thickness();
        if (total - depth).abs() > self.tolerance.vertex_epsilon() {
            tracing::debug!(total, depth, "layer thicknesses do not match the extrusion depth");
            return None;
        }

        let mut slices = Vec::new();
        let mut so_far = 0.0;
        for layer in usage.non_empty_layers() {
            let offset = match usage.direction_sense {
                DirectionSense::Positive => so_far,
                DirectionSense::Negative => depth - so_far - layer.thickness,
            };
            let shift = direction * offset;
            slices.push(Slice {
                profiles: profiles.iter().map(|p| p.translated(&shift)).collect(),
                offset,
                depth: layer.thickness,
                material: layer.material.clone().or_else(|| base.cloned()),
            });
            so_far += layer.thickness;
        }
        Some(slices)
    }

    /// One slice per layer, stacked across the profile from the axis curve.
    ///
    /// Outlines that are not a single loop of four curves on the axis are
    /// extruded whole with a warning; thicknesses that do not add up to the
    /// profile width fall back silently. Failing to rebuild a layer is fatal.
    pub(super) fn split_across_width(
        &self,
        profiles: &[Profile],
        depth: f64,
        usage: &MaterialLayerUsage,
        axis: Option<&CurveSegment>,
        base: Option<&Material>,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Option<Vec<Slice>>> {
        let normal = Vector3::z();
        let mut give_up = |reason: &str| -> Result<Option<Vec<Slice>>> {
            diagnostics.log_warning(
                entity,
                &format!("Material layers across the profile ignored ({reason}); extruded as a single solid"),
            );
            Ok(None)
        };

        let Some(axis) = axis else {
            return give_up("no axis curve");
        };
        let outline = match profiles {
            [profile] if profile.inner.is_empty() && profile.outer.len() == 4 => &profile.outer,
            _ => return give_up("the profile is not a single loop of four curves"),
        };
        let Some(reference) = axis
            .carrier()
            .and_then(|c| c.offset(usage.offset, &normal))
        else {
            return give_up("the axis curve cannot be offset");
        };
        let Some(sides) = self.match_axis(outline, &reference) else {
            return give_up("no outline curve lies on the axis curve");
        };
        let [rail, end_side, opposite, start_side] = sides;

        let sign = usage.direction_sense.sign();
        let opposite_mid = midpoint(&opposite);
        let width = reference.signed_offset(&opposite_mid, &normal) * sign;
        if width <= 0.0 {
            return give_up("layers would grow away from the profile");
        }
        let total = usage.total_thickness();
        if (total - width).abs() > self.tolerance.vertex_epsilon() {
            tracing::debug!(total, width, "layer thicknesses do not match the profile width");
            return Ok(None);
        }

        let end_carrier = side_carrier(&end_side)?;
        let start_carrier = side_carrier(&start_side)?;
        let plane = Frame::xy(rail.start_point());

        let band = Band {
            rail: &rail,
            reference: &reference,
            end_carrier: &end_carrier,
            start_carrier: &start_carrier,
            plane: &plane,
            normal: &normal,
        };

        let mut slices = Vec::new();
        let mut so_far = 0.0;
        for (i, layer) in usage.non_empty_layers().enumerate() {
            let lp = band
                .layer_loop(sign * so_far, sign * (so_far + layer.thickness), &end_side, &start_side)
                .and_then(|segments| CurveLoop::from_segments(segments, self.tolerance))
                .map_err(|e| Error::LayerDecomposition(format!("layer {i}: {e}")))?;
            for segment in lp.segments() {
                segment
                    .validate(self.tolerance)
                    .map_err(|e| Error::LayerDecomposition(format!("layer {i}: {e}")))?;
            }
            slices.push(Slice {
                profiles: vec![Profile::new(lp.oriented(&normal, true, ORIENTATION_SEGMENTS))],
                offset: 0.0,
                depth,
                material: layer.material.clone().or_else(|| base.cloned()),
            });
            so_far += layer.thickness;
        }
        Ok(Some(slices))
    }

    /// Reorder the outline so it starts with the curve lying on `reference`,
    /// running the same way as the axis: `[rail, end side, opposite rail,
    /// start side]`
    fn match_axis(&self, outline: &CurveLoop, reference: &Carrier) -> Option<[CurveSegment; 4]> {
        let tol = self.tolerance.short_curve_tolerance();
        let on_reference = |s: &CurveSegment| {
            [s.start_point(), midpoint(s), s.end_point()]
                .iter()
                .all(|p| reference.distance_to(p) < tol)
        };
        let index = outline.segments().iter().position(on_reference)?;
        let matched = outline.segments()[index];

        let mid = midpoint(&matched);
        let (t0, t1) = matched.param_range();
        let along = matched.tangent_at((t0 + t1) / 2.0).dot(&carrier_tangent(reference, &mid));

        let (segments, start) = if along >= 0.0 {
            (outline.segments().to_vec(), index)
        } else {
            (outline.reversed().into_segments(), 3 - index)
        };
        Some(std::array::from_fn(|k| segments[(start + k) % 4]))
    }
}

/// Geometry shared by every layer of one wall outline
struct Band<'g> {
    rail: &'g CurveSegment,
    reference: &'g Carrier,
    end_carrier: &'g Carrier,
    start_carrier: &'g Carrier,
    plane: &'g Frame,
    normal: &'g Vector3<f64>,
}

impl Band<'_> {
    /// Closed four-curve loop between the rails at `low` and `high` offsets
    fn layer_loop(
        &self,
        low: f64,
        high: f64,
        end_side: &CurveSegment,
        start_side: &CurveSegment,
    ) -> Result<Vec<CurveSegment>> {
        let low_rail = self.offset_rail(low)?;
        let high_rail = self.offset_rail(high)?;

        let low_start = self.corner(&low_rail, self.start_carrier, &self.rail.start_point())?;
        let low_end = self.corner(&low_rail, self.end_carrier, &self.rail.end_point())?;
        let high_start = self.corner(&high_rail, self.start_carrier, &self.rail.start_point())?;
        let high_end = self.corner(&high_rail, self.end_carrier, &self.rail.end_point())?;

        Ok(vec![
            low_rail.segment_between(low_start, low_end, true),
            retrim(end_side, self.end_carrier, low_end, high_end),
            high_rail.segment_between(high_start, high_end, true).reversed(),
            retrim(start_side, self.start_carrier, high_start, low_start),
        ])
    }

    fn offset_rail(&self, distance: f64) -> Result<Carrier> {
        self.reference
            .offset(distance, self.normal)
            .ok_or_else(|| Error::LayerDecomposition(format!("offset {distance} collapses the axis curve")))
    }

    /// Where `side` crosses `rail`. With two crossings, the one whose rail
    /// parameter is nearer (cyclically) to that of `expected` wins.
    fn corner(&self, rail: &Carrier, side: &Carrier, expected: &Point3<f64>) -> Result<Point3<f64>> {
        let target = rail.param_of(expected);
        let period = rail.period();
        intersect(rail, side, self.plane)
            .into_iter()
            .map(|p| (param_distance(rail.param_of(&p), target, period), p))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
            .ok_or_else(|| Error::LayerDecomposition("a side curve does not reach the layer boundary".into()))
    }
}

fn side_carrier(side: &CurveSegment) -> Result<Carrier> {
    side.carrier()
        .ok_or_else(|| Error::LayerDecomposition("elliptical side curves cannot be re-trimmed".into()))
}

/// Piece of `side`'s carrier from `from` to `to`, travelling the way `side` does
fn retrim(side: &CurveSegment, carrier: &Carrier, from: Point3<f64>, to: Point3<f64>) -> CurveSegment {
    match side {
        CurveSegment::Line { .. } => CurveSegment::line(from, to),
        _ => carrier.segment_between(from, to, true),
    }
}

fn midpoint(segment: &CurveSegment) -> Point3<f64> {
    let (t0, t1) = segment.param_range();
    segment.point_at((t0 + t1) / 2.0)
}

/// Direction of travel of the carrier at `point`
fn carrier_tangent(carrier: &Carrier, point: &Point3<f64>) -> Vector3<f64> {
    match carrier {
        Carrier::Line { direction, .. } => *direction,
        Carrier::Circle { frame, .. } => frame.normal().cross(&(point - frame.origin)),
    }
}
