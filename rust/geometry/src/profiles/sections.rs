// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural sections: C, I, L, T, U and Z shapes
//!
//! All sections are centred on their bounding box and wound counter-clockwise.

use super::loop_builder::{corner_fillet, FalloffReason, Fillet, LoopBuilder};
use super::parametric::{
    optional, required, slope, CShapeParams, IShapeParams, LShapeParams, TShapeParams,
    UShapeParams, ZShapeParams,
};
use super::ProfileBuilder;
use crate::diagnostics::{Diagnostics, EntityId};
use crate::error::{Error, Result};
use crate::intersect::line_line_2d;
use crate::profile::Profile;
use nalgebra::{Point2, Vector2};

impl<'a> ProfileBuilder<'a> {
    pub(crate) fn i_shape(
        &self,
        params: &IShapeParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let shape = "I-shape";
        let b = required(params.overall_width, shape, "OverallWidth")?;
        let h = required(params.overall_depth, shape, "OverallDepth")?;
        let tw = required(params.web_thickness, shape, "WebThickness")?;
        let tf = required(params.flange_thickness, shape, "FlangeThickness")?;
        if tw >= b || 2.0 * tf >= h {
            return Err(Error::profile(format!(
                "{shape}: web {tw} / flanges {tf} do not fit in {b} x {h}"
            )));
        }

        let (hw, hd, htw) = (b / 2.0, h / 2.0, tw / 2.0);
        let vertices = [
            // Bottom flange
            Point2::new(-hw, -hd),
            Point2::new(hw, -hd),
            Point2::new(hw, -hd + tf),
            // Right side of web
            Point2::new(htw, -hd + tf),
            Point2::new(htw, hd - tf),
            // Top flange
            Point2::new(hw, hd - tf),
            Point2::new(hw, hd),
            Point2::new(-hw, hd),
            Point2::new(-hw, hd - tf),
            // Left side of web
            Point2::new(-htw, hd - tf),
            Point2::new(-htw, -hd + tf),
            Point2::new(-hw, -hd + tf),
        ];
        let r = optional(params.fillet_radius);
        let radii = [0.0, 0.0, 0.0, r, r, 0.0, 0.0, 0.0, 0.0, r, r, 0.0];

        let outer = self.polygon_with_fallback(&vertices, &radii, shape, "web fillets", diagnostics, entity)?;
        Ok(Profile::new(outer))
    }

    pub(crate) fn c_shape(
        &self,
        params: &CShapeParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let shape = "C-shape";
        let h = required(params.depth, shape, "Depth")?;
        let b = required(params.width, shape, "Width")?;
        let t = required(params.wall_thickness, shape, "WallThickness")?;
        let girth = optional(params.girth);
        let r = optional(params.internal_fillet_radius);

        let lipped = girth > t;
        if 2.0 * t >= h || t >= b || (lipped && 2.0 * t >= b) {
            return Err(Error::profile(format!(
                "{shape}: wall thickness {t} does not fit in {b} x {h}"
            )));
        }
        if 2.0 * girth >= h {
            return Err(Error::profile(format!(
                "{shape}: girth {girth} leaves the lips overlapping in depth {h}"
            )));
        }

        let (hb, hh) = (b / 2.0, h / 2.0);
        let ro = if r > 0.0 { r + t } else { 0.0 };

        let (vertices, radii): (Vec<Point2<f64>>, Vec<f64>) = if lipped {
            (
                vec![
                    Point2::new(-hb, -hh),
                    Point2::new(hb, -hh),
                    Point2::new(hb, -hh + girth),
                    Point2::new(hb - t, -hh + girth),
                    Point2::new(hb - t, -hh + t),
                    Point2::new(-hb + t, -hh + t),
                    Point2::new(-hb + t, hh - t),
                    Point2::new(hb - t, hh - t),
                    Point2::new(hb - t, hh - girth),
                    Point2::new(hb, hh - girth),
                    Point2::new(hb, hh),
                    Point2::new(-hb, hh),
                ],
                vec![ro, ro, 0.0, 0.0, r, r, r, r, 0.0, 0.0, ro, ro],
            )
        } else {
            if girth > 0.0 {
                diagnostics.log_warning(
                    entity,
                    &format!("{shape}: girth {girth} is not longer than the wall thickness {t}; lips omitted"),
                );
            }
            (
                vec![
                    Point2::new(-hb, -hh),
                    Point2::new(hb, -hh),
                    Point2::new(hb, -hh + t),
                    Point2::new(-hb + t, -hh + t),
                    Point2::new(-hb + t, hh - t),
                    Point2::new(hb, hh - t),
                    Point2::new(hb, hh),
                    Point2::new(-hb, hh),
                ],
                vec![ro, 0.0, 0.0, r, r, 0.0, 0.0, ro],
            )
        };

        let outer = self.polygon_with_fallback(&vertices, &radii, shape, "internal fillets", diagnostics, entity)?;
        Ok(Profile::new(outer))
    }

    /// Angle section built in four stages (first leg, toe fillet, root
    /// fillet, closing leg). A failed fillet only straightens its own stage.
    pub(crate) fn l_shape(
        &self,
        params: &LShapeParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let shape = "L-shape";
        let h = required(params.depth, shape, "Depth")?;
        let b = match params.width {
            Some(_) => required(params.width, shape, "Width")?,
            None => h,
        };
        let t = required(params.thickness, shape, "Thickness")?;
        if t >= h || t >= b {
            return Err(Error::profile(format!(
                "{shape}: thickness {t} does not fit in {b} x {h}"
            )));
        }
        let r = optional(params.fillet_radius);
        let re = optional(params.edge_radius);

        let (hb, hh) = (b / 2.0, h / 2.0);
        let v = [
            Point2::new(-hb, -hh),
            Point2::new(hb, -hh),
            Point2::new(hb, -hh + t),
            Point2::new(-hb + t, -hh + t),
            Point2::new(-hb + t, hh),
            Point2::new(-hb, hh),
        ];

        let fitted = |prev: &Point2<f64>,
                      at: usize,
                      next: &Point2<f64>,
                      radius: f64,
                      room_in: f64,
                      room_out: f64|
         -> std::result::Result<Fillet, FalloffReason> {
            let fillet = corner_fillet(prev, &v[at], next, radius)?;
            let limit = room_in.min(room_out);
            if fillet.setback > limit + self.tolerance.vertex_epsilon() {
                return Err(FalloffReason::FilletTooLarge { radius, limit });
            }
            Ok(fillet)
        };

        let invalid = |reason: FalloffReason| Error::profile(format!("{shape}: outline is degenerate ({reason})"));
        let mut builder = LoopBuilder::new(self.tolerance);

        // Stage 1: first leg, stopping where the toe fillet will start
        let toe = (re > 0.0).then(|| fitted(&v[1], 2, &v[3], re, t, b - t));
        let leg_end = match &toe {
            Some(Ok(f)) => f.tangent_in,
            _ => v[2],
        };
        builder.line(v[0], v[1]).line_if_needed(v[1], leg_end);
        builder.append_segments().map_err(invalid)?;

        // Stage 2: toe fillet of the first leg
        match toe {
            Some(Ok(f)) => {
                builder.descriptor(f.descriptor);
                if let Err(reason) = builder.append_segments() {
                    self.warn_l_stage(diagnostics, entity, "edge fillet", &reason);
                    builder.line_if_needed(leg_end, v[2]);
                    builder.append_segments().map_err(invalid)?;
                }
            }
            Some(Err(reason)) => self.warn_l_stage(diagnostics, entity, "edge fillet", &reason),
            None => {}
        }
        let cursor = builder.cursor().unwrap_or(v[2]);

        // Stage 3: root fillet between the legs
        let toe_room = if re > 0.0 { re.min(t) } else { 0.0 };
        let mut straight_root = true;
        if r > 0.0 {
            let room_in = (v[3] - cursor).norm();
            let room_out = (h - t) - toe_room;
            match fitted(&cursor, 3, &v[4], r, room_in, room_out) {
                Ok(f) => {
                    builder.line_if_needed(cursor, f.tangent_in).descriptor(f.descriptor);
                    match builder.append_segments() {
                        Ok(()) => straight_root = false,
                        Err(reason) => self.warn_l_stage(diagnostics, entity, "root fillet", &reason),
                    }
                }
                Err(reason) => self.warn_l_stage(diagnostics, entity, "root fillet", &reason),
            }
        }
        if straight_root {
            builder.line_if_needed(cursor, v[3]);
            builder.append_segments().map_err(invalid)?;
        }
        let cursor = builder.cursor().unwrap_or(v[3]);

        // Stage 4: closing leg with its toe fillet
        if re > 0.0 {
            let attempt = fitted(&cursor, 4, &v[5], re, (v[4] - cursor).norm(), t).and_then(|f| {
                builder
                    .line_if_needed(cursor, f.tangent_in)
                    .descriptor(f.descriptor)
                    .line_if_needed(f.tangent_out, v[5])
                    .line(v[5], v[0]);
                builder.append_segments()
            });
            match attempt {
                Ok(()) => {
                    let outer = builder.finish().map_err(invalid)?;
                    return Ok(Profile::new(outer));
                }
                Err(reason) => self.warn_l_stage(diagnostics, entity, "edge fillet", &reason),
            }
        }
        builder
            .line_if_needed(cursor, v[4])
            .line(v[4], v[5])
            .line(v[5], v[0]);
        builder.append_segments().map_err(invalid)?;
        let outer = builder.finish().map_err(invalid)?;
        Ok(Profile::new(outer))
    }

    fn warn_l_stage(
        &self,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
        feature: &str,
        reason: &FalloffReason,
    ) {
        diagnostics.log_warning(
            entity,
            &format!("L-shape: {feature} could not be built ({reason}); replaced by a sharp corner"),
        );
    }

    /// Tee with optional web and flange slopes. Fillets are not modelled.
    pub(crate) fn t_shape(
        &self,
        params: &TShapeParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let shape = "T-shape";
        let h = required(params.depth, shape, "Depth")?;
        let bf = required(params.flange_width, shape, "FlangeWidth")?;
        let tw = required(params.web_thickness, shape, "WebThickness")?;
        let tf = required(params.flange_thickness, shape, "FlangeThickness")?;
        if tw >= bf || tf >= h {
            return Err(Error::profile(format!(
                "{shape}: web {tw} / flange {tf} do not fit in {bf} x {h}"
            )));
        }
        self.warn_ignored_fillets(
            shape,
            &[params.fillet_radius, params.flange_edge_radius, params.web_edge_radius],
            diagnostics,
            entity,
        );

        let (hh, hbf, htw) = (h / 2.0, bf / 2.0, tw / 2.0);
        let underside = hh - tf;
        let web_mid = Point2::new(htw, (-hh + underside) / 2.0);
        let web_dir = Vector2::new(slope(params.web_slope).tan(), 1.0);
        let flange_mid = Point2::new((htw + hbf) / 2.0, underside);
        let flange_dir = Vector2::new(1.0, slope(params.flange_slope).tan());

        let junction = line_line_2d(&web_mid, &web_dir, &flange_mid, &flange_dir)
            .ok_or_else(|| Error::profile(format!("{shape}: web and flange faces are parallel")))?;
        let toe_x = web_mid.x + web_dir.x * (-hh - web_mid.y);
        let tip_y = underside + flange_dir.y * (hbf - flange_mid.x);

        if toe_x <= 0.0 || tip_y >= hh || junction.x >= hbf || junction.y <= -hh || junction.x <= 0.0 {
            return Err(Error::profile(format!(
                "{shape}: slopes produce a self-intersecting outline"
            )));
        }

        let vertices = [
            Point2::new(-toe_x, -hh),
            Point2::new(toe_x, -hh),
            junction,
            Point2::new(hbf, tip_y),
            Point2::new(hbf, hh),
            Point2::new(-hbf, hh),
            Point2::new(-hbf, tip_y),
            Point2::new(-junction.x, junction.y),
        ];
        Ok(Profile::new(self.plain_polygon(&vertices, shape)?))
    }

    /// Channel with optional flange slope. Fillets are not modelled.
    pub(crate) fn u_shape(
        &self,
        params: &UShapeParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let shape = "U-shape";
        let h = required(params.depth, shape, "Depth")?;
        let bf = required(params.flange_width, shape, "FlangeWidth")?;
        let tw = required(params.web_thickness, shape, "WebThickness")?;
        let tf = required(params.flange_thickness, shape, "FlangeThickness")?;
        if tw >= bf || 2.0 * tf >= h {
            return Err(Error::profile(format!(
                "{shape}: web {tw} / flanges {tf} do not fit in {bf} x {h}"
            )));
        }
        self.warn_ignored_fillets(shape, &[params.fillet_radius, params.edge_radius], diagnostics, entity);

        let (hh, hbf) = (h / 2.0, bf / 2.0);
        let web_face = -hbf + tw;
        let flange_mid = Point2::new((web_face + hbf) / 2.0, -hh + tf);
        let flange_dir = Vector2::new(1.0, -slope(params.flange_slope).tan());

        let root = line_line_2d(&flange_mid, &flange_dir, &Point2::new(web_face, 0.0), &Vector2::new(0.0, 1.0))
            .ok_or_else(|| Error::profile(format!("{shape}: flange face is parallel to the web")))?;
        let tip_y = flange_mid.y + flange_dir.y * (hbf - flange_mid.x);

        if root.y >= 0.0 || tip_y <= -hh {
            return Err(Error::profile(format!(
                "{shape}: flange slope produces a self-intersecting outline"
            )));
        }

        let vertices = [
            Point2::new(-hbf, -hh),
            Point2::new(hbf, -hh),
            Point2::new(hbf, tip_y),
            Point2::new(web_face, root.y),
            Point2::new(web_face, -root.y),
            Point2::new(hbf, -tip_y),
            Point2::new(hbf, hh),
            Point2::new(-hbf, hh),
        ];
        Ok(Profile::new(self.plain_polygon(&vertices, shape)?))
    }

    pub(crate) fn z_shape(
        &self,
        params: &ZShapeParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let shape = "Z-shape";
        let h = required(params.depth, shape, "Depth")?;
        let bf = required(params.flange_width, shape, "FlangeWidth")?;
        let tw = required(params.web_thickness, shape, "WebThickness")?;
        let tf = required(params.flange_thickness, shape, "FlangeThickness")?;
        if tw >= bf || 2.0 * tf >= h {
            return Err(Error::profile(format!(
                "{shape}: web {tw} / flanges {tf} do not fit in {bf} x {h}"
            )));
        }

        let (hh, htw) = (h / 2.0, tw / 2.0);
        let vertices = [
            Point2::new(htw - bf, -hh),
            Point2::new(htw, -hh),
            Point2::new(htw, hh - tf),
            Point2::new(-htw + bf, hh - tf),
            Point2::new(-htw + bf, hh),
            Point2::new(-htw, hh),
            Point2::new(-htw, -hh + tf),
            Point2::new(htw - bf, -hh + tf),
        ];
        let r = optional(params.fillet_radius);
        let re = optional(params.edge_radius);
        let radii = [0.0, 0.0, r, re, 0.0, 0.0, r, re];

        let outer = self.polygon_with_fallback(&vertices, &radii, shape, "fillets", diagnostics, entity)?;
        Ok(Profile::new(outer))
    }

    fn warn_ignored_fillets(
        &self,
        shape: &str,
        radii: &[Option<f64>],
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) {
        if radii.iter().any(|r| optional(*r) > 0.0) {
            diagnostics.log_warning(
                entity,
                &format!("{shape}: fillet and edge radii are not supported; built with sharp corners"),
            );
        }
    }
}
