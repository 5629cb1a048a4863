// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile construction
//!
//! Turns profile definitions into [`Profile`]s. Parametric shapes are
//! dispatched on [`ShapeParams`]; arbitrary profiles resolve their curves
//! through the [`GeometryArena`].

mod arbitrary;
mod loop_builder;
mod parametric;
mod sections;

#[cfg(test)]
mod tests;

pub use loop_builder::{corner_fillet, FalloffReason, Fillet, LoopBuilder, SegmentDescriptor};
pub use parametric::{
    CShapeParams, CircleHollowParams, CircleParams, EllipseParams, IShapeParams, LShapeParams,
    RectangleHollowParams, RectangleParams, ShapeParams, TShapeParams, UShapeParams,
    ZShapeParams,
};

use crate::arena::{CurveKey, GeometryArena};
use crate::curve_loop::CurveLoop;
use crate::diagnostics::{report_fatal, Diagnostics, EntityId};
use crate::error::Result;
use crate::profile::{Placement2D, Profile};
use crate::tolerance::ToleranceContext;

/// How a profile is defined
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileDef {
    /// Standard shape, optionally placed in the profile plane
    Parametric {
        shape: ShapeParams,
        position: Option<Placement2D>,
    },
    /// Closed outer curve with optional voids; `None` entries are unset voids
    ArbitraryClosed {
        outer: CurveKey,
        voids: Vec<Option<CurveKey>>,
    },
    /// Open curve, kept as a single open boundary
    ArbitraryOpen { curve: CurveKey },
    /// Open curve thickened symmetrically into an area
    CenterLine { curve: CurveKey, thickness: f64 },
}

impl ProfileDef {
    pub fn parametric(shape: ShapeParams) -> Self {
        Self::Parametric {
            shape,
            position: None,
        }
    }
}

/// Builds profiles under one tolerance context
pub struct ProfileBuilder<'a> {
    pub(crate) tolerance: &'a ToleranceContext,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(tolerance: &'a ToleranceContext) -> Self {
        Self { tolerance }
    }

    #[inline]
    pub fn tolerance(&self) -> &ToleranceContext {
        self.tolerance
    }

    /// Build any profile definition. Fatal errors are reported to
    /// `diagnostics` before being returned.
    pub fn build(
        &self,
        def: &ProfileDef,
        arena: &GeometryArena,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let result = match def {
            ProfileDef::Parametric { shape, position } => {
                self.build_parametric(shape, position.as_ref(), diagnostics, entity)
            }
            ProfileDef::ArbitraryClosed { outer, voids } => {
                self.build_arbitrary_closed(*outer, voids, arena, diagnostics, entity)
            }
            ProfileDef::ArbitraryOpen { curve } => {
                self.build_arbitrary_open(*curve, arena, diagnostics, entity)
            }
            ProfileDef::CenterLine { curve, thickness } => {
                self.build_center_line(*curve, *thickness, arena, diagnostics, entity)
            }
        };
        report_fatal(result, diagnostics, entity)
    }

    /// Resolve an arena curve into a loop, open or closed. Composite curves
    /// go through the composite assembler; fatal errors are reported.
    pub fn resolve_curve(
        &self,
        key: CurveKey,
        arena: &GeometryArena,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<CurveLoop> {
        let result = arena
            .curve(key)
            .and_then(|curve| self.resolve_open(curve, diagnostics, entity));
        report_fatal(result, diagnostics, entity)
    }

    /// Build a parametric shape and apply its placement
    pub fn build_parametric(
        &self,
        shape: &ShapeParams,
        position: Option<&Placement2D>,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let profile = match shape {
            ShapeParams::Rectangle(p) => self.rectangle(p, diagnostics, entity),
            ShapeParams::RectangleHollow(p) => self.rectangle_hollow(p, diagnostics, entity),
            ShapeParams::Circle(p) => self.circle(p),
            ShapeParams::CircleHollow(p) => self.circle_hollow(p),
            ShapeParams::Ellipse(p) => self.ellipse(p),
            ShapeParams::CShape(p) => self.c_shape(p, diagnostics, entity),
            ShapeParams::IShape(p) => self.i_shape(p, diagnostics, entity),
            ShapeParams::LShape(p) => self.l_shape(p, diagnostics, entity),
            ShapeParams::TShape(p) => self.t_shape(p, diagnostics, entity),
            ShapeParams::UShape(p) => self.u_shape(p, diagnostics, entity),
            ShapeParams::ZShape(p) => self.z_shape(p, diagnostics, entity),
        }?;

        match position {
            Some(placement) if !placement.is_identity() => {
                Ok(profile.transformed(&placement.to_isometry()))
            }
            _ => Ok(profile),
        }
    }
}
