// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric shape parameters, plus rectangle, circle and ellipse builders
//!
//! Required dimensions are `Option<f64>` so an absent value can be told apart
//! from a bad one. Optional radii and slopes treat `None`, zero and negative
//! values as "not present".

use super::loop_builder::LoopBuilder;
use super::ProfileBuilder;
use crate::curve::{CurveSegment, Frame};
use crate::curve_loop::CurveLoop;
use crate::diagnostics::{Diagnostics, EntityId};
use crate::error::{Error, Result};
use crate::profile::Profile;
use nalgebra::{Point2, Point3};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectangleParams {
    pub x_dim: Option<f64>,
    pub y_dim: Option<f64>,
    pub rounding_radius: Option<f64>,
}

impl RectangleParams {
    pub fn new(x_dim: f64, y_dim: f64) -> Self {
        Self {
            x_dim: Some(x_dim),
            y_dim: Some(y_dim),
            rounding_radius: None,
        }
    }

    pub fn rounded(mut self, radius: f64) -> Self {
        self.rounding_radius = Some(radius);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectangleHollowParams {
    pub x_dim: Option<f64>,
    pub y_dim: Option<f64>,
    pub wall_thickness: Option<f64>,
    pub inner_fillet_radius: Option<f64>,
    pub outer_fillet_radius: Option<f64>,
}

impl RectangleHollowParams {
    pub fn new(x_dim: f64, y_dim: f64, wall_thickness: f64) -> Self {
        Self {
            x_dim: Some(x_dim),
            y_dim: Some(y_dim),
            wall_thickness: Some(wall_thickness),
            ..Self::default()
        }
    }

    pub fn with_fillets(mut self, inner: f64, outer: f64) -> Self {
        self.inner_fillet_radius = Some(inner);
        self.outer_fillet_radius = Some(outer);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircleParams {
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircleHollowParams {
    pub radius: Option<f64>,
    pub wall_thickness: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EllipseParams {
    /// Semi-axis along local X
    pub semi_axis1: Option<f64>,
    /// Semi-axis along local Y
    pub semi_axis2: Option<f64>,
}

/// Channel with optional lips (cold-formed C section), web on the left
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CShapeParams {
    pub depth: Option<f64>,
    pub width: Option<f64>,
    pub wall_thickness: Option<f64>,
    /// Lip length measured from the outer flange face
    pub girth: Option<f64>,
    pub internal_fillet_radius: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IShapeParams {
    pub overall_width: Option<f64>,
    pub overall_depth: Option<f64>,
    pub web_thickness: Option<f64>,
    pub flange_thickness: Option<f64>,
    pub fillet_radius: Option<f64>,
}

/// Angle section; `width` defaults to `depth`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LShapeParams {
    pub depth: Option<f64>,
    pub width: Option<f64>,
    pub thickness: Option<f64>,
    /// Root fillet between the legs
    pub fillet_radius: Option<f64>,
    /// Rounding of the leg toes
    pub edge_radius: Option<f64>,
}

/// Tee section, flange on top. Slopes are in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TShapeParams {
    pub depth: Option<f64>,
    pub flange_width: Option<f64>,
    pub web_thickness: Option<f64>,
    pub flange_thickness: Option<f64>,
    pub fillet_radius: Option<f64>,
    pub flange_edge_radius: Option<f64>,
    pub web_edge_radius: Option<f64>,
    pub web_slope: Option<f64>,
    pub flange_slope: Option<f64>,
}

/// Channel section, web on the left. Slopes are in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UShapeParams {
    pub depth: Option<f64>,
    pub flange_width: Option<f64>,
    pub web_thickness: Option<f64>,
    pub flange_thickness: Option<f64>,
    pub fillet_radius: Option<f64>,
    pub edge_radius: Option<f64>,
    pub flange_slope: Option<f64>,
}

/// Z section: bottom flange to the left, top flange to the right
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZShapeParams {
    pub depth: Option<f64>,
    pub flange_width: Option<f64>,
    pub web_thickness: Option<f64>,
    pub flange_thickness: Option<f64>,
    pub fillet_radius: Option<f64>,
    pub edge_radius: Option<f64>,
}

/// Every supported parametric shape family
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeParams {
    Rectangle(RectangleParams),
    RectangleHollow(RectangleHollowParams),
    Circle(CircleParams),
    CircleHollow(CircleHollowParams),
    Ellipse(EllipseParams),
    CShape(CShapeParams),
    IShape(IShapeParams),
    LShape(LShapeParams),
    TShape(TShapeParams),
    UShape(UShapeParams),
    ZShape(ZShapeParams),
}

impl ShapeParams {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangle(_) => "rectangle",
            Self::RectangleHollow(_) => "hollow rectangle",
            Self::Circle(_) => "circle",
            Self::CircleHollow(_) => "hollow circle",
            Self::Ellipse(_) => "ellipse",
            Self::CShape(_) => "C-shape",
            Self::IShape(_) => "I-shape",
            Self::LShape(_) => "L-shape",
            Self::TShape(_) => "T-shape",
            Self::UShape(_) => "U-shape",
            Self::ZShape(_) => "Z-shape",
        }
    }
}

/// Positive, finite required dimension
pub(crate) fn required(value: Option<f64>, shape: &str, name: &str) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(Error::profile(format!(
            "{shape}: {name} must be positive, got {v}"
        ))),
        None => Err(Error::profile(format!("{shape}: missing {name}"))),
    }
}

/// Optional radius; absent, zero, negative or non-finite become zero
#[inline]
pub(crate) fn optional(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

/// Optional slope in radians; absent or non-finite become zero
#[inline]
pub(crate) fn slope(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub(crate) fn rect_vertices(half_x: f64, half_y: f64) -> [Point2<f64>; 4] {
    [
        Point2::new(-half_x, -half_y),
        Point2::new(half_x, -half_y),
        Point2::new(half_x, half_y),
        Point2::new(-half_x, half_y),
    ]
}

impl<'a> ProfileBuilder<'a> {
    /// Closed polygon through `vertices` without any fillets
    pub(crate) fn plain_polygon(&self, vertices: &[Point2<f64>], shape: &str) -> Result<CurveLoop> {
        let mut builder = LoopBuilder::new(self.tolerance);
        builder
            .polygon(vertices, &[])
            .and_then(|()| builder.finish())
            .map_err(|reason| Error::profile(format!("{shape}: outline is degenerate ({reason})")))
    }

    /// Try the filleted polygon first; on failure warn and fall back to the
    /// plain polygon through the same vertices
    pub(crate) fn polygon_with_fallback(
        &self,
        vertices: &[Point2<f64>],
        radii: &[f64],
        shape: &str,
        feature: &str,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<CurveLoop> {
        if radii.iter().any(|r| *r > 0.0) {
            let mut builder = LoopBuilder::new(self.tolerance);
            match builder.polygon(vertices, radii).and_then(|()| builder.finish()) {
                Ok(lp) => return Ok(lp),
                Err(reason) => diagnostics.log_warning(
                    entity,
                    &format!("{shape}: {feature} could not be built ({reason}); removed them and used the plain outline"),
                ),
            }
        }
        self.plain_polygon(vertices, shape)
    }

    fn rounded_rectangle(
        &self,
        half_x: f64,
        half_y: f64,
        radius: f64,
        shape: &str,
        feature: &str,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<CurveLoop> {
        let vertices = rect_vertices(half_x, half_y);
        if radius > 0.0 {
            if radius < half_x.min(half_y) {
                return self.polygon_with_fallback(
                    &vertices,
                    &[radius; 4],
                    shape,
                    feature,
                    diagnostics,
                    entity,
                );
            }
            diagnostics.log_warning(
                entity,
                &format!(
                    "{shape}: {feature} radius {} must be below half the smallest dimension; corners left sharp",
                    self.tolerance.format_length(radius)
                ),
            );
        }
        self.plain_polygon(&vertices, shape)
    }

    pub(crate) fn rectangle(
        &self,
        params: &RectangleParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let x = required(params.x_dim, "rectangle", "XDim")?;
        let y = required(params.y_dim, "rectangle", "YDim")?;
        let outer = self.rounded_rectangle(
            x / 2.0,
            y / 2.0,
            optional(params.rounding_radius),
            "rectangle",
            "rounded corners",
            diagnostics,
            entity,
        )?;
        Ok(Profile::new(outer))
    }

    pub(crate) fn rectangle_hollow(
        &self,
        params: &RectangleHollowParams,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Profile> {
        let shape = "hollow rectangle";
        let x = required(params.x_dim, shape, "XDim")?;
        let y = required(params.y_dim, shape, "YDim")?;
        let t = required(params.wall_thickness, shape, "WallThickness")?;
        let (half_x, half_y) = (x / 2.0, y / 2.0);
        if t >= half_x || t >= half_y {
            return Err(Error::profile(format!(
                "{shape}: wall thickness {t} leaves no interior in {x} x {y}"
            )));
        }

        let outer = self.rounded_rectangle(
            half_x,
            half_y,
            optional(params.outer_fillet_radius),
            shape,
            "outer fillets",
            diagnostics,
            entity,
        )?;
        let inner = self.rounded_rectangle(
            half_x - t,
            half_y - t,
            optional(params.inner_fillet_radius),
            shape,
            "inner fillets",
            diagnostics,
            entity,
        )?;
        Ok(Profile::with_holes(outer, vec![inner.reversed()]))
    }

    /// Two half arcs; a single full circle is never emitted
    fn circle_loop(&self, radius: f64, shape: &str) -> Result<CurveLoop> {
        let center = Point2::origin();
        let mut builder = LoopBuilder::new(self.tolerance);
        builder
            .arc(center, radius, 0.0, PI, false)
            .arc(center, radius, PI, 2.0 * PI, false);
        builder
            .append_segments()
            .and_then(|()| builder.finish())
            .map_err(|reason| Error::profile(format!("{shape}: radius {radius} is degenerate ({reason})")))
    }

    pub(crate) fn circle(&self, params: &CircleParams) -> Result<Profile> {
        let r = required(params.radius, "circle", "Radius")?;
        Ok(Profile::new(self.circle_loop(r, "circle")?))
    }

    pub(crate) fn circle_hollow(&self, params: &CircleHollowParams) -> Result<Profile> {
        let shape = "hollow circle";
        let r = required(params.radius, shape, "Radius")?;
        let t = required(params.wall_thickness, shape, "WallThickness")?;
        if t >= r {
            return Err(Error::profile(format!(
                "{shape}: wall thickness {t} is not below the radius {r}"
            )));
        }
        let outer = self.circle_loop(r, shape)?;
        let inner = self.circle_loop(r - t, shape)?;
        Ok(Profile::with_holes(outer, vec![inner.reversed()]))
    }

    pub(crate) fn ellipse(&self, params: &EllipseParams) -> Result<Profile> {
        let a = required(params.semi_axis1, "ellipse", "SemiAxis1")?;
        let b = required(params.semi_axis2, "ellipse", "SemiAxis2")?;
        let frame = Frame::xy(Point3::origin());
        let halves = vec![
            CurveSegment::ellipse(frame, a, b, 0.0, PI),
            CurveSegment::ellipse(frame, a, b, PI, 2.0 * PI),
        ];
        for half in &halves {
            half.validate(self.tolerance)
                .map_err(|e| Error::profile(format!("ellipse: {e}")))?;
        }
        Ok(Profile::new(CurveLoop::from_segments(halves, self.tolerance)?))
    }
}
