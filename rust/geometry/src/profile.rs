// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile definitions in the profile plane (local XY, z = 0)

use crate::curve::{CurveSegment, Frame};
use crate::curve_loop::CurveLoop;
use crate::tolerance::ToleranceContext;
use nalgebra::{Isometry3, Point2, Point3, Translation3, UnitQuaternion, Vector2, Vector3};

/// Cross-section: one outer loop plus zero or more voids
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Outer boundary
    pub outer: CurveLoop,
    /// Voids, wound opposite to the outer loop
    pub inner: Vec<CurveLoop>,
    /// Profile built from an open curve (no enclosed area)
    pub is_open: bool,
}

impl Profile {
    pub fn new(outer: CurveLoop) -> Self {
        Self {
            outer,
            inner: Vec::new(),
            is_open: false,
        }
    }

    /// Profile whose boundary is a single open curve
    pub fn open(curve: CurveLoop) -> Self {
        Self {
            outer: curve,
            inner: Vec::new(),
            is_open: true,
        }
    }

    pub fn with_holes(outer: CurveLoop, inner: Vec<CurveLoop>) -> Self {
        Self {
            outer,
            inner,
            is_open: false,
        }
    }

    /// Outer loop followed by the voids
    pub fn loops(&self) -> impl Iterator<Item = &CurveLoop> {
        std::iter::once(&self.outer).chain(self.inner.iter())
    }

    pub fn loop_count(&self) -> usize {
        1 + self.inner.len()
    }

    /// Every loop closes within the vertex tolerance
    pub fn is_closed(&self, tol: &ToleranceContext) -> bool {
        self.loops().all(|l| l.is_closed(tol))
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            outer: self.outer.translated(offset),
            inner: self.inner.iter().map(|l| l.translated(offset)).collect(),
            is_open: self.is_open,
        }
    }

    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            outer: self.outer.transformed(transform),
            inner: self.inner.iter().map(|l| l.transformed(transform)).collect(),
            is_open: self.is_open,
        }
    }

    /// Net enclosed area (outer minus voids)
    pub fn area(&self, segments_per_turn: usize) -> f64 {
        let outer = self.outer.area_vector(segments_per_turn).norm() * 0.5;
        let voids: f64 = self
            .inner
            .iter()
            .map(|l| l.area_vector(segments_per_turn).norm() * 0.5)
            .sum();
        outer - voids
    }
}

/// 2D placement of a parametric profile: location plus local X direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement2D {
    pub location: Point2<f64>,
    pub ref_direction: Vector2<f64>,
}

impl Placement2D {
    /// A zero reference direction falls back to +X
    pub fn new(location: Point2<f64>, ref_direction: Vector2<f64>) -> Self {
        let ref_direction = ref_direction
            .try_normalize(1e-10)
            .unwrap_or_else(|| Vector2::new(1.0, 0.0));
        Self {
            location,
            ref_direction,
        }
    }

    pub fn identity() -> Self {
        Self {
            location: Point2::origin(),
            ref_direction: Vector2::new(1.0, 0.0),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.location.coords.norm() < 1e-10
            && (self.ref_direction.x - 1.0).abs() < 1e-10
            && self.ref_direction.y.abs() < 1e-10
    }

    /// Rotation about Z followed by translation in the profile plane
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let angle = self.ref_direction.y.atan2(self.ref_direction.x);
        Isometry3::from_parts(
            Translation3::new(self.location.x, self.location.y, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle),
        )
    }

    pub fn transform_point(&self, p: &Point2<f64>) -> Point2<f64> {
        let x = self.ref_direction;
        let y = Vector2::new(-x.y, x.x);
        self.location + x * p.x + y * p.y
    }
}

impl Default for Placement2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Source curve of an arbitrary profile
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileCurve {
    /// Single bounded curve
    Segment(CurveSegment),
    /// Unbounded full circle
    Circle { frame: Frame, radius: f64 },
    /// Unbounded full ellipse
    Ellipse {
        frame: Frame,
        radius_x: f64,
        radius_y: f64,
    },
    /// Unbounded straight line
    Line {
        origin: Point3<f64>,
        direction: Vector3<f64>,
    },
    /// Ordered, independently authored segments
    Composite(Vec<CurveSegment>),
    /// Points joined by straight lines
    Polyline(Vec<Point3<f64>>),
}

impl ProfileCurve {
    /// Human readable curve kind for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Segment(_) => "bounded curve",
            Self::Circle { .. } => "circle",
            Self::Ellipse { .. } => "ellipse",
            Self::Line { .. } => "line",
            Self::Composite(_) => "composite curve",
            Self::Polyline(_) => "polyline",
        }
    }
}
