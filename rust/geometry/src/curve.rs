// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded curve segments (lines, circular arcs, elliptical arcs)
//!
//! Conic segments are parameterized by angle in their [`Frame`] and always run
//! counter-clockwise about the frame normal (`start < end`). Reversing a conic
//! flips the frame's Y axis instead of swapping the parameters, so a reversed
//! segment is still a plain value with `start < end`. Lines are parameterized
//! by arc length from their start point.

use crate::error::{Error, Result};
use crate::intersect::Carrier;
use crate::tolerance::ToleranceContext;
use nalgebra::{Isometry3, Point3, Vector3};
use std::f64::consts::TAU;

/// Right-handed placement of a conic: origin plus orthonormal X/Y axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point3<f64>,
    pub x_axis: Vector3<f64>,
    pub y_axis: Vector3<f64>,
}

impl Frame {
    /// Build a frame from an origin, a reference X direction and a normal.
    /// The X direction is projected into the plane (Gram-Schmidt).
    pub fn new(origin: Point3<f64>, x_axis: Vector3<f64>, normal: Vector3<f64>) -> Result<Self> {
        let n = normal
            .try_normalize(1e-12)
            .ok_or_else(|| Error::curve("frame normal has zero length"))?;
        let x = (x_axis - n * x_axis.dot(&n))
            .try_normalize(1e-12)
            .ok_or_else(|| Error::curve("frame X axis is parallel to its normal"))?;
        Ok(Self {
            origin,
            x_axis: x,
            y_axis: n.cross(&x),
        })
    }

    /// Frame aligned with the global XY plane
    pub fn xy(origin: Point3<f64>) -> Self {
        Self {
            origin,
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
        }
    }

    /// Frame with an arbitrary X axis perpendicular to `normal`
    pub fn from_normal(origin: Point3<f64>, normal: Vector3<f64>) -> Result<Self> {
        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        Self::new(origin, reference, normal)
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.x_axis.cross(&self.y_axis)
    }

    /// Same plane, opposite normal
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            x_axis: self.x_axis,
            y_axis: -self.y_axis,
        }
    }

    #[inline]
    pub fn to_local(&self, point: &Point3<f64>) -> (f64, f64) {
        let d = point - self.origin;
        (d.dot(&self.x_axis), d.dot(&self.y_axis))
    }

    #[inline]
    pub fn to_world(&self, u: f64, v: f64) -> Point3<f64> {
        self.origin + self.x_axis * u + self.y_axis * v
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            origin: self.origin + offset,
            ..*self
        }
    }

    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            origin: transform.transform_point(&self.origin),
            x_axis: transform.transform_vector(&self.x_axis),
            y_axis: transform.transform_vector(&self.y_axis),
        }
    }
}

/// Curve type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    Line,
    Arc,
    Ellipse,
}

/// A single bounded curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveSegment {
    Line {
        start: Point3<f64>,
        end: Point3<f64>,
    },
    Arc {
        frame: Frame,
        radius: f64,
        start: f64,
        end: f64,
    },
    Ellipse {
        frame: Frame,
        radius_x: f64,
        radius_y: f64,
        start: f64,
        end: f64,
    },
}

impl CurveSegment {
    #[inline]
    pub fn line(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self::Line { start, end }
    }

    /// Arc running counter-clockwise about `frame` from angle `start` to `end`
    pub fn arc(frame: Frame, radius: f64, start: f64, end: f64) -> Self {
        let (start, end) = normalize_range(start, end);
        Self::Arc {
            frame,
            radius,
            start,
            end,
        }
    }

    /// Elliptical arc; `radius_x` lies along the frame X axis
    pub fn ellipse(frame: Frame, radius_x: f64, radius_y: f64, start: f64, end: f64) -> Self {
        let (start, end) = normalize_range(start, end);
        Self::Ellipse {
            frame,
            radius_x,
            radius_y,
            start,
            end,
        }
    }

    #[inline]
    pub fn kind(&self) -> CurveKind {
        match self {
            Self::Line { .. } => CurveKind::Line,
            Self::Arc { .. } => CurveKind::Arc,
            Self::Ellipse { .. } => CurveKind::Ellipse,
        }
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, Self::Line { .. })
    }

    /// Parameter interval of the segment
    pub fn param_range(&self) -> (f64, f64) {
        match self {
            Self::Line { start, end } => (0.0, (end - start).norm()),
            Self::Arc { start, end, .. } | Self::Ellipse { start, end, .. } => (*start, *end),
        }
    }

    /// Angular sweep of a conic (zero for lines)
    pub fn sweep(&self) -> f64 {
        match self {
            Self::Line { .. } => 0.0,
            Self::Arc { start, end, .. } | Self::Ellipse { start, end, .. } => end - start,
        }
    }

    pub fn point_at(&self, t: f64) -> Point3<f64> {
        match self {
            Self::Line { start, end } => {
                let d = end - start;
                let len = d.norm();
                if len < 1e-15 {
                    *start
                } else {
                    start + d * (t / len)
                }
            }
            Self::Arc { frame, radius, .. } => {
                frame.to_world(radius * t.cos(), radius * t.sin())
            }
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                ..
            } => frame.to_world(radius_x * t.cos(), radius_y * t.sin()),
        }
    }

    /// First derivative with respect to the curve parameter
    pub fn tangent_at(&self, t: f64) -> Vector3<f64> {
        match self {
            Self::Line { start, end } => (end - start).try_normalize(1e-15).unwrap_or_else(Vector3::zeros),
            Self::Arc { frame, radius, .. } => {
                frame.x_axis * (-radius * t.sin()) + frame.y_axis * (radius * t.cos())
            }
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                ..
            } => frame.x_axis * (-radius_x * t.sin()) + frame.y_axis * (radius_y * t.cos()),
        }
    }

    #[inline]
    pub fn start_point(&self) -> Point3<f64> {
        match self {
            Self::Line { start, .. } => *start,
            _ => self.point_at(self.param_range().0),
        }
    }

    #[inline]
    pub fn end_point(&self) -> Point3<f64> {
        match self {
            Self::Line { end, .. } => *end,
            _ => self.point_at(self.param_range().1),
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Self::Line { start, end } => (end - start).norm(),
            Self::Arc {
                radius, start, end, ..
            } => radius * (end - start),
            Self::Ellipse { start, end, .. } => {
                // Composite Simpson over the speed |C'(t)|
                const STEPS: usize = 64;
                let h = (end - start) / STEPS as f64;
                let speed = |t: f64| self.tangent_at(t).norm();
                let mut sum = speed(*start) + speed(*end);
                for i in 1..STEPS {
                    let w = if i % 2 == 1 { 4.0 } else { 2.0 };
                    sum += w * speed(start + h * i as f64);
                }
                sum * h / 3.0
            }
        }
    }

    /// Same geometry traversed in the opposite direction
    pub fn reversed(&self) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line {
                start: end,
                end: start,
            },
            Self::Arc {
                frame,
                radius,
                start,
                end,
            } => Self::Arc {
                frame: frame.flipped(),
                radius,
                start: -end,
                end: -start,
            },
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                start,
                end,
            } => Self::Ellipse {
                frame: frame.flipped(),
                radius_x,
                radius_y,
                start: -end,
                end: -start,
            },
        }
    }

    /// Restrict (or extend) the segment to the parameter interval `[t0, t1]`
    pub fn rebound(&self, t0: f64, t1: f64) -> Result<Self> {
        if !(t1 > t0) || !t0.is_finite() || !t1.is_finite() {
            return Err(Error::curve(format!(
                "cannot re-bound curve to empty interval [{t0}, {t1}]"
            )));
        }
        match *self {
            Self::Line { .. } => Ok(Self::Line {
                start: self.point_at(t0),
                end: self.point_at(t1),
            }),
            Self::Arc { frame, radius, .. } => {
                check_sweep(t0, t1)?;
                Ok(Self::Arc {
                    frame,
                    radius,
                    start: t0,
                    end: t1,
                })
            }
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                ..
            } => {
                check_sweep(t0, t1)?;
                Ok(Self::Ellipse {
                    frame,
                    radius_x,
                    radius_y,
                    start: t0,
                    end: t1,
                })
            }
        }
    }

    /// Parameter of the point on the curve's carrier closest to `point`.
    ///
    /// For conics the angle is reported in the period nearest the segment's
    /// own range, so points just before the start come back slightly negative
    /// relative to `start` instead of one full turn later.
    pub fn project(&self, point: &Point3<f64>) -> f64 {
        match self {
            Self::Line { start, end } => {
                let d = end - start;
                match d.try_normalize(1e-15) {
                    Some(dir) => (point - start).dot(&dir),
                    None => 0.0,
                }
            }
            Self::Arc {
                frame, start, end, ..
            } => {
                let (u, v) = frame.to_local(point);
                nearest_angle(v.atan2(u), *start, *end)
            }
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                start,
                end,
            } => {
                let (u, v) = frame.to_local(point);
                nearest_angle((v / radius_y).atan2(u / radius_x), *start, *end)
            }
        }
    }

    /// Distance from `point` to the bounded segment
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        let (t0, t1) = self.param_range();
        let t = self.project(point).clamp(t0, t1);
        (self.point_at(t) - point).norm()
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line {
                start: start + offset,
                end: end + offset,
            },
            Self::Arc {
                frame,
                radius,
                start,
                end,
            } => Self::Arc {
                frame: frame.translated(offset),
                radius,
                start,
                end,
            },
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                start,
                end,
            } => Self::Ellipse {
                frame: frame.translated(offset),
                radius_x,
                radius_y,
                start,
                end,
            },
        }
    }

    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line {
                start: transform.transform_point(&start),
                end: transform.transform_point(&end),
            },
            Self::Arc {
                frame,
                radius,
                start,
                end,
            } => Self::Arc {
                frame: frame.transformed(transform),
                radius,
                start,
                end,
            },
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                start,
                end,
            } => Self::Ellipse {
                frame: frame.transformed(transform),
                radius_x,
                radius_y,
                start,
                end,
            },
        }
    }

    /// Parallel copy at `distance` to the left of the direction of travel,
    /// "left" being taken about `normal`.
    pub fn offset(&self, distance: f64, normal: &Vector3<f64>) -> Result<Self> {
        match *self {
            Self::Line { start, end } => {
                let dir = (end - start)
                    .try_normalize(1e-15)
                    .ok_or_else(|| Error::DegenerateCurve("cannot offset a zero-length line".into()))?;
                let left = normal.cross(&dir) * distance;
                Ok(Self::Line {
                    start: start + left,
                    end: end + left,
                })
            }
            Self::Arc {
                frame,
                radius,
                start,
                end,
            } => {
                let new_radius = if frame.normal().dot(normal) >= 0.0 {
                    radius - distance
                } else {
                    radius + distance
                };
                if new_radius <= 0.0 {
                    return Err(Error::DegenerateCurve(format!(
                        "offset of {distance} collapses arc of radius {radius}"
                    )));
                }
                Ok(Self::Arc {
                    frame,
                    radius: new_radius,
                    start,
                    end,
                })
            }
            Self::Ellipse { .. } => Err(Error::curve(
                "offsetting an elliptical arc is not supported",
            )),
        }
    }

    /// Points along the segment, start and end included
    pub fn tessellate(&self, segments_per_turn: usize) -> Vec<Point3<f64>> {
        match self {
            Self::Line { start, end } => vec![*start, *end],
            _ => {
                let (t0, t1) = self.param_range();
                let n = ((t1 - t0) / TAU * segments_per_turn.max(4) as f64).ceil() as usize;
                let n = n.max(2);
                (0..=n)
                    .map(|i| self.point_at(t0 + (t1 - t0) * i as f64 / n as f64))
                    .collect()
            }
        }
    }

    /// Unbounded carrier (line or circle); ellipses have none
    pub fn carrier(&self) -> Option<Carrier> {
        match *self {
            Self::Line { start, end } => {
                let direction = (end - start).try_normalize(1e-15)?;
                Some(Carrier::Line {
                    origin: start,
                    direction,
                })
            }
            Self::Arc { frame, radius, .. } => Some(Carrier::Circle { frame, radius }),
            Self::Ellipse { .. } => None,
        }
    }

    /// Check the segment is usable as a boundary curve under `tol`
    pub fn validate(&self, tol: &ToleranceContext) -> Result<()> {
        let finite = match self {
            Self::Line { start, end } => {
                start.iter().chain(end.iter()).all(|c| c.is_finite())
            }
            Self::Arc {
                frame,
                radius,
                start,
                end,
            } => frame.origin.iter().all(|c| c.is_finite())
                && radius.is_finite()
                && start.is_finite()
                && end.is_finite(),
            Self::Ellipse {
                frame,
                radius_x,
                radius_y,
                start,
                end,
            } => frame.origin.iter().all(|c| c.is_finite())
                && radius_x.is_finite()
                && radius_y.is_finite()
                && start.is_finite()
                && end.is_finite(),
        };
        if !finite {
            return Err(Error::curve("curve has non-finite coordinates"));
        }

        match self {
            Self::Arc { radius, .. } if *radius < tol.vertex_epsilon() => {
                return Err(Error::DegenerateCurve(format!(
                    "arc radius {} is below the vertex tolerance",
                    tol.format_length(*radius)
                )));
            }
            Self::Ellipse {
                radius_x, radius_y, ..
            } if radius_x.min(*radius_y) < tol.vertex_epsilon() => {
                return Err(Error::DegenerateCurve(
                    "ellipse semi-axis is below the vertex tolerance".into(),
                ));
            }
            _ => {}
        }

        let length = self.length();
        if length < tol.short_curve_tolerance() {
            return Err(Error::DegenerateCurve(format!(
                "{:?} of length {} is shorter than the short-curve tolerance {}",
                self.kind(),
                tol.format_length(length),
                tol.format_length(tol.short_curve_tolerance())
            )));
        }
        Ok(())
    }
}

/// Bring `end` into `(start, start + TAU]`
fn normalize_range(start: f64, end: f64) -> (f64, f64) {
    let mut end = end;
    if end <= start {
        let turns = ((start - end) / TAU).floor() + 1.0;
        end += turns * TAU;
    }
    if end - start > TAU + 1e-9 {
        end = start + TAU;
    }
    (start, end)
}

fn check_sweep(t0: f64, t1: f64) -> Result<()> {
    if t1 - t0 > TAU + 1e-9 {
        return Err(Error::curve(format!(
            "conic interval [{t0}, {t1}] exceeds one period"
        )));
    }
    Ok(())
}

/// Express `angle` in the period closest to `[start, end]`
fn nearest_angle(angle: f64, start: f64, end: f64) -> f64 {
    let sweep = end - start;
    let rel = (angle - start).rem_euclid(TAU);
    // Split the uncovered part of the circle halfway between end and start
    if rel > sweep + (TAU - sweep) / 2.0 {
        start + rel - TAU
    } else {
        start + rel
    }
}
