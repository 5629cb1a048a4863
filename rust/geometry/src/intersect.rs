// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unbounded carrier curves and their planar intersections
//!
//! Used to rebuild corners after offsetting (material layers, centre-line
//! thickening) and to compute sloped section vertices.

use crate::curve::{CurveSegment, Frame};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use smallvec::SmallVec;
use std::f64::consts::TAU;

/// Intersection results never exceed two points for line/circle carriers
pub type Hits = SmallVec<[Point3<f64>; 2]>;

/// Infinite line or full circle underlying a bounded segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Carrier {
    Line {
        origin: Point3<f64>,
        direction: Vector3<f64>,
    },
    Circle {
        frame: Frame,
        radius: f64,
    },
}

impl Carrier {
    /// Parallel carrier at `distance` to the left (about `normal`).
    /// Returns `None` when a circle would collapse.
    pub fn offset(&self, distance: f64, normal: &Vector3<f64>) -> Option<Self> {
        match *self {
            Self::Line { origin, direction } => Some(Self::Line {
                origin: origin + normal.cross(&direction) * distance,
                direction,
            }),
            Self::Circle { frame, radius } => {
                let r = if frame.normal().dot(normal) >= 0.0 {
                    radius - distance
                } else {
                    radius + distance
                };
                (r > 0.0).then_some(Self::Circle { frame, radius: r })
            }
        }
    }

    /// Period of the carrier parameter, if it is cyclic
    pub fn period(&self) -> Option<f64> {
        match self {
            Self::Line { .. } => None,
            Self::Circle { .. } => Some(TAU),
        }
    }

    /// Line: signed distance along the direction. Circle: angle in `[0, 2π)`.
    pub fn param_of(&self, point: &Point3<f64>) -> f64 {
        match self {
            Self::Line { origin, direction } => (point - origin).dot(direction),
            Self::Circle { frame, .. } => {
                let (u, v) = frame.to_local(point);
                v.atan2(u).rem_euclid(TAU)
            }
        }
    }

    pub fn point_at(&self, t: f64) -> Point3<f64> {
        match self {
            Self::Line { origin, direction } => origin + direction * t,
            Self::Circle { frame, radius } => frame.to_world(radius * t.cos(), radius * t.sin()),
        }
    }

    /// Euclidean distance from `point` to the carrier
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        match self {
            Self::Line { origin, direction } => {
                let d = point - origin;
                (d - direction * d.dot(direction)).norm()
            }
            Self::Circle { frame, radius } => {
                let (u, v) = frame.to_local(point);
                let h = (point - frame.origin).dot(&frame.normal());
                let rho = (u * u + v * v).sqrt();
                (h * h + (rho - radius).powi(2)).sqrt()
            }
        }
    }

    /// Signed in-plane offset of `point` from the carrier, positive to the left
    /// of the carrier's natural direction about `normal`
    pub fn signed_offset(&self, point: &Point3<f64>, normal: &Vector3<f64>) -> f64 {
        match self {
            Self::Line { origin, direction } => (point - origin).dot(&normal.cross(direction)),
            Self::Circle { frame, radius } => {
                let (u, v) = frame.to_local(point);
                let rho = (u * u + v * v).sqrt();
                if frame.normal().dot(normal) >= 0.0 {
                    radius - rho
                } else {
                    rho - radius
                }
            }
        }
    }

    /// Whether two carriers run parallel (lines with parallel directions or
    /// concentric circles)
    pub fn is_parallel_to(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (Self::Line { direction: a, .. }, Self::Line { direction: b, .. }) => {
                a.cross(b).norm() <= tolerance.max(1e-9)
            }
            (Self::Circle { frame: a, .. }, Self::Circle { frame: b, .. }) => {
                (a.origin - b.origin).norm() <= tolerance && a.normal().cross(&b.normal()).norm() <= 1e-6
            }
            _ => false,
        }
    }

    /// Bounded piece of the carrier from `from` to `to`. For circles,
    /// `counter_clockwise` selects the direction of travel about the circle's
    /// own frame normal.
    pub fn segment_between(
        &self,
        from: Point3<f64>,
        to: Point3<f64>,
        counter_clockwise: bool,
    ) -> CurveSegment {
        match *self {
            Self::Line { .. } => CurveSegment::line(from, to),
            Self::Circle { frame, radius } => {
                let a = self.param_of(&from);
                let b = self.param_of(&to);
                if counter_clockwise {
                    CurveSegment::arc(frame, radius, a, b)
                } else {
                    CurveSegment::arc(frame, radius, b, a).reversed()
                }
            }
        }
    }
}

/// Distance between two carrier parameters, wrapping for cyclic carriers
pub fn param_distance(a: f64, b: f64, period: Option<f64>) -> f64 {
    match period {
        Some(p) => {
            let d = (a - b).rem_euclid(p);
            d.min(p - d)
        }
        None => (a - b).abs(),
    }
}

/// Intersect two carriers lying in `plane`.
///
/// Both carriers are projected into the plane first. Tangent contacts yield a
/// single point; parallel lines and disjoint circles yield none.
pub fn intersect(a: &Carrier, b: &Carrier, plane: &Frame) -> Hits {
    let to2 = |p: &Point3<f64>| {
        let (u, v) = plane.to_local(p);
        Point2::new(u, v)
    };
    let dir2 = |d: &Vector3<f64>| Vector2::new(d.dot(&plane.x_axis), d.dot(&plane.y_axis));

    let hits2: SmallVec<[Point2<f64>; 2]> = match (a, b) {
        (
            Carrier::Line {
                origin: o1,
                direction: d1,
            },
            Carrier::Line {
                origin: o2,
                direction: d2,
            },
        ) => line_line_2d(&to2(o1), &dir2(d1), &to2(o2), &dir2(d2))
            .into_iter()
            .collect(),
        (Carrier::Line { origin, direction }, Carrier::Circle { frame, radius })
        | (Carrier::Circle { frame, radius }, Carrier::Line { origin, direction }) => {
            line_circle_2d(&to2(origin), &dir2(direction), &to2(&frame.origin), *radius)
        }
        (
            Carrier::Circle {
                frame: f1,
                radius: r1,
            },
            Carrier::Circle {
                frame: f2,
                radius: r2,
            },
        ) => circle_circle_2d(&to2(&f1.origin), *r1, &to2(&f2.origin), *r2),
    };

    hits2.iter().map(|p| plane.to_world(p.x, p.y)).collect()
}

/// Intersection of two 2D lines given as point + direction
pub fn line_line_2d(
    p1: &Point2<f64>,
    d1: &Vector2<f64>,
    p2: &Point2<f64>,
    d2: &Vector2<f64>,
) -> Option<Point2<f64>> {
    let denom = d1.x * d2.y - d1.y * d2.x;
    let scale = d1.norm() * d2.norm();
    if scale < 1e-15 || denom.abs() < 1e-12 * scale {
        return None;
    }
    let w = p2 - p1;
    let t = (w.x * d2.y - w.y * d2.x) / denom;
    Some(p1 + d1 * t)
}

fn line_circle_2d(
    origin: &Point2<f64>,
    direction: &Vector2<f64>,
    center: &Point2<f64>,
    radius: f64,
) -> SmallVec<[Point2<f64>; 2]> {
    let mut out = SmallVec::new();
    let Some(d) = direction.try_normalize(1e-15) else {
        return out;
    };
    let w = origin - center;
    let b = w.dot(&d);
    let c = w.norm_squared() - radius * radius;
    let disc = b * b - c;
    let eps = 1e-12 * radius.max(1.0).powi(2);
    if disc < -eps {
        return out;
    }
    if disc.abs() <= eps {
        out.push(origin + d * (-b));
        return out;
    }
    let s = disc.sqrt();
    out.push(origin + d * (-b - s));
    out.push(origin + d * (-b + s));
    out
}

fn circle_circle_2d(
    c1: &Point2<f64>,
    r1: f64,
    c2: &Point2<f64>,
    r2: f64,
) -> SmallVec<[Point2<f64>; 2]> {
    let mut out = SmallVec::new();
    let delta = c2 - c1;
    let d = delta.norm();
    if d < 1e-12 {
        return out;
    }
    let eps = 1e-9 * r1.max(r2).max(1.0);
    if d > r1 + r2 + eps || d < (r1 - r2).abs() - eps {
        return out;
    }
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h2 = r1 * r1 - a * a;
    let u = delta / d;
    let base = c1 + u * a;
    if h2 <= eps * eps {
        out.push(base);
        return out;
    }
    let h = h2.sqrt();
    let perp = Vector2::new(-u.y, u.x);
    out.push(base + perp * h);
    out.push(base - perp * h);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane() -> Frame {
        Frame::xy(Point3::origin())
    }

    #[test]
    fn test_line_line() {
        let a = Carrier::Line {
            origin: Point3::new(0.0, 0.0, 0.0),
            direction: Vector3::x(),
        };
        let b = Carrier::Line {
            origin: Point3::new(2.0, -1.0, 0.0),
            direction: Vector3::y(),
        };
        let hits = intersect(&a, &b, &plane());
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_parallel_lines_do_not_meet() {
        let a = Carrier::Line {
            origin: Point3::origin(),
            direction: Vector3::x(),
        };
        let b = Carrier::Line {
            origin: Point3::new(0.0, 1.0, 0.0),
            direction: Vector3::x(),
        };
        assert!(intersect(&a, &b, &plane()).is_empty());
        assert!(a.is_parallel_to(&b, 1e-9));
    }

    #[test]
    fn test_line_circle_two_hits() {
        let line = Carrier::Line {
            origin: Point3::new(-5.0, 0.0, 0.0),
            direction: Vector3::x(),
        };
        let circle = Carrier::Circle {
            frame: plane(),
            radius: 2.0,
        };
        let hits = intersect(&line, &circle, &plane());
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0], Point3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(hits[1], Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_circle_circle() {
        let a = Carrier::Circle {
            frame: plane(),
            radius: 1.0,
        };
        let b = Carrier::Circle {
            frame: Frame::xy(Point3::new(1.0, 0.0, 0.0)),
            radius: 1.0,
        };
        let hits = intersect(&a, &b, &plane());
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_relative_eq!(hit.x, 0.5, epsilon = 1e-12);
            assert_relative_eq!(hit.y.abs(), 0.75f64.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_offset_and_signed_offset() {
        let z = Vector3::z();
        let line = Carrier::Line {
            origin: Point3::origin(),
            direction: Vector3::x(),
        };
        let shifted = line.offset(0.25, &z).unwrap();
        assert_relative_eq!(shifted.signed_offset(&Point3::origin(), &z), -0.25);
        assert_relative_eq!(line.signed_offset(&Point3::new(3.0, 0.25, 0.0), &z), 0.25);

        let circle = Carrier::Circle {
            frame: plane(),
            radius: 1.0,
        };
        assert!(circle.offset(1.5, &z).is_none());
        assert!(circle.offset(-1.5, &z).is_some());
    }

    #[test]
    fn test_param_distance_wraps() {
        assert_relative_eq!(param_distance(0.1, TAU - 0.1, Some(TAU)), 0.2, epsilon = 1e-12);
        assert_relative_eq!(param_distance(0.1, 5.0, None), 4.9);
    }
}
