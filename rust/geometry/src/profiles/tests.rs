// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;
use crate::arena::GeometryArena;
use crate::curve::{CurveKind, CurveSegment, Frame};
use crate::diagnostics::{DiagnosticLog, Severity};
use crate::error::Error;
use crate::profile::{Placement2D, ProfileCurve};
use approx::assert_relative_eq;
use nalgebra::{Point2, Point3, Vector2, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

const SEGMENTS: usize = 256;

fn build(shape: ShapeParams) -> (crate::error::Result<Profile>, DiagnosticLog) {
    let tol = ToleranceContext::default();
    let mut log = DiagnosticLog::new();
    let result = ProfileBuilder::new(&tol).build_parametric(&shape, None, &mut log, 42);
    (result, log)
}

fn arc_count(profile: &Profile) -> usize {
    profile
        .outer
        .segments()
        .iter()
        .filter(|s| s.kind() == CurveKind::Arc)
        .count()
}

fn i_shape(fillet: f64) -> ShapeParams {
    ShapeParams::IShape(IShapeParams {
        overall_width: Some(0.2),
        overall_depth: Some(0.3),
        web_thickness: Some(0.01),
        flange_thickness: Some(0.015),
        fillet_radius: Some(fillet),
    })
}

fn c_shape(fillet: f64) -> ShapeParams {
    ShapeParams::CShape(CShapeParams {
        depth: Some(0.2),
        width: Some(0.075),
        wall_thickness: Some(0.003),
        girth: Some(0.02),
        internal_fillet_radius: Some(fillet),
    })
}

fn l_shape(fillet: f64, edge: f64) -> ShapeParams {
    ShapeParams::LShape(LShapeParams {
        depth: Some(0.1),
        width: None,
        thickness: Some(0.01),
        fillet_radius: Some(fillet),
        edge_radius: Some(edge),
    })
}

fn z_shape(fillet: f64) -> ShapeParams {
    ShapeParams::ZShape(ZShapeParams {
        depth: Some(0.2),
        flange_width: Some(0.08),
        web_thickness: Some(0.006),
        flange_thickness: Some(0.01),
        fillet_radius: Some(fillet),
        edge_radius: Some(fillet / 2.0),
    })
}

fn t_shape() -> TShapeParams {
    TShapeParams {
        depth: Some(0.3),
        flange_width: Some(0.2),
        web_thickness: Some(0.01),
        flange_thickness: Some(0.02),
        ..TShapeParams::default()
    }
}

fn u_shape() -> UShapeParams {
    UShapeParams {
        depth: Some(0.2),
        flange_width: Some(0.075),
        web_thickness: Some(0.0085),
        flange_thickness: Some(0.0115),
        ..UShapeParams::default()
    }
}

#[test]
fn test_rounded_rectangle_scenario() {
    let (result, log) = build(ShapeParams::Rectangle(RectangleParams::new(4.0, 2.0).rounded(0.3)));
    let profile = result.unwrap();
    let segments = profile.outer.segments();

    assert_eq!(segments.len(), 8);
    assert_eq!(arc_count(&profile), 4);
    for arc in segments.iter().filter(|s| s.kind() == CurveKind::Arc) {
        assert_relative_eq!(arc.sweep(), FRAC_PI_2, epsilon = 1e-12);
    }
    let expected = 2.0 * (4.0 + 2.0) - 8.0 * 0.3 + 2.0 * PI * 0.3;
    assert_relative_eq!(profile.outer.length(), expected, epsilon = 1e-9);
    assert!(log.is_empty());
}

#[test]
fn test_plain_rectangle_is_four_lines() {
    let (result, _) = build(ShapeParams::Rectangle(RectangleParams::new(10.0, 5.0)));
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 4);
    assert!(profile.outer.segments().iter().all(CurveSegment::is_line));
    assert_relative_eq!(
        profile.outer.start_point().unwrap(),
        Point3::new(-5.0, -2.5, 0.0)
    );
    assert_relative_eq!(profile.area(SEGMENTS), 50.0, epsilon = 1e-9);
}

#[test]
fn test_oversized_rounding_warns_and_stays_sharp() {
    let (result, log) = build(ShapeParams::Rectangle(RectangleParams::new(4.0, 2.0).rounded(1.0)));
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 4);
    assert_eq!(log.warnings().count(), 1);
}

#[test]
fn test_every_shape_is_closed() {
    let tol = ToleranceContext::default();
    let shapes = [
        ShapeParams::Rectangle(RectangleParams::new(0.4, 0.2).rounded(0.05)),
        ShapeParams::RectangleHollow(RectangleHollowParams::new(0.3, 0.2, 0.01).with_fillets(0.01, 0.02)),
        ShapeParams::Circle(CircleParams { radius: Some(0.1) }),
        ShapeParams::CircleHollow(CircleHollowParams {
            radius: Some(0.1),
            wall_thickness: Some(0.005),
        }),
        ShapeParams::Ellipse(EllipseParams {
            semi_axis1: Some(0.3),
            semi_axis2: Some(0.1),
        }),
        c_shape(0.003),
        c_shape(0.0),
        i_shape(0.012),
        i_shape(0.0),
        l_shape(0.008, 0.004),
        l_shape(0.0, 0.0),
        ShapeParams::TShape(t_shape()),
        ShapeParams::UShape(u_shape()),
        z_shape(0.008),
        z_shape(0.0),
    ];

    for shape in shapes {
        let (result, log) = build(shape);
        let profile = result.unwrap_or_else(|e| panic!("{} failed: {e}", shape.name()));
        assert!(profile.outer.is_closed(&tol), "{} outer loop is open", shape.name());
        for hole in &profile.inner {
            assert!(hole.is_closed(&tol), "{} inner loop is open", shape.name());
        }
        assert!(log.is_empty(), "{} logged {:?}", shape.name(), log.entries());
        assert!(profile.area(SEGMENTS) > 0.0);
    }
}

#[test]
fn test_fillet_fallback_always_yields_polygon() {
    // Radii far too large for the section: every filleted attempt fails
    let shapes = [
        (i_shape(0.5), 12),
        (c_shape(0.5), 12),
        (z_shape(0.5), 8),
        (
            ShapeParams::RectangleHollow(RectangleHollowParams::new(0.3, 0.2, 0.01).with_fillets(0.5, 0.5)),
            4,
        ),
    ];
    for (shape, lines) in shapes {
        let (result, log) = build(shape);
        let profile = result.unwrap_or_else(|e| panic!("{} failed: {e}", shape.name()));
        assert_eq!(profile.outer.len(), lines, "{}", shape.name());
        assert_eq!(arc_count(&profile), 0);
        assert!(log.warnings().count() >= 1, "{} gave no warning", shape.name());
        assert_eq!(log.errors().count(), 0);
    }
}

#[test]
fn test_fillet_that_does_not_fit_the_web_falls_back() {
    // Flange overhang of 0.095 cannot take a 0.2 fillet
    let (result, log) = build(i_shape(0.2));
    let profile = result.unwrap();
    assert_eq!(arc_count(&profile), 0);
    let warning = &log.entries()[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.message.contains("web fillets"));
}

#[test]
fn test_i_shape_area() {
    let (result, _) = build(i_shape(0.0));
    let area = result.unwrap().area(SEGMENTS);
    assert_relative_eq!(area, 0.2 * 0.3 - 0.19 * 0.27, epsilon = 1e-12);
}

#[test]
fn test_filleted_i_shape_adds_fillet_area() {
    let r: f64 = 0.012;
    let (plain, _) = build(i_shape(0.0));
    let (rounded, _) = build(i_shape(r));
    let rounded = rounded.unwrap();
    assert_eq!(arc_count(&rounded), 4);
    let added = 4.0 * (r * r - PI * r * r / 4.0);
    assert_relative_eq!(
        rounded.area(4096),
        plain.unwrap().area(SEGMENTS) + added,
        epsilon = 1e-7
    );
}

#[test]
fn test_l_shape_all_stages_filleted() {
    let (result, log) = build(l_shape(0.008, 0.004));
    let profile = result.unwrap();
    assert_eq!(arc_count(&profile), 3);
    assert_eq!(profile.outer.len(), 9);
    assert!(log.is_empty());
}

#[test]
fn test_l_shape_edge_fillet_falls_back_per_stage() {
    // Edge radius exceeds the leg thickness; root fillet still fits
    let (result, log) = build(l_shape(0.008, 0.02));
    let profile = result.unwrap();
    assert_eq!(arc_count(&profile), 1);
    assert_eq!(log.warnings().count(), 2);
    assert!(log.entries().iter().all(|d| d.message.contains("edge fillet")));
    assert_relative_eq!(
        profile.area(4096),
        0.01 * 0.19 + 0.008 * 0.008 * (1.0 - PI / 4.0),
        epsilon = 1e-7
    );
}

#[test]
fn test_l_shape_width_defaults_to_depth() {
    let (result, _) = build(l_shape(0.0, 0.0));
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 6);
    assert_relative_eq!(profile.area(SEGMENTS), 0.01 * 0.19, epsilon = 1e-12);
}

#[test]
fn test_t_shape_web_slope_narrows_toe() {
    let params = TShapeParams {
        web_slope: Some(0.02),
        ..t_shape()
    };
    let (result, log) = build(ShapeParams::TShape(params));
    let profile = result.unwrap();
    let toe = profile.outer.segments()[0].length();
    assert!(toe < 0.01);
    assert!(toe > 0.0);
    assert!(log.is_empty());

    let (plain, _) = build(ShapeParams::TShape(t_shape()));
    assert_relative_eq!(plain.unwrap().outer.segments()[0].length(), 0.01, epsilon = 1e-12);
}

#[test]
fn test_t_shape_flange_slope_thins_tips() {
    let params = TShapeParams {
        flange_slope: Some(0.05),
        ..t_shape()
    };
    let (result, _) = build(ShapeParams::TShape(params));
    let profile = result.unwrap();
    // Tip edge is the fourth segment (flange tip, vertical)
    let tip = profile.outer.segments()[3];
    assert!(tip.length() < 0.02);
    // The underside pivots about its midpoint, so the area is unchanged
    let (plain, _) = build(ShapeParams::TShape(t_shape()));
    assert_relative_eq!(profile.area(SEGMENTS), plain.unwrap().area(SEGMENTS), epsilon = 1e-9);
}

#[test]
fn test_t_and_u_fillets_are_ignored_with_warning() {
    let t = TShapeParams {
        fillet_radius: Some(0.01),
        ..t_shape()
    };
    let (result, log) = build(ShapeParams::TShape(t));
    assert_eq!(arc_count(&result.unwrap()), 0);
    assert_eq!(log.warnings().count(), 1);

    let u = UShapeParams {
        edge_radius: Some(0.005),
        ..u_shape()
    };
    let (result, log) = build(ShapeParams::UShape(u));
    assert_eq!(arc_count(&result.unwrap()), 0);
    assert_eq!(log.warnings().count(), 1);
}

#[test]
fn test_u_shape_slope_keeps_eight_vertices() {
    let params = UShapeParams {
        flange_slope: Some(0.08),
        ..u_shape()
    };
    let (result, _) = build(ShapeParams::UShape(params));
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 8);
    let (plain, _) = build(ShapeParams::UShape(u_shape()));
    let plain_area = plain.unwrap().area(SEGMENTS);
    assert_relative_eq!(
        plain_area,
        0.2 * 0.075 - (0.075 - 0.0085) * (0.2 - 2.0 * 0.0115),
        epsilon = 1e-12
    );
    // Slope adds material at the root and removes it at the tip equally
    assert_relative_eq!(profile.area(SEGMENTS), plain_area, epsilon = 1e-9);
}

#[test]
fn test_circle_is_two_half_arcs() {
    let (result, _) = build(ShapeParams::Circle(CircleParams { radius: Some(0.5) }));
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 2);
    for half in profile.outer.segments() {
        assert_eq!(half.kind(), CurveKind::Arc);
        assert_relative_eq!(half.sweep(), PI, epsilon = 1e-12);
    }
}

#[test]
fn test_hollow_circle_inner_loop_is_reversed() {
    let (result, _) = build(ShapeParams::CircleHollow(CircleHollowParams {
        radius: Some(0.5),
        wall_thickness: Some(0.1),
    }));
    let profile = result.unwrap();
    assert_eq!(profile.inner.len(), 1);
    assert_eq!(profile.inner[0].len(), 2);
    let z = Vector3::z();
    assert!(profile.outer.signed_area(&z, SEGMENTS) > 0.0);
    assert!(profile.inner[0].signed_area(&z, SEGMENTS) < 0.0);
    assert_relative_eq!(profile.area(4096), PI * (0.25 - 0.16), epsilon = 1e-4);
}

#[test]
fn test_ellipse_halves() {
    let (result, _) = build(ShapeParams::Ellipse(EllipseParams {
        semi_axis1: Some(2.0),
        semi_axis2: Some(1.0),
    }));
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 2);
    assert_relative_eq!(profile.outer.segments()[0].end_point(), Point3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
}

#[test]
fn test_missing_or_bad_dimensions_are_invalid() {
    let (result, _) = build(ShapeParams::Rectangle(RectangleParams {
        x_dim: Some(1.0),
        ..RectangleParams::default()
    }));
    assert!(matches!(result, Err(Error::InvalidProfile(msg)) if msg.contains("YDim")));

    let (result, _) = build(ShapeParams::Circle(CircleParams { radius: Some(-1.0) }));
    assert!(matches!(result, Err(Error::InvalidProfile(_))));

    let (result, _) = build(ShapeParams::RectangleHollow(RectangleHollowParams::new(0.2, 0.2, 0.1)));
    assert!(matches!(result, Err(Error::InvalidProfile(_))));

    let (result, _) = build(ShapeParams::CircleHollow(CircleHollowParams {
        radius: Some(0.1),
        wall_thickness: Some(0.2),
    }));
    assert!(matches!(result, Err(Error::InvalidProfile(_))));
}

#[test]
fn test_build_reports_fatal_errors_once() {
    let tol = ToleranceContext::default();
    let arena = GeometryArena::new();
    let mut log = DiagnosticLog::new();
    let def = ProfileDef::parametric(ShapeParams::Circle(CircleParams::default()));
    let result = ProfileBuilder::new(&tol).build(&def, &arena, &mut log, 5);
    assert!(result.is_err());
    assert_eq!(log.len(), 1);
    assert_eq!(log.entries()[0].severity, Severity::Fatal);
    assert_eq!(log.entries()[0].entity, 5);
}

#[test]
fn test_placement_moves_profile() {
    let tol = ToleranceContext::default();
    let mut log = DiagnosticLog::new();
    let placement = Placement2D::new(Point2::new(1.0, 2.0), Vector2::new(0.0, 1.0));
    let profile = ProfileBuilder::new(&tol)
        .build_parametric(
            &ShapeParams::Rectangle(RectangleParams::new(4.0, 2.0)),
            Some(&placement),
            &mut log,
            1,
        )
        .unwrap();
    // Local (-2, -1) rotated a quarter turn lands at (1, -2), then moves by (1, 2)
    assert_relative_eq!(
        profile.outer.start_point().unwrap(),
        Point3::new(2.0, 0.0, 0.0),
        epsilon = 1e-12
    );
    assert_relative_eq!(profile.area(SEGMENTS), 8.0, epsilon = 1e-9);
}

#[test]
fn test_build_is_deterministic() {
    let (a, _) = build(l_shape(0.008, 0.004));
    let (b, _) = build(l_shape(0.008, 0.004));
    assert_eq!(a.unwrap(), b.unwrap());
}

// --- Arbitrary profiles ---

fn square_polyline(size: f64, origin: (f64, f64)) -> ProfileCurve {
    let (x, y) = origin;
    ProfileCurve::Polyline(vec![
        Point3::new(x, y, 0.0),
        Point3::new(x + size, y, 0.0),
        Point3::new(x + size, y + size, 0.0),
        Point3::new(x, y + size, 0.0),
        Point3::new(x, y, 0.0),
    ])
}

fn build_def(arena: &GeometryArena, def: &ProfileDef) -> (crate::error::Result<Profile>, DiagnosticLog) {
    let tol = ToleranceContext::default();
    let mut log = DiagnosticLog::new();
    let result = ProfileBuilder::new(&tol).build(def, arena, &mut log, 9);
    (result, log)
}

#[test]
fn test_arbitrary_closed_with_voids() {
    let mut arena = GeometryArena::new();
    let outer = arena.add_curve(square_polyline(10.0, (0.0, 0.0)));
    let hole = arena.add_curve(square_polyline(2.0, (4.0, 4.0)));
    let degenerate = arena.add_curve(ProfileCurve::Polyline(vec![
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ]));
    let def = ProfileDef::ArbitraryClosed {
        outer,
        voids: vec![Some(hole), None, Some(degenerate)],
    };

    let (result, log) = build_def(&arena, &def);
    let profile = result.unwrap();
    assert_eq!(profile.inner.len(), 1);
    assert_relative_eq!(profile.area(SEGMENTS), 96.0, epsilon = 1e-9);
    assert_eq!(log.warnings().count(), 2);
    assert_eq!(log.errors().count(), 0);
}

#[test]
fn test_duplicate_or_outer_void_is_fatal() {
    let mut arena = GeometryArena::new();
    let outer = arena.add_curve(square_polyline(10.0, (0.0, 0.0)));
    let hole = arena.add_curve(square_polyline(2.0, (4.0, 4.0)));

    let duplicate = ProfileDef::ArbitraryClosed {
        outer,
        voids: vec![Some(hole), Some(hole)],
    };
    let (result, log) = build_def(&arena, &duplicate);
    assert!(matches!(result, Err(Error::InvalidProfile(_))));
    assert_eq!(log.errors().count(), 1);

    let same = ProfileDef::ArbitraryClosed {
        outer,
        voids: vec![Some(outer)],
    };
    let (result, _) = build_def(&arena, &same);
    assert!(matches!(result, Err(Error::InvalidProfile(_))));
}

#[test]
fn test_unbounded_circle_is_split() {
    let mut arena = GeometryArena::new();
    let circle = arena.add_curve(ProfileCurve::Circle {
        frame: Frame::xy(Point3::new(1.0, 1.0, 0.0)),
        radius: 0.5,
    });
    let (result, _) = build_def(&arena, &ProfileDef::ArbitraryClosed { outer: circle, voids: vec![] });
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 2);
    assert!(profile.is_closed(&ToleranceContext::default()));
}

#[test]
fn test_open_curve_cannot_close_profile() {
    let mut arena = GeometryArena::new();
    let arc = arena.add_curve(ProfileCurve::Segment(CurveSegment::arc(
        Frame::xy(Point3::origin()),
        1.0,
        0.0,
        PI,
    )));
    let line = arena.add_curve(ProfileCurve::Line {
        origin: Point3::origin(),
        direction: Vector3::x(),
    });

    for outer in [arc, line] {
        let (result, log) = build_def(&arena, &ProfileDef::ArbitraryClosed { outer, voids: vec![] });
        assert!(matches!(result, Err(Error::InvalidProfile(_))));
        assert_eq!(log.errors().count(), 1);
    }
}

#[test]
fn test_open_polyline_or_composite_cannot_close_profile() {
    let mut arena = GeometryArena::new();
    let p = |x: f64, y: f64| Point3::new(x, y, 0.0);
    let polyline = arena.add_curve(ProfileCurve::Polyline(vec![p(0.0, 0.0), p(5.0, 0.0), p(5.0, 5.0)]));
    let composite = arena.add_curve(ProfileCurve::Composite(vec![
        CurveSegment::line(p(0.0, 0.0), p(5.0, 0.0)),
        CurveSegment::line(p(5.0, 0.0), p(5.0, 5.0)),
    ]));

    for outer in [polyline, composite] {
        let (result, log) = build_def(&arena, &ProfileDef::ArbitraryClosed { outer, voids: vec![] });
        assert!(matches!(result, Err(Error::InvalidProfile(_))));
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].severity, Severity::Fatal);
    }
}

#[test]
fn test_gap_below_short_curve_tolerance_is_left_for_healing() {
    let mut arena = GeometryArena::new();
    let p = |x: f64, y: f64| Point3::new(x, y, 0.0);
    let outer = arena.add_curve(ProfileCurve::Polyline(vec![
        p(0.0, 0.0),
        p(10.0, 0.0),
        p(10.0, 10.0),
        p(0.0, 10.0),
        p(0.0007, 0.0),
    ]));
    let (result, log) = build_def(&arena, &ProfileDef::ArbitraryClosed { outer, voids: vec![] });
    let profile = result.unwrap();
    assert!(!profile.is_closed(&ToleranceContext::default()));
    assert_relative_eq!(profile.outer.closure_gap(), 0.0007, epsilon = 1e-12);
    assert!(log.is_empty());
}

#[test]
fn test_open_void_is_fatal() {
    let mut arena = GeometryArena::new();
    let outer = arena.add_curve(square_polyline(10.0, (0.0, 0.0)));
    let half_arc = arena.add_curve(ProfileCurve::Segment(CurveSegment::arc(
        Frame::xy(Point3::new(5.0, 5.0, 0.0)),
        1.0,
        0.0,
        PI,
    )));
    let open_polyline = arena.add_curve(ProfileCurve::Polyline(vec![
        Point3::new(2.0, 2.0, 0.0),
        Point3::new(4.0, 2.0, 0.0),
        Point3::new(4.0, 4.0, 0.0),
    ]));

    for void in [half_arc, open_polyline] {
        let def = ProfileDef::ArbitraryClosed {
            outer,
            voids: vec![Some(void)],
        };
        let (result, log) = build_def(&arena, &def);
        match result {
            Err(Error::InvalidProfile(message)) => assert!(message.starts_with("void 0")),
            other => panic!("expected InvalidProfile, got {other:?}"),
        }
        assert_eq!(log.warnings().count(), 0);
        assert_eq!(log.errors().count(), 1);
    }
}

#[test]
fn test_void_with_unrepairable_gap_is_fatal() {
    let mut arena = GeometryArena::new();
    let p = |x: f64, y: f64| Point3::new(x, y, 0.0);
    let outer = arena.add_curve(square_polyline(10.0, (0.0, 0.0)));
    let void = arena.add_curve(ProfileCurve::Composite(vec![
        CurveSegment::line(p(2.0, 2.0), p(4.0, 2.0)),
        CurveSegment::line(p(4.1, 2.0), p(4.1, 4.0)),
        CurveSegment::line(p(4.1, 4.0), p(2.0, 2.0)),
    ]));
    let def = ProfileDef::ArbitraryClosed {
        outer,
        voids: vec![Some(void)],
    };
    let (result, log) = build_def(&arena, &def);
    assert!(matches!(result, Err(Error::UnrepairableGap { .. })));
    assert_eq!(log.errors().count(), 1);
}

#[test]
fn test_composite_outer_is_assembled() {
    let mut arena = GeometryArena::new();
    let p = |x: f64, y: f64| Point3::new(x, y, 0.0);
    let outer = arena.add_curve(ProfileCurve::Composite(vec![
        CurveSegment::line(p(0.0, 0.0), p(2.0, 0.0)),
        CurveSegment::line(p(2.0, 2.0), p(2.0, 0.0)),
        CurveSegment::arc(Frame::xy(p(1.0, 2.0)), 1.0, 0.0, PI),
        CurveSegment::line(p(0.0, 2.0), p(0.0, 0.0)),
    ]));
    let (result, log) = build_def(&arena, &ProfileDef::ArbitraryClosed { outer, voids: vec![] });
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 4);
    assert!(profile.is_closed(&ToleranceContext::default()));
    assert_relative_eq!(profile.area(4096), 4.0 + PI / 2.0, epsilon = 1e-5);
    assert!(log.is_empty());
}

#[test]
fn test_arbitrary_open_profile() {
    let mut arena = GeometryArena::new();
    let curve = arena.add_curve(ProfileCurve::Polyline(vec![
        Point3::origin(),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ]));
    let (result, _) = build_def(&arena, &ProfileDef::ArbitraryOpen { curve });
    let profile = result.unwrap();
    assert!(profile.is_open);
    assert_eq!(profile.outer.len(), 2);
}

#[test]
fn test_center_line_straight_becomes_rectangle() {
    let mut arena = GeometryArena::new();
    let curve = arena.add_curve(ProfileCurve::Segment(CurveSegment::line(
        Point3::origin(),
        Point3::new(5.0, 0.0, 0.0),
    )));
    let (result, _) = build_def(&arena, &ProfileDef::CenterLine { curve, thickness: 0.2 });
    let profile = result.unwrap();
    assert_eq!(profile.outer.len(), 4);
    assert!(profile.is_closed(&ToleranceContext::default()));
    assert_relative_eq!(profile.area(SEGMENTS), 1.0, epsilon = 1e-9);
    assert!(profile.outer.signed_area(&Vector3::z(), SEGMENTS) > 0.0);
}

#[test]
fn test_center_line_corner_is_mitred() {
    let mut arena = GeometryArena::new();
    let curve = arena.add_curve(ProfileCurve::Polyline(vec![
        Point3::origin(),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 3.0, 0.0),
    ]));
    let (result, _) = build_def(&arena, &ProfileDef::CenterLine { curve, thickness: 0.2 });
    let profile = result.unwrap();
    // Two mitred rails per side plus two caps
    assert_eq!(profile.outer.len(), 6);
    assert_relative_eq!(profile.area(SEGMENTS), 7.0 * 0.2, epsilon = 1e-9);
}

#[test]
fn test_center_line_circle_yields_ring() {
    let mut arena = GeometryArena::new();
    let curve = arena.add_curve(ProfileCurve::Circle {
        frame: Frame::xy(Point3::origin()),
        radius: 1.0,
    });
    let (result, _) = build_def(&arena, &ProfileDef::CenterLine { curve, thickness: 0.2 });
    let profile = result.unwrap();
    assert_eq!(profile.inner.len(), 1);
    assert_relative_eq!(profile.area(4096), PI * (1.1 * 1.1 - 0.9 * 0.9), epsilon = 1e-4);
}

#[test]
fn test_center_line_rejects_bad_thickness() {
    let mut arena = GeometryArena::new();
    let curve = arena.add_curve(ProfileCurve::Segment(CurveSegment::line(
        Point3::origin(),
        Point3::new(1.0, 0.0, 0.0),
    )));
    let (result, _) = build_def(&arena, &ProfileDef::CenterLine { curve, thickness: 0.0 });
    assert!(matches!(result, Err(Error::InvalidProfile(_))));
}
