// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end reconstruction: curves and profile definitions through the
//! arena, extruded into meshes by the reference solid service.

use approx::assert_relative_eq;
use ifc_brep_geometry::profiles::{IShapeParams, RectangleHollowParams, RectangleParams};
use ifc_brep_geometry::{
    CurveSegment, DiagnosticLog, ExtrusionRequest, ExtrusionSolidSynthesizer, Frame, GeometryArena,
    LayerAxis, Material, MaterialLayer, MaterialLayerUsage, MeshSolidBuilder, Point3, ProfileBuilder,
    ProfileCurve, ProfileDef, Severity, ShapeParams, SolidBuilder, ToleranceContext, Vector3,
};
use std::f64::consts::{FRAC_PI_2, PI};

fn p(x: f64, y: f64) -> Point3<f64> {
    Point3::new(x, y, 0.0)
}

#[test]
fn test_repaired_composite_extrudes_to_closed_box() {
    let tol = ToleranceContext::default();
    let mut arena = GeometryArena::new();
    let mut log = DiagnosticLog::new();

    // Second edge authored backwards, third edge starts 2 mm off
    let outline = arena.add_curve(ProfileCurve::Composite(vec![
        CurveSegment::line(p(0.0, 0.0), p(4.0, 0.0)),
        CurveSegment::line(p(4.0, 2.0), p(4.0, 0.0)),
        CurveSegment::line(p(4.002, 2.0), p(0.0, 2.0)),
        CurveSegment::line(p(0.0, 2.0), p(0.0, 0.0)),
    ]));
    let def = arena.add_profile(ProfileDef::ArbitraryClosed {
        outer: outline,
        voids: Vec::new(),
    });

    let profile = ProfileBuilder::new(&tol)
        .build(arena.profile(def).unwrap(), &arena, &mut log, 100)
        .unwrap();
    assert!(profile.is_closed(&tol));
    assert_eq!(log.warnings().count(), 1);

    let builder = MeshSolidBuilder::default();
    let profiles = [profile];
    let request = ExtrusionRequest::new(&profiles, Vector3::z(), Some(3.0));
    let solids = ExtrusionSolidSynthesizer::new(&tol, &builder)
        .synthesize(&request, &mut log, 100)
        .unwrap();

    assert_eq!(solids.len(), 1);
    let mesh = &solids[0].solid;
    assert!(builder.is_valid(mesh));
    assert_relative_eq!(mesh.volume(), 24.0, epsilon = 1e-3);
    assert!(!solids[0].is_mesh_fallback);
}

#[test]
fn test_hollow_section_volume() {
    let tol = ToleranceContext::default();
    let mut log = DiagnosticLog::new();
    let shape = ShapeParams::RectangleHollow(RectangleHollowParams::new(2.0, 1.0, 0.1));
    let profile = ProfileBuilder::new(&tol)
        .build_parametric(&shape, None, &mut log, 7)
        .unwrap();

    let builder = MeshSolidBuilder::default();
    let mesh = builder.extrude(&[profile], &Vector3::z(), 2.0).unwrap();
    assert_relative_eq!(mesh.volume(), (2.0 - 1.8 * 0.8) * 2.0, epsilon = 1e-5);
}

#[test]
fn test_layered_beam_conserves_volume() {
    let tol = ToleranceContext::default();
    let mut log = DiagnosticLog::new();
    let shape = ShapeParams::IShape(IShapeParams {
        overall_width: Some(0.2),
        overall_depth: Some(0.3),
        web_thickness: Some(0.01),
        flange_thickness: Some(0.015),
        fillet_radius: None,
    });
    let profile = ProfileBuilder::new(&tol)
        .build_parametric(&shape, None, &mut log, 8)
        .unwrap();
    let area = 0.2 * 0.3 - 0.19 * 0.27;

    let usage = MaterialLayerUsage::new(
        vec![
            MaterialLayer::new(0.5, Some(Material::new(1, "Coating"))),
            MaterialLayer::new(1.5, Some(Material::new(2, "Steel"))),
        ],
        LayerAxis::AlongExtrusionDepth,
    );
    let builder = MeshSolidBuilder::default();
    let profiles = [profile];
    let request = ExtrusionRequest::new(&profiles, Vector3::z(), Some(2.0)).with_layers(&usage);
    let solids = ExtrusionSolidSynthesizer::new(&tol, &builder)
        .synthesize(&request, &mut log, 8)
        .unwrap();

    assert_eq!(solids.len(), 2);
    assert_relative_eq!(solids[0].solid.volume(), area * 0.5, epsilon = 1e-6);
    assert_relative_eq!(solids[1].solid.volume(), area * 1.5, epsilon = 1e-6);
    let (lower, _) = solids[1].solid.bounds();
    assert_relative_eq!(lower.z, 0.5, epsilon = 1e-6);
    assert!(log.is_empty());
}

#[test]
fn test_curved_layered_wall() {
    let tol = ToleranceContext::default();
    let mut log = DiagnosticLog::new();
    let frame = Frame::xy(Point3::origin());
    let axis = CurveSegment::arc(frame, 5.0, 0.0, FRAC_PI_2);

    let mut arena = GeometryArena::new();
    let outline = arena.add_curve(ProfileCurve::Composite(vec![
        axis,
        CurveSegment::line(p(0.0, 5.0), p(0.0, 5.3)),
        CurveSegment::arc(frame, 5.3, 0.0, FRAC_PI_2).reversed(),
        CurveSegment::line(p(5.3, 0.0), p(5.0, 0.0)),
    ]));
    let def = ProfileDef::ArbitraryClosed {
        outer: outline,
        voids: Vec::new(),
    };
    let profile = ProfileBuilder::new(&tol).build(&def, &arena, &mut log, 3).unwrap();

    let usage = MaterialLayerUsage::new(
        vec![
            MaterialLayer::new(0.1, Some(Material::new(1, "Plaster"))),
            MaterialLayer::new(0.2, Some(Material::new(2, "Block"))),
        ],
        LayerAxis::AlongProfileWidth,
    )
    .with_sense(ifc_brep_geometry::DirectionSense::Negative);

    let builder = MeshSolidBuilder::new(256, 16);
    let profiles = [profile];
    let request = ExtrusionRequest::new(&profiles, Vector3::z(), Some(3.0))
        .with_layers(&usage)
        .with_axis_curve(&axis);
    let solids = ExtrusionSolidSynthesizer::new(&tol, &builder)
        .synthesize(&request, &mut log, 3)
        .unwrap();

    assert_eq!(solids.len(), 2);
    let total: f64 = solids.iter().map(|s| s.solid.volume()).sum();
    assert_relative_eq!(total, PI / 4.0 * (5.3 * 5.3 - 25.0) * 3.0, max_relative = 1e-3);
    assert!(log.entries().iter().all(|d| d.severity == Severity::Warning));
}

#[test]
fn test_placed_rectangle_keeps_volume() {
    let tol = ToleranceContext::default();
    let mut log = DiagnosticLog::new();
    let def = ProfileDef::Parametric {
        shape: ShapeParams::Rectangle(RectangleParams::new(1.0, 0.5).rounded(0.1)),
        position: Some(ifc_brep_geometry::Placement2D::new(
            ifc_brep_geometry::Point2::new(10.0, 5.0),
            ifc_brep_geometry::Vector2::new(0.0, 1.0),
        )),
    };
    let profile = ProfileBuilder::new(&tol)
        .build(&def, &GeometryArena::new(), &mut log, 11)
        .unwrap();

    let mesh = MeshSolidBuilder::new(512, 16)
        .extrude(&[profile], &Vector3::z(), 1.0)
        .unwrap();
    let area = 0.5 - 0.01 * (4.0 - PI);
    assert_relative_eq!(mesh.volume(), area, max_relative = 1e-4);
    let (lower, upper) = mesh.bounds();
    assert_relative_eq!((lower.x + upper.x) / 2.0, 10.0, epsilon = 1e-4);
    assert_relative_eq!((lower.y + upper.y) / 2.0, 5.0, epsilon = 1e-4);
}
