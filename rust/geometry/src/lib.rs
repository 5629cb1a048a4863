//! IFC-BRep Geometry Reconstruction
//!
//! Boundary-representation reconstruction of IFC profile geometry: composite
//! curves assembled and repaired under a tolerance context, parametric and
//! arbitrary profiles, and extrusions split by material layer sets. Solids
//! are produced through the [`SolidBuilder`] service; [`MeshSolidBuilder`]
//! is a triangle-mesh implementation using earcutr for the caps.

pub mod tolerance;
pub mod diagnostics;
pub mod error;
pub mod curve;
pub mod intersect;
pub mod curve_loop;
pub mod composite;
pub mod profile;
pub mod profiles;
pub mod arena;
pub mod material;
pub mod solid;
pub mod mesh;
pub mod triangulation;
pub mod mesh_solid;
pub mod extrusion;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point2, Point3, Vector2, Vector3};

pub use arena::{CurveKey, GeometryArena, ProfileKey};
pub use composite::CompositeCurveAssembler;
pub use curve::{CurveKind, CurveSegment, Frame};
pub use curve_loop::CurveLoop;
pub use diagnostics::{
    report_fatal, Diagnostic, DiagnosticLog, Diagnostics, EntityId, Severity, TracingDiagnostics,
};
pub use error::{Error, Result};
pub use extrusion::{heal_open_loop, ExtrudedSolid, ExtrusionRequest, ExtrusionSolidSynthesizer};
pub use intersect::{intersect, Carrier};
pub use material::{DirectionSense, LayerAxis, Material, MaterialLayer, MaterialLayerUsage};
pub use mesh::Mesh;
pub use mesh_solid::MeshSolidBuilder;
pub use profile::{Placement2D, Profile, ProfileCurve};
pub use profiles::{FalloffReason, ProfileBuilder, ProfileDef, ShapeParams};
pub use solid::SolidBuilder;
pub use tolerance::ToleranceContext;
pub use triangulation::triangulate_polygon_with_holes;
