// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration loaded from environment variables.

use ifc_brep_geometry::mesh_solid::{DEFAULT_ARC_SEGMENTS, DEFAULT_COARSE_ARC_SEGMENTS};
use ifc_brep_geometry::tolerance::{DEFAULT_SHORT_CURVE_TOLERANCE, DEFAULT_VERTEX_EPSILON};
use ifc_brep_geometry::{MeshSolidBuilder, ToleranceContext};

/// Session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Point-coincidence tolerance in metres.
    pub vertex_tolerance: f64,
    /// Length below which a curve is degenerate, in metres.
    pub short_curve_tolerance: f64,
    /// Metres per project length unit (0.001 for millimetres).
    pub length_unit_scale: f64,
    /// Unit label used in diagnostics; derived from the scale when unset.
    pub unit_label: Option<String>,
    /// Arc tessellation density of the mesh solid service.
    pub arc_segments: usize,
    /// Arc tessellation density of the coarse mesh fallback.
    pub coarse_arc_segments: usize,
    /// Echo every diagnostic to `tracing` as it is recorded.
    pub trace_diagnostics: bool,
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`; missing or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            vertex_tolerance: lookup("IFC_BREP_VERTEX_TOLERANCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_VERTEX_EPSILON),
            short_curve_tolerance: lookup("IFC_BREP_SHORT_CURVE_TOLERANCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SHORT_CURVE_TOLERANCE),
            length_unit_scale: lookup("IFC_BREP_LENGTH_UNIT_SCALE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
            unit_label: lookup("IFC_BREP_UNIT_LABEL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            arc_segments: lookup("IFC_BREP_ARC_SEGMENTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ARC_SEGMENTS),
            coarse_arc_segments: lookup("IFC_BREP_COARSE_ARC_SEGMENTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COARSE_ARC_SEGMENTS),
            trace_diagnostics: lookup("IFC_BREP_TRACE_DIAGNOSTICS")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Built-in defaults, ignoring the environment
    pub fn defaults() -> Self {
        Self::from_lookup(|_| None)
    }

    pub fn tolerance(&self) -> ToleranceContext {
        let tolerance = ToleranceContext::new(
            self.vertex_tolerance,
            self.short_curve_tolerance,
            self.length_unit_scale,
        );
        match &self.unit_label {
            Some(label) => tolerance.with_unit_label(label.clone()),
            None => tolerance,
        }
    }

    pub fn mesh_builder(&self) -> MeshSolidBuilder {
        MeshSolidBuilder::new(self.arc_segments, self.coarse_arc_segments)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
