// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerances shared by every reconstruction step.
//!
//! Internal lengths are metres. The unit scale converts file (display) units
//! into metres, e.g. `0.001` for a millimetre project, and is only used to
//! format lengths back into the author's units for diagnostics.

/// Smallest gap the composite-curve assembler is allowed to heal (5 mm).
pub const MIN_GAP_EPSILON: f64 = 0.005;

/// Default point-coincidence tolerance (0.5 mm).
pub const DEFAULT_VERTEX_EPSILON: f64 = 0.0005;

/// Default length below which a curve is considered degenerate (1 mm).
pub const DEFAULT_SHORT_CURVE_TOLERANCE: f64 = 0.001;

/// Angular tolerance used for direction and plane comparisons.
pub const ANGULAR_EPSILON: f64 = 1e-6;

/// Immutable tolerance set for one reconstruction session
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceContext {
    vertex_epsilon: f64,
    gap_epsilon: f64,
    short_curve_tolerance: f64,
    length_unit_scale: f64,
    unit_label: String,
}

impl ToleranceContext {
    /// Create a tolerance context.
    ///
    /// Non-positive or non-finite inputs fall back to the defaults, and the
    /// short-curve tolerance is never allowed below the vertex tolerance.
    pub fn new(vertex_epsilon: f64, short_curve_tolerance: f64, length_unit_scale: f64) -> Self {
        let vertex_epsilon = positive_or(vertex_epsilon, DEFAULT_VERTEX_EPSILON);
        let short_curve_tolerance =
            positive_or(short_curve_tolerance, DEFAULT_SHORT_CURVE_TOLERANCE).max(vertex_epsilon);
        let length_unit_scale = positive_or(length_unit_scale, 1.0);

        Self {
            vertex_epsilon,
            gap_epsilon: vertex_epsilon.max(MIN_GAP_EPSILON),
            short_curve_tolerance,
            length_unit_scale,
            unit_label: default_unit_label(length_unit_scale).to_string(),
        }
    }

    /// Override the label used when formatting lengths.
    pub fn with_unit_label(mut self, label: impl Into<String>) -> Self {
        self.unit_label = label.into();
        self
    }

    #[inline]
    pub fn vertex_epsilon(&self) -> f64 {
        self.vertex_epsilon
    }

    #[inline]
    pub fn gap_epsilon(&self) -> f64 {
        self.gap_epsilon
    }

    #[inline]
    pub fn short_curve_tolerance(&self) -> f64 {
        self.short_curve_tolerance
    }

    #[inline]
    pub fn length_unit_scale(&self) -> f64 {
        self.length_unit_scale
    }

    pub fn unit_label(&self) -> &str {
        &self.unit_label
    }

    /// Convert an internal length (metres) into display units
    #[inline]
    pub fn to_display(&self, length: f64) -> f64 {
        length / self.length_unit_scale
    }

    /// Format an internal length in display units, e.g. `"7.5000 mm"`
    pub fn format_length(&self, length: f64) -> String {
        format!("{:.4} {}", self.to_display(length), self.unit_label)
    }

    /// Two points coincide
    #[inline]
    pub fn is_coincident(&self, distance: f64) -> bool {
        distance < self.vertex_epsilon
    }
}

impl Default for ToleranceContext {
    fn default() -> Self {
        Self::new(DEFAULT_VERTEX_EPSILON, DEFAULT_SHORT_CURVE_TOLERANCE, 1.0)
    }
}

#[inline]
fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn default_unit_label(scale: f64) -> &'static str {
    const KNOWN: [(f64, &str); 5] = [
        (1.0, "m"),
        (0.001, "mm"),
        (0.01, "cm"),
        (0.3048, "ft"),
        (0.0254, "in"),
    ];
    KNOWN
        .iter()
        .find(|(s, _)| ((scale - s) / s).abs() < 1e-9)
        .map(|(_, label)| *label)
        .unwrap_or("units")
}
