// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort reconstruction of the current entity
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Two logically adjacent composite segments are further apart than the gap tolerance.
    /// `gap` and `threshold` are expressed in display units.
    #[error("Gap of {gap:.6} {unit} between segments {previous} and {index} exceeds the gap tolerance of {threshold:.6} {unit}")]
    UnrepairableGap {
        previous: usize,
        index: usize,
        gap: f64,
        threshold: f64,
        unit: String,
    },

    /// Gap within tolerance, but neither side is a line and a connector would be too short.
    #[error("Gap of {gap:.6} {unit} between segments {previous} and {index} is unrepairable: both curves are curved and the gap is too short for a connector")]
    UnrepairableCurvedGap {
        previous: usize,
        index: usize,
        gap: f64,
        unit: String,
    },

    #[error("Degenerate curve: {0}")]
    DegenerateCurve(String),

    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Material layer decomposition failed: {0}")]
    LayerDecomposition(String),

    #[error("Solid construction failed: {0}")]
    SolidConstruction(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Unknown handle: {0}")]
    NotFound(String),
}

impl Error {
    pub fn profile(message: impl Into<String>) -> Self {
        Self::InvalidProfile(message.into())
    }

    pub fn curve(message: impl Into<String>) -> Self {
        Self::InvalidCurve(message.into())
    }

    pub fn extrusion(message: impl Into<String>) -> Self {
        Self::InvalidExtrusion(message.into())
    }
}
