// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable session report.

use ifc_brep_geometry::{Diagnostic, Severity};
use serde::{Deserialize, Serialize};

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSeverity {
    Warning,
    Error,
    Fatal,
}

impl From<Severity> for ReportSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
            Severity::Fatal => Self::Fatal,
        }
    }
}

/// One diagnostic raised while reconstructing an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Source entity id.
    pub entity: u32,
    pub severity: ReportSeverity,
    pub message: String,
}

impl From<&Diagnostic> for DiagnosticRecord {
    fn from(d: &Diagnostic) -> Self {
        Self {
            entity: d.entity,
            severity: d.severity.into(),
            message: d.message.clone(),
        }
    }
}

/// Counters kept by a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Extrusions requested.
    pub extrusions: usize,
    /// Solids produced, including mesh fallbacks.
    pub solids: usize,
    /// Solids that fell back to the coarse mesh.
    pub mesh_fallbacks: usize,
    /// Extrusions that failed.
    pub failed_extrusions: usize,
    /// Profiles built from their definitions.
    pub profiles_built: usize,
    /// Profile requests answered from the cache.
    pub profile_cache_hits: usize,
    /// Curve loops assembled.
    pub curves_resolved: usize,
    /// Curve loop requests answered from the cache.
    pub curve_cache_hits: usize,
}

/// Everything a session repaired or rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unit label of reported lengths.
    pub unit: String,
    pub stats: SessionStats,
    pub warning_count: usize,
    pub error_count: usize,
    pub fatal_count: usize,
    pub diagnostics: Vec<DiagnosticRecord>,
}

impl SessionReport {
    pub fn new(unit: impl Into<String>, stats: SessionStats, diagnostics: &[Diagnostic]) -> Self {
        let diagnostics: Vec<DiagnosticRecord> = diagnostics.iter().map(DiagnosticRecord::from).collect();
        let count = |s: ReportSeverity| diagnostics.iter().filter(|d| d.severity == s).count();
        Self {
            unit: unit.into(),
            stats,
            warning_count: count(ReportSeverity::Warning),
            error_count: count(ReportSeverity::Error),
            fatal_count: count(ReportSeverity::Fatal),
            diagnostics,
        }
    }

    /// Diagnostics raised for `entity`
    pub fn for_entity(&self, entity: u32) -> impl Iterator<Item = &DiagnosticRecord> {
        self.diagnostics.iter().filter(move |d| d.entity == entity)
    }
}
