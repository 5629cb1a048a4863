// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostics sink
//!
//! Every repair, fallback or rejection emits exactly one diagnostic against
//! the entity being reconstructed. The engine never decides where the
//! messages go: callers plug in [`TracingDiagnostics`], a [`DiagnosticLog`],
//! or their own sink.

/// Stable identifier of the source entity (the STEP instance number)
pub type EntityId = u32;

/// Receives warnings and errors raised during reconstruction
pub trait Diagnostics {
    /// A repair or fallback happened; processing continues.
    fn log_warning(&mut self, entity: EntityId, message: &str);

    /// Something was rejected. `is_fatal` means the entity's reconstruction aborts.
    fn log_error(&mut self, entity: EntityId, message: &str, is_fatal: bool);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log_warning(&mut self, entity: EntityId, message: &str) {
        tracing::warn!(entity, "{}", message);
    }

    fn log_error(&mut self, entity: EntityId, message: &str, is_fatal: bool) {
        tracing::error!(entity, fatal = is_fatal, "{}", message);
    }
}

/// Severity of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// A recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub entity: EntityId,
    pub severity: Severity,
    pub message: String,
}

/// In-memory diagnostics sink, optionally echoing to `tracing`
#[derive(Debug, Default, Clone)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
    echo: bool,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and also forward every entry to `tracing`
    pub fn traced() -> Self {
        Self {
            entries: Vec::new(),
            echo: true,
        }
    }

    /// Entries are echoed to `tracing`
    pub fn is_traced(&self) -> bool {
        self.echo
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity != Severity::Warning)
    }

    pub fn for_entity(&self, entity: EntityId) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.entity == entity)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, entity: EntityId, severity: Severity, message: &str) {
        self.entries.push(Diagnostic {
            entity,
            severity,
            message: message.to_string(),
        });
    }
}

impl Diagnostics for DiagnosticLog {
    fn log_warning(&mut self, entity: EntityId, message: &str) {
        if self.echo {
            TracingDiagnostics.log_warning(entity, message);
        }
        self.push(entity, Severity::Warning, message);
    }

    fn log_error(&mut self, entity: EntityId, message: &str, is_fatal: bool) {
        if self.echo {
            TracingDiagnostics.log_error(entity, message, is_fatal);
        }
        let severity = if is_fatal {
            Severity::Fatal
        } else {
            Severity::Error
        };
        self.push(entity, severity, message);
    }
}

/// Report a fatal error for `entity` and hand the result back unchanged
pub fn report_fatal<T>(
    result: crate::error::Result<T>,
    diagnostics: &mut dyn Diagnostics,
    entity: EntityId,
) -> crate::error::Result<T> {
    if let Err(error) = &result {
        diagnostics.log_error(entity, &error.to_string(), true);
    }
    result
}
