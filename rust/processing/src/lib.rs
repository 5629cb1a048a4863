// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-BRep Processing
//!
//! Reconstruction sessions on top of `ifc-brep-geometry`: one tolerance
//! context and arena per session, memoized profiles and curve loops, and a
//! serializable report of everything the engine repaired or rejected.

pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod session;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use logging::init_tracing;
pub use report::{DiagnosticRecord, SessionReport, SessionStats};
pub use session::{ExtrusionJob, ReconstructionSession};
