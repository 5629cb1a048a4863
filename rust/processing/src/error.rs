// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for reconstruction sessions.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] ifc_brep_geometry::Error),

    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
