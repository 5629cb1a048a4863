// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid construction service
//!
//! The engine never looks inside a solid. It hands closed profiles, a unit
//! direction and a positive depth to a [`SolidBuilder`] and only asks whether
//! the result is valid.

use crate::error::Result;
use crate::profile::Profile;
use nalgebra::Vector3;

pub trait SolidBuilder {
    type Solid;

    /// Extrude `profiles` by `depth` along the unit vector `direction`
    fn extrude(&self, profiles: &[Profile], direction: &Vector3<f64>, depth: f64) -> Result<Self::Solid>;

    /// Whether `solid` is usable downstream
    fn is_valid(&self, solid: &Self::Solid) -> bool;

    /// Coarse, lower-fidelity approximation of the same extrusion
    fn extrude_mesh(&self, profiles: &[Profile], direction: &Vector3<f64>, depth: f64) -> Result<Self::Solid>;
}
