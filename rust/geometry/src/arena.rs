// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena of shared curve and profile definitions.
//!
//! A profile reused by several extrusions, or a curve referenced as both an
//! outer boundary and a void, is stored once and referred to by a stable,
//! generational key. Identity checks (duplicate voids, void equal to the
//! outer curve) compare keys, never geometry.

use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};
use crate::profile::ProfileCurve;
use crate::profiles::ProfileDef;

new_key_type! {
    /// Key for a profile source curve.
    pub struct CurveKey;

    /// Key for a profile definition.
    pub struct ProfileKey;
}

/// Owner of every curve and profile definition in a session
#[derive(Debug, Default)]
pub struct GeometryArena {
    curves: SlotMap<CurveKey, ProfileCurve>,
    profiles: SlotMap<ProfileKey, ProfileDef>,
}

impl GeometryArena {
    pub fn new() -> Self {
        Self {
            curves: SlotMap::with_key(),
            profiles: SlotMap::with_key(),
        }
    }

    // --- Curve operations ---

    pub fn add_curve(&mut self, curve: ProfileCurve) -> CurveKey {
        self.curves.insert(curve)
    }

    /// Returns the curve for `key`, or `NotFound` if it was removed or never existed.
    pub fn curve(&self, key: CurveKey) -> Result<&ProfileCurve> {
        self.curves
            .get(key)
            .ok_or_else(|| Error::NotFound(format!("curve {key:?}")))
    }

    pub fn contains_curve(&self, key: CurveKey) -> bool {
        self.curves.contains_key(key)
    }

    pub fn remove_curve(&mut self, key: CurveKey) -> Option<ProfileCurve> {
        self.curves.remove(key)
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    // --- Profile operations ---

    pub fn add_profile(&mut self, profile: ProfileDef) -> ProfileKey {
        self.profiles.insert(profile)
    }

    pub fn profile(&self, key: ProfileKey) -> Result<&ProfileDef> {
        self.profiles
            .get(key)
            .ok_or_else(|| Error::NotFound(format!("profile {key:?}")))
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileCurve;
    use nalgebra::Point3;

    #[test]
    fn test_removed_curve_is_not_found() {
        let mut arena = GeometryArena::new();
        let key = arena.add_curve(ProfileCurve::Polyline(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        ]));
        assert!(arena.curve(key).is_ok());
        assert!(arena.remove_curve(key).is_some());
        assert!(matches!(arena.curve(key), Err(Error::NotFound(_))));
        assert!(!arena.contains_curve(key));
        assert_eq!(arena.curve_count(), 0);
    }

    #[test]
    fn test_profiles_outlive_removed_curves() {
        let mut arena = GeometryArena::new();
        let curve = arena.add_curve(ProfileCurve::Polyline(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        ]));
        let key = arena.add_profile(ProfileDef::ArbitraryOpen { curve });
        assert_eq!(arena.profile_count(), 1);

        arena.remove_curve(curve);
        assert_eq!(arena.profile_count(), 1);
        assert!(matches!(arena.profile(key), Ok(ProfileDef::ArbitraryOpen { .. })));
    }
}
