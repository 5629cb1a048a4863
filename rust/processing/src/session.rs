// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction session
//!
//! A session owns the tolerance context, the arena of shared definitions and
//! the diagnostics of everything reconstructed through it. Built profiles and
//! resolved curve loops are cached by arena key, so a profile shared by many
//! extrusions is built (and diagnosed) once.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::report::{SessionReport, SessionStats};
use ifc_brep_geometry::{
    CompositeCurveAssembler, CurveKey, CurveLoop, CurveSegment, DiagnosticLog, EntityId, ExtrudedSolid,
    ExtrusionRequest, ExtrusionSolidSynthesizer, GeometryArena, Material, MaterialLayerUsage,
    MeshSolidBuilder, Profile, ProfileBuilder, ProfileCurve, ProfileDef, ProfileKey, SolidBuilder,
    ToleranceContext, Vector3,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One extrusion to reconstruct, referring to arena definitions by key
#[derive(Debug, Clone)]
pub struct ExtrusionJob {
    pub profile: ProfileKey,
    pub direction: Vector3<f64>,
    pub depth: Option<f64>,
    pub material: Option<Material>,
    pub layers: Option<MaterialLayerUsage>,
    /// Axis curve of a layered wall
    pub axis: Option<CurveKey>,
}

impl ExtrusionJob {
    pub fn new(profile: ProfileKey, direction: Vector3<f64>, depth: f64) -> Self {
        Self {
            profile,
            direction,
            depth: Some(depth),
            material: None,
            layers: None,
            axis: None,
        }
    }
}

pub struct ReconstructionSession<B: SolidBuilder = MeshSolidBuilder> {
    tolerance: ToleranceContext,
    arena: GeometryArena,
    builder: B,
    profiles: FxHashMap<ProfileKey, Arc<Profile>>,
    curves: FxHashMap<CurveKey, Arc<CurveLoop>>,
    diagnostics: DiagnosticLog,
    stats: SessionStats,
}

impl ReconstructionSession<MeshSolidBuilder> {
    /// Session backed by the mesh solid service
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_builder(config, config.mesh_builder())
    }
}

impl<B: SolidBuilder> ReconstructionSession<B> {
    pub fn with_builder(config: &SessionConfig, builder: B) -> Self {
        let diagnostics = if config.trace_diagnostics {
            DiagnosticLog::traced()
        } else {
            DiagnosticLog::new()
        };
        let tolerance = config.tolerance();
        tracing::debug!(
            vertex = tolerance.vertex_epsilon(),
            gap = tolerance.gap_epsilon(),
            short_curve = tolerance.short_curve_tolerance(),
            unit = tolerance.unit_label(),
            "Starting reconstruction session"
        );
        Self {
            tolerance,
            arena: GeometryArena::new(),
            builder,
            profiles: FxHashMap::default(),
            curves: FxHashMap::default(),
            diagnostics,
            stats: SessionStats::default(),
        }
    }

    #[inline]
    pub fn tolerance(&self) -> &ToleranceContext {
        &self.tolerance
    }

    #[inline]
    pub fn arena(&self) -> &GeometryArena {
        &self.arena
    }

    #[inline]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn add_curve(&mut self, curve: ProfileCurve) -> CurveKey {
        self.arena.add_curve(curve)
    }

    pub fn add_profile(&mut self, profile: ProfileDef) -> ProfileKey {
        self.arena.add_profile(profile)
    }

    /// Remove a curve. Built profiles may depend on it, so the profile cache
    /// is dropped as well.
    pub fn remove_curve(&mut self, key: CurveKey) -> Option<ProfileCurve> {
        let removed = self.arena.remove_curve(key)?;
        self.curves.remove(&key);
        self.profiles.clear();
        Some(removed)
    }

    /// The profile for `key`, built on first use
    pub fn profile(&mut self, key: ProfileKey, entity: EntityId) -> Result<Arc<Profile>> {
        if let Some(profile) = self.profiles.get(&key) {
            self.stats.profile_cache_hits += 1;
            return Ok(Arc::clone(profile));
        }
        let def = self.arena.profile(key)?;
        let profile = Arc::new(ProfileBuilder::new(&self.tolerance).build(
            def,
            &self.arena,
            &mut self.diagnostics,
            entity,
        )?);
        self.stats.profiles_built += 1;
        self.profiles.insert(key, Arc::clone(&profile));
        Ok(profile)
    }

    /// The assembled loop of the curve at `key`, resolved on first use
    pub fn curve_loop(&mut self, key: CurveKey, entity: EntityId) -> Result<Arc<CurveLoop>> {
        if let Some(lp) = self.curves.get(&key) {
            self.stats.curve_cache_hits += 1;
            return Ok(Arc::clone(lp));
        }
        let lp = Arc::new(ProfileBuilder::new(&self.tolerance).resolve_curve(
            key,
            &self.arena,
            &mut self.diagnostics,
            entity,
        )?);
        self.stats.curves_resolved += 1;
        self.curves.insert(key, Arc::clone(&lp));
        Ok(lp)
    }

    /// Reconstruct one extrusion. Diagnostics land in the session log;
    /// failures are counted and returned.
    pub fn extrude(&mut self, job: &ExtrusionJob, entity: EntityId) -> Result<Vec<ExtrudedSolid<B::Solid>>> {
        self.stats.extrusions += 1;
        let result = self.try_extrude(job, entity);
        match &result {
            Ok(solids) => {
                self.stats.solids += solids.len();
                self.stats.mesh_fallbacks += solids.iter().filter(|s| s.is_mesh_fallback).count();
            }
            Err(e) => {
                self.stats.failed_extrusions += 1;
                tracing::debug!(entity, error = %e, "extrusion failed");
            }
        }
        result
    }

    fn try_extrude(&mut self, job: &ExtrusionJob, entity: EntityId) -> Result<Vec<ExtrudedSolid<B::Solid>>> {
        let profile = self.profile(job.profile, entity)?;
        let axis = match job.axis {
            Some(key) => self.axis_segment(key, entity)?,
            None => None,
        };

        let profiles = std::slice::from_ref(profile.as_ref());
        let mut request = ExtrusionRequest::new(profiles, job.direction, job.depth);
        if let Some(material) = &job.material {
            request = request.with_material(material);
        }
        if let Some(layers) = &job.layers {
            request = request.with_layers(layers);
        }
        if let Some(axis) = &axis {
            request = request.with_axis_curve(axis);
        }

        let solids = ExtrusionSolidSynthesizer::new(&self.tolerance, &self.builder).synthesize(
            &request,
            &mut self.diagnostics,
            entity,
        )?;
        Ok(solids)
    }

    /// A wall axis is one curve; uniform composite axes are collapsed into one
    fn axis_segment(&mut self, key: CurveKey, entity: EntityId) -> Result<Option<CurveSegment>> {
        let lp = self.curve_loop(key, entity)?;
        Ok(match lp.segments() {
            [single] => Some(*single),
            _ => CompositeCurveAssembler::new(&self.tolerance).collapse_if_uniform(&lp),
        })
    }

    pub fn report(&self) -> SessionReport {
        SessionReport::new(
            self.tolerance.unit_label(),
            self.stats.clone(),
            self.diagnostics.entries(),
        )
    }

    pub fn report_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }

    /// Hand over the collected diagnostics and start a fresh log
    pub fn take_diagnostics(&mut self) -> DiagnosticLog {
        let fresh = if self.diagnostics.is_traced() {
            DiagnosticLog::traced()
        } else {
            DiagnosticLog::new()
        };
        std::mem::replace(&mut self.diagnostics, fresh)
    }
}
