// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion solid synthesis
//!
//! Turns profiles, a direction and a depth into one or more solids through a
//! [`SolidBuilder`]. Open loops are healed first; material layer sets may
//! split the extrusion into one solid per layer, stacked either along the
//! extrusion or across the profile.

mod healing;
mod layers;


pub use healing::heal_open_loop;

use crate::curve::CurveSegment;
use crate::diagnostics::{report_fatal, Diagnostics, EntityId};
use crate::error::{Error, Result};
use crate::material::{LayerAxis, Material, MaterialLayer, MaterialLayerUsage};
use crate::profile::Profile;
use crate::solid::SolidBuilder;
use crate::tolerance::ToleranceContext;
use nalgebra::Vector3;

/// Everything needed to extrude one entity
#[derive(Debug, Clone, Copy)]
pub struct ExtrusionRequest<'a> {
    pub profiles: &'a [Profile],
    pub direction: Vector3<f64>,
    /// Signed depth; `None` means the source did not provide one
    pub depth: Option<f64>,
    pub material: Option<&'a Material>,
    pub layers: Option<&'a MaterialLayerUsage>,
    /// Reference curve of a layered wall, in the profile plane
    pub axis_curve: Option<&'a CurveSegment>,
}

impl<'a> ExtrusionRequest<'a> {
    pub fn new(profiles: &'a [Profile], direction: Vector3<f64>, depth: Option<f64>) -> Self {
        Self {
            profiles,
            direction,
            depth,
            material: None,
            layers: None,
            axis_curve: None,
        }
    }

    pub fn with_material(mut self, material: &'a Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_layers(mut self, layers: &'a MaterialLayerUsage) -> Self {
        self.layers = Some(layers);
        self
    }

    pub fn with_axis_curve(mut self, axis: &'a CurveSegment) -> Self {
        self.axis_curve = Some(axis);
        self
    }
}

/// One solid produced by the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudedSolid<S> {
    pub solid: S,
    pub material: Option<Material>,
    /// Distance from the profile plane to the solid's base, along the
    /// extrusion direction
    pub offset: f64,
    /// Extrusion distance of this solid
    pub depth: f64,
    /// The solid is the coarse mesh approximation
    pub is_mesh_fallback: bool,
}

/// A piece of the extrusion handed to the solid builder
#[derive(Debug, Clone)]
pub(crate) struct Slice {
    profiles: Vec<Profile>,
    offset: f64,
    depth: f64,
    material: Option<Material>,
}

impl Slice {
    fn whole(profiles: Vec<Profile>, depth: f64, material: Option<Material>) -> Self {
        Self {
            profiles,
            offset: 0.0,
            depth,
            material,
        }
    }
}

pub struct ExtrusionSolidSynthesizer<'a, B: SolidBuilder> {
    tolerance: &'a ToleranceContext,
    builder: &'a B,
}

impl<'a, B: SolidBuilder> ExtrusionSolidSynthesizer<'a, B> {
    pub fn new(tolerance: &'a ToleranceContext, builder: &'a B) -> Self {
        Self { tolerance, builder }
    }

    #[inline]
    pub fn tolerance(&self) -> &ToleranceContext {
        self.tolerance
    }

    /// Extrude `request` into solids, one per material layer when the layer
    /// set asks for it. Fatal errors are reported to `diagnostics` before
    /// being returned.
    pub fn synthesize(
        &self,
        request: &ExtrusionRequest<'_>,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Vec<ExtrudedSolid<B::Solid>>> {
        let result = self.try_synthesize(request, diagnostics, entity);
        report_fatal(result, diagnostics, entity)
    }

    fn try_synthesize(
        &self,
        request: &ExtrusionRequest<'_>,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Vec<ExtrudedSolid<B::Solid>>> {
        let (direction, depth) = self.resolve_depth(request, diagnostics, entity)?;

        let profiles = self.heal_profiles(request.profiles, diagnostics, entity);
        if profiles.is_empty() {
            return Err(Error::extrusion("no closed profile is left to extrude"));
        }

        let slices = self.plan(profiles, &direction, depth, request, diagnostics, entity)?;
        slices
            .into_iter()
            .map(|slice| self.build_slice(slice, &direction, diagnostics, entity))
            .collect()
    }

    /// Unit direction and positive depth. A negative depth flips the direction.
    fn resolve_depth(
        &self,
        request: &ExtrusionRequest<'_>,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<(Vector3<f64>, f64)> {
        let depth = request
            .depth
            .ok_or_else(|| Error::extrusion("extrusion depth is missing"))?;
        if !depth.is_finite() || depth == 0.0 {
            return Err(Error::extrusion(format!(
                "extrusion depth must be non-zero, got {depth}"
            )));
        }
        let direction = request
            .direction
            .try_normalize(1e-12)
            .ok_or_else(|| Error::extrusion("extrusion direction has zero length"))?;

        if depth < 0.0 {
            diagnostics.log_warning(
                entity,
                &format!(
                    "Negative extrusion depth {}; extruding along the reversed direction",
                    self.tolerance.format_length(depth)
                ),
            );
            return Ok((-direction, -depth));
        }
        Ok((direction, depth))
    }

    /// Decide which pieces to extrude
    fn plan(
        &self,
        profiles: Vec<Profile>,
        direction: &Vector3<f64>,
        depth: f64,
        request: &ExtrusionRequest<'_>,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<Vec<Slice>> {
        let base = request.material.cloned();
        let Some(usage) = request.layers else {
            return Ok(vec![Slice::whole(profiles, depth, base)]);
        };

        let layers: Vec<&MaterialLayer> = usage.non_empty_layers().collect();
        match layers.as_slice() {
            [] => Ok(vec![Slice::whole(profiles, depth, base)]),
            [single] => {
                // One layer only restyles the plain extrusion
                let material = match &single.material {
                    Some(m) if m.has_color() => Some(m.clone()),
                    _ => base,
                };
                Ok(vec![Slice::whole(profiles, depth, material)])
            }
            _ => {
                let split = match usage.axis {
                    LayerAxis::AlongExtrusionDepth => {
                        self.split_along_depth(&profiles, direction, depth, usage, base.as_ref())
                    }
                    LayerAxis::AlongProfileWidth => self.split_across_width(
                        &profiles,
                        depth,
                        usage,
                        request.axis_curve,
                        base.as_ref(),
                        diagnostics,
                        entity,
                    )?,
                };
                Ok(split.unwrap_or_else(|| vec![Slice::whole(profiles, depth, base)]))
            }
        }
    }

    fn build_slice(
        &self,
        slice: Slice,
        direction: &Vector3<f64>,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<ExtrudedSolid<B::Solid>> {
        let (solid, is_mesh_fallback) = self.build_solid(&slice.profiles, direction, slice.depth, diagnostics, entity)?;
        Ok(ExtrudedSolid {
            solid,
            material: slice.material,
            offset: slice.offset,
            depth: slice.depth,
            is_mesh_fallback,
        })
    }

    /// Extrude through the solid builder, falling back to its coarse mesh
    /// when the solid fails or is invalid. If the mesh fails too, the
    /// original failure is returned.
    fn build_solid(
        &self,
        profiles: &[Profile],
        direction: &Vector3<f64>,
        depth: f64,
        diagnostics: &mut dyn Diagnostics,
        entity: EntityId,
    ) -> Result<(B::Solid, bool)> {
        let failure = match self.builder.extrude(profiles, direction, depth) {
            Ok(solid) if self.builder.is_valid(&solid) => return Ok((solid, false)),
            Ok(_) => Error::SolidConstruction("extruded solid failed the validity check".to_string()),
            Err(e) => e,
        };

        match self.builder.extrude_mesh(profiles, direction, depth) {
            Ok(mesh) => {
                diagnostics.log_warning(
                    entity,
                    &format!("Solid extrusion failed ({failure}); used a coarse mesh instead"),
                );
                Ok((mesh, true))
            }
            Err(mesh_error) => {
                tracing::debug!(entity, %mesh_error, "mesh fallback failed as well");
                Err(failure)
            }
        }
    }
}
