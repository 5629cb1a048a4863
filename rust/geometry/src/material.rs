// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Materials and material layer sets

/// Material assigned to an extruded solid
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Entity id of the material definition
    pub id: u32,
    pub name: String,
    /// RGBA colour in `0.0..=1.0`, if the material carries presentation data
    pub color: Option<[f32; 4]>,
}

impl Material {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = Some(color);
        self
    }

    #[inline]
    pub fn has_color(&self) -> bool {
        self.color.is_some()
    }
}

/// One slice of a layer set
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLayer {
    pub thickness: f64,
    pub material: Option<Material>,
}

impl MaterialLayer {
    pub fn new(thickness: f64, material: Option<Material>) -> Self {
        Self {
            thickness,
            material,
        }
    }

    /// Zero, negative and non-finite layers take no space
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.thickness.is_finite() && self.thickness > 0.0)
    }
}

/// Axis along which layers are stacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerAxis {
    /// Slabs, roofs: layers follow each other along the extrusion (Axis3)
    AlongExtrusionDepth,
    /// Walls: layers follow each other across the profile (Axis2)
    AlongProfileWidth,
}

/// Whether layers stack along or against the positive axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DirectionSense {
    #[default]
    Positive,
    Negative,
}

impl DirectionSense {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Layer set applied to one extrusion
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLayerUsage {
    pub layers: Vec<MaterialLayer>,
    pub axis: LayerAxis,
    pub direction_sense: DirectionSense,
    /// Offset of the first layer from the reference (axis) curve, in the
    /// profile plane. Only used when stacking across the profile.
    pub offset: f64,
}

impl MaterialLayerUsage {
    pub fn new(layers: Vec<MaterialLayer>, axis: LayerAxis) -> Self {
        Self {
            layers,
            axis,
            direction_sense: DirectionSense::Positive,
            offset: 0.0,
        }
    }

    pub fn with_sense(mut self, sense: DirectionSense) -> Self {
        self.direction_sense = sense;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Layers that take space, in stacking order
    pub fn non_empty_layers(&self) -> impl Iterator<Item = &MaterialLayer> {
        self.layers.iter().filter(|l| !l.is_empty())
    }

    pub fn total_thickness(&self) -> f64 {
        self.non_empty_layers().map(|l| l.thickness).sum()
    }
}
