// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Material classification and the filter emitters apply to it.

use rivet_core::renderer::{BlendFactor, Compare, StateBlock};
use rivet_core::rivet_bitflags;

/// How a material reacts to light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightingModel {
    /// Ignores every light.
    Unlit,
    /// Receives ambient light only.
    Ambient,
    /// Receives ambient and per-light Phong shading.
    Phong,
}

impl LightingModel {
    /// Returns the filter bit of this lighting model.
    pub const fn bit(self) -> LightingModels {
        match self {
            LightingModel::Unlit => LightingModels::UNLIT,
            LightingModel::Ambient => LightingModels::AMBIENT,
            LightingModel::Phong => LightingModels::PHONG,
        }
    }
}

/// How a material is composed with what is already rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderingMode {
    /// Writes color and depth.
    Opaque,
    /// Discards fragments below half alpha.
    Cutout,
    /// Blends over the target by alpha.
    Translucent,
    /// Adds to the target.
    Additive,
}

impl RenderingMode {
    /// Returns the filter bit of this rendering mode.
    pub const fn bit(self) -> RenderModes {
        match self {
            RenderingMode::Opaque => RenderModes::OPAQUE,
            RenderingMode::Cutout => RenderModes::CUTOUT,
            RenderingMode::Translucent => RenderModes::TRANSLUCENT,
            RenderingMode::Additive => RenderModes::ADDITIVE,
        }
    }

    /// Returns `true` for modes that blend with the target.
    pub const fn is_blended(self) -> bool {
        matches!(self, RenderingMode::Translucent | RenderingMode::Additive)
    }

    /// Writes the raster states this mode requires into `states`.
    pub fn apply(self, states: &mut StateBlock) {
        match self {
            RenderingMode::Opaque => {}
            RenderingMode::Cutout => {
                states.set_alpha_test(Compare::Greater, 128);
            }
            RenderingMode::Translucent => {
                states
                    .set_blend(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
                    .set_depth_state(Compare::Less, false);
            }
            RenderingMode::Additive => {
                states
                    .set_blend(BlendFactor::One, BlendFactor::One)
                    .set_depth_state(Compare::Less, false);
            }
        }
    }
}

rivet_bitflags! {
    /// A set of lighting models.
    pub struct LightingModels: u8 {
        /// [`LightingModel::Unlit`].
        const UNLIT = 1 << 0;
        /// [`LightingModel::Ambient`].
        const AMBIENT = 1 << 1;
        /// [`LightingModel::Phong`].
        const PHONG = 1 << 2;
        /// Every lighting model.
        const ALL = 0b111;
    }
}

rivet_bitflags! {
    /// A set of rendering modes.
    pub struct RenderModes: u8 {
        /// [`RenderingMode::Opaque`].
        const OPAQUE = 1 << 0;
        /// [`RenderingMode::Cutout`].
        const CUTOUT = 1 << 1;
        /// [`RenderingMode::Translucent`].
        const TRANSLUCENT = 1 << 2;
        /// [`RenderingMode::Additive`].
        const ADDITIVE = 1 << 3;
        /// Every rendering mode.
        const ALL = 0b1111;
    }
}

/// Selects the materials an emitter records.
///
/// A material passes only if both its lighting model and its rendering mode are
/// in the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    /// The accepted lighting models.
    pub lighting_models: LightingModels,
    /// The accepted rendering modes.
    pub render_modes: RenderModes,
}

impl Default for Filter {
    fn default() -> Self {
        Self::ALL
    }
}

impl Filter {
    /// A filter accepting every material.
    pub const ALL: Self = Self {
        lighting_models: LightingModels::ALL,
        render_modes: RenderModes::ALL,
    };

    /// Creates a filter.
    pub const fn new(lighting_models: LightingModels, render_modes: RenderModes) -> Self {
        Self {
            lighting_models,
            render_modes,
        }
    }

    /// Returns `true` if a material with this lighting model and rendering mode passes.
    pub fn accepts(&self, lighting: LightingModel, mode: RenderingMode) -> bool {
        self.lighting_models.intersects(lighting.bit()) && self.render_modes.intersects(mode.bit())
    }
}

/// The material part of a renderable scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialNode {
    /// The lighting model.
    pub lighting: LightingModel,
    /// The rendering mode.
    pub mode: RenderingMode,
    /// Whether back faces are rendered too.
    pub two_sided: bool,
    /// States pushed before the node's own states.
    pub states: StateBlock,
}

impl MaterialNode {
    /// Creates a one-sided material whose states match `mode`.
    pub fn new(lighting: LightingModel, mode: RenderingMode) -> Self {
        let mut states = StateBlock::new();
        mode.apply(&mut states);
        Self {
            lighting,
            mode,
            two_sided: false,
            states,
        }
    }

    /// Marks the material as two-sided.
    pub fn two_sided(mut self) -> Self {
        self.two_sided = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_requires_both_bits() {
        let filter = Filter::new(LightingModels::UNLIT, RenderModes::OPAQUE | RenderModes::CUTOUT);

        assert!(filter.accepts(LightingModel::Unlit, RenderingMode::Opaque));
        assert!(filter.accepts(LightingModel::Unlit, RenderingMode::Cutout));
        assert!(!filter.accepts(LightingModel::Phong, RenderingMode::Opaque));
        assert!(!filter.accepts(LightingModel::Unlit, RenderingMode::Translucent));
        assert!(!Filter::new(LightingModels::EMPTY, RenderModes::ALL)
            .accepts(LightingModel::Ambient, RenderingMode::Opaque));
    }

    #[test]
    fn filter_matches_bitmask_semantics_exhaustively() {
        let lightings = [LightingModel::Unlit, LightingModel::Ambient, LightingModel::Phong];
        let modes = [
            RenderingMode::Opaque,
            RenderingMode::Cutout,
            RenderingMode::Translucent,
            RenderingMode::Additive,
        ];

        for l in 0..8u8 {
            for m in 0..16u8 {
                let filter = Filter::new(
                    LightingModels::from_bits_retain(l),
                    RenderModes::from_bits_retain(m),
                );
                for lighting in lightings {
                    for mode in modes {
                        let expected =
                            (l & lighting.bit().bits()) != 0 && (m & mode.bit().bits()) != 0;
                        assert_eq!(filter.accepts(lighting, mode), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn blended_modes_disable_depth_writes() {
        let material = MaterialNode::new(LightingModel::Unlit, RenderingMode::Translucent);
        assert!(!material.states.depth_state().write);
        assert_eq!(material.states.blending().src, BlendFactor::SrcAlpha);

        let opaque = MaterialNode::new(LightingModel::Phong, RenderingMode::Opaque);
        assert!(opaque.states.is_empty());
        assert!(opaque.two_sided().two_sided);
    }
}
