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

//! Constant buffer layouts shared by the emitters and their shaders.

use bytemuck::{Pod, Zeroable};
use rivet_core::renderer::{UniformElement, UniformType};
use rivet_core::{Rgba, Vec3};

/// Per-pass material colors, bound to the material constants slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    /// Diffuse color.
    pub diffuse: Rgba,
    /// Specular color.
    pub specular: Rgba,
    /// Rim light color.
    pub rim: Rgba,
}

impl MaterialConstants {
    /// The uniforms of the material constant buffer.
    pub const LAYOUT: &'static [UniformElement] = &[
        UniformElement {
            name: "Material.diffuse",
            ty: UniformType::Vec4,
            offset: 0,
        },
        UniformElement {
            name: "Material.specular",
            ty: UniformType::Vec4,
            offset: 16,
        },
        UniformElement {
            name: "Material.rim",
            ty: UniformType::Vec4,
            offset: 32,
        },
    ];

    /// Returns constants with `color` as diffuse and black elsewhere.
    pub fn diffuse(color: Rgba) -> Self {
        Self {
            diffuse: color,
            specular: Rgba::BLACK,
            rim: Rgba::BLACK,
        }
    }
}

/// Per-instance transform, bound to the instance constants slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceConstants {
    /// Column-major model transform.
    pub transform: [[f32; 4]; 4],
}

impl InstanceConstants {
    /// The uniforms of the instance constant buffer.
    pub const LAYOUT: &'static [UniformElement] = &[UniformElement {
        name: "Instance.transform",
        ty: UniformType::Mat4,
        offset: 0,
    }];

    /// Returns a pure translation transform.
    pub fn translation(position: Vec3) -> Self {
        Self {
            transform: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [position.x, position.y, position.z, 1.0],
            ],
        }
    }
}
