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

//! A pass that renders the scene with a single material color.

use super::{MaterialConstants, RenderScene, RopEmitter};
use rivet_core::renderer::{
    CommandBuffer, ConstantBufferId, ConstantBufferSlot, PipelineFeatures, ResolveError,
    ResourceFactory, StateStack,
};
use rivet_core::{Rgba, Vec3};

/// Runs a list of emitters with the material constants set to one color.
///
/// Used for picking, silhouettes and debug views.
pub struct ColorPass {
    material: ConstantBufferId,
    emitters: Vec<Box<dyn RopEmitter>>,
}

impl ColorPass {
    /// Requests the material constant buffer and creates a pass with no emitters.
    pub fn new(factory: &mut dyn ResourceFactory) -> Self {
        let material = factory.request_constant_buffer(
            None,
            std::mem::size_of::<MaterialConstants>(),
            MaterialConstants::LAYOUT,
        );
        Self {
            material,
            emitters: Vec::new(),
        }
    }

    /// Appends an emitter. Emitters run in insertion order.
    pub fn with_emitter(mut self, emitter: Box<dyn RopEmitter>) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Returns the material constant buffer of this pass.
    pub fn material(&self) -> ConstantBufferId {
        self.material
    }

    /// Uploads `color` as the diffuse material color and records every emitter.
    ///
    /// Returns the number of draws recorded.
    pub fn render_with_color(
        &self,
        scene: &RenderScene,
        commands: &mut CommandBuffer,
        stack: &mut StateStack,
        camera: Vec3,
        color: Rgba,
    ) -> usize {
        let constants = MaterialConstants::diffuse(color);
        let bytes = bytemuck::bytes_of(&constants);
        commands.upload_constant_buffer(self.material, Some(bytes), bytes.len());

        let mut pass = stack.scope();
        pass.block()
            .bind_constant_buffer(self.material, ConstantBufferSlot::MaterialConstants)
            .enable_features(PipelineFeatures::AMBIENT_COLOR);

        self.emitters
            .iter()
            .map(|emitter| emitter.emit(scene, commands, &mut pass, camera))
            .sum()
    }

    /// Releases the material constant buffer.
    pub fn release(&self, factory: &mut dyn ResourceFactory) -> Result<(), ResolveError> {
        factory.release_constant_buffer(self.material)
    }
}
