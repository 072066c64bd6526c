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

//! Records point clouds.

use super::{sorting_key, Filter, LightingModel, RenderScene, RopEmitter};
use rivet_core::renderer::{CommandBuffer, PipelineFeatures, PrimitiveType, StateStack};
use rivet_core::Vec3;

/// Emits one point draw per accepted [`PointCloudNode`](super::PointCloudNode).
#[derive(Debug, Default, Clone, Copy)]
pub struct PointCloudEmitter {
    filter: Filter,
}

impl PointCloudEmitter {
    /// Creates an emitter recording only the materials `filter` accepts.
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }
}

impl RopEmitter for PointCloudEmitter {
    fn name(&self) -> &'static str {
        "PointCloudEmitter"
    }

    fn emit(
        &self,
        scene: &RenderScene,
        commands: &mut CommandBuffer,
        stack: &mut StateStack,
        camera: Vec3,
    ) -> usize {
        let mut emitted = 0;

        for node in &scene.point_clouds {
            let material = &node.material;
            if !self.filter.accepts(material.lighting, material.mode) {
                continue;
            }

            let renderable = &node.renderable;
            let mut material_scope = stack.scope_with(&material.states);
            let mut renderable_scope = material_scope.scope_with(&renderable.states);
            let mut instance = renderable_scope.scope_with(&renderable.instance_states());
            if material.lighting == LightingModel::Unlit {
                instance.block().disable_features(PipelineFeatures::AMBIENT_COLOR);
            }

            commands.draw_primitives(
                sorting_key(material.mode, renderable.position.distance(camera)),
                PrimitiveType::Points,
                instance.states(),
                0,
                renderable.count,
            );
            emitted += 1;
        }

        emitted
    }
}
