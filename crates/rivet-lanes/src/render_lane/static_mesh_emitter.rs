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

//! Records indexed triangle meshes.

use super::{sorting_key, Filter, LightingModel, RenderScene, RopEmitter};
use rivet_core::renderer::{
    CommandBuffer, PipelineFeatures, PrimitiveType, StateStack, TriangleFace,
};
use rivet_core::Vec3;

/// Emits one indexed draw per accepted [`StaticMeshNode`](super::StaticMeshNode).
///
/// Two-sided materials get an extra draw with front faces culled, recorded before
/// the regular one.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticMeshEmitter {
    filter: Filter,
}

impl StaticMeshEmitter {
    /// Creates an emitter recording only the materials `filter` accepts.
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }

    /// Returns the material filter.
    pub fn filter(&self) -> Filter {
        self.filter
    }
}

impl RopEmitter for StaticMeshEmitter {
    fn name(&self) -> &'static str {
        "StaticMeshEmitter"
    }

    fn emit(
        &self,
        scene: &RenderScene,
        commands: &mut CommandBuffer,
        stack: &mut StateStack,
        camera: Vec3,
    ) -> usize {
        let mut emitted = 0;

        for node in &scene.static_meshes {
            let material = &node.material;
            if !self.filter.accepts(material.lighting, material.mode) {
                continue;
            }

            let renderable = &node.renderable;
            let sorting = sorting_key(material.mode, renderable.position.distance(camera));

            let mut material_scope = stack.scope_with(&material.states);
            let mut renderable_scope = material_scope.scope_with(&renderable.states);
            let mut instance = renderable_scope.scope_with(&renderable.instance_states());
            if material.lighting == LightingModel::Unlit {
                instance.block().disable_features(PipelineFeatures::AMBIENT_COLOR);
            }

            if material.two_sided {
                let mut back = instance.scope();
                back.block().set_cull_face(TriangleFace::Front);
                commands.draw_indexed(
                    sorting,
                    PrimitiveType::Triangles,
                    back.states(),
                    0,
                    renderable.count,
                );
                emitted += 1;
            }

            commands.draw_indexed(
                sorting,
                PrimitiveType::Triangles,
                instance.states(),
                0,
                renderable.count,
            );
            emitted += 1;
        }

        log::trace!("{} recorded {emitted} draws.", self.name());
        emitted
    }
}
