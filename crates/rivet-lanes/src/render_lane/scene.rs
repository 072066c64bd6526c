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

//! Renderable scene nodes and the per-frame scene the emitters walk.

use super::{InstanceConstants, MaterialNode};
use rivet_core::renderer::{
    ConstantBufferId, ConstantBufferSlot, IndexBufferId, ResolveError, ResourceFactory,
    VertexBufferId, VertexFormat,
};
use rivet_core::{StateBlock, Vec3};

/// The GPU resources and states shared by every renderable node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderableNode {
    /// Vertex buffer, input layout and (for indexed meshes) index buffer bindings.
    pub states: StateBlock,
    /// The per-instance constant buffer holding the node transform.
    pub instance: ConstantBufferId,
    /// The number of indices or vertices drawn.
    pub count: u32,
    /// The world position used for distance sorting.
    pub position: Vec3,
}

impl RenderableNode {
    /// Returns the states that bind this node's instance constants.
    pub fn instance_states(&self) -> StateBlock {
        let mut states = StateBlock::new();
        states.bind_constant_buffer(self.instance, ConstantBufferSlot::InstanceConstants);
        states
    }

    fn request_instance(factory: &mut dyn ResourceFactory, position: Vec3) -> ConstantBufferId {
        let constants = InstanceConstants::translation(position);
        let bytes = bytemuck::bytes_of(&constants);
        factory.request_constant_buffer(Some(bytes), bytes.len(), InstanceConstants::LAYOUT)
    }
}

/// An indexed triangle mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticMeshNode {
    /// The material.
    pub material: MaterialNode,
    /// The renderable part.
    pub renderable: RenderableNode,
    vertex_buffer: VertexBufferId,
    index_buffer: IndexBufferId,
}

impl StaticMeshNode {
    /// Requests the mesh resources from `factory` and builds the node.
    ///
    /// `vertices` is raw interleaved vertex data in `format`.
    pub fn new(
        factory: &mut dyn ResourceFactory,
        format: VertexFormat,
        vertices: &[u8],
        indices: &[u16],
        material: MaterialNode,
        position: Vec3,
    ) -> Self {
        let vertex_buffer = factory.request_vertex_buffer(Some(vertices), vertices.len());
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        let index_buffer = factory.request_index_buffer(Some(index_bytes), index_bytes.len());
        let input_layout = factory.request_input_layout(format);

        let mut states = StateBlock::new();
        states
            .bind_vertex_buffer(vertex_buffer)
            .bind_index_buffer(index_buffer)
            .bind_input_layout(input_layout);

        log::debug!(
            "Static mesh with {} indices requested at {:?}.",
            indices.len(),
            position
        );

        Self {
            material,
            renderable: RenderableNode {
                states,
                instance: RenderableNode::request_instance(factory, position),
                count: indices.len() as u32,
                position,
            },
            vertex_buffer,
            index_buffer,
        }
    }

    /// Releases the buffers this node requested. The shared input layout is kept.
    pub fn release(&self, factory: &mut dyn ResourceFactory) -> Result<(), ResolveError> {
        factory.release_vertex_buffer(self.vertex_buffer)?;
        factory.release_index_buffer(self.index_buffer)?;
        factory.release_constant_buffer(self.renderable.instance)
    }
}

/// A non-indexed set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCloudNode {
    /// The material.
    pub material: MaterialNode,
    /// The renderable part.
    pub renderable: RenderableNode,
    vertex_buffer: VertexBufferId,
}

impl PointCloudNode {
    /// Requests the point resources from `factory` and builds the node.
    pub fn new(
        factory: &mut dyn ResourceFactory,
        format: VertexFormat,
        vertices: &[u8],
        material: MaterialNode,
        position: Vec3,
    ) -> Self {
        let format = VertexFormat::new(format);
        let vertex_buffer = factory.request_vertex_buffer(Some(vertices), vertices.len());
        let input_layout = factory.request_input_layout(format);

        let mut states = StateBlock::new();
        states
            .bind_vertex_buffer(vertex_buffer)
            .bind_input_layout(input_layout);

        Self {
            material,
            renderable: RenderableNode {
                states,
                instance: RenderableNode::request_instance(factory, position),
                count: (vertices.len() / format.vertex_size()) as u32,
                position,
            },
            vertex_buffer,
        }
    }

    /// Releases the buffers this node requested.
    pub fn release(&self, factory: &mut dyn ResourceFactory) -> Result<(), ResolveError> {
        factory.release_vertex_buffer(self.vertex_buffer)?;
        factory.release_constant_buffer(self.renderable.instance)
    }
}

/// The renderable contents of a frame, grouped by node kind.
#[derive(Debug, Default, Clone)]
pub struct RenderScene {
    /// Indexed triangle meshes.
    pub static_meshes: Vec<StaticMeshNode>,
    /// Point clouds.
    pub point_clouds: Vec<PointCloudNode>,
}

impl RenderScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a static mesh.
    pub fn add_static_mesh(&mut self, node: StaticMeshNode) {
        self.static_meshes.push(node);
    }

    /// Adds a point cloud.
    pub fn add_point_cloud(&mut self, node: PointCloudNode) {
        self.point_clouds.push(node);
    }

    /// Returns the total number of nodes.
    pub fn len(&self) -> usize {
        self.static_meshes.len() + self.point_clouds.len()
    }

    /// Returns `true` if the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every node without releasing their resources.
    pub fn clear(&mut self) {
        self.static_meshes.clear();
        self.point_clouds.clear();
    }
}
