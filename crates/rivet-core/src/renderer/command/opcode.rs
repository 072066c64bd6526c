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

//! The closed set of recorded operations.

use crate::math::{Rect, Rgba};
use crate::renderer::api::{ClearMask, PixelFormat, PrimitiveType, VertexFormat};
use crate::renderer::handle::{
    ConstantBufferId, IndexBufferId, InputLayoutId, ProgramId, TextureId, VertexBufferId,
};

use super::buffer::{CommandBufferId, StateIndex, TransientTarget};
use super::payload::DataBuffer;

/// The scalar type of a uniform inside a constant buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    /// A 32-bit integer.
    Int,
    /// A 32-bit float.
    Float,
    /// Two floats.
    Vec2,
    /// Three floats.
    Vec3,
    /// Four floats.
    Vec4,
    /// A 4x4 float matrix.
    Mat4,
}

impl UniformType {
    /// Returns the size of the uniform in bytes.
    pub const fn size(self) -> usize {
        match self {
            UniformType::Int | UniformType::Float => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat4 => 64,
        }
    }
}

/// A named uniform inside a constant buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformElement {
    /// The uniform name as seen by shaders.
    pub name: &'static str,
    /// The uniform type.
    pub ty: UniformType,
    /// The byte offset inside the buffer.
    pub offset: usize,
}

/// Describes the uniforms stored in a constant buffer.
pub type ConstantBufferLayout = &'static [UniformElement];

/// Where a `RenderToTarget` command routes its draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderTarget {
    /// The default framebuffer.
    #[default]
    Framebuffer,
    /// A texture requested through a resource factory.
    Texture(TextureId),
    /// A pooled target acquired earlier in the same command buffer.
    Transient(TransientTarget),
}

impl From<TextureId> for RenderTarget {
    fn from(id: TextureId) -> Self {
        RenderTarget::Texture(id)
    }
}

impl From<TransientTarget> for RenderTarget {
    fn from(target: TransientTarget) -> Self {
        RenderTarget::Transient(target)
    }
}

impl From<Option<TextureId>> for RenderTarget {
    fn from(id: Option<TextureId>) -> Self {
        id.map_or(RenderTarget::Framebuffer, RenderTarget::Texture)
    }
}

/// A single recorded operation.
///
/// Variants are `Copy`: bulk data lives in the owning command buffer and is
/// referenced through [`DataBuffer`] and [`StateIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Clears the bound render target.
    Clear {
        /// The clear color.
        color: Rgba,
        /// The clear depth.
        depth: f32,
        /// The clear stencil value.
        stencil: u8,
        /// The buffers to clear.
        mask: ClearMask,
    },
    /// Replays another command buffer of the same frame in place.
    Execute(CommandBufferId),
    /// Replays another command buffer into a render target.
    RenderToTarget {
        /// The target to render into.
        target: RenderTarget,
        /// The viewport used while rendering into the target.
        viewport: Rect,
        /// The command buffer to replay.
        commands: CommandBufferId,
    },
    /// Takes a render target of the given size and format from the executor's pool.
    AcquireRenderTarget {
        /// The slot the target is loaded into.
        target: TransientTarget,
        /// The width in pixels.
        width: u16,
        /// The height in pixels.
        height: u16,
        /// The pixel format.
        format: PixelFormat,
    },
    /// Returns a transient render target to the executor's pool.
    ReleaseRenderTarget(TransientTarget),
    /// Replaces the contents of a vertex buffer.
    UploadVertexBuffer {
        /// The buffer to write.
        id: VertexBufferId,
        /// The new contents.
        data: DataBuffer,
    },
    /// Replaces the contents of an index buffer.
    UploadIndexBuffer {
        /// The buffer to write.
        id: IndexBufferId,
        /// The new contents.
        data: DataBuffer,
    },
    /// Replaces the contents of a constant buffer.
    UploadConstantBuffer {
        /// The buffer to write.
        id: ConstantBufferId,
        /// The new contents.
        data: DataBuffer,
    },
    /// Constructs the backend object behind a vertex buffer handle.
    CreateVertexBuffer {
        /// The pending handle.
        id: VertexBufferId,
        /// The initial contents.
        data: DataBuffer,
    },
    /// Constructs the backend object behind an index buffer handle.
    CreateIndexBuffer {
        /// The pending handle.
        id: IndexBufferId,
        /// The initial contents.
        data: DataBuffer,
    },
    /// Constructs the backend object behind a constant buffer handle.
    CreateConstantBuffer {
        /// The pending handle.
        id: ConstantBufferId,
        /// The initial contents.
        data: DataBuffer,
        /// The uniforms stored in the buffer.
        layout: ConstantBufferLayout,
    },
    /// Constructs the backend object behind a texture handle.
    CreateTexture {
        /// The pending handle.
        id: TextureId,
        /// The initial pixels.
        data: DataBuffer,
        /// The width in pixels.
        width: u16,
        /// The height in pixels.
        height: u16,
        /// The pixel format.
        format: PixelFormat,
    },
    /// Constructs the backend object behind an input layout handle.
    CreateInputLayout {
        /// The pending handle.
        id: InputLayoutId,
        /// The vertex format the layout describes.
        format: VertexFormat,
    },
    /// Constructs the backend object behind a program handle.
    CreateProgram {
        /// The pending handle.
        id: ProgramId,
        /// The UTF-8 vertex shader source.
        vertex: DataBuffer,
        /// The UTF-8 fragment shader source.
        fragment: DataBuffer,
    },
    /// Draws indexed primitives.
    DrawIndexed {
        /// The primitive topology.
        primitive: PrimitiveType,
        /// The first index.
        first: u32,
        /// The number of indices.
        count: u32,
        /// The captured state block.
        states: StateIndex,
    },
    /// Draws non-indexed primitives.
    DrawPrimitives {
        /// The primitive topology.
        primitive: PrimitiveType,
        /// The first vertex.
        first: u32,
        /// The number of vertices.
        count: u32,
        /// The captured state block.
        states: StateIndex,
    },
    /// Pushes a state block under every following draw until the matching pop.
    PushState(StateIndex),
    /// Pops the state block pushed by the matching `PushState`.
    PopState,
}

impl OpCode {
    /// Returns `true` for the draw op-codes, the only ones that move when a buffer is sorted.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            OpCode::DrawIndexed { .. } | OpCode::DrawPrimitives { .. }
        )
    }
}

/// An op-code tagged with its sorting key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// Orders commands when a buffer is sorted. Lower keys run first.
    pub sorting: u64,
    /// The operation.
    pub op: OpCode,
}

impl Command {
    /// Creates a command.
    pub fn new(sorting: u64, op: OpCode) -> Self {
        Self { sorting, op }
    }
}
