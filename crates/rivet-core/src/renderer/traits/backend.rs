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

use crate::math::{Rect, Rgba};
use crate::renderer::api::{
    ClearMask, ColorMask, PipelineFeatures, PixelFormat, PolygonMode, PrimitiveType,
    TriangleFace, VertexFormat,
};
use crate::renderer::command::ConstantBufferLayout;
use crate::renderer::error::RenderError;
use crate::renderer::state::{
    AlphaTest, BlendFunction, DepthState, PolygonOffset, StencilFunction, StencilOp,
};

/// A concrete graphics API that a [`RenderingContext`](crate::renderer::RenderingContext)
/// replays recorded commands against.
///
/// Implementations translate each call into real API calls (OpenGL, Metal, a
/// software rasterizer). The context already resolves handles and skips redundant
/// state changes, so every call here is a real transition. Backend objects are owned
/// by the context's handle tables and handed back through the `destroy_*` methods.
pub trait RenderBackend {
    /// A vertex, index or constant buffer.
    type Buffer;
    /// A texture or render target.
    type Texture;
    /// A vertex input layout.
    type InputLayout;
    /// A compiled shader program.
    type Program;

    /// Creates a vertex buffer of `size` bytes, optionally filled with `data`.
    fn create_vertex_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
    ) -> Result<Self::Buffer, RenderError>;

    /// Creates an index buffer of `size` bytes, optionally filled with `data`.
    fn create_index_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
    ) -> Result<Self::Buffer, RenderError>;

    /// Creates a constant buffer of `size` bytes described by `layout`.
    fn create_constant_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
        layout: ConstantBufferLayout,
    ) -> Result<Self::Buffer, RenderError>;

    /// Creates a texture, optionally filled with `data`.
    fn create_texture(
        &mut self,
        data: Option<&[u8]>,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) -> Result<Self::Texture, RenderError>;

    /// Creates an input layout for `format`.
    fn create_input_layout(&mut self, format: VertexFormat)
        -> Result<Self::InputLayout, RenderError>;

    /// Compiles a program from vertex and fragment shader sources.
    fn create_program(&mut self, vertex: &str, fragment: &str)
        -> Result<Self::Program, RenderError>;

    /// Replaces the contents of a buffer, starting at offset zero.
    fn write_buffer(&mut self, buffer: &mut Self::Buffer, data: &[u8]) -> Result<(), RenderError>;

    /// Destroys a buffer.
    fn destroy_buffer(&mut self, buffer: Self::Buffer);

    /// Destroys a texture.
    fn destroy_texture(&mut self, texture: Self::Texture);

    /// Destroys an input layout.
    fn destroy_input_layout(&mut self, layout: Self::InputLayout);

    /// Destroys a program.
    fn destroy_program(&mut self, program: Self::Program);

    /// Routes draws to `target`, or to the default framebuffer when `None`.
    fn set_render_target(&mut self, target: Option<&Self::Texture>);

    /// Sets the viewport in pixels.
    fn set_viewport(&mut self, viewport: Rect);

    /// Clears the bound render target.
    fn clear(&mut self, color: Rgba, depth: f32, stencil: u8, mask: ClearMask);

    /// Binds or unbinds the vertex buffer.
    fn bind_vertex_buffer(&mut self, buffer: Option<&Self::Buffer>);

    /// Binds or unbinds the index buffer.
    fn bind_index_buffer(&mut self, buffer: Option<&Self::Buffer>);

    /// Binds or unbinds the input layout.
    fn bind_input_layout(&mut self, layout: Option<&Self::InputLayout>);

    /// Binds or unbinds the program together with the resolved feature set.
    fn bind_program(&mut self, program: Option<&Self::Program>, features: PipelineFeatures);

    /// Binds or unbinds a constant buffer slot.
    fn bind_constant_buffer(&mut self, slot: usize, buffer: Option<&Self::Buffer>);

    /// Binds or unbinds a texture sampler.
    fn bind_texture(&mut self, sampler: usize, texture: Option<&Self::Texture>);

    /// Sets the blend function.
    fn set_blend_function(&mut self, blend: BlendFunction);

    /// Sets the depth test function and write flag.
    fn set_depth_state(&mut self, depth: DepthState);

    /// Sets the alpha test.
    fn set_alpha_test(&mut self, alpha: AlphaTest);

    /// Sets the culled faces.
    fn set_cull_face(&mut self, face: TriangleFace);

    /// Sets the polygon offset.
    fn set_polygon_offset(&mut self, offset: PolygonOffset);

    /// Sets the polygon rasterization mode.
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    /// Sets the color write mask.
    fn set_color_mask(&mut self, mask: ColorMask);

    /// Sets the stencil test function.
    fn set_stencil_function(&mut self, function: StencilFunction);

    /// Sets the stencil actions.
    fn set_stencil_op(&mut self, op: StencilOp);

    /// Sets the stencil write mask.
    fn set_stencil_mask(&mut self, mask: u8);

    /// Draws `count` indices starting at `first` from the bound index buffer.
    fn draw_indexed(&mut self, primitive: PrimitiveType, first: u32, count: u32);

    /// Draws `count` vertices starting at `first` from the bound vertex buffer.
    fn draw_primitives(&mut self, primitive: PrimitiveType, first: u32, count: u32);

    /// Restores every pipeline state to its default and unbinds every resource.
    fn reset_states(&mut self);
}
