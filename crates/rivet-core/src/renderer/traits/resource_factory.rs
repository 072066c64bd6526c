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

use crate::renderer::api::{PixelFormat, VertexFormat};
use crate::renderer::command::ConstantBufferLayout;
use crate::renderer::error::ResolveError;
use crate::renderer::handle::{
    ConstantBufferId, IndexBufferId, InputLayoutId, ProgramId, TextureId, VertexBufferId,
};

/// Requests and releases backend resources without naming a backend type.
///
/// Requests return a handle immediately; the backend object is constructed the
/// next time the context displays a frame. Until then the handle is *pending*
/// and draws that use it are skipped.
pub trait ResourceFactory {
    /// Requests a vertex buffer of `size` bytes, optionally filled with `data`.
    fn request_vertex_buffer(&mut self, data: Option<&[u8]>, size: usize) -> VertexBufferId;

    /// Requests an index buffer of `size` bytes, optionally filled with `data`.
    fn request_index_buffer(&mut self, data: Option<&[u8]>, size: usize) -> IndexBufferId;

    /// Requests a constant buffer of `size` bytes described by `layout`.
    fn request_constant_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
        layout: ConstantBufferLayout,
    ) -> ConstantBufferId;

    /// Requests a texture, optionally filled with `data`.
    fn request_texture(
        &mut self,
        data: Option<&[u8]>,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) -> TextureId;

    /// Requests the input layout for `format`. Repeated requests return the same handle.
    fn request_input_layout(&mut self, format: VertexFormat) -> InputLayoutId;

    /// Requests a program compiled from shader sources.
    fn request_program(&mut self, vertex: &str, fragment: &str) -> ProgramId;

    /// Releases a vertex buffer.
    fn release_vertex_buffer(&mut self, id: VertexBufferId) -> Result<(), ResolveError>;

    /// Releases an index buffer.
    fn release_index_buffer(&mut self, id: IndexBufferId) -> Result<(), ResolveError>;

    /// Releases a constant buffer.
    fn release_constant_buffer(&mut self, id: ConstantBufferId) -> Result<(), ResolveError>;

    /// Releases a texture.
    fn release_texture(&mut self, id: TextureId) -> Result<(), ResolveError>;

    /// Releases an input layout.
    fn release_input_layout(&mut self, id: InputLayoutId) -> Result<(), ResolveError>;

    /// Releases a program.
    fn release_program(&mut self, id: ProgramId) -> Result<(), ResolveError>;
}
