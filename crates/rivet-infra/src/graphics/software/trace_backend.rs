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

//! The software trace backend.
//!
//! [`TraceBackend`] keeps CPU copies of every buffer and texture and appends one
//! [`BackendCall`] per call to a shared [`TraceLog`]. Tests compare the log with the
//! expected call sequence; tools use it to inspect what a frame would submit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rivet_core::renderer::state::{
    AlphaTest, BlendFunction, DepthState, PolygonOffset, StencilFunction, StencilOp,
};
use rivet_core::renderer::{
    ClearMask, ColorMask, ConstantBufferLayout, PipelineFeatures, PixelFormat, PolygonMode,
    PrimitiveType, RenderBackend, RenderError, TriangleFace, VertexFormat,
};
use rivet_core::{Rect, Rgba};

/// An object identifier assigned by the trace backend, unique across every kind.
pub type ObjectId = u32;

/// The role a traced buffer was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// A vertex buffer.
    Vertex,
    /// An index buffer.
    Index,
    /// A constant buffer.
    Constant,
}

/// One call received by a [`TraceBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// A buffer was created.
    CreateBuffer {
        /// The new object.
        object: ObjectId,
        /// The buffer role.
        kind: BufferKind,
        /// The buffer size in bytes.
        size: usize,
    },
    /// A texture was created.
    CreateTexture {
        /// The new object.
        object: ObjectId,
        /// The width in pixels.
        width: u16,
        /// The height in pixels.
        height: u16,
        /// The pixel format.
        format: PixelFormat,
    },
    /// An input layout was created.
    CreateInputLayout {
        /// The new object.
        object: ObjectId,
        /// The described vertex format.
        format: VertexFormat,
    },
    /// A program was created.
    CreateProgram {
        /// The new object.
        object: ObjectId,
    },
    /// Bytes were written to the start of a buffer.
    WriteBuffer {
        /// The written buffer.
        object: ObjectId,
        /// A copy of the written bytes.
        data: Vec<u8>,
    },
    /// An object was destroyed.
    Destroy(ObjectId),
    /// The render target changed. `None` is the default framebuffer.
    SetRenderTarget(Option<ObjectId>),
    /// The viewport changed.
    SetViewport(Rect),
    /// The target was cleared.
    Clear {
        /// The clear color.
        color: Rgba,
        /// The clear depth.
        depth: f32,
        /// The clear stencil value.
        stencil: u8,
        /// The cleared planes.
        mask: ClearMask,
    },
    /// A vertex buffer was bound.
    BindVertexBuffer(Option<ObjectId>),
    /// An index buffer was bound.
    BindIndexBuffer(Option<ObjectId>),
    /// An input layout was bound.
    BindInputLayout(Option<ObjectId>),
    /// A program was bound.
    BindProgram {
        /// The program.
        program: Option<ObjectId>,
        /// The pipeline features it was bound with.
        features: PipelineFeatures,
    },
    /// A constant buffer was bound.
    BindConstantBuffer {
        /// The slot index.
        slot: usize,
        /// The buffer.
        buffer: Option<ObjectId>,
    },
    /// A texture was bound.
    BindTexture {
        /// The sampler index.
        sampler: usize,
        /// The texture.
        texture: Option<ObjectId>,
    },
    /// The blend function changed.
    SetBlendFunction(BlendFunction),
    /// The depth state changed.
    SetDepthState(DepthState),
    /// The alpha test changed.
    SetAlphaTest(AlphaTest),
    /// The culled face changed.
    SetCullFace(TriangleFace),
    /// The polygon offset changed.
    SetPolygonOffset(PolygonOffset),
    /// The polygon mode changed.
    SetPolygonMode(PolygonMode),
    /// The color write mask changed.
    SetColorMask(ColorMask),
    /// The stencil function changed.
    SetStencilFunction(StencilFunction),
    /// The stencil operations changed.
    SetStencilOp(StencilOp),
    /// The stencil write mask changed.
    SetStencilMask(u8),
    /// An indexed draw.
    DrawIndexed {
        /// The primitive topology.
        primitive: PrimitiveType,
        /// The first index.
        first: u32,
        /// The index count.
        count: u32,
    },
    /// A non-indexed draw.
    DrawPrimitives {
        /// The primitive topology.
        primitive: PrimitiveType,
        /// The first vertex.
        first: u32,
        /// The vertex count.
        count: u32,
    },
    /// Every binding was reset.
    ResetStates,
}

impl BackendCall {
    /// Returns `true` for calls that create, fill or destroy objects.
    pub fn is_resource_call(&self) -> bool {
        matches!(
            self,
            BackendCall::CreateBuffer { .. }
                | BackendCall::CreateTexture { .. }
                | BackendCall::CreateInputLayout { .. }
                | BackendCall::CreateProgram { .. }
                | BackendCall::WriteBuffer { .. }
                | BackendCall::Destroy(_)
        )
    }

    /// Returns `true` for draw calls.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            BackendCall::DrawIndexed { .. } | BackendCall::DrawPrimitives { .. }
        )
    }
}

/// A shared, clonable view of the calls a [`TraceBackend`] received.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl TraceLog {
    fn lock(&self) -> MutexGuard<'_, Vec<BackendCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: BackendCall) {
        log::trace!("{call:?}");
        self.lock().push(call);
    }

    /// Returns a copy of every recorded call.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().clone()
    }

    /// Returns the recorded calls that bind, clear or draw, skipping resource management.
    pub fn frame_calls(&self) -> Vec<BackendCall> {
        self.lock()
            .iter()
            .filter(|call| !call.is_resource_call())
            .cloned()
            .collect()
    }

    /// Removes and returns every recorded call.
    pub fn take(&self) -> Vec<BackendCall> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns the number of recorded draws.
    pub fn draw_count(&self) -> usize {
        self.lock().iter().filter(|call| call.is_draw()).count()
    }

    /// Returns the number of recorded calls.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every recorded call.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// A CPU copy of a buffer.
#[derive(Debug)]
pub struct TraceBuffer {
    object: ObjectId,
    kind: BufferKind,
    data: Vec<u8>,
}

impl TraceBuffer {
    /// Returns the backend object id.
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Returns the buffer role.
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Returns the buffer contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A CPU copy of a texture.
#[derive(Debug)]
pub struct TraceTexture {
    object: ObjectId,
    data: Vec<u8>,
}

impl TraceTexture {
    /// Returns the backend object id.
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Returns the pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A traced input layout.
#[derive(Debug)]
pub struct TraceInputLayout {
    object: ObjectId,
}

/// A traced program.
#[derive(Debug)]
pub struct TraceProgram {
    object: ObjectId,
}

/// A backend that executes nothing and records everything.
///
/// Object ids are assigned from one counter starting at 1, so the first created
/// object of any kind is object 1.
#[derive(Debug, Default)]
pub struct TraceBackend {
    log: TraceLog,
    next_object: ObjectId,
    live_objects: usize,
}

impl TraceBackend {
    /// Creates a backend with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the shared call log.
    pub fn log(&self) -> TraceLog {
        self.log.clone()
    }

    /// Returns the number of created objects not destroyed yet.
    pub fn live_objects(&self) -> usize {
        self.live_objects
    }

    fn allocate(&mut self) -> ObjectId {
        self.next_object += 1;
        self.live_objects += 1;
        self.next_object
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        data: Option<&[u8]>,
        size: usize,
    ) -> Result<TraceBuffer, RenderError> {
        let mut contents = vec![0; size];
        if let Some(data) = data {
            if data.len() < size {
                return Err(RenderError::Backend(format!(
                    "{kind:?} buffer of {size} bytes created from {} bytes",
                    data.len()
                )));
            }
            contents.copy_from_slice(&data[..size]);
        }

        let object = self.allocate();
        self.log.record(BackendCall::CreateBuffer { object, kind, size });
        Ok(TraceBuffer {
            object,
            kind,
            data: contents,
        })
    }

    fn destroy(&mut self, object: ObjectId) {
        self.live_objects = self.live_objects.saturating_sub(1);
        self.log.record(BackendCall::Destroy(object));
    }
}

impl RenderBackend for TraceBackend {
    type Buffer = TraceBuffer;
    type Texture = TraceTexture;
    type InputLayout = TraceInputLayout;
    type Program = TraceProgram;

    fn create_vertex_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
    ) -> Result<TraceBuffer, RenderError> {
        self.create_buffer(BufferKind::Vertex, data, size)
    }

    fn create_index_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
    ) -> Result<TraceBuffer, RenderError> {
        self.create_buffer(BufferKind::Index, data, size)
    }

    fn create_constant_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
        layout: ConstantBufferLayout,
    ) -> Result<TraceBuffer, RenderError> {
        let required = layout
            .iter()
            .map(|element| element.offset + element.ty.size())
            .max()
            .unwrap_or(0);
        if required > size {
            return Err(RenderError::Backend(format!(
                "constant buffer of {size} bytes cannot hold a layout of {required} bytes"
            )));
        }
        self.create_buffer(BufferKind::Constant, data, size)
    }

    fn create_texture(
        &mut self,
        data: Option<&[u8]>,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) -> Result<TraceTexture, RenderError> {
        let size = format.image_size(width, height);
        let contents = match data {
            Some(data) if data.len() < size => {
                return Err(RenderError::Backend(format!(
                    "{width}x{height} {format:?} texture needs {size} bytes, got {}",
                    data.len()
                )));
            }
            Some(data) => data[..size].to_vec(),
            None => vec![0; size],
        };

        let object = self.allocate();
        self.log.record(BackendCall::CreateTexture {
            object,
            width,
            height,
            format,
        });
        Ok(TraceTexture {
            object,
            data: contents,
        })
    }

    fn create_input_layout(
        &mut self,
        format: VertexFormat,
    ) -> Result<TraceInputLayout, RenderError> {
        let object = self.allocate();
        self.log
            .record(BackendCall::CreateInputLayout { object, format });
        Ok(TraceInputLayout { object })
    }

    fn create_program(
        &mut self,
        vertex: &str,
        fragment: &str,
    ) -> Result<TraceProgram, RenderError> {
        if vertex.trim().is_empty() || fragment.trim().is_empty() {
            return Err(RenderError::Backend(
                "program created from an empty shader source".to_owned(),
            ));
        }

        let object = self.allocate();
        self.log.record(BackendCall::CreateProgram { object });
        Ok(TraceProgram { object })
    }

    fn write_buffer(&mut self, buffer: &mut TraceBuffer, data: &[u8]) -> Result<(), RenderError> {
        if data.len() > buffer.data.len() {
            return Err(RenderError::Backend(format!(
                "write of {} bytes overflows buffer {} of {} bytes",
                data.len(),
                buffer.object,
                buffer.data.len()
            )));
        }

        buffer.data[..data.len()].copy_from_slice(data);
        self.log.record(BackendCall::WriteBuffer {
            object: buffer.object,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: TraceBuffer) {
        self.destroy(buffer.object);
    }

    fn destroy_texture(&mut self, texture: TraceTexture) {
        self.destroy(texture.object);
    }

    fn destroy_input_layout(&mut self, layout: TraceInputLayout) {
        self.destroy(layout.object);
    }

    fn destroy_program(&mut self, program: TraceProgram) {
        self.destroy(program.object);
    }

    fn set_render_target(&mut self, target: Option<&TraceTexture>) {
        self.log
            .record(BackendCall::SetRenderTarget(target.map(|t| t.object)));
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.log.record(BackendCall::SetViewport(viewport));
    }

    fn clear(&mut self, color: Rgba, depth: f32, stencil: u8, mask: ClearMask) {
        self.log.record(BackendCall::Clear {
            color,
            depth,
            stencil,
            mask,
        });
    }

    fn bind_vertex_buffer(&mut self, buffer: Option<&TraceBuffer>) {
        self.log
            .record(BackendCall::BindVertexBuffer(buffer.map(TraceBuffer::object)));
    }

    fn bind_index_buffer(&mut self, buffer: Option<&TraceBuffer>) {
        self.log
            .record(BackendCall::BindIndexBuffer(buffer.map(TraceBuffer::object)));
    }

    fn bind_input_layout(&mut self, layout: Option<&TraceInputLayout>) {
        self.log
            .record(BackendCall::BindInputLayout(layout.map(|l| l.object)));
    }

    fn bind_program(&mut self, program: Option<&TraceProgram>, features: PipelineFeatures) {
        self.log.record(BackendCall::BindProgram {
            program: program.map(|p| p.object),
            features,
        });
    }

    fn bind_constant_buffer(&mut self, slot: usize, buffer: Option<&TraceBuffer>) {
        self.log.record(BackendCall::BindConstantBuffer {
            slot,
            buffer: buffer.map(TraceBuffer::object),
        });
    }

    fn bind_texture(&mut self, sampler: usize, texture: Option<&TraceTexture>) {
        self.log.record(BackendCall::BindTexture {
            sampler,
            texture: texture.map(TraceTexture::object),
        });
    }

    fn set_blend_function(&mut self, blend: BlendFunction) {
        self.log.record(BackendCall::SetBlendFunction(blend));
    }

    fn set_depth_state(&mut self, depth: DepthState) {
        self.log.record(BackendCall::SetDepthState(depth));
    }

    fn set_alpha_test(&mut self, alpha: AlphaTest) {
        self.log.record(BackendCall::SetAlphaTest(alpha));
    }

    fn set_cull_face(&mut self, face: TriangleFace) {
        self.log.record(BackendCall::SetCullFace(face));
    }

    fn set_polygon_offset(&mut self, offset: PolygonOffset) {
        self.log.record(BackendCall::SetPolygonOffset(offset));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.log.record(BackendCall::SetPolygonMode(mode));
    }

    fn set_color_mask(&mut self, mask: ColorMask) {
        self.log.record(BackendCall::SetColorMask(mask));
    }

    fn set_stencil_function(&mut self, function: StencilFunction) {
        self.log.record(BackendCall::SetStencilFunction(function));
    }

    fn set_stencil_op(&mut self, op: StencilOp) {
        self.log.record(BackendCall::SetStencilOp(op));
    }

    fn set_stencil_mask(&mut self, mask: u8) {
        self.log.record(BackendCall::SetStencilMask(mask));
    }

    fn draw_indexed(&mut self, primitive: PrimitiveType, first: u32, count: u32) {
        self.log.record(BackendCall::DrawIndexed {
            primitive,
            first,
            count,
        });
    }

    fn draw_primitives(&mut self, primitive: PrimitiveType, first: u32, count: u32) {
        self.log.record(BackendCall::DrawPrimitives {
            primitive,
            first,
            count,
        });
    }

    fn reset_states(&mut self) {
        self.log.record(BackendCall::ResetStates);
    }
}
