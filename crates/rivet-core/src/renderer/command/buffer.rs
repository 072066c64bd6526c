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

//! The append-only, resettable command buffer.

use std::fmt;

use crate::math::{Rect, Rgba};
use crate::renderer::api::{ClearMask, PixelFormat, PrimitiveType, VertexFormat};
use crate::renderer::handle::{
    ConstantBufferId, IndexBufferId, InputLayoutId, ProgramId, TextureId, VertexBufferId,
};
use crate::renderer::settings::RenderSettings;
use crate::renderer::state::StateBlock;

use super::opcode::{Command, ConstantBufferLayout, OpCode, RenderTarget};
use super::payload::{DataBuffer, PayloadArena, PersistentBuffer};

/// Identifies a command buffer inside a [`RenderFrame`](crate::renderer::RenderFrame).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandBufferId(pub(crate) u32);

impl CommandBufferId {
    /// The entry point of every frame.
    pub const ENTRY_POINT: Self = Self(0);

    /// Returns the index of the buffer inside its frame's pool.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CommandBufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandBuffer#{}", self.0)
    }
}

/// Refers to a state block captured by a command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateIndex(u32);

/// The number of transient render targets a single command buffer may acquire.
pub const MAX_TRANSIENT_TARGETS: usize = 8;

/// A render target acquired from the executor's pool by a command buffer.
///
/// The index is local to the buffer that acquired it and is only meaningful to
/// commands recorded into that same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransientTarget(u8);

impl TransientTarget {
    /// Returns the slot of the target inside its command buffer.
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

/// An ordered stream of op-codes and the data they carry.
///
/// Commands are replayed in insertion order unless [`sort`](Self::sort) is called.
/// Data passed to the adopting upload methods is copied into the buffer's payload
/// arena and lives until [`reset`](Self::reset). Data passed as a
/// [`PersistentBuffer`] is only referenced.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    states: Vec<StateBlock>,
    payload: PayloadArena,
    persistent: Vec<PersistentBuffer>,
    transient_targets: u8,
}

impl CommandBuffer {
    /// Creates an empty command buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty command buffer with preallocated storage.
    pub fn with_capacity(commands: usize, payload_bytes: usize) -> Self {
        Self {
            commands: Vec::with_capacity(commands),
            states: Vec::with_capacity(commands),
            payload: PayloadArena::with_capacity(payload_bytes),
            persistent: Vec::new(),
            transient_targets: 0,
        }
    }

    /// Creates an empty command buffer sized from render settings.
    pub fn with_settings(settings: &RenderSettings) -> Self {
        Self::with_capacity(settings.command_capacity, settings.payload_capacity)
    }

    /// Appends a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Clears every command and releases every adopted payload.
    ///
    /// Storage capacity is kept for reuse. Calling `reset` on an empty buffer is a no-op.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.states.clear();
        self.payload.reset();
        self.persistent.clear();
        self.transient_targets = 0;
    }

    /// Records the replay of another command buffer of the same frame.
    ///
    /// The referenced buffer must stay alive and unmodified until this buffer executes.
    pub fn execute(&mut self, commands: CommandBufferId) {
        self.push(Command::new(0, OpCode::Execute(commands)));
    }

    /// Records the replay of another command buffer into a render target.
    ///
    /// Accepts a [`TextureId`], a [`TransientTarget`] acquired by this buffer, or
    /// `None` for the default framebuffer.
    pub fn render_to_target(
        &mut self,
        commands: CommandBufferId,
        target: impl Into<RenderTarget>,
        viewport: Rect,
    ) {
        self.push(Command::new(
            0,
            OpCode::RenderToTarget {
                target: target.into(),
                viewport,
                commands,
            },
        ));
    }

    /// Records taking a `width` x `height` render target from the executor's pool.
    ///
    /// The target stays loaded until [`release_render_target`](Self::release_render_target)
    /// or the end of this buffer's replay.
    ///
    /// # Panics
    ///
    /// Panics if this buffer already acquired [`MAX_TRANSIENT_TARGETS`] targets.
    pub fn acquire_render_target(
        &mut self,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) -> TransientTarget {
        assert!(
            (self.transient_targets as usize) < MAX_TRANSIENT_TARGETS,
            "a command buffer acquires at most {MAX_TRANSIENT_TARGETS} render targets"
        );
        let target = TransientTarget(self.transient_targets);
        self.transient_targets += 1;
        self.push(Command::new(
            0,
            OpCode::AcquireRenderTarget {
                target,
                width,
                height,
                format,
            },
        ));
        target
    }

    /// Records returning a transient render target to the executor's pool.
    pub fn release_render_target(&mut self, target: TransientTarget) {
        self.push(Command::new(0, OpCode::ReleaseRenderTarget(target)));
    }

    /// Records a clear of the bound render target.
    pub fn clear(&mut self, color: Rgba, depth: f32, stencil: u8, mask: ClearMask) {
        self.push(Command::new(
            0,
            OpCode::Clear {
                color,
                depth,
                stencil,
                mask,
            },
        ));
    }

    /// Copies `size` bytes of `data` into the payload arena.
    ///
    /// This is the only way data enters the arena. Without `data`, a size-only
    /// reservation is returned instead.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than `size`.
    pub fn adopt_data_buffer(&mut self, data: Option<&[u8]>, size: usize) -> DataBuffer {
        match data {
            Some(bytes) => {
                assert!(
                    bytes.len() >= size,
                    "adopted data holds {} bytes, {size} requested",
                    bytes.len()
                );
                self.payload.adopt(&bytes[..size])
            }
            None => DataBuffer::Reserved { size },
        }
    }

    fn reference_persistent(&mut self, data: &PersistentBuffer) -> DataBuffer {
        let index = self.persistent.len();
        self.persistent.push(data.clone());
        DataBuffer::Persistent {
            index,
            size: data.len(),
        }
    }

    /// Returns the bytes a data reference points to, or `None` for reservations.
    pub fn payload(&self, data: DataBuffer) -> Option<&[u8]> {
        match data {
            DataBuffer::Adopted { offset, size } => self.payload.get(offset, size),
            DataBuffer::Reserved { .. } => None,
            DataBuffer::Persistent { index, size } => self
                .persistent
                .get(index)
                .map(|buffer| &buffer.as_bytes()[..size]),
        }
    }

    /// Records a vertex buffer upload, copying `data`.
    pub fn upload_vertex_buffer(&mut self, id: VertexBufferId, data: Option<&[u8]>, size: usize) {
        let data = self.adopt_data_buffer(data, size);
        self.push(Command::new(0, OpCode::UploadVertexBuffer { id, data }));
    }

    /// Records a vertex buffer upload referencing caller-owned data.
    pub fn upload_vertex_buffer_persistent(&mut self, id: VertexBufferId, data: &PersistentBuffer) {
        let data = self.reference_persistent(data);
        self.push(Command::new(0, OpCode::UploadVertexBuffer { id, data }));
    }

    /// Records an index buffer upload, copying `data`.
    pub fn upload_index_buffer(&mut self, id: IndexBufferId, data: Option<&[u8]>, size: usize) {
        let data = self.adopt_data_buffer(data, size);
        self.push(Command::new(0, OpCode::UploadIndexBuffer { id, data }));
    }

    /// Records an index buffer upload referencing caller-owned data.
    pub fn upload_index_buffer_persistent(&mut self, id: IndexBufferId, data: &PersistentBuffer) {
        let data = self.reference_persistent(data);
        self.push(Command::new(0, OpCode::UploadIndexBuffer { id, data }));
    }

    /// Records a constant buffer upload, copying `data`.
    pub fn upload_constant_buffer(
        &mut self,
        id: ConstantBufferId,
        data: Option<&[u8]>,
        size: usize,
    ) {
        let data = self.adopt_data_buffer(data, size);
        self.push(Command::new(0, OpCode::UploadConstantBuffer { id, data }));
    }

    /// Records a constant buffer upload referencing caller-owned data.
    pub fn upload_constant_buffer_persistent(
        &mut self,
        id: ConstantBufferId,
        data: &PersistentBuffer,
    ) {
        let data = self.reference_persistent(data);
        self.push(Command::new(0, OpCode::UploadConstantBuffer { id, data }));
    }

    /// Records the construction of a vertex buffer.
    pub fn create_vertex_buffer(&mut self, id: VertexBufferId, data: Option<&[u8]>, size: usize) {
        let data = self.adopt_data_buffer(data, size);
        self.push(Command::new(0, OpCode::CreateVertexBuffer { id, data }));
    }

    /// Records the construction of an index buffer.
    pub fn create_index_buffer(&mut self, id: IndexBufferId, data: Option<&[u8]>, size: usize) {
        let data = self.adopt_data_buffer(data, size);
        self.push(Command::new(0, OpCode::CreateIndexBuffer { id, data }));
    }

    /// Records the construction of a constant buffer.
    pub fn create_constant_buffer(
        &mut self,
        id: ConstantBufferId,
        data: Option<&[u8]>,
        size: usize,
        layout: ConstantBufferLayout,
    ) {
        let data = self.adopt_data_buffer(data, size);
        self.push(Command::new(
            0,
            OpCode::CreateConstantBuffer { id, data, layout },
        ));
    }

    /// Records the construction of a texture.
    pub fn create_texture(
        &mut self,
        id: TextureId,
        data: Option<&[u8]>,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) {
        let data = self.adopt_data_buffer(data, format.image_size(width, height));
        self.push(Command::new(
            0,
            OpCode::CreateTexture {
                id,
                data,
                width,
                height,
                format,
            },
        ));
    }

    /// Records the construction of an input layout.
    pub fn create_input_layout(&mut self, id: InputLayoutId, format: VertexFormat) {
        self.push(Command::new(0, OpCode::CreateInputLayout { id, format }));
    }

    /// Records the construction of a program from shader sources.
    pub fn create_program(&mut self, id: ProgramId, vertex: &str, fragment: &str) {
        let vertex = self.adopt_data_buffer(Some(vertex.as_bytes()), vertex.len());
        let fragment = self.adopt_data_buffer(Some(fragment.as_bytes()), fragment.len());
        self.push(Command::new(
            0,
            OpCode::CreateProgram {
                id,
                vertex,
                fragment,
            },
        ));
    }

    fn capture_states(&mut self, states: &StateBlock) -> StateIndex {
        let index = StateIndex(self.states.len() as u32);
        self.states.push(*states);
        index
    }

    /// Records an indexed draw using a copy of `states`.
    ///
    /// Later changes to the block the caller passed do not affect the recorded draw.
    pub fn draw_indexed(
        &mut self,
        sorting: u64,
        primitive: PrimitiveType,
        states: &StateBlock,
        first: u32,
        count: u32,
    ) {
        let states = self.capture_states(states);
        self.push(Command::new(
            sorting,
            OpCode::DrawIndexed {
                primitive,
                first,
                count,
                states,
            },
        ));
    }

    /// Records a non-indexed draw using a copy of `states`.
    pub fn draw_primitives(
        &mut self,
        sorting: u64,
        primitive: PrimitiveType,
        states: &StateBlock,
        first: u32,
        count: u32,
    ) {
        let states = self.capture_states(states);
        self.push(Command::new(
            sorting,
            OpCode::DrawPrimitives {
                primitive,
                first,
                count,
                states,
            },
        ));
    }

    /// Records a state block that underlies every following draw until
    /// [`pop_state`](Self::pop_state).
    pub fn push_state(&mut self, states: &StateBlock) {
        let states = self.capture_states(states);
        self.push(Command::new(0, OpCode::PushState(states)));
    }

    /// Records the end of the innermost [`push_state`](Self::push_state).
    pub fn pop_state(&mut self) {
        self.push(Command::new(0, OpCode::PopState));
    }

    /// Stable-sorts each run of consecutive draws by sorting key.
    ///
    /// Every other op-code is a barrier that keeps its position, so draws never
    /// leave the state scope or follow the upload they were recorded around.
    pub fn sort(&mut self) {
        for run in self.commands.split_mut(|command| !command.op.is_draw()) {
            run.sort_by_key(|command| command.sorting);
        }
    }

    /// Returns the recorded commands in replay order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns a captured state block.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not produced by this buffer since its last reset.
    pub fn state(&self, index: StateIndex) -> &StateBlock {
        &self.states[index.0 as usize]
    }

    /// Returns the number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no command is recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the number of payload blocks adopted since the last reset.
    pub fn adopted_blocks(&self) -> usize {
        self.payload.blocks()
    }

    /// Returns the number of payload bytes adopted since the last reset.
    pub fn adopted_bytes(&self) -> usize {
        self.payload.len()
    }
}
