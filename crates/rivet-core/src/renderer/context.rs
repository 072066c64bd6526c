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

//! The executor that replays recorded frames against a [`RenderBackend`].

use std::collections::HashMap;

use crate::math::Rect;
use crate::renderer::api::{PixelFormat, PrimitiveType, VertexFormat};
use crate::renderer::command::{
    CommandBuffer, CommandBufferId, ConstantBufferLayout, DataBuffer, OpCode, RenderTarget,
    MAX_TRANSIENT_TARGETS,
};
use crate::renderer::error::{RenderError, ResolveError};
use crate::renderer::frame::RenderFrame;
use crate::renderer::handle::{
    ConstantBufferId, IndexBufferId, InputLayoutId, ProgramId, ResourceHandle, TextureId,
    VertexBufferId,
};
use crate::renderer::resources::HandleTable;
use crate::renderer::settings::RenderSettings;
use crate::renderer::state::{StateBlock, StateMask};
use crate::renderer::stats::ExecutionStats;
use crate::renderer::traits::{RenderBackend, ResourceFactory};

/// A render target owned by the context and lent to command buffers.
struct PooledTarget<T> {
    texture: T,
    width: u16,
    height: u16,
    format: PixelFormat,
    free: bool,
}

/// The target draws are currently routed to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ActiveTarget {
    Framebuffer,
    Texture(TextureId),
    Pooled(usize),
}

/// Pool indices of the transient targets loaded by one command buffer replay.
type TransientSlots = [Option<usize>; MAX_TRANSIENT_TARGETS];

/// Owns a backend, the tables resolving handles to its objects, and the replay state.
///
/// Resource requests are recorded into a construction buffer that runs at the start
/// of the next [`display`](Self::display). Unresolvable handles never abort a frame:
/// the affected draw or upload is skipped, logged and counted in [`ExecutionStats`].
/// Cyclic or over-deep `Execute` chains are programming errors and panic.
pub struct RenderingContext<B: RenderBackend> {
    backend: B,
    settings: RenderSettings,
    vertex_buffers: HandleTable<VertexBufferId, B::Buffer>,
    index_buffers: HandleTable<IndexBufferId, B::Buffer>,
    constant_buffers: HandleTable<ConstantBufferId, B::Buffer>,
    textures: HandleTable<TextureId, B::Texture>,
    input_layouts: HandleTable<InputLayoutId, B::InputLayout>,
    programs: HandleTable<ProgramId, B::Program>,
    input_layout_cache: HashMap<VertexFormat, InputLayoutId>,
    render_targets: Vec<PooledTarget<B::Texture>>,
    construction: CommandBuffer,
    bound: StateBlock,
    replay_states: Vec<StateBlock>,
    target: ActiveTarget,
    viewport: Rect,
    stats: ExecutionStats,
}

impl<B: RenderBackend> RenderingContext<B> {
    /// Creates a context that executes against `backend`.
    pub fn new(backend: B, settings: RenderSettings) -> Self {
        log::info!(
            "Rendering context created (max execute depth {}).",
            settings.max_execute_depth
        );
        Self {
            backend,
            construction: CommandBuffer::with_settings(&settings),
            replay_states: Vec::with_capacity(settings.max_state_stack_depth),
            settings,
            vertex_buffers: HandleTable::new(),
            index_buffers: HandleTable::new(),
            constant_buffers: HandleTable::new(),
            textures: HandleTable::new(),
            input_layouts: HandleTable::new(),
            programs: HandleTable::new(),
            input_layout_cache: HashMap::new(),
            render_targets: Vec::new(),
            bound: StateBlock::new(),
            target: ActiveTarget::Framebuffer,
            viewport: Rect::UNIT,
            stats: ExecutionStats::default(),
        }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the backend for direct use.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Returns the settings this context was created with.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Returns the counters of the last displayed frame.
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Returns the number of pooled render targets and how many of them are free.
    pub fn render_target_pool(&self) -> (usize, usize) {
        let free = self.render_targets.iter().filter(|target| target.free).count();
        (self.render_targets.len(), free)
    }

    /// Returns the number of recorded resource constructions waiting for the next frame.
    pub fn pending_constructions(&self) -> usize {
        self.construction.len()
    }

    /// Executes a recorded frame, then clears it for reuse.
    ///
    /// Pending resource constructions run first, then the frame's entry point.
    pub fn display(&mut self, frame: &mut RenderFrame) {
        let info = *frame.info();
        self.stats = ExecutionStats::for_frame(info.frame_number);
        self.viewport = info.viewport;
        self.target = ActiveTarget::Framebuffer;
        log::trace!("Displaying frame {}.", info.frame_number);

        self.construct_resources(frame);
        self.execute_command_buffer(frame, CommandBufferId::ENTRY_POINT);

        if !self.replay_states.is_empty() {
            log::warn!(
                "Frame {} left {} state blocks pushed.",
                info.frame_number,
                self.replay_states.len()
            );
            self.replay_states.clear();
        }

        frame.clear();
        log::trace!(
            "Frame {} done: {} draws, {} skipped.",
            info.frame_number,
            self.stats.draw_calls,
            self.stats.skipped()
        );
    }

    /// Replays one command buffer of `frame`, following its `Execute` chains.
    pub fn execute_command_buffer(&mut self, frame: &RenderFrame, id: CommandBufferId) {
        let mut in_flight = Vec::with_capacity(self.settings.max_execute_depth);
        self.execute_nested(frame, id, &mut in_flight);
    }

    /// Unbinds everything on the backend and forgets the cached bindings.
    pub fn reset_states(&mut self) {
        self.backend.reset_states();
        self.bound = StateBlock::new();
    }

    /// Destroys every backend object and invalidates every handle.
    pub fn release_all(&mut self) {
        self.reset_states();
        for buffer in self.vertex_buffers.drain() {
            self.backend.destroy_buffer(buffer);
        }
        for buffer in self.index_buffers.drain() {
            self.backend.destroy_buffer(buffer);
        }
        for buffer in self.constant_buffers.drain() {
            self.backend.destroy_buffer(buffer);
        }
        for texture in self.textures.drain() {
            self.backend.destroy_texture(texture);
        }
        for layout in self.input_layouts.drain() {
            self.backend.destroy_input_layout(layout);
        }
        for program in self.programs.drain() {
            self.backend.destroy_program(program);
        }
        for target in self.render_targets.drain(..) {
            self.backend.destroy_texture(target.texture);
        }
        self.input_layout_cache.clear();
        self.construction.reset();
    }

    fn construct_resources(&mut self, frame: &RenderFrame) {
        if self.construction.is_empty() {
            return;
        }

        let mut construction = std::mem::take(&mut self.construction);
        log::debug!("Constructing {} resources.", construction.len());
        self.stats.command_buffers_executed += 1;

        let mut in_flight = Vec::new();
        self.replay(frame, &construction, &mut in_flight);

        construction.reset();
        self.construction = construction;
    }

    fn execute_nested(
        &mut self,
        frame: &RenderFrame,
        id: CommandBufferId,
        in_flight: &mut Vec<CommandBufferId>,
    ) {
        assert!(
            !in_flight.contains(&id),
            "{id:?} executes itself through {in_flight:?}"
        );
        assert!(
            in_flight.len() < self.settings.max_execute_depth,
            "command buffers nest deeper than {} levels",
            self.settings.max_execute_depth
        );

        in_flight.push(id);
        self.stats.command_buffers_executed += 1;
        self.replay(frame, frame.command_buffer(id), in_flight);
        in_flight.pop();
    }

    fn replay(
        &mut self,
        frame: &RenderFrame,
        buffer: &CommandBuffer,
        in_flight: &mut Vec<CommandBufferId>,
    ) {
        let mut transients: TransientSlots = [None; MAX_TRANSIENT_TARGETS];
        for command in buffer.commands() {
            match command.op {
                OpCode::Clear {
                    color,
                    depth,
                    stencil,
                    mask,
                } => self.backend.clear(color, depth, stencil, mask),
                OpCode::Execute(id) => self.execute_nested(frame, id, in_flight),
                OpCode::RenderToTarget {
                    target,
                    viewport,
                    commands,
                } => {
                    self.render_to_target(frame, &transients, target, viewport, commands, in_flight)
                }
                OpCode::AcquireRenderTarget {
                    target,
                    width,
                    height,
                    format,
                } => {
                    let slot = &mut transients[target.slot()];
                    if let Some(previous) = slot.take() {
                        self.render_targets[previous].free = true;
                    }
                    *slot = self.acquire_render_target(width, height, format);
                }
                OpCode::ReleaseRenderTarget(target) => match transients[target.slot()].take() {
                    Some(index) => self.render_targets[index].free = true,
                    None => log::warn!("{target:?} released without being acquired."),
                },
                OpCode::UploadVertexBuffer { id, data } => upload(
                    &mut self.backend,
                    &mut self.vertex_buffers,
                    &mut self.stats,
                    id,
                    buffer.payload(data),
                ),
                OpCode::UploadIndexBuffer { id, data } => upload(
                    &mut self.backend,
                    &mut self.index_buffers,
                    &mut self.stats,
                    id,
                    buffer.payload(data),
                ),
                OpCode::UploadConstantBuffer { id, data } => upload(
                    &mut self.backend,
                    &mut self.constant_buffers,
                    &mut self.stats,
                    id,
                    buffer.payload(data),
                ),
                OpCode::CreateVertexBuffer { id, data } => {
                    let created = self
                        .backend
                        .create_vertex_buffer(buffer.payload(data), data.size());
                    if let Some(orphan) =
                        construct(&mut self.vertex_buffers, &mut self.stats, id, created)
                    {
                        self.backend.destroy_buffer(orphan);
                    }
                }
                OpCode::CreateIndexBuffer { id, data } => {
                    let created = self
                        .backend
                        .create_index_buffer(buffer.payload(data), data.size());
                    if let Some(orphan) =
                        construct(&mut self.index_buffers, &mut self.stats, id, created)
                    {
                        self.backend.destroy_buffer(orphan);
                    }
                }
                OpCode::CreateConstantBuffer { id, data, layout } => {
                    let created = self.backend.create_constant_buffer(
                        buffer.payload(data),
                        data.size(),
                        layout,
                    );
                    if let Some(orphan) =
                        construct(&mut self.constant_buffers, &mut self.stats, id, created)
                    {
                        self.backend.destroy_buffer(orphan);
                    }
                }
                OpCode::CreateTexture {
                    id,
                    data,
                    width,
                    height,
                    format,
                } => {
                    let created =
                        self.backend
                            .create_texture(buffer.payload(data), width, height, format);
                    if let Some(orphan) =
                        construct(&mut self.textures, &mut self.stats, id, created)
                    {
                        self.backend.destroy_texture(orphan);
                    }
                }
                OpCode::CreateInputLayout { id, format } => {
                    let created = self.backend.create_input_layout(format);
                    if let Some(orphan) =
                        construct(&mut self.input_layouts, &mut self.stats, id, created)
                    {
                        self.backend.destroy_input_layout(orphan);
                    }
                }
                OpCode::CreateProgram {
                    id,
                    vertex,
                    fragment,
                } => {
                    let created =
                        match (shader_source(buffer, vertex), shader_source(buffer, fragment)) {
                            (Ok(vertex), Ok(fragment)) => {
                                self.backend.create_program(vertex, fragment)
                            }
                            (Err(e), _) | (_, Err(e)) => Err(e),
                        };
                    if let Some(orphan) =
                        construct(&mut self.programs, &mut self.stats, id, created)
                    {
                        self.backend.destroy_program(orphan);
                    }
                }
                OpCode::DrawIndexed {
                    primitive,
                    first,
                    count,
                    states,
                } => self.draw(buffer.state(states), primitive, first, count, true),
                OpCode::DrawPrimitives {
                    primitive,
                    first,
                    count,
                    states,
                } => self.draw(buffer.state(states), primitive, first, count, false),
                OpCode::PushState(states) => {
                    let block = self.resolve_over_pushed(buffer.state(states));
                    self.replay_states.push(block);
                }
                OpCode::PopState => {
                    assert!(
                        self.replay_states.pop().is_some(),
                        "PopState without a matching PushState"
                    );
                }
            }
        }

        for index in transients.into_iter().flatten() {
            log::warn!("A transient render target was not released before its buffer ended.");
            self.render_targets[index].free = true;
        }
    }

    /// Lends a free pooled target matching the request, creating one when none is free.
    fn acquire_render_target(
        &mut self,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) -> Option<usize> {
        let reusable = self.render_targets.iter().position(|target| {
            target.free
                && target.width == width
                && target.height == height
                && target.format == format
        });
        if let Some(index) = reusable {
            self.render_targets[index].free = false;
            return Some(index);
        }

        match self.backend.create_texture(None, width, height, format) {
            Ok(texture) => {
                self.render_targets.push(PooledTarget {
                    texture,
                    width,
                    height,
                    format,
                    free: false,
                });
                log::debug!("Pooled a {width}x{height} {format:?} render target.");
                Some(self.render_targets.len() - 1)
            }
            Err(e) => {
                log::error!("Failed to create a {width}x{height} render target: {e}");
                None
            }
        }
    }

    fn render_to_target(
        &mut self,
        frame: &RenderFrame,
        transients: &TransientSlots,
        target: RenderTarget,
        viewport: Rect,
        commands: CommandBufferId,
        in_flight: &mut Vec<CommandBufferId>,
    ) {
        let active = match target {
            RenderTarget::Framebuffer => ActiveTarget::Framebuffer,
            RenderTarget::Texture(id) => {
                if let Err(e) = self.textures.get(id) {
                    log::warn!("Skipping render to target: {e}");
                    self.stats.draws_skipped += 1;
                    return;
                }
                ActiveTarget::Texture(id)
            }
            RenderTarget::Transient(transient) => match transients[transient.slot()] {
                Some(index) => ActiveTarget::Pooled(index),
                None => {
                    log::warn!("Skipping render to {transient:?}: no target is loaded.");
                    self.stats.draws_skipped += 1;
                    return;
                }
            },
        };

        let previous = (self.target, self.viewport);
        self.apply_target(active, viewport);
        self.execute_nested(frame, commands, in_flight);
        self.apply_target(previous.0, previous.1);
    }

    fn apply_target(&mut self, target: ActiveTarget, viewport: Rect) {
        let texture = match target {
            ActiveTarget::Framebuffer => None,
            ActiveTarget::Texture(id) => self.textures.get(id).ok(),
            ActiveTarget::Pooled(index) => Some(&self.render_targets[index].texture),
        };
        self.backend.set_render_target(texture);
        self.backend.set_viewport(viewport);
        self.target = target;
        self.viewport = viewport;
    }

    fn resolve_over_pushed(&self, block: &StateBlock) -> StateBlock {
        match self.replay_states.last() {
            Some(base) => block.merged_over(base),
            None => *block,
        }
    }

    fn draw(
        &mut self,
        captured: &StateBlock,
        primitive: PrimitiveType,
        first: u32,
        count: u32,
        indexed: bool,
    ) {
        let resolved = self.resolve_over_pushed(captured);
        if let Err(e) = self.bind_states(&resolved) {
            log::warn!("Skipping draw call: {e}");
            self.stats.draws_skipped += 1;
            return;
        }

        if indexed {
            self.backend.draw_indexed(primitive, first, count);
        } else {
            self.backend.draw_primitives(primitive, first, count);
        }
        self.stats.draw_calls += 1;
    }

    fn validate(&self, states: &StateBlock) -> Result<(), ResolveError> {
        if let Some(id) = states.vertex_buffer() {
            self.vertex_buffers.get(id)?;
        }
        if let Some(id) = states.index_buffer() {
            self.index_buffers.get(id)?;
        }
        if let Some(id) = states.input_layout() {
            self.input_layouts.get(id)?;
        }
        if let Some(id) = states.program() {
            self.programs.get(id)?;
        }
        for id in states.constant_buffers().iter().flatten() {
            self.constant_buffers.get(*id)?;
        }
        for id in states.textures().iter().flatten() {
            self.textures.get(*id)?;
        }
        Ok(())
    }

    fn bind_states(&mut self, states: &StateBlock) -> Result<(), ResolveError> {
        self.validate(states)?;

        let changed = states.diff(&self.bound);
        if changed.is_empty() {
            return Ok(());
        }

        let backend = &mut self.backend;
        let mut applied = 0;

        if changed.contains(StateMask::VERTEX_BUFFER) {
            let buffer = resolve(&self.vertex_buffers, states.vertex_buffer())?;
            backend.bind_vertex_buffer(buffer);
            applied += 1;
        }
        if changed.contains(StateMask::INDEX_BUFFER) {
            let buffer = resolve(&self.index_buffers, states.index_buffer())?;
            backend.bind_index_buffer(buffer);
            applied += 1;
        }
        if changed.contains(StateMask::INPUT_LAYOUT) {
            let layout = resolve(&self.input_layouts, states.input_layout())?;
            backend.bind_input_layout(layout);
            applied += 1;
        }
        if changed.contains(StateMask::PROGRAM) {
            let program = resolve(&self.programs, states.program())?;
            backend.bind_program(program, states.features());
            applied += 1;
        }
        for (slot, id) in states.constant_buffers().iter().enumerate() {
            if changed.contains(StateMask::constant_buffer(slot)) {
                let buffer = resolve(&self.constant_buffers, *id)?;
                backend.bind_constant_buffer(slot, buffer);
                applied += 1;
            }
        }
        for (sampler, id) in states.textures().iter().enumerate() {
            if changed.contains(StateMask::texture(sampler)) {
                let texture = resolve(&self.textures, *id)?;
                backend.bind_texture(sampler, texture);
                applied += 1;
            }
        }
        if changed.contains(StateMask::BLENDING) {
            backend.set_blend_function(states.blending());
            applied += 1;
        }
        if changed.contains(StateMask::DEPTH_STATE) {
            backend.set_depth_state(states.depth_state());
            applied += 1;
        }
        if changed.contains(StateMask::ALPHA_TEST) {
            backend.set_alpha_test(states.alpha_test());
            applied += 1;
        }
        if changed.contains(StateMask::CULL_FACE) {
            backend.set_cull_face(states.cull_face());
            applied += 1;
        }
        if changed.contains(StateMask::POLYGON_OFFSET) {
            backend.set_polygon_offset(states.polygon_offset());
            applied += 1;
        }
        if changed.contains(StateMask::POLYGON_MODE) {
            backend.set_polygon_mode(states.polygon_mode());
            applied += 1;
        }
        if changed.contains(StateMask::COLOR_MASK) {
            backend.set_color_mask(states.color_mask());
            applied += 1;
        }
        if changed.contains(StateMask::STENCIL_FUNCTION) {
            backend.set_stencil_function(states.stencil_function());
            applied += 1;
        }
        if changed.contains(StateMask::STENCIL_OP) {
            backend.set_stencil_op(states.stencil_op());
            applied += 1;
        }
        if changed.contains(StateMask::STENCIL_MASK) {
            backend.set_stencil_mask(states.stencil_mask());
            applied += 1;
        }

        self.bound = *states;
        self.stats.state_changes += applied;
        Ok(())
    }

    fn forget_if_bound(&mut self, bound: bool) {
        if bound {
            self.reset_states();
        }
    }
}

impl<B: RenderBackend> ResourceFactory for RenderingContext<B> {
    fn request_vertex_buffer(&mut self, data: Option<&[u8]>, size: usize) -> VertexBufferId {
        let id = self.vertex_buffers.allocate();
        self.construction.create_vertex_buffer(id, data, size);
        log::debug!("Requested {id:?} ({size} bytes).");
        id
    }

    fn request_index_buffer(&mut self, data: Option<&[u8]>, size: usize) -> IndexBufferId {
        let id = self.index_buffers.allocate();
        self.construction.create_index_buffer(id, data, size);
        log::debug!("Requested {id:?} ({size} bytes).");
        id
    }

    fn request_constant_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
        layout: ConstantBufferLayout,
    ) -> ConstantBufferId {
        let id = self.constant_buffers.allocate();
        self.construction
            .create_constant_buffer(id, data, size, layout);
        log::debug!("Requested {id:?} ({size} bytes, {} uniforms).", layout.len());
        id
    }

    fn request_texture(
        &mut self,
        data: Option<&[u8]>,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) -> TextureId {
        let id = self.textures.allocate();
        self.construction
            .create_texture(id, data, width, height, format);
        log::debug!("Requested {id:?} ({width}x{height} {format:?}).");
        id
    }

    fn request_input_layout(&mut self, format: VertexFormat) -> InputLayoutId {
        let format = VertexFormat::new(format);
        if let Some(id) = self.input_layout_cache.get(&format) {
            return *id;
        }

        let id = self.input_layouts.allocate();
        self.construction.create_input_layout(id, format);
        self.input_layout_cache.insert(format, id);
        log::debug!("Requested {id:?} for {format:?}.");
        id
    }

    fn request_program(&mut self, vertex: &str, fragment: &str) -> ProgramId {
        let id = self.programs.allocate();
        self.construction.create_program(id, vertex, fragment);
        log::debug!("Requested {id:?}.");
        id
    }

    fn release_vertex_buffer(&mut self, id: VertexBufferId) -> Result<(), ResolveError> {
        let released = self.vertex_buffers.release(id)?;
        self.forget_if_bound(self.bound.vertex_buffer() == Some(id));
        if let Some(buffer) = released {
            self.backend.destroy_buffer(buffer);
        }
        Ok(())
    }

    fn release_index_buffer(&mut self, id: IndexBufferId) -> Result<(), ResolveError> {
        let released = self.index_buffers.release(id)?;
        self.forget_if_bound(self.bound.index_buffer() == Some(id));
        if let Some(buffer) = released {
            self.backend.destroy_buffer(buffer);
        }
        Ok(())
    }

    fn release_constant_buffer(&mut self, id: ConstantBufferId) -> Result<(), ResolveError> {
        let released = self.constant_buffers.release(id)?;
        self.forget_if_bound(self.bound.constant_buffers().contains(&Some(id)));
        if let Some(buffer) = released {
            self.backend.destroy_buffer(buffer);
        }
        Ok(())
    }

    fn release_texture(&mut self, id: TextureId) -> Result<(), ResolveError> {
        let released = self.textures.release(id)?;
        self.forget_if_bound(self.bound.textures().contains(&Some(id)));
        if let Some(texture) = released {
            self.backend.destroy_texture(texture);
        }
        Ok(())
    }

    fn release_input_layout(&mut self, id: InputLayoutId) -> Result<(), ResolveError> {
        let released = self.input_layouts.release(id)?;
        self.input_layout_cache.retain(|_, cached| *cached != id);
        self.forget_if_bound(self.bound.input_layout() == Some(id));
        if let Some(layout) = released {
            self.backend.destroy_input_layout(layout);
        }
        Ok(())
    }

    fn release_program(&mut self, id: ProgramId) -> Result<(), ResolveError> {
        let released = self.programs.release(id)?;
        self.forget_if_bound(self.bound.program() == Some(id));
        if let Some(program) = released {
            self.backend.destroy_program(program);
        }
        Ok(())
    }
}

impl<B: RenderBackend> Drop for RenderingContext<B> {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn resolve<H: ResourceHandle, T>(
    table: &HandleTable<H, T>,
    id: Option<H>,
) -> Result<Option<&T>, ResolveError> {
    id.map(|id| table.get(id)).transpose()
}

fn upload<B: RenderBackend, H: ResourceHandle>(
    backend: &mut B,
    table: &mut HandleTable<H, B::Buffer>,
    stats: &mut ExecutionStats,
    id: H,
    bytes: Option<&[u8]>,
) {
    let Some(bytes) = bytes else {
        log::debug!("Upload to {id:?} carries no data.");
        return;
    };

    match table.get_mut(id) {
        Ok(buffer) => match backend.write_buffer(buffer, bytes) {
            Ok(()) => stats.uploads += 1,
            Err(e) => {
                log::error!("Failed to write {id:?}: {e}");
                stats.uploads_skipped += 1;
            }
        },
        Err(e) => {
            log::warn!("Skipping upload: {e}");
            stats.uploads_skipped += 1;
        }
    }
}

/// Stores a freshly constructed object, returning it back if its handle was released meanwhile.
fn construct<H: ResourceHandle, T>(
    table: &mut HandleTable<H, T>,
    stats: &mut ExecutionStats,
    id: H,
    created: Result<T, RenderError>,
) -> Option<T> {
    match created {
        Ok(object) => {
            if !table.is_live(id) {
                log::debug!("{id:?} was released before construction.");
                return Some(object);
            }
            stats.resources_constructed += 1;
            log::debug!("Constructed {} {id:?}.", H::KIND);
            table.insert(id, object).ok().flatten()
        }
        Err(e) => {
            log::error!("Failed to construct {id:?}: {e}");
            None
        }
    }
}

fn shader_source(buffer: &CommandBuffer, data: DataBuffer) -> Result<&str, RenderError> {
    let bytes = buffer
        .payload(data)
        .ok_or_else(|| RenderError::Backend("shader source is missing".to_string()))?;
    std::str::from_utf8(bytes).map_err(|e| RenderError::Backend(e.to_string()))
}
