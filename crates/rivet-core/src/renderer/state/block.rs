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

use crate::renderer::api::{
    BlendFactor, ColorMask, Compare, PipelineFeatures, PolygonMode, StencilAction, TriangleFace,
};
use crate::renderer::handle::{
    ConstantBufferId, IndexBufferId, InputLayoutId, ProgramId, TextureId, VertexBufferId,
};
use crate::rivet_bitflags;

/// The number of constant buffer binding slots.
pub const MAX_CONSTANT_BUFFERS: usize = 8;

/// The number of texture samplers.
pub const MAX_TEXTURE_SAMPLERS: usize = 8;

// Slot bits live in the upper half of `StateMask`.
const _: () = assert!(MAX_CONSTANT_BUFFERS <= 8 && MAX_TEXTURE_SAMPLERS <= 8);

rivet_bitflags! {
    /// Records which slots of a [`StateBlock`] have been set.
    pub struct StateMask: u32 {
        /// The vertex buffer binding.
        const VERTEX_BUFFER = 1 << 0;
        /// The index buffer binding.
        const INDEX_BUFFER = 1 << 1;
        /// The input layout binding.
        const INPUT_LAYOUT = 1 << 2;
        /// The program binding.
        const PROGRAM = 1 << 3;
        /// The blend function.
        const BLENDING = 1 << 4;
        /// The depth test function and write flag.
        const DEPTH_STATE = 1 << 5;
        /// The alpha test function and reference.
        const ALPHA_TEST = 1 << 6;
        /// The face culling mode.
        const CULL_FACE = 1 << 7;
        /// The polygon offset.
        const POLYGON_OFFSET = 1 << 8;
        /// The polygon rasterization mode.
        const POLYGON_MODE = 1 << 9;
        /// The color write mask.
        const COLOR_MASK = 1 << 10;
        /// The stencil test function.
        const STENCIL_FUNCTION = 1 << 11;
        /// The stencil actions.
        const STENCIL_OP = 1 << 12;
        /// The stencil write mask.
        const STENCIL_MASK = 1 << 13;
        /// Every constant buffer slot.
        const CONSTANT_BUFFERS = 0xff << 16;
        /// Every texture sampler.
        const TEXTURES = 0xff << 24;
    }
}

impl StateMask {
    /// Returns the bit tracking constant buffer slot `index`.
    pub const fn constant_buffer(index: usize) -> Self {
        Self::from_bits_retain(1 << (16 + index))
    }

    /// Returns the bit tracking texture sampler `sampler`.
    pub const fn texture(sampler: usize) -> Self {
        Self::from_bits_retain(1 << (24 + sampler))
    }
}

/// Semantic constant buffer slots shared by producers and shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantBufferSlot {
    /// Per-frame globals (camera, time).
    Globals = 0,
    /// Per-pass parameters.
    Pass = 1,
    /// Per-instance transform.
    InstanceConstants = 2,
    /// Material parameters.
    MaterialConstants = 3,
    /// Light parameters.
    Light = 4,
    /// Shadow parameters.
    Shadow = 5,
    /// Clipping planes.
    Clipping = 6,
    /// Skinning matrices.
    Skinning = 7,
}

impl ConstantBufferSlot {
    /// Returns the binding index of this slot.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A source and destination blend factor pair.
///
/// `One, Zero` writes the source color unchanged and is the disabled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFunction {
    /// The factor applied to the incoming color.
    pub src: BlendFactor,
    /// The factor applied to the stored color.
    pub dst: BlendFactor,
}

impl Default for BlendFunction {
    fn default() -> Self {
        Self {
            src: BlendFactor::One,
            dst: BlendFactor::Zero,
        }
    }
}

/// The depth test function and depth write flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    /// The depth compare function.
    pub function: Compare,
    /// Whether passing fragments write their depth.
    pub write: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            function: Compare::Less,
            write: true,
        }
    }
}

/// The alpha test function and its reference value in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaTest {
    /// The compare function. `Always` disables the test.
    pub function: Compare,
    /// The reference value.
    pub reference: u8,
}

impl AlphaTest {
    /// Returns the reference value normalized to `0.0..=1.0`.
    pub fn reference_f32(&self) -> f32 {
        f32::from(self.reference) / 255.0
    }
}

impl Default for AlphaTest {
    fn default() -> Self {
        Self {
            function: Compare::Always,
            reference: 0,
        }
    }
}

/// Depth offset applied to polygons. Zero on both axes disables the offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolygonOffset {
    /// Scales the maximum depth slope.
    pub factor: f32,
    /// Scales the smallest resolvable depth difference.
    pub units: f32,
}

/// The stencil test function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFunction {
    /// The compare function. `Always` disables the test.
    pub function: Compare,
    /// The reference value.
    pub reference: u8,
    /// The mask applied to both values before comparing.
    pub mask: u8,
}

impl Default for StencilFunction {
    fn default() -> Self {
        Self {
            function: Compare::Always,
            reference: 0,
            mask: 0xff,
        }
    }
}

/// Actions applied to the stencil buffer depending on the test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilOp {
    /// Applied when the stencil test fails.
    pub stencil_fail: StencilAction,
    /// Applied when the stencil test passes and the depth test fails.
    pub depth_fail: StencilAction,
    /// Applied when both tests pass.
    pub depth_pass: StencilAction,
}

impl Default for StencilOp {
    fn default() -> Self {
        Self {
            stencil_fail: StencilAction::Keep,
            depth_fail: StencilAction::Keep,
            depth_pass: StencilAction::Keep,
        }
    }
}

/// A fully value-typed set of pipeline bindings attached to a draw call.
///
/// Only slots recorded in [`mask`](Self::mask) are considered set. Unset slots
/// hold their default value and are inherited when the block is merged over a
/// parent. Pipeline features accumulate: a block enables the union of every
/// enabled feature minus the union of every disabled one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateBlock {
    mask: StateMask,
    enabled_features: PipelineFeatures,
    disabled_features: PipelineFeatures,
    vertex_buffer: Option<VertexBufferId>,
    index_buffer: Option<IndexBufferId>,
    input_layout: Option<InputLayoutId>,
    program: Option<ProgramId>,
    constant_buffers: [Option<ConstantBufferId>; MAX_CONSTANT_BUFFERS],
    textures: [Option<TextureId>; MAX_TEXTURE_SAMPLERS],
    blending: BlendFunction,
    depth_state: DepthState,
    alpha_test: AlphaTest,
    cull_face: TriangleFace,
    polygon_offset: PolygonOffset,
    polygon_mode: PolygonMode,
    color_mask: ColorMask,
    stencil_function: StencilFunction,
    stencil_op: StencilOp,
    stencil_mask: u8,
}

impl Default for StateBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl StateBlock {
    /// Creates a block with no slot set.
    pub fn new() -> Self {
        Self {
            mask: StateMask::EMPTY,
            enabled_features: PipelineFeatures::EMPTY,
            disabled_features: PipelineFeatures::EMPTY,
            vertex_buffer: None,
            index_buffer: None,
            input_layout: None,
            program: None,
            constant_buffers: [None; MAX_CONSTANT_BUFFERS],
            textures: [None; MAX_TEXTURE_SAMPLERS],
            blending: BlendFunction::default(),
            depth_state: DepthState::default(),
            alpha_test: AlphaTest::default(),
            cull_face: TriangleFace::default(),
            polygon_offset: PolygonOffset::default(),
            polygon_mode: PolygonMode::default(),
            color_mask: ColorMask::ALL,
            stencil_function: StencilFunction::default(),
            stencil_op: StencilOp::default(),
            stencil_mask: 0xff,
        }
    }

    /// Returns the set of slots this block sets.
    pub fn mask(&self) -> StateMask {
        self.mask
    }

    /// Returns `true` if no slot is set and no feature is toggled.
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
            && self.enabled_features.is_empty()
            && self.disabled_features.is_empty()
    }

    /// Binds a vertex buffer.
    pub fn bind_vertex_buffer(&mut self, id: VertexBufferId) -> &mut Self {
        self.vertex_buffer = Some(id);
        self.mask.insert(StateMask::VERTEX_BUFFER);
        self
    }

    /// Binds an index buffer.
    pub fn bind_index_buffer(&mut self, id: IndexBufferId) -> &mut Self {
        self.index_buffer = Some(id);
        self.mask.insert(StateMask::INDEX_BUFFER);
        self
    }

    /// Binds an input layout.
    pub fn bind_input_layout(&mut self, id: InputLayoutId) -> &mut Self {
        self.input_layout = Some(id);
        self.mask.insert(StateMask::INPUT_LAYOUT);
        self
    }

    /// Binds a program.
    pub fn bind_program(&mut self, id: ProgramId) -> &mut Self {
        self.program = Some(id);
        self.mask.insert(StateMask::PROGRAM);
        self
    }

    /// Binds a constant buffer to a semantic slot.
    pub fn bind_constant_buffer(
        &mut self,
        id: ConstantBufferId,
        slot: ConstantBufferSlot,
    ) -> &mut Self {
        let index = slot.index();
        self.constant_buffers[index] = Some(id);
        self.mask.insert(StateMask::constant_buffer(index));
        self
    }

    /// Binds a texture to a sampler.
    ///
    /// # Panics
    ///
    /// Panics if `sampler` is not below [`MAX_TEXTURE_SAMPLERS`].
    pub fn bind_texture(&mut self, id: TextureId, sampler: usize) -> &mut Self {
        assert!(
            sampler < MAX_TEXTURE_SAMPLERS,
            "texture sampler {sampler} is out of range"
        );
        self.textures[sampler] = Some(id);
        self.mask.insert(StateMask::texture(sampler));
        self
    }

    /// Sets the blend function.
    pub fn set_blend(&mut self, src: BlendFactor, dst: BlendFactor) -> &mut Self {
        self.blending = BlendFunction { src, dst };
        self.mask.insert(StateMask::BLENDING);
        self
    }

    /// Disables blending.
    pub fn disable_blending(&mut self) -> &mut Self {
        self.set_blend(BlendFactor::One, BlendFactor::Zero)
    }

    /// Sets the depth test function and write flag.
    pub fn set_depth_state(&mut self, function: Compare, write: bool) -> &mut Self {
        self.depth_state = DepthState { function, write };
        self.mask.insert(StateMask::DEPTH_STATE);
        self
    }

    /// Sets the alpha test function and reference.
    pub fn set_alpha_test(&mut self, function: Compare, reference: u8) -> &mut Self {
        self.alpha_test = AlphaTest {
            function,
            reference,
        };
        self.mask.insert(StateMask::ALPHA_TEST);
        self
    }

    /// Sets which faces are culled.
    pub fn set_cull_face(&mut self, face: TriangleFace) -> &mut Self {
        self.cull_face = face;
        self.mask.insert(StateMask::CULL_FACE);
        self
    }

    /// Sets the polygon offset.
    pub fn set_polygon_offset(&mut self, factor: f32, units: f32) -> &mut Self {
        self.polygon_offset = PolygonOffset { factor, units };
        self.mask.insert(StateMask::POLYGON_OFFSET);
        self
    }

    /// Disables the polygon offset.
    pub fn disable_polygon_offset(&mut self) -> &mut Self {
        self.set_polygon_offset(0.0, 0.0)
    }

    /// Sets the polygon rasterization mode.
    pub fn set_polygon_mode(&mut self, mode: PolygonMode) -> &mut Self {
        self.polygon_mode = mode;
        self.mask.insert(StateMask::POLYGON_MODE);
        self
    }

    /// Sets the color write mask.
    pub fn set_color_mask(&mut self, mask: ColorMask) -> &mut Self {
        self.color_mask = mask;
        self.mask.insert(StateMask::COLOR_MASK);
        self
    }

    /// Sets the stencil test function.
    pub fn set_stencil_function(
        &mut self,
        function: Compare,
        reference: u8,
        mask: u8,
    ) -> &mut Self {
        self.stencil_function = StencilFunction {
            function,
            reference,
            mask,
        };
        self.mask.insert(StateMask::STENCIL_FUNCTION);
        self
    }

    /// Sets the stencil actions.
    pub fn set_stencil_op(
        &mut self,
        stencil_fail: StencilAction,
        depth_fail: StencilAction,
        depth_pass: StencilAction,
    ) -> &mut Self {
        self.stencil_op = StencilOp {
            stencil_fail,
            depth_fail,
            depth_pass,
        };
        self.mask.insert(StateMask::STENCIL_OP);
        self
    }

    /// Sets the stencil write mask.
    pub fn set_stencil_mask(&mut self, mask: u8) -> &mut Self {
        self.stencil_mask = mask;
        self.mask.insert(StateMask::STENCIL_MASK);
        self
    }

    /// Enables pipeline features.
    pub fn enable_features(&mut self, features: PipelineFeatures) -> &mut Self {
        self.enabled_features.insert(features);
        self
    }

    /// Disables pipeline features, overriding any block that enables them.
    pub fn disable_features(&mut self, features: PipelineFeatures) -> &mut Self {
        self.disabled_features.insert(features);
        self
    }

    /// Returns the bound vertex buffer.
    pub fn vertex_buffer(&self) -> Option<VertexBufferId> {
        self.vertex_buffer
    }

    /// Returns the bound index buffer.
    pub fn index_buffer(&self) -> Option<IndexBufferId> {
        self.index_buffer
    }

    /// Returns the bound input layout.
    pub fn input_layout(&self) -> Option<InputLayoutId> {
        self.input_layout
    }

    /// Returns the bound program.
    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    /// Returns the constant buffer bound at `slot`.
    pub fn constant_buffer(&self, slot: ConstantBufferSlot) -> Option<ConstantBufferId> {
        self.constant_buffers[slot.index()]
    }

    /// Returns every constant buffer binding indexed by slot.
    pub fn constant_buffers(&self) -> &[Option<ConstantBufferId>; MAX_CONSTANT_BUFFERS] {
        &self.constant_buffers
    }

    /// Returns every texture binding indexed by sampler.
    pub fn textures(&self) -> &[Option<TextureId>; MAX_TEXTURE_SAMPLERS] {
        &self.textures
    }

    /// Returns the blend function.
    pub fn blending(&self) -> BlendFunction {
        self.blending
    }

    /// Returns the depth state.
    pub fn depth_state(&self) -> DepthState {
        self.depth_state
    }

    /// Returns the alpha test.
    pub fn alpha_test(&self) -> AlphaTest {
        self.alpha_test
    }

    /// Returns the culled faces.
    pub fn cull_face(&self) -> TriangleFace {
        self.cull_face
    }

    /// Returns the polygon offset.
    pub fn polygon_offset(&self) -> PolygonOffset {
        self.polygon_offset
    }

    /// Returns the polygon rasterization mode.
    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    /// Returns the color write mask.
    pub fn color_mask(&self) -> ColorMask {
        self.color_mask
    }

    /// Returns the stencil test function.
    pub fn stencil_function(&self) -> StencilFunction {
        self.stencil_function
    }

    /// Returns the stencil actions.
    pub fn stencil_op(&self) -> StencilOp {
        self.stencil_op
    }

    /// Returns the stencil write mask.
    pub fn stencil_mask(&self) -> u8 {
        self.stencil_mask
    }

    /// Returns the features enabled by this block and not disabled by it.
    pub fn features(&self) -> PipelineFeatures {
        self.enabled_features.without(self.disabled_features)
    }

    /// Returns this block with every unset slot inherited from `parent`.
    pub fn merged_over(&self, parent: &StateBlock) -> StateBlock {
        let mut merged = *parent;
        let mask = self.mask;

        if mask.contains(StateMask::VERTEX_BUFFER) {
            merged.vertex_buffer = self.vertex_buffer;
        }
        if mask.contains(StateMask::INDEX_BUFFER) {
            merged.index_buffer = self.index_buffer;
        }
        if mask.contains(StateMask::INPUT_LAYOUT) {
            merged.input_layout = self.input_layout;
        }
        if mask.contains(StateMask::PROGRAM) {
            merged.program = self.program;
        }
        for index in 0..MAX_CONSTANT_BUFFERS {
            if mask.contains(StateMask::constant_buffer(index)) {
                merged.constant_buffers[index] = self.constant_buffers[index];
            }
        }
        for sampler in 0..MAX_TEXTURE_SAMPLERS {
            if mask.contains(StateMask::texture(sampler)) {
                merged.textures[sampler] = self.textures[sampler];
            }
        }
        if mask.contains(StateMask::BLENDING) {
            merged.blending = self.blending;
        }
        if mask.contains(StateMask::DEPTH_STATE) {
            merged.depth_state = self.depth_state;
        }
        if mask.contains(StateMask::ALPHA_TEST) {
            merged.alpha_test = self.alpha_test;
        }
        if mask.contains(StateMask::CULL_FACE) {
            merged.cull_face = self.cull_face;
        }
        if mask.contains(StateMask::POLYGON_OFFSET) {
            merged.polygon_offset = self.polygon_offset;
        }
        if mask.contains(StateMask::POLYGON_MODE) {
            merged.polygon_mode = self.polygon_mode;
        }
        if mask.contains(StateMask::COLOR_MASK) {
            merged.color_mask = self.color_mask;
        }
        if mask.contains(StateMask::STENCIL_FUNCTION) {
            merged.stencil_function = self.stencil_function;
        }
        if mask.contains(StateMask::STENCIL_OP) {
            merged.stencil_op = self.stencil_op;
        }
        if mask.contains(StateMask::STENCIL_MASK) {
            merged.stencil_mask = self.stencil_mask;
        }

        merged.mask = parent.mask | mask;
        merged.enabled_features = parent.enabled_features | self.enabled_features;
        merged.disabled_features = parent.disabled_features | self.disabled_features;
        merged
    }

    /// Returns the slots whose effective value differs between `self` and `other`.
    pub fn diff(&self, other: &StateBlock) -> StateMask {
        let mut changed = StateMask::EMPTY;

        if self.vertex_buffer != other.vertex_buffer {
            changed |= StateMask::VERTEX_BUFFER;
        }
        if self.index_buffer != other.index_buffer {
            changed |= StateMask::INDEX_BUFFER;
        }
        if self.input_layout != other.input_layout {
            changed |= StateMask::INPUT_LAYOUT;
        }
        if self.program != other.program || self.features() != other.features() {
            changed |= StateMask::PROGRAM;
        }
        for index in 0..MAX_CONSTANT_BUFFERS {
            if self.constant_buffers[index] != other.constant_buffers[index] {
                changed |= StateMask::constant_buffer(index);
            }
        }
        for sampler in 0..MAX_TEXTURE_SAMPLERS {
            if self.textures[sampler] != other.textures[sampler] {
                changed |= StateMask::texture(sampler);
            }
        }
        if self.blending != other.blending {
            changed |= StateMask::BLENDING;
        }
        if self.depth_state != other.depth_state {
            changed |= StateMask::DEPTH_STATE;
        }
        if self.alpha_test != other.alpha_test {
            changed |= StateMask::ALPHA_TEST;
        }
        if self.cull_face != other.cull_face {
            changed |= StateMask::CULL_FACE;
        }
        if self.polygon_offset != other.polygon_offset {
            changed |= StateMask::POLYGON_OFFSET;
        }
        if self.polygon_mode != other.polygon_mode {
            changed |= StateMask::POLYGON_MODE;
        }
        if self.color_mask != other.color_mask {
            changed |= StateMask::COLOR_MASK;
        }
        if self.stencil_function != other.stencil_function {
            changed |= StateMask::STENCIL_FUNCTION;
        }
        if self.stencil_op != other.stencil_op {
            changed |= StateMask::STENCIL_OP;
        }
        if self.stencil_mask != other.stencil_mask {
            changed |= StateMask::STENCIL_MASK;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::handle::{ResourceHandle, ResourceId};

    fn id<H: ResourceHandle>(index: u32) -> H {
        H::from_id(ResourceId {
            index,
            generation: 0,
        })
    }

    #[test]
    fn setters_record_their_slot() {
        let mut block = StateBlock::new();
        assert!(block.is_empty());

        block
            .bind_vertex_buffer(id(1))
            .bind_constant_buffer(id(2), ConstantBufferSlot::MaterialConstants)
            .set_cull_face(TriangleFace::Back);

        assert!(block.mask().contains(StateMask::VERTEX_BUFFER | StateMask::CULL_FACE));
        assert!(block.mask().contains(StateMask::constant_buffer(3)));
        assert!(!block.mask().contains(StateMask::INDEX_BUFFER));
        assert_eq!(
            block.constant_buffer(ConstantBufferSlot::MaterialConstants),
            Some(id::<ConstantBufferId>(2))
        );
    }

    #[test]
    fn merging_keeps_own_slots_and_inherits_the_rest() {
        let mut parent = StateBlock::new();
        parent
            .bind_vertex_buffer(id(1))
            .bind_input_layout(id(5))
            .set_depth_state(Compare::LessEqual, false);

        let mut child = StateBlock::new();
        child.bind_vertex_buffer(id(2));

        let merged = child.merged_over(&parent);
        assert_eq!(merged.vertex_buffer(), Some(id::<VertexBufferId>(2)));
        assert_eq!(merged.input_layout(), Some(id::<InputLayoutId>(5)));
        assert_eq!(merged.depth_state().function, Compare::LessEqual);
        assert_eq!(merged.mask(), parent.mask() | child.mask());
    }

    #[test]
    fn disabled_features_win_over_enabled_ones() {
        let mut parent = StateBlock::new();
        parent.enable_features(PipelineFeatures::AMBIENT_COLOR | PipelineFeatures::FOG);

        let mut child = StateBlock::new();
        child.disable_features(PipelineFeatures::AMBIENT_COLOR);

        let merged = child.merged_over(&parent);
        assert_eq!(merged.features(), PipelineFeatures::FOG);
    }

    #[test]
    fn diff_reports_changed_slots_only() {
        let mut a = StateBlock::new();
        a.bind_vertex_buffer(id(1)).set_cull_face(TriangleFace::Back);
        let mut b = a;
        b.bind_vertex_buffer(id(2));

        assert_eq!(a.diff(&a), StateMask::EMPTY);
        assert_eq!(a.diff(&b), StateMask::VERTEX_BUFFER);

        let mut c = a;
        c.set_cull_face(TriangleFace::Back);
        assert_eq!(a.diff(&c), StateMask::EMPTY);
    }

    #[test]
    fn alpha_reference_is_normalized() {
        let mut block = StateBlock::new();
        block.set_alpha_test(Compare::Greater, 255);
        assert!((block.alpha_test().reference_f32() - 1.0).abs() < f32::EPSILON);
    }
}
