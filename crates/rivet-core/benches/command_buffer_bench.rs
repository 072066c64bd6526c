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

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rivet_core::renderer::state::{
    AlphaTest, BlendFunction, DepthState, PolygonOffset, StencilFunction, StencilOp,
};
use rivet_core::renderer::{
    ClearMask, ColorMask, ConstantBufferLayout, ConstantBufferSlot, PipelineFeatures, PixelFormat,
    PolygonMode, PrimitiveType, RenderBackend, RenderError, RenderFrame, RenderSettings,
    RenderingContext, ResourceFactory, StateStack, TriangleFace, VertexFormat,
};
use rivet_core::{Rect, Rgba};

/// A backend that accepts every call and does nothing.
struct NullBackend;

impl RenderBackend for NullBackend {
    type Buffer = ();
    type Texture = ();
    type InputLayout = ();
    type Program = ();

    fn create_vertex_buffer(&mut self, _: Option<&[u8]>, _: usize) -> Result<(), RenderError> {
        Ok(())
    }
    fn create_index_buffer(&mut self, _: Option<&[u8]>, _: usize) -> Result<(), RenderError> {
        Ok(())
    }
    fn create_constant_buffer(
        &mut self,
        _: Option<&[u8]>,
        _: usize,
        _: ConstantBufferLayout,
    ) -> Result<(), RenderError> {
        Ok(())
    }
    fn create_texture(
        &mut self,
        _: Option<&[u8]>,
        _: u16,
        _: u16,
        _: PixelFormat,
    ) -> Result<(), RenderError> {
        Ok(())
    }
    fn create_input_layout(&mut self, _: VertexFormat) -> Result<(), RenderError> {
        Ok(())
    }
    fn create_program(&mut self, _: &str, _: &str) -> Result<(), RenderError> {
        Ok(())
    }
    fn write_buffer(&mut self, _: &mut (), data: &[u8]) -> Result<(), RenderError> {
        black_box(data);
        Ok(())
    }
    fn destroy_buffer(&mut self, _: ()) {}
    fn destroy_texture(&mut self, _: ()) {}
    fn destroy_input_layout(&mut self, _: ()) {}
    fn destroy_program(&mut self, _: ()) {}
    fn set_render_target(&mut self, _: Option<&()>) {}
    fn set_viewport(&mut self, _: Rect) {}
    fn clear(&mut self, _: Rgba, _: f32, _: u8, _: ClearMask) {}
    fn bind_vertex_buffer(&mut self, _: Option<&()>) {}
    fn bind_index_buffer(&mut self, _: Option<&()>) {}
    fn bind_input_layout(&mut self, _: Option<&()>) {}
    fn bind_program(&mut self, _: Option<&()>, _: PipelineFeatures) {}
    fn bind_constant_buffer(&mut self, _: usize, _: Option<&()>) {}
    fn bind_texture(&mut self, _: usize, _: Option<&()>) {}
    fn set_blend_function(&mut self, _: BlendFunction) {}
    fn set_depth_state(&mut self, _: DepthState) {}
    fn set_alpha_test(&mut self, _: AlphaTest) {}
    fn set_cull_face(&mut self, _: TriangleFace) {}
    fn set_polygon_offset(&mut self, _: PolygonOffset) {}
    fn set_polygon_mode(&mut self, _: PolygonMode) {}
    fn set_color_mask(&mut self, _: ColorMask) {}
    fn set_stencil_function(&mut self, _: StencilFunction) {}
    fn set_stencil_op(&mut self, _: StencilOp) {}
    fn set_stencil_mask(&mut self, _: u8) {}
    fn draw_indexed(&mut self, _: PrimitiveType, first: u32, count: u32) {
        black_box((first, count));
    }
    fn draw_primitives(&mut self, _: PrimitiveType, first: u32, count: u32) {
        black_box((first, count));
    }
    fn reset_states(&mut self) {}
}

const DRAWS: u32 = 1_000;

fn bench_command_buffers(c: &mut Criterion) {
    let settings = RenderSettings::default();
    let mut context = RenderingContext::new(NullBackend, settings.clone());
    let layout = context.request_input_layout(VertexFormat::NORMAL);
    let instance = context.request_constant_buffer(None, 64, &[]);
    let meshes: Vec<_> = (0..16)
        .map(|_| context.request_vertex_buffer(None, 1024))
        .collect();
    let mut frame = RenderFrame::new(&settings);
    context.display(&mut frame);

    let constants = [0u8; 64];
    let mut stack = StateStack::with_settings(&settings);

    let mut record = |frame: &mut RenderFrame| {
        let buffer = frame.entry_point();
        buffer.clear(Rgba::BLACK, 1.0, 0, ClearMask::ALL);
        let mut pass = stack.scope();
        pass.block().bind_input_layout(layout);
        for i in 0..DRAWS {
            let mut mesh = pass.scope();
            mesh.block()
                .bind_vertex_buffer(meshes[(i % 16) as usize])
                .bind_constant_buffer(instance, ConstantBufferSlot::InstanceConstants);
            buffer.upload_constant_buffer(instance, Some(&constants[..]), constants.len());
            buffer.draw_indexed(u64::from(i % 4), PrimitiveType::Triangles, mesh.states(), 0, 36);
        }
    };

    let mut group = c.benchmark_group("Command Buffers");

    group.bench_function("Record 1k draws", |b| {
        b.iter(|| {
            record(&mut frame);
            black_box(frame.entry_point().len());
            frame.clear();
        });
    });

    group.bench_function("Record and replay 1k draws", |b| {
        b.iter(|| {
            record(&mut frame);
            frame.entry_point().sort();
            context.display(&mut frame);
            black_box(context.stats().draw_calls);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_command_buffers);
criterion_main!(benches);
