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

use approx::assert_relative_eq;
use rivet_core::renderer::{
    frame_queue, ClearMask, ConstantBufferSlot, PrimitiveType, RenderSettings, RenderingContext,
    ResourceFactory, StateStack, VertexFormat,
};
use rivet_core::{Rgba, Vec3};
use rivet_infra::logging::init_logging;
use rivet_infra::{BackendCall, RenderThread, TraceBackend};
use rivet_lanes::render_lane::{
    ColorPass, Filter, LightingModel, LightingModels, MaterialNode, PointCloudEmitter,
    PointCloudNode, RenderModes, RenderScene, RenderingMode, StaticMeshEmitter, StaticMeshNode,
};

#[test]
fn render_thread_displays_every_submitted_frame() {
    init_logging("debug");
    let settings = RenderSettings::default();
    let backend = TraceBackend::new();
    let log = backend.log();
    let mut context = RenderingContext::new(backend, settings.clone());

    let vertex_buffer = context.request_vertex_buffer(None, 36);
    let input_layout = context.request_input_layout(VertexFormat::POSITION);
    let mut stack = StateStack::with_settings(&settings);
    stack
        .push()
        .bind_vertex_buffer(vertex_buffer)
        .bind_input_layout(input_layout);

    let (mut producer, consumer) = frame_queue(&settings);
    let thread = RenderThread::spawn(context, consumer).expect("render thread spawns");

    for i in 0..5u32 {
        let mut frame = producer.acquire();
        let commands = frame.entry_point();
        commands.clear(Rgba::BLACK, 1.0, 0, ClearMask::ALL);
        commands.draw_primitives(0, PrimitiveType::Triangles, stack.states(), 0, 3 * (i + 1));
        producer.submit(frame).expect("consumer is alive");
    }
    drop(producer);

    let context = thread.join().expect("render thread exits cleanly");
    assert_eq!(log.draw_count(), 5);
    assert_eq!(context.stats().frame_number, 5);
    assert_eq!(context.stats().draw_calls, 1);

    let counts: Vec<u32> = log
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::DrawPrimitives { count, .. } => Some(count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![3, 6, 9, 12, 15]);
}

#[test]
fn color_pass_renders_scene_through_the_executor() {
    init_logging("debug");
    let settings = RenderSettings::default();
    let backend = TraceBackend::new();
    let log = backend.log();
    let mut context = RenderingContext::new(backend, settings.clone());

    let format = VertexFormat::POSITION | VertexFormat::NORMAL;
    let quad = vec![0u8; format.vertex_size() * 4];
    let mut scene = RenderScene::new();
    scene.add_static_mesh(StaticMeshNode::new(
        &mut context,
        format,
        &quad,
        &[0, 1, 2, 2, 3, 0],
        MaterialNode::new(LightingModel::Phong, RenderingMode::Opaque),
        Vec3::new(0.0, 0.0, -5.0),
    ));
    scene.add_static_mesh(StaticMeshNode::new(
        &mut context,
        format,
        &quad,
        &[0, 1, 2],
        MaterialNode::new(LightingModel::Unlit, RenderingMode::Translucent),
        Vec3::new(0.0, 0.0, -2.0),
    ));
    scene.add_point_cloud(PointCloudNode::new(
        &mut context,
        format,
        &quad,
        MaterialNode::new(LightingModel::Ambient, RenderingMode::Opaque),
        Vec3::ZERO,
    ));

    let pass = ColorPass::new(&mut context)
        .with_emitter(Box::new(StaticMeshEmitter::new(Filter::new(
            LightingModels::ALL,
            RenderModes::OPAQUE | RenderModes::TRANSLUCENT,
        ))))
        .with_emitter(Box::new(PointCloudEmitter::default()));

    let (mut producer, consumer) = frame_queue(&settings);
    let mut frame = producer.acquire();
    let mut stack = StateStack::with_settings(&settings);
    let commands = frame.entry_point();
    commands.clear(Rgba::BLACK, 1.0, 0, ClearMask::ALL);
    let emitted = pass.render_with_color(
        &scene,
        commands,
        &mut stack,
        Vec3::ZERO,
        Rgba::rgb(0.0, 1.0, 0.0),
    );
    commands.sort();
    assert_eq!(emitted, 3);
    assert_eq!(stack.depth(), 0);

    producer.submit(frame).expect("consumer is alive");
    let mut frame = consumer.recv().expect("frame was submitted");
    context.display(&mut frame);
    consumer.recycle(frame);

    let stats = context.stats();
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(stats.draws_skipped, 0);
    assert_eq!(stats.uploads, 1);

    let calls = log.calls();
    let written = calls
        .iter()
        .find_map(|call| match call {
            BackendCall::WriteBuffer { data, .. } => Some(data.clone()),
            _ => None,
        })
        .expect("material constants were uploaded");
    let diffuse: [f32; 4] = bytemuck::pod_read_unaligned(&written[..16]);
    for (channel, expected) in diffuse.into_iter().zip([0.0, 1.0, 0.0, 1.0]) {
        assert_relative_eq!(channel, expected);
    }
    assert!(calls.iter().any(|call| matches!(
        call,
        BackendCall::BindConstantBuffer { slot, buffer: Some(_) }
            if *slot == ConstantBufferSlot::MaterialConstants.index()
    )));

    let draws: Vec<_> = calls.iter().filter(|call| call.is_draw()).cloned().collect();
    assert_eq!(
        draws,
        vec![
            BackendCall::DrawPrimitives {
                primitive: PrimitiveType::Points,
                first: 0,
                count: 4,
            },
            BackendCall::DrawIndexed {
                primitive: PrimitiveType::Triangles,
                first: 0,
                count: 6,
            },
            BackendCall::DrawIndexed {
                primitive: PrimitiveType::Triangles,
                first: 0,
                count: 3,
            },
        ]
    );

    let recycled = producer.acquire();
    assert_eq!(recycled.info().frame_number, 2);
    assert_eq!(recycled.adopted_blocks(), 0);
}
