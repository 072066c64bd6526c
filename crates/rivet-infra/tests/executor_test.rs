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

use rivet_core::renderer::{
    ClearMask, CommandBufferId, InputLayoutId, OpCode, PipelineFeatures, PixelFormat,
    PrimitiveType, RenderFrame, RenderSettings, RenderingContext, ResourceFactory, ResourceHandle,
    StateBlock, StateStack, VertexBufferId, VertexFormat,
};
use rivet_core::{Rect, Rgba};
use rivet_infra::logging::init_logging;
use rivet_infra::{BackendCall, TraceBackend, TraceLog};

struct Fixture {
    context: RenderingContext<TraceBackend>,
    log: TraceLog,
    vertex_buffer: VertexBufferId,
    input_layout: InputLayoutId,
}

/// A context with one vertex buffer (object 1) and one input layout (object 2).
fn fixture(settings: RenderSettings) -> Fixture {
    init_logging("debug");
    let backend = TraceBackend::new();
    let log = backend.log();
    let mut context = RenderingContext::new(backend, settings);
    let vertex_buffer = context.request_vertex_buffer(Some(&[0u8; 48][..]), 48);
    let input_layout = context.request_input_layout(VertexFormat::POSITION);
    Fixture {
        context,
        log,
        vertex_buffer,
        input_layout,
    }
}

fn mesh_states(fixture: &Fixture) -> StateBlock {
    let mut stack = StateStack::default();
    stack.push().bind_vertex_buffer(fixture.vertex_buffer);
    stack.push().bind_input_layout(fixture.input_layout);
    *stack.states()
}

fn draw(primitive: PrimitiveType, first: u32, count: u32) -> BackendCall {
    BackendCall::DrawIndexed {
        primitive,
        first,
        count,
    }
}

#[test]
fn end_to_end_scenario_produces_expected_trace() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let grey = Rgba::rgb(0.3, 0.3, 0.3);

    let mut frame = RenderFrame::default();
    let commands = frame.entry_point();
    commands.clear(grey, 1.0, 0, ClearMask::COLOR);
    commands.upload_vertex_buffer(fixture.vertex_buffer, Some(&[7u8; 12][..]), 12);
    commands.draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    assert_eq!(frame.adopted_blocks(), 1);

    fixture.context.display(&mut frame);

    assert_eq!(
        fixture.log.frame_calls(),
        vec![
            BackendCall::Clear {
                color: grey,
                depth: 1.0,
                stencil: 0,
                mask: ClearMask::COLOR,
            },
            BackendCall::BindVertexBuffer(Some(1)),
            BackendCall::BindInputLayout(Some(2)),
            draw(PrimitiveType::Triangles, 0, 6),
        ]
    );
    assert!(fixture.log.calls().contains(&BackendCall::WriteBuffer {
        object: 1,
        data: vec![7; 12],
    }));
    assert_eq!(frame.adopted_blocks(), 0);
    assert!(frame.entry_point().is_empty());

    let stats = fixture.context.stats();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.uploads, 1);
    assert_eq!(stats.resources_constructed, 2);
    assert_eq!(fixture.context.pending_constructions(), 0);
}

#[test]
fn executing_a_sub_buffer_matches_inlining_it() {
    let mut composed = fixture(RenderSettings::default());
    let mut inlined = fixture(RenderSettings::default());
    let states = mesh_states(&composed);
    let red = Rgba::rgb(1.0, 0.0, 0.0);

    let mut frame = RenderFrame::default();
    let sub = frame.create_command_buffer();
    frame.entry_point().clear(red, 1.0, 0, ClearMask::ALL);
    frame.entry_point().execute(sub);
    frame.entry_point().draw_indexed(0, PrimitiveType::Lines, &states, 6, 2);
    let commands = frame.command_buffer_mut(sub);
    commands.draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    commands.draw_primitives(0, PrimitiveType::Points, &states, 0, 3);
    composed.context.display(&mut frame);

    let mut flat = RenderFrame::default();
    let commands = flat.entry_point();
    commands.clear(red, 1.0, 0, ClearMask::ALL);
    commands.draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    commands.draw_primitives(0, PrimitiveType::Points, &states, 0, 3);
    commands.draw_indexed(0, PrimitiveType::Lines, &states, 6, 2);
    inlined.context.display(&mut flat);

    assert_eq!(composed.log.calls(), inlined.log.calls());
    assert_eq!(composed.context.stats().command_buffers_executed, 3);
}

#[test]
#[should_panic(expected = "executes itself")]
fn cyclic_execute_chain_panics() {
    let mut fixture = fixture(RenderSettings::default());
    let mut frame = RenderFrame::default();
    let first = frame.create_command_buffer();
    let second = frame.create_command_buffer();
    frame.entry_point().execute(first);
    frame.command_buffer_mut(first).execute(second);
    frame.command_buffer_mut(second).execute(first);

    fixture.context.display(&mut frame);
}

#[test]
#[should_panic(expected = "nest deeper than 2 levels")]
fn over_deep_execute_chain_panics() {
    let settings = RenderSettings {
        max_execute_depth: 2,
        ..Default::default()
    };
    let mut fixture = fixture(settings);
    let mut frame = RenderFrame::default();
    let first = frame.create_command_buffer();
    let second = frame.create_command_buffer();
    frame.entry_point().execute(first);
    frame.command_buffer_mut(first).execute(second);

    fixture.context.display(&mut frame);
}

#[test]
fn released_handles_are_skipped_not_fatal() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let mut frame = RenderFrame::default();
    fixture.context.display(&mut frame);

    fixture
        .context
        .release_vertex_buffer(fixture.vertex_buffer)
        .unwrap();
    let reused = fixture.context.request_vertex_buffer(None, 48);
    assert_eq!(reused.id().index, fixture.vertex_buffer.id().index);
    assert_ne!(reused, fixture.vertex_buffer);

    let commands = frame.entry_point();
    commands.upload_vertex_buffer(fixture.vertex_buffer, Some(&[1u8; 4][..]), 4);
    commands.draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    fixture.log.clear();
    fixture.context.display(&mut frame);

    assert_eq!(fixture.log.draw_count(), 0);
    let stats = fixture.context.stats();
    assert_eq!(stats.draws_skipped, 1);
    assert_eq!(stats.uploads_skipped, 1);
    assert_eq!(stats.draw_calls, 0);
    assert!(fixture
        .context
        .release_vertex_buffer(fixture.vertex_buffer)
        .is_err());
}

#[test]
fn pending_handles_are_skipped_until_constructed() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let mut frame = RenderFrame::default();
    frame
        .entry_point()
        .draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);

    fixture
        .context
        .execute_command_buffer(&frame, CommandBufferId::ENTRY_POINT);
    assert_eq!(fixture.log.draw_count(), 0);
    assert_eq!(fixture.context.stats().draws_skipped, 1);

    fixture.context.display(&mut frame);
    assert_eq!(fixture.log.draw_count(), 1);
    assert_eq!(fixture.context.stats().draws_skipped, 0);
}

#[test]
fn failed_constructions_leave_handles_pending() {
    let mut fixture = fixture(RenderSettings::default());
    let program = fixture.context.request_program("", "void main() {}");
    let mut states = mesh_states(&fixture);
    states.bind_program(program);

    let mut frame = RenderFrame::default();
    frame
        .entry_point()
        .draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    fixture.context.display(&mut frame);

    assert_eq!(fixture.log.draw_count(), 0);
    assert_eq!(fixture.context.stats().resources_constructed, 2);
    assert_eq!(fixture.context.stats().draws_skipped, 1);
}

#[test]
fn unchanged_states_are_not_rebound() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let other = fixture.context.request_vertex_buffer(None, 48);
    let mut moved = states;
    moved.bind_vertex_buffer(other);

    let mut frame = RenderFrame::default();
    let commands = frame.entry_point();
    commands.draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    commands.draw_indexed(0, PrimitiveType::Triangles, &states, 6, 6);
    commands.draw_indexed(0, PrimitiveType::Triangles, &moved, 0, 6);
    fixture.context.display(&mut frame);

    assert_eq!(
        fixture.log.frame_calls(),
        vec![
            BackendCall::BindVertexBuffer(Some(1)),
            BackendCall::BindInputLayout(Some(2)),
            draw(PrimitiveType::Triangles, 0, 6),
            draw(PrimitiveType::Triangles, 6, 6),
            BackendCall::BindVertexBuffer(Some(3)),
            draw(PrimitiveType::Triangles, 0, 6),
        ]
    );
    assert_eq!(fixture.context.stats().state_changes, 3);

    fixture.log.clear();
    frame
        .entry_point()
        .draw_indexed(0, PrimitiveType::Triangles, &moved, 0, 6);
    fixture.context.display(&mut frame);
    assert_eq!(
        fixture.log.frame_calls(),
        vec![draw(PrimitiveType::Triangles, 0, 6)]
    );

    fixture.log.clear();
    fixture.context.reset_states();
    frame
        .entry_point()
        .draw_indexed(0, PrimitiveType::Triangles, &moved, 0, 6);
    fixture.context.display(&mut frame);
    assert_eq!(
        fixture.log.frame_calls(),
        vec![
            BackendCall::ResetStates,
            BackendCall::BindVertexBuffer(Some(3)),
            BackendCall::BindInputLayout(Some(2)),
            draw(PrimitiveType::Triangles, 0, 6),
        ]
    );
}

#[test]
fn program_is_rebound_when_features_change() {
    let mut fixture = fixture(RenderSettings::default());
    let program = fixture
        .context
        .request_program("void main() {}", "void main() {}");
    let mut lit = mesh_states(&fixture);
    lit.bind_program(program)
        .enable_features(PipelineFeatures::AMBIENT_COLOR | PipelineFeatures::FOG);
    let mut unlit = lit;
    unlit.disable_features(PipelineFeatures::AMBIENT_COLOR);

    let mut frame = RenderFrame::default();
    let commands = frame.entry_point();
    commands.draw_indexed(0, PrimitiveType::Triangles, &lit, 0, 3);
    commands.draw_indexed(0, PrimitiveType::Triangles, &unlit, 0, 3);
    fixture.context.display(&mut frame);

    let binds: Vec<_> = fixture
        .log
        .frame_calls()
        .into_iter()
        .filter(|call| matches!(call, BackendCall::BindProgram { .. }))
        .collect();
    assert_eq!(
        binds,
        vec![
            BackendCall::BindProgram {
                program: Some(3),
                features: PipelineFeatures::AMBIENT_COLOR | PipelineFeatures::FOG,
            },
            BackendCall::BindProgram {
                program: Some(3),
                features: PipelineFeatures::FOG,
            },
        ]
    );
}

#[test]
fn pushed_states_underlie_sub_buffer_draws() {
    let mut fixture = fixture(RenderSettings::default());
    let mut base = StateBlock::new();
    base.bind_input_layout(fixture.input_layout);
    let mut own = StateBlock::new();
    own.bind_vertex_buffer(fixture.vertex_buffer);

    let mut frame = RenderFrame::default();
    let sub = frame.create_command_buffer();
    frame.entry_point().push_state(&base);
    frame.entry_point().execute(sub);
    frame.entry_point().pop_state();
    frame.entry_point().draw_primitives(0, PrimitiveType::Points, &own, 0, 1);
    frame
        .command_buffer_mut(sub)
        .draw_indexed(0, PrimitiveType::Triangles, &own, 0, 6);
    fixture.context.display(&mut frame);

    assert_eq!(
        fixture.log.frame_calls(),
        vec![
            BackendCall::BindVertexBuffer(Some(1)),
            BackendCall::BindInputLayout(Some(2)),
            draw(PrimitiveType::Triangles, 0, 6),
            BackendCall::BindInputLayout(None),
            BackendCall::DrawPrimitives {
                primitive: PrimitiveType::Points,
                first: 0,
                count: 1,
            },
        ]
    );
}

#[test]
#[should_panic(expected = "PopState without a matching PushState")]
fn unbalanced_pop_panics() {
    let mut fixture = fixture(RenderSettings::default());
    let mut frame = RenderFrame::default();
    frame.entry_point().pop_state();
    fixture.context.display(&mut frame);
}

#[test]
fn render_to_target_restores_previous_target() {
    let mut fixture = fixture(RenderSettings::default());
    let target = fixture
        .context
        .request_texture(None, 64, 64, PixelFormat::Rgba8);
    let states = mesh_states(&fixture);
    let viewport = Rect::new(0.0, 0.0, 64.0, 64.0);

    let mut frame = RenderFrame::default();
    let sub = frame.render_to_target(CommandBufferId::ENTRY_POINT, Some(target), viewport);
    frame
        .command_buffer_mut(sub)
        .draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    fixture.context.display(&mut frame);

    let calls = fixture.log.frame_calls();
    assert_eq!(calls[0], BackendCall::SetRenderTarget(Some(3)));
    assert_eq!(calls[1], BackendCall::SetViewport(viewport));
    assert_eq!(calls[calls.len() - 2], BackendCall::SetRenderTarget(None));
    assert_eq!(calls[calls.len() - 1], BackendCall::SetViewport(Rect::UNIT));
    assert_eq!(fixture.log.draw_count(), 1);
}

#[test]
fn render_to_released_target_is_skipped() {
    let mut fixture = fixture(RenderSettings::default());
    let target = fixture
        .context
        .request_texture(None, 8, 8, PixelFormat::Rgba8);
    fixture.context.release_texture(target).unwrap();
    let states = mesh_states(&fixture);

    let mut frame = RenderFrame::default();
    let sub = frame.render_to_target(CommandBufferId::ENTRY_POINT, Some(target), Rect::UNIT);
    frame
        .command_buffer_mut(sub)
        .draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    fixture.context.display(&mut frame);

    assert_eq!(fixture.log.draw_count(), 0);
    assert_eq!(fixture.context.stats().draws_skipped, 1);
}

#[test]
fn sorted_buffer_replays_in_key_order() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let mut frame = RenderFrame::default();
    let commands = frame.entry_point();
    commands.draw_indexed(2, PrimitiveType::Triangles, &states, 20, 1);
    commands.draw_indexed(1, PrimitiveType::Triangles, &states, 10, 1);
    commands.draw_indexed(2, PrimitiveType::Triangles, &states, 21, 1);
    commands.sort();
    fixture.context.display(&mut frame);

    let firsts: Vec<u32> = fixture
        .log
        .frame_calls()
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::DrawIndexed { first, .. } => Some(first),
            _ => None,
        })
        .collect();
    assert_eq!(firsts, vec![10, 20, 21]);
}

#[test]
fn sorting_keeps_draws_inside_pushed_state() {
    let mut fixture = fixture(RenderSettings::default());
    let mut base = StateBlock::new();
    base.bind_vertex_buffer(fixture.vertex_buffer);
    let mut own = StateBlock::new();
    own.bind_input_layout(fixture.input_layout);

    let mut frame = RenderFrame::default();
    let commands = frame.entry_point();
    commands.push_state(&base);
    commands.draw_indexed(5, PrimitiveType::Triangles, &own, 0, 6);
    commands.pop_state();
    commands.sort();
    assert!(matches!(
        commands.commands()[1].op,
        OpCode::DrawIndexed { .. }
    ));
    fixture.context.display(&mut frame);

    assert_eq!(
        fixture.log.frame_calls(),
        vec![
            BackendCall::BindVertexBuffer(Some(1)),
            BackendCall::BindInputLayout(Some(2)),
            draw(PrimitiveType::Triangles, 0, 6),
        ]
    );
}

#[test]
fn sorting_keeps_uploads_between_the_draws_around_them() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let mut frame = RenderFrame::default();
    let commands = frame.entry_point();
    commands.upload_vertex_buffer(fixture.vertex_buffer, Some(&[1u8; 4][..]), 4);
    commands.draw_indexed(5, PrimitiveType::Triangles, &states, 50, 1);
    commands.upload_vertex_buffer(fixture.vertex_buffer, Some(&[2u8; 4][..]), 4);
    commands.draw_indexed(1, PrimitiveType::Triangles, &states, 10, 1);
    commands.sort();
    fixture.context.display(&mut frame);

    let sequence: Vec<BackendCall> = fixture
        .log
        .calls()
        .into_iter()
        .filter(|call| call.is_draw() || matches!(call, BackendCall::WriteBuffer { .. }))
        .collect();
    assert_eq!(
        sequence,
        vec![
            BackendCall::WriteBuffer {
                object: 1,
                data: vec![1; 4],
            },
            draw(PrimitiveType::Triangles, 50, 1),
            BackendCall::WriteBuffer {
                object: 1,
                data: vec![2; 4],
            },
            draw(PrimitiveType::Triangles, 10, 1),
        ]
    );
}

/// Renders one draw into a `size` x `size` transient target, then releases it.
fn record_transient_pass(frame: &mut RenderFrame, states: &StateBlock, size: u16) {
    let target = frame
        .entry_point()
        .acquire_render_target(size, size, PixelFormat::Rgba8);
    let viewport = Rect::new(0.0, 0.0, f32::from(size), f32::from(size));
    let sub = frame.render_to_target(CommandBufferId::ENTRY_POINT, target, viewport);
    frame
        .command_buffer_mut(sub)
        .draw_indexed(0, PrimitiveType::Triangles, states, 0, 6);
    frame.entry_point().release_render_target(target);
}

fn textures_created(log: &TraceLog) -> usize {
    log.calls()
        .iter()
        .filter(|call| matches!(call, BackendCall::CreateTexture { .. }))
        .count()
}

#[test]
fn transient_targets_are_pooled_by_size_and_format() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);

    let mut frame = RenderFrame::default();
    record_transient_pass(&mut frame, &states, 64);
    fixture.context.display(&mut frame);

    let calls = fixture.log.frame_calls();
    assert_eq!(calls[0], BackendCall::SetRenderTarget(Some(3)));
    assert_eq!(calls[calls.len() - 2], BackendCall::SetRenderTarget(None));
    assert_eq!(fixture.log.draw_count(), 1);
    assert_eq!(textures_created(&fixture.log), 1);
    assert_eq!(fixture.context.render_target_pool(), (1, 1));

    fixture.log.clear();
    record_transient_pass(&mut frame, &states, 64);
    fixture.context.display(&mut frame);
    assert_eq!(textures_created(&fixture.log), 0);
    assert_eq!(fixture.log.frame_calls()[0], BackendCall::SetRenderTarget(Some(3)));

    record_transient_pass(&mut frame, &states, 32);
    fixture.context.display(&mut frame);
    assert_eq!(textures_created(&fixture.log), 1);
    assert_eq!(fixture.context.render_target_pool(), (2, 2));
}

#[test]
fn targets_held_together_are_distinct() {
    let mut fixture = fixture(RenderSettings::default());
    let mut frame = RenderFrame::default();
    let commands = frame.entry_point();
    let first = commands.acquire_render_target(16, 16, PixelFormat::Rgba8);
    let second = commands.acquire_render_target(16, 16, PixelFormat::Rgba8);
    commands.release_render_target(second);
    commands.release_render_target(first);
    fixture.context.display(&mut frame);

    assert_eq!(textures_created(&fixture.log), 2);
    assert_eq!(fixture.context.render_target_pool(), (2, 2));
}

#[test]
fn unreleased_targets_return_to_the_pool_when_their_buffer_ends() {
    let mut fixture = fixture(RenderSettings::default());
    let mut frame = RenderFrame::default();
    frame
        .entry_point()
        .acquire_render_target(16, 16, PixelFormat::Rgba8);
    fixture.context.display(&mut frame);
    assert_eq!(fixture.context.render_target_pool(), (1, 1));

    frame
        .entry_point()
        .acquire_render_target(16, 16, PixelFormat::Rgba8);
    fixture.context.display(&mut frame);
    assert_eq!(textures_created(&fixture.log), 1);
}

#[test]
fn render_to_a_released_transient_target_is_skipped() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let mut frame = RenderFrame::default();
    let target = frame
        .entry_point()
        .acquire_render_target(16, 16, PixelFormat::Rgba8);
    frame.entry_point().release_render_target(target);
    let sub = frame.render_to_target(CommandBufferId::ENTRY_POINT, target, Rect::UNIT);
    frame
        .command_buffer_mut(sub)
        .draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    fixture.context.display(&mut frame);

    assert_eq!(fixture.log.draw_count(), 0);
    assert_eq!(fixture.context.stats().draws_skipped, 1);
}

#[test]
fn releasing_everything_destroys_pooled_targets() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let mut frame = RenderFrame::default();
    record_transient_pass(&mut frame, &states, 8);
    fixture.context.display(&mut frame);
    assert_eq!(fixture.context.backend().live_objects(), 3);

    fixture.context.release_all();
    assert_eq!(fixture.context.backend().live_objects(), 0);
    assert_eq!(fixture.context.render_target_pool(), (0, 0));
}

#[test]
fn releasing_a_bound_resource_resets_bindings() {
    let mut fixture = fixture(RenderSettings::default());
    let states = mesh_states(&fixture);
    let mut frame = RenderFrame::default();
    frame
        .entry_point()
        .draw_indexed(0, PrimitiveType::Triangles, &states, 0, 6);
    fixture.context.display(&mut frame);
    fixture.log.clear();

    fixture
        .context
        .release_input_layout(fixture.input_layout)
        .unwrap();

    assert_eq!(
        fixture.log.calls(),
        vec![BackendCall::ResetStates, BackendCall::Destroy(2)]
    );
    let again = fixture.context.request_input_layout(VertexFormat::POSITION);
    assert_ne!(again, fixture.input_layout);
}

#[test]
fn dropping_the_context_destroys_every_object() {
    let fixture = fixture(RenderSettings::default());
    let log = fixture.log.clone();
    let mut context = fixture.context;
    let mut frame = RenderFrame::default();
    context.display(&mut frame);
    assert_eq!(context.backend().live_objects(), 2);

    drop(context);

    let destroyed = log
        .calls()
        .into_iter()
        .filter(|call| matches!(call, BackendCall::Destroy(_)))
        .count();
    assert_eq!(destroyed, 2);
}

#[test]
fn input_layouts_are_cached_per_format() {
    let mut fixture = fixture(RenderSettings::default());
    let same = fixture
        .context
        .request_input_layout(VertexFormat::POSITION);
    let normal = fixture
        .context
        .request_input_layout(VertexFormat::POSITION | VertexFormat::NORMAL);

    assert_eq!(same, fixture.input_layout);
    assert_ne!(normal, fixture.input_layout);
    assert_eq!(fixture.context.pending_constructions(), 3);
}
