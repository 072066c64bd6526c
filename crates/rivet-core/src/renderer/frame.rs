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

//! A frame's worth of recorded command buffers.

use crate::math::{Rect, Rgba};
use crate::renderer::command::{CommandBuffer, CommandBufferId, RenderTarget};
use crate::renderer::settings::RenderSettings;

/// Frame-scoped information available to producers and executors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// A counter incremented for every acquired frame.
    pub frame_number: u64,
    /// The default viewport in pixels.
    pub viewport: Rect,
    /// The default clear color.
    pub clear_color: Rgba,
    /// The time in seconds since the previous frame.
    pub delta_time: f32,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            frame_number: 0,
            viewport: Rect::UNIT,
            clear_color: Rgba::BLACK,
            delta_time: 0.0,
        }
    }
}

/// Owns the pool of command buffers recorded for one frame.
///
/// Buffer 0 is the entry point the executor starts from. Every other buffer is
/// reached through `Execute` or render-to-target commands. Clearing a frame resets
/// its buffers but keeps them, so a recycled frame records without allocating.
#[derive(Debug)]
pub struct RenderFrame {
    info: FrameInfo,
    buffers: Vec<CommandBuffer>,
    active: usize,
    command_capacity: usize,
    payload_capacity: usize,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self::new(&RenderSettings::default())
    }
}

impl RenderFrame {
    /// Creates a frame whose buffers are sized from `settings`.
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            info: FrameInfo {
                clear_color: settings.default_clear_color,
                ..Default::default()
            },
            buffers: vec![CommandBuffer::with_settings(settings)],
            active: 1,
            command_capacity: settings.command_capacity,
            payload_capacity: settings.payload_capacity,
        }
    }

    /// Returns the frame information.
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    /// Returns the frame information for writing.
    pub fn info_mut(&mut self) -> &mut FrameInfo {
        &mut self.info
    }

    /// Returns the entry point command buffer.
    pub fn entry_point(&mut self) -> &mut CommandBuffer {
        &mut self.buffers[0]
    }

    /// Takes a command buffer from the pool, creating one if every pooled buffer is in use.
    pub fn create_command_buffer(&mut self) -> CommandBufferId {
        if self.active == self.buffers.len() {
            self.buffers.push(CommandBuffer::with_capacity(
                self.command_capacity,
                self.payload_capacity,
            ));
        }
        let id = CommandBufferId(self.active as u32);
        self.active += 1;
        id
    }

    /// Creates a sub-buffer that `parent` replays into `target` with `viewport`.
    ///
    /// `None` renders into the default framebuffer. A transient target must have
    /// been acquired by `parent`.
    pub fn render_to_target(
        &mut self,
        parent: CommandBufferId,
        target: impl Into<RenderTarget>,
        viewport: Rect,
    ) -> CommandBufferId {
        let commands = self.create_command_buffer();
        self.command_buffer_mut(parent)
            .render_to_target(commands, target, viewport);
        commands
    }

    /// Returns a command buffer of this frame.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a buffer in use by this frame.
    pub fn command_buffer(&self, id: CommandBufferId) -> &CommandBuffer {
        assert!(
            id.index() < self.active,
            "{id:?} is not in use by this frame"
        );
        &self.buffers[id.index()]
    }

    /// Returns a command buffer of this frame for recording.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a buffer in use by this frame.
    pub fn command_buffer_mut(&mut self, id: CommandBufferId) -> &mut CommandBuffer {
        assert!(
            id.index() < self.active,
            "{id:?} is not in use by this frame"
        );
        &mut self.buffers[id.index()]
    }

    /// Returns the number of command buffers in use.
    pub fn buffers_in_use(&self) -> usize {
        self.active
    }

    /// Returns the number of payload blocks adopted by every buffer in use.
    pub fn adopted_blocks(&self) -> usize {
        self.buffers[..self.active]
            .iter()
            .map(CommandBuffer::adopted_blocks)
            .sum()
    }

    /// Resets every buffer in use and returns them to the pool.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers[..self.active] {
            buffer.reset();
        }
        self.active = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::command::OpCode;
    use crate::renderer::handle::{ResourceHandle, ResourceId, VertexBufferId};

    #[test]
    fn sub_buffers_are_pooled_across_clears() {
        let mut frame = RenderFrame::default();
        let a = frame.create_command_buffer();
        let b = frame.create_command_buffer();
        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 2);
        assert_eq!(frame.buffers_in_use(), 3);

        let vertices = VertexBufferId::from_id(ResourceId {
            index: 0,
            generation: 0,
        });
        frame
            .command_buffer_mut(a)
            .upload_vertex_buffer(vertices, Some(&[0u8; 4][..]), 4);
        assert_eq!(frame.adopted_blocks(), 1);

        frame.clear();
        assert_eq!(frame.buffers_in_use(), 1);
        assert_eq!(frame.adopted_blocks(), 0);

        let reused = frame.create_command_buffer();
        assert_eq!(reused, a);
        assert!(frame.command_buffer(reused).is_empty());
    }

    #[test]
    fn render_to_target_records_into_the_parent() {
        let mut frame = RenderFrame::default();
        let viewport = Rect::new(0.0, 0.0, 256.0, 256.0);
        let sub = frame.render_to_target(CommandBufferId::ENTRY_POINT, None, viewport);

        let command = frame.entry_point().commands()[0];
        assert_eq!(
            command.op,
            OpCode::RenderToTarget {
                target: RenderTarget::Framebuffer,
                viewport,
                commands: sub,
            }
        );
    }

    #[test]
    #[should_panic(expected = "is not in use by this frame")]
    fn released_buffers_cannot_be_accessed() {
        let mut frame = RenderFrame::default();
        let sub = frame.create_command_buffer();
        frame.clear();
        frame.command_buffer(sub);
    }
}
