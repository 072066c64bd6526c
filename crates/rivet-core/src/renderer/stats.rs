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

//! Per-frame execution counters.

/// Counters gathered by a rendering context while it displays one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionStats {
    /// The number of the frame these counters belong to.
    pub frame_number: u64,
    /// Command buffers replayed, including the construction buffer and sub-buffers.
    pub command_buffers_executed: u32,
    /// Draw calls submitted to the backend.
    pub draw_calls: u32,
    /// Draw calls dropped because a handle could not be resolved.
    pub draws_skipped: u32,
    /// Individual state changes applied to the backend.
    pub state_changes: u32,
    /// Buffer uploads applied.
    pub uploads: u32,
    /// Buffer uploads dropped because a handle could not be resolved.
    pub uploads_skipped: u32,
    /// Backend objects constructed.
    pub resources_constructed: u32,
}

impl ExecutionStats {
    /// Creates zeroed counters for the given frame.
    pub fn for_frame(frame_number: u64) -> Self {
        Self {
            frame_number,
            ..Default::default()
        }
    }

    /// Returns the number of operations that were skipped.
    pub fn skipped(&self) -> u32 {
        self.draws_skipped + self.uploads_skipped
    }
}
