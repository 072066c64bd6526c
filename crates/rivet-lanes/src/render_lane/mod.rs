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

//! Render lane - records scene nodes into command buffers.
//!
//! Emitters are the hot path of command production: they filter nodes by material,
//! push material, renderable and instance states, and append one draw per node.

mod color_pass;
mod constants;
mod material;
mod point_cloud_emitter;
mod scene;
mod sorting;
mod static_mesh_emitter;

pub use color_pass::*;
pub use constants::*;
pub use material::*;
pub use point_cloud_emitter::*;
pub use scene::*;
pub use sorting::*;
pub use static_mesh_emitter::*;

use rivet_core::renderer::{CommandBuffer, StateStack};
use rivet_core::Vec3;

/// A producer that records one kind of scene node.
///
/// Implementations append draws to `commands` using `stack` for state inheritance
/// and must leave `stack` at the depth they found it.
pub trait RopEmitter: Send + Sync {
    /// Returns a human-readable identifier for this emitter.
    fn name(&self) -> &'static str;

    /// Records every accepted node of `scene` and returns the number of draws emitted.
    fn emit(
        &self,
        scene: &RenderScene,
        commands: &mut CommandBuffer,
        stack: &mut StateStack,
        camera: Vec3,
    ) -> usize;
}
