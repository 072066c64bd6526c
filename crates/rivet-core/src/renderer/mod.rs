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

//! Provides the backend-agnostic deferred rendering layer.
//!
//! Producers record op-codes into [`CommandBuffer`]s owned by a [`RenderFrame`],
//! using a [`StateStack`] to build the [`StateBlock`] each draw captures. The frame
//! is then handed to a [`RenderingContext`], which resolves handles through its
//! tables and replays every op-code against a concrete [`RenderBackend`].

pub mod api;
pub mod command;
pub mod context;
pub mod error;
pub mod frame;
pub mod frame_queue;
pub mod handle;
pub mod resources;
pub mod settings;
pub mod state;
pub mod stats;
pub mod traits;

pub use self::api::*;
pub use self::command::{
    Command, CommandBuffer, CommandBufferId, ConstantBufferLayout, DataBuffer, OpCode,
    PersistentBuffer, RenderTarget, TransientTarget, UniformElement, UniformType,
};
pub use self::context::RenderingContext;
pub use self::error::{RenderError, ResolveError};
pub use self::frame::{FrameInfo, RenderFrame};
pub use self::frame_queue::{frame_queue, FrameConsumer, FrameProducer};
pub use self::handle::{
    ConstantBufferId, IndexBufferId, InputLayoutId, ProgramId, ResourceHandle, ResourceId,
    ResourceKind, TextureId, VertexBufferId,
};
pub use self::resources::HandleTable;
pub use self::settings::RenderSettings;
pub use self::state::{ConstantBufferSlot, StateBlock, StateScope, StateStack};
pub use self::stats::ExecutionStats;
pub use self::traits::{RenderBackend, ResourceFactory};
