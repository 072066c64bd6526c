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

//! The recorded instruction stream: op-codes, payload storage and command buffers.
//!
//! - **[`opcode`]**: the closed set of operations an executor must handle.
//! - **[`payload`]**: adopted and persistent CPU data carried by op-codes.
//! - **[`buffer`]**: the append-only, resettable [`CommandBuffer`].

pub mod buffer;
pub mod opcode;
pub mod payload;

pub use self::buffer::{
    CommandBuffer, CommandBufferId, StateIndex, TransientTarget, MAX_TRANSIENT_TARGETS,
};
pub use self::opcode::{
    Command, ConstantBufferLayout, OpCode, RenderTarget, UniformElement, UniformType,
};
pub use self::payload::{DataBuffer, PayloadArena, PersistentBuffer};
