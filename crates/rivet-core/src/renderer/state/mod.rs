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

//! Render state blocks and the copy-down state stack used by producers.

mod block;
mod stack;

pub use self::block::{
    AlphaTest, BlendFunction, ConstantBufferSlot, DepthState, PolygonOffset, StateBlock,
    StateMask, StencilFunction, StencilOp, MAX_CONSTANT_BUFFERS, MAX_TEXTURE_SAMPLERS,
};
pub use self::stack::{StateScope, StateStack};
