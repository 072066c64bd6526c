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

//! Bitflag sets used across the command layer.

use crate::rivet_bitflags;

rivet_bitflags! {
    /// Selects the buffers cleared by a clear command.
    pub struct ClearMask: u8 {
        /// Clears the color buffer.
        const COLOR = 1 << 0;
        /// Clears the depth buffer.
        const DEPTH = 1 << 1;
        /// Clears the stencil buffer.
        const STENCIL = 1 << 2;
        /// Clears every buffer.
        const ALL = Self::COLOR.bits() | Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

rivet_bitflags! {
    /// Selects the color channels written by draw calls.
    pub struct ColorMask: u8 {
        /// Red channel.
        const RED = 1 << 0;
        /// Green channel.
        const GREEN = 1 << 1;
        /// Blue channel.
        const BLUE = 1 << 2;
        /// Alpha channel.
        const ALPHA = 1 << 3;
        /// All channels.
        const ALL = 0b1111;
    }
}

rivet_bitflags! {
    /// High-level shader features a draw call enables.
    ///
    /// Executors pass the resolved set along with the bound program so that a
    /// backend can pick a matching shader permutation.
    pub struct PipelineFeatures: u64 {
        /// Adds an ambient color term.
        const AMBIENT_COLOR = 1 << 0;
        /// Samples a diffuse texture.
        const DIFFUSE_TEXTURE = 1 << 1;
        /// Modulates output with a per-vertex color.
        const VERTEX_COLOR = 1 << 2;
        /// Applies a normal map.
        const NORMAL_MAP = 1 << 3;
        /// Samples a shadow map.
        const SHADOW_MAP = 1 << 4;
        /// Discards fragments below the alpha reference.
        const ALPHA_TEST = 1 << 5;
        /// Applies fog.
        const FOG = 1 << 6;
    }
}
