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

//! Sorting keys for emitted draws.

use super::RenderingMode;

/// Builds the sorting key of a draw.
///
/// Modes sort in declaration order so opaque geometry lands first. Opaque and cutout
/// draws sort near-to-far; blended draws sort far-to-near.
pub fn sorting_key(mode: RenderingMode, distance: f32) -> u64 {
    let depth = distance.max(0.0).to_bits();
    let depth = if mode.is_blended() { !depth } else { depth };
    ((mode as u64) << 32) | u64::from(depth)
}
