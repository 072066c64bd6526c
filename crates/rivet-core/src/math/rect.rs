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

//! Axis-aligned rectangles used for viewports.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle described by its origin and extent.
///
/// Viewports recorded into render-to-target commands are normalized (`0..1`)
/// and scaled by the executor to the size of the bound target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// A rectangle covering the whole normalized target.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Creates a new rectangle.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Scales a normalized rectangle to a target of the given pixel size.
    pub fn scaled(&self, width: f32, height: f32) -> Self {
        Self::new(
            self.x * width,
            self.y * height,
            self.width * width,
            self.height * height,
        )
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::UNIT
    }
}
