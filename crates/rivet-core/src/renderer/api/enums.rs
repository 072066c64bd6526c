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

//! Enumerations describing draw and raster state.

use serde::{Deserialize, Serialize};

/// The kind of primitives assembled from vertices by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    /// Every vertex is a point.
    Points,
    /// Every pair of vertices forms a line.
    Lines,
    /// Every triple of vertices forms a triangle.
    #[default]
    Triangles,
    /// A strip of triangles sharing edges.
    TriangleStrip,
}

/// A comparison function used by depth, alpha and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compare {
    /// The test never passes.
    Never,
    /// The test always passes.
    Always,
    /// Passes if the incoming value is less than the stored value.
    Less,
    /// Passes if the incoming value is less than or equal to the stored value.
    LessEqual,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the incoming value is greater than the stored value.
    Greater,
    /// Passes if the incoming value is greater than or equal to the stored value.
    GreaterEqual,
    /// Passes if the values differ.
    NotEqual,
}

/// A blend factor applied to the source or destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `(0, 0, 0, 0)`.
    Zero,
    /// `(1, 1, 1, 1)`.
    One,
    /// The source color.
    SrcColor,
    /// One minus the source color.
    OneMinusSrcColor,
    /// The source alpha.
    SrcAlpha,
    /// One minus the source alpha.
    OneMinusSrcAlpha,
    /// The destination color.
    DstColor,
    /// One minus the destination color.
    OneMinusDstColor,
    /// The destination alpha.
    DstAlpha,
    /// One minus the destination alpha.
    OneMinusDstAlpha,
}

/// Selects triangle faces for culling and stencil operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriangleFace {
    /// Front-facing triangles.
    Front,
    /// Back-facing triangles.
    Back,
    /// Both faces.
    FrontAndBack,
    /// No face; disables culling.
    #[default]
    None,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Polygons are filled.
    #[default]
    Fill,
    /// Only polygon edges are drawn.
    Wireframe,
}

/// An action applied to the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilAction {
    /// Keep the stored value.
    Keep,
    /// Set the stored value to zero.
    Zero,
    /// Replace the stored value with the reference value.
    Replace,
    /// Increment, clamping at the maximum.
    Increment,
    /// Increment, wrapping to zero.
    IncrementWrap,
    /// Decrement, clamping at zero.
    Decrement,
    /// Decrement, wrapping to the maximum.
    DecrementWrap,
    /// Bitwise invert the stored value.
    Invert,
}

/// The pixel layout of a texture created through the rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit luminance.
    Luminance8,
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit RGBA.
    Rgba8,
    /// 16-bit float RGBA.
    Rgba16F,
    /// 32-bit float RGBA.
    Rgba32F,
    /// 24-bit depth.
    Depth24,
}

impl PixelFormat {
    /// Returns the number of bytes a single pixel occupies.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Luminance8 => 1,
            PixelFormat::Rgb8 | PixelFormat::Depth24 => 3,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgba16F => 8,
            PixelFormat::Rgba32F => 16,
        }
    }

    /// Returns the number of bytes a `width x height` image occupies.
    pub const fn image_size(self, width: u16, height: u16) -> usize {
        self.bytes_per_pixel() * width as usize * height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_size_accounts_for_pixel_format() {
        assert_eq!(PixelFormat::Rgba8.image_size(4, 2), 32);
        assert_eq!(PixelFormat::Luminance8.image_size(4, 2), 8);
        assert_eq!(PixelFormat::Rgba32F.image_size(1, 1), 16);
    }

    #[test]
    fn triangles_are_the_default_primitive() {
        assert_eq!(PrimitiveType::default(), PrimitiveType::Triangles);
    }
}
