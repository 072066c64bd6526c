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

//! Packed vertex layouts.

use crate::rivet_bitflags;

rivet_bitflags! {
    /// A set of vertex attributes stored interleaved in a vertex buffer.
    ///
    /// Attributes are packed in declaration order: position, normal, color, uv0, uv1.
    /// Position is always present.
    pub struct VertexFormat: u8 {
        /// Three `f32` position components.
        const POSITION = 1 << 0;
        /// Three `f32` normal components.
        const NORMAL = 1 << 1;
        /// Four `u8` color components.
        const COLOR = 1 << 2;
        /// Two `f32` texture coordinates.
        const UV0 = 1 << 3;
        /// Two `f32` texture coordinates for a second layer.
        const UV1 = 1 << 4;
    }
}

impl VertexFormat {
    const PACKING: [(VertexFormat, usize); 5] = [
        (VertexFormat::POSITION, 12),
        (VertexFormat::NORMAL, 12),
        (VertexFormat::COLOR, 4),
        (VertexFormat::UV0, 8),
        (VertexFormat::UV1, 8),
    ];

    /// Builds a vertex format from a set of attributes, forcing `POSITION` on.
    pub fn new(attributes: VertexFormat) -> Self {
        attributes.with(VertexFormat::POSITION)
    }

    /// Returns the size in bytes of a single attribute.
    ///
    /// Returns `0` for sets that do not name exactly one known attribute.
    pub fn attribute_size(attribute: VertexFormat) -> usize {
        Self::PACKING
            .iter()
            .find(|(flag, _)| *flag == attribute)
            .map(|(_, size)| *size)
            .unwrap_or(0)
    }

    /// Returns the size in bytes of one interleaved vertex.
    pub fn vertex_size(&self) -> usize {
        Self::PACKING
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, size)| size)
            .sum()
    }

    /// Returns the byte offset of `attribute` inside a vertex, or `None` if this
    /// format does not contain it.
    pub fn attribute_offset(&self, attribute: VertexFormat) -> Option<usize> {
        if attribute.is_empty() || !self.contains(attribute) {
            return None;
        }

        let mut offset = 0;
        for (flag, size) in Self::PACKING {
            if flag == attribute {
                return Some(offset);
            }
            if self.contains(flag) {
                offset += size;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_always_present() {
        let format = VertexFormat::new(VertexFormat::NORMAL);
        assert!(format.contains(VertexFormat::POSITION));
        assert_eq!(format.vertex_size(), 24);
    }

    #[test]
    fn offsets_follow_packing_order() {
        let format = VertexFormat::new(VertexFormat::COLOR | VertexFormat::UV0 | VertexFormat::UV1);
        assert_eq!(format.attribute_offset(VertexFormat::POSITION), Some(0));
        assert_eq!(format.attribute_offset(VertexFormat::COLOR), Some(12));
        assert_eq!(format.attribute_offset(VertexFormat::UV0), Some(16));
        assert_eq!(format.attribute_offset(VertexFormat::UV1), Some(24));
        assert_eq!(format.attribute_offset(VertexFormat::NORMAL), None);
        assert_eq!(format.vertex_size(), 32);
    }

    #[test]
    fn attribute_sizes() {
        assert_eq!(VertexFormat::attribute_size(VertexFormat::POSITION), 12);
        assert_eq!(VertexFormat::attribute_size(VertexFormat::COLOR), 4);
        assert_eq!(VertexFormat::attribute_size(VertexFormat::UV0 | VertexFormat::UV1), 0);
    }
}
