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

//! Opaque, generation-tagged handles to backend resources.

use std::fmt;
use std::hash::Hash;

/// The raw identity behind every resource handle.
///
/// The index addresses a slot in a [`HandleTable`](super::resources::HandleTable).
/// The generation is incremented each time that slot is released, so a handle kept
/// past its release can never resolve to whatever resource reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// The slot index inside the owning table.
    pub index: u32,
    /// The generation of the slot when the handle was issued.
    pub generation: u32,
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// The kind of backend resource a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A vertex buffer.
    VertexBuffer,
    /// An index buffer.
    IndexBuffer,
    /// A constant (uniform) buffer.
    ConstantBuffer,
    /// A texture or render target.
    Texture,
    /// A vertex input layout.
    InputLayout,
    /// A shader program.
    Program,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::IndexBuffer => "index buffer",
            ResourceKind::ConstantBuffer => "constant buffer",
            ResourceKind::Texture => "texture",
            ResourceKind::InputLayout => "input layout",
            ResourceKind::Program => "program",
        };
        f.write_str(name)
    }
}

/// Common behaviour of typed resource handles.
///
/// Handles are plain `Copy` identifiers. They are safe to send to other threads,
/// but only the thread owning the rendering context may resolve them.
pub trait ResourceHandle: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// The kind of resource this handle refers to.
    const KIND: ResourceKind;

    /// Wraps a raw identity.
    fn from_id(id: ResourceId) -> Self;

    /// Returns the raw identity.
    fn id(self) -> ResourceId;
}

macro_rules! resource_handles {
    ($($(#[$attr:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$attr])*
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(ResourceId);

            impl ResourceHandle for $name {
                const KIND: ResourceKind = ResourceKind::$kind;

                fn from_id(id: ResourceId) -> Self {
                    Self(id)
                }

                fn id(self) -> ResourceId {
                    self.0
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", stringify!($name), self.0)
                }
            }
        )*
    };
}

resource_handles! {
    /// A handle to a vertex buffer.
    VertexBufferId => VertexBuffer;
    /// A handle to an index buffer.
    IndexBufferId => IndexBuffer;
    /// A handle to a constant buffer.
    ConstantBufferId => ConstantBuffer;
    /// A handle to a texture.
    TextureId => Texture;
    /// A handle to an input layout.
    InputLayoutId => InputLayout;
    /// A handle to a shader program.
    ProgramId => Program;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_shows_index_and_generation() {
        let id = VertexBufferId::from_id(ResourceId {
            index: 3,
            generation: 2,
        });
        assert_eq!(format!("{id:?}"), "VertexBufferId(3v2)");
    }

    #[test]
    fn handles_of_different_generations_differ() {
        let a = TextureId::from_id(ResourceId {
            index: 1,
            generation: 0,
        });
        let b = TextureId::from_id(ResourceId {
            index: 1,
            generation: 1,
        });
        assert_ne!(a, b);
        assert_eq!(TextureId::KIND, ResourceKind::Texture);
    }
}
