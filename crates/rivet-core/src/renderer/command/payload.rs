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

//! Storage for CPU data carried by upload and construction commands.

use std::sync::Arc;

/// A reference to bytes carried by a command.
///
/// The variant records the provenance of the data. `Adopted` bytes were copied
/// into the owning buffer's [`PayloadArena`] and are released by its reset.
/// `Reserved` carries no bytes, only a size for the executor to allocate.
/// `Persistent` refers to caller-owned data that the buffer never copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBuffer {
    /// Bytes copied into the payload arena.
    Adopted {
        /// The offset of the first byte inside the arena.
        offset: usize,
        /// The number of bytes.
        size: usize,
    },
    /// A size-only reservation without data.
    Reserved {
        /// The number of bytes to reserve.
        size: usize,
    },
    /// Caller-owned bytes referenced by index into the buffer's persistent list.
    Persistent {
        /// The index inside the owning buffer's persistent list.
        index: usize,
        /// The number of bytes.
        size: usize,
    },
}

impl DataBuffer {
    /// Returns the number of bytes this reference describes.
    pub fn size(&self) -> usize {
        match *self {
            DataBuffer::Adopted { size, .. }
            | DataBuffer::Reserved { size }
            | DataBuffer::Persistent { size, .. } => size,
        }
    }

    /// Returns `true` if the bytes were copied into the owning buffer.
    pub fn is_adopted(&self) -> bool {
        matches!(self, DataBuffer::Adopted { .. })
    }
}

/// Caller-owned data that commands reference without copying.
///
/// Cloning only bumps a reference count, so recording the same persistent buffer
/// any number of times never copies its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentBuffer(Arc<[u8]>);

impl PersistentBuffer {
    /// Wraps caller data.
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self(data.into())
    }

    /// Builds a persistent buffer from plain-old-data values.
    pub fn from_pod<T: bytemuck::Pod>(values: &[T]) -> Self {
        Self(Arc::from(bytemuck::cast_slice::<T, u8>(values)))
    }

    /// Returns the referenced bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if both buffers share the same allocation.
    pub fn ptr_eq(&self, other: &PersistentBuffer) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A bump arena that owns adopted payload bytes.
///
/// Adopting appends to a single growable byte vector; reset truncates it while
/// keeping its capacity, so steady-state frames do not allocate.
#[derive(Debug, Default)]
pub struct PayloadArena {
    bytes: Vec<u8>,
    blocks: usize,
}

impl PayloadArena {
    /// Creates an arena with `capacity` preallocated bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            blocks: 0,
        }
    }

    /// Copies `data` into the arena and returns a reference to the copy.
    pub fn adopt(&mut self, data: &[u8]) -> DataBuffer {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(data);
        self.blocks += 1;
        DataBuffer::Adopted {
            offset,
            size: data.len(),
        }
    }

    /// Returns the bytes of an adopted block.
    pub fn get(&self, offset: usize, size: usize) -> Option<&[u8]> {
        self.bytes.get(offset..offset + size)
    }

    /// Returns the number of blocks adopted since the last reset.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Returns the number of bytes adopted since the last reset.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing was adopted since the last reset.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Releases every adopted block at once.
    pub fn reset(&mut self) {
        self.bytes.clear();
        self.blocks = 0;
    }
}
