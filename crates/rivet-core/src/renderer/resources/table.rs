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

use crate::renderer::error::ResolveError;
use crate::renderer::handle::{ResourceHandle, ResourceId};
use std::marker::PhantomData;

enum SlotState<T> {
    Free,
    Pending,
    Ready(T),
}

struct Slot<T> {
    generation: u32,
    state: SlotState<T>,
}

/// Maps handles of type `H` to backend objects of type `T`.
///
/// A handle goes through three states: *pending* right after [`allocate`](Self::allocate),
/// *ready* once its backend object is [`insert`](Self::insert)ed, and *free* after
/// [`release`](Self::release). Released slots are recycled with an incremented generation.
pub struct HandleTable<H, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    _marker: PhantomData<fn() -> H>,
}

impl<H: ResourceHandle, T> Default for HandleTable<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ResourceHandle, T> HandleTable<H, T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Issues a fresh handle whose slot is pending construction.
    pub fn allocate(&mut self) -> H {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.state = SlotState::Pending;
            return H::from_id(ResourceId {
                index,
                generation: slot.generation,
            });
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            state: SlotState::Pending,
        });
        H::from_id(ResourceId {
            index,
            generation: 0,
        })
    }

    /// Stores the backend object of a live handle, returning the one it replaces.
    pub fn insert(&mut self, handle: H, value: T) -> Result<Option<T>, ResolveError> {
        let slot = self.live_slot_mut(handle)?;
        let previous = std::mem::replace(&mut slot.state, SlotState::Ready(value));
        Ok(match previous {
            SlotState::Ready(old) => Some(old),
            _ => None,
        })
    }

    /// Resolves a handle to its backend object.
    pub fn get(&self, handle: H) -> Result<&T, ResolveError> {
        let id = handle.id();
        let slot = self
            .slots
            .get(id.index as usize)
            .ok_or(ResolveError::Unknown { kind: H::KIND, id })?;

        if slot.generation != id.generation {
            return Err(ResolveError::Stale { kind: H::KIND, id });
        }
        match &slot.state {
            SlotState::Ready(value) => Ok(value),
            SlotState::Pending => Err(ResolveError::Pending { kind: H::KIND, id }),
            SlotState::Free => Err(ResolveError::Stale { kind: H::KIND, id }),
        }
    }

    /// Resolves a handle to its backend object, mutably.
    pub fn get_mut(&mut self, handle: H) -> Result<&mut T, ResolveError> {
        let id = handle.id();
        match &mut self.live_slot_mut(handle)?.state {
            SlotState::Ready(value) => Ok(value),
            _ => Err(ResolveError::Pending { kind: H::KIND, id }),
        }
    }

    /// Invalidates a handle and returns its backend object, if it was constructed.
    pub fn release(&mut self, handle: H) -> Result<Option<T>, ResolveError> {
        let id = handle.id();
        let slot = self.live_slot_mut(handle)?;
        let previous = std::mem::replace(&mut slot.state, SlotState::Free);
        slot.generation = slot.generation.wrapping_add(1);

        self.free.push(id.index);
        self.live -= 1;

        Ok(match previous {
            SlotState::Ready(value) => Some(value),
            _ => None,
        })
    }

    /// Returns `true` if the handle was issued by this table and not released since.
    pub fn is_live(&self, handle: H) -> bool {
        let id = handle.id();
        self.slots.get(id.index as usize).is_some_and(|slot| {
            slot.generation == id.generation && !matches!(slot.state, SlotState::Free)
        })
    }

    /// Returns the number of live handles.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no handle is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Releases every live handle, returning the constructed backend objects.
    pub fn drain(&mut self) -> Vec<T> {
        let mut values = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if matches!(slot.state, SlotState::Free) {
                continue;
            }
            if let SlotState::Ready(value) = std::mem::replace(&mut slot.state, SlotState::Free)
            {
                values.push(value);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index as u32);
        }
        self.live = 0;
        values
    }

    fn live_slot_mut(&mut self, handle: H) -> Result<&mut Slot<T>, ResolveError> {
        let id = handle.id();
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .ok_or(ResolveError::Unknown { kind: H::KIND, id })?;

        if slot.generation != id.generation || matches!(slot.state, SlotState::Free) {
            return Err(ResolveError::Stale { kind: H::KIND, id });
        }
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::handle::VertexBufferId;

    #[test]
    fn allocated_handles_are_pending_until_inserted() {
        let mut table: HandleTable<VertexBufferId, &str> = HandleTable::new();
        let handle = table.allocate();

        assert!(matches!(
            table.get(handle),
            Err(ResolveError::Pending { .. })
        ));

        table.insert(handle, "buffer").unwrap();
        assert_eq!(table.get(handle), Ok(&"buffer"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn released_slots_are_recycled_with_a_new_generation() {
        let mut table: HandleTable<VertexBufferId, u32> = HandleTable::new();
        let first = table.allocate();
        table.insert(first, 7).unwrap();

        assert_eq!(table.release(first), Ok(Some(7)));
        assert!(!table.is_live(first));

        let second = table.allocate();
        assert_eq!(second.id().index, first.id().index);
        assert_eq!(second.id().generation, first.id().generation + 1);

        table.insert(second, 9).unwrap();
        assert!(matches!(table.get(first), Err(ResolveError::Stale { .. })));
        assert_eq!(table.get(second), Ok(&9));
    }

    #[test]
    fn unknown_and_double_released_handles_are_rejected() {
        let mut table: HandleTable<VertexBufferId, u32> = HandleTable::new();
        let foreign = VertexBufferId::from_id(ResourceId {
            index: 12,
            generation: 0,
        });
        assert!(matches!(
            table.get(foreign),
            Err(ResolveError::Unknown { .. })
        ));

        let handle = table.allocate();
        assert_eq!(table.release(handle), Ok(None));
        assert!(matches!(
            table.release(handle),
            Err(ResolveError::Stale { .. })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn drain_returns_constructed_objects_and_invalidates_handles() {
        let mut table: HandleTable<VertexBufferId, u32> = HandleTable::new();
        let a = table.allocate();
        let b = table.allocate();
        table.insert(a, 1).unwrap();

        assert_eq!(table.drain(), vec![1]);
        assert!(!table.is_live(a));
        assert!(!table.is_live(b));
        assert!(table.is_empty());
    }
}
