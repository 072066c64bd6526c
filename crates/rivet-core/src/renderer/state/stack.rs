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

use super::block::StateBlock;
use std::ops::{Deref, DerefMut};

/// A stack of render state blocks with copy-down push semantics.
///
/// The stack always holds a base block that cannot be popped. Every push copies
/// the current top, so the top is always the fully resolved state that a draw call
/// captures, and producers only overwrite the slots that differ.
///
/// Overflowing `max_depth` or popping the base block is a programming error and panics.
#[derive(Debug, Clone)]
pub struct StateStack {
    blocks: Vec<StateBlock>,
    max_depth: usize,
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new(10)
    }
}

impl StateStack {
    /// Creates a stack that accepts at most `max_depth` pushes above its base.
    pub fn new(max_depth: usize) -> Self {
        let mut blocks = Vec::with_capacity(max_depth + 1);
        blocks.push(StateBlock::new());
        Self { blocks, max_depth }
    }

    /// Creates a stack sized from render settings.
    pub fn with_settings(settings: &crate::renderer::RenderSettings) -> Self {
        Self::new(settings.max_state_stack_depth)
    }

    /// Pushes a copy of the current top and returns it for writing.
    pub fn push(&mut self) -> &mut StateBlock {
        assert!(
            self.depth() < self.max_depth,
            "state stack overflow: depth limit of {} reached",
            self.max_depth
        );
        let top = *self.states();
        self.blocks.push(top);
        self.top_mut()
    }

    /// Pushes `block` merged over the current top.
    pub fn push_block(&mut self, block: &StateBlock) -> &mut StateBlock {
        let merged = block.merged_over(self.states());
        let top = self.push();
        *top = merged;
        top
    }

    /// Discards the top block, restoring the previous one.
    pub fn pop(&mut self) {
        assert!(self.depth() > 0, "state stack underflow: cannot pop the base block");
        self.blocks.pop();
    }

    /// Pushes a copy of the current top and returns a guard that pops it on drop.
    pub fn scope(&mut self) -> StateScope<'_> {
        self.push();
        StateScope { stack: self }
    }

    /// Pushes `block` merged over the current top and returns a guard that pops it on drop.
    pub fn scope_with(&mut self, block: &StateBlock) -> StateScope<'_> {
        self.push_block(block);
        StateScope { stack: self }
    }

    /// Returns the current top block.
    pub fn states(&self) -> &StateBlock {
        // The base block is never popped.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Returns the current top block for writing.
    pub fn top_mut(&mut self) -> &mut StateBlock {
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    /// Returns the number of blocks pushed above the base.
    pub fn depth(&self) -> usize {
        self.blocks.len() - 1
    }

    /// Returns the depth limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Pops every block above the base.
    pub fn reset(&mut self) {
        self.blocks.truncate(1);
    }
}

/// A pushed stack level that pops itself when dropped.
///
/// The guard dereferences to the stack, so nested scopes are opened from it.
pub struct StateScope<'a> {
    stack: &'a mut StateStack,
}

impl StateScope<'_> {
    /// Returns the block this scope pushed.
    pub fn block(&mut self) -> &mut StateBlock {
        self.stack.top_mut()
    }
}

impl Deref for StateScope<'_> {
    type Target = StateStack;

    fn deref(&self) -> &StateStack {
        self.stack
    }
}

impl DerefMut for StateScope<'_> {
    fn deref_mut(&mut self) -> &mut StateStack {
        self.stack
    }
}

impl Drop for StateScope<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}
