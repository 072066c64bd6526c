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

//! A dedicated thread that executes submitted frames.

use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context as _};
use rivet_core::renderer::{FrameConsumer, RenderBackend, RenderingContext};

/// Owns a rendering context on its own thread.
///
/// The thread receives frames from a [`FrameConsumer`], displays each one and hands
/// it back for reuse. It stops once every producer is gone and the queue is drained.
pub struct RenderThread<B: RenderBackend> {
    handle: JoinHandle<RenderingContext<B>>,
}

impl<B> RenderThread<B>
where
    B: RenderBackend + 'static,
    RenderingContext<B>: Send,
{
    /// Moves `context` to a new thread that drains `consumer`.
    pub fn spawn(
        mut context: RenderingContext<B>,
        consumer: FrameConsumer,
    ) -> anyhow::Result<Self> {
        let handle = thread::Builder::new()
            .name("rivet-render".to_owned())
            .spawn(move || {
                log::info!("Render thread started.");
                let mut displayed = 0u64;

                while let Ok(mut frame) = consumer.recv() {
                    context.display(&mut frame);
                    consumer.recycle(frame);
                    displayed += 1;
                }

                log::info!("Render thread stopped after {displayed} frames.");
                context
            })
            .context("Failed to spawn the render thread")?;

        Ok(Self { handle })
    }

    /// Returns `true` once the thread has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the thread to stop and returns its context.
    pub fn join(self) -> anyhow::Result<RenderingContext<B>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("The render thread panicked"))
    }
}
