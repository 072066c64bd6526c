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

//! Hands recorded frames from a producer thread to an executor thread.
//!
//! Frames move through two bounded `flume` channels: recorded frames travel to the
//! consumer, cleared frames travel back to the producer for reuse. Ownership of a
//! frame always belongs to exactly one side.

use flume::{Receiver, Sender, TryRecvError, TrySendError};

use super::error::RenderError;
use super::frame::RenderFrame;
use super::settings::RenderSettings;

/// Creates a connected producer/consumer pair.
pub fn frame_queue(settings: &RenderSettings) -> (FrameProducer, FrameConsumer) {
    let capacity = settings.frame_queue_capacity.max(1);
    let (submit_tx, submit_rx) = flume::bounded(capacity);
    let (recycle_tx, recycle_rx) = flume::bounded(capacity + 1);

    log::debug!("Frame queue created with capacity {capacity}.");

    (
        FrameProducer {
            submit_tx,
            recycle_rx,
            settings: settings.clone(),
            next_frame: 0,
        },
        FrameConsumer {
            submit_rx,
            recycle_tx,
        },
    )
}

/// The recording side of a frame queue.
#[derive(Debug)]
pub struct FrameProducer {
    submit_tx: Sender<RenderFrame>,
    recycle_rx: Receiver<RenderFrame>,
    settings: RenderSettings,
    next_frame: u64,
}

impl FrameProducer {
    /// Returns a cleared frame, reusing a recycled one when available.
    pub fn acquire(&mut self) -> RenderFrame {
        let mut frame = match self.recycle_rx.try_recv() {
            Ok(frame) => frame,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                log::trace!("No recycled frame available, allocating a new one.");
                RenderFrame::new(&self.settings)
            }
        };

        self.next_frame += 1;
        frame.info_mut().frame_number = self.next_frame;
        frame
    }

    /// Moves a recorded frame to the consumer, blocking while the queue is full.
    pub fn submit(&self, frame: RenderFrame) -> Result<(), RenderError> {
        self.submit_tx
            .send(frame)
            .map_err(|_| RenderError::Disconnected)
    }

    /// Returns the number of frames waiting for the consumer.
    pub fn pending(&self) -> usize {
        self.submit_tx.len()
    }
}

/// The executing side of a frame queue.
#[derive(Debug)]
pub struct FrameConsumer {
    submit_rx: Receiver<RenderFrame>,
    recycle_tx: Sender<RenderFrame>,
}

impl FrameConsumer {
    /// Blocks until a recorded frame arrives.
    pub fn recv(&self) -> Result<RenderFrame, RenderError> {
        self.submit_rx.recv().map_err(|_| RenderError::Disconnected)
    }

    /// Returns a recorded frame if one is waiting.
    pub fn try_recv(&self) -> Result<Option<RenderFrame>, RenderError> {
        match self.submit_rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RenderError::Disconnected),
        }
    }

    /// Clears an executed frame and hands it back to the producer.
    pub fn recycle(&self, mut frame: RenderFrame) {
        frame.clear();
        match self.recycle_tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::trace!("Recycle queue is full, dropping frame.");
            }
            Err(TrySendError::Disconnected(_)) => {
                log::trace!("Producer is gone, dropping frame.");
            }
        }
    }
}
