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

//! Defines the error types of the rendering layer.

use crate::renderer::handle::{ResourceId, ResourceKind};
use std::fmt;

/// A failure to resolve a handle into a backend object.
///
/// These are soft errors: the executor skips the affected operation, logs the
/// failure and keeps replaying the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The handle was released, or its slot has been reused since.
    Stale {
        /// The kind of the resource.
        kind: ResourceKind,
        /// The offending handle.
        id: ResourceId,
    },
    /// The handle is live but its backend object has not been constructed yet.
    Pending {
        /// The kind of the resource.
        kind: ResourceKind,
        /// The offending handle.
        id: ResourceId,
    },
    /// The handle was never issued by this table.
    Unknown {
        /// The kind of the resource.
        kind: ResourceKind,
        /// The offending handle.
        id: ResourceId,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Stale { kind, id } => {
                write!(f, "Stale {kind} handle {id}")
            }
            ResolveError::Pending { kind, id } => {
                write!(f, "The {kind} {id} has not been constructed yet")
            }
            ResolveError::Unknown { kind, id } => {
                write!(f, "Unknown {kind} handle {id}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// A high-level error of the rendering layer.
#[derive(Debug)]
pub enum RenderError {
    /// A handle could not be resolved.
    Resolve(ResolveError),
    /// The backend failed to perform an operation.
    Backend(String),
    /// Render settings could not be parsed or are invalid.
    Config(String),
    /// The other side of a frame queue has been dropped.
    Disconnected,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Resolve(err) => write!(f, "Failed to resolve resource: {err}"),
            RenderError::Backend(msg) => write!(f, "Backend operation failed: {msg}"),
            RenderError::Config(msg) => write!(f, "Invalid render settings: {msg}"),
            RenderError::Disconnected => write!(f, "The frame queue is disconnected."),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resolve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for RenderError {
    fn from(err: ResolveError) -> Self {
        RenderError::Resolve(err)
    }
}
