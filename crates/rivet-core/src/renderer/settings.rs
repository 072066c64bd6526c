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

//! Defines the settings that tune command recording and execution.

use crate::math::Rgba;
use serde::{Deserialize, Serialize};

use super::error::RenderError;

/// Tunables shared by frames, state stacks and rendering contexts.
///
/// Every field falls back to its default when missing from a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// The maximum number of blocks a state stack may hold above its base.
    pub max_state_stack_depth: usize,
    /// The maximum nesting of `Execute` and render-to-target commands.
    pub max_execute_depth: usize,
    /// The number of recorded frames that may wait for the executor.
    pub frame_queue_capacity: usize,
    /// The color frames are cleared with unless a producer asks otherwise.
    pub default_clear_color: Rgba,
    /// The number of commands preallocated per command buffer.
    pub command_capacity: usize,
    /// The number of payload bytes preallocated per command buffer.
    pub payload_capacity: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_state_stack_depth: 10,
            max_execute_depth: 16,
            frame_queue_capacity: 2,
            default_clear_color: Rgba::BLACK,
            command_capacity: 256,
            payload_capacity: 64 * 1024,
        }
    }
}

impl RenderSettings {
    /// Parses settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| RenderError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a JSON file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        log::debug!("Loaded render settings from '{}'.", path.display());
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, RenderError> {
        serde_json::to_string_pretty(self).map_err(|e| RenderError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), RenderError> {
        if self.max_execute_depth == 0 {
            return Err(RenderError::Config(
                "max_execute_depth must be at least 1".to_string(),
            ));
        }
        if self.frame_queue_capacity == 0 {
            return Err(RenderError::Config(
                "frame_queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
