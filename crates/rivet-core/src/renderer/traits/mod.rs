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

//! Defines the contracts between the command layer and its collaborators.
//!
//! - [`RenderBackend`]: the concrete graphics API an executor replays commands against.
//! - [`ResourceFactory`]: the object-safe resource request interface used by producers.

mod backend;
mod resource_factory;

pub use self::backend::RenderBackend;
pub use self::resource_factory::ResourceFactory;
