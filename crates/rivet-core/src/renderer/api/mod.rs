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

//! Plain data vocabulary shared by producers and executors.
//!
//! - **[`enums`]**: primitive types, compare functions, blend factors and friends.
//! - **[`flags`]**: clear masks, color masks and pipeline feature sets.
//! - **[`vertex_format`]**: packed vertex layouts used by input layouts.

pub mod enums;
pub mod flags;
pub mod vertex_format;

pub use self::enums::*;
pub use self::flags::*;
pub use self::vertex_format::VertexFormat;
