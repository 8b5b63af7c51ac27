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

//! # Kiwi GL
//!
//! A WebGL-shaped context that records calls instead of executing them.
//!
//! A [`GlContext`] hands out resource handles synchronously and keeps every
//! call in an ordered log. Draw calls flush the log to a shared
//! [`kiwi_actuator::Actuator`], which replays it on whatever real context is
//! bound at that moment. Several facades may share one actuator; each plays
//! in its own session.
//!
//! ```ignore
//! let actuator = Actuator::shared();
//! let mut gl = GlContext::new(actuator.clone(), RenderType::WebGl, ContextAttributes::default())?;
//! let buffer = gl.create_buffer();
//! gl.bind_buffer(gl::ARRAY_BUFFER, Some(&buffer));
//! lock(&actuator)?.bind(Box::new(HeadlessContext::new()));
//! let report = gl.draw_arrays(gl::TRIANGLES, 0, 3)?;
//! ```

#![warn(missing_docs)]

mod context;
mod handle_table;

pub use self::context::{GlContext, UniformLocation};
