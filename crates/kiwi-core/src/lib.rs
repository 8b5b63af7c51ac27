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

//! # Kiwi Core
//!
//! Foundational crate for deferred GL command playback: logical resource
//! handles, the records and instructions that describe GL calls, the
//! [`Recorder`] that accumulates them, and the [`RealContext`] contract a
//! concrete execution context implements.
//!
//! Nothing in this crate talks to a real context. Recording is pure data;
//! playback lives in `kiwi-actuator`.

#![warn(missing_docs)]

pub mod constants;
pub mod context;
pub mod error;
pub mod glsl;
pub mod handle;
pub mod record;
pub mod recorder;
pub mod stats;
pub mod traits;

pub use constants::{gl, Constants, GLenum, GL};
pub use context::{Capabilities, ContextAttributes, ParameterValue, RenderType};
pub use error::{ConfigError, ContextError, DecodeError};
pub use handle::{
    BufferHandle, HandleMeta, ProgramHandle, ProgramMeta, ResourceHandle, ResourceId,
    ResourceKind, SessionId, ShaderHandle, ShaderMeta, ShaderStage,
};
pub use record::{Arg, BufferData, Instruction, Op, Record, Value};
pub use recorder::{Recorder, RetentionPolicy};
pub use stats::PlaybackStats;
pub use traits::{RealContext, RealName};
