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

use kiwi_core::glsl::Declarations;
use kiwi_core::{GLenum, RealName, ShaderStage};

#[derive(Debug, Clone)]
pub(crate) struct ShaderObject {
    pub(crate) stage: ShaderStage,
    pub(crate) source: String,
    pub(crate) compiled: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ProgramObject {
    pub(crate) shaders: Vec<RealName>,
    pub(crate) linked: bool,
    pub(crate) declarations: Declarations,
}

/// Where an enabled attribute reads its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AttribPointer {
    pub(crate) buffer: RealName,
    pub(crate) size: i32,
    pub(crate) data_type: GLenum,
    pub(crate) stride: i32,
    pub(crate) offset: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VertexAttrib {
    pub(crate) enabled: bool,
    pub(crate) pointer: Option<AttribPointer>,
}

/// A draw the context accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    /// `drawArrays(mode, first, count)`.
    Arrays {
        /// Primitive mode.
        mode: GLenum,
        /// First vertex.
        first: i32,
        /// Vertex count.
        count: i32,
        /// The program in use.
        program: RealName,
    },
    /// `drawElements(mode, count, type, offset)`.
    Elements {
        /// Primitive mode.
        mode: GLenum,
        /// Index count.
        count: i32,
        /// Index type.
        index_type: GLenum,
        /// Byte offset into the element buffer.
        offset: i64,
        /// The program in use.
        program: RealName,
    },
}
