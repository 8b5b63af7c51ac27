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

//! Records: one logical GL operation each.
//!
//! A [`Record`] is built by value at the moment a facade call is made. Every
//! argument is tagged at construction as either a literal [`Value`] or a
//! reference to a logical resource, so nothing has to be patched afterwards.

mod instruction;
mod value;

pub use self::instruction::Instruction;
pub use self::value::{BufferData, Value};

use crate::handle::{ResourceId, ResourceKind};

/// The recorded operation vocabulary.
///
/// The argument layout of each operation is listed on its variant; handle
/// arguments are written `H`, literals by their [`Value`] kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `[Enum type]`, returns the shader id.
    CreateShader,
    /// `[H shader, Text source]`.
    ShaderSource,
    /// `[H shader]`.
    CompileShader,
    /// `[]`, returns the program id.
    CreateProgram,
    /// `[H program, H shader]`.
    AttachShader,
    /// `[H program]`.
    LinkProgram,
    /// `[H program, Text name, Int expected]`.
    GetAttribLocation,
    /// `[H program, Text name, Int expected]`, `-1` when not declared.
    GetUniformLocation,
    /// `[]`, returns the buffer id.
    CreateBuffer,
    /// `[Enum target, H buffer | Null]`.
    BindBuffer,
    /// `[Enum target, Data, Enum usage]`.
    BufferData,
    /// `[Int x, Int y, Int width, Int height]`.
    Viewport,
    /// `[Float r, Float g, Float b, Float a]`.
    ClearColor,
    /// `[Enum mask]`.
    Clear,
    /// `[H program | Null]`.
    UseProgram,
    /// `[Int index]`.
    EnableVertexAttribArray,
    /// `[Int index, Int size, Enum type, Bool normalized, Int stride, Int offset]`.
    VertexAttribPointer,
    /// `[H program, Text name, Floats values]`.
    Uniform,
    /// `[Enum mode, Int first, Int count]`. Flushes.
    DrawArrays,
    /// `[Enum mode, Int count, Enum type, Int offset]`. Flushes.
    DrawElements,
}

impl Op {
    /// The GL entry point name.
    pub const fn name(self) -> &'static str {
        match self {
            Op::CreateShader => "createShader",
            Op::ShaderSource => "shaderSource",
            Op::CompileShader => "compileShader",
            Op::CreateProgram => "createProgram",
            Op::AttachShader => "attachShader",
            Op::LinkProgram => "linkProgram",
            Op::GetAttribLocation => "getAttribLocation",
            Op::GetUniformLocation => "getUniformLocation",
            Op::CreateBuffer => "createBuffer",
            Op::BindBuffer => "bindBuffer",
            Op::BufferData => "bufferData",
            Op::Viewport => "viewport",
            Op::ClearColor => "clearColor",
            Op::Clear => "clear",
            Op::UseProgram => "useProgram",
            Op::EnableVertexAttribArray => "enableVertexAttribArray",
            Op::VertexAttribPointer => "vertexAttribPointer",
            Op::Uniform => "uniform",
            Op::DrawArrays => "drawArrays",
            Op::DrawElements => "drawElements",
        }
    }

    /// Whether issuing this operation triggers playback.
    pub const fn is_flush(self) -> bool {
        matches!(self, Op::DrawArrays | Op::DrawElements)
    }

    /// The kind of resource this operation creates, if any.
    pub const fn creates(self) -> Option<ResourceKind> {
        match self {
            Op::CreateShader => Some(ResourceKind::Shader),
            Op::CreateProgram => Some(ResourceKind::Program),
            Op::CreateBuffer => Some(ResourceKind::Buffer),
            _ => None,
        }
    }

    /// Whether this operation contributes to the definition of the resource
    /// named by its first handle argument (or its return id).
    ///
    /// Buffer contents are defined by `bufferData` through the binding state,
    /// not by a handle argument; the actuator journals those separately.
    pub const fn defines_resource(self) -> bool {
        matches!(
            self,
            Op::CreateShader
                | Op::ShaderSource
                | Op::CompileShader
                | Op::CreateProgram
                | Op::AttachShader
                | Op::LinkProgram
                | Op::CreateBuffer
        )
    }
}

/// A record argument: a literal captured by value, or a logical reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A literal value passed through unchanged at playback.
    Literal(Value),
    /// A logical resource resolved to a real one at playback.
    Handle(ResourceId),
}

impl Arg {
    /// The referenced id, if this is a handle argument.
    pub fn as_handle(&self) -> Option<ResourceId> {
        match self {
            Arg::Handle(id) => Some(*id),
            Arg::Literal(_) => None,
        }
    }
}

/// One logical operation with its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    op: Op,
    args: Vec<Arg>,
    returns: Option<ResourceId>,
}

impl Record {
    /// Starts a record with no arguments.
    pub fn new(op: Op) -> Self {
        Self {
            op,
            args: Vec::new(),
            returns: None,
        }
    }

    /// Appends a literal argument.
    #[must_use]
    pub fn literal(mut self, value: impl Into<Value>) -> Self {
        self.args.push(Arg::Literal(value.into()));
        self
    }

    /// Appends a handle argument.
    #[must_use]
    pub fn handle(mut self, id: ResourceId) -> Self {
        self.args.push(Arg::Handle(id));
        self
    }

    /// Appends a handle argument, or a `Null` literal when `id` is `None`.
    #[must_use]
    pub fn optional_handle(self, id: Option<ResourceId>) -> Self {
        match id {
            Some(id) => self.handle(id),
            None => self.literal(Value::Null),
        }
    }

    /// Declares the id this record creates.
    #[must_use]
    pub fn returning(mut self, id: ResourceId) -> Self {
        self.returns = Some(id);
        self
    }

    /// The operation.
    pub fn op(&self) -> Op {
        self.op
    }

    /// The ordered arguments.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// The id this record is defined to produce.
    pub fn returns(&self) -> Option<ResourceId> {
        self.returns
    }

    /// Ids referenced by handle arguments, in argument order.
    pub fn handle_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.args.iter().filter_map(Arg::as_handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::gl;

    #[test]
    fn builder_tags_arguments_at_construction() {
        let program = ResourceId(1);
        let shader = ResourceId(2);
        let record = Record::new(Op::AttachShader).handle(program).handle(shader);

        assert_eq!(record.args(), &[Arg::Handle(program), Arg::Handle(shader)]);
        assert_eq!(record.handle_ids().collect::<Vec<_>>(), vec![program, shader]);
        assert_eq!(record.returns(), None);
    }

    #[test]
    fn optional_handle_uses_null_literal() {
        let record = Record::new(Op::BindBuffer)
            .literal(Value::Enum(gl::ARRAY_BUFFER))
            .optional_handle(None);
        assert_eq!(record.args()[1], Arg::Literal(Value::Null));
        assert_eq!(record.handle_ids().count(), 0);
    }

    #[test]
    fn creation_ops() {
        assert_eq!(Op::CreateShader.creates(), Some(ResourceKind::Shader));
        assert_eq!(Op::CreateBuffer.creates(), Some(ResourceKind::Buffer));
        assert_eq!(Op::LinkProgram.creates(), None);
        assert!(Op::LinkProgram.defines_resource());
        assert!(!Op::BufferData.defines_resource());
    }

    #[test]
    fn only_draw_calls_flush() {
        assert!(Op::DrawArrays.is_flush());
        assert!(Op::DrawElements.is_flush());
        assert!(!Op::UseProgram.is_flush());
        assert_eq!(Op::DrawArrays.name(), "drawArrays");
    }
}
