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

//! Positioned, execution-ready records and their typed argument decoders.

use crate::constants::GLenum;
use crate::error::DecodeError;
use crate::handle::ResourceId;

use super::{Arg, BufferData, Op, Record, Value};

/// The execution-ready form of a [`Record`].
///
/// The payload is the record itself; the instruction adds the session-wide
/// position the record was appended at, so playback failures can be traced
/// back to the call that issued them.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    position: u64,
    record: Record,
}

impl Instruction {
    /// Wraps a record appended at `position`.
    pub fn new(position: u64, record: Record) -> Self {
        Self { position, record }
    }

    /// Position of the originating record.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The originating record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Unwraps the originating record.
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Shorthand for `record().op()`.
    pub fn op(&self) -> Op {
        self.record.op()
    }

    /// The id this instruction creates, if it is a creation instruction.
    pub fn returns(&self) -> Option<ResourceId> {
        self.record.returns()
    }

    /// The declared return id, required for creation instructions.
    pub fn expect_returns(&self) -> Result<ResourceId, DecodeError> {
        self.record.returns().ok_or(DecodeError::MissingReturnId {
            position: self.position,
            op: self.op().name(),
        })
    }

    fn arg(&self, index: usize) -> Result<&Arg, DecodeError> {
        self.record
            .args()
            .get(index)
            .ok_or(DecodeError::MissingArgument {
                position: self.position,
                op: self.op().name(),
                index,
            })
    }

    fn literal(&self, index: usize, expected: &'static str) -> Result<&Value, DecodeError> {
        match self.arg(index)? {
            Arg::Literal(value) => Ok(value),
            Arg::Handle(_) => Err(self.unexpected(index, expected)),
        }
    }

    fn unexpected(&self, index: usize, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedArgument {
            position: self.position,
            op: self.op().name(),
            index,
            expected,
        }
    }

    /// A handle argument.
    pub fn handle(&self, index: usize) -> Result<ResourceId, DecodeError> {
        match self.arg(index)? {
            Arg::Handle(id) => Ok(*id),
            Arg::Literal(_) => Err(self.unexpected(index, "handle")),
        }
    }

    /// A handle argument that may be a `Null` literal.
    pub fn optional_handle(&self, index: usize) -> Result<Option<ResourceId>, DecodeError> {
        match self.arg(index)? {
            Arg::Handle(id) => Ok(Some(*id)),
            Arg::Literal(Value::Null) => Ok(None),
            Arg::Literal(_) => Err(self.unexpected(index, "handle or null")),
        }
    }

    /// An enum literal.
    pub fn enum_at(&self, index: usize) -> Result<GLenum, DecodeError> {
        match self.literal(index, "enum")? {
            Value::Enum(value) => Ok(*value),
            _ => Err(self.unexpected(index, "enum")),
        }
    }

    /// An integer literal.
    pub fn int_at(&self, index: usize) -> Result<i64, DecodeError> {
        match self.literal(index, "int")? {
            Value::Int(value) => Ok(*value),
            _ => Err(self.unexpected(index, "int")),
        }
    }

    /// An integer literal narrowed to `i32`.
    pub fn i32_at(&self, index: usize) -> Result<i32, DecodeError> {
        i32::try_from(self.int_at(index)?).map_err(|_| self.unexpected(index, "32-bit int"))
    }

    /// An integer literal narrowed to `u32`.
    pub fn u32_at(&self, index: usize) -> Result<u32, DecodeError> {
        u32::try_from(self.int_at(index)?).map_err(|_| self.unexpected(index, "unsigned 32-bit int"))
    }

    /// A boolean literal.
    pub fn bool_at(&self, index: usize) -> Result<bool, DecodeError> {
        match self.literal(index, "bool")? {
            Value::Bool(value) => Ok(*value),
            _ => Err(self.unexpected(index, "bool")),
        }
    }

    /// A float literal.
    pub fn float_at(&self, index: usize) -> Result<f32, DecodeError> {
        match self.literal(index, "float")? {
            Value::Float(value) => Ok(*value),
            _ => Err(self.unexpected(index, "float")),
        }
    }

    /// A text literal.
    pub fn text_at(&self, index: usize) -> Result<&str, DecodeError> {
        match self.literal(index, "text")? {
            Value::Text(value) => Ok(value),
            _ => Err(self.unexpected(index, "text")),
        }
    }

    /// A float-vector literal.
    pub fn floats_at(&self, index: usize) -> Result<&[f32], DecodeError> {
        match self.literal(index, "floats")? {
            Value::Floats(values) => Ok(values),
            _ => Err(self.unexpected(index, "floats")),
        }
    }

    /// A buffer-data literal.
    pub fn data_at(&self, index: usize) -> Result<&BufferData, DecodeError> {
        match self.literal(index, "data")? {
            Value::Data(data) => Ok(data),
            _ => Err(self.unexpected(index, "data")),
        }
    }
}
