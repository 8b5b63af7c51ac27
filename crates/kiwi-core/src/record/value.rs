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

//! Literal argument values captured at record time.

use crate::constants::GLenum;

/// Vertex or index data captured by value when `bufferData` is recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    /// 32-bit floats, e.g. vertex positions.
    F32(Vec<f32>),
    /// 16-bit unsigned integers, e.g. element indices.
    U16(Vec<u16>),
    /// Raw bytes.
    U8(Vec<u8>),
}

impl BufferData {
    /// The data as bytes, in native byte order.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::F32(values) => bytemuck::cast_slice(values),
            Self::U16(values) => bytemuck::cast_slice(values),
            Self::U8(values) => values,
        }
    }

    /// Size of the data in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::F32(values) => values.len() * std::mem::size_of::<f32>(),
            Self::U16(values) => values.len() * std::mem::size_of::<u16>(),
            Self::U8(values) => values.len(),
        }
    }
}

impl From<Vec<f32>> for BufferData {
    fn from(values: Vec<f32>) -> Self {
        Self::F32(values)
    }
}

impl From<&[f32]> for BufferData {
    fn from(values: &[f32]) -> Self {
        Self::F32(values.to_vec())
    }
}

impl From<Vec<u16>> for BufferData {
    fn from(values: Vec<u16>) -> Self {
        Self::U16(values)
    }
}

impl From<&[u16]> for BufferData {
    fn from(values: &[u16]) -> Self {
        Self::U16(values.to_vec())
    }
}

impl From<Vec<u8>> for BufferData {
    fn from(values: Vec<u8>) -> Self {
        Self::U8(values)
    }
}

/// A literal record argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absent object (`null` in GL bindings).
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer (counts, offsets, locations).
    Int(i64),
    /// A GL enumerant.
    Enum(GLenum),
    /// A floating-point scalar.
    Float(f32),
    /// Text such as shader source or an attribute name.
    Text(String),
    /// A small float vector (uniform values, clear colors).
    Floats(Vec<f32>),
    /// Buffer contents.
    Data(BufferData),
}

impl Value {
    /// Short kind name used in decode errors and traces.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Enum(_) => "enum",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Floats(_) => "floats",
            Self::Data(_) => "data",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<BufferData> for Value {
    fn from(v: BufferData) -> Self {
        Self::Data(v)
    }
}
