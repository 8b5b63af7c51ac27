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

//! Logical resource handles.
//!
//! A handle stands in for a GL object before (and independently of) any real
//! context. It carries a process-wide unique [`ResourceId`] plus whatever
//! metadata the facade has mirrored from the records issued against it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::{gl, GLenum};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// The stable identity of a logical resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Allocates a fresh, process-wide unique id.
    pub fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one recording session (one facade) on the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Allocates a fresh, process-wide unique session id.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The kind of GL object a handle stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A vertex or fragment shader.
    Shader,
    /// A vertex or element buffer.
    Buffer,
    /// A linked shader program.
    Program,
}

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// `VERTEX_SHADER`.
    Vertex,
    /// `FRAGMENT_SHADER`.
    Fragment,
}

impl ShaderStage {
    /// Maps a GL shader type enum to a stage, if it names one.
    pub fn from_gl(shader_type: GLenum) -> Option<Self> {
        match shader_type {
            gl::VERTEX_SHADER => Some(Self::Vertex),
            gl::FRAGMENT_SHADER => Some(Self::Fragment),
            _ => None,
        }
    }

    /// The GL enum for this stage.
    pub const fn to_gl(self) -> GLenum {
        match self {
            Self::Vertex => gl::VERTEX_SHADER,
            Self::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// Mirrored state of a shader handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderMeta {
    /// The raw type passed to `createShader`, kept even when invalid.
    pub shader_type: GLenum,
    /// The most recent source set with `shaderSource`.
    pub source: Option<String>,
    /// Whether `compileShader` has been recorded.
    pub compile_requested: bool,
}

impl ShaderMeta {
    /// The stage named by `shader_type`, if valid.
    pub fn stage(&self) -> Option<ShaderStage> {
        ShaderStage::from_gl(self.shader_type)
    }
}

/// Mirrored state of a program handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramMeta {
    /// Attached shader ids, in attachment order.
    pub shaders: Vec<ResourceId>,
    /// Whether `linkProgram` has been recorded.
    pub link_requested: bool,
    /// Attribute names reflected at link time, in declaration order.
    pub attributes: Vec<String>,
    /// Uniform names reflected at link time, in declaration order.
    pub uniforms: Vec<String>,
}

/// Kind-specific creation data carried by a [`ResourceHandle`].
#[derive(Debug, Clone, PartialEq)]
pub enum HandleMeta {
    /// Shader metadata.
    Shader(ShaderMeta),
    /// Buffers carry nothing beyond identity.
    Buffer,
    /// Program metadata.
    Program(ProgramMeta),
}

/// A logical proxy for a GL object, owned by the facade's handle table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceHandle {
    id: ResourceId,
    meta: HandleMeta,
}

impl ResourceHandle {
    /// Creates a shader handle of the given (possibly invalid) type.
    pub fn shader(shader_type: GLenum) -> Self {
        Self {
            id: ResourceId::next(),
            meta: HandleMeta::Shader(ShaderMeta {
                shader_type,
                ..Default::default()
            }),
        }
    }

    /// Creates a program handle.
    pub fn program() -> Self {
        Self {
            id: ResourceId::next(),
            meta: HandleMeta::Program(ProgramMeta::default()),
        }
    }

    /// Creates a buffer handle.
    pub fn buffer() -> Self {
        Self {
            id: ResourceId::next(),
            meta: HandleMeta::Buffer,
        }
    }

    /// The handle's identity.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// The handle's kind, derived from its metadata.
    pub fn kind(&self) -> ResourceKind {
        match self.meta {
            HandleMeta::Shader(_) => ResourceKind::Shader,
            HandleMeta::Buffer => ResourceKind::Buffer,
            HandleMeta::Program(_) => ResourceKind::Program,
        }
    }

    /// The mirrored metadata.
    pub fn meta(&self) -> &HandleMeta {
        &self.meta
    }

    /// Shader metadata, if this is a shader.
    pub fn as_shader(&self) -> Option<&ShaderMeta> {
        match &self.meta {
            HandleMeta::Shader(meta) => Some(meta),
            _ => None,
        }
    }

    /// Mutable shader metadata, if this is a shader.
    pub fn as_shader_mut(&mut self) -> Option<&mut ShaderMeta> {
        match &mut self.meta {
            HandleMeta::Shader(meta) => Some(meta),
            _ => None,
        }
    }

    /// Program metadata, if this is a program.
    pub fn as_program(&self) -> Option<&ProgramMeta> {
        match &self.meta {
            HandleMeta::Program(meta) => Some(meta),
            _ => None,
        }
    }

    /// Mutable program metadata, if this is a program.
    pub fn as_program_mut(&mut self) -> Option<&mut ProgramMeta> {
        match &mut self.meta {
            HandleMeta::Program(meta) => Some(meta),
            _ => None,
        }
    }
}

macro_rules! typed_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) ResourceId);

        impl $name {
            /// Wraps an id. Kind is not checked; playback reports misuse.
            pub fn from_id(id: ResourceId) -> Self {
                Self(id)
            }

            /// The underlying logical id.
            pub fn id(&self) -> ResourceId {
                self.0
            }
        }
    };
}

typed_handle! {
    /// Application-facing view of a shader handle.
    ShaderHandle
}

typed_handle! {
    /// Application-facing view of a program handle.
    ProgramHandle
}

typed_handle! {
    /// Application-facing view of a buffer handle.
    BufferHandle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_ids_are_unique() {
        let a = ResourceHandle::buffer();
        let b = ResourceHandle::buffer();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn shader_handle_keeps_invalid_type() {
        let handle = ResourceHandle::shader(0xDEAD);
        assert_eq!(handle.kind(), ResourceKind::Shader);
        let meta = handle.as_shader().unwrap();
        assert_eq!(meta.shader_type, 0xDEAD);
        assert_eq!(meta.stage(), None);
    }

    #[test]
    fn stage_round_trips_through_gl_enum() {
        assert_eq!(ShaderStage::from_gl(gl::VERTEX_SHADER), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::Fragment.to_gl(), gl::FRAGMENT_SHADER);
    }

    #[test]
    fn kind_specific_accessors() {
        let mut program = ResourceHandle::program();
        assert!(program.as_shader().is_none());
        program
            .as_program_mut()
            .unwrap()
            .shaders
            .push(ResourceId(99));
        assert_eq!(program.as_program().unwrap().shaders, vec![ResourceId(99)]);
    }

    #[test]
    fn display_resource_id() {
        assert_eq!(format!("{}", ResourceId(12)), "#12");
    }
}
