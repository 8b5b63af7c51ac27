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

//! The facade's table of logical resource handles.

use ahash::AHashMap;
use kiwi_core::glsl::{self, Declarations};
use kiwi_core::{ProgramMeta, ResourceHandle, ResourceId, ShaderMeta};

/// Every handle a facade has created, by id. Handles live as long as the
/// facade.
#[derive(Debug, Default)]
pub(crate) struct HandleTable {
    handles: AHashMap<ResourceId, ResourceHandle>,
}

impl HandleTable {
    pub(crate) fn insert(&mut self, handle: ResourceHandle) -> ResourceId {
        let id = handle.id();
        self.handles.insert(id, handle);
        id
    }

    pub(crate) fn get(&self, id: ResourceId) -> Option<&ResourceHandle> {
        self.handles.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Shader metadata for `id`, if it is one of this table's shaders.
    pub(crate) fn shader_mut(&mut self, id: ResourceId) -> Option<&mut ShaderMeta> {
        self.handles.get_mut(&id).and_then(ResourceHandle::as_shader_mut)
    }

    /// Program metadata for `id`, if it is one of this table's programs.
    pub(crate) fn program(&self, id: ResourceId) -> Option<&ProgramMeta> {
        self.handles.get(&id).and_then(ResourceHandle::as_program)
    }

    pub(crate) fn program_mut(&mut self, id: ResourceId) -> Option<&mut ProgramMeta> {
        self.handles.get_mut(&id).and_then(ResourceHandle::as_program_mut)
    }

    /// Scans the sources of every shader attached to `program`.
    ///
    /// Shaders with an invalid type or no source contribute nothing.
    pub(crate) fn reflect(&self, program: ResourceId) -> Declarations {
        let mut declarations = Declarations::default();
        let Some(meta) = self.program(program) else {
            return declarations;
        };
        for shader in &meta.shaders {
            let Some(shader) = self.get(*shader).and_then(ResourceHandle::as_shader) else {
                continue;
            };
            if let (Some(stage), Some(source)) = (shader.stage(), shader.source.as_deref()) {
                declarations.merge(glsl::scan(source, stage));
            }
        }
        declarations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_core::gl;

    fn shader(table: &mut HandleTable, shader_type: u32, source: &str) -> ResourceId {
        let id = table.insert(ResourceHandle::shader(shader_type));
        if let Some(meta) = table.shader_mut(id) {
            meta.source = Some(source.to_string());
        }
        id
    }

    #[test]
    fn reflect_merges_attached_sources_in_order() {
        let mut table = HandleTable::default();
        let vs = shader(
            &mut table,
            gl::VERTEX_SHADER,
            "attribute vec2 a_pos; uniform mat4 u_mvp; void main() {}",
        );
        let fs = shader(
            &mut table,
            gl::FRAGMENT_SHADER,
            "uniform vec4 u_color; uniform mat4 u_mvp; void main() {}",
        );
        let program = table.insert(ResourceHandle::program());
        if let Some(meta) = table.program_mut(program) {
            meta.shaders = vec![vs, fs];
        }

        let declarations = table.reflect(program);
        assert_eq!(declarations.attributes, vec!["a_pos"]);
        assert_eq!(declarations.uniforms, vec!["u_mvp", "u_color"]);
    }

    #[test]
    fn shaders_with_invalid_type_are_ignored() {
        let mut table = HandleTable::default();
        let bad = shader(&mut table, 0xDEAD, "attribute vec2 a_pos; void main() {}");
        let program = table.insert(ResourceHandle::program());
        if let Some(meta) = table.program_mut(program) {
            meta.shaders.push(bad);
        }
        assert!(table.reflect(program).attributes.is_empty());
    }

    #[test]
    fn kind_mismatch_yields_no_metadata() {
        let mut table = HandleTable::default();
        let buffer = table.insert(ResourceHandle::buffer());
        assert!(table.shader_mut(buffer).is_none());
        assert!(table.program(buffer).is_none());
        assert_eq!(table.len(), 1);
    }
}
