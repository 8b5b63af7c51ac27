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

//! Per-session playback state.

use ahash::{AHashMap, AHashSet};
use kiwi_core::{GLenum, Instruction, Op, ResourceId};

use crate::report::RealResource;

/// The defining instructions of every resource a session has played.
///
/// Resolutions are lost when the context is rebound; the journal is not, and
/// replaying it recreates a resource on whatever context is bound next.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: AHashMap<ResourceId, Vec<Instruction>>,
}

impl Journal {
    /// Records `instruction` as part of the definition of `id`.
    ///
    /// Instructions already journaled at the same position are ignored, so a
    /// cumulative replay does not duplicate entries. A new `bufferData`
    /// replaces the previous contents entirely.
    pub(crate) fn record(&mut self, id: ResourceId, instruction: &Instruction) {
        let entries = self.entries.entry(id).or_default();
        if entries
            .iter()
            .any(|entry| entry.position() == instruction.position())
        {
            return;
        }
        if instruction.op() == Op::BufferData {
            entries.retain(|entry| entry.op() != Op::BufferData);
        }
        entries.push(instruction.clone());
    }

    pub(crate) fn entries(&self, id: ResourceId) -> &[Instruction] {
        self.entries.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Which logical resources the session last bound.
#[derive(Debug, Default)]
pub(crate) struct LogicalBindings {
    pub(crate) buffers: AHashMap<GLenum, ResourceId>,
    pub(crate) program: Option<ResourceId>,
}

impl LogicalBindings {
    pub(crate) fn bind_buffer(&mut self, target: GLenum, buffer: Option<ResourceId>) {
        match buffer {
            Some(id) => {
                self.buffers.insert(target, id);
            }
            None => {
                self.buffers.remove(&target);
            }
        }
    }

    /// Buffer bindings ordered by target.
    pub(crate) fn sorted_buffers(&self) -> Vec<(GLenum, ResourceId)> {
        let mut buffers: Vec<_> = self.buffers.iter().map(|(t, id)| (*t, *id)).collect();
        buffers.sort_unstable();
        buffers
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buffers.is_empty() && self.program.is_none()
    }
}

/// Actuator-side state of one facade.
#[derive(Debug, Default)]
pub(crate) struct Session {
    /// Resolutions for the current binding.
    pub(crate) resolutions: AHashMap<ResourceId, RealResource>,
    /// Resources whose creation, compile or link failed in the current binding.
    pub(crate) failed: AHashSet<ResourceId>,
    /// Positions of defining instructions that took effect in the current binding.
    pub(crate) applied: AHashSet<u64>,
    pub(crate) journal: Journal,
    /// Program id to attached shader ids.
    pub(crate) attachments: AHashMap<ResourceId, Vec<ResourceId>>,
    pub(crate) bindings: LogicalBindings,
    /// Set on rebind; the next play restores `bindings` first.
    pub(crate) needs_restore: bool,
}

impl Session {
    /// Forgets everything tied to the previous binding.
    pub(crate) fn invalidate(&mut self) {
        self.resolutions.clear();
        self.failed.clear();
        self.applied.clear();
        self.needs_restore = !self.bindings.is_empty();
    }

    pub(crate) fn attach(&mut self, program: ResourceId, shader: ResourceId) {
        let shaders = self.attachments.entry(program).or_default();
        if !shaders.contains(&shader) {
            shaders.push(shader);
        }
    }

    pub(crate) fn attached(&self, program: ResourceId) -> &[ResourceId] {
        self.attachments
            .get(&program)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
