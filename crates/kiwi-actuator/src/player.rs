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

//! Executes one session's instructions on the bound context.

use ahash::AHashSet;
use kiwi_core::{
    gl, ContextError, GLenum, Instruction, Op, PlaybackStats, RealContext, RealName, ResourceId,
};
use log::{debug, error, trace, warn};

use crate::error::PlayError;
use crate::report::{BindingId, InstructionOutcome, Outcome, PlayReport, RealResource};
use crate::session::Session;

/// Why a handle could not be turned into a real name.
#[derive(Debug, Clone, Copy)]
enum Unresolved {
    Failed(ResourceId),
    Unknown(ResourceId),
}

impl Unresolved {
    fn at(self, position: u64) -> PlayError {
        match self {
            Unresolved::Failed(dependency) => PlayError::DependencyFailure {
                position,
                dependency,
            },
            Unresolved::Unknown(id) => PlayError::InvalidReference { position, id },
        }
    }
}

/// How a handle argument is used by its instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// The resource must be healthy.
    Use,
    /// The instruction (re)defines the resource, so a failed one is accepted
    /// as long as it exists in this binding.
    Define,
}

pub(crate) struct Player<'a> {
    binding: BindingId,
    context: &'a mut dyn RealContext,
    session: &'a mut Session,
    stats: &'a mut PlaybackStats,
    materializing: AHashSet<ResourceId>,
    materialized: Vec<ResourceId>,
}

impl<'a> Player<'a> {
    pub(crate) fn new(
        binding: BindingId,
        context: &'a mut dyn RealContext,
        session: &'a mut Session,
        stats: &'a mut PlaybackStats,
    ) -> Self {
        Self {
            binding,
            context,
            session,
            stats,
            materializing: AHashSet::new(),
            materialized: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, instructions: &[Instruction]) -> PlayReport {
        let mut report = PlayReport::new(self.binding);

        if self.session.needs_restore {
            self.restore_bindings();
            self.session.needs_restore = false;
        }

        for instruction in instructions {
            let status = if report.aborted_at.is_some() {
                Outcome::Skipped
            } else {
                match self.step(instruction) {
                    Ok(status) => {
                        if status == Outcome::Executed {
                            self.stats.instructions_executed += 1;
                        }
                        status
                    }
                    Err(err) => {
                        self.stats.instructions_failed += 1;
                        if let PlayError::InvalidReference { position, id } = &err {
                            error!("{id} used at {position} is not a resource of this session, aborting play");
                            report.aborted_at = Some(*position);
                        }
                        Outcome::Failed(err)
                    }
                }
            };
            report.outcomes.push(InstructionOutcome {
                position: instruction.position(),
                op: instruction.op(),
                status,
            });
        }

        report.materialized = self.materialized;
        report
    }

    fn step(&mut self, instruction: &Instruction) -> Result<Outcome, PlayError> {
        let position = instruction.position();
        trace!("play {position}: {}", instruction.op().name());

        match instruction.op() {
            Op::CreateShader => {
                let shader_type = instruction.enum_at(0)?;
                self.create(instruction, |context| context.create_shader(shader_type))
            }
            Op::CreateProgram => self.create(instruction, |context| context.create_program()),
            Op::CreateBuffer => self.create(instruction, |context| context.create_buffer()),
            Op::ShaderSource => {
                let shader = instruction.handle(0)?;
                let source = instruction.text_at(1)?;
                self.session.journal.record(shader, instruction);
                if self.session.applied.contains(&position) {
                    return Ok(Outcome::Reused);
                }
                let name = self.resolve(position, shader, Access::Define)?;
                let result = self.call(instruction, |context| context.shader_source(name, source));
                let outcome = self.taint(shader, result);
                self.mark_applied(position, outcome)
            }
            Op::CompileShader => {
                let shader = instruction.handle(0)?;
                self.session.journal.record(shader, instruction);
                if self.session.applied.contains(&position) {
                    return Ok(Outcome::Reused);
                }
                let name = self.resolve(position, shader, Access::Define)?;
                let result = self.call(instruction, |context| context.compile_shader(name));
                let outcome = self.settle(shader, result);
                self.mark_applied(position, outcome)
            }
            Op::AttachShader => {
                let program = instruction.handle(0)?;
                let shader = instruction.handle(1)?;
                self.session.journal.record(program, instruction);
                self.session.attach(program, shader);
                if self.session.applied.contains(&position) {
                    return Ok(Outcome::Reused);
                }
                let program_name = self.resolve(position, program, Access::Define)?;
                let shader_name = self.resolve(position, shader, Access::Define)?;
                let result = self.call(instruction, |context| {
                    context.attach_shader(program_name, shader_name)
                });
                let outcome = self.taint(program, result);
                self.mark_applied(position, outcome)
            }
            Op::LinkProgram => {
                let program = instruction.handle(0)?;
                self.session.journal.record(program, instruction);
                if self.session.applied.contains(&position) {
                    return Ok(Outcome::Reused);
                }
                let name = self.resolve(position, program, Access::Define)?;
                let failed_shader = self
                    .session
                    .attached(program)
                    .iter()
                    .copied()
                    .find(|shader| self.session.failed.contains(shader));
                if let Some(shader) = failed_shader {
                    self.session.failed.insert(program);
                    return Err(PlayError::DependencyFailure {
                        position,
                        dependency: shader,
                    });
                }
                let result = self.call(instruction, |context| context.link_program(name));
                let outcome = self.settle(program, result);
                self.mark_applied(position, outcome)
            }
            Op::GetAttribLocation => {
                let program = instruction.handle(0)?;
                let attribute = instruction.text_at(1)?;
                let expected = instruction.int_at(2)?;
                let name = self.resolve(position, program, Access::Use)?;
                let location = self.call(instruction, |context| {
                    context.get_attrib_location(name, attribute)
                })?;
                if i64::from(location) != expected {
                    warn!(
                        "attribute '{attribute}' of {program} is at {location} on {}, recorded as {expected}",
                        self.binding
                    );
                }
                Ok(Outcome::Executed)
            }
            Op::GetUniformLocation => {
                let program = instruction.handle(0)?;
                let uniform = instruction.text_at(1)?;
                let expected = instruction.int_at(2)?;
                let name = self.resolve(position, program, Access::Use)?;
                let location = self
                    .call(instruction, |context| context.get_uniform_location(name, uniform))?
                    .unwrap_or(-1);
                if i64::from(location) != expected {
                    warn!(
                        "uniform '{uniform}' of {program} is at {location} on {}, recorded as {expected}",
                        self.binding
                    );
                }
                Ok(Outcome::Executed)
            }
            Op::BindBuffer => {
                let target = instruction.enum_at(0)?;
                let buffer = instruction.optional_handle(1)?;
                self.session.bindings.bind_buffer(target, buffer);
                let name = match buffer {
                    Some(id) => Some(self.resolve(position, id, Access::Use)?),
                    None => None,
                };
                self.call(instruction, |context| context.bind_buffer(target, name))?;
                Ok(Outcome::Executed)
            }
            Op::BufferData => {
                let target = instruction.enum_at(0)?;
                let data = instruction.data_at(1)?;
                let usage = instruction.enum_at(2)?;
                if let Some(&buffer) = self.session.bindings.buffers.get(&target) {
                    self.session.journal.record(buffer, instruction);
                }
                self.check_bound_buffer(position, target)?;
                let bytes = data.as_bytes();
                self.call(instruction, |context| context.buffer_data(target, bytes, usage))?;
                Ok(Outcome::Executed)
            }
            Op::Viewport => {
                let x = instruction.i32_at(0)?;
                let y = instruction.i32_at(1)?;
                let width = instruction.i32_at(2)?;
                let height = instruction.i32_at(3)?;
                self.call(instruction, |context| context.viewport(x, y, width, height))?;
                Ok(Outcome::Executed)
            }
            Op::ClearColor => {
                let red = instruction.float_at(0)?;
                let green = instruction.float_at(1)?;
                let blue = instruction.float_at(2)?;
                let alpha = instruction.float_at(3)?;
                self.call(instruction, |context| {
                    context.clear_color(red, green, blue, alpha)
                })?;
                Ok(Outcome::Executed)
            }
            Op::Clear => {
                let mask = instruction.enum_at(0)?;
                self.call(instruction, |context| context.clear(mask))?;
                Ok(Outcome::Executed)
            }
            Op::UseProgram => {
                let program = instruction.optional_handle(0)?;
                self.session.bindings.program = program;
                let name = match program {
                    Some(id) => Some(self.resolve(position, id, Access::Use)?),
                    None => None,
                };
                self.call(instruction, |context| context.use_program(name))?;
                Ok(Outcome::Executed)
            }
            Op::EnableVertexAttribArray => {
                let index = instruction.u32_at(0)?;
                self.call(instruction, |context| context.enable_vertex_attrib_array(index))?;
                Ok(Outcome::Executed)
            }
            Op::VertexAttribPointer => {
                let index = instruction.u32_at(0)?;
                let size = instruction.i32_at(1)?;
                let data_type = instruction.enum_at(2)?;
                let normalized = instruction.bool_at(3)?;
                let stride = instruction.i32_at(4)?;
                let offset = instruction.int_at(5)?;
                self.check_bound_buffer(position, gl::ARRAY_BUFFER)?;
                self.call(instruction, |context| {
                    context.vertex_attrib_pointer(index, size, data_type, normalized, stride, offset)
                })?;
                Ok(Outcome::Executed)
            }
            Op::Uniform => {
                let program = instruction.handle(0)?;
                let uniform = instruction.text_at(1)?;
                let values = instruction.floats_at(2)?;
                self.check_uniform_program(instruction, program)?;
                let name = self.resolve(position, program, Access::Use)?;
                let location =
                    self.call(instruction, |context| context.get_uniform_location(name, uniform))?;
                match location {
                    Some(location) => {
                        self.call(instruction, |context| context.uniform(location, values))?;
                    }
                    None => trace!("uniform '{uniform}' is not active in {program}"),
                }
                Ok(Outcome::Executed)
            }
            Op::DrawArrays => {
                self.check_current_program(position)?;
                let mode = instruction.enum_at(0)?;
                let first = instruction.i32_at(1)?;
                let count = instruction.i32_at(2)?;
                self.call(instruction, |context| context.draw_arrays(mode, first, count))?;
                self.stats.draw_calls += 1;
                Ok(Outcome::Executed)
            }
            Op::DrawElements => {
                self.check_current_program(position)?;
                let mode = instruction.enum_at(0)?;
                let count = instruction.i32_at(1)?;
                let index_type = instruction.enum_at(2)?;
                let offset = instruction.int_at(3)?;
                self.call(instruction, |context| {
                    context.draw_elements(mode, count, index_type, offset)
                })?;
                self.stats.draw_calls += 1;
                Ok(Outcome::Executed)
            }
        }
    }

    /// Forwards one call, attributing a rejection to the instruction.
    fn call<T>(
        &mut self,
        instruction: &Instruction,
        f: impl FnOnce(&mut dyn RealContext) -> Result<T, ContextError>,
    ) -> Result<T, PlayError> {
        let binding = self.binding;
        f(&mut *self.context).map_err(|source| {
            warn!(
                "{} at {} rejected on {binding}: {source}",
                instruction.op().name(),
                instruction.position()
            );
            PlayError::RealContext {
                position: instruction.position(),
                op: instruction.op().name(),
                source,
            }
        })
    }

    fn create(
        &mut self,
        instruction: &Instruction,
        f: impl FnOnce(&mut dyn RealContext) -> Result<RealName, ContextError>,
    ) -> Result<Outcome, PlayError> {
        let id = instruction.expect_returns()?;
        self.session.journal.record(id, instruction);
        if self.session.resolutions.contains_key(&id) {
            trace!("{id} already exists on {}", self.binding);
            return Ok(Outcome::Reused);
        }
        match self.call(instruction, f) {
            Ok(name) => {
                trace!("{id} -> {name} on {}", self.binding);
                self.session.resolutions.insert(
                    id,
                    RealResource {
                        binding: self.binding,
                        name,
                    },
                );
                self.session.failed.remove(&id);
                Ok(Outcome::Executed)
            }
            Err(err) => {
                self.session.failed.insert(id);
                Err(err)
            }
        }
    }

    /// Marks `id` failed if the call was rejected.
    fn taint(&mut self, id: ResourceId, result: Result<(), PlayError>) -> Result<Outcome, PlayError> {
        if result.is_err() {
            self.session.failed.insert(id);
        }
        result.map(|()| Outcome::Executed)
    }

    /// Like [`Player::taint`], but success also clears an earlier failure.
    fn settle(&mut self, id: ResourceId, result: Result<(), PlayError>) -> Result<Outcome, PlayError> {
        if result.is_ok() {
            self.session.failed.remove(&id);
        }
        self.taint(id, result)
    }

    /// Remembers that a defining instruction took effect in this binding.
    fn mark_applied(
        &mut self,
        position: u64,
        outcome: Result<Outcome, PlayError>,
    ) -> Result<Outcome, PlayError> {
        if outcome.is_ok() {
            self.session.applied.insert(position);
        }
        outcome
    }

    fn check_current_program(&self, position: u64) -> Result<(), PlayError> {
        match self.session.bindings.program {
            Some(program) if self.session.failed.contains(&program) => {
                Err(PlayError::DependencyFailure {
                    position,
                    dependency: program,
                })
            }
            _ => Ok(()),
        }
    }

    /// The buffer logically bound to `target` must not have failed, or the
    /// call would land on whatever the real context still has bound there.
    fn check_bound_buffer(&self, position: u64, target: GLenum) -> Result<(), PlayError> {
        match self.session.bindings.buffers.get(&target) {
            Some(&buffer) if self.session.failed.contains(&buffer) => {
                Err(PlayError::DependencyFailure {
                    position,
                    dependency: buffer,
                })
            }
            _ => Ok(()),
        }
    }

    /// A uniform location only applies to its own program, which must be the
    /// one in use.
    fn check_uniform_program(
        &self,
        instruction: &Instruction,
        program: ResourceId,
    ) -> Result<(), PlayError> {
        let position = instruction.position();
        match self.session.bindings.program {
            Some(current) if current == program => Ok(()),
            Some(current) if self.session.failed.contains(&current) => {
                Err(PlayError::DependencyFailure {
                    position,
                    dependency: current,
                })
            }
            current => {
                let in_use = current.map_or_else(|| "no program".to_string(), |id| id.to_string());
                warn!(
                    "uniform location of {program} used at {position} while {in_use} is in use"
                );
                Err(PlayError::RealContext {
                    position,
                    op: instruction.op().name(),
                    source: ContextError::InvalidOperation {
                        op: instruction.op().name(),
                        reason: format!("location belongs to {program}, {in_use} is in use"),
                    },
                })
            }
        }
    }

    fn resolve(
        &mut self,
        position: u64,
        id: ResourceId,
        access: Access,
    ) -> Result<RealName, PlayError> {
        self.ensure(id, access)
            .map_err(|unresolved| unresolved.at(position))
    }

    fn ensure(&mut self, id: ResourceId, access: Access) -> Result<RealName, Unresolved> {
        if !self.session.resolutions.contains_key(&id) && !self.session.failed.contains(&id) {
            self.materialize(id)?;
        }
        let failed = self.session.failed.contains(&id);
        match self.session.resolutions.get(&id) {
            Some(resource) if !failed || access == Access::Define => Ok(resource.name),
            Some(_) => Err(Unresolved::Failed(id)),
            None if failed => Err(Unresolved::Failed(id)),
            None => Err(Unresolved::Unknown(id)),
        }
    }

    /// Recreates `id` on the bound context from its journaled definition.
    fn materialize(&mut self, id: ResourceId) -> Result<(), Unresolved> {
        let entries = self.session.journal.entries(id).to_vec();
        if entries.is_empty() || !self.materializing.insert(id) {
            return Err(Unresolved::Unknown(id));
        }
        debug!(
            "materializing {id} on {} from {} journaled instructions",
            self.binding,
            entries.len()
        );

        for entry in &entries {
            let result = match entry.op() {
                Op::BufferData => self.replay_buffer_data(id, entry),
                _ => self.step(entry).map(|_| ()),
            };
            if let Err(err) = result {
                warn!("replaying {} for {id} failed: {err}", entry.op().name());
            }
        }

        self.materializing.remove(&id);
        if self.session.resolutions.contains_key(&id) {
            self.stats.resources_materialized += 1;
            self.materialized.push(id);
        }
        Ok(())
    }

    /// Uploads journaled contents into `buffer`, then puts the target's binding
    /// back to what the session last bound there.
    fn replay_buffer_data(
        &mut self,
        buffer: ResourceId,
        entry: &Instruction,
    ) -> Result<(), PlayError> {
        let target = entry.enum_at(0)?;
        let data = entry.data_at(1)?;
        let usage = entry.enum_at(2)?;
        let Some(name) = self.session.resolutions.get(&buffer).map(|r| r.name) else {
            return Ok(());
        };

        let bytes = data.as_bytes();
        self.call(entry, |context| context.bind_buffer(target, Some(name)))?;
        let uploaded = self.call(entry, |context| context.buffer_data(target, bytes, usage));

        let current = self
            .session
            .bindings
            .buffers
            .get(&target)
            .and_then(|bound| self.session.resolutions.get(bound))
            .map(|resource| resource.name);
        if current != Some(name) {
            self.call(entry, |context| context.bind_buffer(target, current))?;
        }
        uploaded
    }

    /// Rebinds the logical buffers and program after the context changed.
    fn restore_bindings(&mut self) {
        debug!("restoring session bindings on {}", self.binding);

        for (target, buffer) in self.session.bindings.sorted_buffers() {
            match self.ensure(buffer, Access::Use) {
                Ok(name) => {
                    if let Err(err) = self.context.bind_buffer(target, Some(name)) {
                        warn!("restoring {buffer} on target 0x{target:04X} failed: {err}");
                    }
                }
                Err(_) => warn!("{buffer} cannot be restored on target 0x{target:04X}"),
            }
        }

        if let Some(program) = self.session.bindings.program {
            match self.ensure(program, Access::Use) {
                Ok(name) => {
                    if let Err(err) = self.context.use_program(Some(name)) {
                        warn!("restoring program {program} failed: {err}");
                    }
                }
                Err(_) => warn!("program {program} cannot be restored"),
            }
        }
    }
}
