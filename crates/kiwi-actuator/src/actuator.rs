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

//! The playback engine shared by every facade.

use std::sync::{Arc, Mutex, MutexGuard};

use ahash::AHashMap;
use kiwi_core::{Capabilities, Instruction, PlaybackStats, RealContext, ResourceId, SessionId};
use log::{debug, warn};

use crate::error::PlayError;
use crate::player::Player;
use crate::report::{BindingId, PlayReport, RealResource};
use crate::session::Session;

/// An actuator shared between facades.
pub type SharedActuator = Arc<Mutex<Actuator>>;

/// Locks a shared actuator, mapping poisoning to [`PlayError::ActuatorPoisoned`].
pub fn lock(actuator: &SharedActuator) -> Result<MutexGuard<'_, Actuator>, PlayError> {
    actuator.lock().map_err(|_| PlayError::ActuatorPoisoned)
}

#[derive(Debug)]
struct Binding {
    id: BindingId,
    context: Box<dyn RealContext>,
}

/// Owns the bound real context and plays instructions on it.
///
/// Each facade opens a session. Sessions keep separate resolution tables, so
/// a handle recorded by one facade never resolves in another. Rebinding keeps
/// every session's definitions and drops its resolutions; resources are
/// recreated on the new context the next time they are used.
#[derive(Debug, Default)]
pub struct Actuator {
    bound: Option<Binding>,
    capabilities: Option<Capabilities>,
    sessions: AHashMap<SessionId, Session>,
    stats: PlaybackStats,
    next_binding: u64,
}

impl Actuator {
    /// Creates an actuator with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an actuator ready to be shared between facades.
    pub fn shared() -> SharedActuator {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Opens a new session.
    pub fn open_session(&mut self) -> SessionId {
        let session = SessionId::next();
        self.sessions.insert(session, Session::default());
        debug!("opened session {session:?}");
        session
    }

    /// Closes a session and forgets its state. Real resources are not deleted.
    pub fn close_session(&mut self, session: SessionId) -> bool {
        let closed = self.sessions.remove(&session).is_some();
        if closed {
            debug!("closed session {session:?}");
        }
        closed
    }

    /// Whether `session` is open.
    pub fn has_session(&self, session: SessionId) -> bool {
        self.sessions.contains_key(&session)
    }

    /// Binds a real context, returning the previously bound one.
    ///
    /// The context's capabilities are read once here. Every session's
    /// resolutions and failures are dropped.
    pub fn bind(&mut self, mut context: Box<dyn RealContext>) -> Option<Box<dyn RealContext>> {
        self.next_binding += 1;
        let id = BindingId(self.next_binding);

        let capabilities = context.capabilities().unwrap_or_else(|err| {
            warn!("{id} did not report its capabilities: {err}");
            Capabilities::new()
        });
        self.capabilities = Some(capabilities);

        for session in self.sessions.values_mut() {
            session.invalidate();
        }
        self.stats.binds += 1;
        debug!("bound {id}");

        self.bound
            .replace(Binding { id, context })
            .map(|previous| previous.context)
    }

    /// Detaches the bound context, if any.
    pub fn unbind(&mut self) -> Option<Box<dyn RealContext>> {
        let previous = self.bound.take()?;
        self.capabilities = None;
        for session in self.sessions.values_mut() {
            session.invalidate();
        }
        debug!("unbound {}", previous.id);
        Some(previous.context)
    }

    /// The current binding.
    pub fn binding(&self) -> Option<BindingId> {
        self.bound.as_ref().map(|binding| binding.id)
    }

    /// Capabilities of the bound context.
    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.capabilities.as_ref()
    }

    /// Counters accumulated since creation.
    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    /// The real resource `id` resolves to for `session` in the current binding.
    pub fn resolution(&self, session: SessionId, id: ResourceId) -> Option<RealResource> {
        self.sessions
            .get(&session)
            .and_then(|state| state.resolutions.get(&id))
            .copied()
    }

    /// Plays `instructions` for `session` on the bound context, in order.
    ///
    /// Only the absence of a context (or of the session) fails the call as a
    /// whole; per-instruction failures are collected in the report.
    pub fn play(
        &mut self,
        session: SessionId,
        instructions: &[Instruction],
    ) -> Result<PlayReport, PlayError> {
        self.stats.plays += 1;

        let Some(binding) = self.bound.as_mut() else {
            debug!("play of {} instructions with no context bound", instructions.len());
            return Err(PlayError::ContextUnavailable);
        };
        let state = self
            .sessions
            .get_mut(&session)
            .ok_or(PlayError::UnknownSession(session))?;

        let player = Player::new(binding.id, binding.context.as_mut(), state, &mut self.stats);
        Ok(player.run(instructions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_core::{gl, Op, Record, Recorder, Value};

    #[test]
    fn play_without_context_is_unavailable() {
        let mut actuator = Actuator::new();
        let session = actuator.open_session();
        let mut recorder = Recorder::new();
        recorder.increase(Record::new(Op::Clear).literal(Value::Enum(gl::COLOR_BUFFER_BIT)));

        let result = actuator.play(session, &recorder.flush());
        assert_eq!(result, Err(PlayError::ContextUnavailable));
        assert_eq!(actuator.stats().plays, 1);
        assert_eq!(actuator.binding(), None);
        assert!(actuator.capabilities().is_none());
    }

    #[test]
    fn sessions_open_and_close() {
        let mut actuator = Actuator::new();
        let session = actuator.open_session();
        assert!(actuator.has_session(session));
        assert!(actuator.close_session(session));
        assert!(!actuator.close_session(session));
    }

    #[test]
    fn shared_actuator_locks() {
        let actuator = Actuator::shared();
        let guard = lock(&actuator);
        assert!(guard.is_ok());
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let actuator = Actuator::shared();
        let clone = Arc::clone(&actuator);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock();
            panic!("poison the actuator");
        })
        .join();
        assert!(matches!(lock(&actuator), Err(PlayError::ActuatorPoisoned)));
    }
}
