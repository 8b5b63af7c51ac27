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

//! Playback errors.

use kiwi_core::{ContextError, DecodeError, ResourceId, SessionId};

/// Why a play call, or one instruction within it, failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    /// No real context is bound. Nothing was executed.
    #[error("no real context is bound")]
    ContextUnavailable,
    /// The session was never opened or has been closed.
    #[error("session {0:?} is not open on this actuator")]
    UnknownSession(SessionId),
    /// A handle argument has no resolution and no definition in this session.
    /// Aborts the play.
    #[error("instruction {position}: {id} is not a resource of this session")]
    InvalidReference {
        /// Position of the offending record.
        position: u64,
        /// The unresolvable id.
        id: ResourceId,
    },
    /// The instruction needs a resource whose creation, compile or link failed.
    #[error("instruction {position}: depends on failed resource {dependency}")]
    DependencyFailure {
        /// Position of the instruction that was not executed.
        position: u64,
        /// The failed resource.
        dependency: ResourceId,
    },
    /// The real context rejected the call.
    #[error("instruction {position} ({op}) was rejected: {source}")]
    RealContext {
        /// Position of the rejected record.
        position: u64,
        /// The GL operation name.
        op: &'static str,
        /// The context's error.
        source: ContextError,
    },
    /// The instruction's arguments do not match its operation.
    #[error("malformed instruction: {source}")]
    Malformed {
        /// What did not match.
        #[from]
        source: DecodeError,
    },
    /// The shared actuator's lock was poisoned by a panic.
    #[error("the actuator lock is poisoned")]
    ActuatorPoisoned,
}

impl PlayError {
    /// The record position this error is attributed to, if any.
    pub fn position(&self) -> Option<u64> {
        match self {
            PlayError::InvalidReference { position, .. }
            | PlayError::DependencyFailure { position, .. }
            | PlayError::RealContext { position, .. } => Some(*position),
            PlayError::Malformed { source } => Some(source.position()),
            _ => None,
        }
    }
}
