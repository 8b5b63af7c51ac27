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

//! # Kiwi Actuator
//!
//! Plays recorded instructions on whichever real context is currently bound.
//!
//! The actuator resolves the logical resource ids carried by instructions to
//! the names a real context hands out, one table per session and binding.
//! Resources defined in an earlier flush, possibly against another context,
//! are recreated from a per-session journal of their defining instructions
//! the first time they are used after a rebind.
//!
//! Failures never stop a play silently: every instruction gets an
//! [`Outcome`] in the returned [`PlayReport`].

#![warn(missing_docs)]

mod actuator;
mod error;
mod player;
mod report;
mod session;

pub use self::actuator::{lock, Actuator, SharedActuator};
pub use self::error::PlayError;
pub use self::report::{BindingId, InstructionOutcome, Outcome, PlayReport, RealResource};
