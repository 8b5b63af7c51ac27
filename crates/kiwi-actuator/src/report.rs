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

//! Structured results of a play call.

use std::fmt;

use kiwi_core::{Op, RealName, ResourceId};

use crate::error::PlayError;

/// Identifies one attachment of a real context to an actuator.
///
/// Every bind gets a fresh id, so real resources of two bindings never compare
/// equal even when the contexts hand out the same raw names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding {}", self.0)
    }
}

/// A logical resource as it exists in one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RealResource {
    /// The binding the resource was created under.
    pub binding: BindingId,
    /// The name the real context gave it.
    pub name: RealName,
}

/// What happened to one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Executed on the real context.
    Executed,
    /// A creation whose id already resolves in this binding. No new real
    /// resource was made.
    Reused,
    /// Not executed, or rejected by the real context.
    Failed(PlayError),
    /// Not attempted because the play was aborted earlier.
    Skipped,
}

/// The outcome of one instruction, keyed by its record position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionOutcome {
    /// Position of the record.
    pub position: u64,
    /// The operation.
    pub op: Op,
    /// What happened.
    pub status: Outcome,
}

/// Everything a play call did, in instruction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    /// The binding the instructions were played on.
    pub binding: BindingId,
    /// One entry per instruction handed to the play call.
    pub outcomes: Vec<InstructionOutcome>,
    /// Position of the invalid reference that stopped the play, if any.
    pub aborted_at: Option<u64>,
    /// Resources re-created from their definitions before being used.
    pub materialized: Vec<ResourceId>,
}

impl PlayReport {
    pub(crate) fn new(binding: BindingId) -> Self {
        Self {
            binding,
            outcomes: Vec::new(),
            aborted_at: None,
            materialized: Vec::new(),
        }
    }

    /// `true` when every instruction executed or was reused.
    pub fn is_ok(&self) -> bool {
        self.aborted_at.is_none()
            && self
                .outcomes
                .iter()
                .all(|outcome| matches!(outcome.status, Outcome::Executed | Outcome::Reused))
    }

    /// The errors of failed instructions, in order.
    pub fn failures(&self) -> impl Iterator<Item = &PlayError> + '_ {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            Outcome::Failed(error) => Some(error),
            _ => None,
        })
    }

    /// The outcome of the instruction recorded at `position`.
    pub fn outcome_at(&self, position: u64) -> Option<&InstructionOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.position == position)
    }

    /// Number of instructions that reached the real context.
    pub fn executed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == Outcome::Executed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(position: u64, status: Outcome) -> InstructionOutcome {
        InstructionOutcome {
            position,
            op: Op::Clear,
            status,
        }
    }

    #[test]
    fn report_with_only_successes_is_ok() {
        let mut report = PlayReport::new(BindingId(1));
        report.outcomes.push(outcome(0, Outcome::Executed));
        report.outcomes.push(outcome(1, Outcome::Reused));
        assert!(report.is_ok());
        assert_eq!(report.executed(), 1);
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn failures_are_listed_in_order() {
        let mut report = PlayReport::new(BindingId(1));
        report.outcomes.push(outcome(
            4,
            Outcome::Failed(PlayError::DependencyFailure {
                position: 4,
                dependency: ResourceId(9),
            }),
        ));
        report.outcomes.push(outcome(5, Outcome::Executed));
        assert!(!report.is_ok());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.outcome_at(5).map(|o| &o.status), Some(&Outcome::Executed));
        assert!(report.outcome_at(6).is_none());
    }

    #[test]
    fn aborted_report_is_not_ok() {
        let mut report = PlayReport::new(BindingId(2));
        report.outcomes.push(outcome(0, Outcome::Skipped));
        report.aborted_at = Some(0);
        assert!(!report.is_ok());
    }
}
