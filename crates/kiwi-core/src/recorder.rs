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

//! The append-only record log owned by a facade.

use crate::record::{Instruction, Record};

/// What happens to the log when a flush takes its instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// The log is emptied after every flush; each flush plays only what was
    /// recorded since the previous one.
    #[default]
    Drain,
    /// The log is kept; every flush replays the whole history.
    Cumulative,
}

/// An ordered, append-only log of [`Record`]s.
///
/// Positions are assigned at append time and keep increasing across drains,
/// so an instruction's position identifies its record for the whole session.
#[derive(Debug, Default)]
pub struct Recorder {
    records: Vec<Record>,
    /// Position of `records[0]`.
    base: u64,
    policy: RetentionPolicy,
}

impl Recorder {
    /// Creates an empty recorder with the default [`RetentionPolicy::Drain`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty recorder with the given policy.
    pub fn with_policy(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The retention policy.
    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Changes the retention policy. Positions keep counting from where they
    /// are, so drained records are never renumbered.
    pub fn set_policy(&mut self, policy: RetentionPolicy) {
        self.policy = policy;
    }

    /// Appends a record and returns its position. O(1).
    pub fn increase(&mut self, record: Record) -> u64 {
        let position = self.base + self.records.len() as u64;
        log::trace!("record {position}: {}", record.op().name());
        self.records.push(record);
        position
    }

    /// The records currently held, in issuance order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flattens the whole current log into instructions, preserving order.
    pub fn to_instructions(&self) -> Vec<Instruction> {
        self.records
            .iter()
            .cloned()
            .enumerate()
            .map(|(offset, record)| Instruction::new(self.base + offset as u64, record))
            .collect()
    }

    /// Takes the instructions for a flush according to the retention policy.
    pub fn flush(&mut self) -> Vec<Instruction> {
        match self.policy {
            RetentionPolicy::Cumulative => self.to_instructions(),
            RetentionPolicy::Drain => {
                let base = self.base;
                self.base += self.records.len() as u64;
                self.records
                    .drain(..)
                    .enumerate()
                    .map(|(offset, record)| Instruction::new(base + offset as u64, record))
                    .collect()
            }
        }
    }

    /// Puts back instructions taken by [`Recorder::flush`] that could not be
    /// played, ahead of anything recorded since.
    ///
    /// A cumulative log never gave its records away, so this is a no-op there.
    pub fn requeue(&mut self, instructions: Vec<Instruction>) {
        if self.policy == RetentionPolicy::Cumulative {
            return;
        }
        let Some(first) = instructions.first().map(Instruction::position) else {
            return;
        };
        let newer = std::mem::take(&mut self.records);
        self.base = first;
        self.records = instructions
            .into_iter()
            .map(Instruction::into_record)
            .chain(newer)
            .collect();
    }
}
