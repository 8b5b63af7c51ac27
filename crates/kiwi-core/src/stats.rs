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

//! Playback statistics.

/// Counters accumulated by an actuator across every play.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Number of plays attempted, including those that found no context.
    pub plays: u64,
    /// Number of times a real context was bound.
    pub binds: u64,
    /// Instructions that reached the real context and succeeded.
    pub instructions_executed: u64,
    /// Instructions that ended in an error of any kind.
    pub instructions_failed: u64,
    /// Resources re-created from their journal after a rebind.
    pub resources_materialized: u64,
    /// Draw calls submitted to a real context.
    pub draw_calls: u64,
}

impl PlaybackStats {
    /// Adds the counters of `other` to `self`.
    pub fn accumulate(&mut self, other: &PlaybackStats) {
        self.plays += other.plays;
        self.binds += other.binds;
        self.instructions_executed += other.instructions_executed;
        self.instructions_failed += other.instructions_failed;
        self.resources_materialized += other.resources_materialized;
        self.draw_calls += other.draw_calls;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_adds_every_counter() {
        let mut total = PlaybackStats {
            plays: 1,
            draw_calls: 2,
            ..PlaybackStats::default()
        };
        total.accumulate(&PlaybackStats {
            plays: 2,
            binds: 1,
            instructions_executed: 10,
            instructions_failed: 1,
            resources_materialized: 3,
            draw_calls: 1,
        });
        assert_eq!(total.plays, 3);
        assert_eq!(total.binds, 1);
        assert_eq!(total.instructions_executed, 10);
        assert_eq!(total.instructions_failed, 1);
        assert_eq!(total.resources_materialized, 3);
        assert_eq!(total.draw_calls, 3);
    }
}
