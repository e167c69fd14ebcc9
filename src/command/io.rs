// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Digital and level output commands.

use serde_json::Value;

use crate::command::Command;
use crate::types::TargetId;

/// Drives a channel on (relay closed, output high).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchOn {
    target: TargetId,
}

impl SwitchOn {
    /// Creates the command.
    #[must_use]
    pub const fn new(target: TargetId) -> Self {
        Self { target }
    }
}

impl Command for SwitchOn {
    fn name(&self) -> &'static str {
        "switch-on"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![("target_id", self.target.into())]
    }
}

/// Drives a channel off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchOff {
    target: TargetId,
}

impl SwitchOff {
    /// Creates the command.
    #[must_use]
    pub const fn new(target: TargetId) -> Self {
        Self { target }
    }
}

impl Command for SwitchOff {
    fn name(&self) -> &'static str {
        "switch-off"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![("target_id", self.target.into())]
    }
}

/// Moves a level channel to `level` over `duration` (gateway ticks).
///
/// Lights use a duration of 50, cover positions 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelMoveTo {
    target: TargetId,
    level: u8,
    duration: u16,
}

impl LevelMoveTo {
    /// Creates the command.
    #[must_use]
    pub const fn new(target: TargetId, level: u8, duration: u16) -> Self {
        Self {
            target,
            level,
            duration,
        }
    }
}

impl Command for LevelMoveTo {
    fn name(&self) -> &'static str {
        "level-move-to"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("target_id", self.target.into()),
            ("level", self.level.into()),
            ("duration", self.duration.into()),
        ]
    }
}
