// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Covers driven by signal scripts.
//!
//! A cover has no motor controller of its own: `open`, `close` and `stop`
//! each replay a short script of relay pulses from the cover's profile.
//! Each step drives the channel bound to its `channel_key` role (by default
//! the operation's own role):
//!
//! - `High` (also spelled `Hight`): `switch-on`
//! - `Low`: `switch-off`
//! - `Sleep`: pause for `time_us` milliseconds
//!
//! Unknown signals are skipped. Every step runs even after a failure; the
//! operation succeeds only if all steps did.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capabilities::{Capabilities, Capability};
use crate::command::{LevelMoveTo, SwitchOff, SwitchOn};
use crate::config::{CoverProfile, CoverType, SignalStep};
use crate::controller::Controller;
use crate::error::{Error, ParseError, Result};
use crate::types::Percent;

use super::{ChannelMap, DeviceCore, IoThing, value_as_f64};

const LEVEL: &str = "level";

/// Transition time of `level-move-to`, in gateway ticks.
const POSITION_DURATION: u16 = 10;

/// Motion state of a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverState {
    /// Fully open.
    Opened,
    /// Fully closed.
    Closed,
    /// An open script ran last.
    Opening,
    /// A close script ran last.
    Closing,
}

impl CoverState {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for CoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Open,
    Close,
    Stop,
}

impl Operation {
    const fn role(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Stop => "stop",
        }
    }
}

/// A cover with `open`, `close` and `stop` channels and an optional
/// `level` channel for position.
#[derive(Debug)]
pub struct Cover {
    core: DeviceCore,
    profile: CoverProfile,
    motion: Option<CoverState>,
}

impl Cover {
    /// Unique id prefix of covers.
    pub const KIND: &'static str = "cover";

    /// Creates a cover.
    #[must_use]
    pub fn new(controller: Arc<Controller>, profile: CoverProfile, channels: ChannelMap) -> Self {
        let mut core = DeviceCore::new(Self::KIND, controller, channels, &[]);
        core.attributes_mut().set("state", serde_json::Value::Null);
        Self {
            core,
            profile,
            motion: None,
        }
    }

    /// Returns the physical kind from the profile.
    #[must_use]
    pub fn cover_type(&self) -> Option<CoverType> {
        self.profile.cover_type
    }

    /// Returns the manufacturer from the profile.
    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.profile.manufacturer.as_deref()
    }

    /// Runs the open script.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelDisabled`] if the `open` role is 0, otherwise the
    /// first step that failed.
    pub fn open(&mut self) -> Result<()> {
        self.operate(Operation::Open)
    }

    /// Runs the close script.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelDisabled`] if the `close` role is 0, otherwise the
    /// first step that failed.
    pub fn close(&mut self) -> Result<()> {
        self.operate(Operation::Close)
    }

    /// Runs the stop script.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelDisabled`] if the `stop` role is 0, otherwise the
    /// first step that failed.
    pub fn stop(&mut self) -> Result<()> {
        self.operate(Operation::Stop)
    }

    /// Returns the last-known position, percent open.
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        self.core.attributes().get_f64("position")
    }

    /// Returns the motion state.
    ///
    /// The state of the last script wins; after `stop`, or before any
    /// script ran, the state follows the last-known position.
    #[must_use]
    pub fn state(&self) -> Option<CoverState> {
        self.motion.or_else(|| {
            self.position().map(|p| {
                if p <= 0.0 {
                    CoverState::Closed
                } else {
                    CoverState::Opened
                }
            })
        })
    }

    /// Reads `current-level` into the `position` attribute.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelDisabled`] without a `level` channel, or the read
    /// failed.
    pub fn update_position(&mut self) -> Result<()> {
        let value = self.core.read_attr(LEVEL, "current-level")?;
        if value_as_f64(&value).is_none() {
            return Err(ParseError::InvalidValue {
                field: "current-level".to_string(),
                message: format!("expected a number, got {value}"),
            }
            .into());
        }
        self.core.attributes_mut().set("position", value);
        Ok(())
    }

    /// Moves to `position`.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelDisabled`] without a `level` channel, or the command
    /// failed.
    pub fn set_position(&mut self, position: Percent) -> Result<()> {
        let target = self.core.target(LEVEL)?;
        self.core
            .send(&LevelMoveTo::new(target, position.value(), POSITION_DURATION))?;
        self.core.attributes_mut().set("position", position.value());
        Ok(())
    }

    fn operate(&mut self, op: Operation) -> Result<()> {
        let role = op.role();
        if !self.core.channels().is_enabled(role) {
            return Err(Error::ChannelDisabled {
                role: role.to_string(),
            });
        }

        let steps = match op {
            Operation::Open => &self.profile.operation_signals.open,
            Operation::Close => &self.profile.operation_signals.close,
            Operation::Stop => &self.profile.operation_signals.stop,
        };

        let mut first_error = None;
        for step in steps {
            if let Err(e) = run_step(&self.core, role, step) {
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        self.motion = match op {
            Operation::Open => Some(CoverState::Opening),
            Operation::Close => Some(CoverState::Closing),
            Operation::Stop => None,
        };
        let state = self.motion.map(|s| s.as_str());
        self.core.attributes_mut().set("state", state);
        tracing::debug!(unique_id = %self.core.unique_id(), operation = role, "Cover script done");
        Ok(())
    }
}

fn run_step(core: &DeviceCore, operation: &str, step: &SignalStep) -> Result<()> {
    let role = step.channel_key.as_deref().unwrap_or(operation);
    match step.signal.as_str() {
        "High" | "Hight" => {
            core.send(&SwitchOn::new(core.target(role)?))?;
        }
        "Low" => {
            core.send(&SwitchOff::new(core.target(role)?))?;
        }
        "Sleep" => std::thread::sleep(step.sleep_duration()),
        other => {
            tracing::debug!(signal = other, "Skipping unknown signal");
        }
    }
    Ok(())
}

impl IoThing for Cover {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    /// Reads the position when a `level` channel is bound; otherwise there
    /// is nothing to read and the update succeeds.
    fn update_attributes(&mut self) -> Result<()> {
        if self.capabilities().position {
            self.update_position()
        } else {
            Ok(())
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::builder()
            .with_if(Capability::Position, self.core.channels().is_enabled(LEVEL))
            .build()
    }
}
