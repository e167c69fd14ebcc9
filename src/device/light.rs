// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimmable lights.

use std::sync::Arc;

use crate::capabilities::Capabilities;
use crate::command::LevelMoveTo;
use crate::controller::Controller;
use crate::error::{ParseError, Result};
use crate::types::Percent;

use super::switch::{read_power, switch_on_if_off, write_power};
use super::{Brightness, ChannelMap, DeviceCore, IoThing, Power, value_as_f64};

/// Role of the level channel.
const LEVEL: &str = "level";

/// Transition time of `level-move-to`, in gateway ticks.
const BRIGHTNESS_DURATION: u16 = 50;

/// An on/off output with an optional level channel.
///
/// The level is read back from `target-level` unless the gateway's
/// manifest lists the level channel without that attribute, in which case
/// `current-level` is used. A light whose `level` role is 0 is a plain
/// on/off light and does not declare brightness.
#[derive(Debug)]
pub struct Light {
    core: DeviceCore,
    auto_on: bool,
    level_attr: &'static str,
}

impl Light {
    /// Unique id prefix of lights.
    pub const KIND: &'static str = "light";

    /// Creates a light.
    #[must_use]
    pub fn new(controller: Arc<Controller>, channels: ChannelMap) -> Self {
        let level = channels.get(LEVEL);
        let level_attr = if level.is_disabled() {
            "target-level"
        } else {
            match controller
                .manifest()
                .supports(&controller.target(level), "target-level")
            {
                Some(false) => "current-level",
                _ => "target-level",
            }
        };
        Self {
            core: DeviceCore::new(Self::KIND, controller, channels, &[]),
            auto_on: false,
            level_attr,
        }
    }

    /// Makes [`ensure_on`](Self::ensure_on) switch the light on.
    #[must_use]
    pub fn with_auto_on(mut self, auto_on: bool) -> Self {
        self.auto_on = auto_on;
        self
    }

    /// Returns the attribute brightness is read from.
    #[must_use]
    pub fn level_attribute(&self) -> &'static str {
        self.level_attr
    }

    /// With auto-on enabled, refreshes the state and switches on if off.
    ///
    /// # Errors
    ///
    /// The `switch-on` command failed.
    pub fn ensure_on(&mut self) -> Result<()> {
        if !self.auto_on {
            return Ok(());
        }
        switch_on_if_off(self)
    }
}

impl IoThing for Light {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn update_attributes(&mut self) -> Result<()> {
        self.update_power()?;
        if self.capabilities().brightness {
            self.update_brightness()?;
        }
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        if self.core.channels().is_enabled(LEVEL) {
            Capabilities::light()
        } else {
            Capabilities::switch()
        }
    }

    fn as_power(&mut self) -> Option<&mut dyn Power> {
        Some(self)
    }

    fn as_brightness(&mut self) -> Option<&mut dyn Brightness> {
        if self.capabilities().brightness {
            Some(self)
        } else {
            None
        }
    }
}

impl Power for Light {
    fn turn_on(&mut self) -> Result<()> {
        write_power(&mut self.core, true)
    }

    fn turn_off(&mut self) -> Result<()> {
        write_power(&mut self.core, false)
    }

    fn update_power(&mut self) -> Result<()> {
        read_power(&mut self.core)
    }
}

impl Brightness for Light {
    fn update_brightness(&mut self) -> Result<()> {
        let attr = self.level_attr;
        let value = self.core.read_attr(LEVEL, attr)?;
        let level = value_as_f64(&value).ok_or_else(|| ParseError::InvalidValue {
            field: attr.to_string(),
            message: format!("expected a number, got {value}"),
        })?;
        self.core.attributes_mut().set("brightness", value);
        tracing::debug!(unique_id = %self.core.unique_id(), level, "Brightness updated");
        Ok(())
    }

    fn set_brightness(&mut self, level: Percent) -> Result<()> {
        let target = self.core.target(LEVEL)?;
        self.core
            .send(&LevelMoveTo::new(target, level.value(), BRIGHTNESS_DURATION))?;
        self.core.attributes_mut().set("brightness", level.value());
        Ok(())
    }
}
