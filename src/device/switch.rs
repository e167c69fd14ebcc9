// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary on/off devices.

use std::sync::Arc;

use crate::capabilities::Capabilities;
use crate::command::{SwitchOff, SwitchOn};
use crate::controller::Controller;
use crate::error::{ParseError, Result};

use super::{ChannelMap, DeviceCore, IoThing, Power, value_as_bool};

/// Role of the on/off channel.
pub(crate) const ON_OFF: &str = "on-off";

/// Reads `on-off-state` into the `power` attribute.
pub(crate) fn read_power(core: &mut DeviceCore) -> Result<()> {
    let value = core.read_attr(ON_OFF, "on-off-state")?;
    let on = value_as_bool(&value).ok_or_else(|| ParseError::InvalidValue {
        field: "on-off-state".to_string(),
        message: format!("expected a boolean, got {value}"),
    })?;
    core.attributes_mut().set("power", on);
    tracing::debug!(unique_id = %core.unique_id(), power = on, "Power updated");
    Ok(())
}

/// Sends `switch-on`/`switch-off` and records the new `power` attribute.
pub(crate) fn write_power(core: &mut DeviceCore, on: bool) -> Result<()> {
    let target = core.target(ON_OFF)?;
    if on {
        core.send(&SwitchOn::new(target))?;
    } else {
        core.send(&SwitchOff::new(target))?;
    }
    core.attributes_mut().set("power", on);
    Ok(())
}

/// Refreshes `thing` and switches it on when it reports off.
pub(crate) fn switch_on_if_off<T: Power + ?Sized>(thing: &mut T) -> Result<()> {
    if let Err(e) = thing.update_attributes() {
        tracing::debug!(
            unique_id = %thing.unique_id(),
            error = %e,
            "Refresh before auto-on failed"
        );
    }
    if thing.is_on() == Some(false) {
        thing.turn_on()
    } else {
        Ok(())
    }
}

/// A relay output driven through the `on-off` channel.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cyltek_lib::controller::{Controller, ControllerSettings};
/// use cyltek_lib::device::{IoThing, Power, Switch};
///
/// let settings = ControllerSettings::default();
/// let controller = Arc::new(Controller::new("D0:14:11:B0:01:DD".parse()?, None, &settings));
/// let mut switch = Switch::new(controller, [("on-off", 3)].into());
///
/// switch.update_power()?;
/// if switch.is_on() == Some(false) {
///     switch.turn_on()?;
/// }
/// # Ok::<(), cyltek_lib::Error>(())
/// ```
#[derive(Debug)]
pub struct Switch {
    core: DeviceCore,
    auto_on: bool,
}

impl Switch {
    /// Unique id prefix of switches.
    pub const KIND: &'static str = "switch";

    /// Creates a switch.
    #[must_use]
    pub fn new(controller: Arc<Controller>, channels: ChannelMap) -> Self {
        Self {
            core: DeviceCore::new(Self::KIND, controller, channels, &[]),
            auto_on: false,
        }
    }

    /// Makes [`ensure_on`](Self::ensure_on) switch the device on.
    #[must_use]
    pub fn with_auto_on(mut self, auto_on: bool) -> Self {
        self.auto_on = auto_on;
        self
    }

    /// Returns whether auto-on is enabled.
    #[must_use]
    pub fn auto_on(&self) -> bool {
        self.auto_on
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

impl IoThing for Switch {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn update_attributes(&mut self) -> Result<()> {
        self.update_power()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::switch()
    }

    fn as_power(&mut self) -> Option<&mut dyn Power> {
        Some(self)
    }
}

impl Power for Switch {
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
