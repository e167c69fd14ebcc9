// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device models.
//!
//! A device model binds one or more channels of a gateway to a typed API.
//! Every model implements [`IoThing`] (availability, unique id, last-known
//! attributes) and composes the capability traits it supports:
//!
//! | Model | Capabilities |
//! |-------|--------------|
//! | [`Switch`] | [`Power`] |
//! | [`Light`] | [`Power`], [`Brightness`] |
//! | [`Cover`] | open/close/stop scripts, optional position |
//! | [`Climate`] | [`Power`], [`Mode`], [`FanMode`], [`SwingMode`], [`Temperature`], [`TargetTemperature`] |
//! | [`Humidifier`] | [`Power`], [`Mode`], [`FanMode`], [`Humidity`], [`TargetHumidity`], [`Temperature`] |
//!
//! Which capabilities an instance actually offers is declared once, at
//! construction, in its [`Capabilities`]. The `as_*` accessors on
//! [`IoThing`] follow that declaration, so generic callers can reach a
//! capability without knowing the concrete model:
//!
//! ```no_run
//! use cyltek_lib::device::IoThing;
//!
//! fn poll(device: &mut dyn IoThing) -> cyltek_lib::Result<()> {
//!     if device.is_available() {
//!         if let Some(fan) = device.as_fan_mode() {
//!             let modes: Vec<String> = fan.fan_modes().iter().map(ToString::to_string).collect();
//!             if let Some(first) = modes.first() {
//!                 fan.set_fan_mode(first)?;
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! All operations block on the network. Run them on a worker thread (see
//! [`offload`](crate::offload)) when calling from async code.

mod base;
mod channels;
mod climate;
mod cover;
mod humidifier;
mod light;
mod switch;

pub use base::{DeviceCore, MAX_OFFLINE_RETRY, make_unique_id};
pub use channels::ChannelMap;
pub use climate::{Climate, DEFAULT_VERIFY_DELAY, STANDARD_MODEL};
pub use cover::{Cover, CoverState};
pub use humidifier::{Humidifier, MAX_OFF_TIMER_HOURS};
pub use light::Light;
pub use switch::Switch;

use serde_json::Value;

use crate::capabilities::{Capabilities, Capability};
use crate::config::{HumidityRange, TemperatureRange};
use crate::error::{DeviceError, ProtocolError, Result};
use crate::state::LastAttributes;
use crate::types::{DeviceAddress, Percent, TemperatureUnit};

// ============================================================================
// IoThing
// ============================================================================

/// Behavior common to every device model.
pub trait IoThing: Send {
    /// Returns the shared device state.
    fn core(&self) -> &DeviceCore;

    /// Returns the shared device state for update.
    fn core_mut(&mut self) -> &mut DeviceCore;

    /// Refreshes every attribute the model reports.
    ///
    /// # Errors
    ///
    /// Any error from the underlying reads. Attributes read before the
    /// failure keep their new values; the rest keep their old ones.
    fn update_attributes(&mut self) -> Result<()>;

    /// Returns the declared capabilities.
    fn capabilities(&self) -> Capabilities;

    /// Runs one availability check.
    ///
    /// Probes the gateway, then refreshes the attributes. Either failing
    /// counts against the device; the fourth consecutive failure reports it
    /// unavailable and any success restores it.
    fn is_available(&mut self) -> bool {
        let outcome = if self.core().controller().try_connect() {
            self.update_attributes()
        } else {
            let host = self.core().controller().endpoint().to_string();
            Err(ProtocolError::ConnectionFailed(host).into())
        };
        self.core_mut().record_check(&outcome)
    }

    /// Returns the stable unique id.
    fn unique_id(&self) -> &str {
        self.core().unique_id()
    }

    /// Returns the gateway address.
    fn address(&self) -> DeviceAddress {
        self.core().controller().address()
    }

    /// Returns all last-known attributes.
    fn last_attributes(&self) -> &LastAttributes {
        self.core().attributes()
    }

    /// Returns one last-known attribute.
    fn last_attribute(&self, name: &str) -> Option<&Value> {
        self.core().attributes().get(name)
    }

    /// Returns the on/off capability, if declared.
    fn as_power(&mut self) -> Option<&mut dyn Power> {
        None
    }

    /// Returns the operation-mode capability, if declared.
    fn as_mode(&mut self) -> Option<&mut dyn Mode> {
        None
    }

    /// Returns the fan-mode capability, if declared.
    fn as_fan_mode(&mut self) -> Option<&mut dyn FanMode> {
        None
    }

    /// Returns the swing-mode capability, if declared.
    fn as_swing_mode(&mut self) -> Option<&mut dyn SwingMode> {
        None
    }

    /// Returns the target-temperature capability, if declared.
    fn as_target_temperature(&mut self) -> Option<&mut dyn TargetTemperature> {
        None
    }

    /// Returns the target-humidity capability, if declared.
    fn as_target_humidity(&mut self) -> Option<&mut dyn TargetHumidity> {
        None
    }

    /// Returns the brightness capability, if declared.
    fn as_brightness(&mut self) -> Option<&mut dyn Brightness> {
        None
    }
}

/// Fails with `UnsupportedCapability` unless `capability` is declared.
pub(crate) fn require(caps: Capabilities, capability: Capability) -> Result<()> {
    if caps.supports(capability) {
        Ok(())
    } else {
        Err(DeviceError::UnsupportedCapability {
            capability: capability.to_string(),
        }
        .into())
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// On/off control.
pub trait Power: IoThing {
    /// Switches the device on.
    ///
    /// # Errors
    ///
    /// Channel disabled, or the command failed.
    fn turn_on(&mut self) -> Result<()>;

    /// Switches the device off.
    ///
    /// # Errors
    ///
    /// Channel disabled, or the command failed.
    fn turn_off(&mut self) -> Result<()>;

    /// Reads the power state from the device.
    ///
    /// # Errors
    ///
    /// Channel disabled, or the read failed.
    fn update_power(&mut self) -> Result<()>;

    /// Returns the last-known power state.
    fn is_on(&self) -> Option<bool> {
        self.core().attributes().get_bool("power")
    }
}

/// Operation mode selection.
pub trait Mode: IoThing {
    /// Returns the mode names, in profile order.
    fn modes(&self) -> Vec<&str>;

    /// Selects a mode by name.
    ///
    /// # Errors
    ///
    /// `ValueError::UnknownMode` for a name outside the table, or the
    /// command failed.
    fn set_mode(&mut self, mode: &str) -> Result<()>;

    /// Returns the last-known mode name.
    fn mode(&self) -> Option<&str> {
        self.core().attributes().get_str("mode")
    }
}

/// Fan speed selection.
pub trait FanMode: IoThing {
    /// Returns the fan mode names, in profile order.
    fn fan_modes(&self) -> Vec<&str>;

    /// Selects a fan mode by name.
    ///
    /// # Errors
    ///
    /// `ValueError::UnknownMode` for a name outside the table, or the
    /// command failed.
    fn set_fan_mode(&mut self, mode: &str) -> Result<()>;

    /// Returns the last-known fan mode name.
    fn fan_mode(&self) -> Option<&str> {
        self.core().attributes().get_str("fan_mode")
    }
}

/// Louver direction selection.
pub trait SwingMode: IoThing {
    /// Returns the swing mode names, in profile order.
    fn swing_modes(&self) -> Vec<&str>;

    /// Selects a swing mode by name.
    ///
    /// # Errors
    ///
    /// `ValueError::UnknownMode` for a name outside the table, or the
    /// command failed.
    fn set_swing_mode(&mut self, mode: &str) -> Result<()>;

    /// Returns the last-known swing mode name.
    fn swing_mode(&self) -> Option<&str> {
        self.core().attributes().get_str("swing_mode")
    }
}

/// Current humidity reading.
pub trait Humidity: IoThing {
    /// Returns the last-known relative humidity, percent.
    fn humidity(&self) -> Option<f64> {
        self.core().attributes().get_f64("humidity")
    }
}

/// Current temperature reading.
pub trait Temperature: IoThing {
    /// Returns the unit temperatures are reported in.
    fn temperature_unit(&self) -> TemperatureUnit;

    /// Returns the last-known temperature.
    fn temperature(&self) -> Option<f64> {
        self.core()
            .attributes()
            .get_f64(&self.temperature_unit().attribute())
    }
}

/// Target temperature control.
pub trait TargetTemperature: IoThing {
    /// Returns the active range, if the profile defines one.
    fn temperature_range(&self) -> Option<TemperatureRange>;

    /// Sets the target temperature.
    ///
    /// # Errors
    ///
    /// `ValueError::NotFinite` for NaN or infinity, or the command failed.
    fn set_target_temperature(&mut self, degrees: f64) -> Result<()>;

    /// Returns the last-known target temperature.
    fn target_temperature(&self) -> Option<f64> {
        self.core().attributes().get_f64("target_temperature")
    }
}

/// Target humidity control.
pub trait TargetHumidity: IoThing {
    /// Returns the model's range, if the profile defines one.
    fn humidity_range(&self) -> Option<HumidityRange>;

    /// Sets the target humidity, percent.
    ///
    /// # Errors
    ///
    /// Channel disabled, or the command failed.
    fn set_target_humidity(&mut self, humidity: u8) -> Result<()>;

    /// Returns the last-known target humidity.
    fn target_humidity(&self) -> Option<f64> {
        self.core().attributes().get_f64("target_humidity")
    }
}

/// Brightness control.
pub trait Brightness: IoThing {
    /// Reads the brightness from the device.
    ///
    /// # Errors
    ///
    /// Channel disabled, or the read failed.
    fn update_brightness(&mut self) -> Result<()>;

    /// Sets the brightness.
    ///
    /// # Errors
    ///
    /// Channel disabled, or the command failed.
    fn set_brightness(&mut self, level: Percent) -> Result<()>;

    /// Returns the last-known brightness, percent.
    fn brightness(&self) -> Option<f64> {
        self.core().attributes().get_f64("brightness")
    }
}

// ============================================================================
// Value helpers
// ============================================================================

/// Interprets an attribute value as a boolean (`true`, `1`, `"on"`).
pub(crate) fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Some(true),
            "off" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interprets an attribute value as a number, accepting numeric strings.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interprets an attribute value as an integer code, accepting numeric
/// strings.
pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(truncate)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(v: f64) -> i64 {
    v as i64
}
