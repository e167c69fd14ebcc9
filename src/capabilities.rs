// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declared device capabilities.
//!
//! Every device model computes its [`Capabilities`] once, when it is built,
//! from its kind, its channel mapping and its behavior profile. Callers
//! check the set before offering a feature instead of probing for methods:
//! a climate whose profile has no `swing_modes` table reports
//! `swing_mode == false` and rejects swing commands.

use std::fmt;

/// One capability a device model can compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// On/off control.
    Power,
    /// Operation mode selection.
    Mode,
    /// Fan speed selection.
    FanMode,
    /// Louver direction selection.
    SwingMode,
    /// Current humidity reading.
    Humidity,
    /// Current temperature reading.
    Temperature,
    /// Target temperature control.
    TargetTemperature,
    /// Target humidity control.
    TargetHumidity,
    /// Brightness control.
    Brightness,
    /// Cover position readback and control.
    Position,
}

impl Capability {
    /// Returns the capability name used in diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Mode => "mode",
            Self::FanMode => "fan_mode",
            Self::SwingMode => "swing_mode",
            Self::Humidity => "humidity",
            Self::Temperature => "temperature",
            Self::TargetTemperature => "target_temperature",
            Self::TargetHumidity => "target_humidity",
            Self::Brightness => "brightness",
            Self::Position => "position",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities of one device model.
///
/// # Examples
///
/// ```
/// use cyltek_lib::{Capabilities, Capability};
///
/// let light = Capabilities::light();
/// assert!(light.supports(Capability::Power));
/// assert!(light.supports(Capability::Brightness));
/// assert!(!light.supports(Capability::FanMode));
///
/// let custom = Capabilities::builder()
///     .with_power()
///     .with_mode()
///     .build();
/// assert_eq!(custom.iter().count(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
// Each boolean is an independent feature flag.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Supports on/off control.
    pub power: bool,
    /// Supports operation modes.
    pub mode: bool,
    /// Supports fan speeds.
    pub fan_mode: bool,
    /// Supports louver directions.
    pub swing_mode: bool,
    /// Reports humidity.
    pub humidity: bool,
    /// Reports temperature.
    pub temperature: bool,
    /// Accepts a target temperature.
    pub target_temperature: bool,
    /// Accepts a target humidity.
    pub target_humidity: bool,
    /// Supports brightness.
    pub brightness: bool,
    /// Supports position.
    pub position: bool,
}

impl Capabilities {
    /// Creates an empty capability set.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            power: false,
            mode: false,
            fan_mode: false,
            swing_mode: false,
            humidity: false,
            temperature: false,
            target_temperature: false,
            target_humidity: false,
            brightness: false,
            position: false,
        }
    }

    /// Capabilities of a switch.
    #[must_use]
    pub const fn switch() -> Self {
        let mut caps = Self::none();
        caps.power = true;
        caps
    }

    /// Capabilities of a dimmable light.
    #[must_use]
    pub const fn light() -> Self {
        let mut caps = Self::switch();
        caps.brightness = true;
        caps
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Returns whether `capability` is declared.
    #[must_use]
    pub const fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Power => self.power,
            Capability::Mode => self.mode,
            Capability::FanMode => self.fan_mode,
            Capability::SwingMode => self.swing_mode,
            Capability::Humidity => self.humidity,
            Capability::Temperature => self.temperature,
            Capability::TargetTemperature => self.target_temperature,
            Capability::TargetHumidity => self.target_humidity,
            Capability::Brightness => self.brightness,
            Capability::Position => self.position,
        }
    }

    /// Iterates the declared capabilities.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        ALL.iter().copied().filter(|c| self.supports(*c))
    }
}

const ALL: [Capability; 10] = [
    Capability::Power,
    Capability::Mode,
    Capability::FanMode,
    Capability::SwingMode,
    Capability::Humidity,
    Capability::Temperature,
    Capability::TargetTemperature,
    Capability::TargetHumidity,
    Capability::Brightness,
    Capability::Position,
];

/// Builder for a custom capability set.
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl CapabilitiesBuilder {
    /// Creates a builder with nothing declared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares on/off control.
    #[must_use]
    pub fn with_power(mut self) -> Self {
        self.inner.power = true;
        self
    }

    /// Declares operation modes.
    #[must_use]
    pub fn with_mode(mut self) -> Self {
        self.inner.mode = true;
        self
    }

    /// Declares fan speeds.
    #[must_use]
    pub fn with_fan_mode(mut self) -> Self {
        self.inner.fan_mode = true;
        self
    }

    /// Declares louver directions.
    #[must_use]
    pub fn with_swing_mode(mut self) -> Self {
        self.inner.swing_mode = true;
        self
    }

    /// Declares a humidity reading.
    #[must_use]
    pub fn with_humidity(mut self) -> Self {
        self.inner.humidity = true;
        self
    }

    /// Declares a temperature reading.
    #[must_use]
    pub fn with_temperature(mut self) -> Self {
        self.inner.temperature = true;
        self
    }

    /// Declares a target temperature.
    #[must_use]
    pub fn with_target_temperature(mut self) -> Self {
        self.inner.target_temperature = true;
        self
    }

    /// Declares a target humidity.
    #[must_use]
    pub fn with_target_humidity(mut self) -> Self {
        self.inner.target_humidity = true;
        self
    }

    /// Declares brightness.
    #[must_use]
    pub fn with_brightness(mut self) -> Self {
        self.inner.brightness = true;
        self
    }

    /// Declares position.
    #[must_use]
    pub fn with_position(mut self) -> Self {
        self.inner.position = true;
        self
    }

    /// Declares `capability` when `enabled` is true.
    #[must_use]
    pub fn with_if(mut self, capability: Capability, enabled: bool) -> Self {
        if enabled {
            let flag = match capability {
                Capability::Power => &mut self.inner.power,
                Capability::Mode => &mut self.inner.mode,
                Capability::FanMode => &mut self.inner.fan_mode,
                Capability::SwingMode => &mut self.inner.swing_mode,
                Capability::Humidity => &mut self.inner.humidity,
                Capability::Temperature => &mut self.inner.temperature,
                Capability::TargetTemperature => &mut self.inner.target_temperature,
                Capability::TargetHumidity => &mut self.inner.target_humidity,
                Capability::Brightness => &mut self.inner.brightness,
                Capability::Position => &mut self.inner.position,
            };
            *flag = true;
        }
        self
    }

    /// Builds the capability set.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}
