// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Altrason humidifiers on a serial bridge channel.
//!
//! State is read with one `altrason-cmd query-all`; when that fails the
//! attributes are read one by one through the raw ASCII telemetry queries
//! of [`crate::telemetry`]. Writes always use `altrason-cmd` actions.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::capabilities::{Capabilities, Capability};
use crate::command::{AltrasonAction, AltrasonCommand};
use crate::config::{HumidifierProfile, HumidifierType, HumidityRange, ModeTable};
use crate::controller::Controller;
use crate::error::{ParseError, Result, ValueError};
use crate::telemetry::{RawQuery, RawReply};
use crate::types::{TargetId, TemperatureUnit};

use super::{
    ChannelMap, DeviceCore, FanMode, Humidity, IoThing, Mode, Power, TargetHumidity, Temperature,
    require, value_as_f64,
};

/// Role of the bridge channel.
const DEFAULT: &str = "default";

/// Longest off timer, in hours.
pub const MAX_OFF_TIMER_HOURS: u8 = 24;

const MODE_AUTO: &str = "AUTO";
const MODE_OFF: &str = "OFF";

/// One humidifier on a bridge channel.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cyltek_lib::config::ProfileStore;
/// use cyltek_lib::controller::{Controller, ControllerSettings};
/// use cyltek_lib::device::{Humidifier, IoThing, TargetHumidity};
///
/// let settings = ControllerSettings::default();
/// let controller = Arc::new(Controller::new("D0:14:11:B0:12:11".parse()?, None, &settings));
/// let profile = ProfileStore::new("/etc/cyltek").humidifier("altrason")?;
///
/// let channels = [("default", 1)].into();
/// let mut humidifier = Humidifier::new(controller, "A1", profile, channels, "STANDARD");
/// humidifier.update_attributes()?;
/// humidifier.set_target_humidity(55)?;
/// # Ok::<(), cyltek_lib::Error>(())
/// ```
#[derive(Debug)]
pub struct Humidifier {
    core: DeviceCore,
    id: String,
    profile: HumidifierProfile,
    model: String,
    auto_on: bool,
}

impl Humidifier {
    /// Unique id prefix of humidifiers.
    pub const KIND: &'static str = "humidifier";

    /// Creates a humidifier with bus id `id`.
    ///
    /// `model` selects the humidity range and is upper-cased.
    #[must_use]
    pub fn new(
        controller: Arc<Controller>,
        id: impl Into<String>,
        profile: HumidifierProfile,
        channels: ChannelMap,
        model: &str,
    ) -> Self {
        let id = id.into();
        Self {
            core: DeviceCore::new(Self::KIND, controller, channels, &[&id]),
            id,
            profile,
            model: model.to_uppercase(),
            auto_on: false,
        }
    }

    /// Makes [`ensure_on`](Self::ensure_on) switch the unit to `AUTO`.
    #[must_use]
    pub fn with_auto_on(mut self, auto_on: bool) -> Self {
        self.auto_on = auto_on;
        self
    }

    /// Returns the bus id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the model key.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns whether the unit adds or removes moisture.
    #[must_use]
    pub fn kind(&self) -> HumidifierType {
        self.profile.kind
    }

    /// Returns the manufacturer from the profile.
    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.profile.manufacturer.as_deref()
    }

    /// Returns the last-known off timer, in hours.
    #[must_use]
    pub fn off_timer(&self) -> Option<f64> {
        self.core.attributes().get_f64("off_timer")
    }

    /// With auto-on enabled, refreshes the state and selects `AUTO` when
    /// the unit reports `OFF`.
    ///
    /// # Errors
    ///
    /// The `set-mode` command failed.
    pub fn ensure_on(&mut self) -> Result<()> {
        if !self.auto_on {
            return Ok(());
        }
        if let Err(e) = self.update_attributes() {
            tracing::debug!(
                unique_id = %self.core.unique_id(),
                error = %e,
                "Refresh before auto-on failed"
            );
        }
        if self.mode() == Some(MODE_OFF) {
            self.set_mode(MODE_AUTO)
        } else {
            Ok(())
        }
    }

    /// Sets the off timer.
    ///
    /// # Errors
    ///
    /// [`ValueError::OutOfRange`] above 24 hours, or the command failed.
    pub fn set_off_timer(&mut self, hours: u8) -> Result<()> {
        if hours > MAX_OFF_TIMER_HOURS {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(MAX_OFF_TIMER_HOURS),
                actual: u16::from(hours),
            }
            .into());
        }
        let command = self.altrason(AltrasonAction::SetOffTimer)?.with_value(hours);
        self.core.send(&command)?;
        self.core.attributes_mut().set("off_timer", hours);
        Ok(())
    }

    /// Writes raw bytes to the bus and returns the reassembled reply.
    ///
    /// # Errors
    ///
    /// Channel disabled, the command failed, or the reply had no data.
    pub fn supply_raw_data(&mut self, data: Vec<u8>) -> Result<Vec<u8>> {
        self.core.supply_raw_data(DEFAULT, data)
    }

    /// Sends one telemetry query and decodes the reply.
    fn raw_query(&mut self, query: RawQuery) -> Result<RawReply> {
        let bytes = self.supply_raw_data(query.payload(&self.id))?;
        Ok(RawReply::from_bytes(&bytes))
    }

    /// Reads a named attribute that must match an entry of `table`.
    fn read_named(&mut self, query: RawQuery, attr: &str) -> Result<()> {
        let reply = self.raw_query(query)?;
        let table = match query {
            RawQuery::Power => &self.profile.power_status,
            RawQuery::Mode => &self.profile.operation_modes,
            _ => &self.profile.fan_modes,
        };
        if !table.contains(reply.body()) {
            return Err(ParseError::InvalidValue {
                field: query.keyword(),
                message: format!("unknown name '{}'", reply.body()),
            }
            .into());
        }
        self.core.attributes_mut().set(attr, reply.body());
        Ok(())
    }

    /// Reads a numeric attribute from the first number of the reply.
    ///
    /// A reply without a number leaves the attribute unchanged.
    fn read_number(&mut self, query: RawQuery, attr: &str, integer: bool) -> Result<()> {
        let reply = self.raw_query(query)?;
        if let Some(n) = reply.first_number() {
            let value = if integer { n.trunc() } else { n };
            self.core.attributes_mut().set(attr, value);
        }
        Ok(())
    }

    /// Reads every attribute through the telemetry queries.
    fn update_raw(&mut self) -> Result<()> {
        let unit = self.profile.temperature_unit;
        self.read_named(RawQuery::Power, "power")?;
        self.read_named(RawQuery::Mode, "mode")?;
        self.read_named(RawQuery::Blower, "fan_mode")?;
        self.read_number(RawQuery::Target, "target_humidity", true)?;
        self.read_number(RawQuery::Humidity, "humidity", false)?;
        self.read_number(RawQuery::Temperature(unit), &unit.attribute(), false)?;
        self.read_number(RawQuery::OffTimer, "off_timer", true)
    }

    fn update_query_all(&mut self) -> Result<()> {
        let command = AltrasonCommand::query_all(self.target()?, self.id.as_str());
        let response = self.core.read(&command)?;
        let merged = response
            .merged_response()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ParseError::MissingField("response".to_string()))?;
        let unit = self.profile.temperature_unit;
        let state = QueryAll::decode(&merged, unit)?;
        state.apply(&mut self.core, unit);
        Ok(())
    }

    fn target(&self) -> Result<TargetId> {
        self.core.target(DEFAULT)
    }

    fn altrason(&self, action: AltrasonAction) -> Result<AltrasonCommand> {
        Ok(AltrasonCommand::new(self.target()?, action, self.id.as_str()))
    }

    fn set_named(
        &mut self,
        action: AltrasonAction,
        attr: &str,
        name: &str,
        code: Value,
    ) -> Result<()> {
        let command = self.altrason(action)?.with_value(code);
        self.core.send(&command)?;
        self.core.attributes_mut().set(attr, name);
        Ok(())
    }
}

/// Decoded `query-all` reply.
///
/// The firmware reports most numbers as strings (`"44.41"`).
#[derive(Debug, Clone, PartialEq)]
struct QueryAll {
    power: Option<String>,
    mode: Option<String>,
    fan_mode: Option<String>,
    temperature: f64,
    target_humidity: f64,
    humidity: f64,
    off_timer: f64,
}

impl QueryAll {
    fn decode(merged: &Map<String, Value>, unit: TemperatureUnit) -> Result<Self> {
        let temperature_key = format!("temperature-{}", unit.suffix().to_ascii_lowercase());
        Ok(Self {
            power: text(merged, "power"),
            mode: text(merged, "mode"),
            fan_mode: text(merged, "fan-mode"),
            temperature: number(merged, &temperature_key)?,
            target_humidity: number(merged, "target-humidity")?,
            humidity: number(merged, "humidity")?,
            off_timer: number(merged, "OFF-Timer")?,
        })
    }

    fn apply(self, core: &mut DeviceCore, unit: TemperatureUnit) {
        let attrs = core.attributes_mut();
        attrs.set("power", self.power);
        attrs.set("mode", self.mode);
        attrs.set("fan_mode", self.fan_mode);
        attrs.set(unit.attribute(), self.temperature);
        attrs.set("target_humidity", self.target_humidity);
        attrs.set("humidity", self.humidity);
        attrs.set("off_timer", self.off_timer);
    }
}

fn lookup(table: &ModeTable, table_name: &'static str, name: &str) -> Result<Value> {
    table.code(name).cloned().ok_or_else(|| {
        ValueError::UnknownMode {
            table: table_name,
            name: name.to_string(),
        }
        .into()
    })
}

fn text(merged: &Map<String, Value>, name: &str) -> Option<String> {
    merged.get(name).and_then(Value::as_str).map(str::to_string)
}

fn number(merged: &Map<String, Value>, name: &str) -> Result<f64> {
    let value = merged
        .get(name)
        .ok_or_else(|| ParseError::MissingField(name.to_string()))?;
    value_as_f64(value).ok_or_else(|| {
        ParseError::InvalidValue {
            field: name.to_string(),
            message: format!("expected a number, got {value}"),
        }
        .into()
    })
}

impl IoThing for Humidifier {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn update_attributes(&mut self) -> Result<()> {
        if let Err(e) = self.update_query_all() {
            tracing::debug!(
                unique_id = %self.core.unique_id(),
                error = %e,
                "query-all failed, reading telemetry"
            );
            self.update_raw()?;
        }
        tracing::debug!(
            unique_id = %self.core.unique_id(),
            attributes = ?self.core.attributes(),
            "Humidifier updated"
        );
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::builder()
            .with_power()
            .with_humidity()
            .with_temperature()
            .with_target_humidity()
            .with_if(Capability::Mode, !self.profile.operation_modes.is_empty())
            .with_if(Capability::FanMode, !self.profile.fan_modes.is_empty())
            .build()
    }

    fn as_power(&mut self) -> Option<&mut dyn Power> {
        Some(self)
    }

    fn as_mode(&mut self) -> Option<&mut dyn Mode> {
        if self.capabilities().mode { Some(self) } else { None }
    }

    fn as_fan_mode(&mut self) -> Option<&mut dyn FanMode> {
        if self.capabilities().fan_mode { Some(self) } else { None }
    }

    fn as_target_humidity(&mut self) -> Option<&mut dyn TargetHumidity> {
        Some(self)
    }
}

impl Power for Humidifier {
    fn turn_on(&mut self) -> Result<()> {
        self.set_mode(MODE_AUTO)
    }

    fn turn_off(&mut self) -> Result<()> {
        self.set_mode(MODE_OFF)
    }

    fn update_power(&mut self) -> Result<()> {
        self.read_named(RawQuery::Power, "power")
    }

    /// The unit reports power by name; anything but `OFF` counts as on.
    fn is_on(&self) -> Option<bool> {
        self.core
            .attributes()
            .get_str("power")
            .map(|p| !p.eq_ignore_ascii_case(MODE_OFF))
    }
}

impl Mode for Humidifier {
    fn modes(&self) -> Vec<&str> {
        self.profile.operation_modes.names()
    }

    fn set_mode(&mut self, mode: &str) -> Result<()> {
        require(self.capabilities(), Capability::Mode)?;
        let code = lookup(&self.profile.operation_modes, "operation_modes", mode)?;
        self.set_named(AltrasonAction::SetMode, "mode", mode, code)
    }
}

impl FanMode for Humidifier {
    fn fan_modes(&self) -> Vec<&str> {
        self.profile.fan_modes.names()
    }

    fn set_fan_mode(&mut self, mode: &str) -> Result<()> {
        require(self.capabilities(), Capability::FanMode)?;
        let code = lookup(&self.profile.fan_modes, "fan_modes", mode)?;
        self.set_named(AltrasonAction::SetBlowerSpeed, "fan_mode", mode, code)
    }
}

impl Humidity for Humidifier {}

impl Temperature for Humidifier {
    fn temperature_unit(&self) -> TemperatureUnit {
        self.profile.temperature_unit
    }
}

impl TargetHumidity for Humidifier {
    fn humidity_range(&self) -> Option<HumidityRange> {
        self.profile.humidity_range.get(&self.model).copied()
    }

    fn set_target_humidity(&mut self, humidity: u8) -> Result<()> {
        let command = self
            .altrason(AltrasonAction::SetTargetHumidity)?
            .with_value(humidity);
        self.core.send(&command)?;
        self.core.attributes_mut().set("target_humidity", humidity);
        Ok(())
    }
}
