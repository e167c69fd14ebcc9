// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air conditioner indoor units behind an RS-485 bridge.
//!
//! The profile's `protocol` selects how the unit is reached:
//!
//! - [`ClimateProtocol::Json`]: `daikin-cmd` actions; state comes back as
//!   a list of single-key objects with temperatures in tenths.
//! - [`ClimateProtocol::Modbus`]: `modbus-cmd` register access; state is
//!   six input words per unit and writes patch three holding words.
//!
//! A register write first checks the unit's communication-error bit, then
//! mirrors the current state into the holding block, applies the patched
//! block and reads the unit back until it reports the new settings.
//! Switching between cool and heat consults the unit's group: if another
//! member runs the opposite mode the change goes through the group's
//! master unit, or to every member when there is none.
//!
//! Both paths decode into the same attributes: `power`, `mode`, `fan_mode`,
//! `swing_mode` and `heat_master` hold names from the profile tables;
//! `target_temperature` and `temperature_<unit>` hold degrees.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::capabilities::{Capabilities, Capability};
use crate::command::{DaikinAction, DaikinCommand, ModbusCommand};
use crate::config::{ClimateProfile, ClimateProtocol, ModeTable, TemperatureRange};
use crate::controller::Controller;
use crate::error::{DeviceError, ParseError, Result, ValueError};
use crate::protocol::Response;
use crate::protocol::modbus::{
    UnitRegisters, comm_error, opposite_mode, signed_tenths, tenths_word, words_from_bytes,
};
use crate::types::{TargetId, TemperatureUnit};

use super::{
    ChannelMap, DeviceCore, FanMode, IoThing, Mode, Power, SwingMode, TargetTemperature,
    Temperature, require, value_as_f64, value_as_i64,
};

/// Role of the bridge channel.
const DEFAULT: &str = "default";

/// Modbus slave address used when the profile does not name one.
const DEFAULT_SLAVE_ADDRESS: u8 = 1;

/// Model key used when the caller does not name one.
pub const STANDARD_MODEL: &str = "STANDARD";

/// Pause between a register write and its read-back.
pub const DEFAULT_VERIFY_DELAY: Duration = Duration::from_secs(3);

/// Register writes sent before giving up on a unit.
const VERIFY_ATTEMPTS: u8 = 3;

/// Raw unit state as reported by either protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
struct UnitState {
    power: i64,
    mode: i64,
    fan: i64,
    swing: i64,
    heat_master: i64,
    /// Tenths of a degree.
    temperature: f64,
    /// Tenths of a degree.
    setpoint: f64,
}

impl UnitState {
    /// Decodes a `daikin-cmd` `query` reply.
    fn from_query(response: &Response) -> Result<Self> {
        let merged = response
            .merged_response()
            .ok_or_else(|| ParseError::MissingField("response".to_string()))?;

        match merged.get("err_code").and_then(value_as_i64) {
            Some(0) => {}
            code => {
                return Err(DeviceError::Rejected {
                    code: code.unwrap_or(-1),
                    reason: "indoor unit reported an error".to_string(),
                    response: Box::new(response.clone()),
                }
                .into());
            }
        }

        Ok(Self {
            power: int_field(&merged, &["power"])?,
            mode: int_field(&merged, &["mode", "operation-mode"])?,
            fan: int_field(&merged, &["fan-mode", "fan-volume"])?,
            swing: int_field(&merged, &["fan-direction"])?,
            heat_master: int_field(&merged, &["heat-master"])?,
            temperature: float_field(&merged, "temperature")?,
            setpoint: float_field(&merged, "target-temperature")?,
        })
    }

    fn from_registers(regs: &UnitRegisters) -> Self {
        Self {
            power: i64::from(regs.power),
            mode: i64::from(regs.mode),
            fan: i64::from(regs.volume),
            swing: i64::from(regs.direction),
            heat_master: i64::from(regs.heat_master),
            temperature: f64::from(signed_tenths(regs.temperature)),
            setpoint: f64::from(signed_tenths(regs.setpoint)),
        }
    }
}

/// Reads the first of `names` that is present, as an integer.
fn int_field(merged: &Map<String, Value>, names: &[&str]) -> Result<i64> {
    let value = names
        .iter()
        .find_map(|n| merged.get(*n))
        .ok_or_else(|| ParseError::MissingField(names.join("|")))?;
    value_as_i64(value).ok_or_else(|| {
        ParseError::InvalidValue {
            field: names[0].to_string(),
            message: format!("expected an integer, got {value}"),
        }
        .into()
    })
}

fn float_field(merged: &Map<String, Value>, name: &str) -> Result<f64> {
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

/// Looks up the code of `name` in `table`.
fn code_of<'a>(table: &'a ModeTable, table_name: &'static str, name: &str) -> Result<&'a Value> {
    table.code(name).ok_or_else(|| {
        ValueError::UnknownMode {
            table: table_name,
            name: name.to_string(),
        }
        .into()
    })
}

/// Looks up the code of `name` as a register value.
fn register_code(table: &ModeTable, table_name: &'static str, name: &str) -> Result<u16> {
    let code = code_of(table, table_name, name)?;
    value_as_i64(code)
        .and_then(|c| u16::try_from(c).ok())
        .ok_or_else(|| {
            ParseError::InvalidValue {
                field: table_name.to_string(),
                message: format!("code of '{name}' is not a register value: {code}"),
            }
            .into()
        })
}

/// Converts degrees to a sign-magnitude register word, truncating below a
/// tenth.
#[allow(clippy::cast_possible_truncation)]
fn register_tenths(degrees: f64) -> u16 {
    let tenths = (degrees * 10.0).trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX));
    tenths_word(tenths as i32)
}

/// One indoor unit on a bridge channel.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use cyltek_lib::config::ProfileStore;
/// use cyltek_lib::controller::{Controller, ControllerSettings};
/// use cyltek_lib::device::{Climate, IoThing, Mode, TargetTemperature};
///
/// let settings = ControllerSettings::default();
/// let controller = Arc::new(Controller::new("D0:14:11:B0:11:E5".parse()?, None, &settings));
/// let profile = ProfileStore::new("/etc/cyltek").climate("daikin")?;
///
/// let mut ac = Climate::new(controller, 0, profile, [("default", 1)].into(), "STANDARD");
/// ac.update_attributes()?;
/// ac.set_mode("cool")?;
/// ac.set_target_temperature(24.5)?;
/// # Ok::<(), cyltek_lib::Error>(())
/// ```
#[derive(Debug)]
pub struct Climate {
    core: DeviceCore,
    ac_id: u16,
    profile: ClimateProfile,
    model: String,
    range: Option<TemperatureRange>,
    verify_delay: Duration,
}

impl Climate {
    /// Unique id prefix of climates.
    pub const KIND: &'static str = "climate";

    /// Creates a climate for indoor unit `ac_id`.
    ///
    /// A `slave_address` in the profile rebinds the `default` role to that
    /// channel. `model` selects the default temperature range and is
    /// upper-cased.
    #[must_use]
    pub fn new(
        controller: Arc<Controller>,
        ac_id: u16,
        profile: ClimateProfile,
        mut channels: ChannelMap,
        model: &str,
    ) -> Self {
        if let Some(slave) = profile.slave_address {
            channels.insert(DEFAULT, u16::from(slave));
        }
        let id = ac_id.to_string();
        let model = model.to_uppercase();
        let range = profile.temperature_range.get(&model).copied();
        Self {
            core: DeviceCore::new(Self::KIND, controller, channels, &[&id]),
            ac_id,
            profile,
            model,
            range,
            verify_delay: DEFAULT_VERIFY_DELAY,
        }
    }

    /// Sets the pause between a register write and its read-back.
    #[must_use]
    pub fn with_verify_delay(mut self, delay: Duration) -> Self {
        self.verify_delay = delay;
        self
    }

    /// Returns the indoor unit id.
    #[must_use]
    pub fn ac_id(&self) -> u16 {
        self.ac_id
    }

    /// Returns the model key.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the unit type from the profile.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.profile.kind.as_deref()
    }

    /// Returns the manufacturer from the profile.
    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.profile.manufacturer.as_deref()
    }

    /// Returns the command path.
    #[must_use]
    pub fn protocol(&self) -> ClimateProtocol {
        self.profile.protocol
    }

    /// Returns the last-known heat master name.
    #[must_use]
    pub fn heat_master(&self) -> Option<&str> {
        self.core.attributes().get_str("heat_master")
    }

    /// Returns the ids of the group this unit belongs to.
    #[must_use]
    pub fn group_of(&self) -> Option<&[u16]> {
        self.profile
            .groups
            .values()
            .find(|ids| ids.contains(&self.ac_id))
            .map(Vec::as_slice)
    }

    /// Writes raw bytes to the bus and returns the reassembled reply.
    ///
    /// # Errors
    ///
    /// Channel disabled, the command failed, or the reply had no data.
    pub fn supply_raw_data(&mut self, data: Vec<u8>) -> Result<Vec<u8>> {
        self.core.supply_raw_data(DEFAULT, data)
    }

    fn slave_address(&self) -> u8 {
        self.profile.slave_address.unwrap_or(DEFAULT_SLAVE_ADDRESS)
    }

    fn target(&self) -> Result<TargetId> {
        self.core.target(DEFAULT)
    }

    fn read_register_words(&mut self, command: &ModbusCommand) -> Result<Vec<u16>> {
        let response = self.core.read(command)?;
        let bytes = response
            .register_data()
            .ok_or_else(|| ParseError::MissingField("response-register-data".to_string()))?;
        Ok(words_from_bytes(&bytes))
    }

    fn read_registers(&mut self, target: TargetId, id: u16) -> Result<UnitRegisters> {
        let command = ModbusCommand::read_unit(target, self.slave_address(), id);
        let words = self.read_register_words(&command)?;
        UnitRegisters::decode(&words).ok_or_else(|| {
            ParseError::InvalidValue {
                field: "response-register-data".to_string(),
                message: format!("expected 6 words, got {}", words.len()),
            }
            .into()
        })
    }

    /// Fails with `DeviceError::Unreachable` if the bridge flags unit `id`.
    fn check_comm_status(&mut self, target: TargetId, id: u16) -> Result<()> {
        let command = ModbusCommand::read_comm_status(target, self.slave_address(), id);
        let status = self
            .read_register_words(&command)?
            .first()
            .copied()
            .ok_or_else(|| ParseError::MissingField("response-register-data".to_string()))?;
        if comm_error(status, id) {
            tracing::warn!(
                unique_id = %self.core.unique_id(),
                ac_id = id,
                "Indoor unit unreachable"
            );
            return Err(DeviceError::Unreachable(id).into());
        }
        Ok(())
    }

    /// Writes `patch` to unit `id` and waits until the unit reports it.
    ///
    /// The current registers are mirrored into the holding block before
    /// the patched block is applied. Each write is read back after the
    /// verify delay and resent while the unit still shows other settings.
    fn write_registers(
        &mut self,
        target: TargetId,
        id: u16,
        patch: impl FnOnce(&mut UnitRegisters),
    ) -> Result<()> {
        let slave = self.slave_address();
        self.check_comm_status(target, id)?;
        let current = self.read_registers(target, id)?;
        self.core.send(&ModbusCommand::write_unit(target, slave, id, current.sync_bytes()))?;

        let mut wanted = current;
        patch(&mut wanted);
        let write = ModbusCommand::write_unit(target, slave, id, wanted.holding_bytes());
        for attempt in 1..=VERIFY_ATTEMPTS {
            self.core.send(&write)?;
            if !self.verify_delay.is_zero() {
                std::thread::sleep(self.verify_delay);
            }
            let now = self.read_registers(target, id)?;
            if now.settings_match(&wanted) {
                return Ok(());
            }
            tracing::warn!(
                unique_id = %self.core.unique_id(),
                ac_id = id,
                attempt,
                wanted = ?wanted,
                reported = ?now,
                "Indoor unit did not apply settings"
            );
        }
        Err(DeviceError::NotApplied {
            id,
            attempts: VERIFY_ATTEMPTS,
        }
        .into())
    }

    /// Patches this unit's registers.
    fn write_own_registers(&mut self, patch: impl FnOnce(&mut UnitRegisters)) -> Result<()> {
        let target = self.target()?;
        self.write_registers(target, self.ac_id, patch)
    }

    /// Sets mode `code` on the register path.
    ///
    /// Cool and heat exclude each other within a system. When a group
    /// member runs the opposite mode, the change is written to the group's
    /// master unit, or to every member if none is master.
    fn write_mode(&mut self, code: u16) -> Result<()> {
        let target = self.target()?;
        let Some(opposite) = opposite_mode(code) else {
            return self.write_registers(target, self.ac_id, |r| r.mode = code);
        };

        let group = self
            .group_of()
            .map_or_else(|| vec![self.ac_id], <[u16]>::to_vec);
        let mut conflict = false;
        let mut master = None;
        for &id in &group {
            let regs = self.read_registers(target, id)?;
            conflict |= regs.mode == opposite;
            if regs.is_master() {
                master = Some(id);
            }
        }

        if !conflict {
            return self.write_registers(target, self.ac_id, |r| r.mode = code);
        }
        if let Some(id) = master {
            tracing::info!(
                unique_id = %self.core.unique_id(),
                master = id,
                "Changing cool/heat through master"
            );
            return self.write_registers(target, id, |r| r.mode = code);
        }
        tracing::info!(
            unique_id = %self.core.unique_id(),
            group = ?group,
            "Changing cool/heat on whole group"
        );
        for id in group {
            self.write_registers(target, id, |r| r.mode = code)?;
        }
        Ok(())
    }

    fn daikin(&self, action: DaikinAction) -> Result<DaikinCommand> {
        Ok(DaikinCommand::new(self.target()?, action, self.ac_id))
    }

    fn apply(&mut self, state: UnitState) {
        let p = &self.profile;
        let attrs = self.core.attributes_mut();
        attrs.set("power", p.power_status.name_of_int(state.power));
        attrs.set("mode", p.operation_modes.name_of_int(state.mode));
        attrs.set("fan_mode", p.fan_modes.name_of_int(state.fan));
        attrs.set("swing_mode", p.swing_modes.name_of_int(state.swing));
        attrs.set("heat_master", p.heat_master.name_of_int(state.heat_master));
        attrs.set(p.temperature_unit.attribute(), state.temperature / 10.0);
        attrs.set("target_temperature", state.setpoint / 10.0);
        self.select_range();
    }

    /// Picks the range of the current mode, or the model's range.
    fn select_range(&mut self) {
        let ranges = &self.profile.temperature_range;
        self.range = self
            .core
            .attributes()
            .get_str("mode")
            .and_then(|mode| ranges.get(mode))
            .or_else(|| ranges.get(&self.model))
            .copied();
    }

    fn set_power(&mut self, on: bool) -> Result<()> {
        let name = if on { "ON" } else { "OFF" };
        match self.profile.protocol {
            ClimateProtocol::Json => {
                let action = if on { DaikinAction::On } else { DaikinAction::Off };
                let command = self.daikin(action)?;
                self.core.send(&command)?;
            }
            ClimateProtocol::Modbus => {
                let code = register_code(&self.profile.power_status, "power_status", name)
                    .unwrap_or(u16::from(on));
                self.write_own_registers(|r| r.power = code)?;
            }
        }
        self.core.attributes_mut().set("power", name);
        Ok(())
    }
}

impl IoThing for Climate {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn update_attributes(&mut self) -> Result<()> {
        let target = self.target()?;
        let state = match self.profile.protocol {
            ClimateProtocol::Json => {
                let response = self.core.read(&DaikinCommand::query(target, self.ac_id))?;
                UnitState::from_query(&response)?
            }
            ClimateProtocol::Modbus => {
                UnitState::from_registers(&self.read_registers(target, self.ac_id)?)
            }
        };
        self.apply(state);
        tracing::debug!(
            unique_id = %self.core.unique_id(),
            attributes = ?self.core.attributes(),
            "Climate updated"
        );
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::builder()
            .with_power()
            .with_temperature()
            .with_target_temperature()
            .with_if(Capability::Mode, !self.profile.operation_modes.is_empty())
            .with_if(Capability::FanMode, !self.profile.fan_modes.is_empty())
            .with_if(Capability::SwingMode, !self.profile.swing_modes.is_empty())
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

    fn as_swing_mode(&mut self) -> Option<&mut dyn SwingMode> {
        if self.capabilities().swing_mode { Some(self) } else { None }
    }

    fn as_target_temperature(&mut self) -> Option<&mut dyn TargetTemperature> {
        Some(self)
    }
}

impl Power for Climate {
    fn turn_on(&mut self) -> Result<()> {
        self.set_power(true)
    }

    fn turn_off(&mut self) -> Result<()> {
        self.set_power(false)
    }

    /// Power is part of the unit state; this refreshes all of it.
    fn update_power(&mut self) -> Result<()> {
        self.update_attributes()
    }

    fn is_on(&self) -> Option<bool> {
        self.core
            .attributes()
            .get_str("power")
            .map(|p| p.eq_ignore_ascii_case("ON"))
    }
}

impl Mode for Climate {
    fn modes(&self) -> Vec<&str> {
        self.profile.operation_modes.names()
    }

    fn set_mode(&mut self, mode: &str) -> Result<()> {
        require(self.capabilities(), Capability::Mode)?;
        match self.profile.protocol {
            ClimateProtocol::Json => {
                let code = code_of(&self.profile.operation_modes, "operation_modes", mode)?.clone();
                let command = self.daikin(DaikinAction::SetMode)?.with_value(code);
                self.core.send(&command)?;
            }
            ClimateProtocol::Modbus => {
                let code = register_code(&self.profile.operation_modes, "operation_modes", mode)?;
                self.write_mode(code)?;
            }
        }
        self.core.attributes_mut().set("mode", mode);
        self.select_range();
        Ok(())
    }
}

impl FanMode for Climate {
    fn fan_modes(&self) -> Vec<&str> {
        self.profile.fan_modes.names()
    }

    fn set_fan_mode(&mut self, mode: &str) -> Result<()> {
        require(self.capabilities(), Capability::FanMode)?;
        match self.profile.protocol {
            ClimateProtocol::Json => {
                let code = code_of(&self.profile.fan_modes, "fan_modes", mode)?.clone();
                let command = self.daikin(DaikinAction::SetFanVolume)?.with_value(code);
                self.core.send(&command)?;
            }
            ClimateProtocol::Modbus => {
                let code = register_code(&self.profile.fan_modes, "fan_modes", mode)?;
                self.write_own_registers(|r| r.volume = code)?;
            }
        }
        self.core.attributes_mut().set("fan_mode", mode);
        Ok(())
    }
}

impl SwingMode for Climate {
    fn swing_modes(&self) -> Vec<&str> {
        self.profile.swing_modes.names()
    }

    fn set_swing_mode(&mut self, mode: &str) -> Result<()> {
        require(self.capabilities(), Capability::SwingMode)?;
        match self.profile.protocol {
            ClimateProtocol::Json => {
                let code = code_of(&self.profile.swing_modes, "swing_modes", mode)?.clone();
                let command = self.daikin(DaikinAction::SetFanDirection)?.with_value(code);
                self.core.send(&command)?;
            }
            ClimateProtocol::Modbus => {
                let code = register_code(&self.profile.swing_modes, "swing_modes", mode)?;
                self.write_own_registers(|r| r.direction = code)?;
            }
        }
        self.core.attributes_mut().set("swing_mode", mode);
        Ok(())
    }
}

impl Temperature for Climate {
    fn temperature_unit(&self) -> TemperatureUnit {
        self.profile.temperature_unit
    }
}

impl TargetTemperature for Climate {
    fn temperature_range(&self) -> Option<TemperatureRange> {
        self.range
    }

    fn set_target_temperature(&mut self, degrees: f64) -> Result<()> {
        if !degrees.is_finite() {
            return Err(ValueError::NotFinite(degrees).into());
        }
        match self.profile.protocol {
            ClimateProtocol::Json => {
                let command = DaikinCommand::set_temperature(self.target()?, self.ac_id, degrees);
                self.core.send(&command)?;
            }
            ClimateProtocol::Modbus => {
                let word = register_tenths(degrees);
                self.write_own_registers(|r| r.setpoint = word)?;
            }
        }
        self.core.attributes_mut().set("target_temperature", degrees);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_reply(body: &str) -> Response {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn query_decodes_literal_field_names() {
        let reply = query_reply(
            r#"{"code":0,"response":[{"power":1},{"fan-direction":0},{"fan-mode":1},
                {"temperature":267},{"mode":2},{"heat-master":2},
                {"target-temperature":230},{"err_code":0}]}"#,
        );
        let state = UnitState::from_query(&reply).unwrap();
        assert_eq!(state.power, 1);
        assert_eq!(state.mode, 2);
        assert_eq!(state.fan, 1);
        assert!((state.temperature - 267.0).abs() < f64::EPSILON);
        assert!((state.setpoint - 230.0).abs() < f64::EPSILON);
    }

    #[test]
    fn query_falls_back_to_firmware_names() {
        let reply = query_reply(
            r#"{"code":0,"response":[{"power":0},{"fan-direction":7},{"fan-volume":5},
                {"temperature":"255"},{"operation-mode":3},{"heat-master":0},
                {"target-temperature":240},{"err_code":0}]}"#,
        );
        let state = UnitState::from_query(&reply).unwrap();
        assert_eq!(state.mode, 3);
        assert_eq!(state.fan, 5);
        assert_eq!(state.swing, 7);
        assert!((state.temperature - 255.0).abs() < f64::EPSILON);
    }

    #[test]
    fn query_unit_error() {
        let reply = query_reply(r#"{"code":0,"response":[{"power":1},{"err_code":4}]}"#);
        let err = UnitState::from_query(&reply).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Device(DeviceError::Rejected { code: 4, .. })
        ));
    }

    #[test]
    fn query_missing_field() {
        let reply = query_reply(r#"{"code":0,"response":[{"power":1},{"err_code":0}]}"#);
        assert!(matches!(
            UnitState::from_query(&reply),
            Err(crate::Error::Parse(ParseError::MissingField(_)))
        ));
    }

    #[test]
    fn register_state() {
        let words = [0x3101, 0x8302, 230, 0, 267, 0];
        let regs = UnitRegisters::decode(&words).unwrap();
        let state = UnitState::from_registers(&regs);
        assert_eq!(state.power, 1);
        assert_eq!(state.swing, 1);
        assert_eq!(state.fan, 3);
        assert_eq!(state.mode, 2);
        assert_eq!(state.heat_master, 2);
        assert!((state.setpoint - 230.0).abs() < f64::EPSILON);
    }

    #[test]
    fn register_temperatures_are_signed() {
        let regs = UnitRegisters::decode(&[0x3101, 0x8302, 0x8037, 0, 0x8005, 0]).unwrap();
        let state = UnitState::from_registers(&regs);
        assert!((state.setpoint + 55.0).abs() < f64::EPSILON);
        assert!((state.temperature + 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn register_tenths_keep_the_sign() {
        assert_eq!(register_tenths(23.5), 235);
        assert_eq!(register_tenths(23.58), 235);
        assert_eq!(register_tenths(-5.0), 0x8032);
        assert_eq!(register_tenths(-5.55), 0x8037);
        assert_eq!(register_tenths(1.0e9), 0x7FFF);
    }
}
