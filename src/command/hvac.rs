// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air conditioner commands.
//!
//! Two paths reach an indoor unit: the bridge firmware's `daikin-cmd`
//! actions, or raw `modbus-cmd` register access on the RS-485 bus.

use serde_json::{Value, json};

use crate::command::Command;
use crate::protocol::modbus::{self, HOLDING_WORDS, INPUT_WORDS, READ_FUNCTION, WRITE_FUNCTION};
use crate::types::TargetId;

/// Action of a [`DaikinCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaikinAction {
    /// Power on.
    On,
    /// Power off.
    Off,
    /// Set the operation mode.
    SetMode,
    /// Set the fan volume.
    SetFanVolume,
    /// Set the fan direction (swing). The bridge firmware takes this
    /// under an empty action name.
    SetFanDirection,
    /// Set the target temperature, tenths of a degree.
    SetTemperature,
    /// Query the full unit state.
    Query,
}

impl DaikinAction {
    /// Returns the wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::SetMode => "set-mode",
            Self::SetFanVolume => "set-fan-volume",
            Self::SetFanDirection => "",
            Self::SetTemperature => "set-temperature",
            Self::Query => "query",
        }
    }
}

/// A `daikin-cmd` request for indoor unit `id`.
///
/// # Examples
///
/// ```
/// use cyltek_lib::command::{Command, DaikinCommand};
/// use cyltek_lib::types::{Channel, DeviceAddress, TargetId};
///
/// let mac: DeviceAddress = "D0:14:11:B0:11:E5".parse().unwrap();
/// let cmd = DaikinCommand::set_temperature(TargetId::new(mac, Channel::new(1)), 0, 23.5);
/// let value = cmd.params().into_iter().find(|(k, _)| *k == "value").unwrap().1;
/// assert_eq!(value, 235);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DaikinCommand {
    target: TargetId,
    action: DaikinAction,
    id: u16,
    value: Option<Value>,
}

impl DaikinCommand {
    /// Creates a command without a value.
    #[must_use]
    pub const fn new(target: TargetId, action: DaikinAction, id: u16) -> Self {
        Self {
            target,
            action,
            id,
            value: None,
        }
    }

    /// Attaches a value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Queries the unit.
    #[must_use]
    pub const fn query(target: TargetId, id: u16) -> Self {
        Self::new(target, DaikinAction::Query, id)
    }

    /// Sets the target temperature in degrees; transmitted ×10.
    #[must_use]
    pub fn set_temperature(target: TargetId, id: u16, degrees: f64) -> Self {
        Self::new(target, DaikinAction::SetTemperature, id).with_value(tenths(degrees))
    }

    /// Returns the action.
    #[must_use]
    pub const fn action(&self) -> DaikinAction {
        self.action
    }
}

/// Scales degrees to the integer tenths the firmware expects, dropping
/// any finer fraction toward zero.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn tenths(degrees: f64) -> i64 {
    (degrees * 10.0).trunc() as i64
}

impl Command for DaikinCommand {
    fn name(&self) -> &'static str {
        "daikin-cmd"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        let mut params = vec![
            ("target_id", self.target.into()),
            ("action", Value::from(self.action.as_str())),
            ("id", self.id.into()),
        ];
        if let Some(value) = &self.value {
            params.push(("value", value.clone()));
        }
        params
    }
}

/// A `modbus-cmd` register access in RTU mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModbusCommand {
    target: TargetId,
    function: u8,
    slave_addr: u8,
    start_addr: u16,
    number: u16,
    write_data: Vec<u8>,
}

impl ModbusCommand {
    /// Creates an arbitrary register access.
    #[must_use]
    pub fn new(
        target: TargetId,
        function: u8,
        slave_addr: u8,
        start_addr: u16,
        number: u16,
        write_data: Vec<u8>,
    ) -> Self {
        Self {
            target,
            function,
            slave_addr,
            start_addr,
            number,
            write_data,
        }
    }

    /// Reads the six input words of indoor unit `id`.
    #[must_use]
    pub fn read_unit(target: TargetId, slave_addr: u8, id: u16) -> Self {
        Self::new(
            target,
            READ_FUNCTION,
            slave_addr,
            modbus::input_start(id),
            INPUT_WORDS,
            Vec::new(),
        )
    }

    /// Reads the communication-error word covering indoor unit `id`.
    #[must_use]
    pub fn read_comm_status(target: TargetId, slave_addr: u8, id: u16) -> Self {
        Self::new(
            target,
            READ_FUNCTION,
            slave_addr,
            modbus::comm_status_register(id),
            1,
            Vec::new(),
        )
    }

    /// Writes the three holding words of indoor unit `id`.
    #[must_use]
    pub fn write_unit(target: TargetId, slave_addr: u8, id: u16, holding: [u8; 6]) -> Self {
        Self::new(
            target,
            WRITE_FUNCTION,
            slave_addr,
            modbus::holding_start(id),
            HOLDING_WORDS,
            holding.to_vec(),
        )
    }
}

impl Command for ModbusCommand {
    fn name(&self) -> &'static str {
        "modbus-cmd"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("target_id", self.target.into()),
            ("mode", Value::from("rtu")),
            ("function", self.function.into()),
            ("slave_addr", self.slave_addr.into()),
            ("start_addr", self.start_addr.into()),
            ("number", self.number.into()),
            ("write_data", json!(self.write_data)),
        ]
    }
}
