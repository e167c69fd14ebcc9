// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile schemas for each configurable device kind.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;

use super::ModeTable;
use crate::types::TemperatureUnit;

// ============================================================================
// Climate
// ============================================================================

/// How a climate reaches its indoor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateProtocol {
    /// `daikin-cmd` actions handled by the bridge firmware.
    #[default]
    #[serde(alias = "daikin-cmd")]
    Json,
    /// Raw `modbus-cmd` register access.
    #[serde(alias = "modbus-cmd", alias = "register")]
    Modbus,
}

/// Temperature limits for one model or one mode.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TemperatureRange {
    /// Lowest target temperature.
    pub min: f64,
    /// Highest target temperature.
    pub max: f64,
    /// Step between target temperatures.
    #[serde(default = "default_precision")]
    pub precision: f64,
}

fn default_precision() -> f64 {
    1.0
}

/// Profile of an air conditioner model.
///
/// ```json
/// {
///   "manufacturer": "Daikin",
///   "type": "VRV",
///   "protocol": "json",
///   "power_status": {"ON": 1, "OFF": 0},
///   "operation_modes": {"fan": 0, "heat": 1, "cool": 2, "auto": 3, "dry": 7},
///   "fan_modes": {"auto": 0, "low": 1, "middle": 3, "high": 5},
///   "swing_modes": {"off": 0, "swing": 7},
///   "heat_master": {"slave": 0, "master": 2},
///   "temperature_range": {
///     "STANDARD": {"min": 16, "max": 32, "precision": 1},
///     "dry": {"min": 18, "max": 30, "precision": 1}
///   },
///   "temperature_unit": "C",
///   "groups": {"office": [0, 1, 2]}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClimateProfile {
    /// Manufacturer name.
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Free-form unit type.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Command path.
    #[serde(default)]
    pub protocol: ClimateProtocol,
    /// RS-485 slave address of the bridge (register path only).
    #[serde(default)]
    pub slave_address: Option<u8>,
    /// Named groups of indoor unit ids sharing an outdoor unit.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<u16>>,
    /// Power state names to codes.
    #[serde(default)]
    pub power_status: ModeTable,
    /// Heat master names to codes.
    #[serde(default)]
    pub heat_master: ModeTable,
    /// Operation mode names to codes.
    #[serde(default)]
    pub operation_modes: ModeTable,
    /// Fan volume names to codes.
    #[serde(default)]
    pub fan_modes: ModeTable,
    /// Fan direction names to codes.
    #[serde(default)]
    pub swing_modes: ModeTable,
    /// Ranges keyed by model nameplate or by mode name.
    #[serde(default)]
    pub temperature_range: HashMap<String, TemperatureRange>,
    /// Unit of reported temperatures.
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

// ============================================================================
// Humidifier
// ============================================================================

/// Whether the unit adds or removes moisture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumidifierType {
    /// Adds moisture.
    #[default]
    Humidifier,
    /// Removes moisture.
    Dehumidifier,
}

/// Target humidity limits for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HumidityRange {
    /// Lowest target, percent.
    pub min: u8,
    /// Highest target, percent.
    pub max: u8,
}

/// Profile of a humidifier model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HumidifierProfile {
    /// Manufacturer name.
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Humidifier or dehumidifier.
    #[serde(default, rename = "type")]
    pub kind: HumidifierType,
    /// Known power state names.
    #[serde(default)]
    pub power_status: ModeTable,
    /// Operation mode names to codes.
    #[serde(default)]
    pub operation_modes: ModeTable,
    /// Blower speed names to codes.
    #[serde(default)]
    pub fan_modes: ModeTable,
    /// Ranges keyed by model nameplate.
    #[serde(default)]
    pub humidity_range: HashMap<String, HumidityRange>,
    /// Unit of reported temperatures.
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

// ============================================================================
// Cover
// ============================================================================

/// Physical kind of a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum CoverType {
    Awning,
    Blind,
    Curtain,
    Damper,
    Door,
    Garage,
    Gate,
    Shade,
    Shutter,
    Window,
}

/// One step of a cover signal script.
///
/// `signal` is `High` (also spelled `Hight`), `Low` or `Sleep`. Unknown
/// signals are skipped when the script runs. `channel_key` names the channel
/// role to drive and defaults to the operation (`open`, `close`, `stop`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalStep {
    /// Signal name.
    pub signal: String,
    /// Channel role the signal drives.
    #[serde(default)]
    pub channel_key: Option<String>,
    /// Sleep length, in milliseconds despite the historical field name.
    #[serde(default, alias = "time_ms")]
    pub time_us: Option<f64>,
}

impl SignalStep {
    /// Returns how long a `Sleep` step pauses.
    ///
    /// Negative, missing or non-finite values mean no pause.
    #[must_use]
    pub fn sleep_duration(&self) -> Duration {
        self.time_us
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(Duration::ZERO, |ms| Duration::from_secs_f64(ms / 1000.0))
    }
}

/// Signal scripts per cover operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OperationSignals {
    /// Script run by `open`.
    #[serde(default)]
    pub open: Vec<SignalStep>,
    /// Script run by `close`.
    #[serde(default)]
    pub close: Vec<SignalStep>,
    /// Script run by `stop`.
    #[serde(default)]
    pub stop: Vec<SignalStep>,
}

/// Profile of a cover.
///
/// ```json
/// {
///   "type": "garage",
///   "operation_signals": {
///     "open":  [{"signal": "High"}, {"signal": "Sleep", "time_us": 500}, {"signal": "Low"}],
///     "close": [{"signal": "High"}, {"signal": "Sleep", "time_us": 500}, {"signal": "Low"}],
///     "stop":  [{"signal": "High", "channel_key": "open"}, {"signal": "High", "channel_key": "close"}]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoverProfile {
    /// Physical kind.
    #[serde(default, rename = "type")]
    pub cover_type: Option<CoverType>,
    /// Manufacturer name.
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Signal scripts.
    #[serde(default)]
    pub operation_signals: OperationSignals,
}
