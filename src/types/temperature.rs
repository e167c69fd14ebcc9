// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature units used by climate and humidifier profiles.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Unit of the temperatures a device reports.
///
/// Profiles spell it `"C"` or `"F"` in any case. Anything else, including a
/// missing entry, falls back to Celsius.
///
/// # Examples
///
/// ```
/// use cyltek_lib::types::TemperatureUnit;
///
/// assert_eq!(TemperatureUnit::from_profile("f"), TemperatureUnit::Fahrenheit);
/// assert_eq!(TemperatureUnit::from_profile("kelvin"), TemperatureUnit::Celsius);
/// assert_eq!(TemperatureUnit::Fahrenheit.suffix(), "F");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    #[default]
    #[serde(rename = "C")]
    Celsius,
    /// Degrees Fahrenheit.
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Parses the profile spelling, defaulting to Celsius.
    #[must_use]
    pub fn from_profile(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("F") {
            Self::Fahrenheit
        } else {
            Self::Celsius
        }
    }

    /// Returns the single-letter suffix (`C` or `F`).
    ///
    /// The suffix is part of attribute names (`temperature_C`) and of the
    /// raw humidifier query (`TEMPC`).
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// Returns the attribute name a device stores its temperature under.
    #[must_use]
    pub fn attribute(&self) -> String {
        format!("temperature_{}", self.suffix())
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl<'de> Deserialize<'de> for TemperatureUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(Self::default, |s| Self::from_profile(&s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse() {
        assert_eq!(TemperatureUnit::from_profile("C"), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::from_profile(" F "), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::from_profile("None"), TemperatureUnit::Celsius);
    }

    #[test]
    fn attribute_name() {
        assert_eq!(TemperatureUnit::Celsius.attribute(), "temperature_C");
        assert_eq!(TemperatureUnit::Fahrenheit.attribute(), "temperature_F");
    }

    #[test]
    fn deserialize_null_and_unknown() {
        let unit: TemperatureUnit = serde_json::from_str("null").unwrap();
        assert_eq!(unit, TemperatureUnit::Celsius);
        let unit: TemperatureUnit = serde_json::from_str("\"f\"").unwrap();
        assert_eq!(unit, TemperatureUnit::Fahrenheit);
        let unit: TemperatureUnit = serde_json::from_str("\"X\"").unwrap();
        assert_eq!(unit, TemperatureUnit::Celsius);
    }
}
