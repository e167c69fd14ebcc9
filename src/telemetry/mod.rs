// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw ASCII telemetry spoken by Altrason humidifiers.
//!
//! The humidifier bus takes newline-terminated text queries prefixed with
//! the unit id (`"A1 HUMID\n"`) and answers with the id echoed first
//! (`"A1 45.5"`). Queries travel as `supply-raw-data` byte lists.
//!
//! # Examples
//!
//! ```
//! use cyltek_lib::telemetry::{RawQuery, RawReply};
//!
//! assert_eq!(RawQuery::Humidity.payload("a1"), b"A1 HUMID\n".to_vec());
//!
//! let reply = RawReply::from_bytes(b"A1 RH 45.5 %\r\n");
//! assert_eq!(reply.body(), "RH 45.5 %");
//! assert_eq!(reply.first_number(), Some(45.5));
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::types::TemperatureUnit;

static NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.\d+|\d+").ok());

/// A text query understood by the humidifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawQuery {
    /// Power state name.
    Power,
    /// Operation mode name.
    Mode,
    /// Blower (fan) speed name.
    Blower,
    /// Target humidity, percent.
    Target,
    /// Measured humidity, percent.
    Humidity,
    /// Measured temperature in the given unit.
    Temperature(TemperatureUnit),
    /// Remaining off-timer hours.
    OffTimer,
}

impl RawQuery {
    /// Returns the query keyword.
    #[must_use]
    pub fn keyword(&self) -> String {
        match self {
            Self::Power => "POWER".to_string(),
            Self::Mode => "MODE".to_string(),
            Self::Blower => "BLOWER".to_string(),
            Self::Target => "TARGET".to_string(),
            Self::Humidity => "HUMID".to_string(),
            Self::Temperature(unit) => format!("TEMP{}", unit.suffix()),
            Self::OffTimer => "SETOFFTIMER".to_string(),
        }
    }

    /// Returns the bytes to send for unit `id`.
    #[must_use]
    pub fn payload(&self, id: &str) -> Vec<u8> {
        format!("{} {}\n", id.to_uppercase(), self.keyword()).into_bytes()
    }
}

/// A humidifier reply with the echoed unit id removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    body: String,
}

impl RawReply {
    /// Decodes reply bytes.
    ///
    /// Each byte maps to one character, so stray non-ASCII bytes never make
    /// the decode fail.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text: String = bytes.iter().map(|&b| char::from(b)).collect();
        let mut tokens = text.trim().split(' ');
        tokens.next();
        Self {
            body: tokens.collect::<Vec<_>>().join(" "),
        }
    }

    /// Returns the reply text after the echoed id.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns every number found in the reply, in order.
    #[must_use]
    pub fn numbers(&self) -> Vec<f64> {
        let Some(re) = NUMBER.as_ref() else {
            return Vec::new();
        };
        re.find_iter(&self.body)
            .filter_map(|m| m.as_str().parse().ok())
            .collect()
    }

    /// Returns the first number in the reply.
    #[must_use]
    pub fn first_number(&self) -> Option<f64> {
        self.numbers().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads() {
        assert_eq!(RawQuery::Power.payload("b2"), b"B2 POWER\n".to_vec());
        assert_eq!(RawQuery::Mode.payload("B2"), b"B2 MODE\n".to_vec());
        assert_eq!(RawQuery::Blower.payload("B2"), b"B2 BLOWER\n".to_vec());
        assert_eq!(RawQuery::Target.payload("B2"), b"B2 TARGET\n".to_vec());
        assert_eq!(
            RawQuery::Temperature(TemperatureUnit::Fahrenheit).payload("B2"),
            b"B2 TEMPF\n".to_vec()
        );
        assert_eq!(RawQuery::OffTimer.payload("B2"), b"B2 SETOFFTIMER\n".to_vec());
    }

    #[test]
    fn echo_is_dropped_before_scanning() {
        // The id contains a digit that must not be reported.
        let reply = RawReply::from_bytes(b"A1 TARGET 55");
        assert_eq!(reply.numbers(), vec![55.0]);
    }

    #[test]
    fn multiword_names_survive() {
        let reply = RawReply::from_bytes(b"A1 HIGH SPEED\n");
        assert_eq!(reply.body(), "HIGH SPEED");
        assert!(reply.numbers().is_empty());
    }

    #[test]
    fn number_forms() {
        let reply = RawReply::from_bytes(b"A1 -3.5 +.25 7");
        assert_eq!(reply.numbers(), vec![-3.5, 0.25, 7.0]);
    }

    #[test]
    fn empty_reply() {
        let reply = RawReply::from_bytes(b"");
        assert_eq!(reply.body(), "");
        assert_eq!(reply.first_number(), None);
    }
}
