// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered name to code tables.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A name to device code table, e.g. `{"cool": 2, "heat": 1}`.
///
/// Entries keep the order they are declared in, which is the order
/// [`names`](Self::names) reports them in. Codes are usually integers but
/// some humidifier profiles use strings, so they stay JSON values.
///
/// # Examples
///
/// ```
/// use cyltek_lib::config::ModeTable;
///
/// let table: ModeTable = serde_json::from_str(r#"{"cool": 2, "heat": 1, "fan": 0}"#).unwrap();
/// assert_eq!(table.names(), vec!["cool", "heat", "fan"]);
/// assert_eq!(table.code("heat"), Some(&serde_json::json!(1)));
/// assert_eq!(table.name_of_int(0), Some("fan"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeTable {
    entries: Vec<(String, Value)>,
}

impl ModeTable {
    /// Creates a table from entries.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Returns the names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Returns `true` if `name` is in the table.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Returns the code for `name`.
    #[must_use]
    pub fn code(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Returns the name whose code equals `code`.
    #[must_use]
    pub fn name_of(&self, code: &Value) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v == code)
            .map(|(k, _)| k.as_str())
    }

    /// Returns the name whose integer code equals `code`.
    #[must_use]
    pub fn name_of_int(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v.as_i64() == Some(code))
            .map(|(k, _)| k.as_str())
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ModeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ModeTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping names to codes")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<ModeTable, E> {
                Ok(ModeTable::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ModeTable, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, code)) = map.next_entry::<String, Value>()? {
                    entries.push((name, code));
                }
                Ok(ModeTable { entries })
            }
        }

        deserializer.deserialize_any(TableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_declaration_order() {
        let table: ModeTable =
            serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        assert_eq!(table.names(), vec!["z", "a", "m"]);
    }

    #[test]
    fn null_is_empty() {
        let table: ModeTable = serde_json::from_str("null").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn inverse_lookup() {
        let table = ModeTable::from_entries([("ON", json!(1)), ("OFF", json!(0))]);
        assert_eq!(table.name_of_int(1), Some("ON"));
        assert_eq!(table.name_of(&json!(0)), Some("OFF"));
        assert_eq!(table.name_of_int(7), None);
        assert!(table.contains("OFF"));
        assert!(!table.contains("off"));
    }

    #[test]
    fn string_codes() {
        let table: ModeTable =
            serde_json::from_str(r#"{"AUTO": "auto", "OFF": "off"}"#).unwrap();
        assert_eq!(table.code("AUTO"), Some(&json!("auto")));
        assert_eq!(table.name_of_int(0), None);
    }
}
