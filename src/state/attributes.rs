// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known attribute snapshot.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Attribute name to last observed value.
///
/// Values are kept as JSON because devices report booleans, numbers and
/// mode names under the same map. A key that was never observed is absent;
/// a key observed as JSON `null` is stored as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LastAttributes {
    values: BTreeMap<String, Value>,
}

impl LastAttributes {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a value as a boolean.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Returns a value as a float.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Returns a value as a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Stores a value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Stores several values at once.
    pub fn extend<I, K>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
    }

    /// Returns `true` if nothing was observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_getters() {
        let mut attrs = LastAttributes::new();
        attrs.set("power", "ON");
        attrs.set("brightness", 42);
        attrs.set("humidity", 45.5);
        assert_eq!(attrs.get_str("power"), Some("ON"));
        assert_eq!(attrs.get_f64("brightness"), Some(42.0));
        assert_eq!(attrs.get_f64("humidity"), Some(45.5));
        assert_eq!(attrs.get_bool("power"), None);
        assert!(attrs.get("missing").is_none());
    }

    #[test]
    fn overwrite_and_extend() {
        let mut attrs = LastAttributes::new();
        attrs.set("mode", "cool");
        attrs.extend([("mode", json!("heat")), ("fan_mode", json!("low"))]);
        assert_eq!(attrs.get_str("mode"), Some("heat"));
        assert_eq!(attrs.iter().count(), 2);
    }

    #[test]
    fn serializes_as_map() {
        let mut attrs = LastAttributes::new();
        attrs.set("power", true);
        assert_eq!(serde_json::to_string(&attrs).unwrap(), r#"{"power":true}"#);
    }
}
