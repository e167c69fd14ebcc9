// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded gateway replies.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{OFFLINE_CODE, OFFLINE_REASON};

/// A decoded reply frame.
///
/// The correlation fields (`target-id`, `cmd`, `attr`, `action`) and the
/// status fields (`code`, `reason`) are typed; everything else the gateway
/// sends is kept in [`fields`](Self::fields).
///
/// # Examples
///
/// ```
/// use cyltek_lib::protocol::Response;
///
/// let resp: Response = serde_json::from_str(
///     r#"{"code":0,"cmd":"read-attr","attr":"on-off-state","value":true}"#,
/// ).unwrap();
/// assert!(resp.is_success());
/// assert_eq!(resp.value(), Some(&serde_json::json!(true)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Status code; 0 means success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    /// Human readable reason accompanying a non-zero code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Echoed command name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,

    /// Echoed target id.
    #[serde(
        rename = "target-id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_id: Option<String>,

    /// Echoed attribute name for `read-attr`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,

    /// Echoed action for vendor commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Every other member of the reply object.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Response {
    /// Returns `true` if `code` is 0.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Returns `true` for the gateway's "device offline" error.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.code == Some(OFFLINE_CODE) && self.reason.as_deref() == Some(OFFLINE_REASON)
    }

    /// Returns a payload member by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the `value` member of a `read-attr` reply.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.field("value").filter(|v| !v.is_null())
    }

    /// Merges the `response` list of single-key objects into one map.
    ///
    /// Vendor queries answer with `"response":[{"power":1},{"mode":2}]`.
    /// Later entries win on duplicate keys. Returns `None` when the member is
    /// missing or not a list.
    #[must_use]
    pub fn merged_response(&self) -> Option<Map<String, Value>> {
        let list = self.field("response")?.as_array()?;
        let mut merged = Map::new();
        for entry in list {
            if let Some(obj) = entry.as_object() {
                merged.extend(obj.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        Some(merged)
    }

    /// Returns the bytes of a `modbus-cmd` register read.
    #[must_use]
    pub fn register_data(&self) -> Option<Vec<u8>> {
        byte_list(self.field("response-register-data")?)
    }

    /// Reassembles the `raw-data` fragments of a `supply-raw-data` reply.
    ///
    /// Fragments arrive in the `other` list and are concatenated in list
    /// order. Returns `None` when there is no `other` list.
    #[must_use]
    pub fn raw_data(&self) -> Option<Vec<u8>> {
        let fragments = self.field("other")?.as_array()?;
        let mut out = Vec::new();
        for fragment in fragments {
            if let Some(bytes) = fragment.get("raw-data").and_then(byte_list) {
                out.extend(bytes);
            }
        }
        Some(out)
    }
}

fn byte_list(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()?
        .iter()
        .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
        .collect()
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(s: &str) -> Response {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn correlation_fields() {
        let resp = parse(
            r#"{"code":0,"cmd":"read-attr","target-id":"0000d01411b001dd:1","attr":"model-id","value":"CYL-4R"}"#,
        );
        assert_eq!(resp.cmd.as_deref(), Some("read-attr"));
        assert_eq!(resp.target_id.as_deref(), Some("0000d01411b001dd:1"));
        assert_eq!(resp.attr.as_deref(), Some("model-id"));
        assert_eq!(resp.value(), Some(&json!("CYL-4R")));
        assert!(resp.action.is_none());
    }

    #[test]
    fn offline_detection() {
        assert!(parse(r#"{"code":13,"reason":"device offline(unavailable)"}"#).is_offline());
        assert!(!parse(r#"{"code":13,"reason":"busy"}"#).is_offline());
        assert!(!parse(r#"{"code":15,"reason":"device offline(unavailable)"}"#).is_offline());
    }

    #[test]
    fn merged_query_list() {
        let resp = parse(
            r#"{"code":0,"response":[{"power":1},{"temperature":267},{"err_code":0}]}"#,
        );
        let merged = resp.merged_response().unwrap();
        assert_eq!(merged.get("power"), Some(&json!(1)));
        assert_eq!(merged.get("temperature"), Some(&json!(267)));
        assert_eq!(merged.get("err_code"), Some(&json!(0)));
        assert!(parse(r#"{"code":0}"#).merged_response().is_none());
    }

    #[test]
    fn raw_data_reassembly_in_order() {
        let resp = parse(
            r#"{"code":0,"other":[{"raw-data":[49,32]},{"raw-data":[52,53]}]}"#,
        );
        assert_eq!(resp.raw_data(), Some(vec![49, 32, 52, 53]));
    }

    #[test]
    fn register_bytes() {
        let resp = parse(r#"{"code":0,"response-register-data":[1,0,2,0]}"#);
        assert_eq!(resp.register_data(), Some(vec![1, 0, 2, 0]));
        let bad = parse(r#"{"code":0,"response-register-data":[1,300]}"#);
        assert!(bad.register_data().is_none());
    }

    #[test]
    fn null_value_is_absent() {
        assert!(parse(r#"{"code":0,"value":null}"#).value().is_none());
    }

    #[test]
    fn display_is_json() {
        let resp = parse(r#"{"code":13,"reason":"device offline(unavailable)"}"#);
        assert_eq!(
            resp.to_string(),
            r#"{"code":13,"reason":"device offline(unavailable)"}"#
        );
    }
}
