// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame codec for the gateway text protocol.
//!
//! A frame is a JSON object wrapped in sentinels: `#:{...}:#`. Requests put
//! the command name under `cmd` first and the parameters after it. Callers
//! use underscored parameter names; six of them have a hyphenated wire form
//! that the codec substitutes on the way out.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::command::Command;
use crate::error::ParseError;
use crate::protocol::Response;

/// Opening frame sentinel.
pub const FRAME_START: &str = "#:";

/// Closing frame sentinel.
pub const FRAME_END: &str = ":#";

/// Parameter names whose wire spelling differs from the caller's.
const KEY_TRANSLATIONS: [(&str, &str); 6] = [
    ("target_id", "target-id"),
    ("timeout_ms", "timeout-ms"),
    ("raw_data", "raw-data"),
    ("slave_addr", "slave-addr"),
    ("start_addr", "start-addr"),
    ("write_data", "write-data"),
];

/// Returns the wire spelling of a parameter name.
///
/// Names outside the translation table pass through unchanged.
///
/// # Examples
///
/// ```
/// use cyltek_lib::protocol::wire_key;
///
/// assert_eq!(wire_key("target_id"), "target-id");
/// assert_eq!(wire_key("refresh"), "refresh");
/// ```
#[must_use]
pub fn wire_key(key: &str) -> &str {
    KEY_TRANSLATIONS
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| to)
}

/// A request ready to be framed: the command name plus its wire parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    cmd: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

impl Request {
    /// Creates a request with no parameters.
    #[must_use]
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            params: Map::new(),
        }
    }

    /// Builds the request for a typed command.
    #[must_use]
    pub fn from_command(command: &dyn Command) -> Self {
        command
            .params()
            .into_iter()
            .fold(Self::new(command.name()), |req, (key, value)| {
                req.with_param(key, value)
            })
    }

    /// Adds a parameter, translating its name to the wire form.
    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(wire_key(key).to_string(), value.into());
        self
    }

    /// Returns the command name.
    #[must_use]
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Returns a wire parameter by its hyphenated name.
    #[must_use]
    pub fn param(&self, wire_name: &str) -> Option<&Value> {
        self.params.get(wire_name)
    }

    /// Returns all wire parameters.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Returns a string parameter, if present and a string.
    #[must_use]
    pub fn str_param(&self, wire_name: &str) -> Option<&str> {
        self.param(wire_name).and_then(Value::as_str)
    }

    /// Renders the request as a wire frame.
    #[must_use]
    pub fn encode(&self) -> String {
        // A String-keyed map of JSON values always serializes.
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("{FRAME_START}{json}{FRAME_END}")
    }
}

/// Encodes a typed command into a wire frame.
#[must_use]
pub fn encode(command: &dyn Command) -> String {
    Request::from_command(command).encode()
}

/// Strips every frame sentinel from `raw`, including duplicated ones.
#[must_use]
pub fn strip_sentinels(raw: &str) -> String {
    raw.replace(FRAME_START, "").replace(FRAME_END, "")
}

/// Decodes a raw reply into a [`Response`].
///
/// All sentinels are removed before parsing, so a reply that repeats
/// `#:` or `:#` still decodes.
///
/// # Errors
///
/// Returns `ParseError::MalformedFrame` if nothing but whitespace remains,
/// or `ParseError::Json` if the remainder is not a JSON object.
pub fn decode(raw: &str) -> Result<Response, ParseError> {
    let body = strip_sentinels(raw);
    let body = body.trim();
    if body.is_empty() {
        return Err(ParseError::MalformedFrame(raw.to_string()));
    }
    Ok(serde_json::from_str(body)?)
}

/// Decodes a wire frame back into a request.
///
/// Used by the simulated gateways in tests and by tooling that inspects
/// captured traffic.
///
/// # Errors
///
/// Returns `ParseError` if the frame is not a JSON object with a string
/// `cmd` member.
pub fn decode_request(raw: &str) -> Result<Request, ParseError> {
    let body = strip_sentinels(raw);
    let mut params: Map<String, Value> = serde_json::from_str(body.trim())?;
    let cmd = match params.remove("cmd") {
        Some(Value::String(cmd)) => cmd,
        _ => return Err(ParseError::MissingField("cmd".to_string())),
    };
    Ok(Request { cmd, params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translation_table_is_closed() {
        for (from, to) in KEY_TRANSLATIONS {
            assert_eq!(wire_key(from), to);
        }
        assert_eq!(wire_key("pretty_print"), "pretty_print");
        assert_eq!(wire_key("level"), "level");
    }

    #[test]
    fn encode_puts_cmd_first() {
        let frame = Request::new("read-attr")
            .with_param("target_id", "0000d01411b001dd:3")
            .with_param("attr", "on-off-state")
            .encode();
        assert!(frame.starts_with("#:{\"cmd\":\"read-attr\""));
        assert!(frame.ends_with("}:#"));
        assert!(frame.contains("\"target-id\":\"0000d01411b001dd:3\""));
    }

    #[test]
    fn encode_decode_preserves_params() {
        let req = Request::new("modbus-cmd")
            .with_param("target_id", "0000d01411b001dd:1")
            .with_param("mode", "rtu")
            .with_param("function", 3)
            .with_param("slave_addr", 1)
            .with_param("start_addr", 2006)
            .with_param("number", 6)
            .with_param("write_data", json!([]));
        let back = decode_request(&req.encode()).unwrap();
        assert_eq!(back, req);
        assert_eq!(back.param("start-addr"), Some(&json!(2006)));
        assert!(back.param("start_addr").is_none());
    }

    #[test]
    fn every_command_survives_the_wire() {
        use crate::command::{
            AltrasonAction, AltrasonCommand, Configure, DaikinAction, DaikinCommand, Enumerate,
            LevelMoveTo, ReadAttr, SupplyRawData, SwitchOff, SwitchOn,
        };
        use crate::types::{Channel, TargetId};

        let mac = "D0:14:11:B0:01:DD".parse().unwrap();
        let t = TargetId::new(mac, Channel::new(3));
        let tid = "0000d01411b001dd:3";
        let cases: Vec<(Box<dyn Command>, Value)> = vec![
            (Box::new(Configure), json!({"pretty_print": false})),
            (Box::new(Enumerate::cached()), json!({"refresh": false})),
            (Box::new(Enumerate::refresh()), json!({"refresh": true})),
            (
                Box::new(ReadAttr::new(t, "on-off-state")),
                json!({"target-id": tid, "attr": "on-off-state"}),
            ),
            (Box::new(SwitchOn::new(t)), json!({"target-id": tid})),
            (Box::new(SwitchOff::new(t)), json!({"target-id": tid})),
            (
                Box::new(LevelMoveTo::new(t, 128, 50)),
                json!({"target-id": tid, "level": 128, "duration": 50}),
            ),
            (
                Box::new(DaikinCommand::new(t, DaikinAction::SetMode, 7).with_value(2)),
                json!({"target-id": tid, "action": "set-mode", "id": 7, "value": 2}),
            ),
            (
                Box::new(AltrasonCommand::query_all(t, "a1")),
                json!({"target-id": tid, "action": "query-all", "id": "a1", "timeout-ms": 1000}),
            ),
            (
                Box::new(
                    AltrasonCommand::new(t, AltrasonAction::SetTargetHumidity, "a1").with_value(55),
                ),
                json!({"target-id": tid, "action": "set-target-humidity", "id": "a1", "value": 55}),
            ),
            (
                Box::new(SupplyRawData::new(t, vec![0x41, 0x31, 0x0D])),
                json!({"target-id": tid, "raw-data": [0x41, 0x31, 0x0D]}),
            ),
        ];

        for (command, wire) in cases {
            let frame = encode(command.as_ref());
            let back = decode_request(&frame).unwrap();
            assert_eq!(back.cmd(), command.name(), "{frame}");
            assert_eq!(Value::Object(back.params().clone()), wire, "{frame}");
            assert_eq!(back, Request::from_command(command.as_ref()));
        }
    }

    #[test]
    fn decode_tolerates_duplicated_sentinels() {
        let resp = decode("#:#:{\"code\":0,\"value\":true}:#:#").unwrap();
        assert_eq!(resp.code, Some(0));
        assert_eq!(resp.value(), Some(&json!(true)));
    }

    #[test]
    fn decode_malformed_is_an_error() {
        assert!(matches!(decode("#:{\"code\":0"), Err(ParseError::Json(_))));
        assert!(matches!(decode("#::#"), Err(ParseError::MalformedFrame(_))));
        assert!(decode("#:42:#").is_err());
    }

    #[test]
    fn decode_request_requires_cmd() {
        assert!(matches!(
            decode_request("#:{\"refresh\":true}:#"),
            Err(ParseError::MissingField(_))
        ));
    }
}
