// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability manifest reported by `enumerate`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ParseError;
use crate::protocol::Response;
use crate::types::TargetId;

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    devices: Vec<RawDevice>,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    id: String,
    #[serde(default)]
    attrs: Vec<RawAttr>,
}

#[derive(Debug, Deserialize)]
struct RawAttr {
    attr: String,
}

/// Channels a gateway exposes and the attributes each one supports.
///
/// # Examples
///
/// ```
/// use cyltek_lib::controller::CapabilityManifest;
/// use cyltek_lib::protocol::Response;
/// use cyltek_lib::types::{Channel, DeviceAddress, TargetId};
///
/// let reply: Response = serde_json::from_str(r#"{
///     "code": 0,
///     "devices": [
///         {"id": "0000d01411b001dd:4", "attrs": [{"attr": "current-level"}]}
///     ]
/// }"#).unwrap();
/// let manifest = CapabilityManifest::from_response(&reply).unwrap();
///
/// let mac: DeviceAddress = "D0:14:11:B0:01:DD".parse().unwrap();
/// let level = TargetId::new(mac, Channel::new(4));
/// assert_eq!(manifest.supports(&level, "current-level"), Some(true));
/// assert_eq!(manifest.supports(&level, "target-level"), Some(false));
/// assert_eq!(manifest.supports(&TargetId::new(mac, Channel::new(9)), "x"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityManifest {
    channels: HashMap<String, Vec<String>>,
}

impl CapabilityManifest {
    /// Builds the manifest from an `enumerate` reply.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if `devices` is not a list of
    /// `{id, attrs: [{attr}]}` objects.
    pub fn from_response(response: &Response) -> Result<Self, ParseError> {
        let raw: RawManifest = serde_json::to_value(&response.fields)
            .and_then(serde_json::from_value)?;
        let channels = raw
            .devices
            .into_iter()
            .map(|d| (d.id, d.attrs.into_iter().map(|a| a.attr).collect()))
            .collect();
        Ok(Self { channels })
    }

    /// Returns the attributes of a channel, if the channel is listed.
    #[must_use]
    pub fn attributes(&self, target: &TargetId) -> Option<&[String]> {
        self.channels.get(&target.to_string()).map(Vec::as_slice)
    }

    /// Returns whether a listed channel supports `attr`.
    ///
    /// `None` means the channel is not in the manifest at all.
    #[must_use]
    pub fn supports(&self, target: &TargetId, attr: &str) -> Option<bool> {
        self.attributes(target)
            .map(|attrs| attrs.iter().any(|a| a == attr))
    }

    /// Returns the number of listed channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no channel is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reply_is_empty_manifest() {
        let reply: Response = serde_json::from_str(r#"{"code":0}"#).unwrap();
        let manifest = CapabilityManifest::from_response(&reply).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn malformed_devices() {
        let reply: Response =
            serde_json::from_str(r#"{"code":0,"devices":[{"attrs":[]}]}"#).unwrap();
        assert!(CapabilityManifest::from_response(&reply).is_err());
    }

    #[test]
    fn several_channels() {
        let reply: Response = serde_json::from_str(
            r#"{"code":0,"devices":[
                {"id":"0000d01411b001dd:1","attrs":[{"attr":"model-id"}]},
                {"id":"0000d01411b001dd:3","attrs":[{"attr":"on-off-state"},{"attr":"target-level"}]}
            ]}"#,
        )
        .unwrap();
        let manifest = CapabilityManifest::from_response(&reply).unwrap();
        assert_eq!(manifest.len(), 2);
    }
}
