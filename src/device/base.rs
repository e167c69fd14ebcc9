// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State shared by every device model.

use std::sync::Arc;

use serde_json::Value;

use crate::command::{Command, ReadAttr, SupplyRawData};
use crate::controller::Controller;
use crate::error::{DeviceError, Error, ParseError, Result};
use crate::protocol::{Response, SendOptions};
use crate::state::{Availability, LastAttributes};
use crate::types::{DeviceAddress, TargetId};

use super::ChannelMap;

/// Offline recoveries attempted before a read is reported as failed
/// outright.
pub const MAX_OFFLINE_RETRY: u8 = 3;

/// Builds the stable unique id of a device model.
///
/// Format: `cyltek-<kind>.<mac>:<channels>` followed by
/// `::<discriminators>` when any are given. Channels are listed in
/// ascending numeric order and discriminators are joined by `_`.
///
/// # Examples
///
/// ```
/// use cyltek_lib::device::{ChannelMap, make_unique_id};
///
/// let mac = "D0:14:11:B0:01:DD".parse().unwrap();
/// let channels: ChannelMap = [("default", 1)].into();
/// assert_eq!(
///     make_unique_id("climate", &mac, &channels, &["3"]),
///     "cyltek-climate.d01411b001dd:1::3"
/// );
/// ```
#[must_use]
pub fn make_unique_id(
    kind: &str,
    address: &DeviceAddress,
    channels: &ChannelMap,
    discriminators: &[&str],
) -> String {
    let mut id = format!("cyltek-{kind}.{}:{}", address.compact(), channels.joined());
    if !discriminators.is_empty() {
        id.push_str("::");
        id.push_str(&discriminators.join("_"));
    }
    id
}

/// Controller handle, channel mapping and observed state of one device
/// model.
#[derive(Debug)]
pub struct DeviceCore {
    controller: Arc<Controller>,
    channels: ChannelMap,
    unique_id: String,
    attributes: LastAttributes,
    availability: Availability,
    offline_retry: u8,
}

impl DeviceCore {
    /// Creates the core of a device of `kind`.
    #[must_use]
    pub fn new(
        kind: &str,
        controller: Arc<Controller>,
        channels: ChannelMap,
        discriminators: &[&str],
    ) -> Self {
        let unique_id = make_unique_id(kind, &controller.address(), &channels, discriminators);
        Self {
            controller,
            channels,
            unique_id,
            attributes: LastAttributes::new(),
            availability: Availability::new(),
            offline_retry: 0,
        }
    }

    /// Returns the gateway this device sits on.
    #[must_use]
    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    /// Returns the channel mapping.
    #[must_use]
    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// Returns the unique id.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Returns the last-known attributes.
    #[must_use]
    pub fn attributes(&self) -> &LastAttributes {
        &self.attributes
    }

    /// Returns the last-known attributes for update.
    pub fn attributes_mut(&mut self) -> &mut LastAttributes {
        &mut self.attributes
    }

    /// Returns the availability tracker.
    #[must_use]
    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// Returns the number of offline recoveries since the last good read.
    #[must_use]
    pub fn offline_retry(&self) -> u8 {
        self.offline_retry
    }

    /// Resolves the target id of `role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelDisabled`] if the role is bound to channel 0
    /// or not bound at all.
    pub fn target(&self, role: &str) -> Result<TargetId> {
        let channel = self.channels.get(role);
        if channel.is_disabled() {
            tracing::debug!(unique_id = %self.unique_id, role, "Channel disabled");
            return Err(Error::ChannelDisabled {
                role: role.to_string(),
            });
        }
        Ok(self.controller.target(channel))
    }

    /// Sends a write command.
    ///
    /// # Errors
    ///
    /// Any error from the command channel.
    pub fn send(&self, command: &dyn Command) -> Result<Response> {
        self.controller.send(command).inspect_err(|e| {
            tracing::warn!(
                unique_id = %self.unique_id,
                cmd = command.name(),
                error = %e,
                "Command failed"
            );
        })
    }

    /// Sends a command with explicit options.
    ///
    /// # Errors
    ///
    /// Any error from the command channel.
    pub fn send_with(&self, command: &dyn Command, options: SendOptions) -> Result<Response> {
        self.controller.send_with(command, options)
    }

    /// Sends a read command and applies the offline-recovery policy.
    ///
    /// On success the recovery counter resets. When the gateway reports the
    /// sub-device offline, a forced `enumerate` is fired and the counter
    /// climbs; the read itself still fails. Once the counter has reached
    /// [`MAX_OFFLINE_RETRY`] no more recoveries are attempted.
    ///
    /// # Errors
    ///
    /// The command's error, or `DeviceError::RecoveryExhausted`.
    pub fn read(&mut self, command: &dyn Command) -> Result<Response> {
        match self.controller.send(command) {
            Ok(response) => {
                self.offline_retry = 0;
                Ok(response)
            }
            Err(e) => Err(self.recover(command, e)),
        }
    }

    fn recover(&mut self, command: &dyn Command, error: Error) -> Error {
        tracing::warn!(
            unique_id = %self.unique_id,
            cmd = command.name(),
            error = %error,
            "Read failed"
        );
        if self.offline_retry >= MAX_OFFLINE_RETRY {
            return if error.is_offline() {
                DeviceError::RecoveryExhausted(self.offline_retry).into()
            } else {
                error
            };
        }
        if error.is_offline() {
            tracing::warn!(
                unique_id = %self.unique_id,
                mac = %self.controller.address(),
                "Device offline, refreshing capabilities"
            );
            if let Err(e) = self.controller.refresh_capabilities() {
                tracing::warn!(unique_id = %self.unique_id, error = %e, "Refresh not sent");
            }
            self.offline_retry += 1;
        }
        error
    }

    /// Reads `attr` on the channel bound to `role` and returns its value.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelDisabled`] for a disabled role.
    /// - `ParseError::MissingField` if the reply has no `value`.
    /// - Any error from [`read`](Self::read).
    pub fn read_attr(&mut self, role: &str, attr: &str) -> Result<Value> {
        let target = self.target(role)?;
        let response = self.read(&ReadAttr::new(target, attr))?;
        response
            .value()
            .cloned()
            .ok_or_else(|| ParseError::MissingField("value".to_string()).into())
    }

    /// Writes raw bytes to the serial bus behind `role` and returns the
    /// reassembled bus reply.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelDisabled`] for a disabled role.
    /// - `ParseError::MissingField` if the reply carries no `other` list.
    /// - Any error from [`read`](Self::read).
    pub fn supply_raw_data(&mut self, role: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        let target = self.target(role)?;
        let response = self.read(&SupplyRawData::new(target, data))?;
        response
            .raw_data()
            .ok_or_else(|| ParseError::MissingField("other".to_string()).into())
    }

    /// Folds the outcome of an availability check into the tracker.
    ///
    /// Returns the resulting availability.
    pub fn record_check(&mut self, outcome: &Result<()>) -> bool {
        match outcome {
            Ok(()) => self.availability.record_success(),
            Err(e) => {
                self.availability.record_failure();
                tracing::debug!(
                    unique_id = %self.unique_id,
                    counter = self.availability.counter(),
                    error = %e,
                    "Availability check failed"
                );
            }
        }
        let available = self.availability.is_available();
        if !available {
            tracing::error!(
                unique_id = %self.unique_id,
                host = %self.controller.endpoint(),
                "Device unavailable"
            );
        }
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_id_without_discriminator() {
        let mac = "D0:14:11:B0:01:DD".parse().unwrap();
        let channels: ChannelMap = [("on-off", 3), ("level", 4)].into();
        assert_eq!(
            make_unique_id("light", &mac, &channels, &[]),
            "cyltek-light.d01411b001dd:3:4"
        );
    }

    #[test]
    fn unique_id_sorts_cover_channels() {
        let mac = "D0:14:11:B0:01:DD".parse().unwrap();
        let channels: ChannelMap = [("open", 1), ("close", 2), ("stop", 3), ("level", 0)].into();
        assert_eq!(
            make_unique_id("cover", &mac, &channels, &[]),
            "cyltek-cover.d01411b001dd:0:1:2:3"
        );
    }

    #[test]
    fn unique_id_joins_discriminators() {
        let mac = "D0:14:11:B0:01:DD".parse().unwrap();
        let channels: ChannelMap = [("default", 1)].into();
        assert_eq!(
            make_unique_id("humidifier", &mac, &channels, &["FFFFFFFF", "x"]),
            "cyltek-humidifier.d01411b001dd:1::FFFFFFFF_x"
        );
    }
}
