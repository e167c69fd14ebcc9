// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel numbers and target ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DeviceAddress;

/// A numbered I/O point on a gateway.
///
/// Channel 0 is the "not configured" sentinel: any operation bound to it
/// fails immediately without touching the network.
///
/// # Examples
///
/// ```
/// use cyltek_lib::types::Channel;
///
/// assert!(Channel::DISABLED.is_disabled());
/// assert!(!Channel::new(3).is_disabled());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Channel(u16);

impl Channel {
    /// The "not configured" channel.
    pub const DISABLED: Self = Self(0);

    /// Creates a channel.
    #[must_use]
    pub const fn new(number: u16) -> Self {
        Self(number)
    }

    /// Returns the channel number.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns `true` for channel 0.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.0 == 0
    }
}

impl From<u16> for Channel {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of one channel on one gateway.
///
/// Rendered on the wire as `0000<mac lowercase, no colons>:<channel>`.
///
/// # Examples
///
/// ```
/// use cyltek_lib::types::{Channel, DeviceAddress, TargetId};
///
/// let mac: DeviceAddress = "D0:14:11:B0:11:E5".parse().unwrap();
/// let target = TargetId::new(mac, Channel::new(1));
/// assert_eq!(target.to_string(), "0000d01411b011e5:1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId {
    address: DeviceAddress,
    channel: Channel,
}

impl TargetId {
    /// Creates a target id.
    #[must_use]
    pub const fn new(address: DeviceAddress, channel: Channel) -> Self {
        Self { address, channel }
    }

    /// Returns the gateway address.
    #[must_use]
    pub const fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Returns the channel.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0000{}:{}", self.address.compact(), self.channel)
    }
}

impl From<TargetId> for serde_json::Value {
    fn from(value: TargetId) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_id_wire_form() {
        let mac: DeviceAddress = "D0:14:11:B0:12:2F".parse().unwrap();
        let target = TargetId::new(mac, Channel::new(12));
        assert_eq!(target.to_string(), "0000d01411b0122f:12");
        assert_eq!(target.address(), mac);
        assert_eq!(target.channel().value(), 12);
    }

    #[test]
    fn channel_zero_is_disabled() {
        assert!(Channel::default().is_disabled());
        assert!(Channel::from(0).is_disabled());
        assert!(!Channel::from(1).is_disabled());
    }

    #[test]
    fn channel_serde_transparent() {
        let ch: Channel = serde_json::from_str("7").unwrap();
        assert_eq!(ch, Channel::new(7));
    }
}
