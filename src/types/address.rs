// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware address of a gateway.
//!
//! The 6-byte MAC address identifies a physical gateway everywhere in the
//! library: it keys the controller registry, it is embedded in every
//! [`TargetId`](super::TargetId), and when no static IP is configured the
//! gateway's IPv6 link-local address is derived from it (EUI-64).

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// First bytes shared by every CYL-Tek gateway (`D0:14:11:Bx`).
const VENDOR_PREFIX: [u8; 3] = [0xD0, 0x14, 0x11];
const VENDOR_NIBBLE: u8 = 0xB;

/// A gateway hardware address.
///
/// Parsing accepts either case; the textual form is always uppercase with
/// colons.
///
/// # Examples
///
/// ```
/// use cyltek_lib::types::DeviceAddress;
///
/// let mac: DeviceAddress = "d0:14:11:b0:01:dd".parse().unwrap();
/// assert_eq!(mac.to_string(), "D0:14:11:B0:01:DD");
/// assert_eq!(mac.compact(), "d01411b001dd");
/// assert_eq!(mac.link_local().to_string(), "fe80::d214:11ff:feb0:1dd");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress([u8; 6]);

impl DeviceAddress {
    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Returns the lowercase hex form without separators, as used in target ids.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Returns `true` if the address belongs to the gateway vendor range.
    #[must_use]
    pub fn is_gateway(&self) -> bool {
        self.0[..3] == VENDOR_PREFIX && self.0[3] >> 4 == VENDOR_NIBBLE
    }

    /// Derives the IPv6 link-local address (modified EUI-64).
    ///
    /// The universal/local bit of the first octet is flipped, `FF:FE` is
    /// inserted between the two halves and the result is placed under
    /// `fe80::/64`.
    #[must_use]
    pub fn link_local(&self) -> Ipv6Addr {
        let [a, b, c, d, e, f] = self.0;
        let eui = [a ^ 0x02, b, c, 0xFF, 0xFE, d, e, f];
        Ipv6Addr::new(
            0xfe80,
            0,
            0,
            0,
            u16::from_be_bytes([eui[0], eui[1]]),
            u16::from_be_bytes([eui[2], eui[3]]),
            u16::from_be_bytes([eui[4], eui[5]]),
            u16::from_be_bytes([eui[6], eui[7]]),
        )
    }

    /// Recovers the hardware address from an EUI-64 IPv6 address.
    ///
    /// A trailing `/prefix` or `%zone` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidAddress` if the text is not an IPv6
    /// address.
    pub fn from_link_local(ipv6: &str) -> Result<Self, ValueError> {
        let bare = ipv6
            .split(['/', '%'])
            .next()
            .unwrap_or_default();
        let addr: Ipv6Addr = bare
            .parse()
            .map_err(|_| ValueError::InvalidAddress(ipv6.to_string()))?;
        let o = addr.octets();
        Ok(Self([o[8] ^ 0x02, o[9], o[10], o[13], o[14], o[15]]))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceAddress({self})")
    }
}

impl FromStr for DeviceAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidAddress(s.to_string());
        let mut bytes = [0u8; 6];
        let mut parts = s.trim().split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceAddress> for String {
    fn from(value: DeviceAddress) -> Self {
        value.to_string()
    }
}

/// Returns `true` if `mac` is a colon-separated 6-byte hardware address.
#[must_use]
pub fn is_valid_mac(mac: &str) -> bool {
    mac.parse::<DeviceAddress>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceAddress {
        "D0:14:11:B0:01:DD".parse().unwrap()
    }

    #[test]
    fn parse_normalizes_case() {
        let lower: DeviceAddress = "d0:14:11:b0:01:dd".parse().unwrap();
        assert_eq!(lower, sample());
        assert_eq!(lower.to_string(), "D0:14:11:B0:01:DD");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("D0:14:11:B0:01".parse::<DeviceAddress>().is_err());
        assert!("D0:14:11:B0:01:DD:EE".parse::<DeviceAddress>().is_err());
        assert!("D0-14-11-B0-01-DD".parse::<DeviceAddress>().is_err());
        assert!("D0:14:11:B0:01:GG".parse::<DeviceAddress>().is_err());
        assert!("D0:14:11:B0:1:DDD".parse::<DeviceAddress>().is_err());
        assert!(!is_valid_mac(""));
        assert!(is_valid_mac("00:11:22:33:44:55"));
    }

    #[test]
    fn compact_form() {
        assert_eq!(sample().compact(), "d01411b001dd");
    }

    #[test]
    fn eui64_known_pair() {
        let expected: Ipv6Addr = "fe80::d214:11ff:feb0:01dd".parse().unwrap();
        assert_eq!(sample().link_local(), expected);
        assert_eq!(sample().link_local().to_string(), "fe80::d214:11ff:feb0:1dd");
    }

    #[test]
    fn eui64_flips_local_bit_both_ways() {
        let local: DeviceAddress = "02:00:00:00:00:01".parse().unwrap();
        assert_eq!(local.link_local().to_string(), "fe80::ff:fe00:1");
    }

    #[test]
    fn link_local_inverse() {
        let mac = DeviceAddress::from_link_local("fe80::d214:11ff:feb0:1dd/64").unwrap();
        assert_eq!(mac, sample());
        let zoned = DeviceAddress::from_link_local("fe80::d214:11ff:feb0:1dd%eth0").unwrap();
        assert_eq!(zoned, sample());
        assert!(DeviceAddress::from_link_local("192.168.1.1").is_err());
    }

    #[test]
    fn vendor_range() {
        assert!(sample().is_gateway());
        let other: DeviceAddress = "D0:14:11:A0:01:DD".parse().unwrap();
        assert!(!other.is_gateway());
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, "\"D0:14:11:B0:01:DD\"");
        let back: DeviceAddress = serde_json::from_str("\"d0:14:11:b0:01:dd\"").unwrap();
        assert_eq!(back, sample());
    }
}
