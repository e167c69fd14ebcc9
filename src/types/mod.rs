// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for gateway addressing and device values.
//!
//! Each type validates its input at construction time so the rest of the
//! library never has to re-check a MAC address or a percentage.
//!
//! # Types
//!
//! - [`DeviceAddress`] - 6-byte hardware address of a gateway
//! - [`Channel`] - numbered I/O point on a gateway (0 = not configured)
//! - [`TargetId`] - wire address of one channel on one gateway
//! - [`Percent`] - cover position or humidity target (0-100)
//! - [`TemperatureUnit`] - Celsius or Fahrenheit

mod address;
mod channel;
mod position;
mod temperature;

pub use address::{DeviceAddress, is_valid_mac};
pub use channel::{Channel, TargetId};
pub use position::Percent;
pub use temperature::TemperatureUnit;
