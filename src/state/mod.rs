// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.
//!
//! [`LastAttributes`] keeps the last value each attribute was successfully
//! read or written with. Failures never clear it, so a device that drops off
//! the network keeps reporting its last known state next to an
//! [`Availability`] flag that says it is stale.
//!
//! # Examples
//!
//! ```
//! use cyltek_lib::state::{Availability, LastAttributes};
//!
//! let mut attrs = LastAttributes::new();
//! attrs.set("power", true);
//! assert_eq!(attrs.get_bool("power"), Some(true));
//!
//! let mut availability = Availability::new();
//! for _ in 0..4 {
//!     availability.record_failure();
//! }
//! assert!(!availability.is_available());
//! availability.record_success();
//! assert!(availability.is_available());
//! ```

mod attributes;
mod availability;

pub use attributes::LastAttributes;
pub use availability::Availability;
