// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared controller registry and device construction.
//!
//! A gateway usually hosts many logical devices: a relay board carries
//! several switches, an RS-485 bridge carries every indoor unit of an
//! air-conditioning system. The [`ControllerRegistry`] guarantees that all
//! of them share one [`Controller`](crate::controller::Controller) per
//! gateway address, and the [`DeviceFactory`] builds devices against it.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use cyltek_lib::config::ProfileStore;
//! use cyltek_lib::controller::ControllerSettings;
//! use cyltek_lib::device::{IoThing, TargetTemperature};
//! use cyltek_lib::manager::{ControllerRegistry, DeviceFactory};
//!
//! let registry = Arc::new(ControllerRegistry::new(
//!     ControllerSettings::default().with_interface("br0"),
//! ));
//! let factory = DeviceFactory::new(Arc::clone(&registry), ProfileStore::new("/etc/cyltek"));
//! let bridge = "D0:14:11:B0:11:E5".parse()?;
//!
//! let mut office = factory.climate(bridge, 0, "daikin", [("default", 1)].into(), "STANDARD")?;
//! let mut lobby = factory.climate(bridge, 1, "daikin", [("default", 1)].into(), "STANDARD")?;
//! office.update_attributes()?;
//! lobby.set_target_temperature(25.0)?;
//!
//! assert_eq!(registry.len(), 1);
//! # Ok::<(), cyltek_lib::Error>(())
//! ```

mod factory;
mod registry;

pub use factory::DeviceFactory;
pub use registry::ControllerRegistry;
