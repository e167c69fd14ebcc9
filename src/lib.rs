// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `cyltek_lib` - A Rust library to control CYL-Tek IoT gateways.
//!
//! The gateways speak a line-framed JSON protocol over TCP: each request is
//! one `#:{...}:#` frame and each reply echoes the request's `cmd`,
//! `target-id` and `attr`. Every command opens a fresh connection.
//!
//! # Layers
//!
//! - [`protocol`]: frame codec, transport and the retrying [`CommandChannel`]
//! - [`command`]: typed commands for the gateway vocabulary
//! - [`controller`]: one gateway, with its configuration and capability
//!   manifest fetched at construction
//! - [`manager`]: one controller per gateway address, shared by devices
//! - [`device`]: switches, lights, covers, climates and humidifiers
//!
//! # Supported Devices
//!
//! | Device | Channels | Commands |
//! |--------|----------|----------|
//! | [`Switch`](device::Switch) | `on-off` | `switch-on`, `switch-off`, `read-attr` |
//! | [`Light`](device::Light) | `on-off`, `level` | plus `level-move-to` |
//! | [`Cover`](device::Cover) | `open`, `close`, `stop`, `level` | signal scripts |
//! | [`Climate`](device::Climate) | `default` | `daikin-cmd` or `modbus-cmd` |
//! | [`Humidifier`](device::Humidifier) | `default` | `altrason-cmd`, `supply-raw-data` |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cyltek_lib::config::ProfileStore;
//! use cyltek_lib::controller::ControllerSettings;
//! use cyltek_lib::device::{IoThing, Power};
//! use cyltek_lib::manager::{ControllerRegistry, DeviceFactory};
//!
//! let registry = Arc::new(ControllerRegistry::new(ControllerSettings::default()));
//! let factory = DeviceFactory::new(registry, ProfileStore::new("/etc/cyltek"));
//!
//! let mut switch = factory.switch("D0:14:11:B0:01:DD".parse()?, [("on-off", 3)].into());
//! if switch.is_available() {
//!     switch.turn_on()?;
//! }
//! # Ok::<(), cyltek_lib::Error>(())
//! ```
//!
//! # Async Hosts
//!
//! All device calls block on socket I/O. With the default `runtime`
//! feature, [`offload`] moves a call onto the tokio blocking pool and
//! [`discovery::sweep`] builds controllers for many gateways concurrently.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cyltek_lib::controller::ControllerSettings;
//! use cyltek_lib::device::{IoThing, Switch};
//! use cyltek_lib::manager::ControllerRegistry;
//!
//! # async fn example() -> cyltek_lib::Result<()> {
//! let registry = Arc::new(ControllerRegistry::new(ControllerSettings::default()));
//! let mac = "D0:14:11:B0:01:DD".parse()?;
//! let controller = {
//!     let registry = Arc::clone(&registry);
//!     cyltek_lib::offload(move || Ok(registry.get_or_create(mac, None))).await?
//! };
//!
//! let mut switch = Switch::new(controller, [("on-off", 3)].into());
//! let available = cyltek_lib::offload(move || Ok(switch.is_available())).await?;
//! # let _ = available;
//! # Ok(())
//! # }
//! ```

mod capabilities;
pub mod command;
pub mod config;
pub mod controller;
pub mod device;
#[cfg(feature = "runtime")]
pub mod discovery;
pub mod error;
pub mod manager;
pub mod protocol;
#[cfg(feature = "runtime")]
mod runtime;
pub mod state;
pub mod telemetry;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder, Capability};
pub use command::Command;
pub use controller::{Controller, ControllerSettings};
pub use device::{ChannelMap, Climate, Cover, CoverState, Humidifier, IoThing, Light, Switch};
pub use error::{ConfigError, DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use manager::{ControllerRegistry, DeviceFactory};
pub use protocol::{CommandChannel, Response};
#[cfg(feature = "runtime")]
pub use runtime::offload;
pub use types::{Channel, DeviceAddress, Percent, TargetId, TemperatureUnit};
