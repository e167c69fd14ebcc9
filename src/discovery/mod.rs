// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway discovery sweep.
//!
//! Finding candidates on the network (neighbor tables, mDNS, port scans) is
//! left to the host. Given the `{mac, ip}` pairs it found, [`sweep`] keeps
//! the gateway vendor range, builds one controller per address concurrently
//! on the blocking pool and returns those that completed their bootstrap.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use cyltek_lib::controller::ControllerSettings;
//! use cyltek_lib::discovery::{Candidate, sweep};
//! use cyltek_lib::manager::ControllerRegistry;
//!
//! # async fn example() {
//! let registry = Arc::new(ControllerRegistry::new(ControllerSettings::default()));
//! let candidates = vec![
//!     Candidate::new("D0:14:11:B0:01:DD", Some("192.168.10.140".parse().unwrap())),
//!     Candidate::new("00:11:22:33:44:55", None),
//! ];
//!
//! for controller in sweep(&registry, candidates).await {
//!     println!("{} ({})", controller.address(), controller.model());
//! }
//! # }
//! ```

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::controller::Controller;
use crate::manager::ControllerRegistry;
use crate::types::DeviceAddress;

/// A host seen on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Hardware address as reported by the host, in any case.
    pub mac: String,
    /// Address the host was seen at.
    pub ip: Option<IpAddr>,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(mac: impl Into<String>, ip: Option<IpAddr>) -> Self {
        Self { mac: mac.into(), ip }
    }

    /// Returns the parsed address if it is in the gateway vendor range.
    #[must_use]
    pub fn gateway_address(&self) -> Option<DeviceAddress> {
        self.mac
            .parse::<DeviceAddress>()
            .ok()
            .filter(DeviceAddress::is_gateway)
    }
}

/// Keeps gateway candidates, first occurrence per address.
#[must_use]
pub fn filter_gateways(candidates: &[Candidate]) -> Vec<(DeviceAddress, Option<IpAddr>)> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter_map(|c| c.gateway_address().map(|address| (address, c.ip)))
        .filter(|(address, _)| seen.insert(*address))
        .collect()
}

/// Builds controllers for every gateway candidate and returns the
/// initialized ones.
///
/// Controllers are registered in `registry` whether or not they
/// initialized, so later lookups reuse them.
pub async fn sweep(
    registry: &Arc<ControllerRegistry>,
    candidates: Vec<Candidate>,
) -> Vec<Arc<Controller>> {
    let gateways = filter_gateways(&candidates);
    tracing::info!(
        candidates = candidates.len(),
        gateways = gateways.len(),
        "Starting gateway sweep"
    );

    let mut tasks = JoinSet::new();
    for (address, ip) in gateways {
        let registry = Arc::clone(registry);
        tasks.spawn_blocking(move || registry.get_or_create(address, ip));
    }

    let mut found = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(controller) if controller.is_initialized() => found.push(controller),
            Ok(controller) => {
                tracing::debug!(mac = %controller.address(), "Gateway did not initialize");
            }
            Err(e) => tracing::warn!(error = %e, "Sweep worker failed"),
        }
    }
    found.sort_by_key(|c| c.address());

    tracing::info!(count = found.len(), "Gateway sweep complete");
    found
}
