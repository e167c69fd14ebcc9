// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One controller per gateway address.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::controller::{Controller, ControllerSettings};
use crate::types::DeviceAddress;

type Cell = Arc<OnceLock<Arc<Controller>>>;

/// Registry of live controllers, keyed by gateway address.
///
/// The map lock is held only to find or insert the per-address cell; the
/// controller itself is built inside that cell, so concurrent first lookups
/// of one address run the bootstrap once and all receive the same
/// controller, while lookups of other addresses are not blocked.
///
/// Create one registry at startup and share it behind an [`Arc`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cyltek_lib::controller::ControllerSettings;
/// use cyltek_lib::manager::ControllerRegistry;
///
/// let registry = ControllerRegistry::new(ControllerSettings::default());
/// let mac = "D0:14:11:B0:01:DD".parse()?;
///
/// let a = registry.get_or_create(mac, None);
/// let b = registry.get_or_create(mac, None);
/// assert!(Arc::ptr_eq(&a, &b));
/// # Ok::<(), cyltek_lib::Error>(())
/// ```
#[derive(Debug)]
pub struct ControllerRegistry {
    settings: ControllerSettings,
    controllers: Mutex<HashMap<DeviceAddress, Cell>>,
}

impl ControllerRegistry {
    /// Creates an empty registry whose controllers use `settings`.
    #[must_use]
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            controllers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the settings new controllers are built with.
    #[must_use]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Returns the controller for `address`, building it on first use.
    ///
    /// `fallback_ip` only matters for the call that builds the controller.
    #[must_use]
    pub fn get_or_create(
        &self,
        address: DeviceAddress,
        fallback_ip: Option<IpAddr>,
    ) -> Arc<Controller> {
        self.get_or_create_with(address, || {
            Controller::new(address, fallback_ip, &self.settings)
        })
    }

    /// Returns the controller for `address`, building it with `build` on
    /// first use.
    ///
    /// `build` runs at most once per address, even under concurrent calls.
    pub fn get_or_create_with<F>(&self, address: DeviceAddress, build: F) -> Arc<Controller>
    where
        F: FnOnce() -> Controller,
    {
        let cell = {
            let mut controllers = self.controllers.lock();
            Arc::clone(controllers.entry(address).or_default())
        };
        let controller = cell.get_or_init(|| {
            tracing::debug!(mac = %address, "Registering controller");
            Arc::new(build())
        });
        Arc::clone(controller)
    }

    /// Returns the controller for `address` if one was built.
    #[must_use]
    pub fn get(&self, address: &DeviceAddress) -> Option<Arc<Controller>> {
        let cell = self.controllers.lock().get(address).cloned()?;
        cell.get().cloned()
    }

    /// Returns the number of built controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers
            .lock()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    /// Returns `true` if no controller was built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the built controllers.
    #[must_use]
    pub fn controllers(&self) -> Vec<Arc<Controller>> {
        self.controllers
            .lock()
            .values()
            .filter_map(|cell| cell.get().cloned())
            .collect()
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new(ControllerSettings::default())
    }
}
