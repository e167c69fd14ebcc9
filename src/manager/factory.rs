// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builds device models bound to registry controllers.

use std::sync::Arc;

use crate::config::ProfileStore;
use crate::device::{ChannelMap, Climate, Cover, Humidifier, Light, Switch};
use crate::error::Result;
use crate::types::DeviceAddress;

use super::ControllerRegistry;

/// Creates devices that share one controller per gateway.
///
/// Profiles are loaded from the [`ProfileStore`] by name on every call.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cyltek_lib::config::ProfileStore;
/// use cyltek_lib::controller::ControllerSettings;
/// use cyltek_lib::device::{IoThing, Power};
/// use cyltek_lib::manager::{ControllerRegistry, DeviceFactory};
///
/// let registry = Arc::new(ControllerRegistry::new(ControllerSettings::default()));
/// let factory = DeviceFactory::new(registry, ProfileStore::new("/etc/cyltek"));
/// let mac = "D0:14:11:B0:01:DD".parse()?;
///
/// let mut fan = factory.switch(mac, [("on-off", 2)].into());
/// let mut lamp = factory.light(mac, [("on-off", 3), ("level", 3)].into());
/// fan.turn_on()?;
/// lamp.turn_off()?;
/// # Ok::<(), cyltek_lib::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DeviceFactory {
    registry: Arc<ControllerRegistry>,
    profiles: ProfileStore,
}

impl DeviceFactory {
    /// Creates a factory over `registry` and `profiles`.
    #[must_use]
    pub fn new(registry: Arc<ControllerRegistry>, profiles: ProfileStore) -> Self {
        Self { registry, profiles }
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ControllerRegistry> {
        &self.registry
    }

    /// Returns the profile store.
    #[must_use]
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Creates a switch.
    #[must_use]
    pub fn switch(&self, address: DeviceAddress, channels: ChannelMap) -> Switch {
        Switch::new(self.registry.get_or_create(address, None), channels)
    }

    /// Creates a light.
    #[must_use]
    pub fn light(&self, address: DeviceAddress, channels: ChannelMap) -> Light {
        Light::new(self.registry.get_or_create(address, None), channels)
    }

    /// Creates a cover with the profile `profile`.
    ///
    /// # Errors
    ///
    /// The profile is missing or invalid.
    pub fn cover(
        &self,
        address: DeviceAddress,
        profile: &str,
        channels: ChannelMap,
    ) -> Result<Cover> {
        let profile = self.profiles.cover(profile)?;
        Ok(Cover::new(self.registry.get_or_create(address, None), profile, channels))
    }

    /// Creates a climate for indoor unit `ac_id` with the profile `profile`.
    ///
    /// # Errors
    ///
    /// The profile is missing or invalid.
    pub fn climate(
        &self,
        address: DeviceAddress,
        ac_id: u16,
        profile: &str,
        channels: ChannelMap,
        model: &str,
    ) -> Result<Climate> {
        let profile = self.profiles.climate(profile)?;
        Ok(Climate::new(
            self.registry.get_or_create(address, None),
            ac_id,
            profile,
            channels,
            model,
        ))
    }

    /// Creates a humidifier with bus id `id` and the profile `profile`.
    ///
    /// # Errors
    ///
    /// The profile is missing or invalid.
    pub fn humidifier(
        &self,
        address: DeviceAddress,
        id: &str,
        profile: &str,
        channels: ChannelMap,
        model: &str,
    ) -> Result<Humidifier> {
        let profile = self.profiles.humidifier(profile)?;
        Ok(Humidifier::new(
            self.registry.get_or_create(address, None),
            id,
            profile,
            channels,
            model,
        ))
    }
}
