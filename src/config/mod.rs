// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device behavior profiles.
//!
//! Climates, humidifiers and covers are driven by JSON profiles that name
//! their modes, ranges and signal scripts. Profiles live under a root
//! directory, one file per model:
//!
//! ```text
//! <root>/climates/<name>.json
//! <root>/humidifiers/<name>.json
//! <root>/covers/<name>.json
//! ```
//!
//! A missing or invalid profile is a [`ConfigError`]; the device that needed
//! it is not created.

mod profile;
mod table;

pub use profile::{
    ClimateProfile, ClimateProtocol, CoverProfile, CoverType, HumidifierProfile, HumidifierType,
    HumidityRange, OperationSignals, SignalStep, TemperatureRange,
};
pub use table::ModeTable;

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ConfigError;
use crate::types::DeviceAddress;

/// Loads profiles from a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads `<root>/climates/<name>.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable or invalid.
    pub fn climate(&self, name: &str) -> Result<ClimateProfile, ConfigError> {
        self.load("climates", name)
    }

    /// Loads `<root>/humidifiers/<name>.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable or invalid.
    pub fn humidifier(&self, name: &str) -> Result<HumidifierProfile, ConfigError> {
        self.load("humidifiers", name)
    }

    /// Loads `<root>/covers/<name>.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable or invalid.
    pub fn cover(&self, name: &str) -> Result<CoverProfile, ConfigError> {
        self.load("covers", name)
    }

    fn load<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, ConfigError> {
        let path = self.root.join(kind).join(format!("{name}.json"));
        if !path.is_file() {
            tracing::error!(path = %path.display(), "Profile not found");
            return Err(ConfigError::NotFound(path));
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "Profile is invalid");
            ConfigError::Invalid { path, source }
        })
    }
}

/// Static MAC to IP overrides for gateways that are not reachable through
/// their link-local address.
///
/// # Examples
///
/// ```
/// use cyltek_lib::config::StaticHosts;
///
/// let hosts: StaticHosts =
///     serde_json::from_str(r#"{"D0:14:11:B0:01:DD": "192.168.10.140"}"#).unwrap();
/// let mac = "d0:14:11:b0:01:dd".parse().unwrap();
/// assert_eq!(hosts.get(&mac).unwrap().to_string(), "192.168.10.140");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StaticHosts {
    hosts: HashMap<DeviceAddress, IpAddr>,
}

impl StaticHosts {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override.
    #[must_use]
    pub fn with(mut self, address: DeviceAddress, ip: IpAddr) -> Self {
        self.hosts.insert(address, ip);
        self
    }

    /// Returns the override for `address`.
    #[must_use]
    pub fn get(&self, address: &DeviceAddress) -> Option<IpAddr> {
        self.hosts.get(address).copied()
    }

    /// Returns the number of overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns `true` if there are no overrides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
