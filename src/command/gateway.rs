// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway-level queries: configuration, capability manifest, attributes.

use serde_json::Value;

use crate::command::Command;
use crate::protocol::ReadMode;
use crate::types::TargetId;

/// Fetches the gateway configuration blob (`product-id`, `server-version`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Configure;

impl Command for Configure {
    fn name(&self) -> &'static str {
        "configure"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![("pretty_print", Value::Bool(false))]
    }
}

/// Fetches the capability manifest.
///
/// With `refresh` the gateway re-scans its sub-devices first; this is the
/// offline-recovery command and is normally sent fire-and-forget.
///
/// # Examples
///
/// ```
/// use cyltek_lib::command::{Command, Enumerate};
/// use cyltek_lib::protocol::ReadMode;
///
/// let cmd = Enumerate::refresh();
/// assert_eq!(cmd.name(), "enumerate");
/// assert_eq!(cmd.read_mode(), ReadMode::Window);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumerate {
    refresh: bool,
}

impl Enumerate {
    /// Reads the manifest the gateway already holds.
    #[must_use]
    pub const fn cached() -> Self {
        Self { refresh: false }
    }

    /// Forces the gateway to rebuild its manifest.
    #[must_use]
    pub const fn refresh() -> Self {
        Self { refresh: true }
    }
}

impl Command for Enumerate {
    fn name(&self) -> &'static str {
        "enumerate"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![("refresh", Value::Bool(self.refresh))]
    }

    fn read_mode(&self) -> ReadMode {
        ReadMode::Window
    }
}

/// Reads one attribute of a channel, e.g. `on-off-state` or `current-level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAttr {
    target: TargetId,
    attr: String,
}

impl ReadAttr {
    /// Creates the command.
    #[must_use]
    pub fn new(target: TargetId, attr: impl Into<String>) -> Self {
        Self {
            target,
            attr: attr.into(),
        }
    }

    /// Returns the attribute name.
    #[must_use]
    pub fn attr(&self) -> &str {
        &self.attr
    }
}

impl Command for ReadAttr {
    fn name(&self) -> &'static str {
        "read-attr"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("target_id", self.target.into()),
            ("attr", Value::String(self.attr.clone())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_disables_pretty_print() {
        assert_eq!(Configure.params(), vec![("pretty_print", Value::Bool(false))]);
        assert_eq!(Configure.read_mode(), ReadMode::Terminator);
    }

    #[test]
    fn enumerate_refresh_flag() {
        assert_eq!(Enumerate::cached().params()[0].1, Value::Bool(false));
        assert_eq!(Enumerate::refresh().params()[0].1, Value::Bool(true));
    }
}
