// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Role to channel mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Channel;

/// Channels a device model drives, keyed by role (`on-off`, `level`,
/// `open`, `default`, ...).
///
/// Roles are kept sorted by name, so iteration order does not depend on
/// how the map was built. A role that is missing reads as
/// [`Channel::DISABLED`].
///
/// # Examples
///
/// ```
/// use cyltek_lib::device::ChannelMap;
/// use cyltek_lib::types::Channel;
///
/// let channels: ChannelMap = [("on-off", 3), ("level", 0)].into();
/// assert_eq!(channels.get("on-off"), Channel::new(3));
/// assert!(channels.get("level").is_disabled());
/// assert!(channels.get("missing").is_disabled());
/// assert_eq!(channels.joined(), "0:3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelMap {
    channels: BTreeMap<String, Channel>,
}

impl ChannelMap {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `role` to `channel`.
    #[must_use]
    pub fn with(mut self, role: impl Into<String>, channel: impl Into<Channel>) -> Self {
        self.insert(role, channel);
        self
    }

    /// Binds `role` to `channel`, replacing any previous binding.
    pub fn insert(&mut self, role: impl Into<String>, channel: impl Into<Channel>) {
        self.channels.insert(role.into(), channel.into());
    }

    /// Returns the channel bound to `role`.
    #[must_use]
    pub fn get(&self, role: &str) -> Channel {
        self.channels.get(role).copied().unwrap_or(Channel::DISABLED)
    }

    /// Returns `true` if `role` is bound to a non-zero channel.
    #[must_use]
    pub fn is_enabled(&self, role: &str) -> bool {
        !self.get(role).is_disabled()
    }

    /// Iterates `(role, channel)` pairs in role order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Channel)> {
        self.channels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the channel numbers joined by `:`, in ascending numeric
    /// order.
    #[must_use]
    pub fn joined(&self) -> String {
        let mut numbers: Vec<Channel> = self.channels.values().copied().collect();
        numbers.sort_unstable();
        numbers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no role is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl<S: Into<String>, C: Into<Channel>> FromIterator<(S, C)> for ChannelMap {
    fn from_iter<I: IntoIterator<Item = (S, C)>>(iter: I) -> Self {
        Self {
            channels: iter
                .into_iter()
                .map(|(role, ch)| (role.into(), ch.into()))
                .collect(),
        }
    }
}

impl<const N: usize> From<[(&str, u16); N]> for ChannelMap {
    fn from(pairs: [(&str, u16); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_by_role() {
        let a: ChannelMap = [("open", 1), ("close", 2), ("stop", 3)].into();
        let b = ChannelMap::new()
            .with("stop", 3u16)
            .with("open", 1u16)
            .with("close", 2u16);
        assert_eq!(a, b);
        let roles: Vec<_> = a.iter().map(|(r, _)| r).collect();
        assert_eq!(roles, vec!["close", "open", "stop"]);
    }

    #[test]
    fn joined_is_numeric_not_by_role() {
        let map: ChannelMap = [("open", 1), ("close", 2), ("stop", 3)].into();
        assert_eq!(map.joined(), "1:2:3");
        let wide: ChannelMap = [("a", 10), ("b", 9), ("c", 2)].into();
        assert_eq!(wide.joined(), "2:9:10");
    }

    #[test]
    fn enabled_roles() {
        let map: ChannelMap = [("on-off", 3), ("level", 0)].into();
        assert!(map.is_enabled("on-off"));
        assert!(!map.is_enabled("level"));
        assert!(!map.is_enabled("default"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn deserializes_from_object() {
        let map: ChannelMap = serde_json::from_str(r#"{"default": 1}"#).unwrap();
        assert_eq!(map.get("default"), Channel::new(1));
    }
}
