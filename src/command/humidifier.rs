// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Humidifier commands (`altrason-cmd`).

use serde_json::Value;

use crate::command::Command;
use crate::types::TargetId;

/// Action of an [`AltrasonCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AltrasonAction {
    /// Read every attribute in one reply.
    QueryAll,
    /// Set the operation mode.
    SetMode,
    /// Set the blower (fan) speed.
    SetBlowerSpeed,
    /// Set the target humidity.
    SetTargetHumidity,
    /// Set the off timer in hours (0 disables).
    SetOffTimer,
}

impl AltrasonAction {
    /// Returns the wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QueryAll => "query-all",
            Self::SetMode => "set-mode",
            Self::SetBlowerSpeed => "set-blower-speed",
            Self::SetTargetHumidity => "set-target-humidity",
            Self::SetOffTimer => "set-offtimer",
        }
    }
}

/// An `altrason-cmd` request for the humidifier with bus id `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct AltrasonCommand {
    target: TargetId,
    action: AltrasonAction,
    id: String,
    value: Option<Value>,
    timeout_ms: Option<u32>,
}

impl AltrasonCommand {
    /// Bus timeout the gateway applies to `query-all`.
    pub const QUERY_TIMEOUT_MS: u32 = 1000;

    /// Creates a command without a value.
    #[must_use]
    pub fn new(target: TargetId, action: AltrasonAction, id: impl Into<String>) -> Self {
        Self {
            target,
            action,
            id: id.into(),
            value: None,
            timeout_ms: None,
        }
    }

    /// Reads all attributes at once.
    #[must_use]
    pub fn query_all(target: TargetId, id: impl Into<String>) -> Self {
        let mut cmd = Self::new(target, AltrasonAction::QueryAll, id);
        cmd.timeout_ms = Some(Self::QUERY_TIMEOUT_MS);
        cmd
    }

    /// Attaches a value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl Command for AltrasonCommand {
    fn name(&self) -> &'static str {
        "altrason-cmd"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        let mut params = vec![
            ("target_id", self.target.into()),
            ("action", Value::from(self.action.as_str())),
            ("id", Value::from(self.id.as_str())),
        ];
        if let Some(value) = &self.value {
            params.push(("value", value.clone()));
        }
        if let Some(ms) = self.timeout_ms {
            params.push(("timeout_ms", ms.into()));
        }
        params
    }
}
