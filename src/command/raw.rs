// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw serial pass-through.

use serde_json::{Value, json};

use crate::command::Command;
use crate::protocol::ReadMode;
use crate::types::TargetId;

/// Writes raw bytes to the serial bus behind a channel.
///
/// The gateway answers with the bus reply split over `other[*].raw-data`
/// fragments, so the reply is read with [`ReadMode::Window`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyRawData {
    target: TargetId,
    raw_data: Vec<u8>,
}

impl SupplyRawData {
    /// Creates the command.
    #[must_use]
    pub fn new(target: TargetId, raw_data: Vec<u8>) -> Self {
        Self { target, raw_data }
    }
}

impl Command for SupplyRawData {
    fn name(&self) -> &'static str {
        "supply-raw-data"
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("target_id", self.target.into()),
            ("raw_data", json!(self.raw_data)),
        ]
    }

    fn read_mode(&self) -> ReadMode {
        ReadMode::Window
    }
}
