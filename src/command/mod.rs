// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway command definitions.
//!
//! Every request the library sends is one of the typed commands below. A
//! command knows its wire name and its parameters; the
//! [`codec`](crate::protocol::codec) turns it into a frame.
//!
//! # Available Commands
//!
//! | Command Type | Wire name | Purpose |
//! |-------------|-----------|---------|
//! | [`Configure`] | `configure` | Fetch the gateway configuration blob |
//! | [`Enumerate`] | `enumerate` | Fetch (or force refresh of) the capability manifest |
//! | [`ReadAttr`] | `read-attr` | Read one attribute of a channel |
//! | [`SwitchOn`] / [`SwitchOff`] | `switch-on` / `switch-off` | Drive a channel high or low |
//! | [`LevelMoveTo`] | `level-move-to` | Move a level channel (dimmer, cover) |
//! | [`DaikinCommand`] | `daikin-cmd` | Air conditioner control through the bridge firmware |
//! | [`ModbusCommand`] | `modbus-cmd` | Raw register read/write on the RS-485 bus |
//! | [`AltrasonCommand`] | `altrason-cmd` | Humidifier control |
//! | [`SupplyRawData`] | `supply-raw-data` | Pass raw bytes to the serial bus |
//!
//! # Examples
//!
//! ```
//! use cyltek_lib::command::{Command, ReadAttr};
//! use cyltek_lib::types::{Channel, DeviceAddress, TargetId};
//!
//! let mac: DeviceAddress = "D0:14:11:B0:01:DD".parse().unwrap();
//! let cmd = ReadAttr::new(TargetId::new(mac, Channel::new(3)), "on-off-state");
//!
//! assert_eq!(cmd.name(), "read-attr");
//! assert_eq!(
//!     cyltek_lib::protocol::encode(&cmd),
//!     r##"#:{"cmd":"read-attr","attr":"on-off-state","target-id":"0000d01411b001dd:3"}:#"##
//! );
//! ```

mod gateway;
mod humidifier;
mod hvac;
mod io;
mod raw;

pub use gateway::{Configure, Enumerate, ReadAttr};
pub use humidifier::{AltrasonAction, AltrasonCommand};
pub use hvac::{DaikinAction, DaikinCommand, ModbusCommand};
pub use io::{LevelMoveTo, SwitchOff, SwitchOn};
pub use raw::SupplyRawData;

use serde_json::Value;

use crate::protocol::ReadMode;

/// A command that can be sent to a gateway.
pub trait Command {
    /// Returns the wire command name, e.g. `"read-attr"`.
    fn name(&self) -> &'static str;

    /// Returns the parameters in caller spelling.
    ///
    /// Underscored names are translated to their hyphenated wire form by
    /// the codec.
    fn params(&self) -> Vec<(&'static str, Value)>;

    /// Returns how the reply should be read.
    fn read_mode(&self) -> ReadMode {
        ReadMode::Terminator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::{Request, decode_request};
    use crate::types::{Channel, DeviceAddress, TargetId};
    use serde_json::json;

    fn target(ch: u16) -> TargetId {
        let mac: DeviceAddress = "D0:14:11:B0:11:E5".parse().unwrap();
        TargetId::new(mac, Channel::new(ch))
    }

    /// Every command of the vocabulary survives encode then decode with its
    /// parameters intact, modulo key translation.
    #[test]
    fn vocabulary_round_trip() {
        let commands: Vec<Box<dyn Command>> = vec![
            Box::new(Configure),
            Box::new(Enumerate::cached()),
            Box::new(Enumerate::refresh()),
            Box::new(ReadAttr::new(target(1), "model-id")),
            Box::new(SwitchOn::new(target(2))),
            Box::new(SwitchOff::new(target(2))),
            Box::new(LevelMoveTo::new(target(4), 80, 50)),
            Box::new(DaikinCommand::set_temperature(target(1), 3, 23.5)),
            Box::new(ModbusCommand::read_unit(target(1), 1, 3)),
            Box::new(ModbusCommand::write_unit(target(1), 1, 3, [0x61, 0, 1, 0, 230, 0])),
            Box::new(AltrasonCommand::query_all(target(1), "A1")),
            Box::new(SupplyRawData::new(target(1), b"A1 HUMID\n".to_vec())),
        ];
        for cmd in &commands {
            let request = Request::from_command(cmd.as_ref());
            let decoded = decode_request(&request.encode()).unwrap();
            assert_eq!(decoded.cmd(), cmd.name());
            assert_eq!(decoded.params().len(), cmd.params().len());
            for (key, value) in cmd.params() {
                let wire = crate::protocol::wire_key(key);
                assert_eq!(decoded.param(wire), Some(&value), "{} {key}", cmd.name());
            }
        }
    }

    #[test]
    fn modbus_read_frame() {
        let cmd = ModbusCommand::read_unit(target(1), 1, 0);
        let req = Request::from_command(&cmd);
        assert_eq!(req.param("start-addr"), Some(&json!(2000)));
        assert_eq!(req.param("slave-addr"), Some(&json!(1)));
        assert_eq!(req.param("write-data"), Some(&json!([])));
        assert_eq!(req.param("mode"), Some(&json!("rtu")));
        assert_eq!(req.param("function"), Some(&json!(3)));
        assert_eq!(req.param("number"), Some(&json!(6)));
    }
}
