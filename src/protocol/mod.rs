// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol for CYL-Tek gateways.
//!
//! Gateways listen on TCP port 9528 and exchange `#:{json}:#` frames.
//!
//! # Layers
//!
//! - [`codec`]: frame encoding, parameter name translation, lenient decode
//! - [`Response`]: a decoded reply with typed correlation fields
//! - [`Connector`] / [`Connection`]: the stream transport seam, with
//!   [`TcpConnector`] as the real implementation
//! - [`CommandChannel`]: one fresh connection per command, reply
//!   correlation, optional resend until the deadline
//! - [`modbus`]: register layout of the RS-485 air conditioner bridge

pub mod codec;
mod channel;
pub mod modbus;
mod response;
mod transport;

pub use channel::{CommandChannel, SendOptions};
pub use codec::{Request, decode, encode, wire_key};
pub use modbus::decode16bit;
pub use response::Response;
pub use transport::{Connection, Connector, Endpoint, ReadMode, TcpConnector};

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 9528;
