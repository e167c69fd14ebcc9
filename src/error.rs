// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `CylTek` library.
//!
//! Every device operation reports failure through [`Error`]; nothing in the
//! library panics because one gateway misbehaves. The categories follow the
//! way a command can fail on its way to a gateway and back:
//!
//! - [`ProtocolError`]: no connection within the deadline, or a reply that
//!   does not correlate with the request.
//! - [`ParseError`]: a frame or payload that cannot be decoded.
//! - [`DeviceError`]: the gateway answered with a non-zero `code`, or the
//!   unit behind it did not take a setting.
//! - [`ConfigError`]: a device behavior profile is missing or invalid.
//! - [`ValueError`]: the caller passed a value the device cannot accept.

use std::path::PathBuf;

use thiserror::Error;

use crate::protocol::Response;

/// Error code reported by a gateway when the addressed sub-device is offline.
pub const OFFLINE_CODE: i64 = 13;

/// Reason string accompanying [`OFFLINE_CODE`].
pub const OFFLINE_REASON: &str = "device offline(unavailable)";

/// Error code reported by a gateway for an attribute the channel lacks.
pub const UNSUPPORTED_ATTRIBUTE_CODE: i64 = 15;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The gateway reported an error or cannot serve the request.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// A device behavior profile could not be used.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The channel bound to this role is 0 (not configured).
    ///
    /// Returned without touching the network.
    #[error("channel for role '{role}' is not configured")]
    ChannelDisabled {
        /// The channel role, e.g. `on-off` or `level`.
        role: String,
    },

    /// A blocking worker did not complete.
    #[error("worker task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Returns the decoded gateway reply attached to this error, if any.
    ///
    /// Desynchronized replies and device-reported errors both carry the
    /// reply so callers can inspect `code` and `reason`.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Protocol(ProtocolError::NotSynchronized { response })
            | Self::Device(DeviceError::Rejected { response, .. }) => Some(response),
            _ => None,
        }
    }

    /// Returns `true` if the gateway reported the sub-device as offline.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.response().is_some_and(Response::is_offline)
    }

    /// Returns `true` if the command never reached the gateway in time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::Timeout(_)))
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A hardware address could not be parsed.
    #[error("invalid device address: {0}")]
    InvalidAddress(String),

    /// A mode name is not part of the device's mode table.
    #[error("unknown {table} entry: {name}")]
    UnknownMode {
        /// The table that was consulted, e.g. `operation_modes`.
        table: &'static str,
        /// The name the caller asked for.
        name: String,
    },

    /// A floating point value is NaN or infinite.
    #[error("value {0} is not a finite number")]
    NotFinite(f64),
}

/// Errors related to transport and request/response correlation.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// No connection could be opened to the gateway.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No complete reply arrived before the deadline.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Socket error while exchanging a frame.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The reply does not echo the request's `target-id`, `cmd` or `attr`.
    #[error("response not synchronized with request: {response}")]
    NotSynchronized {
        /// The reply that was received instead.
        response: Box<Response>,
    },
}

/// Errors related to parsing gateway replies.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload between the frame sentinels is not a JSON object.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors reported by, or about, a gateway device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The gateway replied with a non-zero `code`.
    #[error("command rejected with code {code}: {reason}")]
    Rejected {
        /// The gateway error code.
        code: i64,
        /// The gateway's `reason` string (empty when absent).
        reason: String,
        /// The full decoded reply.
        response: Box<Response>,
    },

    /// Device does not support the requested capability.
    #[error("device does not support {capability}")]
    UnsupportedCapability {
        /// The capability that is not supported.
        capability: String,
    },

    /// The controller never completed its bootstrap queries.
    #[error("controller {0} is not initialized")]
    NotInitialized(String),

    /// Offline recovery was attempted too many times.
    #[error("device still offline after {0} recovery attempts")]
    RecoveryExhausted(u8),

    /// The bus bridge flags the indoor unit as not communicating.
    #[error("indoor unit {0} is not communicating")]
    Unreachable(u16),

    /// Read-back after writing still shows the old settings.
    #[error("indoor unit {id} did not apply the settings after {attempts} writes")]
    NotApplied {
        /// The indoor unit id.
        id: u16,
        /// Number of writes sent.
        attempts: u8,
    },
}

/// Errors related to device behavior profiles.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The profile file does not exist.
    #[error("profile not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The profile file could not be read.
    #[error("cannot read profile {}: {source}", path.display())]
    Io {
        /// The profile path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The profile is not valid JSON for this device kind.
    #[error("invalid profile {}: {source}", path.display())]
    Invalid {
        /// The profile path.
        path: PathBuf,
        /// The underlying deserialization error.
        source: serde_json::Error,
    },

    /// A table the device needs has no entry for the requested key.
    #[error("profile table '{table}' has no entry for '{key}'")]
    MissingEntry {
        /// The table name, e.g. `temperature_range`.
        table: &'static str,
        /// The missing key, e.g. the model nameplate.
        key: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
