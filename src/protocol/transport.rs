// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stream transport to a gateway.
//!
//! Every command runs over its own short-lived TCP connection: connect,
//! write one frame, read the reply, close. Nothing here retries a command;
//! the only loop is the connect poll, which keeps trying every
//! [`TcpConnector::DEFAULT_RETRY_INTERVAL`] until the deadline.
//!
//! The [`Connector`] and [`Connection`] traits are the seam tests use to
//! replace the network with a recording stub.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Ipv6Addr, SocketAddr, SocketAddrV6, TcpStream};
use std::time::{Duration, Instant};

use crate::error::ProtocolError;
use crate::protocol::codec::FRAME_END;

// ============================================================================
// Endpoint
// ============================================================================

/// Network location of a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// A routable IPv4 or IPv6 address.
    Ip(IpAddr),
    /// An IPv6 link-local address scoped to a network interface.
    LinkLocal {
        /// The `fe80::/64` address.
        addr: Ipv6Addr,
        /// Interface name or numeric scope id, e.g. `eth0`.
        zone: String,
    },
}

impl Endpoint {
    /// Returns the socket address for `port`.
    ///
    /// A link-local zone is resolved to its interface index; an unknown
    /// interface yields scope id 0 and the connect attempt simply fails.
    #[must_use]
    pub fn socket_addr(&self, port: u16) -> SocketAddr {
        match self {
            Self::Ip(ip) => SocketAddr::new(*ip, port),
            Self::LinkLocal { addr, zone } => {
                SocketAddr::V6(SocketAddrV6::new(*addr, port, 0, scope_id(zone)))
            }
        }
    }

    /// Returns `true` for an IPv4 endpoint.
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Self::Ip(IpAddr::V4(_)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{ip}"),
            Self::LinkLocal { addr, zone } => write!(f, "{addr}%{zone}"),
        }
    }
}

impl From<IpAddr> for Endpoint {
    fn from(ip: IpAddr) -> Self {
        Self::Ip(ip)
    }
}

fn scope_id(zone: &str) -> u32 {
    if let Ok(index) = zone.parse() {
        return index;
    }
    std::fs::read_to_string(format!("/sys/class/net/{zone}/ifindex"))
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

// ============================================================================
// Traits
// ============================================================================

/// How a reply is read off the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Stop as soon as the buffer ends with the closing sentinel.
    #[default]
    Terminator,
    /// Keep reading until the peer goes quiet after a closing sentinel, the
    /// peer closes, or the deadline passes. Used when a reply may span
    /// several segments, such as a full `enumerate`.
    Window,
}

/// Opens connections to a gateway.
pub trait Connector: Send + Sync + fmt::Debug {
    /// Opens a connection, polling until `timeout` elapses.
    ///
    /// Returns `None` when no connection could be established in time.
    fn connect(
        &self,
        endpoint: &Endpoint,
        port: u16,
        timeout: Duration,
    ) -> Option<Box<dyn Connection>>;
}

/// One open stream to a gateway.
pub trait Connection: Send {
    /// Writes `frame` and, unless `just_send`, reads the reply.
    ///
    /// With `just_send` the returned string is empty.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Timeout` if no byte arrived before the
    /// deadline, or `ProtocolError::Io` on a socket error.
    fn exchange(
        &mut self,
        frame: &str,
        just_send: bool,
        timeout: Duration,
        mode: ReadMode,
    ) -> Result<String, ProtocolError>;

    /// Closes the connection.
    fn close(&mut self);
}

// ============================================================================
// TCP implementation
// ============================================================================

/// [`Connector`] over plain TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    retry_interval: Duration,
}

impl TcpConnector {
    /// Delay between two connect attempts.
    pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

    /// Creates a connector with the default retry interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            retry_interval: Self::DEFAULT_RETRY_INTERVAL,
        }
    }

    /// Sets the delay between connect attempts.
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for TcpConnector {
    fn connect(
        &self,
        endpoint: &Endpoint,
        port: u16,
        timeout: Duration,
    ) -> Option<Box<dyn Connection>> {
        let addr = endpoint.socket_addr(port);
        let start = Instant::now();

        loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(stream) => {
                    tracing::debug!(
                        host = %endpoint,
                        port,
                        elapsed_ms = start.elapsed().as_millis(),
                        "Connected to gateway"
                    );
                    return Some(Box::new(TcpConnection { stream }));
                }
                Err(e) => {
                    tracing::debug!(host = %endpoint, port, error = %e, "Connect attempt failed");
                }
            }
            let remaining = timeout.saturating_sub(start.elapsed());
            std::thread::sleep(self.retry_interval.min(remaining));
        }

        tracing::debug!(host = %endpoint, port, "Gateway unreachable");
        None
    }
}

/// Idle gap that ends a [`ReadMode::Window`] read once a frame is complete.
const WINDOW_IDLE: Duration = Duration::from_millis(200);

struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    fn read_reply(&mut self, timeout: Duration, mode: ReadMode) -> Result<String, ProtocolError> {
        let deadline = Instant::now() + timeout;
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let complete = ends_with_terminator(&buf);
            let wait = if mode == ReadMode::Window && complete {
                remaining.min(WINDOW_IDLE)
            } else {
                remaining
            };
            self.stream.set_read_timeout(Some(wait))?;

            match self.stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    if mode == ReadMode::Terminator && ends_with_terminator(&buf) {
                        break;
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    if complete {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if buf.is_empty() {
            return Err(ProtocolError::Timeout(millis(timeout)));
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Connection for TcpConnection {
    fn exchange(
        &mut self,
        frame: &str,
        just_send: bool,
        timeout: Duration,
        mode: ReadMode,
    ) -> Result<String, ProtocolError> {
        self.stream.set_write_timeout(Some(timeout))?;
        self.stream.write_all(frame.as_bytes())?;
        self.stream.flush()?;
        if just_send {
            return Ok(String::new());
        }
        self.read_reply(timeout, mode)
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
    }
}

fn ends_with_terminator(buf: &[u8]) -> bool {
    buf.trim_ascii_end().ends_with(FRAME_END.as_bytes())
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
