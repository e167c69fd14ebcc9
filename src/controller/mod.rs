// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One physical gateway.
//!
//! A [`Controller`] resolves where a gateway lives, fetches its
//! configuration, capability manifest and model id once, and then hands
//! out commands through its [`CommandChannel`]. Construction never fails:
//! a gateway that cannot be reached still yields a controller, marked as not
//! initialized, so devices bound to it report themselves unavailable instead
//! of disappearing.

mod manifest;

pub use manifest::CapabilityManifest;

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::command::{Command, Configure, Enumerate, ReadAttr};
use crate::config::StaticHosts;
use crate::error::Result;
use crate::protocol::{
    CommandChannel, Connector, DEFAULT_PORT, Endpoint, Response, SendOptions, TcpConnector,
};
use crate::types::{Channel, DeviceAddress, TargetId};

/// Model id reported before (or without) a successful bootstrap.
pub const UNKNOWN_MODEL: &str = "UNKNOWN";

// ============================================================================
// ControllerSettings
// ============================================================================

/// Connection settings shared by every controller of a registry.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cyltek_lib::controller::ControllerSettings;
///
/// let settings = ControllerSettings::default()
///     .with_interface("br0")
///     .with_command_timeout(Duration::from_secs(5));
/// assert_eq!(settings.port(), 9528);
/// assert_eq!(settings.interface(), Some("br0"));
/// ```
#[derive(Clone)]
pub struct ControllerSettings {
    port: u16,
    interface: Option<String>,
    static_hosts: StaticHosts,
    connect_timeout: Duration,
    command_timeout: Duration,
    enumerate_timeout: Duration,
    connector: Arc<dyn Connector>,
}

impl ControllerSettings {
    /// Default network interface for link-local addresses.
    pub const DEFAULT_INTERFACE: &'static str = "eth0";
    /// Default connect deadline.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default command deadline.
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3);
    /// Default deadline of the bootstrap `enumerate`.
    pub const DEFAULT_ENUMERATE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates settings with defaults and the TCP transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT,
            interface: Some(Self::DEFAULT_INTERFACE.to_string()),
            static_hosts: StaticHosts::default(),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            command_timeout: Self::DEFAULT_COMMAND_TIMEOUT,
            enumerate_timeout: Self::DEFAULT_ENUMERATE_TIMEOUT,
            connector: Arc::new(TcpConnector::new()),
        }
    }

    /// Sets the gateway port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the interface link-local addresses are scoped to.
    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Disables link-local resolution; gateways without a static override
    /// are reached through the caller-supplied IP.
    #[must_use]
    pub fn without_link_local(mut self) -> Self {
        self.interface = None;
        self
    }

    /// Sets the static MAC to IP overrides.
    #[must_use]
    pub fn with_static_hosts(mut self, hosts: StaticHosts) -> Self {
        self.static_hosts = hosts;
        self
    }

    /// Adds one static override.
    #[must_use]
    pub fn with_static_host(mut self, address: DeviceAddress, ip: IpAddr) -> Self {
        self.static_hosts = self.static_hosts.with(address, ip);
        self
    }

    /// Sets the connect deadline.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the default command deadline.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the deadline of the bootstrap `enumerate`.
    #[must_use]
    pub fn with_enumerate_timeout(mut self, timeout: Duration) -> Self {
        self.enumerate_timeout = timeout;
        self
    }

    /// Replaces the transport.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the link-local interface, if enabled.
    #[must_use]
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Returns the static overrides.
    #[must_use]
    pub fn static_hosts(&self) -> &StaticHosts {
        &self.static_hosts
    }

    /// Returns the connect deadline.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the default command deadline.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Returns the bootstrap `enumerate` deadline.
    #[must_use]
    pub fn enumerate_timeout(&self) -> Duration {
        self.enumerate_timeout
    }

    /// Resolves the endpoint of `address`.
    ///
    /// Order: static override, then the EUI-64 link-local address scoped to
    /// the interface, then `fallback`. With link-local disabled and no
    /// fallback the unscoped link-local address is used.
    #[must_use]
    pub fn resolve(&self, address: &DeviceAddress, fallback: Option<IpAddr>) -> Endpoint {
        if let Some(ip) = self.static_hosts.get(address) {
            return Endpoint::Ip(ip);
        }
        match (&self.interface, fallback) {
            (Some(zone), _) => Endpoint::LinkLocal {
                addr: address.link_local(),
                zone: zone.clone(),
            },
            (None, Some(ip)) => Endpoint::Ip(ip),
            (None, None) => Endpoint::Ip(IpAddr::V6(address.link_local())),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ControllerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerSettings")
            .field("port", &self.port)
            .field("interface", &self.interface)
            .field("static_hosts", &self.static_hosts.len())
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .field("enumerate_timeout", &self.enumerate_timeout)
            .field("connector", &self.connector)
            .finish()
    }
}

// ============================================================================
// Controller
// ============================================================================

/// A gateway endpoint plus the data it reported at bootstrap.
///
/// Immutable once built; share it behind an [`Arc`].
#[derive(Debug)]
pub struct Controller {
    address: DeviceAddress,
    ip: Option<IpAddr>,
    alias: String,
    channel: CommandChannel,
    command_timeout: Duration,
    config: Map<String, Value>,
    manifest: CapabilityManifest,
    model_id: String,
    initialized: bool,
}

impl Controller {
    /// Builds a controller and runs the bootstrap queries.
    ///
    /// `fallback_ip` is used when neither a static override nor link-local
    /// resolution applies. The controller is initialized only if the gateway
    /// was reachable and `configure`, `enumerate` and the model-id read all
    /// succeeded.
    #[must_use]
    pub fn new(
        address: DeviceAddress,
        fallback_ip: Option<IpAddr>,
        settings: &ControllerSettings,
    ) -> Self {
        let endpoint = settings.resolve(&address, fallback_ip);
        let ip = settings.static_hosts().get(&address).or(fallback_ip);
        let channel = CommandChannel::new(
            Arc::clone(&settings.connector),
            endpoint,
            settings.port,
            settings.connect_timeout,
        );

        let mut controller = Self {
            address,
            ip,
            alias: address.to_string(),
            channel,
            command_timeout: settings.command_timeout,
            config: Map::new(),
            manifest: CapabilityManifest::default(),
            model_id: UNKNOWN_MODEL.to_string(),
            initialized: false,
        };

        if controller.channel.probe() {
            controller.initialized = controller.bootstrap(settings.enumerate_timeout);
        }

        tracing::debug!(
            mac = %controller.address,
            host = %controller.channel.endpoint(),
            initialized = controller.initialized,
            model = %controller.model(),
            "Controller created"
        );
        controller
    }

    fn bootstrap(&mut self, enumerate_timeout: Duration) -> bool {
        match self.channel.send_with(&Configure, self.options()) {
            Ok(reply) => self.config = reply.fields,
            Err(e) => {
                tracing::warn!(mac = %self.address, error = %e, "configure failed");
                return false;
            }
        }

        let enumerate = self
            .channel
            .send_with(
                &Enumerate::cached(),
                SendOptions::new().with_timeout(enumerate_timeout),
            )
            .and_then(|reply| Ok(CapabilityManifest::from_response(&reply)?));
        match enumerate {
            Ok(manifest) => self.manifest = manifest,
            Err(e) => {
                tracing::warn!(mac = %self.address, error = %e, "enumerate failed");
                return false;
            }
        }

        let model = ReadAttr::new(self.target(Channel::new(1)), "model-id");
        match self.channel.send_with(&model, self.options()) {
            Ok(reply) => {
                if let Some(id) = reply.value() {
                    self.model_id = id.as_str().map_or_else(|| id.to_string(), str::to_string);
                }
                true
            }
            Err(e) => {
                tracing::warn!(mac = %self.address, error = %e, "model-id read failed");
                false
            }
        }
    }

    fn options(&self) -> SendOptions {
        SendOptions::new().with_timeout(self.command_timeout)
    }

    /// Returns the gateway hardware address.
    #[must_use]
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Returns the resolved endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        self.channel.endpoint()
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.channel.port()
    }

    /// Returns the IPv4/IPv6 address from a static override or the caller.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    /// Returns the display alias (the MAC address).
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Returns the configuration blob from `configure`.
    #[must_use]
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Returns the capability manifest from `enumerate`.
    #[must_use]
    pub fn manifest(&self) -> &CapabilityManifest {
        &self.manifest
    }

    /// Returns the model id, or `UNKNOWN`.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Returns `"<model id>, <product id>"`.
    #[must_use]
    pub fn model(&self) -> String {
        let product = self
            .config
            .get("product-id")
            .map_or_else(|| "None".to_string(), json_text);
        format!("{}, {product}", self.model_id)
    }

    /// Returns the firmware version from the configuration blob.
    #[must_use]
    pub fn server_version(&self) -> Option<String> {
        self.config.get("server-version").map(json_text)
    }

    /// Returns `true` if every bootstrap query succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the target id of `channel` on this gateway.
    #[must_use]
    pub fn target(&self, channel: Channel) -> TargetId {
        TargetId::new(self.address, channel)
    }

    /// Checks that a connection can be opened.
    #[must_use]
    pub fn try_connect(&self) -> bool {
        self.channel.probe()
    }

    /// Sends a command with the default deadline.
    ///
    /// # Errors
    ///
    /// See [`CommandChannel::send_with`].
    pub fn send(&self, command: &dyn Command) -> Result<Response> {
        self.channel.send_with(command, self.options())
    }

    /// Sends a command with explicit options.
    ///
    /// # Errors
    ///
    /// See [`CommandChannel::send_with`].
    pub fn send_with(&self, command: &dyn Command, options: SendOptions) -> Result<Response> {
        self.channel.send_with(command, options)
    }

    /// Fires the forced `enumerate` that makes the gateway re-scan offline
    /// sub-devices. The reply is not awaited.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Timeout` if no connection could be opened.
    pub fn refresh_capabilities(&self) -> Result<()> {
        self.channel
            .send_with(&Enumerate::refresh(), self.options().with_just_send(true))
            .map(|_| ())
    }
}

fn json_text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Connection;

    #[derive(Debug)]
    struct Unreachable;

    impl Connector for Unreachable {
        fn connect(&self, _: &Endpoint, _: u16, _: Duration) -> Option<Box<dyn Connection>> {
            None
        }
    }

    fn mac() -> DeviceAddress {
        "D0:14:11:B0:01:DD".parse().unwrap()
    }

    #[test]
    fn resolve_prefers_static_override() {
        let ip: IpAddr = "192.168.10.140".parse().unwrap();
        let settings = ControllerSettings::new().with_static_host(mac(), ip);
        assert_eq!(settings.resolve(&mac(), None), Endpoint::Ip(ip));
    }

    #[test]
    fn resolve_link_local_with_zone() {
        let settings = ControllerSettings::new();
        let endpoint = settings.resolve(&mac(), Some("10.0.0.9".parse().unwrap()));
        assert_eq!(endpoint.to_string(), "fe80::d214:11ff:feb0:1dd%eth0");
    }

    #[test]
    fn resolve_fallback_ip() {
        let settings = ControllerSettings::new().without_link_local();
        let ip: IpAddr = "10.0.0.9".parse().unwrap();
        assert_eq!(settings.resolve(&mac(), Some(ip)), Endpoint::Ip(ip));
    }

    #[test]
    fn unreachable_gateway_is_uninitialized() {
        let settings = ControllerSettings::new().with_connector(Arc::new(Unreachable));
        let controller = Controller::new(mac(), None, &settings);
        assert!(!controller.is_initialized());
        assert_eq!(controller.model_id(), UNKNOWN_MODEL);
        assert_eq!(controller.model(), "UNKNOWN, None");
        assert_eq!(controller.alias(), "D0:14:11:B0:01:DD");
        assert!(controller.manifest().is_empty());
        assert!(!controller.try_connect());
    }

    #[test]
    fn static_override_sets_ip() {
        let ip: IpAddr = "192.168.10.140".parse().unwrap();
        let settings = ControllerSettings::new()
            .with_static_host(mac(), ip)
            .with_connector(Arc::new(Unreachable));
        let controller = Controller::new(mac(), None, &settings);
        assert_eq!(controller.ip(), Some(ip));
        assert_eq!(controller.endpoint(), &Endpoint::Ip(ip));
    }
}
