// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated gateway shared by the integration tests.
//!
//! The gateway accepts one frame per connection, records it and answers
//! through a scripted handler. Connections that close without sending a
//! frame (connection probes) are ignored.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cyltek_lib::controller::{Controller, ControllerSettings};
use cyltek_lib::types::DeviceAddress;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};

pub const MAC: &str = "D0:14:11:B0:01:DD";
pub const PRODUCT_ID: &str = "CYL-RB4";
pub const MODEL_ID: &str = "CYL-GW-0400";
pub const SERVER_VERSION: &str = "2.3.1";

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// How the gateway answers one request.
pub enum Reply {
    /// Echo `cmd`, `target-id`, `attr` and `action`, add `code: 0`, then
    /// merge these members over the echo.
    Echo(Value),
    /// Send this object exactly as given.
    Exact(Value),
    /// Close without answering.
    Silent,
}

type Handler = dyn Fn(&Value) -> Reply + Send + Sync;

pub fn mac() -> DeviceAddress {
    MAC.parse().unwrap()
}

/// Wire target id of `channel` on the test gateway.
pub fn target(channel: u16) -> String {
    format!("0000d01411b001dd:{channel}")
}

/// Answers the three controller bootstrap queries.
///
/// The manifest lists channel 3 with both level attributes and channel 4
/// with `current-level` only.
pub fn bootstrap(request: &Value) -> Option<Reply> {
    match cmd(request) {
        "configure" => Some(Reply::Echo(json!({
            "product-id": PRODUCT_ID,
            "server-version": SERVER_VERSION,
        }))),
        "enumerate" => Some(Reply::Echo(json!({
            "devices": [
                {"id": target(1), "attrs": [{"attr": "model-id"}]},
                {"id": target(3), "attrs": [
                    {"attr": "on-off-state"}, {"attr": "current-level"}, {"attr": "target-level"}
                ]},
                {"id": target(4), "attrs": [{"attr": "on-off-state"}, {"attr": "current-level"}]}
            ]
        }))),
        "read-attr" if attr(request) == Some("model-id") => {
            Some(Reply::Echo(json!({"value": MODEL_ID})))
        }
        _ => None,
    }
}

pub fn cmd(request: &Value) -> &str {
    request.get("cmd").and_then(Value::as_str).unwrap_or_default()
}

pub fn attr(request: &Value) -> Option<&str> {
    request.get("attr").and_then(Value::as_str)
}

pub fn action(request: &Value) -> Option<&str> {
    request.get("action").and_then(Value::as_str)
}

/// A scripted gateway on a loopback port.
pub struct FakeGateway {
    port: u16,
    frames: Arc<Mutex<Vec<Value>>>,
}

impl FakeGateway {
    /// Starts a gateway that answers bootstrap queries and defers every
    /// other request to `handler`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Value) -> Reply + Send + Sync + 'static,
    {
        Self::start_raw(move |request| bootstrap(request).unwrap_or_else(|| handler(request)))
    }

    /// Starts a gateway where `handler` answers every request.
    pub fn start_raw<F>(handler: F) -> Self
    where
        F: Fn(&Value) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = Arc::clone(&frames);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                serve(stream, &recorded, handler.as_ref());
            }
        });

        Self { port, frames }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Settings that route the test MAC to this gateway.
    pub fn settings(&self) -> ControllerSettings {
        ControllerSettings::new()
            .with_port(self.port)
            .with_static_host(mac(), LOCALHOST)
            .with_connect_timeout(Duration::from_secs(1))
            .with_command_timeout(Duration::from_secs(1))
            .with_enumerate_timeout(Duration::from_secs(1))
    }

    /// Builds a controller for the test MAC.
    pub fn controller(&self) -> Arc<Controller> {
        Arc::new(Controller::new(mac(), None, &self.settings()))
    }

    /// Returns every request received so far.
    pub fn frames(&self) -> Vec<Value> {
        self.frames.lock().clone()
    }

    /// Returns the requests with command `name`.
    pub fn frames_of(&self, name: &str) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|f| cmd(f) == name)
            .collect()
    }

    /// Forgets the recorded requests.
    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    /// Waits until `count` requests matching `pred` were recorded.
    ///
    /// Fire-and-forget requests are recorded after the client returns.
    pub fn wait_for<P>(&self, count: usize, pred: P) -> Vec<Value>
    where
        P: Fn(&Value) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let matching: Vec<Value> = self.frames().into_iter().filter(|f| pred(f)).collect();
            if matching.len() >= count || Instant::now() >= deadline {
                return matching;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    /// Waits for forced `enumerate` requests.
    pub fn wait_for_refreshes(&self, count: usize) -> usize {
        self.wait_for(count, |f| {
            cmd(f) == "enumerate" && f.get("refresh") == Some(&Value::Bool(true))
        })
        .len()
    }
}

fn serve(mut stream: TcpStream, frames: &Mutex<Vec<Value>>, handler: &Handler) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_frame(&mut stream) else {
        return;
    };
    frames.lock().push(request.clone());

    let reply = match handler(&request) {
        Reply::Echo(fields) => echo(&request, fields),
        Reply::Exact(value) => value,
        Reply::Silent => return,
    };
    let _ = stream.write_all(format!("#:{reply}:#\n").as_bytes());
    let _ = stream.flush();
}

fn read_frame(stream: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.trim_ascii_end().ends_with(b":#") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let text = String::from_utf8_lossy(&buf);
    let json = text.trim().strip_prefix("#:")?.strip_suffix(":#")?;
    serde_json::from_str(json).ok()
}

fn echo(request: &Value, fields: Value) -> Value {
    let mut reply = Map::new();
    reply.insert("code".to_string(), json!(0));
    for key in ["cmd", "target-id", "attr", "action"] {
        if let Some(v) = request.get(key) {
            reply.insert(key.to_string(), v.clone());
        }
    }
    if let Value::Object(fields) = fields {
        reply.extend(fields);
    }
    Value::Object(reply)
}

/// A device-offline error that still echoes the request.
pub fn offline() -> Reply {
    Reply::Echo(json!({"code": 13, "reason": "device offline(unavailable)"}))
}

/// A reply carrying `bytes` as `supply-raw-data` fragments.
pub fn raw_reply(bytes: &[u8]) -> Reply {
    let (head, tail) = bytes.split_at(bytes.len() / 2);
    Reply::Echo(json!({"other": [{"raw-data": head}, {"raw-data": tail}]}))
}

/// Decodes the `raw-data` payload of a request as text.
pub fn raw_text(request: &Value) -> String {
    request
        .get("raw-data")
        .and_then(Value::as_array)
        .map(|bytes| {
            bytes
                .iter()
                .filter_map(Value::as_u64)
                .filter_map(|b| u8::try_from(b).ok())
                .map(char::from)
                .collect()
        })
        .unwrap_or_default()
}
