// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command channel: one request, one fresh connection, one correlated reply.
//!
//! This is the only place in the library that retries. Callers choose
//! between a single attempt (the default) and resending until the command
//! deadline with [`SendOptions::with_resend`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::command::Command;
use crate::error::{DeviceError, Error, ProtocolError};
use crate::protocol::codec::{self, Request};
use crate::protocol::transport::{Connector, Endpoint, ReadMode, millis};
use crate::protocol::Response;

/// Per-call options for [`CommandChannel::send_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    just_send: bool,
    timeout: Duration,
    resend: bool,
    read_mode: Option<ReadMode>,
}

impl SendOptions {
    /// Default command deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    /// Creates options for a single correlated attempt.
    #[must_use]
    pub fn new() -> Self {
        Self {
            just_send: false,
            timeout: Self::DEFAULT_TIMEOUT,
            resend: false,
            read_mode: None,
        }
    }

    /// Fire and forget: write the frame and skip reply handling.
    #[must_use]
    pub fn with_just_send(mut self, just_send: bool) -> Self {
        self.just_send = just_send;
        self
    }

    /// Sets the overall deadline of the call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries on failure until the deadline instead of giving up.
    #[must_use]
    pub fn with_resend(mut self, resend: bool) -> Self {
        self.resend = resend;
        self
    }

    /// Overrides the read mode the command asks for.
    #[must_use]
    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.read_mode = Some(mode);
        self
    }

    /// Returns the deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns whether the reply is skipped.
    #[must_use]
    pub fn just_send(&self) -> bool {
        self.just_send
    }
}

impl Default for SendOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends commands to one gateway endpoint.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    connector: Arc<dyn Connector>,
    endpoint: Endpoint,
    port: u16,
    connect_timeout: Duration,
}

impl CommandChannel {
    /// Creates a channel.
    #[must_use]
    pub fn new(
        connector: Arc<dyn Connector>,
        endpoint: Endpoint,
        port: u16,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            endpoint,
            port,
            connect_timeout,
        }
    }

    /// Returns the endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Opens and immediately closes a connection.
    #[must_use]
    pub fn probe(&self) -> bool {
        match self
            .connector
            .connect(&self.endpoint, self.port, self.connect_timeout)
        {
            Some(mut conn) => {
                conn.close();
                true
            }
            None => {
                tracing::warn!(host = %self.endpoint, port = self.port, "Gateway unreachable");
                false
            }
        }
    }

    /// Sends a command with default options.
    ///
    /// # Errors
    ///
    /// See [`send_with`](Self::send_with).
    pub fn send(&self, command: &dyn Command) -> Result<Response, Error> {
        self.send_with(command, SendOptions::default())
    }

    /// Sends a command.
    ///
    /// Each attempt opens a fresh connection, writes the frame, reads the
    /// reply and closes. A reply counts only if it echoes the request's
    /// `target-id`, `cmd` and `attr` (and `action`, when the gateway echoes
    /// one) and carries `code` 0. With `just_send` the reply is not read and
    /// an empty [`Response`] is returned.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Timeout` if no connection could be opened, or the
    ///   deadline passed without a reply.
    /// - `ProtocolError::NotSynchronized` if the reply belongs to another
    ///   request.
    /// - `DeviceError::Rejected` if the gateway answered with a non-zero
    ///   code.
    /// - `ParseError` if the reply is not a valid frame.
    pub fn send_with(
        &self,
        command: &dyn Command,
        options: SendOptions,
    ) -> Result<Response, Error> {
        let request = Request::from_command(command);
        let frame = request.encode();
        let mode = options.read_mode.unwrap_or_else(|| command.read_mode());
        let start = Instant::now();
        let mut last_error: Error = ProtocolError::Timeout(millis(options.timeout)).into();

        while start.elapsed() < options.timeout {
            match self.attempt(&request, &frame, options, mode) {
                Ok(response) => return Ok(response),
                Err(e) => last_error = e,
            }
            if !options.resend {
                break;
            }
        }

        Err(last_error)
    }

    fn attempt(
        &self,
        request: &Request,
        frame: &str,
        options: SendOptions,
        mode: ReadMode,
    ) -> Result<Response, Error> {
        let Some(mut conn) = self
            .connector
            .connect(&self.endpoint, self.port, self.connect_timeout)
        else {
            tracing::warn!(host = %self.endpoint, cmd = request.cmd(), "Connect timed out");
            return Err(ProtocolError::Timeout(millis(self.connect_timeout)).into());
        };

        tracing::debug!(host = %self.endpoint, frame, "Sending frame");
        let exchanged = conn.exchange(frame, options.just_send, options.timeout, mode);
        conn.close();
        let raw = exchanged?;

        if options.just_send {
            return Ok(Response::default());
        }

        tracing::debug!(host = %self.endpoint, reply = %raw.trim(), "Received frame");
        let response = codec::decode(&raw)?;

        if !correlates(request, &response) {
            tracing::warn!(
                host = %self.endpoint,
                cmd = request.cmd(),
                target_id = request.str_param("target-id").unwrap_or_default(),
                response = %response,
                "Response not synchronized"
            );
            return Err(ProtocolError::NotSynchronized {
                response: Box::new(response),
            }
            .into());
        }

        match response.code {
            Some(0) => Ok(response),
            code => Err(DeviceError::Rejected {
                code: code.unwrap_or(-1),
                reason: response.reason.clone().unwrap_or_default(),
                response: Box::new(response),
            }
            .into()),
        }
    }
}

/// Returns `true` if `response` answers `request`.
fn correlates(request: &Request, response: &Response) -> bool {
    let echoed_action_matches = match (&response.action, request.str_param("action")) {
        (Some(echoed), Some(sent)) => echoed == sent,
        _ => true,
    };
    response.target_id.as_deref() == request.str_param("target-id")
        && response.cmd.as_deref() == Some(request.cmd())
        && response.attr.as_deref() == request.str_param("attr")
        && echoed_action_matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use parking_lot::Mutex;

    use crate::command::{Enumerate, ReadAttr, SwitchOn};
    use crate::protocol::Connection;
    use crate::types::{Channel, DeviceAddress, TargetId};

    /// Replays scripted replies and records every frame.
    #[derive(Debug, Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Option<Result<String, u64>>>>,
        frames: Arc<Mutex<Vec<String>>>,
    }

    struct ScriptedConn {
        reply: Result<String, u64>,
        frames: Arc<Mutex<Vec<String>>>,
    }

    impl Connection for ScriptedConn {
        fn exchange(
            &mut self,
            frame: &str,
            just_send: bool,
            _timeout: Duration,
            _mode: ReadMode,
        ) -> Result<String, ProtocolError> {
            self.frames.lock().push(frame.to_string());
            if just_send {
                return Ok(String::new());
            }
            self.reply.clone().map_err(ProtocolError::Timeout)
        }

        fn close(&mut self) {}
    }

    impl Connector for Scripted {
        fn connect(&self, _: &Endpoint, _: u16, _: Duration) -> Option<Box<dyn Connection>> {
            let reply = self.replies.lock().pop_front().flatten()?;
            Some(Box::new(ScriptedConn {
                reply,
                frames: Arc::clone(&self.frames),
            }))
        }
    }

    fn channel(replies: Vec<Option<Result<String, u64>>>) -> (CommandChannel, Arc<Scripted>) {
        let connector = Arc::new(Scripted {
            replies: Mutex::new(replies.into()),
            frames: Arc::default(),
        });
        let ch = CommandChannel::new(
            connector.clone(),
            Endpoint::Ip("127.0.0.1".parse().unwrap()),
            9528,
            Duration::from_millis(50),
        );
        (ch, connector)
    }

    fn target() -> TargetId {
        let mac: DeviceAddress = "D0:14:11:B0:01:DD".parse().unwrap();
        TargetId::new(mac, Channel::new(3))
    }

    fn ok(s: &str) -> Option<Result<String, u64>> {
        Some(Ok(s.to_string()))
    }

    #[test]
    fn correlated_success() {
        let (ch, _) = channel(vec![ok(
            r#"#:{"code":0,"cmd":"read-attr","target-id":"0000d01411b001dd:3","attr":"on-off-state","value":true}:#"#,
        )]);
        let resp = ch.send(&ReadAttr::new(target(), "on-off-state")).unwrap();
        assert_eq!(resp.value(), Some(&serde_json::json!(true)));
    }

    #[test]
    fn mismatched_attr_is_desync() {
        let (ch, _) = channel(vec![ok(
            r#"#:{"code":0,"cmd":"read-attr","target-id":"0000d01411b001dd:3","attr":"current-level","value":5}:#"#,
        )]);
        let err = ch.send(&ReadAttr::new(target(), "on-off-state")).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::NotSynchronized { .. })
        ));
        assert!(err.response().is_some());
    }

    #[test]
    fn nonzero_code_is_rejected_with_reason() {
        let (ch, _) = channel(vec![ok(
            r#"#:{"code":13,"reason":"device offline(unavailable)","cmd":"switch-on","target-id":"0000d01411b001dd:3"}:#"#,
        )]);
        let err = ch.send(&SwitchOn::new(target())).unwrap_err();
        assert!(err.is_offline());
        match err {
            Error::Device(DeviceError::Rejected { code, reason, .. }) => {
                assert_eq!(code, 13);
                assert_eq!(reason, "device offline(unavailable)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn connect_failure_returns_timeout_without_resend() {
        let (ch, connector) = channel(vec![None, ok(r#"#:{"code":0,"cmd":"switch-on"}:#"#)]);
        let err = ch.send(&SwitchOn::new(target())).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(connector.replies.lock().len(), 1);
    }

    #[test]
    fn resend_retries_until_success() {
        let (ch, connector) = channel(vec![
            None,
            ok(r#"#:{"code":1,"cmd":"switch-on","target-id":"0000d01411b001dd:3"}:#"#),
            ok(r#"#:{"code":0,"cmd":"switch-on","target-id":"0000d01411b001dd:3"}:#"#),
        ]);
        let opts = SendOptions::new()
            .with_resend(true)
            .with_timeout(Duration::from_secs(2));
        assert!(ch.send_with(&SwitchOn::new(target()), opts).is_ok());
        assert_eq!(connector.frames.lock().len(), 2);
    }

    #[test]
    fn just_send_skips_correlation() {
        let (ch, connector) = channel(vec![ok("garbage")]);
        let opts = SendOptions::new().with_just_send(true);
        let resp = ch.send_with(&Enumerate::refresh(), opts).unwrap();
        assert_eq!(resp, Response::default());
        let frames = connector.frames.lock();
        assert_eq!(frames.as_slice(), [r#"#:{"cmd":"enumerate","refresh":true}:#"#]);
    }

    #[test]
    fn malformed_reply_is_parse_error() {
        let (ch, _) = channel(vec![ok("#:{\"code\":0")]);
        let err = ch.send(&SwitchOn::new(target())).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn read_timeout_surfaces() {
        let (ch, _) = channel(vec![Some(Err(3000))]);
        let err = ch.send(&SwitchOn::new(target())).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn action_checked_only_when_echoed() {
        let req = Request::new("daikin-cmd")
            .with_param("target_id", "t")
            .with_param("action", "query");
        let mut resp: Response =
            serde_json::from_str(r#"{"code":0,"cmd":"daikin-cmd","target-id":"t"}"#).unwrap();
        assert!(correlates(&req, &resp));
        resp.action = Some("on".to_string());
        assert!(!correlates(&req, &resp));
        resp.action = Some("query".to_string());
        assert!(correlates(&req, &resp));
    }
}
