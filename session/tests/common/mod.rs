//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! Shared helpers for the session test suites

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::BytesMut;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use telnetd_codec::{TelnetCodec, TelnetFrame};
use telnetd_session::{
    NegotiationPolicy, NetworkEndpoint, PollStatus, PtyDevice, PtyHandle, Session, SessionConfig, pty_pair,
};
use tokio::io::{Interest, Ready};
use tokio::sync::Notify;
use tokio_util::codec::Decoder;

pub const IAC: u8 = 255;
pub const WILL: u8 = 251;
pub const WONT: u8 = 252;
pub const DO: u8 = 253;
pub const DONT: u8 = 254;
pub const SB: u8 = 250;
pub const SE: u8 = 240;
pub const DM: u8 = 242;

#[derive(Debug, Default)]
struct Wire {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    urgent_offsets: Vec<usize>,
    urgent_pending: bool,
    peer_closed: bool,
    shut_down: bool,
    send_limit: Option<usize>,
}

/// In-memory network endpoint. Clones share the same wire, so a test keeps
/// one clone as the remote peer.
#[derive(Clone, Debug)]
pub struct MockNetwork {
    wire: Arc<Mutex<Wire>>,
    notify: Arc<Notify>,
    out_of_band: bool,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self {
            wire: Arc::new(Mutex::new(Wire::default())),
            notify: Arc::new(Notify::new()),
            out_of_band: true,
        }
    }

    pub fn without_out_of_band(mut self) -> Self {
        self.out_of_band = false;
        self
    }

    /// Bytes the peer sends to the session.
    pub fn push_input(&self, bytes: &[u8]) {
        self.wire.lock().unwrap().inbound.extend(bytes);
        self.notify.notify_one();
    }

    /// The peer closes its side.
    pub fn close(&self) {
        self.wire.lock().unwrap().peer_closed = true;
        self.notify.notify_one();
    }

    pub fn set_urgent_pending(&self, pending: bool) {
        self.wire.lock().unwrap().urgent_pending = pending;
    }

    pub fn limit_send(&self, limit: Option<usize>) {
        self.wire.lock().unwrap().send_limit = limit;
    }

    /// Everything the session sent so far, cleared.
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.wire.lock().unwrap().outbound)
    }

    pub fn urgent_offsets(&self) -> Vec<usize> {
        self.wire.lock().unwrap().urgent_offsets.clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.wire.lock().unwrap().shut_down
    }
}

#[async_trait]
impl NetworkEndpoint for MockNetwork {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut wire = self.wire.lock().unwrap();
        if wire.inbound.is_empty() {
            return if wire.peer_closed {
                Ok(0)
            } else {
                Err(io::ErrorKind::WouldBlock.into())
            };
        }
        let count = buf.len().min(wire.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(wire.inbound.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut wire = self.wire.lock().unwrap();
        if wire.shut_down {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let count = wire.send_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        if count == 0 && !buf.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        wire.outbound.extend_from_slice(&buf[..count]);
        Ok(count)
    }

    fn has_out_of_band_pending(&self) -> io::Result<bool> {
        Ok(self.wire.lock().unwrap().urgent_pending)
    }

    fn send_out_of_band(&mut self, byte: u8) -> io::Result<()> {
        let mut wire = self.wire.lock().unwrap();
        let offset = wire.outbound.len();
        wire.urgent_offsets.push(offset);
        wire.outbound.push(byte);
        Ok(())
    }

    fn supports_out_of_band(&self) -> bool {
        self.out_of_band
    }

    async fn ready(&mut self, interest: Interest) -> io::Result<Ready> {
        loop {
            {
                let wire = self.wire.lock().unwrap();
                if interest.is_writable() {
                    return Ok(Ready::WRITABLE);
                }
                if !wire.inbound.is_empty() || wire.peer_closed {
                    return Ok(Ready::READABLE);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        self.wire.lock().unwrap().shut_down = true;
        Ok(())
    }
}

/// A config that sends nothing at start.
pub fn quiet_config() -> SessionConfig {
    SessionConfig::default().with_negotiation(NegotiationPolicy::default().with_start_requests(vec![]))
}

pub struct Harness {
    pub session: Session<MockNetwork, PtyDevice>,
    pub peer: MockNetwork,
    pub shell: PtyHandle,
}

pub fn harness(config: SessionConfig) -> Harness {
    harness_with(config, MockNetwork::new())
}

pub fn harness_with(config: SessionConfig, network: MockNetwork) -> Harness {
    let (device, shell) = pty_pair(config.buffer_size);
    let peer = network.clone();
    let session = Session::new(Arc::new(config), network, device).with_label("test");
    Harness { session, peer, shell }
}

impl Harness {
    /// Polls until the session goes idle or finishes.
    pub fn pump(&mut self) -> PollStatus {
        for _ in 0..1000 {
            match self.session.poll_once().unwrap() {
                PollStatus::Progress => continue,
                status => return status,
            }
        }
        panic!("session never went idle");
    }
}

/// Splits wire bytes into frames.
pub fn frames(bytes: &[u8]) -> Vec<TelnetFrame> {
    let mut codec = TelnetCodec::new();
    let mut input = BytesMut::from(bytes);
    let mut frames = Vec::new();
    while let Some(frame) = codec.decode(&mut input).unwrap() {
        frames.push(frame);
    }
    frames
}
