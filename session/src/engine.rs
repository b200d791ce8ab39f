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


//! The protocol engine.
//!
//! [`Engine`] owns everything a session knows about the TELNET protocol:
//! option state, the SLC table, linemode, what the client reported about
//! itself and the mode the local terminal should be in. It never touches an
//! endpoint. Frames come in through [`Engine::process`]; replies go to the
//! net-out buffer and keystrokes to the local-out buffer handed in by the
//! caller.

mod control;
mod linemode;
mod negotiation;
mod suboption;

pub use self::linemode::LinemodeKind;

use crate::buffer::ByteBuffer;
use crate::clocks::{Clocks, Stamp};
use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::event::SessionEvent;
use crate::slc::SlcTable;
use crate::terminal::{ClientInfo, TerminalMode};
use bytes::BytesMut;
use metrics::counter;
use std::sync::Arc;
use telnetd_codec::{OptionTable, TelnetArgument, TelnetCodec, TelnetFrame, TelnetOption, TelnetSide, consts};
use tokio_util::codec::Encoder;
use tracing::trace;

use self::linemode::LinemodeState;

/// Protocol state of one session.
#[derive(Debug)]
pub struct Engine {
    config: Arc<SessionConfig>,
    codec: TelnetCodec,
    scratch: BytesMut,
    options: OptionTable,
    slc: SlcTable,
    linemode: LinemodeState,
    client: ClientInfo,
    clocks: Clocks,
    terminal: TerminalMode,
    terminal_dirty: bool,
    events: Vec<SessionEvent>,
    synching: bool,
    logout: bool,
    saw_cr: bool,
}

impl Engine {
    /// Creates an engine with every option off and default SLC characters.
    pub fn new(config: Arc<SessionConfig>) -> Self {
        let slc = SlcTable::new();
        let terminal = TerminalMode {
            control_chars: slc.control_chars(),
            ..TerminalMode::default()
        };
        Self {
            codec: TelnetCodec::with_max_subnegotiation(config.max_subnegotiation),
            scratch: BytesMut::with_capacity(64),
            options: OptionTable::new(),
            slc,
            linemode: LinemodeState::new(config.edit_mode),
            client: ClientInfo::default(),
            clocks: Clocks::new(),
            terminal,
            terminal_dirty: true,
            events: Vec::new(),
            synching: false,
            logout: false,
            saw_cr: false,
            config,
        }
    }

    /// Stamps the baseline and sends the configured opening requests.
    pub fn start(&mut self, net_out: &mut ByteBuffer) -> SessionResult<()> {
        self.clocks.settimer(Stamp::Baseline);
        let config = Arc::clone(&self.config);
        for &(verb, option) in config.negotiation.start_requests() {
            self.request(verb, option, net_out)?;
        }
        Ok(())
    }

    /// Decodes the next frame from `net_in`, if one is complete.
    pub fn next_frame(&mut self, net_in: &mut ByteBuffer) -> SessionResult<Option<TelnetFrame>> {
        Ok(self.codec.decode_buf(net_in)?)
    }

    /// True when the decoder sits between frames.
    pub fn is_between_frames(&self) -> bool {
        self.codec.is_idle()
    }

    /// Acts on one received frame.
    pub fn process(
        &mut self,
        frame: TelnetFrame,
        net_out: &mut ByteBuffer,
        local_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        match frame {
            TelnetFrame::Data(byte) => self.receive_data(byte, local_out),
            TelnetFrame::Will(option) => self.recv_will(option, net_out),
            TelnetFrame::Wont(option) => self.recv_wont(option, net_out),
            TelnetFrame::Do(option) => self.recv_do(option, net_out),
            TelnetFrame::Dont(option) => self.recv_dont(option, net_out),
            TelnetFrame::Subnegotiate(option, payload) => {
                counter!("telnetd.suboptions.received").increment(1);
                self.recv_suboption(option, &payload, net_out)
            }
            command => self.recv_command(command, net_out, local_out),
        }
    }

    fn receive_data(&mut self, byte: u8, local_out: &mut ByteBuffer) -> SessionResult<()> {
        if std::mem::take(&mut self.saw_cr)
            && (byte == 0 || (byte == b'\n' && self.config.map_crlf))
        {
            return Ok(());
        }
        if self.synching {
            trace!(byte, "Data discarded while synching");
            return Ok(());
        }
        local_out.put(byte)?;
        if byte == b'\r' && !self.options.is_enabled(TelnetOption::TransmitBinary, TelnetSide::Remote) {
            self.saw_cr = true;
        }
        Ok(())
    }

    /// Encodes `frame` into `out`.
    fn emit(&mut self, out: &mut ByteBuffer, frame: TelnetFrame) -> SessionResult<()> {
        self.scratch.clear();
        Encoder::<TelnetFrame>::encode(&mut self.codec, frame, &mut self.scratch)?;
        out.write(&self.scratch)
    }

    fn emit_argument(&mut self, out: &mut ByteBuffer, argument: TelnetArgument) -> SessionResult<()> {
        counter!("telnetd.suboptions.sent").increment(1);
        let frame = argument.to_frame()?;
        self.emit(out, frame)
    }

    fn emit_command(&mut self, out: &mut ByteBuffer, command: u8) -> SessionResult<()> {
        out.write(&[consts::IAC, command])
    }

    fn push_event(&mut self, event: SessionEvent) {
        trace!(?event, "Session event");
        self.events.push(event);
    }

    fn mark_terminal_dirty(&mut self) {
        self.terminal_dirty = true;
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// The terminal mode, if it changed since the last call.
    pub fn take_terminal_update(&mut self) -> Option<TerminalMode> {
        std::mem::take(&mut self.terminal_dirty).then(|| self.terminal.clone())
    }

    /// Mode the local terminal should be in
    pub fn terminal_mode(&self) -> &TerminalMode {
        &self.terminal
    }

    /// What the client told us about itself
    pub fn client_info(&self) -> &ClientInfo {
        &self.client
    }

    /// Option state
    pub fn options(&self) -> &OptionTable {
        &self.options
    }

    /// Whether `option` is enabled on `side`
    pub fn is_enabled(&self, option: TelnetOption, side: TelnetSide) -> bool {
        self.options.is_enabled(option, side)
    }

    /// Current SLC table
    pub fn slc_table(&self) -> &SlcTable {
        &self.slc
    }

    /// Event clocks
    pub fn clocks(&self) -> &Clocks {
        &self.clocks
    }

    pub(crate) fn settimer(&mut self, stamp: Stamp) {
        self.clocks.settimer(stamp);
    }

    /// True when no negotiation is in flight.
    pub fn negotiation_settled(&self) -> bool {
        self.options.is_settled()
    }

    /// Whether the engine is skipping data up to a Data Mark
    pub fn is_synching(&self) -> bool {
        self.synching
    }

    /// Enters or leaves SYNCH.
    pub fn set_synching(&mut self, synching: bool) {
        if synching != self.synching {
            trace!(synching, "SYNCH state changed");
        }
        self.synching = synching;
    }

    /// Whether the peer asked us to log out
    pub fn logout_requested(&self) -> bool {
        self.logout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffers;
    use crate::config::NegotiationPolicy;
    use telnetd_codec::NegotiationVerb;

    pub(crate) fn engine(config: SessionConfig) -> (Engine, Buffers) {
        let buffers = Buffers::new(config.buffer_capacity());
        (Engine::new(Arc::new(config)), buffers)
    }

    pub(crate) fn feed(engine: &mut Engine, buffers: &mut Buffers, bytes: &[u8]) {
        buffers.net_in.write(bytes).unwrap();
        while let Some(frame) = engine.next_frame(&mut buffers.net_in).unwrap() {
            engine
                .process(frame, &mut buffers.net_out, &mut buffers.local_out)
                .unwrap();
        }
    }

    pub(crate) fn sent(buffers: &mut Buffers) -> Vec<u8> {
        let bytes = buffers.net_out.pending().to_vec();
        buffers.net_out.clear();
        bytes
    }

    fn quiet() -> SessionConfig {
        SessionConfig::default().with_negotiation(NegotiationPolicy::default().with_start_requests(vec![]))
    }

    #[test]
    fn test_start_sends_requests_in_order() {
        let config = SessionConfig::default().with_negotiation(NegotiationPolicy::default().with_start_requests(vec![
            (NegotiationVerb::Will, TelnetOption::SuppressGoAhead),
            (NegotiationVerb::Do, TelnetOption::NAWS),
        ]));
        let (mut engine, mut buffers) = engine(config);
        engine.start(&mut buffers.net_out).unwrap();
        assert_eq!(sent(&mut buffers), [0xFF, 0xFB, 0x03, 0xFF, 0xFD, 0x1F]);
        assert!(!engine.negotiation_settled());
        assert!(engine.clocks().get(Stamp::Baseline) > 0);
    }

    #[test]
    fn test_data_delivered() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, b"ls\xFF\xFF");
        assert_eq!(buffers.local_out.pending(), b"ls\xFF");
    }

    #[test]
    fn test_cr_nul_and_cr_lf() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, b"a\r\0b\r\nc");
        assert_eq!(buffers.local_out.pending(), b"a\rb\rc");
    }

    #[test]
    fn test_cr_lf_kept_without_mapping() {
        let (mut engine, mut buffers) = engine(quiet().with_map_crlf(false));
        feed(&mut engine, &mut buffers, b"a\r\n\r\0");
        assert_eq!(buffers.local_out.pending(), b"a\r\n\r");
    }

    #[test]
    fn test_cr_in_binary_is_plain() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[0xFF, 0xFB, 0x00]);
        assert!(engine.is_enabled(TelnetOption::TransmitBinary, TelnetSide::Remote));
        buffers.net_out.clear();
        feed(&mut engine, &mut buffers, b"\r\0\r\n");
        assert_eq!(buffers.local_out.pending(), b"\r\0\r\n");
    }

    #[test]
    fn test_synching_discards_data() {
        let (mut engine, mut buffers) = engine(quiet());
        engine.set_synching(true);
        feed(&mut engine, &mut buffers, b"junk");
        assert!(buffers.local_out.is_empty());
    }

    #[test]
    fn test_terminal_update_taken_once() {
        let (mut engine, _buffers) = engine(quiet());
        assert!(engine.take_terminal_update().is_some());
        assert!(engine.take_terminal_update().is_none());
    }
}
