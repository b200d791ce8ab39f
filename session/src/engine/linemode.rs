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


//! LINEMODE (RFC 1184).

use super::Engine;
use crate::buffer::ByteBuffer;
use crate::clocks::Stamp;
use crate::error::SessionResult;
use crate::event::SessionEvent;
use telnetd_codec::linemode::{ForwardMask, LineModeFlags, LineModeOption};
use telnetd_codec::{NegotiationVerb, TelnetArgument, TelnetOption, TelnetSide};
use tracing::{debug, trace};

/// Which linemode the session runs in
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LinemodeKind {
    /// Character at a time
    #[default]
    None,
    /// Client agreed to LINEMODE
    Real,
}

#[derive(Debug)]
pub(super) struct LinemodeState {
    kind: LinemodeKind,
    mode: LineModeFlags,
    requested_mask: Option<ForwardMask>,
    peer_forward_mask: Option<bool>,
}

impl LinemodeState {
    pub(super) fn new(mode: LineModeFlags) -> Self {
        Self {
            kind: LinemodeKind::None,
            mode: mode.without_ack(),
            requested_mask: None,
            peer_forward_mask: None,
        }
    }

    fn is_active(&self) -> bool {
        self.kind == LinemodeKind::Real
    }
}

impl Engine {
    /// Current linemode
    pub fn linemode(&self) -> LinemodeKind {
        self.linemode.kind
    }

    /// The MODE in effect, without ACK
    pub fn edit_mode(&self) -> LineModeFlags {
        self.linemode.mode
    }

    /// Whether the peer agreed to the forward mask, if it answered
    pub fn forward_mask_accepted(&self) -> Option<bool> {
        self.linemode.peer_forward_mask
    }

    /// The last forward mask we asked for
    pub fn requested_forward_mask(&self) -> Option<&ForwardMask> {
        self.linemode.requested_mask.as_ref()
    }

    /// Asks the client to forward its line buffer when it sees any of the
    /// characters in `mask`. Returns false when linemode is not active.
    pub fn request_forward_mask(&mut self, mask: ForwardMask, net_out: &mut ByteBuffer) -> SessionResult<bool> {
        if !self.linemode.is_active() {
            return Ok(false);
        }
        self.emit_argument(
            net_out,
            TelnetArgument::Linemode(LineModeOption::ForwardMask {
                verb: NegotiationVerb::Do,
                mask: Some(mask),
            }),
        )?;
        self.linemode.requested_mask = Some(mask);
        self.linemode.peer_forward_mask = None;
        Ok(true)
    }

    /// Changes the MODE. Sends it to the client when linemode is active.
    pub fn set_edit_mode(&mut self, mode: LineModeFlags, net_out: &mut ByteBuffer) -> SessionResult<()> {
        let mode = mode.without_ack();
        if mode == self.linemode.mode {
            return Ok(());
        }
        self.linemode.mode = mode;
        if self.linemode.is_active() {
            self.emit_argument(net_out, TelnetArgument::Linemode(LineModeOption::Mode(mode)))?;
        }
        self.refresh_terminal();
        Ok(())
    }

    pub(super) fn start_linemode(&mut self, net_out: &mut ByteBuffer) -> SessionResult<()> {
        debug!(mode = %self.linemode.mode, "Entering linemode");
        self.linemode.kind = LinemodeKind::Real;
        self.clocks.settimer(Stamp::ModeNegotiated);
        let mode = self.linemode.mode;
        self.emit_argument(net_out, TelnetArgument::Linemode(LineModeOption::Mode(mode)))?;
        let table = self.slc.triplets();
        self.emit_argument(net_out, TelnetArgument::Linemode(LineModeOption::Slc(table)))?;
        self.refresh_terminal();
        Ok(())
    }

    pub(super) fn stop_linemode(&mut self) {
        debug!("Leaving linemode");
        self.linemode.kind = LinemodeKind::None;
        self.linemode.requested_mask = None;
        self.linemode.peer_forward_mask = None;
        self.refresh_terminal();
    }

    pub(super) fn recv_linemode(&mut self, option: LineModeOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        if !self.options.is_enabled(TelnetOption::Linemode, TelnetSide::Remote) {
            trace!(?option, "LINEMODE suboption while linemode is off");
            return Ok(());
        }
        match option {
            LineModeOption::Mode(flags) => {
                let requested = flags.without_ack();
                if requested == self.linemode.mode {
                    return Ok(());
                }
                debug!(mode = %requested, ack = flags.ack, "Client changed MODE");
                self.linemode.mode = requested;
                self.clocks.settimer(Stamp::ModeNegotiated);
                self.push_event(SessionEvent::LinemodeChanged(requested));
                self.refresh_terminal();
                if !flags.ack {
                    self.emit_argument(
                        net_out,
                        TelnetArgument::Linemode(LineModeOption::Mode(requested.with_ack())),
                    )?;
                }
            }
            LineModeOption::ForwardMask { verb, .. } => match verb {
                NegotiationVerb::Will | NegotiationVerb::Wont => {
                    let accepted = verb == NegotiationVerb::Will;
                    self.linemode.peer_forward_mask = Some(accepted);
                    self.push_event(SessionEvent::ForwardMask(accepted));
                }
                NegotiationVerb::Do | NegotiationVerb::Dont => {
                    trace!(verb = %verb, "Client forward mask request ignored");
                }
            },
            LineModeOption::Slc(triplets) => {
                let outcome = self.slc.process(&triplets);
                if outcome.changed {
                    self.terminal.control_chars = self.slc.control_chars();
                    self.mark_terminal_dirty();
                    self.push_event(SessionEvent::SlcChanged);
                }
                if !outcome.replies.is_empty() {
                    self.emit_argument(net_out, TelnetArgument::Linemode(LineModeOption::Slc(outcome.replies)))?;
                }
            }
        }
        Ok(())
    }

    /// Recomputes the terminal mode from option and linemode state.
    pub(super) fn refresh_terminal(&mut self) {
        let active = self.linemode.is_active();
        let mode = self.linemode.mode;
        self.terminal.line_edit = active && mode.edit;
        self.terminal.trap_signals = active && mode.trapsig;
        self.terminal.soft_tab = active && mode.soft_tab;
        self.terminal.lit_echo = active && mode.lit_echo;
        self.terminal.echo = self.options.is_enabled(TelnetOption::Echo, TelnetSide::Local) && !self.terminal.line_edit;
        self.mark_terminal_dirty();
    }
}
