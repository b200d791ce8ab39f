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


//! Option negotiation.
//!
//! Follows the Q-less BSD scheme: every PDU we send that expects an answer
//! bumps a per-option reply counter, and a received PDU is only treated as
//! a fresh request when no reply is outstanding and we are not already
//! moving toward the state it asks for. A request we refuse is answered
//! once and never counted, so refusals cannot bounce.

use super::Engine;
use crate::buffer::ByteBuffer;
use crate::clocks::Stamp;
use crate::error::SessionResult;
use crate::event::SessionEvent;
use metrics::counter;
use telnetd_codec::{NegotiationVerb, TelnetFrame, TelnetOption, TelnetSide};
use tracing::{debug, trace};

impl Engine {
    pub(crate) fn request(
        &mut self,
        verb: NegotiationVerb,
        option: TelnetOption,
        net_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        match verb {
            NegotiationVerb::Will => self.send_will(option, net_out),
            NegotiationVerb::Wont => self.send_wont(option, net_out),
            NegotiationVerb::Do => self.send_do(option, net_out),
            NegotiationVerb::Dont => self.send_dont(option, net_out),
        }
    }

    /// Offers to perform `option`. Does nothing if that is already the
    /// state or already requested.
    pub fn send_will(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        self.send_request(option, TelnetSide::Local, true, net_out)
    }

    /// Stops performing `option`.
    pub fn send_wont(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        self.send_request(option, TelnetSide::Local, false, net_out)
    }

    /// Asks the peer to perform `option`.
    pub fn send_do(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        self.send_request(option, TelnetSide::Remote, true, net_out)
    }

    /// Asks the peer to stop performing `option`.
    pub fn send_dont(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        self.send_request(option, TelnetSide::Remote, false, net_out)
    }

    fn send_request(
        &mut self,
        option: TelnetOption,
        side: TelnetSide,
        enable: bool,
        net_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        let pending = self.options.pending_replies(option, side);
        if (pending == 0 && self.options.is_enabled(option, side) == enable)
            || self.options.wants(option, side) == enable
        {
            return Ok(());
        }
        self.write_negotiation(verb_for(side, enable), option, net_out)?;
        self.options.set_want(option, side, enable);
        self.options.expect_reply(option, side);
        Ok(())
    }

    fn write_negotiation(
        &mut self,
        verb: NegotiationVerb,
        option: TelnetOption,
        net_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        trace!(verb = %verb, option = %option, "Sending negotiation");
        self.emit(net_out, TelnetFrame::negotiation(verb, option))?;
        counter!("telnetd.negotiation.sent").increment(1);
        Ok(())
    }

    pub(crate) fn recv_do(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        counter!("telnetd.negotiation.received").increment(1);
        self.options.settle_reply(option, TelnetSide::Local, true);
        if self.options.pending_replies(option, TelnetSide::Local) == 0
            && !self.options.wants(option, TelnetSide::Local)
        {
            if option == TelnetOption::TimingMark {
                // Answered every time, never enabled.
                return self.write_negotiation(NegotiationVerb::Will, option, net_out);
            }
            if self.config.negotiation.accepts_local(option) {
                self.write_negotiation(NegotiationVerb::Will, option, net_out)?;
                self.options.set_want(option, TelnetSide::Local, true);
            } else {
                debug!(option = %option, "Refusing DO");
                return self.write_negotiation(NegotiationVerb::Wont, option, net_out);
            }
        }
        self.set_local_state(option, true);
        Ok(())
    }

    pub(crate) fn recv_dont(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        counter!("telnetd.negotiation.received").increment(1);
        self.options.settle_reply(option, TelnetSide::Local, false);
        if self.options.pending_replies(option, TelnetSide::Local) == 0
            && self.options.wants(option, TelnetSide::Local)
        {
            self.options.set_want(option, TelnetSide::Local, false);
            if self.options.is_enabled(option, TelnetSide::Local) {
                self.write_negotiation(NegotiationVerb::Wont, option, net_out)?;
            }
        }
        self.set_local_state(option, false);
        Ok(())
    }

    pub(crate) fn recv_will(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        counter!("telnetd.negotiation.received").increment(1);
        self.options.settle_reply(option, TelnetSide::Remote, true);
        if option == TelnetOption::TimingMark {
            // We never ask for it and never answer it.
            self.options.set_want(option, TelnetSide::Remote, false);
            self.options.set_state(option, TelnetSide::Remote, false);
            return Ok(());
        }
        if self.options.pending_replies(option, TelnetSide::Remote) == 0
            && !self.options.wants(option, TelnetSide::Remote)
        {
            if self.config.negotiation.accepts_remote(option) {
                self.write_negotiation(NegotiationVerb::Do, option, net_out)?;
                self.options.set_want(option, TelnetSide::Remote, true);
            } else {
                debug!(option = %option, "Refusing WILL");
                return self.write_negotiation(NegotiationVerb::Dont, option, net_out);
            }
        }
        self.set_remote_state(option, true, net_out)
    }

    pub(crate) fn recv_wont(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        counter!("telnetd.negotiation.received").increment(1);
        self.options.settle_reply(option, TelnetSide::Remote, false);
        if self.options.pending_replies(option, TelnetSide::Remote) == 0 {
            if let Some(stamp) = info_stamp(option) {
                // A refusal ends any wait for the suboption.
                self.clocks.settimer(stamp);
            }
            if self.options.wants(option, TelnetSide::Remote) {
                self.options.set_want(option, TelnetSide::Remote, false);
                if self.options.is_enabled(option, TelnetSide::Remote) {
                    self.write_negotiation(NegotiationVerb::Dont, option, net_out)?;
                }
            }
        }
        self.set_remote_state(option, false, net_out)
    }

    fn set_local_state(&mut self, option: TelnetOption, enabled: bool) {
        if self.options.is_enabled(option, TelnetSide::Local) == enabled {
            return;
        }
        self.options.set_state(option, TelnetSide::Local, enabled);
        debug!(option = %option, enabled, "Local option changed");
        self.push_event(SessionEvent::OptionChanged {
            option,
            side: TelnetSide::Local,
            enabled,
        });
        match option {
            TelnetOption::Echo => {
                self.clocks.settimer(Stamp::EchoToggle);
                self.refresh_terminal();
            }
            TelnetOption::TransmitBinary => {
                self.terminal.binary_out = enabled;
                self.mark_terminal_dirty();
            }
            TelnetOption::Logout if enabled => {
                self.logout = true;
                self.push_event(SessionEvent::Logout);
            }
            _ => {}
        }
    }

    fn set_remote_state(
        &mut self,
        option: TelnetOption,
        enabled: bool,
        net_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        if self.options.is_enabled(option, TelnetSide::Remote) == enabled {
            return Ok(());
        }
        self.options.set_state(option, TelnetSide::Remote, enabled);
        debug!(option = %option, enabled, "Remote option changed");
        self.push_event(SessionEvent::OptionChanged {
            option,
            side: TelnetSide::Remote,
            enabled,
        });
        match option {
            TelnetOption::TransmitBinary => {
                self.terminal.binary_in = enabled;
                self.mark_terminal_dirty();
            }
            TelnetOption::Linemode if enabled => self.start_linemode(net_out)?,
            TelnetOption::Linemode => self.stop_linemode(),
            _ if enabled && info_stamp(option).is_some() => self.request_info(option, net_out)?,
            _ => {}
        }
        Ok(())
    }
}

fn verb_for(side: TelnetSide, enable: bool) -> NegotiationVerb {
    match (side, enable) {
        (TelnetSide::Local, true) => NegotiationVerb::Will,
        (TelnetSide::Local, false) => NegotiationVerb::Wont,
        (TelnetSide::Remote, true) => NegotiationVerb::Do,
        (TelnetSide::Remote, false) => NegotiationVerb::Dont,
    }
}

/// Clock stamped when the client answers or refuses an info option.
pub(super) fn info_stamp(option: TelnetOption) -> Option<Stamp> {
    match option {
        TelnetOption::TTYPE => Some(Stamp::TtypeSubopt),
        TelnetOption::TSPEED => Some(Stamp::TspeedSubopt),
        TelnetOption::XDISPLOC => Some(Stamp::XdisplocSubopt),
        TelnetOption::NewEnvironment => Some(Stamp::EnvironSubopt),
        TelnetOption::OldEnvironment => Some(Stamp::OldEnvironSubopt),
        _ => None,
    }
}
