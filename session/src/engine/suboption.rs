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


//! Suboptions: NAWS, the information options, environment and STATUS.

use super::Engine;
use super::negotiation::info_stamp;
use crate::buffer::ByteBuffer;
use crate::error::SessionResult;
use crate::event::SessionEvent;
use metrics::counter;
use telnetd_codec::environ::{EnvironCommand, EnvironMessage, EnvironVariable};
use telnetd_codec::linemode::LineModeOption;
use telnetd_codec::status::{StatusEntry, StatusMessage};
use telnetd_codec::terminal::InfoMessage;
use telnetd_codec::{NegotiationVerb, TelnetArgument, TelnetFrame, TelnetOption, TelnetSide};
use tracing::{debug, trace, warn};

impl Engine {
    pub(super) fn recv_suboption(
        &mut self,
        option: TelnetOption,
        payload: &[u8],
        net_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        let argument = match TelnetArgument::decode(option, payload) {
            Ok(argument) => argument,
            Err(error) => {
                warn!(option = %option, error = %error, "Malformed suboption dropped");
                counter!("telnetd.suboptions.malformed").increment(1);
                return Ok(());
            }
        };
        trace!(argument = %argument, "Suboption received");
        match argument {
            TelnetArgument::Linemode(inner) => self.recv_linemode(inner, net_out),
            TelnetArgument::WindowSize(size) => {
                if self.remote_enabled(TelnetOption::NAWS) {
                    debug!(cols = size.cols, rows = size.rows, "Window size changed");
                    self.client.window_size = Some(size);
                    self.terminal.window = size;
                    self.mark_terminal_dirty();
                    self.push_event(SessionEvent::WindowSize(size));
                }
                Ok(())
            }
            TelnetArgument::TerminalType(InfoMessage::Is(name)) => {
                if self.record_info(TelnetOption::TTYPE) {
                    self.client.terminal_type = Some(name.clone());
                    self.push_event(SessionEvent::TerminalType(name));
                }
                Ok(())
            }
            TelnetArgument::TerminalSpeed(InfoMessage::Is(speed)) => {
                if self.record_info(TelnetOption::TSPEED) {
                    self.client.terminal_speed = Some(speed);
                    self.push_event(SessionEvent::TerminalSpeed(speed));
                }
                Ok(())
            }
            TelnetArgument::DisplayLocation(InfoMessage::Is(display)) => {
                if self.record_info(TelnetOption::XDISPLOC) {
                    self.client.display_location = Some(display.clone());
                    self.push_event(SessionEvent::DisplayLocation(display));
                }
                Ok(())
            }
            TelnetArgument::TerminalType(InfoMessage::Send)
            | TelnetArgument::TerminalSpeed(InfoMessage::Send)
            | TelnetArgument::DisplayLocation(InfoMessage::Send) => self.answer_info(option, net_out),
            TelnetArgument::NewEnvironment(message) | TelnetArgument::OldEnvironment(message) => {
                self.recv_environ(option, message, net_out)
            }
            TelnetArgument::Status(StatusMessage::Send) => {
                if self.options.is_enabled(TelnetOption::Status, TelnetSide::Local) {
                    self.send_status(net_out)
                } else {
                    trace!("STATUS SEND while STATUS is off");
                    Ok(())
                }
            }
            TelnetArgument::Status(StatusMessage::Is(_)) => {
                trace!("Unrequested STATUS IS ignored");
                Ok(())
            }
            TelnetArgument::Unknown(option, _) => {
                debug!(option = %option, "Unsupported suboption");
                if self.options.is_enabled(option, TelnetSide::Local)
                    || self.options.wants(option, TelnetSide::Local)
                {
                    // Withdraw through the table so the reply is expected.
                    self.send_wont(option, net_out)
                } else {
                    self.emit(net_out, TelnetFrame::Wont(option))
                }
            }
        }
    }

    fn remote_enabled(&self, option: TelnetOption) -> bool {
        self.options.is_enabled(option, TelnetSide::Remote)
    }

    /// Stamps the clock for an IS reply. False when the option is off.
    fn record_info(&mut self, option: TelnetOption) -> bool {
        if !self.remote_enabled(option) {
            trace!(option = %option, "IS for an option the client does not perform");
            return false;
        }
        if let Some(stamp) = info_stamp(option) {
            self.clocks.settimer(stamp);
        }
        true
    }

    /// Sends `SB <option> SEND SE` for an information option.
    pub(super) fn request_info(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        let send_all = || EnvironMessage {
            command: EnvironCommand::Send,
            variables: Vec::new(),
        };
        let argument = match option {
            TelnetOption::TTYPE => TelnetArgument::TerminalType(InfoMessage::Send),
            TelnetOption::TSPEED => TelnetArgument::TerminalSpeed(InfoMessage::Send),
            TelnetOption::XDISPLOC => TelnetArgument::DisplayLocation(InfoMessage::Send),
            TelnetOption::NewEnvironment => TelnetArgument::NewEnvironment(send_all()),
            TelnetOption::OldEnvironment => TelnetArgument::OldEnvironment(send_all()),
            _ => return Ok(()),
        };
        self.emit_argument(net_out, argument)
    }

    fn answer_info(&mut self, option: TelnetOption, net_out: &mut ByteBuffer) -> SessionResult<()> {
        if !self.options.is_enabled(option, TelnetSide::Local) {
            trace!(option = %option, "SEND for an option we do not perform");
            return Ok(());
        }
        let identity = &self.config.identity;
        let argument = match option {
            TelnetOption::TTYPE => TelnetArgument::TerminalType(InfoMessage::Is(identity.terminal_type.clone())),
            TelnetOption::TSPEED => TelnetArgument::TerminalSpeed(InfoMessage::Is(identity.terminal_speed)),
            TelnetOption::XDISPLOC => {
                TelnetArgument::DisplayLocation(InfoMessage::Is(identity.display_location.clone()))
            }
            _ => return Ok(()),
        };
        self.emit_argument(net_out, argument)
    }

    fn recv_environ(
        &mut self,
        option: TelnetOption,
        message: EnvironMessage,
        net_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        match message.command {
            EnvironCommand::Is | EnvironCommand::Info => {
                if self.record_info(option) {
                    self.client.merge_environment(&message.variables);
                    self.push_event(SessionEvent::Environment(message.variables));
                }
                Ok(())
            }
            EnvironCommand::Send => {
                if !self.options.is_enabled(option, TelnetSide::Local) {
                    trace!(option = %option, "Environment SEND while we do not perform it");
                    return Ok(());
                }
                let variables = requested_variables(&self.config.identity.environment, &message.variables);
                let reply = EnvironMessage {
                    command: EnvironCommand::Is,
                    variables,
                };
                let argument = if option == TelnetOption::OldEnvironment {
                    TelnetArgument::OldEnvironment(reply)
                } else {
                    TelnetArgument::NewEnvironment(reply)
                };
                self.emit_argument(net_out, argument)
            }
        }
    }

    /// Sends `STATUS IS` describing the options in effect.
    pub fn send_status(&mut self, net_out: &mut ByteBuffer) -> SessionResult<()> {
        let mut entries: Vec<StatusEntry> = self
            .options
            .enabled(TelnetSide::Local)
            .map(|option| StatusEntry::Negotiation(NegotiationVerb::Will, option))
            .collect();
        entries.extend(
            self.options
                .enabled(TelnetSide::Remote)
                .map(|option| StatusEntry::Negotiation(NegotiationVerb::Do, option)),
        );
        if self.linemode() == super::LinemodeKind::Real {
            for block in [
                LineModeOption::Mode(self.edit_mode()),
                LineModeOption::Slc(self.slc.triplets()),
            ] {
                let mut payload = Vec::new();
                block.encode(&mut payload);
                entries.push(StatusEntry::Subnegotiation(TelnetOption::Linemode, payload));
            }
        }
        debug!(entries = entries.len(), "Sending STATUS IS");
        self.emit_argument(net_out, TelnetArgument::Status(StatusMessage::Is(entries)))
    }
}

/// Picks the configured variables a SEND asked for; all of them when the
/// request names none.
fn requested_variables(configured: &[EnvironVariable], requested: &[EnvironVariable]) -> Vec<EnvironVariable> {
    if requested.is_empty() {
        return configured.to_vec();
    }
    configured
        .iter()
        .filter(|variable| {
            requested
                .iter()
                .any(|wanted| wanted.kind == variable.kind && (wanted.name.is_empty() || wanted.name == variable.name))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::tests::{engine, feed, sent};
    use super::*;
    use crate::clocks::Stamp;
    use crate::config::{LocalIdentity, NegotiationPolicy, SessionConfig};
    use telnetd_codec::naws::WindowSize;
    use telnetd_codec::terminal::TerminalSpeed;

    const IAC: u8 = 0xFF;
    const SB: u8 = 0xFA;
    const SE: u8 = 0xF0;

    fn quiet() -> SessionConfig {
        SessionConfig::default().with_negotiation(NegotiationPolicy::default().with_start_requests(vec![]))
    }

    #[test]
    fn test_naws_updates_window() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFB, 31]);
        sent(&mut buffers);
        feed(&mut engine, &mut buffers, &[IAC, SB, 31, 0, 132, 0, 43, IAC, SE]);
        assert_eq!(engine.terminal_mode().window, WindowSize::new(132, 43));
        assert_eq!(engine.client_info().window_size, Some(WindowSize::new(132, 43)));
        assert!(engine.take_events().contains(&SessionEvent::WindowSize(WindowSize::new(132, 43))));
    }

    #[test]
    fn test_naws_ignored_when_off() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, SB, 31, 0, 80, 0, 24, IAC, SE]);
        assert_eq!(engine.client_info().window_size, None);
    }

    #[test]
    fn test_terminal_type_recorded() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFB, 24]);
        let mut reply = vec![IAC, SB, 24, 0];
        reply.extend_from_slice(b"XTERM-256COLOR");
        reply.extend_from_slice(&[IAC, SE]);
        feed(&mut engine, &mut buffers, &reply);
        assert_eq!(engine.client_info().terminal_type.as_deref(), Some("XTERM-256COLOR"));
        assert!(engine.clocks().happened_after(Stamp::TtypeSubopt, Stamp::Baseline));
    }

    #[test]
    fn test_terminal_speed_recorded() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFB, 32]);
        let mut reply = vec![IAC, SB, 32, 0];
        reply.extend_from_slice(b"38400,19200");
        reply.extend_from_slice(&[IAC, SE]);
        feed(&mut engine, &mut buffers, &reply);
        assert_eq!(engine.client_info().terminal_speed, Some(TerminalSpeed::new(38400, 19200)));
    }

    #[test]
    fn test_environment_recorded() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFB, 39]);
        let mut reply = vec![IAC, SB, 39, 0, 0];
        reply.extend_from_slice(b"USER");
        reply.push(1);
        reply.extend_from_slice(b"alice");
        reply.extend_from_slice(&[IAC, SE]);
        feed(&mut engine, &mut buffers, &reply);
        assert_eq!(engine.client_info().environment.get("USER").map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_ttype_send_answered_from_identity() {
        let identity = LocalIdentity {
            terminal_type: "VT100".to_string(),
            ..LocalIdentity::default()
        };
        let policy = NegotiationPolicy::default()
            .with_start_requests(vec![])
            .with_local(TelnetOption::TTYPE, true);
        let (mut engine, mut buffers) = engine(quiet().with_negotiation(policy).with_identity(identity));
        feed(&mut engine, &mut buffers, &[IAC, 0xFD, 24]);
        sent(&mut buffers);
        feed(&mut engine, &mut buffers, &[IAC, SB, 24, 1, IAC, SE]);
        let mut expected = vec![IAC, SB, 24, 0];
        expected.extend_from_slice(b"VT100");
        expected.extend_from_slice(&[IAC, SE]);
        assert_eq!(sent(&mut buffers), expected);
    }

    #[test]
    fn test_environ_send_filters_names() {
        let configured = vec![
            EnvironVariable::var("USER", "root"),
            EnvironVariable::var("DISPLAY", ":0"),
            EnvironVariable::user_var("SHELLNAME", "sh"),
        ];
        let requested = vec![EnvironVariable {
            value: None,
            ..EnvironVariable::var("DISPLAY", "")
        }];
        let picked = requested_variables(&configured, &requested);
        assert_eq!(picked, vec![EnvironVariable::var("DISPLAY", ":0")]);
        assert_eq!(requested_variables(&configured, &[]).len(), 3);
    }

    #[test]
    fn test_status_report() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFD, 5, IAC, 0xFB, 3]);
        sent(&mut buffers);
        feed(&mut engine, &mut buffers, &[IAC, SB, 5, 1, IAC, SE]);
        assert_eq!(
            sent(&mut buffers),
            [IAC, SB, 5, 0, 0xFB, 5, 0xFD, 3, IAC, SE]
        );
    }

    #[test]
    fn test_status_report_includes_linemode() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFD, 5, IAC, 0xFB, 34]);
        assert_eq!(engine.linemode(), super::super::LinemodeKind::Real);
        sent(&mut buffers);
        feed(&mut engine, &mut buffers, &[IAC, SB, 5, 1, IAC, SE]);
        let report = sent(&mut buffers);
        assert_eq!(report[..4], [IAC, SB, 5, 0]);
        assert!(report.windows(4).any(|w| w == [SB, 34, 1, 0x03]));
        assert!(report.windows(3).any(|w| w == [SB, 34, 3]));
    }

    #[test]
    fn test_unknown_suboption_withdraws_enabled_option() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFD, 3]);
        assert_eq!(sent(&mut buffers), [IAC, 0xFB, 3]);
        assert!(engine.is_enabled(TelnetOption::SuppressGoAhead, TelnetSide::Local));

        feed(&mut engine, &mut buffers, &[IAC, SB, 3, 1, IAC, SE]);
        assert_eq!(sent(&mut buffers), [IAC, 0xFC, 3]);
        assert!(!engine.options().wants(TelnetOption::SuppressGoAhead, TelnetSide::Local));
        assert!(!engine.negotiation_settled());

        feed(&mut engine, &mut buffers, &[IAC, 0xFE, 3]);
        assert!(sent(&mut buffers).is_empty());
        assert!(!engine.is_enabled(TelnetOption::SuppressGoAhead, TelnetSide::Local));
        assert!(engine.negotiation_settled());
    }

    #[test]
    fn test_unknown_suboption_refused() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, SB, 42, 1, 2, IAC, SE]);
        assert_eq!(sent(&mut buffers), [IAC, 0xFC, 42]);
    }

    #[test]
    fn test_malformed_suboption_dropped() {
        let (mut engine, mut buffers) = engine(quiet());
        feed(&mut engine, &mut buffers, &[IAC, 0xFB, 32]);
        sent(&mut buffers);
        feed(&mut engine, &mut buffers, &[IAC, SB, 32, 0, b'f', b'a', b's', b't', IAC, SE]);
        assert!(sent(&mut buffers).is_empty());
        assert_eq!(engine.client_info().terminal_speed, None);
    }
}
