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


//! TELNET commands: AYT, the signal functions, AO and the Data Mark.

use super::Engine;
use crate::buffer::ByteBuffer;
use crate::clocks::Stamp;
use crate::error::SessionResult;
use crate::event::SessionEvent;
use crate::urgent::clear_to_synch;
use metrics::counter;
use telnetd_codec::slc::SlcFunction;
use telnetd_codec::{TelnetFrame, consts};
use tracing::{debug, trace};

impl Engine {
    pub(super) fn recv_command(
        &mut self,
        command: TelnetFrame,
        net_out: &mut ByteBuffer,
        local_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        counter!("telnetd.commands.received").increment(1);
        match command {
            TelnetFrame::AreYouThere => net_out.write_all_escaped(&self.config.ayt_response),
            TelnetFrame::InterruptProcess | TelnetFrame::Break => {
                self.deliver_control(SlcFunction::InterruptProcess, net_out, local_out)
            }
            TelnetFrame::Abort => self.deliver_control(SlcFunction::Abort, net_out, local_out),
            TelnetFrame::Suspend => self.deliver_control(SlcFunction::Suspend, net_out, local_out),
            TelnetFrame::EndOfFile => self.deliver_control(SlcFunction::EndOfFile, net_out, local_out),
            TelnetFrame::EraseCharacter => {
                self.deliver_control(SlcFunction::EraseCharacter, net_out, local_out)
            }
            TelnetFrame::EraseLine => self.deliver_control(SlcFunction::EraseLine, net_out, local_out),
            TelnetFrame::AbortOutput => self.abort_output(net_out, local_out),
            TelnetFrame::DataMark => {
                self.data_mark(local_out);
                Ok(())
            }
            other => {
                trace!(command = %other, "Command ignored");
                Ok(())
            }
        }
    }

    fn deliver_control(
        &mut self,
        function: SlcFunction,
        net_out: &mut ByteBuffer,
        local_out: &mut ByteBuffer,
    ) -> SessionResult<()> {
        let entry = *self.slc.entry(function);
        debug!(function = %function, supported = entry.is_supported(), "Control function received");
        if entry.flags.flush_in {
            local_out.clear();
        }
        if entry.flags.flush_out {
            self.flush_output(net_out)?;
        }
        if entry.is_supported() {
            local_out.put(entry.value)?;
        }
        Ok(())
    }

    fn abort_output(&mut self, net_out: &mut ByteBuffer, local_out: &mut ByteBuffer) -> SessionResult<()> {
        debug!("Abort output");
        if let Some(ch) = self.slc.char_for(SlcFunction::AbortOutput) {
            local_out.put(ch)?;
        }
        self.flush_output(net_out)
    }

    /// Drops queued output and sends a SYNCH: `IAC DM` with the urgent
    /// boundary right after it.
    pub(super) fn flush_output(&mut self, net_out: &mut ByteBuffer) -> SessionResult<()> {
        net_out.netclear();
        self.emit_command(net_out, consts::DM)?;
        net_out.mark_urgent();
        counter!("telnetd.synch.sent").increment(1);
        Ok(())
    }

    fn data_mark(&mut self, local_out: &mut ByteBuffer) {
        debug!(synching = self.synching, "Data Mark received");
        self.clocks.settimer(Stamp::GotDataMark);
        self.synching = false;
        clear_to_synch(local_out);
        self.push_event(SessionEvent::DataMark);
    }
}
