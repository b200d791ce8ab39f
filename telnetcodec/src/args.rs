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


use crate::args::environ::{EnvironDialect, EnvironMessage};
use crate::args::linemode::LineModeOption;
use crate::args::naws::WindowSize;
use crate::args::status::StatusMessage;
use crate::args::terminal::{InfoMessage, TerminalSpeed};
use crate::result::CodecResult;
use crate::{TelnetFrame, TelnetOption};
use bytes::{BufMut, Bytes, BytesMut};

pub mod environ;
pub mod linemode;
pub mod naws;
pub mod slc;
pub mod status;
pub mod terminal;

///
/// Telnet Subnegotiation Argument
///
/// The decoded form of an `IAC SB <option> ... IAC SE` payload for the
/// options a server session understands.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetArgument {
    /// LINEMODE MODE, FORWARDMASK or SLC
    Linemode(LineModeOption),
    /// NAWS window size
    WindowSize(WindowSize),
    /// TTYPE request or terminal type
    TerminalType(InfoMessage<String>),
    /// TSPEED request or line speeds
    TerminalSpeed(InfoMessage<TerminalSpeed>),
    /// XDISPLOC request or display location
    DisplayLocation(InfoMessage<String>),
    /// NEW-ENVIRON payload
    NewEnvironment(EnvironMessage),
    /// OLD-ENVIRON payload
    OldEnvironment(EnvironMessage),
    /// STATUS request or report
    Status(StatusMessage),
    /// A subnegotiation for an option without a decoder.
    Unknown(TelnetOption, Bytes),
}

impl TelnetArgument {
    /// Decodes the payload of a subnegotiation for `option`.
    ///
    /// Options without a dedicated decoder come back as
    /// [`TelnetArgument::Unknown`] rather than an error.
    pub fn decode(option: TelnetOption, payload: &[u8]) -> CodecResult<Self> {
        Ok(match option {
            TelnetOption::Linemode => TelnetArgument::Linemode(LineModeOption::decode(payload)?),
            TelnetOption::NAWS => TelnetArgument::WindowSize(WindowSize::decode(&mut &payload[..])?),
            TelnetOption::TTYPE => TelnetArgument::TerminalType(InfoMessage::decode_string(
                option.to_u8(),
                payload,
            )?),
            TelnetOption::TSPEED => TelnetArgument::TerminalSpeed(InfoMessage::decode_speed(payload)?),
            TelnetOption::XDISPLOC => TelnetArgument::DisplayLocation(InfoMessage::decode_string(
                option.to_u8(),
                payload,
            )?),
            TelnetOption::NewEnvironment => TelnetArgument::NewEnvironment(EnvironMessage::decode(
                payload,
                EnvironDialect::New,
            )?),
            TelnetOption::OldEnvironment => TelnetArgument::OldEnvironment(EnvironMessage::decode(
                payload,
                EnvironDialect::Old,
            )?),
            TelnetOption::Status => TelnetArgument::Status(StatusMessage::decode(payload)?),
            other => TelnetArgument::Unknown(other, Bytes::copy_from_slice(payload)),
        })
    }

    /// The option this argument belongs to.
    pub fn option(&self) -> TelnetOption {
        match self {
            TelnetArgument::Linemode(_) => TelnetOption::Linemode,
            TelnetArgument::WindowSize(_) => TelnetOption::NAWS,
            TelnetArgument::TerminalType(_) => TelnetOption::TTYPE,
            TelnetArgument::TerminalSpeed(_) => TelnetOption::TSPEED,
            TelnetArgument::DisplayLocation(_) => TelnetOption::XDISPLOC,
            TelnetArgument::NewEnvironment(_) => TelnetOption::NewEnvironment,
            TelnetArgument::OldEnvironment(_) => TelnetOption::OldEnvironment,
            TelnetArgument::Status(_) => TelnetOption::Status,
            TelnetArgument::Unknown(option, _) => *option,
        }
    }

    /// Writes the unescaped payload into `dst` and returns the byte count.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(match self {
            TelnetArgument::Linemode(inner) => inner.encode(dst),
            TelnetArgument::WindowSize(inner) => inner.encode(dst)?,
            TelnetArgument::TerminalType(inner) | TelnetArgument::DisplayLocation(inner) => {
                inner.encode(dst)
            }
            TelnetArgument::TerminalSpeed(inner) => inner.encode(dst),
            TelnetArgument::NewEnvironment(inner) => inner.encode(dst, EnvironDialect::New),
            TelnetArgument::OldEnvironment(inner) => inner.encode(dst, EnvironDialect::Old),
            TelnetArgument::Status(inner) => inner.encode(dst),
            TelnetArgument::Unknown(_, payload) => {
                dst.put_slice(payload);
                payload.len()
            }
        })
    }

    /// Wraps the argument in a subnegotiation frame.
    pub fn to_frame(&self) -> CodecResult<TelnetFrame> {
        let mut payload = BytesMut::new();
        self.encode(&mut payload)?;
        Ok(TelnetFrame::Subnegotiate(self.option(), payload.freeze()))
    }
}

impl std::fmt::Display for TelnetArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetArgument::Linemode(inner) => write!(f, "LINEMODE {inner}"),
            TelnetArgument::WindowSize(inner) => write!(f, "NAWS {inner}"),
            TelnetArgument::TerminalType(InfoMessage::Send) => write!(f, "TTYPE SEND"),
            TelnetArgument::TerminalType(InfoMessage::Is(value)) => write!(f, "TTYPE IS {value}"),
            TelnetArgument::TerminalSpeed(InfoMessage::Send) => write!(f, "TSPEED SEND"),
            TelnetArgument::TerminalSpeed(InfoMessage::Is(value)) => write!(f, "TSPEED IS {value}"),
            TelnetArgument::DisplayLocation(InfoMessage::Send) => write!(f, "XDISPLOC SEND"),
            TelnetArgument::DisplayLocation(InfoMessage::Is(value)) => {
                write!(f, "XDISPLOC IS {value}")
            }
            TelnetArgument::NewEnvironment(inner) => {
                write!(f, "NEW-ENVIRON {:?} ({} vars)", inner.command, inner.variables.len())
            }
            TelnetArgument::OldEnvironment(inner) => {
                write!(f, "OLD-ENVIRON {:?} ({} vars)", inner.command, inner.variables.len())
            }
            TelnetArgument::Status(StatusMessage::Send) => write!(f, "STATUS SEND"),
            TelnetArgument::Status(StatusMessage::Is(entries)) => {
                write!(f, "STATUS IS ({} entries)", entries.len())
            }
            TelnetArgument::Unknown(option, payload) => {
                write!(f, "{option} ({} bytes)", payload.len())
            }
        }
    }
}
