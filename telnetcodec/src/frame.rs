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


//! Decoded TELNET protocol units.

use crate::{TelnetOption, consts};
use bytes::Bytes;

/// One of the four option negotiation verbs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NegotiationVerb {
    /// `IAC WILL`
    Will,
    /// `IAC WONT`
    Wont,
    /// `IAC DO`
    Do,
    /// `IAC DONT`
    Dont,
}

impl NegotiationVerb {
    /// Wire code of the verb.
    pub fn to_u8(self) -> u8 {
        match self {
            NegotiationVerb::Will => consts::WILL,
            NegotiationVerb::Wont => consts::WONT,
            NegotiationVerb::Do => consts::DO,
            NegotiationVerb::Dont => consts::DONT,
        }
    }

    /// Parses a verb from its wire code.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            consts::WILL => Some(NegotiationVerb::Will),
            consts::WONT => Some(NegotiationVerb::Wont),
            consts::DO => Some(NegotiationVerb::Do),
            consts::DONT => Some(NegotiationVerb::Dont),
            _ => None,
        }
    }
}

impl std::fmt::Display for NegotiationVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationVerb::Will => write!(f, "WILL"),
            NegotiationVerb::Wont => write!(f, "WONT"),
            NegotiationVerb::Do => write!(f, "DO"),
            NegotiationVerb::Dont => write!(f, "DONT"),
        }
    }
}

/// A single unit of the TELNET byte stream.
///
/// Data arrives one byte per frame, already unescaped. Suboption payloads
/// are delivered raw (with `IAC IAC` collapsed) and interpreted by
/// [`TelnetArgument::decode`](crate::TelnetArgument::decode).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TelnetFrame {
    /// A data byte
    Data(u8),
    /// `IAC NOP`
    NoOperation,
    /// `IAC DM`
    DataMark,
    /// `IAC BRK`
    Break,
    /// `IAC IP`
    InterruptProcess,
    /// `IAC AO`
    AbortOutput,
    /// `IAC AYT`
    AreYouThere,
    /// `IAC EC`
    EraseCharacter,
    /// `IAC EL`
    EraseLine,
    /// `IAC GA`
    GoAhead,
    /// `IAC EOR`
    EndOfRecord,
    /// `IAC ABORT`
    Abort,
    /// `IAC SUSP`
    Suspend,
    /// `IAC EOF`
    EndOfFile,
    /// `IAC DO <option>`
    Do(TelnetOption),
    /// `IAC DONT <option>`
    Dont(TelnetOption),
    /// `IAC WILL <option>`
    Will(TelnetOption),
    /// `IAC WONT <option>`
    Wont(TelnetOption),
    /// `IAC SB <option> <payload> IAC SE`
    Subnegotiate(TelnetOption, Bytes),
}

impl TelnetFrame {
    /// Builds a negotiation frame.
    pub fn negotiation(verb: NegotiationVerb, option: TelnetOption) -> Self {
        match verb {
            NegotiationVerb::Will => TelnetFrame::Will(option),
            NegotiationVerb::Wont => TelnetFrame::Wont(option),
            NegotiationVerb::Do => TelnetFrame::Do(option),
            NegotiationVerb::Dont => TelnetFrame::Dont(option),
        }
    }

    /// Maps a two byte command code to its frame.
    pub fn from_command(byte: u8) -> Option<Self> {
        Some(match byte {
            consts::NOP => TelnetFrame::NoOperation,
            consts::DM => TelnetFrame::DataMark,
            consts::BRK => TelnetFrame::Break,
            consts::IP => TelnetFrame::InterruptProcess,
            consts::AO => TelnetFrame::AbortOutput,
            consts::AYT => TelnetFrame::AreYouThere,
            consts::EC => TelnetFrame::EraseCharacter,
            consts::EL => TelnetFrame::EraseLine,
            consts::GA => TelnetFrame::GoAhead,
            consts::EOR => TelnetFrame::EndOfRecord,
            consts::ABORT => TelnetFrame::Abort,
            consts::SUSP => TelnetFrame::Suspend,
            consts::EOF => TelnetFrame::EndOfFile,
            _ => return None,
        })
    }

    /// Command code of a two byte command frame.
    pub fn command_code(&self) -> Option<u8> {
        Some(match self {
            TelnetFrame::NoOperation => consts::NOP,
            TelnetFrame::DataMark => consts::DM,
            TelnetFrame::Break => consts::BRK,
            TelnetFrame::InterruptProcess => consts::IP,
            TelnetFrame::AbortOutput => consts::AO,
            TelnetFrame::AreYouThere => consts::AYT,
            TelnetFrame::EraseCharacter => consts::EC,
            TelnetFrame::EraseLine => consts::EL,
            TelnetFrame::GoAhead => consts::GA,
            TelnetFrame::EndOfRecord => consts::EOR,
            TelnetFrame::Abort => consts::ABORT,
            TelnetFrame::Suspend => consts::SUSP,
            TelnetFrame::EndOfFile => consts::EOF,
            _ => return None,
        })
    }

    /// Number of bytes the frame occupies on the wire.
    pub fn len(&self) -> usize {
        match self {
            TelnetFrame::Data(consts::IAC) => 2,
            TelnetFrame::Data(_) => 1,
            TelnetFrame::Do(_)
            | TelnetFrame::Dont(_)
            | TelnetFrame::Will(_)
            | TelnetFrame::Wont(_) => 3,
            TelnetFrame::Subnegotiate(_, payload) => {
                5 + payload.len() + payload.iter().filter(|&&b| b == consts::IAC).count()
            }
            _ => 2,
        }
    }

    /// Frames are never empty on the wire.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for TelnetFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetFrame::Data(byte) => write!(f, "Data(0x{:02X})", byte),
            TelnetFrame::Do(option) => write!(f, "DO {}", option),
            TelnetFrame::Dont(option) => write!(f, "DONT {}", option),
            TelnetFrame::Will(option) => write!(f, "WILL {}", option),
            TelnetFrame::Wont(option) => write!(f, "WONT {}", option),
            TelnetFrame::Subnegotiate(option, payload) => {
                write!(f, "SB {} ({} bytes)", option, payload.len())
            }
            other => std::fmt::Debug::fmt(other, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes_roundtrip() {
        for code in consts::EOF..=consts::GA {
            if code == consts::SE {
                continue;
            }
            let frame = TelnetFrame::from_command(code).expect("command");
            assert_eq!(frame.command_code(), Some(code));
        }
        assert_eq!(TelnetFrame::from_command(consts::SE), None);
    }

    #[test]
    fn test_frame_len_counts_escapes() {
        assert_eq!(TelnetFrame::Data(b'a').len(), 1);
        assert_eq!(TelnetFrame::Data(0xFF).len(), 2);
        assert_eq!(TelnetFrame::Will(TelnetOption::Echo).len(), 3);
        let sb = TelnetFrame::Subnegotiate(TelnetOption::NAWS, Bytes::from_static(&[0, 0xFF, 0, 24]));
        assert_eq!(sb.len(), 10);
    }

    #[test]
    fn test_verb_codes() {
        for verb in [
            NegotiationVerb::Will,
            NegotiationVerb::Wont,
            NegotiationVerb::Do,
            NegotiationVerb::Dont,
        ] {
            assert_eq!(NegotiationVerb::from_u8(verb.to_u8()), Some(verb));
        }
        assert_eq!(NegotiationVerb::from_u8(consts::SB), None);
    }
}
