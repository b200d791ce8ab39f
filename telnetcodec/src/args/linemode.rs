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


//! Line Mode Options (RFC 1184)

use crate::args::slc::SlcTriplet;
use crate::consts::linemode as lm;
use crate::{CodecError, CodecResult, NegotiationVerb, SubnegotiationErrorKind, consts};
use bytes::BufMut;

/// A LINEMODE suboption request.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LineModeOption {
    /// MODE: global editing flags
    Mode(LineModeFlags),
    /// `DO|DONT|WILL|WONT FORWARDMASK [mask]`
    ForwardMask {
        /// Negotiation verb preceding FORWARDMASK
        verb: NegotiationVerb,
        /// The mask, only present with DO
        mask: Option<ForwardMask>,
    },
    /// SLC: special character triples
    Slc(Vec<SlcTriplet>),
}

impl LineModeOption {
    /// Parse line mode option from the suboption payload.
    pub fn decode(data: &[u8]) -> CodecResult<Self> {
        let Some((&command, rest)) = data.split_first() else {
            return Err(insufficient(1, 0));
        };
        match command {
            lm::MODE => match rest.first() {
                Some(&mode) => Ok(Self::Mode(LineModeFlags::from_byte(mode))),
                None => Err(insufficient(2, data.len())),
            },
            lm::SLC => Ok(Self::Slc(SlcTriplet::decode_list(rest))),
            verb => {
                let Some(verb) = NegotiationVerb::from_u8(verb) else {
                    return Err(CodecError::subnegotiation(
                        consts::option::LINEMODE,
                        SubnegotiationErrorKind::InvalidCommand {
                            command,
                            expected: Some(vec![lm::MODE, lm::SLC, consts::DO, consts::DONT, consts::WILL, consts::WONT]),
                        },
                    ));
                };
                match rest.split_first() {
                    Some((&lm::FORWARDMASK, mask)) => Ok(Self::ForwardMask {
                        verb,
                        mask: (verb == NegotiationVerb::Do).then(|| ForwardMask::from_bytes(mask)),
                    }),
                    Some((&other, _)) => Err(CodecError::subnegotiation(
                        consts::option::LINEMODE,
                        SubnegotiationErrorKind::InvalidCommand {
                            command: other,
                            expected: Some(vec![lm::FORWARDMASK]),
                        },
                    )),
                    None => Err(insufficient(2, data.len())),
                }
            }
        }
    }

    /// Serialize the request without IAC escaping.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> usize {
        match self {
            Self::Mode(mode) => {
                dst.put_u8(lm::MODE);
                dst.put_u8(mode.to_byte());
                2
            }
            Self::ForwardMask { verb, mask } => {
                dst.put_u8(verb.to_u8());
                dst.put_u8(lm::FORWARDMASK);
                match mask {
                    Some(mask) => 2 + mask.encode(dst),
                    None => 2,
                }
            }
            Self::Slc(triplets) => {
                dst.put_u8(lm::SLC);
                1 + SlcTriplet::encode_list(triplets, dst)
            }
        }
    }
}

impl std::fmt::Display for LineModeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

fn insufficient(required: usize, available: usize) -> CodecError {
    CodecError::subnegotiation(
        consts::option::LINEMODE,
        SubnegotiationErrorKind::InsufficientData {
            required,
            available,
        },
    )
}

/// Line Mode flags (used with MODE command)
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct LineModeFlags {
    /// Edit mode - client performs line editing
    pub edit: bool,
    /// Trapsig mode - client handles signals locally
    pub trapsig: bool,
    /// ACK - acknowledges a mode change
    pub ack: bool,
    /// Soft tab mode - client converts tabs to spaces
    pub soft_tab: bool,
    /// Lit echo mode - literal echo of all characters
    pub lit_echo: bool,
}

impl LineModeFlags {
    /// Create flags from a byte value
    pub fn from_byte(byte: u8) -> Self {
        Self {
            edit: (byte & lm::MODE_EDIT) != 0,
            trapsig: (byte & lm::MODE_TRAPSIG) != 0,
            ack: (byte & lm::MODE_ACK) != 0,
            soft_tab: (byte & lm::MODE_SOFT_TAB) != 0,
            lit_echo: (byte & lm::MODE_LIT_ECHO) != 0,
        }
    }

    /// Convert flags to a byte value
    pub fn to_byte(&self) -> u8 {
        let mut byte = 0u8;
        if self.edit {
            byte |= lm::MODE_EDIT;
        }
        if self.trapsig {
            byte |= lm::MODE_TRAPSIG;
        }
        if self.ack {
            byte |= lm::MODE_ACK;
        }
        if self.soft_tab {
            byte |= lm::MODE_SOFT_TAB;
        }
        if self.lit_echo {
            byte |= lm::MODE_LIT_ECHO;
        }
        byte
    }

    /// The same flags with ACK cleared.
    pub fn without_ack(mut self) -> Self {
        self.ack = false;
        self
    }

    /// The same flags with ACK set.
    pub fn with_ack(mut self) -> Self {
        self.ack = true;
        self
    }
}

impl std::fmt::Display for LineModeFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Set of characters that make the client forward a partial line.
///
/// Bit 7 of the first byte stands for character 0. Trailing zero bytes may
/// be omitted on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ForwardMask([u8; 32]);

impl ForwardMask {
    /// An empty mask.
    pub fn new() -> Self {
        ForwardMask([0; 32])
    }

    /// Builds a mask from wire bytes, ignoring anything past 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut mask = [0u8; 32];
        let len = bytes.len().min(32);
        mask[..len].copy_from_slice(&bytes[..len]);
        ForwardMask(mask)
    }

    /// Adds a character to the mask.
    pub fn insert(&mut self, ch: u8) {
        self.0[(ch / 8) as usize] |= 1 << (7 - (ch % 8));
    }

    /// Whether the character forces forwarding.
    pub fn contains(&self, ch: u8) -> bool {
        self.0[(ch / 8) as usize] & (1 << (7 - (ch % 8))) != 0
    }

    /// Writes the mask, dropping trailing zero bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> usize {
        let len = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        dst.put_slice(&self.0[..len]);
        len
    }
}

impl FromIterator<u8> for ForwardMask {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut mask = ForwardMask::new();
        for ch in iter {
            mask.insert(ch);
        }
        mask
    }
}
