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


//! Terminal information suboptions: TTYPE (RFC 1091), TSPEED (RFC 1079)
//! and XDISPLOC (RFC 1096).
//!
//! All three share the same shape: the server sends `SEND`, the client
//! answers `IS <ascii>`.

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};
use bytes::BufMut;

/// A `SEND` request or an `IS` reply carrying `T`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InfoMessage<T> {
    /// Ask the peer for its value
    Send,
    /// The sender's value
    Is(T),
}

impl<T> InfoMessage<T> {
    fn decode_with(
        option: u8,
        data: &[u8],
        parse: impl FnOnce(&[u8]) -> CodecResult<T>,
    ) -> CodecResult<Self> {
        match data.split_first() {
            Some((&consts::qualifier::SEND, _)) => Ok(InfoMessage::Send),
            Some((&consts::qualifier::IS, value)) => Ok(InfoMessage::Is(parse(value)?)),
            Some((&command, _)) => Err(CodecError::subnegotiation(
                option,
                SubnegotiationErrorKind::InvalidCommand {
                    command,
                    expected: Some(vec![consts::qualifier::IS, consts::qualifier::SEND]),
                },
            )),
            None => Err(CodecError::subnegotiation(
                option,
                SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            )),
        }
    }
}

impl InfoMessage<String> {
    /// Decodes a TTYPE or XDISPLOC payload.
    pub fn decode_string(option: u8, data: &[u8]) -> CodecResult<Self> {
        Self::decode_with(option, data, |value| {
            Ok(String::from_utf8_lossy(value).into_owned())
        })
    }

    /// Writes the payload.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> usize {
        match self {
            InfoMessage::Send => {
                dst.put_u8(consts::qualifier::SEND);
                1
            }
            InfoMessage::Is(value) => {
                dst.put_u8(consts::qualifier::IS);
                dst.put_slice(value.as_bytes());
                1 + value.len()
            }
        }
    }
}

impl InfoMessage<TerminalSpeed> {
    /// Decodes a TSPEED payload.
    pub fn decode_speed(data: &[u8]) -> CodecResult<Self> {
        Self::decode_with(consts::option::TSPEED, data, TerminalSpeed::parse)
    }

    /// Writes the payload.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> usize {
        match self {
            InfoMessage::Send => {
                dst.put_u8(consts::qualifier::SEND);
                1
            }
            InfoMessage::Is(speed) => {
                let text = speed.to_string();
                dst.put_u8(consts::qualifier::IS);
                dst.put_slice(text.as_bytes());
                1 + text.len()
            }
        }
    }
}

/// Transmit and receive line speeds, sent as `"<tx>,<rx>"`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TerminalSpeed {
    /// Transmit speed in bits per second
    pub transmit: u32,
    /// Receive speed in bits per second
    pub receive: u32,
}

impl TerminalSpeed {
    /// Creates a speed pair.
    pub fn new(transmit: u32, receive: u32) -> Self {
        TerminalSpeed { transmit, receive }
    }

    fn parse(value: &[u8]) -> CodecResult<Self> {
        let invalid = || {
            CodecError::subnegotiation(
                consts::option::TSPEED,
                SubnegotiationErrorKind::InvalidValue {
                    description: format!(
                        "expected \"<tx>,<rx>\", got {:?}",
                        String::from_utf8_lossy(value)
                    ),
                },
            )
        };
        let text = std::str::from_utf8(value).map_err(|_| invalid())?;
        let (tx, rx) = text.split_once(',').ok_or_else(invalid)?;
        Ok(TerminalSpeed {
            transmit: tx.trim().parse().map_err(|_| invalid())?,
            receive: rx.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl Default for TerminalSpeed {
    fn default() -> Self {
        TerminalSpeed::new(38400, 38400)
    }
}

impl std::fmt::Display for TerminalSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.transmit, self.receive)
    }
}
