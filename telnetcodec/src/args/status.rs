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


//! STATUS option payloads (RFC 859).

use crate::{CodecError, CodecResult, NegotiationVerb, SubnegotiationErrorKind, TelnetOption, consts};
use bytes::BufMut;

/// One item of a STATUS IS report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StatusEntry {
    /// `WILL|WONT|DO|DONT <option>`
    Negotiation(NegotiationVerb, TelnetOption),
    /// `SB <option> <data> SE`, with `data` unescaped
    Subnegotiation(TelnetOption, Vec<u8>),
}

/// A STATUS payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StatusMessage {
    /// Request for the peer's view of option state
    Send,
    /// Report of option state
    Is(Vec<StatusEntry>),
}

impl StatusMessage {
    /// Decodes a STATUS payload. SE bytes doubled on the wire are undoubled.
    pub fn decode(data: &[u8]) -> CodecResult<Self> {
        let invalid = |description: &str| {
            CodecError::subnegotiation(
                consts::option::STATUS,
                SubnegotiationErrorKind::InvalidValue {
                    description: description.to_string(),
                },
            )
        };
        let Some((&qualifier, mut body)) = data.split_first() else {
            return Err(CodecError::subnegotiation(
                consts::option::STATUS,
                SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            ));
        };
        match qualifier {
            consts::qualifier::SEND => return Ok(StatusMessage::Send),
            consts::qualifier::IS => {}
            other => {
                return Err(CodecError::subnegotiation(
                    consts::option::STATUS,
                    SubnegotiationErrorKind::InvalidCommand {
                        command: other,
                        expected: Some(vec![consts::qualifier::IS, consts::qualifier::SEND]),
                    },
                ));
            }
        }

        let mut entries = Vec::new();
        while let Some((&lead, rest)) = body.split_first() {
            body = rest;
            if let Some(verb) = NegotiationVerb::from_u8(lead) {
                let option = take_byte(&mut body).ok_or_else(|| invalid("truncated negotiation entry"))?;
                entries.push(StatusEntry::Negotiation(verb, TelnetOption::from_u8(option)));
            } else if lead == consts::SB {
                let option = take_byte(&mut body).ok_or_else(|| invalid("truncated subnegotiation entry"))?;
                let mut payload = Vec::new();
                loop {
                    match body {
                        [consts::SE, consts::SE, rest @ ..] => {
                            payload.push(consts::SE);
                            body = rest;
                        }
                        [consts::SE, rest @ ..] => {
                            body = rest;
                            break;
                        }
                        [byte, rest @ ..] => {
                            payload.push(*byte);
                            body = rest;
                        }
                        [] => return Err(invalid("unterminated subnegotiation entry")),
                    }
                }
                entries.push(StatusEntry::Subnegotiation(TelnetOption::from_u8(option), payload));
            } else {
                return Err(CodecError::subnegotiation(
                    consts::option::STATUS,
                    SubnegotiationErrorKind::InvalidVerb { verb: lead },
                ));
            }
        }
        Ok(StatusMessage::Is(entries))
    }

    /// Writes the payload, doubling SE bytes that are not terminators.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> usize {
        let entries = match self {
            StatusMessage::Send => {
                dst.put_u8(consts::qualifier::SEND);
                return 1;
            }
            StatusMessage::Is(entries) => entries,
        };
        dst.put_u8(consts::qualifier::IS);
        let mut written = 1;
        for entry in entries {
            match entry {
                StatusEntry::Negotiation(verb, option) => {
                    dst.put_u8(verb.to_u8());
                    written += 1 + put_doubling_se(&[option.to_u8()], dst);
                }
                StatusEntry::Subnegotiation(option, payload) => {
                    dst.put_u8(consts::SB);
                    written += 1 + put_doubling_se(&[option.to_u8()], dst);
                    written += put_doubling_se(payload, dst);
                    dst.put_u8(consts::SE);
                    written += 1;
                }
            }
        }
        written
    }
}

fn take_byte(body: &mut &[u8]) -> Option<u8> {
    let (&first, rest) = body.split_first()?;
    *body = match (first, rest) {
        (consts::SE, [consts::SE, tail @ ..]) => tail,
        _ => rest,
    };
    Some(first)
}

fn put_doubling_se<T: BufMut>(bytes: &[u8], dst: &mut T) -> usize {
    let mut written = 0;
    for &byte in bytes {
        if byte == consts::SE {
            dst.put_u8(consts::SE);
            written += 1;
        }
        dst.put_u8(byte);
        written += 1;
    }
    written
}
