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


//! Environment options: NEW-ENVIRON (RFC 1572) and OLD-ENVIRON (RFC 1408).

use crate::consts::environ as env;
use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};
use bytes::BufMut;

/// Which of the two environment options a payload belongs to.
///
/// The old option is decoded with the BSD codes, where VAR and VALUE are
/// swapped relative to the new option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EnvironDialect {
    /// NEW-ENVIRON
    New,
    /// OLD-ENVIRON
    Old,
}

impl EnvironDialect {
    fn var(self) -> u8 {
        match self {
            EnvironDialect::New => env::VAR,
            EnvironDialect::Old => env::OLD_VAR,
        }
    }

    fn value(self) -> u8 {
        match self {
            EnvironDialect::New => env::VALUE,
            EnvironDialect::Old => env::OLD_VALUE,
        }
    }

    fn option(self) -> u8 {
        match self {
            EnvironDialect::New => consts::option::NEW_ENVIRON,
            EnvironDialect::Old => consts::option::OLD_ENVIRON,
        }
    }
}

/// Qualifier of an environment payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EnvironCommand {
    /// Reply to SEND
    Is,
    /// Request for variables
    Send,
    /// Unsolicited update
    Info,
}

/// Variable namespace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EnvironKind {
    /// Well-known variable (USER, DISPLAY, ...)
    Var,
    /// User-defined variable
    UserVar,
}

/// One variable entry. In a SEND request `value` is always `None`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvironVariable {
    /// Namespace
    pub kind: EnvironKind,
    /// Variable name
    pub name: String,
    /// Value, absent when the variable is undefined or requested
    pub value: Option<String>,
}

impl EnvironVariable {
    /// A well-known variable with a value.
    pub fn var(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvironVariable {
            kind: EnvironKind::Var,
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A user variable with a value.
    pub fn user_var(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvironVariable {
            kind: EnvironKind::UserVar,
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// A decoded environment payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvironMessage {
    /// Qualifier
    pub command: EnvironCommand,
    /// Variables in wire order
    pub variables: Vec<EnvironVariable>,
}

impl EnvironMessage {
    /// Decodes a payload in the given dialect.
    pub fn decode(data: &[u8], dialect: EnvironDialect) -> CodecResult<Self> {
        let Some((&command, body)) = data.split_first() else {
            return Err(CodecError::subnegotiation(
                dialect.option(),
                SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            ));
        };
        let command = match command {
            consts::qualifier::IS => EnvironCommand::Is,
            consts::qualifier::SEND => EnvironCommand::Send,
            consts::qualifier::INFO => EnvironCommand::Info,
            other => {
                return Err(CodecError::subnegotiation(
                    dialect.option(),
                    SubnegotiationErrorKind::InvalidCommand {
                        command: other,
                        expected: Some(vec![
                            consts::qualifier::IS,
                            consts::qualifier::SEND,
                            consts::qualifier::INFO,
                        ]),
                    },
                ));
            }
        };

        let mut variables = Vec::new();
        let mut current: Option<(EnvironKind, Vec<u8>, Option<Vec<u8>>)> = None;
        let mut escaped = false;
        for &byte in body {
            if !escaped {
                if byte == env::ESC {
                    escaped = true;
                    continue;
                }
                let kind = if byte == dialect.var() {
                    Some(EnvironKind::Var)
                } else if byte == env::USERVAR {
                    Some(EnvironKind::UserVar)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    variables.extend(current.take().map(finish));
                    current = Some((kind, Vec::new(), None));
                    continue;
                }
                if byte == dialect.value() {
                    if let Some((_, _, value)) = current.as_mut() {
                        *value = Some(Vec::new());
                    }
                    continue;
                }
            }
            escaped = false;
            if let Some((_, name, value)) = current.as_mut() {
                match value {
                    Some(value) => value.push(byte),
                    None => name.push(byte),
                }
            }
        }
        variables.extend(current.map(finish));
        Ok(EnvironMessage { command, variables })
    }

    /// Writes the payload in the given dialect, escaping delimiter bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T, dialect: EnvironDialect) -> usize {
        let mut written = 1;
        dst.put_u8(match self.command {
            EnvironCommand::Is => consts::qualifier::IS,
            EnvironCommand::Send => consts::qualifier::SEND,
            EnvironCommand::Info => consts::qualifier::INFO,
        });
        for variable in &self.variables {
            dst.put_u8(match variable.kind {
                EnvironKind::Var => dialect.var(),
                EnvironKind::UserVar => env::USERVAR,
            });
            written += 1 + put_escaped(variable.name.as_bytes(), dst);
            if let Some(value) = &variable.value {
                dst.put_u8(dialect.value());
                written += 1 + put_escaped(value.as_bytes(), dst);
            }
        }
        written
    }
}

fn finish((kind, name, value): (EnvironKind, Vec<u8>, Option<Vec<u8>>)) -> EnvironVariable {
    EnvironVariable {
        kind,
        name: String::from_utf8_lossy(&name).into_owned(),
        value: value.map(|v| String::from_utf8_lossy(&v).into_owned()),
    }
}

fn put_escaped<T: BufMut>(bytes: &[u8], dst: &mut T) -> usize {
    let mut written = 0;
    for &byte in bytes {
        if byte <= env::USERVAR {
            dst.put_u8(env::ESC);
            written += 1;
        }
        dst.put_u8(byte);
        written += 1;
    }
    written
}
