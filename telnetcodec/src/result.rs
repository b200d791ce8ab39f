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


/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while decoding or encoding TELNET data.
///
/// Framing problems never surface here: the decoder waits for more bytes
/// instead. These errors describe payloads that were fully framed but could
/// not be interpreted, and I/O failures from writer based encoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// A suboption payload could not be interpreted.
    SubnegotiationError {
        /// The option being subnegotiated
        option: Option<u8>,
        /// Specific reason for the failure
        reason: SubnegotiationErrorKind,
    },

    /// An unknown telnet command byte was encountered.
    UnknownCommand(u8),
}

impl CodecError {
    /// Shorthand for a suboption payload error.
    pub fn subnegotiation(option: u8, reason: SubnegotiationErrorKind) -> Self {
        CodecError::SubnegotiationError {
            option: Some(option),
            reason,
        }
    }
}

/// Specific kinds of subnegotiation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnegotiationErrorKind {
    /// Insufficient data available to decode the subnegotiation.
    InsufficientData {
        /// Number of bytes required
        required: usize,
        /// Number of bytes available
        available: usize,
    },

    /// Invalid command or qualifier byte in the subnegotiation data.
    InvalidCommand {
        /// The invalid command byte
        command: u8,
        /// Expected command bytes, if known
        expected: Option<Vec<u8>>,
    },

    /// Invalid verb (DO/DONT/WILL/WONT) inside the payload.
    InvalidVerb {
        /// The invalid verb byte
        verb: u8,
    },

    /// A field held a value outside its domain.
    InvalidValue {
        /// Description of the offending field
        description: String,
    },
}

impl std::error::Error for CodecError {}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::IOError { kind, operation } => {
                write!(f, "I/O error during {}: {:?}", operation, kind)
            }
            CodecError::SubnegotiationError { option, reason } => {
                if let Some(opt) = option {
                    write!(f, "Subnegotiation error for option {}: {}", opt, reason)
                } else {
                    write!(f, "Subnegotiation error: {}", reason)
                }
            }
            CodecError::UnknownCommand(cmd) => {
                write!(f, "Unknown telnet command: 0x{:02X}", cmd)
            }
        }
    }
}

impl std::fmt::Display for SubnegotiationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubnegotiationErrorKind::InsufficientData {
                required,
                available,
            } => {
                write!(
                    f,
                    "insufficient data (required: {}, available: {})",
                    required, available
                )
            }
            SubnegotiationErrorKind::InvalidCommand { command, expected } => {
                if let Some(exp) = expected {
                    write!(
                        f,
                        "invalid command 0x{:02X} (expected one of: {:?})",
                        command, exp
                    )
                } else {
                    write!(f, "invalid command: 0x{:02X}", command)
                }
            }
            SubnegotiationErrorKind::InvalidVerb { verb } => {
                write!(f, "invalid verb: 0x{:02X}", verb)
            }
            SubnegotiationErrorKind::InvalidValue { description } => {
                write!(f, "invalid value: {}", description)
            }
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_subnegotiation_error() {
        let err = CodecError::subnegotiation(
            31,
            SubnegotiationErrorKind::InsufficientData {
                required: 4,
                available: 3,
            },
        );
        assert_eq!(
            err.to_string(),
            "Subnegotiation error for option 31: insufficient data (required: 4, available: 3)"
        );
    }

    #[test]
    fn test_from_io_error_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::WriteZero, "short write");
        match CodecError::from(io) {
            CodecError::IOError { kind, .. } => assert_eq!(kind, std::io::ErrorKind::WriteZero),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
