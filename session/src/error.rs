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


//! Error types for the session engine

use telnetd_codec::CodecError;
use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Session error types
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O error from one of the endpoints
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the codec layer
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A write did not fit in a bounded buffer
    #[error("Buffer {buffer} full: needed {needed} bytes, {available} available")]
    BufferFull {
        /// Name of the buffer
        buffer: &'static str,
        /// Bytes the write required
        needed: usize,
        /// Bytes that were free
        available: usize,
    },

    /// The session has already finished
    #[error("Session closed")]
    Closed,
}

impl SessionError {
    /// Whether the error ends the session.
    ///
    /// Buffer exhaustion is backpressure and never fatal. Codec errors come
    /// from a single malformed suboption and only drop that suboption.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Io(_) | SessionError::Closed)
    }

    /// Whether the producer should retry after the next flush
    pub fn is_backpressure(&self) -> bool {
        matches!(self, SessionError::BufferFull { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let full = SessionError::BufferFull {
            buffer: "net_out",
            needed: 3,
            available: 1,
        };
        assert!(full.is_backpressure());
        assert!(!full.is_fatal());
        assert!(SessionError::Closed.is_fatal());
        let io = SessionError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(io.is_fatal());
        assert!(!io.is_backpressure());
    }

    #[test]
    fn test_error_display() {
        let err = SessionError::BufferFull {
            buffer: "local_out",
            needed: 10,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "Buffer local_out full: needed 10 bytes, 4 available"
        );
        assert_eq!(SessionError::Closed.to_string(), "Session closed");
    }
}
