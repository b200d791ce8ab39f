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


//! Error types for the TELNET server

use telnetd_session::SessionError;
use thiserror::Error;

/// Result type for server operations
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// TELNET server error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// I/O error from the listener or an accepted socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A session ended with an error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Maximum number of connections reached
    #[error("Maximum connections ({0}) reached")]
    ConnectionLimit(usize),

    /// Server is not running
    #[error("Server not running")]
    NotRunning,

    /// Server is already running
    #[error("Server already running")]
    AlreadyRunning,

    /// Configuration rejected by `ServerConfig::validate`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

impl ServerError {
    /// Check if the error only affects a single connection
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ServerError::Io(_) | ServerError::Session(_) | ServerError::ConnectionLimit(_)
        )
    }
}
