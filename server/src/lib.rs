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


//! TELNET Server
//!
//! Listener plumbing around [`telnetd_session`]: a tokio accept loop that
//! runs one [`telnetd_session::Session`] per TCP connection.
//!
//! ```text
//! TelnetServer (accept loop, registry, metrics)
//!     ↓
//! Session<TcpNetwork, ShellFactory::Endpoint>
//! ```
//!
//! See [`TelnetServer`] for a complete example.

mod config;
mod error;
mod metrics;
mod network;
mod server;
mod types;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use metrics::{MetricsSnapshot, ServerMetrics};
pub use network::TcpNetwork;
pub use server::{ShellFactory, TelnetServer};
pub use types::{ConnectionId, ConnectionInfo, ConnectionState, ServerSnapshot};
