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


//! # TELNET Server Session
//!
//! The per-connection half of a TELNET daemon. A [`Session`] sits between a
//! network connection and a local endpoint (a shell behind a
//! pseudo-terminal) and speaks the server side of the protocol: option
//! negotiation, LINEMODE with its special character table, the SYNCH
//! mechanism and the information options a client reports about itself.
//!
//! ## Layout
//!
//! - [`ByteBuffer`] and [`Buffers`]: the four fixed-size queues a session
//!   moves bytes through
//! - [`Engine`]: protocol state and the reaction to every frame
//! - [`NetworkEndpoint`] and [`LocalEndpoint`]: the non-blocking seams to
//!   the outside world, with [`pty_pair`] as an in-memory local endpoint
//! - [`Session`]: the loop that ties them together
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use telnetd_session::{NetworkEndpoint, Session, SessionConfig, pty_pair};
//!
//! async fn serve<N: NetworkEndpoint>(network: N) {
//!     let (device, shell) = pty_pair(1024);
//!     tokio::spawn(async move {
//!         let mut buf = [0u8; 256];
//!         while shell.read(&mut buf).await > 0 {
//!             shell.write_all(b"ok\r\n").await;
//!         }
//!     });
//!     let mut session = Session::new(Arc::new(SessionConfig::default()), network, device);
//!     if let Ok(summary) = session.run().await {
//!         println!("closed: {}", summary.reason);
//!     }
//! }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod buffer;
mod clocks;
mod config;
mod endpoint;
mod engine;
mod error;
mod event;
mod pty;
mod session;
mod slc;
mod terminal;
mod urgent;

pub use self::buffer::{Buffers, ByteBuffer};
pub use self::clocks::{Clocks, Stamp};
pub use self::config::{LocalIdentity, NegotiationPolicy, SessionConfig, UrgentPolicy};
pub use self::endpoint::{LocalEndpoint, NetworkEndpoint};
pub use self::engine::{Engine, LinemodeKind};
pub use self::error::{SessionError, SessionResult};
pub use self::event::SessionEvent;
pub use self::pty::{PtyDevice, PtyHandle, pty_pair};
pub use self::session::{CloseReason, PollStatus, Session, SessionStats, SessionSummary};
pub use self::slc::{ControlChar, SlcEntry, SlcOutcome, SlcTable};
pub use self::terminal::{ClientInfo, TerminalMode};
