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


//! The two byte-stream endpoints a session bridges.
//!
//! Reads and writes are non-blocking: "nothing to do right now" is an
//! [`std::io::ErrorKind::WouldBlock`] error. Waiting happens only in the
//! `ready` methods, which the session awaits when a poll made no progress.

use crate::terminal::TerminalMode;
use async_trait::async_trait;
use std::io;
use tokio::io::{Interest, Ready};

/// The network side of a session.
#[async_trait]
pub trait NetworkEndpoint: Send {
    /// Reads into `buf`. `Ok(0)` means the peer closed the connection.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes from `buf`, returning how many bytes were taken.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Whether urgent data is waiting ahead in the stream.
    fn has_out_of_band_pending(&self) -> io::Result<bool>;

    /// Sends one byte flagged as urgent data.
    fn send_out_of_band(&mut self, byte: u8) -> io::Result<()>;

    /// Whether [`NetworkEndpoint::send_out_of_band`] really sends urgent data.
    fn supports_out_of_band(&self) -> bool {
        false
    }

    /// Waits until one of `interest` is ready.
    async fn ready(&mut self, interest: Interest) -> io::Result<Ready>;

    /// Closes the write half after the final flush.
    async fn shutdown(&mut self) -> io::Result<()>;
}

/// The local side of a session: a shell or line editor behind a
/// pseudo-terminal-like device.
#[async_trait]
pub trait LocalEndpoint: Send {
    /// Delivers decoded client keystrokes. Returns how many were accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Reads output destined for the client.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Keystrokes written but not yet consumed by the shell
    fn input_pending(&self) -> usize;

    /// Output waiting to be read
    fn output_pending(&self) -> usize;

    /// Whether the shell went away and all of its output has been read
    fn is_closed(&self) -> bool;

    /// Applies a new terminal mode.
    fn set_terminal_mode(&mut self, _mode: &TerminalMode) {}

    /// Tells the shell the client is gone.
    fn hangup(&mut self) {}

    /// Waits until output is available or the endpoint closed.
    async fn ready(&mut self) {
        std::future::pending::<()>().await;
    }
}
