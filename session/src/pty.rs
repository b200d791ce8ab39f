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


//! In-memory pseudo-terminal.
//!
//! [`pty_pair`] returns the session side ([`PtyDevice`], a
//! [`LocalEndpoint`]) and the shell side ([`PtyHandle`]). Keystrokes flow
//! from the device to the handle, output flows back.

use crate::endpoint::LocalEndpoint;
use crate::terminal::TerminalMode;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::trace;

#[derive(Debug, Default)]
struct PtyState {
    keystrokes: VecDeque<u8>,
    output: VecDeque<u8>,
    mode: TerminalMode,
    mode_generation: u64,
    closed: bool,
    hung_up: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<PtyState>,
    capacity: usize,
    to_session: Notify,
    to_shell: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PtyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a connected device/handle pair. `capacity` bounds both the
/// keystroke queue and the output queue.
pub fn pty_pair(capacity: usize) -> (PtyDevice, PtyHandle) {
    let shared = Arc::new(Shared {
        state: Mutex::new(PtyState::default()),
        capacity,
        to_session: Notify::new(),
        to_shell: Notify::new(),
    });
    (
        PtyDevice {
            shared: Arc::clone(&shared),
        },
        PtyHandle { shared },
    )
}

/// Session side of the pseudo-terminal
#[derive(Debug)]
pub struct PtyDevice {
    shared: Arc<Shared>,
}

#[async_trait]
impl LocalEndpoint for PtyDevice {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.shared.lock();
        if state.closed {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let room = self.shared.capacity.saturating_sub(state.keystrokes.len());
        if room == 0 {
            return Err(io::Error::from(io::ErrorKind::WouldBlock));
        }
        let count = room.min(data.len());
        state.keystrokes.extend(&data[..count]);
        drop(state);
        self.shared.to_shell.notify_one();
        Ok(count)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.shared.lock();
        if state.output.is_empty() {
            return Err(io::Error::from(io::ErrorKind::WouldBlock));
        }
        let count = buf.len().min(state.output.len());
        for (slot, byte) in buf.iter_mut().zip(state.output.drain(..count)) {
            *slot = byte;
        }
        drop(state);
        self.shared.to_shell.notify_one();
        Ok(count)
    }

    fn input_pending(&self) -> usize {
        self.shared.lock().keystrokes.len()
    }

    fn output_pending(&self) -> usize {
        self.shared.lock().output.len()
    }

    fn is_closed(&self) -> bool {
        let state = self.shared.lock();
        state.closed && state.output.is_empty()
    }

    fn set_terminal_mode(&mut self, mode: &TerminalMode) {
        let mut state = self.shared.lock();
        state.mode = mode.clone();
        state.mode_generation += 1;
        drop(state);
        trace!(echo = mode.echo, line_edit = mode.line_edit, "Terminal mode updated");
        self.shared.to_shell.notify_one();
    }

    fn hangup(&mut self) {
        self.shared.lock().hung_up = true;
        self.shared.to_shell.notify_one();
    }

    async fn ready(&mut self) {
        loop {
            {
                let state = self.shared.lock();
                if !state.output.is_empty() || state.closed {
                    return;
                }
            }
            self.shared.to_session.notified().await;
        }
    }
}

/// Shell side of the pseudo-terminal
#[derive(Clone, Debug)]
pub struct PtyHandle {
    shared: Arc<Shared>,
}

impl PtyHandle {
    /// Waits for keystrokes and moves them into `buf`. Returns 0 once the
    /// session hung up and nothing is left.
    pub async fn read(&self, buf: &mut [u8]) -> usize {
        loop {
            {
                let mut state = self.shared.lock();
                if !state.keystrokes.is_empty() {
                    let count = buf.len().min(state.keystrokes.len());
                    for (slot, byte) in buf.iter_mut().zip(state.keystrokes.drain(..count)) {
                        *slot = byte;
                    }
                    return count;
                }
                if state.hung_up {
                    return 0;
                }
            }
            self.shared.to_shell.notified().await;
        }
    }

    /// Takes whatever keystrokes are queued.
    pub fn try_read(&self) -> Vec<u8> {
        self.shared.lock().keystrokes.drain(..).collect()
    }

    /// Queues as much output as fits and returns the number of bytes
    /// taken. Returns 0 when the queue is full or the session hung up.
    pub fn write(&self, data: &[u8]) -> usize {
        let mut state = self.shared.lock();
        if state.hung_up {
            return 0;
        }
        let count = self
            .shared
            .capacity
            .saturating_sub(state.output.len())
            .min(data.len());
        state.output.extend(&data[..count]);
        drop(state);
        if count > 0 {
            self.shared.to_session.notify_one();
        }
        count
    }

    /// Queues all of `data`, waiting for the session to drain the queue
    /// when it fills. Output left over after a hangup is dropped.
    pub async fn write_all(&self, mut data: &[u8]) {
        while !data.is_empty() {
            let written = self.write(data);
            data = &data[written..];
            if data.is_empty() {
                return;
            }
            let notified = self.shared.to_shell.notified();
            if self.is_hung_up() {
                trace!(dropped = data.len(), "Session gone, dropping output");
                return;
            }
            if self.shared.lock().output.len() < self.shared.capacity {
                continue;
            }
            notified.await;
        }
    }

    /// Current terminal mode
    pub fn mode(&self) -> TerminalMode {
        self.shared.lock().mode.clone()
    }

    /// Number of mode updates received so far
    pub fn mode_generation(&self) -> u64 {
        self.shared.lock().mode_generation
    }

    /// Whether the session hung up
    pub fn is_hung_up(&self) -> bool {
        self.shared.lock().hung_up
    }

    /// Ends the shell. Output already written is still delivered.
    pub fn close(&self) {
        self.shared.lock().closed = true;
        self.shared.to_session.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystrokes_flow_to_shell() {
        let (mut device, handle) = pty_pair(4);
        assert_eq!(device.write(b"abcdef").unwrap(), 4);
        assert_eq!(device.input_pending(), 4);
        assert_eq!(
            device.write(b"x").unwrap_err().kind(),
            io::ErrorKind::WouldBlock
        );
        assert_eq!(handle.try_read(), b"abcd");
        assert_eq!(device.input_pending(), 0);
    }

    #[test]
    fn test_output_flows_to_session() {
        let (mut device, handle) = pty_pair(16);
        handle.write(b"hello");
        assert_eq!(device.output_pending(), 5);
        let mut buf = [0u8; 3];
        assert_eq!(device.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(device.output_pending(), 2);
    }

    #[test]
    fn test_output_bounded_by_capacity() {
        let (mut device, handle) = pty_pair(4);
        assert_eq!(handle.write(b"abcdef"), 4);
        assert_eq!(handle.write(b"x"), 0);
        assert_eq!(device.output_pending(), 4);
        let mut buf = [0u8; 8];
        assert_eq!(device.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"abcd");
        assert_eq!(handle.write(b"ef"), 2);
    }

    #[tokio::test]
    async fn test_write_all_waits_for_drain() {
        let (mut device, handle) = pty_pair(4);
        let writer = tokio::spawn(async move {
            handle.write_all(b"abcdefgh").await;
        });
        let mut received = Vec::new();
        let mut buf = [0u8; 8];
        while received.len() < 8 {
            device.ready().await;
            if let Ok(count) = device.read(&mut buf) {
                received.extend_from_slice(&buf[..count]);
            }
        }
        writer.await.unwrap();
        assert_eq!(received, b"abcdefgh");
    }

    #[test]
    fn test_write_after_hangup_is_dropped() {
        let (mut device, handle) = pty_pair(16);
        device.hangup();
        assert_eq!(handle.write(b"late"), 0);
        assert_eq!(device.output_pending(), 0);
    }

    #[test]
    fn test_close_waits_for_output_to_drain() {
        let (mut device, handle) = pty_pair(16);
        handle.write(b"bye");
        handle.close();
        assert!(!device.is_closed());
        let mut buf = [0u8; 8];
        device.read(&mut buf).unwrap();
        assert!(device.is_closed());
        assert!(device.write(b"x").is_err());
    }

    #[tokio::test]
    async fn test_shell_read_wakes_on_write() {
        let (mut device, handle) = pty_pair(16);
        let reader = tokio::spawn(async move {
            let mut buf = [0u8; 8];
            let count = handle.read(&mut buf).await;
            buf[..count].to_vec()
        });
        tokio::task::yield_now().await;
        device.write(b"ls\r").unwrap();
        assert_eq!(reader.await.unwrap(), b"ls\r");
    }

    #[tokio::test]
    async fn test_hangup_ends_shell_read() {
        let (mut device, handle) = pty_pair(16);
        device.hangup();
        let mut buf = [0u8; 8];
        assert_eq!(handle.read(&mut buf).await, 0);
        assert!(handle.is_hung_up());
    }

    #[tokio::test]
    async fn test_device_ready_on_output() {
        let (mut device, handle) = pty_pair(16);
        handle.write(b"$ ");
        device.ready().await;
        assert_eq!(device.output_pending(), 2);
    }

    #[test]
    fn test_mode_published() {
        let (mut device, handle) = pty_pair(16);
        let mode = TerminalMode {
            echo: true,
            ..TerminalMode::default()
        };
        device.set_terminal_mode(&mode);
        assert!(handle.mode().echo);
        assert_eq!(handle.mode_generation(), 1);
    }
}
