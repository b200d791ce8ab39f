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


//! Bounded byte buffers shared by the bridge, the negotiation engine and
//! the urgent handler.
//!
//! A [`ByteBuffer`] is a fixed region with a write cursor (`front`) and a
//! read cursor (`back`). Bytes between the two are pending. Writes only go
//! to the tail (`front..capacity`); space freed at the head is reclaimed
//! when the buffer drains and both cursors return to the origin. Keeping
//! items anchored at the origin is what lets [`ByteBuffer::netclear`] walk
//! net-out item by item.

use crate::error::{SessionError, SessionResult};
use bytes::Buf;
use telnetd_codec::consts;

/// A bounded byte buffer with front/back cursors and an urgent mark.
#[derive(Clone)]
pub struct ByteBuffer {
    name: &'static str,
    data: Box<[u8]>,
    front: usize,
    back: usize,
    urgent: Option<usize>,
}

impl ByteBuffer {
    /// Creates an empty buffer of `capacity` bytes.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            data: vec![0; capacity].into_boxed_slice(),
            front: 0,
            back: 0,
            urgent: None,
        }
    }

    /// Name used in errors and logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total size of the region
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Pending bytes
    pub fn len(&self) -> usize {
        self.front - self.back
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.front == self.back
    }

    /// Write cursor
    pub fn front(&self) -> usize {
        self.front
    }

    /// Read cursor
    pub fn back(&self) -> usize {
        self.back
    }

    /// Bytes that can still be written before the region ends
    pub fn tail_room(&self) -> usize {
        self.data.len() - self.front
    }

    /// True when fewer than two bytes of tail room remain, which is not
    /// enough for a doubled IAC.
    pub fn is_full(&self) -> bool {
        self.tail_room() < 2
    }

    /// The pending bytes
    pub fn pending(&self) -> &[u8] {
        &self.data[self.back..self.front]
    }

    /// Appends `bytes` or fails without writing anything.
    pub fn write(&mut self, bytes: &[u8]) -> SessionResult<()> {
        let available = self.tail_room();
        if bytes.len() > available {
            return Err(SessionError::BufferFull {
                buffer: self.name,
                needed: bytes.len(),
                available,
            });
        }
        self.data[self.front..self.front + bytes.len()].copy_from_slice(bytes);
        self.front += bytes.len();
        Ok(())
    }

    /// Appends a single byte.
    pub fn put(&mut self, byte: u8) -> SessionResult<()> {
        self.write(&[byte])
    }

    /// Appends as much of `bytes` as fits, doubling every IAC. A byte is
    /// never split from its doubling. Returns how many source bytes were
    /// taken.
    pub fn write_escaped(&mut self, bytes: &[u8]) -> usize {
        let mut taken = 0;
        for &byte in bytes {
            let needed = if byte == consts::IAC { 2 } else { 1 };
            if self.tail_room() < needed {
                break;
            }
            if byte == consts::IAC {
                self.data[self.front] = consts::IAC;
                self.front += 1;
            }
            self.data[self.front] = byte;
            self.front += 1;
            taken += 1;
        }
        taken
    }

    /// Appends all of `bytes` with every IAC doubled, or fails without
    /// writing anything.
    pub fn write_all_escaped(&mut self, bytes: &[u8]) -> SessionResult<()> {
        let needed = bytes.len() + bytes.iter().filter(|&&b| b == consts::IAC).count();
        let available = self.tail_room();
        if needed > available {
            return Err(SessionError::BufferFull {
                buffer: self.name,
                needed,
                available,
            });
        }
        self.write_escaped(bytes);
        Ok(())
    }

    /// Marks pending bytes as consumed and compacts when drained.
    pub fn consume(&mut self, count: usize) {
        self.back = (self.back + count).min(self.front);
        if let Some(boundary) = self.urgent {
            if self.back >= boundary {
                self.urgent = None;
            }
        }
        self.compact();
    }

    /// Drops everything pending.
    pub fn clear(&mut self) {
        self.back = self.front;
        self.compact();
    }

    /// Free tail region for a direct read into the buffer.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.front..]
    }

    /// Accepts `count` bytes written into [`ByteBuffer::spare_mut`].
    pub fn commit(&mut self, count: usize) {
        self.front = (self.front + count).min(self.data.len());
    }

    /// Records the write cursor as the urgent boundary.
    pub fn mark_urgent(&mut self) {
        self.urgent = Some(self.front);
    }

    /// Urgent boundary, if one is pending
    pub fn urgent(&self) -> Option<usize> {
        self.urgent
    }

    /// Forgets the urgent boundary.
    pub fn clear_urgent(&mut self) {
        self.urgent = None;
    }

    /// Discards queued data from net-out while keeping the stream
    /// well-formed.
    ///
    /// An item already partly sent keeps its unsent tail. After it, only
    /// IAC commands other than EC and EL survive, moved down to the origin
    /// in order. Escaped data (`IAC IAC`) counts as data. The urgent mark is
    /// dropped.
    pub fn netclear(&mut self) {
        let mut item = 0;
        let mut kept = Vec::with_capacity(self.len());
        while item < self.front {
            let next = next_item(&self.data[..self.front], item);
            if next > self.back {
                if item < self.back {
                    kept.extend_from_slice(&self.data[self.back..next]);
                } else if wanted(&self.data[item..next]) {
                    kept.extend_from_slice(&self.data[item..next]);
                }
            }
            item = next;
        }
        self.data[..kept.len()].copy_from_slice(&kept);
        self.back = 0;
        self.front = kept.len();
        self.urgent = None;
    }

    fn compact(&mut self) {
        if self.back == self.front {
            self.back = 0;
            self.front = 0;
            self.urgent = None;
        }
    }
}

impl std::fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("name", &self.name)
            .field("capacity", &self.data.len())
            .field("back", &self.back)
            .field("front", &self.front)
            .field("urgent", &self.urgent)
            .finish()
    }
}

impl Buf for ByteBuffer {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.pending()
    }

    fn advance(&mut self, cnt: usize) {
        self.consume(cnt);
    }
}

/// End of the item starting at `start`: one data byte, a two byte command,
/// a three byte negotiation or a whole `IAC SB ... IAC SE` block. Clamped
/// to the end of `data`.
fn next_item(data: &[u8], start: usize) -> usize {
    if data[start] != consts::IAC || start + 1 >= data.len() {
        return start + 1;
    }
    match data[start + 1] {
        consts::WILL | consts::WONT | consts::DO | consts::DONT => (start + 3).min(data.len()),
        consts::SB => {
            let mut index = start + 2;
            while index + 1 < data.len() {
                if data[index] == consts::IAC {
                    if data[index + 1] == consts::SE {
                        return index + 2;
                    }
                    index += 2;
                } else {
                    index += 1;
                }
            }
            data.len()
        }
        _ => start + 2,
    }
}

fn wanted(item: &[u8]) -> bool {
    match item {
        [consts::IAC, command, ..] => {
            !matches!(*command, consts::EC | consts::EL | consts::IAC)
        }
        _ => false,
    }
}

/// The four buffers of a session.
#[derive(Debug)]
pub struct Buffers {
    /// Bytes received from the network, not yet parsed
    pub net_in: ByteBuffer,
    /// Bytes waiting to be sent to the network
    pub net_out: ByteBuffer,
    /// Output read from the local endpoint, not yet bridged to net-out
    pub local_in: ByteBuffer,
    /// Decoded keystrokes waiting to be written to the local endpoint
    pub local_out: ByteBuffer,
}

impl Buffers {
    /// Four buffers of `capacity` bytes each.
    pub fn new(capacity: usize) -> Self {
        Self {
            net_in: ByteBuffer::new("net_in", capacity),
            net_out: ByteBuffer::new("net_out", capacity),
            local_in: ByteBuffer::new("local_in", capacity),
            local_out: ByteBuffer::new("local_out", capacity),
        }
    }
}
