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


//! SYNCH handling: urgent-aware flushing of net-out and discarding of
//! local-out up to a Data Mark.

use crate::buffer::ByteBuffer;

/// What the next network flush should send.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FlushPlan {
    /// Send this many bytes in-band.
    Normal(usize),
    /// Send the next byte as urgent data.
    OutOfBand,
}

/// Plans one flush of `net_out`.
///
/// With an urgent boundary pending and a network that can send urgent
/// data, everything before the last byte ahead of the boundary goes out
/// normally and that byte is then sent on its own as urgent data.
pub(crate) fn plan_flush(net_out: &ByteBuffer, urgent_capable: bool) -> FlushPlan {
    match net_out.urgent() {
        Some(boundary) if urgent_capable && boundary > net_out.back() => {
            let ahead = boundary - net_out.back();
            if ahead > 1 {
                FlushPlan::Normal(ahead - 1)
            } else {
                FlushPlan::OutOfBand
            }
        }
        _ => FlushPlan::Normal(net_out.len()),
    }
}

/// Discards the keystrokes queued for the local endpoint. Bytes already
/// written to it are out of reach.
pub(crate) fn clear_to_synch(local_out: &mut ByteBuffer) {
    local_out.clear();
}
