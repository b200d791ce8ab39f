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


//! Round trips through the buffer bridge in both directions

mod common;

use bytes::BytesMut;
use common::*;
use proptest::prelude::*;
use telnetd_codec::{TelnetFrame, escape_data};

fn wire_to_data(bytes: &[u8]) -> Vec<u8> {
    frames(bytes)
        .into_iter()
        .map(|frame| match frame {
            TelnetFrame::Data(byte) => byte,
            other => panic!("unexpected frame {other:?}"),
        })
        .collect()
}

#[test]
fn test_documented_escape_example() {
    let mut h = harness(quiet_config());
    h.shell.write(b"A\xFFB");
    h.pump();
    let wire = h.peer.take_output();
    assert_eq!(wire, [0x41, 0xFF, 0xFF, 0x42]);
    assert_eq!(wire_to_data(&wire), b"A\xFFB");
}

#[test]
fn test_escaped_input_reaches_shell() {
    let mut h = harness(quiet_config());
    h.peer.push_input(&[b'x', IAC, IAC, b'y']);
    h.pump();
    assert_eq!(h.shell.try_read(), [b'x', 0xFF, b'y']);
}

proptest! {
    #[test]
    fn local_output_survives_the_wire(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut h = harness(quiet_config());
        h.shell.write(&data);
        h.pump();
        let wire = h.peer.take_output();
        prop_assert_eq!(wire_to_data(&wire), data);
    }

    #[test]
    fn binary_input_survives_the_wire(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut h = harness(quiet_config().with_map_crlf(false));
        h.peer.push_input(&[IAC, WILL, 0]);
        h.pump();
        h.peer.take_output();

        let mut wire = BytesMut::new();
        escape_data(&data, &mut wire);
        h.peer.push_input(&wire);
        h.pump();
        prop_assert_eq!(h.shell.try_read(), data);
    }
}
