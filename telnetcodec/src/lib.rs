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


//! # Telnet Protocol Codec
//!
//! Byte-level building blocks for a TELNET server: a streaming frame codec,
//! the option state table and decoders for the suboption payloads a server
//! session handles.
//!
//! ## Overview
//!
//! - **Data transmission**: raw bytes with IAC doubling
//! - **Control commands**: Break, Interrupt Process, Abort Output, Data Mark and friends
//! - **Option negotiation**: DO, DONT, WILL and WONT, tracked by [`OptionTable`]
//! - **Subnegotiation**: `IAC SB <option> ... IAC SE`, decoded by [`TelnetArgument`]
//!
//! ## Core Components
//!
//! ### [`TelnetCodec`]
//!
//! Implements the `tokio_util::codec` [`Decoder`](tokio_util::codec::Decoder) and
//! [`Encoder`](tokio_util::codec::Encoder) traits. It can also decode from any
//! [`bytes::Buf`] through [`TelnetCodec::decode_buf`], which lets a caller parse a
//! bounded buffer in place and stop between frames.
//!
//! ### [`TelnetFrame`]
//!
//! One parsed unit of the stream: a data byte, a two-byte command, a
//! negotiation or a whole subnegotiation.
//!
//! ### [`OptionTable`]
//!
//! Per-option state and desired state for both sides, plus the outstanding
//! reply counters that keep negotiation from looping.
//!
//! ## Usage Example
//!
//! ```rust
//! use bytes::BytesMut;
//! use telnetd_codec::{TelnetCodec, TelnetFrame, TelnetOption};
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut codec = TelnetCodec::new();
//!
//! let mut output = BytesMut::new();
//! codec.encode(TelnetFrame::Will(TelnetOption::Echo), &mut output).unwrap();
//! assert_eq!(&output[..], &[0xFF, 0xFB, 0x01]);
//!
//! let mut input = BytesMut::from(&b"Hi\xFF\xFD\x01"[..]);
//! let mut frames = Vec::new();
//! while let Some(frame) = codec.decode(&mut input).unwrap() {
//!     frames.push(frame);
//! }
//! assert_eq!(frames.last(), Some(&TelnetFrame::Do(TelnetOption::Echo)));
//! ```
//!
//! ## Related RFCs
//!
//! - RFC 854: Telnet Protocol Specification
//! - RFC 855: Telnet Option Specifications
//! - RFC 859: Status
//! - RFC 1073: Window Size
//! - RFC 1079, 1091, 1096: Terminal Speed, Type and Display Location
//! - RFC 1184: Linemode
//! - RFC 1408, 1572: Environment

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

mod args;
mod codec;
pub mod consts;
mod frame;
mod options;
mod result;

pub use self::args::{TelnetArgument, environ, linemode, naws, slc, status, terminal};
pub use self::codec::{DEFAULT_MAX_SUBNEGOTIATION, TelnetCodec, escape_data};
pub use self::frame::{NegotiationVerb, TelnetFrame};
pub use self::options::{OptionEntry, OptionTable, TelnetOption, TelnetSide};
pub use self::result::{CodecError, CodecResult, SubnegotiationErrorKind};

#[cfg(test)]
mod tests {
    use super::{TelnetCodec, TelnetFrame, TelnetOption, consts};
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    #[tokio::test]
    async fn telnet_decode() {
        let mut codec = TelnetCodec::new();
        let mut input_buffer = BytesMut::from("Terminated line\r\n");
        let expected_output: Vec<TelnetFrame> =
            b"Terminated line\r\n".iter().map(|b| TelnetFrame::Data(*b)).collect();
        let mut actual_output = Vec::new();
        while let Some(frame) = codec.decode(&mut input_buffer).unwrap() {
            actual_output.push(frame);
        }
        assert_eq!(expected_output, actual_output, "telnet_decode didn't match");
    }

    #[test]
    fn telnet_encode() {
        let mut codec = TelnetCodec::new();
        let mut actual_output = BytesMut::with_capacity(20);
        for byte in b"Raw Ascii Data\r\n" {
            codec.encode(TelnetFrame::Data(*byte), &mut actual_output).unwrap();
        }
        assert_eq!(&actual_output[..], b"Raw Ascii Data\r\n");
    }

    #[test]
    fn decode_negotiation_between_data() {
        let mut codec = TelnetCodec::new();
        let mut input_buffer = BytesMut::from(
            &[
                b'L',
                b'o',
                b'g',
                b'i',
                b'n',
                b':',
                consts::IAC,
                consts::DO,
                consts::option::BINARY,
                b'P',
                consts::IAC,
                consts::WILL,
                consts::option::BINARY,
            ][..],
        );
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(&mut input_buffer).unwrap() {
            frames.push(frame);
        }
        assert_eq!(frames.len(), 9);
        assert_eq!(frames[6], TelnetFrame::Do(TelnetOption::TransmitBinary));
        assert_eq!(frames[7], TelnetFrame::Data(b'P'));
        assert_eq!(frames[8], TelnetFrame::Will(TelnetOption::TransmitBinary));
    }
}
