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


use super::{CodecError, CodecResult, NegotiationVerb, TelnetFrame, TelnetOption, consts};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

/// Default upper bound for a single suboption payload.
pub const DEFAULT_MAX_SUBNEGOTIATION: usize = 4096;

/// Streaming TELNET decoder and encoder.
///
/// The decoder is a small explicit state machine that consumes one byte at
/// a time and yields one [`TelnetFrame`] as soon as one is complete. It can
/// be driven through [`Decoder`] on a `BytesMut` or through
/// [`TelnetCodec::decode_buf`] on any [`Buf`], which lets the session consume
/// its bounded network buffer in place. Incomplete input is never an error:
/// the state is kept and decoding resumes with the next bytes.
///
/// The codec does no negotiation of its own; it only frames bytes.
#[derive(Debug)]
pub struct TelnetCodec {
    decoder_buffer: BytesMut,
    decoder_state: DecoderState,
    max_subnegotiation: usize,
    truncated: bool,
}

impl TelnetCodec {
    /// Creates a codec with the default suboption limit.
    ///
    /// # Example
    /// ```
    /// use telnetd_codec::TelnetCodec;
    ///
    /// let codec = TelnetCodec::new();
    /// assert!(codec.is_idle());
    /// ```
    pub fn new() -> TelnetCodec {
        TelnetCodec::default()
    }

    /// Creates a codec that keeps at most `limit` payload bytes per suboption.
    ///
    /// Bytes past the limit are dropped; the frame is still delivered when
    /// `IAC SE` arrives.
    pub fn with_max_subnegotiation(limit: usize) -> TelnetCodec {
        TelnetCodec {
            max_subnegotiation: limit,
            ..TelnetCodec::default()
        }
    }

    /// True when the decoder sits between frames.
    pub fn is_idle(&self) -> bool {
        self.decoder_state == DecoderState::Normal
    }

    /// True while the decoder is inside an `IAC SB` ... `IAC SE` block.
    pub fn in_subnegotiation(&self) -> bool {
        matches!(
            self.decoder_state,
            DecoderState::SubnegotiateOption
                | DecoderState::Subnegotiate(_)
                | DecoderState::SubnegotiateIac(_)
        )
    }

    /// Decodes the next frame from any byte source.
    ///
    /// Consumes bytes from `src` until one frame is complete or the source is
    /// exhausted. Returns `Ok(None)` when more input is needed.
    pub fn decode_buf<B: Buf>(&mut self, src: &mut B) -> CodecResult<Option<TelnetFrame>> {
        while src.has_remaining() {
            let byte = src.get_u8();
            match (self.decoder_state, byte) {
                (DecoderState::Normal, consts::IAC) => {
                    self.decoder_state = DecoderState::Iac;
                }
                (DecoderState::Normal, _) => {
                    return Ok(Some(TelnetFrame::Data(byte)));
                }
                (DecoderState::Iac, consts::IAC) => {
                    self.decoder_state = DecoderState::Normal;
                    return Ok(Some(TelnetFrame::Data(consts::IAC)));
                }
                (DecoderState::Iac, consts::SB) => {
                    self.decoder_state = DecoderState::SubnegotiateOption;
                }
                (DecoderState::Iac, consts::SE) => {
                    self.decoder_state = DecoderState::Normal;
                    trace!("IAC SE outside of a subnegotiation ignored");
                }
                (DecoderState::Iac, _) => {
                    if let Some(verb) = NegotiationVerb::from_u8(byte) {
                        self.decoder_state = DecoderState::Negotiate(verb);
                        continue;
                    }
                    self.decoder_state = DecoderState::Normal;
                    return Ok(Some(match TelnetFrame::from_command(byte) {
                        Some(frame) => frame,
                        None => {
                            warn!("Unknown IAC command received: 0x{:02X}", byte);
                            TelnetFrame::NoOperation
                        }
                    }));
                }
                (DecoderState::Negotiate(verb), _) => {
                    self.decoder_state = DecoderState::Normal;
                    return Ok(Some(TelnetFrame::negotiation(
                        verb,
                        TelnetOption::from_u8(byte),
                    )));
                }
                (DecoderState::SubnegotiateOption, _) => {
                    self.decoder_buffer.clear();
                    self.truncated = false;
                    self.decoder_state = DecoderState::Subnegotiate(byte);
                }
                (DecoderState::Subnegotiate(option), consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateIac(option);
                }
                (DecoderState::Subnegotiate(option), _) => {
                    self.push_argument(option, byte);
                }
                (DecoderState::SubnegotiateIac(option), consts::SE) => {
                    self.decoder_state = DecoderState::Normal;
                    let payload = self.decoder_buffer.split().freeze();
                    return Ok(Some(TelnetFrame::Subnegotiate(
                        TelnetOption::from_u8(option),
                        payload,
                    )));
                }
                (DecoderState::SubnegotiateIac(option), consts::IAC) => {
                    self.push_argument(option, consts::IAC);
                    self.decoder_state = DecoderState::Subnegotiate(option);
                }
                (DecoderState::SubnegotiateIac(option), _) => {
                    // A lone IAC inside a suboption is kept as data.
                    trace!(
                        option = option,
                        "Unescaped IAC followed by 0x{:02X} inside subnegotiation",
                        byte
                    );
                    self.push_argument(option, consts::IAC);
                    self.push_argument(option, byte);
                    self.decoder_state = DecoderState::Subnegotiate(option);
                }
            }
        }
        Ok(None)
    }

    fn push_argument(&mut self, option: u8, byte: u8) {
        if self.decoder_buffer.len() < self.max_subnegotiation {
            self.decoder_buffer.put_u8(byte);
        } else if !self.truncated {
            self.truncated = true;
            warn!(
                option = option,
                limit = self.max_subnegotiation,
                "Subnegotiation payload exceeds limit, truncating"
            );
        }
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        TelnetCodec {
            decoder_buffer: BytesMut::new(),
            decoder_state: DecoderState::Normal,
            max_subnegotiation: DEFAULT_MAX_SUBNEGOTIATION,
            truncated: false,
        }
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetFrame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetFrame>, Self::Error> {
        self.decode_buf(src)
    }
}

/// Appends `data` to `dst`, doubling every IAC byte.
///
/// Returns the number of bytes written.
pub fn escape_data<T: BufMut>(data: &[u8], dst: &mut T) -> usize {
    let mut written = 0;
    for &byte in data {
        if byte == consts::IAC {
            dst.put_u8(consts::IAC);
            written += 1;
        }
        dst.put_u8(byte);
        written += 1;
    }
    written
}

impl Encoder<u8> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: u8, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<TelnetFrame>::encode(self, TelnetFrame::Data(item), dst)
    }
}

impl Encoder<&[u8]> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        escape_data(item, dst);
        Ok(())
    }
}

impl Encoder<TelnetFrame> for TelnetCodec {
    type Error = CodecError;

    /// Encodes a frame, escaping IAC in data and in suboption payloads.
    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        match item {
            TelnetFrame::Data(byte) => {
                if byte == consts::IAC {
                    dst.put_u8(consts::IAC);
                }
                dst.put_u8(byte);
            }
            TelnetFrame::Do(option) => {
                dst.put_slice(&[consts::IAC, consts::DO, option.to_u8()]);
            }
            TelnetFrame::Dont(option) => {
                dst.put_slice(&[consts::IAC, consts::DONT, option.to_u8()]);
            }
            TelnetFrame::Will(option) => {
                dst.put_slice(&[consts::IAC, consts::WILL, option.to_u8()]);
            }
            TelnetFrame::Wont(option) => {
                dst.put_slice(&[consts::IAC, consts::WONT, option.to_u8()]);
            }
            TelnetFrame::Subnegotiate(option, payload) => {
                dst.put_slice(&[consts::IAC, consts::SB, option.to_u8()]);
                escape_data(&payload, dst);
                dst.put_slice(&[consts::IAC, consts::SE]);
            }
            command => {
                // Every remaining variant is a two byte command.
                let code = command.command_code().unwrap_or(consts::NOP);
                dst.put_slice(&[consts::IAC, code]);
            }
        }
        Ok(())
    }
}

/// States of the decoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DecoderState {
    /// Between frames, reading data
    Normal,
    /// Saw IAC
    Iac,
    /// Saw IAC followed by a negotiation verb
    Negotiate(NegotiationVerb),
    /// Saw IAC SB, option byte next
    SubnegotiateOption,
    /// Inside a suboption payload for the given option
    Subnegotiate(u8),
    /// Saw IAC inside a suboption payload
    SubnegotiateIac(u8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    // ============================================================================
    // Helper Functions
    // ============================================================================

    fn collect_all(codec: &mut TelnetCodec, mut src: BytesMut) -> Vec<TelnetFrame> {
        let mut out = Vec::new();
        while let Some(frame) = codec.decode(&mut src).expect("decode should not error") {
            out.push(frame);
        }
        out
    }

    fn encode_frame(frame: TelnetFrame) -> BytesMut {
        let mut codec = TelnetCodec::new();
        let mut dst = BytesMut::new();
        codec.encode(frame, &mut dst).expect("encode ok");
        dst
    }

    // ============================================================================
    // Encoding Tests
    // ============================================================================

    #[test]
    fn encode_data_iac_is_escaped() {
        let dst = encode_frame(TelnetFrame::Data(consts::IAC));
        assert_eq!(&dst[..], &[consts::IAC, consts::IAC]);
    }

    #[test]
    fn encode_commands() {
        assert_eq!(&encode_frame(TelnetFrame::DataMark)[..], &[consts::IAC, consts::DM]);
        assert_eq!(&encode_frame(TelnetFrame::AbortOutput)[..], &[consts::IAC, consts::AO]);
        assert_eq!(&encode_frame(TelnetFrame::Suspend)[..], &[consts::IAC, consts::SUSP]);
    }

    #[test]
    fn encode_negotiation() {
        let dst = encode_frame(TelnetFrame::Will(TelnetOption::Echo));
        assert_eq!(&dst[..], &[consts::IAC, consts::WILL, consts::option::ECHO]);
    }

    #[test]
    fn encode_subnegotiation_escapes_payload() {
        let dst = encode_frame(TelnetFrame::Subnegotiate(
            TelnetOption::NAWS,
            Bytes::from_static(&[0x00, 0xFF, 0x00, 0x18]),
        ));
        assert_eq!(
            &dst[..],
            &[
                consts::IAC,
                consts::SB,
                consts::option::NAWS,
                0x00,
                0xFF,
                0xFF,
                0x00,
                0x18,
                consts::IAC,
                consts::SE
            ]
        );
    }

    #[test]
    fn encode_slice_doubles_iac() {
        let mut codec = TelnetCodec::new();
        let mut dst = BytesMut::new();
        codec.encode(&[0x41u8, 0xFF, 0x42][..], &mut dst).unwrap();
        assert_eq!(&dst[..], &[0x41, 0xFF, 0xFF, 0x42]);
    }

    // ============================================================================
    // Decoding Tests
    // ============================================================================

    #[test]
    fn decode_data_and_commands() {
        let mut codec = TelnetCodec::new();
        let src = BytesMut::from(&[b'a', consts::IAC, consts::AYT, consts::IAC, consts::IAC][..]);
        assert_eq!(
            collect_all(&mut codec, src),
            vec![
                TelnetFrame::Data(b'a'),
                TelnetFrame::AreYouThere,
                TelnetFrame::Data(0xFF)
            ]
        );
    }

    #[test]
    fn decode_unknown_iac_command_yields_noop() {
        let mut codec = TelnetCodec::new();
        let src = BytesMut::from(&[consts::IAC, 0x10][..]);
        assert_eq!(collect_all(&mut codec, src), vec![TelnetFrame::NoOperation]);
    }

    #[test]
    fn decode_negotiation() {
        let mut codec = TelnetCodec::new();
        let src = BytesMut::from(&[consts::IAC, consts::DO, consts::option::LINEMODE][..]);
        assert_eq!(
            collect_all(&mut codec, src),
            vec![TelnetFrame::Do(TelnetOption::Linemode)]
        );
    }

    #[test]
    fn decode_subnegotiation_with_escaped_iac() {
        let mut codec = TelnetCodec::new();
        let src = BytesMut::from(
            &[
                consts::IAC,
                consts::SB,
                consts::option::NAWS,
                0x00,
                0xFF,
                0xFF,
                0x00,
                0x18,
                consts::IAC,
                consts::SE,
            ][..],
        );
        assert_eq!(
            collect_all(&mut codec, src),
            vec![TelnetFrame::Subnegotiate(
                TelnetOption::NAWS,
                Bytes::from_static(&[0x00, 0xFF, 0x00, 0x18])
            )]
        );
    }

    #[test]
    fn decode_lone_iac_in_subnegotiation_is_literal() {
        let mut codec = TelnetCodec::new();
        let src = BytesMut::from(
            &[
                consts::IAC,
                consts::SB,
                consts::option::TTYPE,
                consts::qualifier::IS,
                b'v',
                consts::IAC,
                b't',
                consts::IAC,
                consts::SE,
            ][..],
        );
        assert_eq!(
            collect_all(&mut codec, src),
            vec![TelnetFrame::Subnegotiate(
                TelnetOption::TTYPE,
                Bytes::from_static(&[consts::qualifier::IS, b'v', consts::IAC, b't'])
            )]
        );
    }

    #[test]
    fn decode_partial_subnegotiation_waits() {
        let mut codec = TelnetCodec::new();
        let mut src = BytesMut::from(&[consts::IAC, consts::SB, consts::option::TTYPE, 0x00, b'x'][..]);
        assert_eq!(codec.decode(&mut src).unwrap(), None);
        assert!(codec.in_subnegotiation());

        src.extend_from_slice(&[consts::IAC]);
        assert_eq!(codec.decode(&mut src).unwrap(), None);

        src.extend_from_slice(&[consts::SE]);
        assert_eq!(
            codec.decode(&mut src).unwrap(),
            Some(TelnetFrame::Subnegotiate(
                TelnetOption::TTYPE,
                Bytes::from_static(&[0x00, b'x'])
            ))
        );
        assert!(codec.is_idle());
    }

    #[test]
    fn decode_partial_negotiation_waits() {
        let mut codec = TelnetCodec::new();
        let mut src = BytesMut::from(&[consts::IAC, consts::WILL][..]);
        assert_eq!(codec.decode(&mut src).unwrap(), None);
        src.extend_from_slice(&[consts::option::NAWS]);
        assert_eq!(
            codec.decode(&mut src).unwrap(),
            Some(TelnetFrame::Will(TelnetOption::NAWS))
        );
    }

    #[test]
    fn decode_truncates_oversized_subnegotiation() {
        let mut codec = TelnetCodec::with_max_subnegotiation(4);
        let mut src = BytesMut::from(&[consts::IAC, consts::SB, 99][..]);
        src.extend_from_slice(b"abcdefgh");
        src.extend_from_slice(&[consts::IAC, consts::SE, b'z']);
        assert_eq!(
            collect_all(&mut codec, src),
            vec![
                TelnetFrame::Subnegotiate(TelnetOption::Unknown(99), Bytes::from_static(b"abcd")),
                TelnetFrame::Data(b'z'),
            ]
        );
    }

    #[test]
    fn decode_stray_se_is_ignored() {
        let mut codec = TelnetCodec::new();
        let src = BytesMut::from(&[consts::IAC, consts::SE, b'q'][..]);
        assert_eq!(collect_all(&mut codec, src), vec![TelnetFrame::Data(b'q')]);
    }

    #[test]
    fn decode_buf_over_plain_slice() {
        let mut codec = TelnetCodec::new();
        let mut src: &[u8] = &[consts::IAC, consts::DONT, consts::option::ECHO, b'!'];
        assert_eq!(
            codec.decode_buf(&mut src).unwrap(),
            Some(TelnetFrame::Dont(TelnetOption::Echo))
        );
        assert_eq!(codec.decode_buf(&mut src).unwrap(), Some(TelnetFrame::Data(b'!')));
        assert_eq!(codec.decode_buf(&mut src).unwrap(), None);
    }
}
