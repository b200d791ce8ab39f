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


//! Negotiate About Window Size (RFC 1073)
//!

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, BufMut};

/// Terminal window dimensions carried by NAWS.
///
/// # Format
/// Four bytes in big-endian order:
/// - 2 bytes for columns (width)
/// - 2 bytes for rows (height)
///
/// A dimension of 0xFF in either byte is doubled on the wire by the frame
/// encoder, not here.
///
/// # Example
/// ```
/// use telnetd_codec::naws::WindowSize;
///
/// let size = WindowSize::new(80, 24);
/// assert_eq!(size.cols, 80);
/// assert_eq!(size.rows, 24);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// The number of columns (characters) in the terminal window
    pub cols: u16,
    /// The number of rows (lines) in the terminal window
    pub rows: u16,
}

impl WindowSize {
    /// Creates a new `WindowSize` with the specified columns and rows.
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// The NAWS payload always occupies exactly 4 bytes.
    pub fn len(&self) -> usize {
        4
    }

    /// Never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encodes this `WindowSize` into a byte buffer using big-endian format.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use telnetd_codec::naws::WindowSize;
    ///
    /// let mut buf = BytesMut::new();
    /// WindowSize::new(80, 24).encode(&mut buf).unwrap();
    /// assert_eq!(&buf[..], &[0x00, 0x50, 0x00, 0x18]);
    /// ```
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    /// Writes this `WindowSize` to a writer using big-endian format.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(4)
    }

    /// Decodes a `WindowSize` from a byte buffer in big-endian format.
    ///
    /// # Errors
    /// Returns `CodecError::SubnegotiationError` with `InsufficientData` if
    /// fewer than 4 bytes are available in the buffer.
    ///
    /// # Example
    /// ```
    /// use telnetd_codec::naws::WindowSize;
    ///
    /// let mut buf: &[u8] = &[0x00, 0x50, 0x00, 0x18];
    /// let size = WindowSize::decode(&mut buf).unwrap();
    /// assert_eq!(size, WindowSize::new(80, 24));
    /// ```
    pub fn decode<T: Buf>(src: &mut T) -> CodecResult<WindowSize> {
        // NAWS format: WIDTH-HIGH WIDTH-LOW HEIGHT-HIGH HEIGHT-LOW
        if src.remaining() >= 4 {
            Ok(WindowSize {
                cols: src.get_u16(),
                rows: src.get_u16(),
            })
        } else {
            Err(CodecError::subnegotiation(
                consts::option::NAWS,
                SubnegotiationErrorKind::InsufficientData {
                    required: 4,
                    available: src.remaining(),
                },
            ))
        }
    }
}

impl Default for WindowSize {
    /// The traditional 80x24 terminal.
    fn default() -> Self {
        WindowSize { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_large_dimensions() {
        let mut buf: &[u8] = &[0x01, 0xFF, 0xFF, 0x00];
        let size = WindowSize::decode(&mut buf).unwrap();
        assert_eq!(size.cols, 0x01FF);
        assert_eq!(size.rows, 0xFF00);
    }

    #[test]
    fn test_decode_insufficient() {
        let mut buf: &[u8] = &[0x00, 0x50, 0x00];
        match WindowSize::decode(&mut buf) {
            Err(CodecError::SubnegotiationError {
                reason: SubnegotiationErrorKind::InsufficientData { available, .. },
                ..
            }) => assert_eq!(available, 3),
            other => panic!("unexpected {other:?}"),
        }
    }
}
