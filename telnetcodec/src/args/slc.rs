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


//! Set Local Characters (RFC 1184, section 5)

use crate::consts::linemode as lm;
use bytes::BufMut;

/// An SLC function code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum SlcFunction {
    /// Synch
    Synch,
    /// Break
    Break,
    /// Interrupt Process
    InterruptProcess,
    /// Abort Output
    AbortOutput,
    /// Are You There
    AreYouThere,
    /// End of Record
    EndOfRecord,
    /// Abort
    Abort,
    /// End of File
    EndOfFile,
    /// Suspend
    Suspend,
    /// Erase Character
    EraseCharacter,
    /// Erase Line
    EraseLine,
    /// Erase Word
    EraseWord,
    /// Reprint Line
    Reprint,
    /// Literal Next
    LiteralNext,
    /// Start Output
    Xon,
    /// Stop Output
    Xoff,
    /// Forwarding Character 1
    Forward1,
    /// Forwarding Character 2
    Forward2,
}

impl SlcFunction {
    /// All functions in wire order.
    pub const ALL: [SlcFunction; lm::NSLC as usize] = [
        SlcFunction::Synch,
        SlcFunction::Break,
        SlcFunction::InterruptProcess,
        SlcFunction::AbortOutput,
        SlcFunction::AreYouThere,
        SlcFunction::EndOfRecord,
        SlcFunction::Abort,
        SlcFunction::EndOfFile,
        SlcFunction::Suspend,
        SlcFunction::EraseCharacter,
        SlcFunction::EraseLine,
        SlcFunction::EraseWord,
        SlcFunction::Reprint,
        SlcFunction::LiteralNext,
        SlcFunction::Xon,
        SlcFunction::Xoff,
        SlcFunction::Forward1,
        SlcFunction::Forward2,
    ];

    /// Parses a function code. Zero and codes above `NSLC` have no function.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1..=lm::NSLC => Some(Self::ALL[byte as usize - 1]),
            _ => None,
        }
    }

    /// Wire code of the function.
    pub fn to_u8(self) -> u8 {
        match self {
            SlcFunction::Synch => lm::SLC_SYNCH,
            SlcFunction::Break => lm::SLC_BRK,
            SlcFunction::InterruptProcess => lm::SLC_IP,
            SlcFunction::AbortOutput => lm::SLC_AO,
            SlcFunction::AreYouThere => lm::SLC_AYT,
            SlcFunction::EndOfRecord => lm::SLC_EOR,
            SlcFunction::Abort => lm::SLC_ABORT,
            SlcFunction::EndOfFile => lm::SLC_EOF,
            SlcFunction::Suspend => lm::SLC_SUSP,
            SlcFunction::EraseCharacter => lm::SLC_EC,
            SlcFunction::EraseLine => lm::SLC_EL,
            SlcFunction::EraseWord => lm::SLC_EW,
            SlcFunction::Reprint => lm::SLC_RP,
            SlcFunction::LiteralNext => lm::SLC_LNEXT,
            SlcFunction::Xon => lm::SLC_XON,
            SlcFunction::Xoff => lm::SLC_XOFF,
            SlcFunction::Forward1 => lm::SLC_FORW1,
            SlcFunction::Forward2 => lm::SLC_FORW2,
        }
    }
}

impl std::fmt::Display for SlcFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Support level of an SLC function.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum SlcLevel {
    /// Not supported
    #[default]
    NoSupport,
    /// Supported with a fixed value
    CantChange,
    /// Supported and changeable
    Variable,
    /// Use the default
    Default,
}

impl SlcLevel {
    /// Extracts the level from a flag byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte & lm::SLC_LEVELBITS {
            lm::SLC_NOSUPPORT => SlcLevel::NoSupport,
            lm::SLC_CANTCHANGE => SlcLevel::CantChange,
            lm::SLC_VARIABLE => SlcLevel::Variable,
            _ => SlcLevel::Default,
        }
    }

    /// Level bits of the flag byte.
    pub fn to_byte(self) -> u8 {
        match self {
            SlcLevel::NoSupport => lm::SLC_NOSUPPORT,
            SlcLevel::CantChange => lm::SLC_CANTCHANGE,
            SlcLevel::Variable => lm::SLC_VARIABLE,
            SlcLevel::Default => lm::SLC_DEFAULT,
        }
    }
}

impl std::fmt::Display for SlcLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlcLevel::NoSupport => write!(f, "NOSUPPORT"),
            SlcLevel::CantChange => write!(f, "CANTCHANGE"),
            SlcLevel::Variable => write!(f, "VARIABLE"),
            SlcLevel::Default => write!(f, "DEFAULT"),
        }
    }
}

/// The flag byte of an SLC triple.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SlcFlags {
    /// Support level
    pub level: SlcLevel,
    /// Acknowledgement bit
    pub ack: bool,
    /// Flush input when triggered
    pub flush_in: bool,
    /// Flush output when triggered
    pub flush_out: bool,
}

impl SlcFlags {
    /// Flags with the given level and no modifier bits.
    pub const fn new(level: SlcLevel) -> Self {
        SlcFlags {
            level,
            ack: false,
            flush_in: false,
            flush_out: false,
        }
    }

    /// Same flags with the flush bits set as given.
    pub const fn with_flush(mut self, flush_in: bool, flush_out: bool) -> Self {
        self.flush_in = flush_in;
        self.flush_out = flush_out;
        self
    }

    /// Same flags with the ACK bit set as given.
    pub const fn with_ack(mut self, ack: bool) -> Self {
        self.ack = ack;
        self
    }

    /// Parses a flag byte.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            level: SlcLevel::from_byte(byte),
            ack: (byte & lm::SLC_ACK) != 0,
            flush_in: (byte & lm::SLC_FLUSHIN) != 0,
            flush_out: (byte & lm::SLC_FLUSHOUT) != 0,
        }
    }

    /// Builds the flag byte.
    pub fn to_byte(&self) -> u8 {
        let mut byte = self.level.to_byte();
        if self.ack {
            byte |= lm::SLC_ACK;
        }
        if self.flush_in {
            byte |= lm::SLC_FLUSHIN;
        }
        if self.flush_out {
            byte |= lm::SLC_FLUSHOUT;
        }
        byte
    }
}

/// One `(function, flags, value)` triple.
///
/// The function is kept as a raw byte because code zero (the whole table)
/// and unknown codes are meaningful in a request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SlcTriplet {
    /// Function code
    pub function: u8,
    /// Flags
    pub flags: SlcFlags,
    /// Character value
    pub value: u8,
}

impl SlcTriplet {
    /// Builds a triple for a known function.
    pub fn new(function: SlcFunction, flags: SlcFlags, value: u8) -> Self {
        SlcTriplet {
            function: function.to_u8(),
            flags,
            value,
        }
    }

    /// The function, when the code names one.
    pub fn slc_function(&self) -> Option<SlcFunction> {
        SlcFunction::from_u8(self.function)
    }

    /// Splits a payload into triples. A trailing partial triple is ignored.
    pub fn decode_list(data: &[u8]) -> Vec<SlcTriplet> {
        data.chunks_exact(3)
            .map(|chunk| SlcTriplet {
                function: chunk[0],
                flags: SlcFlags::from_byte(chunk[1]),
                value: chunk[2],
            })
            .collect()
    }

    /// Writes triples back to back. IAC escaping is left to the frame encoder.
    pub fn encode_list<T: BufMut>(triplets: &[SlcTriplet], dst: &mut T) -> usize {
        for triplet in triplets {
            dst.put_u8(triplet.function);
            dst.put_u8(triplet.flags.to_byte());
            dst.put_u8(triplet.value);
        }
        triplets.len() * 3
    }
}

impl std::fmt::Display for SlcTriplet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slc_function() {
            Some(function) => write!(f, "{} {} 0x{:02X}", function, self.flags.level, self.value),
            None => write!(f, "#{} {} 0x{:02X}", self.function, self.flags.level, self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slc_function_codes_match_rfc() {
        assert_eq!(SlcFunction::Synch.to_u8(), 1);
        assert_eq!(SlcFunction::InterruptProcess.to_u8(), 3);
        assert_eq!(SlcFunction::EndOfFile.to_u8(), 8);
        assert_eq!(SlcFunction::EraseCharacter.to_u8(), 10);
        assert_eq!(SlcFunction::Forward2.to_u8(), 18);
        for function in SlcFunction::ALL {
            assert_eq!(SlcFunction::from_u8(function.to_u8()), Some(function));
        }
        assert_eq!(SlcFunction::from_u8(0), None);
        assert_eq!(SlcFunction::from_u8(19), None);
    }

    #[test]
    fn test_slc_flags_bits() {
        let flags = SlcFlags::from_byte(0xE2);
        assert_eq!(flags.level, SlcLevel::Variable);
        assert!(flags.ack && flags.flush_in && flags.flush_out);
        assert_eq!(flags.to_byte(), 0xE2);

        let flags = SlcFlags::new(SlcLevel::CantChange);
        assert_eq!(flags.to_byte(), lm::SLC_CANTCHANGE);
    }

    #[test]
    fn test_decode_list_ignores_partial_triplet() {
        let data = [lm::SLC_IP, lm::SLC_VARIABLE, 0x03, lm::SLC_EC, lm::SLC_VARIABLE, 0x7F, 9, 2];
        let triplets = SlcTriplet::decode_list(&data);
        assert_eq!(triplets.len(), 2);
        assert_eq!(triplets[0].slc_function(), Some(SlcFunction::InterruptProcess));
        assert_eq!(triplets[1].value, 0x7F);
    }

    #[test]
    fn test_encode_list() {
        let triplets = vec![SlcTriplet::new(
            SlcFunction::AbortOutput,
            SlcFlags::new(SlcLevel::Variable).with_flush(false, true),
            0x0F,
        )];
        let mut buf = Vec::new();
        assert_eq!(SlcTriplet::encode_list(&triplets, &mut buf), 3);
        assert_eq!(buf, vec![lm::SLC_AO, lm::SLC_VARIABLE | lm::SLC_FLUSHOUT, 0x0F]);
    }
}
