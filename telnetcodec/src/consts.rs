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


//! TELNET protocol constants.
//!
//! Command bytes from RFC 854, option codes from the IANA registry, and the
//! inner codes used by the LINEMODE, environment and information suboptions.

/// Interpret As Command
pub const IAC: u8 = 255;
/// Request that the peer stop performing an option
pub const DONT: u8 = 254;
/// Request that the peer perform an option
pub const DO: u8 = 253;
/// Refuse to perform an option
pub const WONT: u8 = 252;
/// Agree to perform an option
pub const WILL: u8 = 251;
/// Subnegotiation begin
pub const SB: u8 = 250;
/// Go Ahead
pub const GA: u8 = 249;
/// Erase Line
pub const EL: u8 = 248;
/// Erase Character
pub const EC: u8 = 247;
/// Are You There
pub const AYT: u8 = 246;
/// Abort Output
pub const AO: u8 = 245;
/// Interrupt Process
pub const IP: u8 = 244;
/// Break
pub const BRK: u8 = 243;
/// Data Mark, the data stream portion of a SYNCH
pub const DM: u8 = 242;
/// No Operation
pub const NOP: u8 = 241;
/// Subnegotiation end
pub const SE: u8 = 240;
/// End of Record
pub const EOR: u8 = 239;
/// Abort
pub const ABORT: u8 = 238;
/// Suspend Process
pub const SUSP: u8 = 237;
/// End of File
pub const EOF: u8 = 236;

/// Option codes
pub mod option {
    /// Binary Transmission (RFC 856)
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857)
    pub const ECHO: u8 = 1;
    /// Reconnection
    pub const RCP: u8 = 2;
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Approximate Message Size Negotiation
    pub const NAMS: u8 = 4;
    /// Status (RFC 859)
    pub const STATUS: u8 = 5;
    /// Timing Mark (RFC 860)
    pub const TM: u8 = 6;
    /// Remote Controlled Transmission and Echo (RFC 726)
    pub const RCTE: u8 = 7;
    /// Output Line Width
    pub const NAOL: u8 = 8;
    /// Output Page Size
    pub const NAOP: u8 = 9;
    /// Output Carriage-Return Disposition (RFC 652)
    pub const NAOCRD: u8 = 10;
    /// Output Horizontal Tab Stops (RFC 653)
    pub const NAOHTS: u8 = 11;
    /// Output Horizontal Tab Disposition (RFC 654)
    pub const NAOHTD: u8 = 12;
    /// Output Formfeed Disposition (RFC 655)
    pub const NAOFFD: u8 = 13;
    /// Output Vertical Tabstops (RFC 656)
    pub const NAOVTS: u8 = 14;
    /// Output Vertical Tab Disposition (RFC 657)
    pub const NAOVTD: u8 = 15;
    /// Output Linefeed Disposition (RFC 658)
    pub const NAOLFD: u8 = 16;
    /// Extended ASCII (RFC 698)
    pub const XASCII: u8 = 17;
    /// Logout (RFC 727)
    pub const LOGOUT: u8 = 18;
    /// Byte Macro (RFC 735)
    pub const BM: u8 = 19;
    /// Data Entry Terminal (RFC 1043)
    pub const DET: u8 = 20;
    /// SUPDUP (RFC 736)
    pub const SUPDUP: u8 = 21;
    /// SUPDUP Output (RFC 749)
    pub const SUPDUP_OUTPUT: u8 = 22;
    /// Send Location (RFC 779)
    pub const SNDLOC: u8 = 23;
    /// Terminal Type (RFC 1091)
    pub const TTYPE: u8 = 24;
    /// End of Record (RFC 885)
    pub const EOR: u8 = 25;
    /// TACACS User Identification (RFC 927)
    pub const TUID: u8 = 26;
    /// Output Marking (RFC 933)
    pub const OUTMRK: u8 = 27;
    /// Terminal Location Number (RFC 946)
    pub const TTYLOC: u8 = 28;
    /// Telnet 3270 Regime (RFC 1041)
    pub const OPT3270REGIME: u8 = 29;
    /// X.3 PAD (RFC 1053)
    pub const X3PAD: u8 = 30;
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: u8 = 31;
    /// Terminal Speed (RFC 1079)
    pub const TSPEED: u8 = 32;
    /// Remote Flow Control (RFC 1372)
    pub const LFLOW: u8 = 33;
    /// Linemode (RFC 1184)
    pub const LINEMODE: u8 = 34;
    /// X Display Location (RFC 1096)
    pub const XDISPLOC: u8 = 35;
    /// Environment Option (RFC 1408)
    pub const OLD_ENVIRON: u8 = 36;
    /// Authentication (RFC 2941)
    pub const AUTHENTICATION: u8 = 37;
    /// Encryption (RFC 2946)
    pub const ENCRYPTION: u8 = 38;
    /// New Environment Option (RFC 1572)
    pub const NEW_ENVIRON: u8 = 39;
    /// Charset (RFC 2066)
    pub const CHARSET: u8 = 42;
    /// Com Port Control (RFC 2217)
    pub const COM_PORT: u8 = 44;
    /// Start TLS
    pub const START_TLS: u8 = 46;
    /// Extended Options List (RFC 861)
    pub const EXOPL: u8 = 255;
}

/// Qualifiers shared by TTYPE, TSPEED, XDISPLOC and the environment options
pub mod qualifier {
    /// The sender is supplying the requested value
    pub const IS: u8 = 0;
    /// The sender is requesting a value
    pub const SEND: u8 = 1;
    /// Unsolicited environment update (RFC 1572)
    pub const INFO: u8 = 2;
}

/// LINEMODE suboption codes (RFC 1184)
pub mod linemode {
    /// MODE request
    pub const MODE: u8 = 1;
    /// FORWARDMASK request, preceded by a DO/DONT/WILL/WONT verb
    pub const FORWARDMASK: u8 = 2;
    /// Set Local Characters request
    pub const SLC: u8 = 3;

    /// Client performs line editing
    pub const MODE_EDIT: u8 = 0x01;
    /// Client traps signals and sends them as TELNET commands
    pub const MODE_TRAPSIG: u8 = 0x02;
    /// Acknowledges a MODE change
    pub const MODE_ACK: u8 = 0x04;
    /// Client expands tabs
    pub const MODE_SOFT_TAB: u8 = 0x08;
    /// Client echoes non-printable characters literally
    pub const MODE_LIT_ECHO: u8 = 0x10;
    /// All defined MODE bits
    pub const MODE_MASK: u8 = 0x1f;

    /// Synch
    pub const SLC_SYNCH: u8 = 1;
    /// Break
    pub const SLC_BRK: u8 = 2;
    /// Interrupt Process
    pub const SLC_IP: u8 = 3;
    /// Abort Output
    pub const SLC_AO: u8 = 4;
    /// Are You There
    pub const SLC_AYT: u8 = 5;
    /// End of Record
    pub const SLC_EOR: u8 = 6;
    /// Abort
    pub const SLC_ABORT: u8 = 7;
    /// End of File
    pub const SLC_EOF: u8 = 8;
    /// Suspend
    pub const SLC_SUSP: u8 = 9;
    /// Erase Character
    pub const SLC_EC: u8 = 10;
    /// Erase Line
    pub const SLC_EL: u8 = 11;
    /// Erase Word
    pub const SLC_EW: u8 = 12;
    /// Reprint Line
    pub const SLC_RP: u8 = 13;
    /// Literal Next
    pub const SLC_LNEXT: u8 = 14;
    /// Start Output
    pub const SLC_XON: u8 = 15;
    /// Stop Output
    pub const SLC_XOFF: u8 = 16;
    /// Forwarding Character 1
    pub const SLC_FORW1: u8 = 17;
    /// Forwarding Character 2
    pub const SLC_FORW2: u8 = 18;
    /// Number of SLC functions
    pub const NSLC: u8 = 18;

    /// Function is not supported
    pub const SLC_NOSUPPORT: u8 = 0;
    /// Value is fixed and cannot be changed
    pub const SLC_CANTCHANGE: u8 = 1;
    /// Value may be changed
    pub const SLC_VARIABLE: u8 = 2;
    /// Use the default value
    pub const SLC_DEFAULT: u8 = 3;
    /// Mask for the support level bits
    pub const SLC_LEVELBITS: u8 = 0x03;

    /// Acknowledges an SLC triple
    pub const SLC_ACK: u8 = 0x80;
    /// Flush pending input when the function is triggered
    pub const SLC_FLUSHIN: u8 = 0x40;
    /// Flush pending output when the function is triggered
    pub const SLC_FLUSHOUT: u8 = 0x20;
}

/// Environment suboption codes (RFC 1572 / RFC 1408)
pub mod environ {
    /// Well-known variable name follows
    pub const VAR: u8 = 0;
    /// Value follows
    pub const VALUE: u8 = 1;
    /// Escapes the next byte
    pub const ESC: u8 = 2;
    /// User-defined variable name follows
    pub const USERVAR: u8 = 3;

    /// Variable name marker in the BSD rendition of the old environment option
    pub const OLD_VAR: u8 = 1;
    /// Value marker in the BSD rendition of the old environment option
    pub const OLD_VALUE: u8 = 0;
}
