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


use crate::consts;
use std::fmt::Formatter;

///
/// [Telnet Terminal Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum TelnetOption {
    /// [`consts::option::BINARY`] Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    TransmitBinary,
    /// [`consts::option::ECHO`] Echo [RFC857](https://tools.ietf.org/html/rfc857)
    Echo,
    /// [`consts::option::SGA`] Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::STATUS`] Status [RFC859](http://www.iana.org/go/rfc859)
    Status,
    /// [`consts::option::TM`] Timing Mark [RFC860](http://www.iana.org/go/rfc860)
    TimingMark,
    /// [`consts::option::NAOCRD`] Output Carriage-Return Disposition [RFC652](http://www.iana.org/go/rfc652)
    NAOCRD,
    /// [`consts::option::NAOHTS`] Output Horizontal Tab Stops [RFC653](http://www.iana.org/go/rfc653)
    NAOHTS,
    /// [`consts::option::LOGOUT`] Logout [RFC727](http://www.iana.org/go/rfc727)
    Logout,
    /// [`consts::option::SNDLOC`] Send Location [RFC779](http://www.iana.org/go/rfc779)
    SNDLOC,
    /// [`consts::option::TTYPE`] Terminal Type [RFC1091](http://www.iana.org/go/rfc1091)
    TTYPE,
    /// [`consts::option::EOR`] End of Record [RFC885](http://www.iana.org/go/rfc885)
    EOR,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](http://www.iana.org/go/rfc1073)
    NAWS,
    /// [`consts::option::TSPEED`] Terminal Speed [RFC1079](http://www.iana.org/go/rfc1079)
    TSPEED,
    /// [`consts::option::LFLOW`] Remote Flow Control [RFC1372](http://www.iana.org/go/rfc1372)
    LFLOW,
    /// [`consts::option::LINEMODE`] Linemode [RFC1184](http://www.iana.org/go/rfc1184)
    Linemode,
    /// [`consts::option::XDISPLOC`] X Display Location [RFC1096](http://www.iana.org/go/rfc1096)
    XDISPLOC,
    /// [`consts::option::OLD_ENVIRON`] Environment Option [RFC1408](http://www.iana.org/go/rfc1408)
    OldEnvironment,
    /// [`consts::option::AUTHENTICATION`] Authentication [RFC2941](http://www.iana.org/go/rfc2941)
    Authentication,
    /// [`consts::option::ENCRYPTION`] Encryption [RFC2946](http://www.iana.org/go/rfc2946)
    Encryption,
    /// [`consts::option::NEW_ENVIRON`] New Environment Option [RFC1572](http://www.iana.org/go/rfc1572)
    NewEnvironment,
    /// [`consts::option::CHARSET`] Charset [RFC2066](http://www.iana.org/go/rfc2066)
    Charset,
    /// [`consts::option::COM_PORT`] Com Port Control [RFC2217](http://www.iana.org/go/rfc2217)
    ComPort,
    /// [`consts::option::START_TLS`] Start TLS
    StartTLS,
    /// [`consts::option::EXOPL`] Extended-Options-List [RFC861](http://www.iana.org/go/rfc861)
    EXOPL,
    /// Any other option code
    Unknown(u8),
}

impl TelnetOption {
    /// Converts a `TelnetOption` into its wire code.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetOption::TransmitBinary => consts::option::BINARY,
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::Status => consts::option::STATUS,
            TelnetOption::TimingMark => consts::option::TM,
            TelnetOption::NAOCRD => consts::option::NAOCRD,
            TelnetOption::NAOHTS => consts::option::NAOHTS,
            TelnetOption::Logout => consts::option::LOGOUT,
            TelnetOption::SNDLOC => consts::option::SNDLOC,
            TelnetOption::TTYPE => consts::option::TTYPE,
            TelnetOption::EOR => consts::option::EOR,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::TSPEED => consts::option::TSPEED,
            TelnetOption::LFLOW => consts::option::LFLOW,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::XDISPLOC => consts::option::XDISPLOC,
            TelnetOption::OldEnvironment => consts::option::OLD_ENVIRON,
            TelnetOption::Authentication => consts::option::AUTHENTICATION,
            TelnetOption::Encryption => consts::option::ENCRYPTION,
            TelnetOption::NewEnvironment => consts::option::NEW_ENVIRON,
            TelnetOption::Charset => consts::option::CHARSET,
            TelnetOption::ComPort => consts::option::COM_PORT,
            TelnetOption::StartTLS => consts::option::START_TLS,
            TelnetOption::EXOPL => consts::option::EXOPL,
            TelnetOption::Unknown(byte) => *byte,
        }
    }

    /// Converts a wire code into a `TelnetOption`.
    ///
    /// Codes without a named variant come back as [`TelnetOption::Unknown`],
    /// so `from_u8(b).to_u8() == b` holds for every byte.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::BINARY => TelnetOption::TransmitBinary,
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::STATUS => TelnetOption::Status,
            consts::option::TM => TelnetOption::TimingMark,
            consts::option::NAOCRD => TelnetOption::NAOCRD,
            consts::option::NAOHTS => TelnetOption::NAOHTS,
            consts::option::LOGOUT => TelnetOption::Logout,
            consts::option::SNDLOC => TelnetOption::SNDLOC,
            consts::option::TTYPE => TelnetOption::TTYPE,
            consts::option::EOR => TelnetOption::EOR,
            consts::option::NAWS => TelnetOption::NAWS,
            consts::option::TSPEED => TelnetOption::TSPEED,
            consts::option::LFLOW => TelnetOption::LFLOW,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::XDISPLOC => TelnetOption::XDISPLOC,
            consts::option::OLD_ENVIRON => TelnetOption::OldEnvironment,
            consts::option::AUTHENTICATION => TelnetOption::Authentication,
            consts::option::ENCRYPTION => TelnetOption::Encryption,
            consts::option::NEW_ENVIRON => TelnetOption::NewEnvironment,
            consts::option::CHARSET => TelnetOption::Charset,
            consts::option::COM_PORT => TelnetOption::ComPort,
            consts::option::START_TLS => TelnetOption::StartTLS,
            consts::option::EXOPL => TelnetOption::EXOPL,
            byte => TelnetOption::Unknown(byte),
        }
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::TransmitBinary => write!(f, "BINARY"),
            TelnetOption::Echo => write!(f, "ECHO"),
            TelnetOption::SuppressGoAhead => write!(f, "SGA"),
            TelnetOption::Status => write!(f, "STATUS"),
            TelnetOption::TimingMark => write!(f, "TIMING-MARK"),
            TelnetOption::NAOCRD => write!(f, "NAOCRD"),
            TelnetOption::NAOHTS => write!(f, "NAOHTS"),
            TelnetOption::Logout => write!(f, "LOGOUT"),
            TelnetOption::SNDLOC => write!(f, "SEND-LOCATION"),
            TelnetOption::TTYPE => write!(f, "TERMINAL-TYPE"),
            TelnetOption::EOR => write!(f, "END-OF-RECORD"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::TSPEED => write!(f, "TERMINAL-SPEED"),
            TelnetOption::LFLOW => write!(f, "TOGGLE-FLOW-CONTROL"),
            TelnetOption::Linemode => write!(f, "LINEMODE"),
            TelnetOption::XDISPLOC => write!(f, "X-DISPLAY-LOCATION"),
            TelnetOption::OldEnvironment => write!(f, "OLD-ENVIRON"),
            TelnetOption::Authentication => write!(f, "AUTHENTICATION"),
            TelnetOption::Encryption => write!(f, "ENCRYPT"),
            TelnetOption::NewEnvironment => write!(f, "NEW-ENVIRON"),
            TelnetOption::Charset => write!(f, "CHARSET"),
            TelnetOption::ComPort => write!(f, "COM-PORT-OPTION"),
            TelnetOption::StartTLS => write!(f, "START-TLS"),
            TelnetOption::EXOPL => write!(f, "EXOPL"),
            TelnetOption::Unknown(byte) => write!(f, "Unknown({})", byte),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        TelnetOption::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// Which half of an option's negotiation an operation refers to.
///
/// Every option is negotiated twice, independently:
///
/// ```text
/// Local:  WILL <option>  →  Remote      (we offer to perform it)
///         DO <option>    ←  Remote
/// Remote: DO <option>    →  Remote      (we ask the peer to perform it)
///         WILL <option>  ←  Remote
/// ```
///
/// The local half is tracked by the WILL/WONT bits of an [`OptionEntry`],
/// the remote half by its DO/DONT bits. Receiving `WILL` from the peer is the
/// same event as our own DO state becoming true.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetSide {
    /// We perform the option (WILL/WONT)
    Local,
    /// The peer performs the option (DO/DONT)
    Remote,
}

impl std::fmt::Display for TelnetSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetSide::Local => write!(f, "Local"),
            TelnetSide::Remote => write!(f, "Remote"),
        }
    }
}

/// Negotiation state of a single option.
///
/// `state_*` is what we last told the peer, `want_*` is what we want the
/// peer to believe. A change is in flight while the two differ.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionEntry {
    /// We last sent WILL (true) or WONT (false)
    pub state_will: bool,
    /// We last sent DO (true) or DONT (false)
    pub state_do: bool,
    /// We want to be performing the option
    pub want_will: bool,
    /// We want the peer to be performing the option
    pub want_do: bool,
}

impl OptionEntry {
    /// Current state of one side.
    pub fn state(&self, side: TelnetSide) -> bool {
        match side {
            TelnetSide::Local => self.state_will,
            TelnetSide::Remote => self.state_do,
        }
    }

    /// Desired state of one side.
    pub fn want(&self, side: TelnetSide) -> bool {
        match side {
            TelnetSide::Local => self.want_will,
            TelnetSide::Remote => self.want_do,
        }
    }

    /// Whether a change of one side is waiting on the peer.
    pub fn is_changing(&self, side: TelnetSide) -> bool {
        self.state(side) != self.want(side)
    }
}

/// Negotiation state for all 256 option codes.
///
/// Besides the four state bits the table counts, per option and side, how
/// many replies to our own requests are still outstanding. A PDU received
/// while a reply is outstanding is an acknowledgement, never a new request,
/// which is what keeps two engines from answering each other forever.
#[derive(Clone, Debug)]
pub struct OptionTable {
    entries: [OptionEntry; 256],
    will_wont_resp: [u8; 256],
    do_dont_resp: [u8; 256],
}

impl OptionTable {
    /// Creates a table with every option disabled and unwanted.
    pub fn new() -> Self {
        OptionTable {
            entries: [OptionEntry::default(); 256],
            will_wont_resp: [0; 256],
            do_dont_resp: [0; 256],
        }
    }

    /// Snapshot of one option.
    pub fn entry(&self, option: TelnetOption) -> OptionEntry {
        self.entries[option.to_u8() as usize]
    }

    /// Whether the option is enabled on the given side.
    pub fn is_enabled(&self, option: TelnetOption, side: TelnetSide) -> bool {
        self.entry(option).state(side)
    }

    /// Whether we want the option enabled on the given side.
    pub fn wants(&self, option: TelnetOption, side: TelnetSide) -> bool {
        self.entry(option).want(side)
    }

    /// Whether a change of the given side is in flight.
    pub fn is_changing(&self, option: TelnetOption, side: TelnetSide) -> bool {
        self.entry(option).is_changing(side)
    }

    /// Records what we last told the peer.
    pub fn set_state(&mut self, option: TelnetOption, side: TelnetSide, enabled: bool) {
        let entry = &mut self.entries[option.to_u8() as usize];
        match side {
            TelnetSide::Local => entry.state_will = enabled,
            TelnetSide::Remote => entry.state_do = enabled,
        }
    }

    /// Records what we want the peer to believe.
    pub fn set_want(&mut self, option: TelnetOption, side: TelnetSide, enabled: bool) {
        let entry = &mut self.entries[option.to_u8() as usize];
        match side {
            TelnetSide::Local => entry.want_will = enabled,
            TelnetSide::Remote => entry.want_do = enabled,
        }
    }

    /// Replies still expected from the peer for one side of an option.
    pub fn pending_replies(&self, option: TelnetOption, side: TelnetSide) -> u8 {
        let code = option.to_u8() as usize;
        match side {
            TelnetSide::Local => self.will_wont_resp[code],
            TelnetSide::Remote => self.do_dont_resp[code],
        }
    }

    /// Notes that a PDU we sent expects an answer.
    pub fn expect_reply(&mut self, option: TelnetOption, side: TelnetSide) {
        let counter = self.counter_mut(option, side);
        *counter = counter.saturating_add(1);
    }

    /// Accounts for a received PDU against the outstanding reply count.
    ///
    /// `received` is the state the PDU asserts (true for WILL and DO). When
    /// two requests are outstanding and the PDU matches the state we are
    /// already in, it answers both.
    pub fn settle_reply(&mut self, option: TelnetOption, side: TelnetSide, received: bool) {
        let already = self.is_enabled(option, side) == received;
        let counter = self.counter_mut(option, side);
        if *counter > 0 {
            *counter -= 1;
            if *counter > 0 && already {
                *counter -= 1;
            }
        }
    }

    /// True when no option has a change or reply outstanding.
    pub fn is_settled(&self) -> bool {
        self.entries
            .iter()
            .all(|e| !e.is_changing(TelnetSide::Local) && !e.is_changing(TelnetSide::Remote))
            && self.will_wont_resp.iter().all(|&n| n == 0)
            && self.do_dont_resp.iter().all(|&n| n == 0)
    }

    /// Iterates over the options enabled on the given side.
    pub fn enabled(&self, side: TelnetSide) -> impl Iterator<Item = TelnetOption> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.state(side))
            .map(|(code, _)| TelnetOption::from_u8(code as u8))
    }

    fn counter_mut(&mut self, option: TelnetOption, side: TelnetSide) -> &mut u8 {
        let code = option.to_u8() as usize;
        match side {
            TelnetSide::Local => &mut self.will_wont_resp[code],
            TelnetSide::Remote => &mut self.do_dont_resp[code],
        }
    }
}

impl Default for OptionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_code_roundtrip_all_bytes() {
        for byte in 0..=255u8 {
            assert_eq!(TelnetOption::from_u8(byte).to_u8(), byte);
        }
    }

    #[test]
    fn test_option_named_codes() {
        assert_eq!(TelnetOption::from_u8(1), TelnetOption::Echo);
        assert_eq!(TelnetOption::from_u8(34), TelnetOption::Linemode);
        assert_eq!(TelnetOption::from_u8(36), TelnetOption::OldEnvironment);
        assert_eq!(TelnetOption::from_u8(39), TelnetOption::NewEnvironment);
        assert_eq!(TelnetOption::from_u8(99), TelnetOption::Unknown(99));
    }

    #[test]
    fn test_table_starts_disabled() {
        let table = OptionTable::new();
        for byte in 0..=255u8 {
            let entry = table.entry(TelnetOption::from_u8(byte));
            assert_eq!(entry, OptionEntry::default());
        }
        assert!(table.is_settled());
    }

    #[test]
    fn test_sides_are_independent() {
        let mut table = OptionTable::new();
        table.set_state(TelnetOption::Echo, TelnetSide::Local, true);
        assert!(table.is_enabled(TelnetOption::Echo, TelnetSide::Local));
        assert!(!table.is_enabled(TelnetOption::Echo, TelnetSide::Remote));
    }

    #[test]
    fn test_change_in_flight_when_bits_differ() {
        let mut table = OptionTable::new();
        table.set_want(TelnetOption::Linemode, TelnetSide::Remote, true);
        assert!(table.is_changing(TelnetOption::Linemode, TelnetSide::Remote));
        assert!(!table.is_settled());
        table.set_state(TelnetOption::Linemode, TelnetSide::Remote, true);
        assert!(!table.is_changing(TelnetOption::Linemode, TelnetSide::Remote));
    }

    #[test]
    fn test_settle_reply_counts_down() {
        let mut table = OptionTable::new();
        table.expect_reply(TelnetOption::NAWS, TelnetSide::Remote);
        assert_eq!(table.pending_replies(TelnetOption::NAWS, TelnetSide::Remote), 1);
        table.settle_reply(TelnetOption::NAWS, TelnetSide::Remote, true);
        assert_eq!(table.pending_replies(TelnetOption::NAWS, TelnetSide::Remote), 0);
        // Unsolicited PDUs never underflow.
        table.settle_reply(TelnetOption::NAWS, TelnetSide::Remote, true);
        assert_eq!(table.pending_replies(TelnetOption::NAWS, TelnetSide::Remote), 0);
    }

    #[test]
    fn test_settle_reply_answers_two_when_state_matches() {
        let mut table = OptionTable::new();
        table.set_state(TelnetOption::Echo, TelnetSide::Local, true);
        table.expect_reply(TelnetOption::Echo, TelnetSide::Local);
        table.expect_reply(TelnetOption::Echo, TelnetSide::Local);
        table.settle_reply(TelnetOption::Echo, TelnetSide::Local, true);
        assert_eq!(table.pending_replies(TelnetOption::Echo, TelnetSide::Local), 0);
    }

    #[test]
    fn test_enabled_iterator() {
        let mut table = OptionTable::new();
        table.set_state(TelnetOption::Echo, TelnetSide::Local, true);
        table.set_state(TelnetOption::Status, TelnetSide::Local, true);
        table.set_state(TelnetOption::NAWS, TelnetSide::Remote, true);
        let local: Vec<_> = table.enabled(TelnetSide::Local).collect();
        assert_eq!(local, vec![TelnetOption::Echo, TelnetOption::Status]);
        let remote: Vec<_> = table.enabled(TelnetSide::Remote).collect();
        assert_eq!(remote, vec![TelnetOption::NAWS]);
    }
}
