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


//! Session configuration types and builders
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use telnetd_session::{SessionConfig, UrgentPolicy};
//!
//! let config = SessionConfig::default()
//!     .with_buffer_size(4096)
//!     .with_urgent_policy(UrgentPolicy::InBand)
//!     .with_poll_interval(Duration::from_millis(5));
//! assert_eq!(config.buffer_capacity(), 4096 + 64);
//! ```

use std::collections::BTreeSet;
use std::time::Duration;
use telnetd_codec::environ::EnvironVariable;
use telnetd_codec::linemode::LineModeFlags;
use telnetd_codec::terminal::TerminalSpeed;
use telnetd_codec::{DEFAULT_MAX_SUBNEGOTIATION, NegotiationVerb, TelnetOption};

/// How the urgent boundary in net-out is delivered.
///
/// Some old clients cannot handle TCP urgent data. For them the whole
/// buffer goes out in-band and only the Data Mark carries the SYNCH.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UrgentPolicy {
    /// Flag the byte before the boundary as TCP urgent data
    #[default]
    OutOfBand,
    /// Never use urgent data
    InBand,
}

/// Which options the session agrees to and which it asks for at start.
#[derive(Clone, Debug)]
pub struct NegotiationPolicy {
    local: BTreeSet<TelnetOption>,
    remote: BTreeSet<TelnetOption>,
    start: Vec<(NegotiationVerb, TelnetOption)>,
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            local: BTreeSet::from([
                TelnetOption::Echo,
                TelnetOption::SuppressGoAhead,
                TelnetOption::Status,
                TelnetOption::TransmitBinary,
                TelnetOption::TimingMark,
                TelnetOption::Logout,
            ]),
            remote: BTreeSet::from([
                TelnetOption::TransmitBinary,
                TelnetOption::SuppressGoAhead,
                TelnetOption::TTYPE,
                TelnetOption::TSPEED,
                TelnetOption::NAWS,
                TelnetOption::XDISPLOC,
                TelnetOption::NewEnvironment,
                TelnetOption::OldEnvironment,
                TelnetOption::Linemode,
            ]),
            start: vec![
                (NegotiationVerb::Will, TelnetOption::SuppressGoAhead),
                (NegotiationVerb::Do, TelnetOption::Linemode),
                (NegotiationVerb::Will, TelnetOption::Status),
                (NegotiationVerb::Will, TelnetOption::Echo),
                (NegotiationVerb::Do, TelnetOption::NAWS),
                (NegotiationVerb::Do, TelnetOption::TTYPE),
                (NegotiationVerb::Do, TelnetOption::TSPEED),
                (NegotiationVerb::Do, TelnetOption::XDISPLOC),
                (NegotiationVerb::Do, TelnetOption::NewEnvironment),
            ],
        }
    }
}

impl NegotiationPolicy {
    /// A policy that refuses everything and requests nothing
    pub fn refuse_all() -> Self {
        Self {
            local: BTreeSet::new(),
            remote: BTreeSet::new(),
            start: Vec::new(),
        }
    }

    /// Whether we agree to enable `option` on our side when the peer sends DO
    pub fn accepts_local(&self, option: TelnetOption) -> bool {
        self.local.contains(&option)
    }

    /// Whether we agree to let the peer enable `option` when it sends WILL.
    /// Peer ECHO is always refused.
    pub fn accepts_remote(&self, option: TelnetOption) -> bool {
        option != TelnetOption::Echo && self.remote.contains(&option)
    }

    /// Requests sent when the session starts, in order
    pub fn start_requests(&self) -> &[(NegotiationVerb, TelnetOption)] {
        &self.start
    }

    /// Allow or refuse a local option
    pub fn with_local(mut self, option: TelnetOption, accept: bool) -> Self {
        if accept {
            self.local.insert(option);
        } else {
            self.local.remove(&option);
        }
        self
    }

    /// Allow or refuse a remote option
    pub fn with_remote(mut self, option: TelnetOption, accept: bool) -> Self {
        if accept {
            self.remote.insert(option);
        } else {
            self.remote.remove(&option);
        }
        self
    }

    /// Replace the start list
    pub fn with_start_requests(mut self, start: Vec<(NegotiationVerb, TelnetOption)>) -> Self {
        self.start = start;
        self
    }
}

/// Values we report when the peer sends us a SEND request.
#[derive(Clone, Debug)]
pub struct LocalIdentity {
    /// Answer to TTYPE SEND
    pub terminal_type: String,
    /// Answer to TSPEED SEND
    pub terminal_speed: TerminalSpeed,
    /// Answer to XDISPLOC SEND
    pub display_location: String,
    /// Answer to NEW-ENVIRON and OLD-ENVIRON SEND
    pub environment: Vec<EnvironVariable>,
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self {
            terminal_type: "NETWORK".to_string(),
            terminal_speed: TerminalSpeed::default(),
            display_location: String::new(),
            environment: Vec::new(),
        }
    }
}

/// Per-session configuration
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Usable size of each of the four buffers
    pub buffer_size: usize,

    /// Extra room past `buffer_size` so a reply never splits
    pub buffer_slop: usize,

    /// Free space net-out must have before another inbound frame is processed
    pub reply_reserve: usize,

    /// Longest suboption payload kept; the rest is dropped
    pub max_subnegotiation: usize,

    /// How the urgent boundary is sent
    pub urgent_policy: UrgentPolicy,

    /// Wake-up interval of the session loop when both endpoints are idle
    pub poll_interval: Duration,

    /// Option policy
    pub negotiation: NegotiationPolicy,

    /// Linemode MODE proposed when the peer enables LINEMODE
    pub edit_mode: LineModeFlags,

    /// Bytes sent in answer to Are You There
    pub ayt_response: Vec<u8>,

    /// Deliver `CR LF` from a non-binary peer as `CR`
    pub map_crlf: bool,

    /// Values for answering SEND requests
    pub identity: LocalIdentity,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            buffer_slop: 64,
            reply_reserve: 256,
            max_subnegotiation: DEFAULT_MAX_SUBNEGOTIATION,
            urgent_policy: UrgentPolicy::OutOfBand,
            poll_interval: Duration::from_millis(10),
            negotiation: NegotiationPolicy::default(),
            edit_mode: LineModeFlags {
                edit: true,
                trapsig: true,
                ..LineModeFlags::default()
            },
            ayt_response: b"\r\n[Yes]\r\n".to_vec(),
            map_crlf: true,
            identity: LocalIdentity::default(),
        }
    }
}

impl SessionConfig {
    /// Total capacity of each buffer
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_size + self.buffer_slop
    }

    /// Free net-out space required before another inbound frame is
    /// processed. Never more than half the buffer, so a small buffer
    /// cannot stall input.
    pub fn effective_reply_reserve(&self) -> usize {
        self.reply_reserve.min(self.buffer_capacity() / 2)
    }

    /// Set the buffer size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the buffer slop
    pub fn with_buffer_slop(mut self, slop: usize) -> Self {
        self.buffer_slop = slop;
        self
    }

    /// Set the reply reserve
    pub fn with_reply_reserve(mut self, reserve: usize) -> Self {
        self.reply_reserve = reserve;
        self
    }

    /// Set the maximum suboption length
    pub fn with_max_subnegotiation(mut self, limit: usize) -> Self {
        self.max_subnegotiation = limit;
        self
    }

    /// Set the urgent policy
    pub fn with_urgent_policy(mut self, policy: UrgentPolicy) -> Self {
        self.urgent_policy = policy;
        self
    }

    /// Set the idle poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the option policy
    pub fn with_negotiation(mut self, policy: NegotiationPolicy) -> Self {
        self.negotiation = policy;
        self
    }

    /// Set the proposed linemode MODE
    pub fn with_edit_mode(mut self, mode: LineModeFlags) -> Self {
        self.edit_mode = mode.without_ack();
        self
    }

    /// Set the Are You There response
    pub fn with_ayt_response(mut self, response: impl Into<Vec<u8>>) -> Self {
        self.ayt_response = response.into();
        self
    }

    /// Enable or disable CR LF mapping
    pub fn with_map_crlf(mut self, enabled: bool) -> Self {
        self.map_crlf = enabled;
        self
    }

    /// Set the local identity
    pub fn with_identity(mut self, identity: LocalIdentity) -> Self {
        self.identity = identity;
        self
    }
}
