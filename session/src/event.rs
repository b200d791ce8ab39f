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


//! Events the engine reports to the session owner

use telnetd_codec::environ::EnvironVariable;
use telnetd_codec::linemode::LineModeFlags;
use telnetd_codec::naws::WindowSize;
use telnetd_codec::terminal::TerminalSpeed;
use telnetd_codec::{TelnetOption, TelnetSide};

/// Something observable happened in the protocol.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    /// An option was enabled or disabled on one side
    OptionChanged {
        /// Option
        option: TelnetOption,
        /// Side the change applies to
        side: TelnetSide,
        /// New state
        enabled: bool,
    },
    /// Client reported its terminal type
    TerminalType(String),
    /// Client reported its line speeds
    TerminalSpeed(TerminalSpeed),
    /// Client reported its X display
    DisplayLocation(String),
    /// Client reported environment variables
    Environment(Vec<EnvironVariable>),
    /// Client window size changed
    WindowSize(WindowSize),
    /// Linemode MODE agreed
    LinemodeChanged(LineModeFlags),
    /// Peer agreed to or refused a forward mask
    ForwardMask(bool),
    /// The SLC table changed
    SlcChanged,
    /// A Data Mark arrived
    DataMark,
    /// Peer asked us to log out
    Logout,
}
