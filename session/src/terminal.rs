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


//! Terminal mode handed to the local endpoint and client facts gathered
//! from suboptions.

use crate::slc::ControlChar;
use std::collections::BTreeMap;
use telnetd_codec::environ::EnvironVariable;
use telnetd_codec::naws::WindowSize;
use telnetd_codec::terminal::TerminalSpeed;

/// How the local endpoint should treat its input and output.
///
/// This is the session's stand-in for termios: the engine recomputes it
/// after negotiation and suboption traffic, and the session publishes it
/// through [`LocalEndpoint::set_terminal_mode`](crate::LocalEndpoint::set_terminal_mode).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TerminalMode {
    /// Local side echoes input
    pub echo: bool,
    /// Peer edits lines and sends them whole
    pub line_edit: bool,
    /// Peer maps signal characters to IP, SUSP, ABORT
    pub trap_signals: bool,
    /// Peer expands tabs
    pub soft_tab: bool,
    /// Peer echoes non-printables literally
    pub lit_echo: bool,
    /// Peer sends binary
    pub binary_in: bool,
    /// We send binary
    pub binary_out: bool,
    /// Peer window size
    pub window: WindowSize,
    /// Control characters agreed through SLC
    pub control_chars: BTreeMap<ControlChar, u8>,
}

impl TerminalMode {
    /// Character bound to `control`, if any
    pub fn control_char(&self, control: ControlChar) -> Option<u8> {
        self.control_chars.get(&control).copied()
    }
}

/// What the client told us about itself
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClientInfo {
    /// TTYPE IS
    pub terminal_type: Option<String>,
    /// TSPEED IS
    pub terminal_speed: Option<TerminalSpeed>,
    /// XDISPLOC IS
    pub display_location: Option<String>,
    /// NAWS
    pub window_size: Option<WindowSize>,
    /// NEW-ENVIRON and OLD-ENVIRON variables, latest value wins
    pub environment: BTreeMap<String, String>,
}

impl ClientInfo {
    /// Merges reported variables. Undefined variables are removed.
    pub fn merge_environment(&mut self, variables: &[EnvironVariable]) {
        for variable in variables {
            match &variable.value {
                Some(value) => {
                    self.environment.insert(variable.name.clone(), value.clone());
                }
                None => {
                    self.environment.remove(&variable.name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telnetd_codec::environ::EnvironKind;

    #[test]
    fn test_merge_environment() {
        let mut info = ClientInfo::default();
        info.merge_environment(&[
            EnvironVariable::var("USER", "alice"),
            EnvironVariable::user_var("SHELL", "sh"),
        ]);
        info.merge_environment(&[EnvironVariable {
            kind: EnvironKind::UserVar,
            name: "SHELL".to_string(),
            value: None,
        }]);
        assert_eq!(info.environment.get("USER").map(String::as_str), Some("alice"));
        assert!(!info.environment.contains_key("SHELL"));
    }

    #[test]
    fn test_default_mode() {
        let mode = TerminalMode::default();
        assert!(!mode.echo);
        assert_eq!(mode.window, WindowSize::new(80, 24));
        assert_eq!(mode.control_char(ControlChar::Interrupt), None);
    }
}
