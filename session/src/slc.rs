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


//! The Set Local Characters table.

use std::collections::BTreeMap;
use telnetd_codec::slc::{SlcFlags, SlcFunction, SlcLevel, SlcTriplet};
use tracing::{debug, trace};

/// Terminal control character an SLC function is bound to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ControlChar {
    /// Interrupt (VINTR)
    Interrupt,
    /// Quit (VQUIT)
    Quit,
    /// Discard output (VDISCARD)
    Discard,
    /// Suspend (VSUSP)
    Suspend,
    /// End of file (VEOF)
    EndOfFile,
    /// Erase character (VERASE)
    Erase,
    /// Erase line (VKILL)
    Kill,
    /// Erase word (VWERASE)
    WordErase,
    /// Reprint line (VREPRINT)
    Reprint,
    /// Literal next (VLNEXT)
    LiteralNext,
    /// Start output (VSTART)
    Start,
    /// Stop output (VSTOP)
    Stop,
    /// Additional end of line (VEOL)
    EndOfLine,
    /// Second additional end of line (VEOL2)
    EndOfLine2,
}

/// One row of the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlcEntry {
    /// Function of this row
    pub function: SlcFunction,
    /// Current flags
    pub flags: SlcFlags,
    /// Current character
    pub value: u8,
    /// Flags we start with and fall back to
    pub default_flags: SlcFlags,
    /// Character we start with and fall back to
    pub default_value: u8,
    /// Terminal character the function drives
    pub binding: Option<ControlChar>,
}

impl SlcEntry {
    fn new(function: SlcFunction) -> Self {
        let (flags, value, binding) = defaults(function);
        Self {
            function,
            flags,
            value,
            default_flags: flags,
            default_value: value,
            binding,
        }
    }

    /// Whether the function has a usable character
    pub fn is_supported(&self) -> bool {
        self.flags.level != SlcLevel::NoSupport && self.value != 0
    }

    fn reset(&mut self) {
        self.flags = self.default_flags;
        self.value = self.default_value;
    }

    fn triplet(&self) -> SlcTriplet {
        SlcTriplet::new(self.function, self.flags.with_ack(false), self.value)
    }
}

fn defaults(function: SlcFunction) -> (SlcFlags, u8, Option<ControlChar>) {
    let variable = SlcFlags::new(SlcLevel::Variable);
    match function {
        SlcFunction::Synch | SlcFunction::Break | SlcFunction::EndOfRecord => {
            (SlcFlags::new(SlcLevel::Default), 0, None)
        }
        SlcFunction::InterruptProcess => {
            (variable.with_flush(true, true), 0x03, Some(ControlChar::Interrupt))
        }
        SlcFunction::Abort => (variable.with_flush(true, true), 0x1c, Some(ControlChar::Quit)),
        SlcFunction::AbortOutput => {
            (variable.with_flush(false, true), 0x0f, Some(ControlChar::Discard))
        }
        SlcFunction::Suspend => (variable.with_flush(true, false), 0x1a, Some(ControlChar::Suspend)),
        SlcFunction::EndOfFile => (variable, 0x04, Some(ControlChar::EndOfFile)),
        SlcFunction::EraseCharacter => (variable, 0x7f, Some(ControlChar::Erase)),
        SlcFunction::EraseLine => (variable, 0x15, Some(ControlChar::Kill)),
        SlcFunction::EraseWord => (variable, 0x17, Some(ControlChar::WordErase)),
        SlcFunction::Reprint => (variable, 0x12, Some(ControlChar::Reprint)),
        SlcFunction::LiteralNext => (variable, 0x16, Some(ControlChar::LiteralNext)),
        SlcFunction::Xon => (variable, 0x11, Some(ControlChar::Start)),
        SlcFunction::Xoff => (variable, 0x13, Some(ControlChar::Stop)),
        SlcFunction::AreYouThere => (SlcFlags::new(SlcLevel::NoSupport), 0, None),
        SlcFunction::Forward1 => (SlcFlags::new(SlcLevel::NoSupport), 0, Some(ControlChar::EndOfLine)),
        SlcFunction::Forward2 => {
            (SlcFlags::new(SlcLevel::NoSupport), 0, Some(ControlChar::EndOfLine2))
        }
    }
}

/// Result of processing a peer SLC request
#[derive(Debug, Default, Eq, PartialEq)]
pub struct SlcOutcome {
    /// Triples to send back, possibly empty
    pub replies: Vec<SlcTriplet>,
    /// Whether any current character changed
    pub changed: bool,
}

/// Per-session SLC table, one row per function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlcTable {
    entries: Vec<SlcEntry>,
}

impl Default for SlcTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SlcTable {
    /// Table with the default characters
    pub fn new() -> Self {
        Self {
            entries: SlcFunction::ALL.iter().copied().map(SlcEntry::new).collect(),
        }
    }

    /// Builds a table from defaults overridden by `triplets`, as the peer
    /// would after receiving our full table.
    pub fn from_triplets(triplets: &[SlcTriplet]) -> Self {
        let mut table = Self::new();
        for triplet in triplets {
            if let Some(function) = triplet.slc_function() {
                let entry = table.entry_mut(function);
                entry.flags = triplet.flags.with_ack(false);
                entry.value = triplet.value;
            }
        }
        table
    }

    /// Row for `function`
    pub fn entry(&self, function: SlcFunction) -> &SlcEntry {
        &self.entries[function.to_u8() as usize - 1]
    }

    fn entry_mut(&mut self, function: SlcFunction) -> &mut SlcEntry {
        &mut self.entries[function.to_u8() as usize - 1]
    }

    /// All rows in function order
    pub fn entries(&self) -> impl Iterator<Item = &SlcEntry> {
        self.entries.iter()
    }

    /// Character for `function` when it is supported
    pub fn char_for(&self, function: SlcFunction) -> Option<u8> {
        let entry = self.entry(function);
        entry.is_supported().then_some(entry.value)
    }

    /// Restores every row to its default.
    pub fn reset(&mut self) {
        self.entries.iter_mut().for_each(SlcEntry::reset);
    }

    /// The whole table as triples, ACK clear
    pub fn triplets(&self) -> Vec<SlcTriplet> {
        self.entries.iter().map(SlcEntry::triplet).collect()
    }

    /// Control characters of the supported, bound rows
    pub fn control_chars(&self) -> BTreeMap<ControlChar, u8> {
        self.entries
            .iter()
            .filter(|entry| entry.is_supported())
            .filter_map(|entry| entry.binding.map(|binding| (binding, entry.value)))
            .collect()
    }

    /// Applies a peer SLC request and collects the replies.
    pub fn process(&mut self, triplets: &[SlcTriplet]) -> SlcOutcome {
        let mut outcome = SlcOutcome::default();
        for triplet in triplets {
            if triplet.function == 0 {
                match triplet.flags.level {
                    SlcLevel::Default => {
                        debug!("Peer reset the SLC table to defaults");
                        self.reset();
                        outcome.changed = true;
                        outcome.replies = self.triplets();
                    }
                    SlcLevel::Variable => {
                        outcome.replies.extend(self.triplets());
                    }
                    _ => {}
                }
                continue;
            }
            let Some(function) = triplet.slc_function() else {
                trace!(function = triplet.function, "Unknown SLC function");
                outcome.replies.push(SlcTriplet {
                    function: triplet.function,
                    flags: SlcFlags::new(SlcLevel::NoSupport),
                    value: 0,
                });
                continue;
            };
            self.change(function, triplet, &mut outcome);
        }
        outcome
    }

    fn change(&mut self, function: SlcFunction, request: &SlcTriplet, outcome: &mut SlcOutcome) {
        let entry = self.entry_mut(function);
        if request.flags.ack
            || (request.flags.level == entry.flags.level && request.value == entry.value)
        {
            return;
        }
        let ours = entry.default_flags.level;
        let reply = match (request.flags.level, ours) {
            (SlcLevel::NoSupport, _) => {
                entry.flags = request.flags.with_ack(false);
                entry.value = 0;
                outcome.changed = true;
                SlcTriplet::new(function, request.flags.with_ack(true), request.value)
            }
            (SlcLevel::Default, _) => {
                entry.reset();
                outcome.changed = true;
                entry.triplet()
            }
            (SlcLevel::Variable, SlcLevel::Variable | SlcLevel::Default)
            | (SlcLevel::CantChange, SlcLevel::Default) => {
                entry.flags = request.flags.with_ack(false);
                entry.value = request.value;
                outcome.changed = true;
                SlcTriplet::new(function, request.flags.with_ack(true), request.value)
            }
            (SlcLevel::CantChange, SlcLevel::CantChange | SlcLevel::NoSupport)
            | (SlcLevel::Variable, SlcLevel::NoSupport) => {
                SlcTriplet::new(function, SlcFlags::new(SlcLevel::NoSupport), 0)
            }
            (SlcLevel::Variable, SlcLevel::CantChange) | (SlcLevel::CantChange, SlcLevel::Variable) => {
                entry.triplet()
            }
        };
        debug!(
            function = %function,
            requested = %request.flags.level,
            replied = %reply.flags.level,
            "SLC change processed"
        );
        outcome.replies.push(reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telnetd_codec::consts::linemode as lm;

    fn triplet(function: u8, flags: u8, value: u8) -> SlcTriplet {
        SlcTriplet {
            function,
            flags: SlcFlags::from_byte(flags),
            value,
        }
    }

    #[test]
    fn test_defaults() {
        let table = SlcTable::new();
        assert_eq!(table.char_for(SlcFunction::InterruptProcess), Some(0x03));
        assert_eq!(table.char_for(SlcFunction::EraseCharacter), Some(0x7f));
        assert_eq!(table.char_for(SlcFunction::AreYouThere), None);
        assert_eq!(table.char_for(SlcFunction::Synch), None);
        let ip = table.entry(SlcFunction::InterruptProcess);
        assert!(ip.flags.flush_in && ip.flags.flush_out);
        let ao = table.entry(SlcFunction::AbortOutput);
        assert!(!ao.flags.flush_in && ao.flags.flush_out);
        assert_eq!(table.control_chars().get(&ControlChar::Quit), Some(&0x1c));
    }

    #[test]
    fn test_cantchange_against_variable_gets_our_value() {
        let mut table = SlcTable::new();
        let outcome = table.process(&[triplet(lm::SLC_IP, lm::SLC_CANTCHANGE, 0x03)]);
        assert!(!outcome.changed);
        assert_eq!(outcome.replies.len(), 1);
        let reply = outcome.replies[0];
        assert_eq!(reply.function, lm::SLC_IP);
        assert_eq!(reply.flags.level, SlcLevel::Variable);
        assert!(!reply.flags.ack);
        assert_eq!(reply.value, 0x03);
    }

    #[test]
    fn test_variable_change_accepted_with_ack() {
        let mut table = SlcTable::new();
        let outcome = table.process(&[triplet(lm::SLC_EC, lm::SLC_VARIABLE, 0x08)]);
        assert!(outcome.changed);
        assert_eq!(table.char_for(SlcFunction::EraseCharacter), Some(0x08));
        assert!(outcome.replies[0].flags.ack);
        assert_eq!(outcome.replies[0].value, 0x08);
    }

    #[test]
    fn test_agreeing_and_acked_triples_ignored() {
        let mut table = SlcTable::new();
        let outcome = table.process(&[
            triplet(lm::SLC_EOF, lm::SLC_VARIABLE, 0x04),
            triplet(lm::SLC_EC, lm::SLC_VARIABLE | lm::SLC_ACK, 0x08),
        ]);
        assert_eq!(outcome, SlcOutcome::default());
        assert_eq!(table, SlcTable::new());
    }

    #[test]
    fn test_nosupport_accepted() {
        let mut table = SlcTable::new();
        let outcome = table.process(&[triplet(lm::SLC_SUSP, lm::SLC_NOSUPPORT, 0)]);
        assert!(outcome.changed);
        assert_eq!(table.char_for(SlcFunction::Suspend), None);
        assert!(outcome.replies[0].flags.ack);
    }

    #[test]
    fn test_default_restores_entry() {
        let mut table = SlcTable::new();
        table.process(&[triplet(lm::SLC_EL, lm::SLC_VARIABLE, 0x18)]);
        let outcome = table.process(&[triplet(lm::SLC_EL, lm::SLC_DEFAULT, 0)]);
        assert_eq!(table.char_for(SlcFunction::EraseLine), Some(0x15));
        assert_eq!(outcome.replies[0].value, 0x15);
        assert_eq!(outcome.replies[0].flags.level, SlcLevel::Variable);
    }

    #[test]
    fn test_whole_table_requests() {
        let mut table = SlcTable::new();
        table.process(&[triplet(lm::SLC_EC, lm::SLC_VARIABLE, 0x08)]);
        let outcome = table.process(&[triplet(0, lm::SLC_VARIABLE, 0)]);
        assert_eq!(outcome.replies.len(), lm::NSLC as usize);
        assert_eq!(table.char_for(SlcFunction::EraseCharacter), Some(0x08));

        let outcome = table.process(&[triplet(0, lm::SLC_DEFAULT, 0)]);
        assert_eq!(outcome.replies, SlcTable::new().triplets());
        assert_eq!(table, SlcTable::new());
    }

    #[test]
    fn test_unknown_function_nosupport() {
        let mut table = SlcTable::new();
        let outcome = table.process(&[triplet(30, lm::SLC_VARIABLE, 1)]);
        assert_eq!(outcome.replies, vec![triplet(30, lm::SLC_NOSUPPORT, 0)]);
    }

    #[test]
    fn test_cantchange_vs_nosupport_degenerates() {
        let mut table = SlcTable::new();
        let outcome = table.process(&[triplet(lm::SLC_AYT, lm::SLC_CANTCHANGE, 0x14)]);
        assert_eq!(outcome.replies[0].flags.level, SlcLevel::NoSupport);
    }

    #[test]
    fn test_table_triplet_symmetry() {
        let mut table = SlcTable::new();
        table.process(&[
            triplet(lm::SLC_EC, lm::SLC_VARIABLE, 0x08),
            triplet(lm::SLC_SUSP, lm::SLC_NOSUPPORT, 0),
        ]);
        let mut wire = Vec::new();
        SlcTriplet::encode_list(&table.triplets(), &mut wire);
        assert_eq!(SlcTable::from_triplets(&SlcTriplet::decode_list(&wire)), table);
    }
}
