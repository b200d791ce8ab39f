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


//! Logical clocks used to order negotiation events.
//!
//! These are counters, not wall time. Each [`Clocks::settimer`] call
//! advances the system clock and stamps the named event with it, so one can
//! ask whether an event happened after another.

/// Named stamps
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stamp {
    /// Last time the local echo state flipped
    EchoToggle,
    /// Last LINEMODE MODE agreement
    ModeNegotiated,
    /// Last network read that returned data
    DidNetReceive,
    /// Last TTYPE IS or TTYPE refusal
    TtypeSubopt,
    /// Last TSPEED IS or TSPEED refusal
    TspeedSubopt,
    /// Last NEW-ENVIRON IS/INFO or refusal
    EnvironSubopt,
    /// Last OLD-ENVIRON IS/INFO or refusal
    OldEnvironSubopt,
    /// Last XDISPLOC IS or refusal
    XdisplocSubopt,
    /// Session start
    Baseline,
    /// Last Data Mark
    GotDataMark,
}

impl Stamp {
    const COUNT: usize = 10;

    fn index(self) -> usize {
        match self {
            Stamp::EchoToggle => 0,
            Stamp::ModeNegotiated => 1,
            Stamp::DidNetReceive => 2,
            Stamp::TtypeSubopt => 3,
            Stamp::TspeedSubopt => 4,
            Stamp::EnvironSubopt => 5,
            Stamp::OldEnvironSubopt => 6,
            Stamp::XdisplocSubopt => 7,
            Stamp::Baseline => 8,
            Stamp::GotDataMark => 9,
        }
    }
}

/// The clock record of one session
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Clocks {
    system: u64,
    stamps: [u64; Stamp::COUNT],
}

impl Clocks {
    /// All clocks at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the system clock and stamps `stamp` with it.
    pub fn settimer(&mut self, stamp: Stamp) {
        self.system += 1;
        self.stamps[stamp.index()] = self.system;
    }

    /// Current system clock
    pub fn system(&self) -> u64 {
        self.system
    }

    /// Value of a stamp; zero if it never fired
    pub fn get(&self, stamp: Stamp) -> u64 {
        self.stamps[stamp.index()]
    }

    /// Whether `stamp` has not moved past `baseline`.
    pub fn sequence_is(&self, stamp: Stamp, baseline: Stamp) -> bool {
        self.get(stamp) <= self.get(baseline)
    }

    /// Whether `stamp` fired after `baseline`.
    pub fn happened_after(&self, stamp: Stamp, baseline: Stamp) -> bool {
        !self.sequence_is(stamp, baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settimer_orders_events() {
        let mut clocks = Clocks::new();
        clocks.settimer(Stamp::Baseline);
        assert!(clocks.sequence_is(Stamp::TtypeSubopt, Stamp::Baseline));
        clocks.settimer(Stamp::TtypeSubopt);
        assert!(clocks.happened_after(Stamp::TtypeSubopt, Stamp::Baseline));
        assert_eq!(clocks.system(), 2);
        assert_eq!(clocks.get(Stamp::TtypeSubopt), 2);
        assert_eq!(clocks.get(Stamp::GotDataMark), 0);
    }
}
