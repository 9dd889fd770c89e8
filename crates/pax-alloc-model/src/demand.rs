// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::platform::PlatformId;

/// Operational priority of a demand. Level 1 is the most urgent; level 0
/// means no priority was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Priority(u8);

impl Priority {
    pub const NONE: Priority = Priority(0);
    pub const P1: Priority = Priority(1);
    pub const P2: Priority = Priority(2);
    pub const P3: Priority = Priority(3);

    pub fn new(level: u8) -> Option<Self> {
        (level <= 3).then_some(Priority(level))
    }

    #[inline]
    pub fn level(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_set(self) -> bool {
        self.0 != 0
    }

    /// Weight used by the sequencing and priority-time penalties.
    #[inline]
    pub fn weight(self) -> u32 {
        match self.0 {
            1 => 15,
            2 => 3,
            3 => 1,
            _ => 0,
        }
    }

    /// Merge rule for duplicate demand entries: the higher level wins, and
    /// any assigned priority wins over none.
    #[inline]
    pub fn merged_with(self, other: Priority) -> Priority {
        Priority(self.0.max(other.0))
    }

    /// Sort rank that places unprioritized demand last.
    #[inline]
    pub fn urgency_rank(self) -> u8 {
        if self.0 == 0 { u8::MAX } else { self.0 }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            write!(f, "-")
        } else {
            write!(f, "P{}", self.0)
        }
    }
}

/// Passengers owed to one platform, split by origin pool: `tmib` board at the
/// terminal, `m9` board at the hub. Counts only ever decrease while solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demand {
    pub platform: PlatformId,
    pub tmib: u32,
    pub m9: u32,
    pub priority: Priority,
}

impl Demand {
    pub fn new(platform: PlatformId, tmib: u32, m9: u32, priority: Priority) -> Self {
        Self {
            platform,
            tmib,
            m9,
            priority,
        }
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.tmib + self.m9
    }

    #[inline]
    pub fn has_m9(&self) -> bool {
        self.m9 > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_levels() {
        assert_eq!(Priority::new(0), Some(Priority::NONE));
        assert_eq!(Priority::new(1), Some(Priority::P1));
        assert_eq!(Priority::new(4), None);
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(Priority::P1.weight(), 15);
        assert_eq!(Priority::P2.weight(), 3);
        assert_eq!(Priority::P3.weight(), 1);
        assert_eq!(Priority::NONE.weight(), 0);
    }

    #[test]
    fn test_priority_merge() {
        assert_eq!(Priority::NONE.merged_with(Priority::P2), Priority::P2);
        assert_eq!(Priority::P1.merged_with(Priority::NONE), Priority::P1);
        assert_eq!(Priority::P1.merged_with(Priority::P2), Priority::P2);
    }

    #[test]
    fn test_urgency_rank_puts_none_last() {
        assert!(Priority::P3.urgency_rank() < Priority::NONE.urgency_rank());
        assert!(Priority::P1.urgency_rank() < Priority::P2.urgency_rank());
    }

    #[test]
    fn test_demand_total() {
        let d = Demand::new(PlatformId::parse("M6").unwrap(), 3, 2, Priority::NONE);
        assert_eq!(d.total(), 5);
        assert!(d.has_m9());
    }
}
