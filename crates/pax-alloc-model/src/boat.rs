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

use chrono::{NaiveTime, Timelike};
use pax_alloc_core::prelude::Knots;

/// Boats without a departure time sort after every timed departure.
pub const MISSING_DEPARTURE_MINUTES: u32 = 999 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoatKind {
    Surfer,
    AquaHelix,
}

impl BoatKind {
    /// Derived from the vessel name: an Aqua Helix carries both substrings
    /// in its name, everything else is a Surfer.
    pub fn from_name(name: &str) -> Self {
        let up = name.to_uppercase();
        if up.contains("AQUA") && up.contains("HELIX") {
            BoatKind::AquaHelix
        } else {
            BoatKind::Surfer
        }
    }

    #[inline]
    pub fn capacity(self) -> u32 {
        match self {
            BoatKind::Surfer => 24,
            BoatKind::AquaHelix => 100,
        }
    }
}

impl std::fmt::Display for BoatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoatKind::Surfer => write!(f, "Surfer"),
            BoatKind::AquaHelix => write!(f, "Aqua Helix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boat {
    name: String,
    available: bool,
    departure: Option<NaiveTime>,
    kind: BoatKind,
    capacity: u32,
    speed: Knots,
    fixed_route: Option<String>,
}

impl Boat {
    pub fn new(
        name: impl Into<String>,
        available: bool,
        departure: Option<NaiveTime>,
        speed: Knots,
        fixed_route: Option<String>,
    ) -> Self {
        let name = name.into();
        let kind = BoatKind::from_name(&name);
        Self {
            name,
            available,
            departure,
            kind,
            capacity: kind.capacity(),
            speed,
            fixed_route,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.available
    }

    #[inline]
    pub fn kind(&self) -> BoatKind {
        self.kind
    }

    #[inline]
    pub fn is_aqua(&self) -> bool {
        self.kind == BoatKind::AquaHelix
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn speed(&self) -> Knots {
        self.speed
    }

    #[inline]
    pub fn fixed_route(&self) -> Option<&str> {
        self.fixed_route.as_deref()
    }

    pub fn departure_minutes(&self) -> u32 {
        match self.departure {
            Some(t) => t.hour() * 60 + t.minute(),
            None => MISSING_DEPARTURE_MINUTES,
        }
    }

    /// The `HH:MM` label printed in the distribution file; empty when the
    /// boat has no departure time.
    pub fn departure_label(&self) -> String {
        match self.departure {
            Some(t) => format!("{:02}:{:02}", t.hour(), t.minute()),
            None => String::new(),
        }
    }
}
