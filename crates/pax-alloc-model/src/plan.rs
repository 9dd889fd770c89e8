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

use crate::boat::Boat;
use crate::format;
use crate::route::Route;
use pax_alloc_core::prelude::Nm;
use std::io::{self, Write};

/// One line of the distribution: either a route the operator pinned by hand
/// (emitted verbatim) or one the solver built.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanEntry {
    Fixed { boat: Boat, route: String },
    Built(Route),
}

impl PlanEntry {
    pub fn boat(&self) -> &Boat {
        match self {
            PlanEntry::Fixed { boat, .. } => boat,
            PlanEntry::Built(route) => &route.boat,
        }
    }

    pub fn route_string(&self) -> String {
        match self {
            PlanEntry::Fixed { route, .. } => route.clone(),
            PlanEntry::Built(route) => format::route_string(route),
        }
    }
}

/// The day's distribution: entries ordered by departure plus the warnings
/// accumulated while solving (unmet demand, unallocated hub passengers,
/// total free-route distance).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
    pub warnings: Vec<String>,
}

impl Plan {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn built_routes(&self) -> impl Iterator<Item = &Route> {
        self.entries.iter().filter_map(|e| match e {
            PlanEntry::Built(route) => Some(route),
            PlanEntry::Fixed { .. } => None,
        })
    }

    pub fn total_free_distance(&self) -> Nm {
        self.built_routes().map(|r| r.distance).sum()
    }

    /// Served totals across built and fixed entries. Fixed entries are
    /// re-parsed, so unreadable notation counts for nothing.
    pub fn served_totals(&self) -> (u32, u32) {
        let mut tmib = 0;
        let mut m9 = 0;
        for entry in &self.entries {
            match entry {
                PlanEntry::Built(route) => {
                    tmib += route.total_tmib();
                    m9 += route.total_m9_drops();
                }
                PlanEntry::Fixed { route, .. } => {
                    let deliveries = format::parse_fixed_route(route);
                    tmib += deliveries.total_tmib();
                    m9 += deliveries.total_m9();
                }
            }
        }
        (tmib, m9)
    }
}

const RULE_HEAVY: &str = "======================================================================";
const RULE_LIGHT: &str = "----------------------------------------------------------------------";

/// Writes the distribution text file. An empty plan with no warnings writes
/// the header block only.
pub fn write_report<W: Write>(
    plan: &Plan,
    crew_change: bool,
    m9_crew_headcount: u32,
    w: &mut W,
) -> io::Result<()> {
    writeln!(w, "DISTRIBUICAO DE PAX")?;
    writeln!(w, "{RULE_HEAVY}")?;

    if plan.is_empty() && plan.warnings.is_empty() {
        return Ok(());
    }

    if crew_change {
        writeln!(w, "Troca de turma: SIM | Rendidos em M9: {m9_crew_headcount}")?;
    }
    writeln!(w)?;

    for entry in &plan.entries {
        let boat = entry.boat();
        writeln!(
            w,
            "{}  {}  {}",
            boat.name(),
            boat.departure_label(),
            entry.route_string()
        )?;
    }

    let (tmib, m9) = plan.served_totals();
    writeln!(w)?;
    writeln!(w, "{RULE_LIGHT}")?;
    writeln!(
        w,
        "Resumo: {tmib} pax TMIB + {m9} pax M9 = {} pax total",
        tmib + m9
    )?;
    writeln!(w, "Barcos utilizados: {}", plan.entries.len())?;
    writeln!(w, "{RULE_HEAVY}")?;

    if !plan.warnings.is_empty() {
        writeln!(w)?;
        for warning in &plan.warnings {
            writeln!(w, "{warning}")?;
        }
    }

    Ok(())
}
