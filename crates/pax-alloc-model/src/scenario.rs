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
use crate::demand::{Demand, Priority};
use crate::err::ScenarioError;
use crate::geo::SpeedTable;
use crate::platform::PlatformId;
use chrono::NaiveTime;
use serde::Deserialize;
use std::io::Read;

/// The solver's input boundary: the daily fleet and the demand matrix.
///
/// This is the JSON rendition of the planning sheet: the crew-change flag
/// and hub headcount, one row per boat, one row per destination platform.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub crew_change: bool,
    pub m9_crew_headcount: u32,
    pub boats: Vec<Boat>,
    pub demands: Vec<Demand>,
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    #[serde(default)]
    crew_change: bool,
    #[serde(default)]
    m9_crew_headcount: u32,
    #[serde(default)]
    boats: Vec<RawBoatRow>,
    #[serde(default)]
    demands: Vec<RawDemandRow>,
}

#[derive(Debug, Deserialize)]
struct RawBoatRow {
    name: String,
    #[serde(default = "default_available")]
    available: bool,
    #[serde(default)]
    departure: Option<String>,
    #[serde(default)]
    fixed_route: Option<String>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawDemandRow {
    platform: String,
    #[serde(default)]
    m9: u32,
    #[serde(default)]
    tmib: u32,
    #[serde(default)]
    priority: u8,
}

impl Scenario {
    pub fn from_reader<R: Read>(r: R, speeds: &SpeedTable) -> Result<Self, ScenarioError> {
        let raw: RawScenario = serde_json::from_reader(r)?;
        Self::from_raw(raw, speeds)
    }

    pub fn from_json_str(s: &str, speeds: &SpeedTable) -> Result<Self, ScenarioError> {
        let raw: RawScenario = serde_json::from_str(s)?;
        Self::from_raw(raw, speeds)
    }

    fn from_raw(raw: RawScenario, speeds: &SpeedTable) -> Result<Self, ScenarioError> {
        let mut boats = Vec::with_capacity(raw.boats.len());
        for (i, row) in raw.boats.into_iter().enumerate() {
            let row_no = i + 1;
            let departure = match row.departure.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(text) => Some(NaiveTime::parse_from_str(text, "%H:%M").map_err(|_| {
                    ScenarioError::BadDeparture {
                        row: row_no,
                        boat: row.name.clone(),
                        value: text.to_string(),
                    }
                })?),
            };
            let fixed_route = row
                .fixed_route
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"));
            let kind = crate::boat::BoatKind::from_name(&row.name);
            let speed = speeds.speed_for(&row.name, kind);
            boats.push(Boat::new(
                row.name,
                row.available,
                departure,
                speed,
                fixed_route,
            ));
        }

        let mut demands: Vec<Demand> = Vec::with_capacity(raw.demands.len());
        for (i, row) in raw.demands.into_iter().enumerate() {
            let row_no = i + 1;
            let platform = PlatformId::parse(&row.platform)
                .map_err(|source| ScenarioError::UnknownPlatform { row: row_no, source })?;
            if platform.is_tmib() {
                return Err(ScenarioError::TerminalAsDestination { row: row_no });
            }
            let priority =
                Priority::new(row.priority).ok_or_else(|| ScenarioError::BadPriority {
                    row: row_no,
                    platform: platform.as_str().to_string(),
                    value: row.priority,
                })?;
            // Duplicate rows for one platform fold into a single demand.
            if let Some(existing) = demands.iter_mut().find(|d| d.platform == platform) {
                existing.tmib += row.tmib;
                existing.m9 += row.m9;
                existing.priority = existing.priority.merged_with(priority);
            } else {
                demands.push(Demand::new(platform, row.tmib, row.m9, priority));
            }
        }

        Ok(Scenario {
            crew_change: raw.crew_change,
            m9_crew_headcount: raw.m9_crew_headcount,
            boats,
            demands,
        })
    }

    pub fn available_boats(&self) -> impl Iterator<Item = &Boat> {
        self.boats.iter().filter(|b| b.is_available())
    }

    pub fn total_demand(&self) -> u32 {
        self.demands.iter().map(Demand::total).sum()
    }
}
