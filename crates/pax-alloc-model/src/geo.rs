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

use crate::boat::BoatKind;
use crate::err::GeoError;
use crate::platform::PlatformId;
use pax_alloc_core::prelude::{Knots, Nm};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;

pub const DEFAULT_SPEED_KN: f64 = 14.0;

/// The static platform-to-platform distance table in nautical miles.
///
/// The table is queried as directed even though the underlying survey data is
/// symmetric: a missing `a → b` entry falls back to `b → a`, and a fully
/// missing pair resolves to [`Nm::SENTINEL`].
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    table: HashMap<String, HashMap<String, f64>>,
}

impl DistanceMatrix {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(r: R) -> Result<Self, GeoError> {
        let raw: BTreeMap<String, BTreeMap<String, f64>> = serde_json::from_reader(r)?;
        let mut matrix = DistanceMatrix::new();
        for (a, row) in raw {
            let a = parse_geo_platform(&a, "Distance matrix")?;
            for (b, nm) in row {
                let b = parse_geo_platform(&b, "Distance matrix")?;
                matrix.insert(&a, &b, Nm::new(nm));
            }
        }
        Ok(matrix)
    }

    pub fn insert(&mut self, a: &PlatformId, b: &PlatformId, nm: Nm) {
        self.table
            .entry(a.as_str().to_string())
            .or_default()
            .insert(b.as_str().to_string(), nm.value());
    }

    pub fn distance(&self, a: &PlatformId, b: &PlatformId) -> Nm {
        if a == b {
            return Nm::new(0.0);
        }
        if let Some(nm) = self.table.get(a.as_str()).and_then(|row| row.get(b.as_str())) {
            return Nm::new(*nm);
        }
        if let Some(nm) = self.table.get(b.as_str()).and_then(|row| row.get(a.as_str())) {
            return Nm::new(*nm);
        }
        Nm::SENTINEL
    }

    /// Extra distance of calling at `stop` on the way from `from` to `to`.
    pub fn detour(&self, from: &PlatformId, stop: &PlatformId, to: &PlatformId) -> Nm {
        self.distance(from, stop) + self.distance(stop, to) - self.distance(from, to)
    }
}

/// Cruise speeds: one default per boat type plus per-boat overrides.
///
/// Override keys match boat names case-insensitively, with underscores and
/// spaces interchangeable.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedTable {
    #[serde(default)]
    surfer_kn: Option<f64>,
    #[serde(default)]
    aqua_kn: Option<f64>,
    #[serde(default)]
    overrides: BTreeMap<String, f64>,
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            surfer_kn: None,
            aqua_kn: None,
            overrides: BTreeMap::new(),
        }
    }
}

impl SpeedTable {
    pub fn from_reader<R: Read>(r: R) -> Result<Self, GeoError> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn speed_for(&self, name: &str, kind: BoatKind) -> Knots {
        let wanted = normalize_boat_key(name);
        for (key, kn) in &self.overrides {
            if normalize_boat_key(key) == wanted {
                return Knots::new(*kn);
            }
        }
        let type_default = match kind {
            BoatKind::Surfer => self.surfer_kn,
            BoatKind::AquaHelix => self.aqua_kn,
        };
        Knots::new(type_default.unwrap_or(DEFAULT_SPEED_KN))
    }
}

fn normalize_boat_key(name: &str) -> String {
    name.trim().to_uppercase().replace('_', " ")
}

/// Platforms where an Aqua Helix may dock.
#[derive(Debug, Clone, Default)]
pub struct Gangway {
    platforms: HashSet<String>,
}

impl Gangway {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(r: R) -> Result<Self, GeoError> {
        let raw: Vec<String> = serde_json::from_reader(r)?;
        let mut gangway = Gangway::new();
        for name in raw {
            gangway.add(parse_geo_platform(&name, "Gangway list")?);
        }
        Ok(gangway)
    }

    pub fn add(&mut self, platform: PlatformId) {
        self.platforms.insert(platform.as_str().to_string());
    }

    #[inline]
    pub fn allows(&self, platform: &PlatformId) -> bool {
        self.platforms.contains(platform.as_str())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

fn parse_geo_platform(raw: &str, context: &'static str) -> Result<PlatformId, GeoError> {
    PlatformId::parse(raw).map_err(|source| GeoError::UnknownPlatform { context, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
    }

    #[test]
    fn test_distance_directed_then_reverse_then_sentinel() {
        let mut m = DistanceMatrix::new();
        m.insert(&PlatformId::tmib(), &pid("M9"), Nm::new(8.0));
        m.insert(&pid("M9"), &pid("M6"), Nm::new(3.0));

        assert_eq!(m.distance(&PlatformId::tmib(), &pid("M9")).value(), 8.0);
        // Reverse fallback.
        assert_eq!(m.distance(&pid("M9"), &PlatformId::tmib()).value(), 8.0);
        // Missing pair.
        assert_eq!(m.distance(&pid("M6"), &pid("B1")), Nm::SENTINEL);
        // Identity.
        assert_eq!(m.distance(&pid("M6"), &pid("M6")).value(), 0.0);
    }

    #[test]
    fn test_distance_matrix_from_json_normalizes_names() {
        let json = r#"{"M9": {"m6": 3.5, "PCB-01": 2.0}}"#;
        let m = DistanceMatrix::from_reader(json.as_bytes()).unwrap();
        assert_eq!(m.distance(&pid("PCM-09"), &pid("PCM-06")).value(), 3.5);
        assert_eq!(m.distance(&pid("B1"), &pid("M9")).value(), 2.0);
    }

    #[test]
    fn test_distance_matrix_rejects_unknown_platform() {
        let json = r#"{"NORWIND GALE": {"M6": 3.5}}"#;
        assert!(DistanceMatrix::from_reader(json.as_bytes()).is_err());
    }

    #[test]
    fn test_detour() {
        let mut m = DistanceMatrix::new();
        m.insert(&PlatformId::tmib(), &pid("M9"), Nm::new(8.0));
        m.insert(&PlatformId::tmib(), &pid("M5"), Nm::new(7.0));
        m.insert(&pid("M5"), &pid("M9"), Nm::new(2.0));
        let d = m.detour(&PlatformId::tmib(), &pid("M5"), &pid("M9"));
        assert!((d.value() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_table_lookup_order() {
        let json = r#"{"surfer_kn": 16.0, "aqua_kn": 20.0, "overrides": {"surfer_1905": 18.5}}"#;
        let t = SpeedTable::from_reader(json.as_bytes()).unwrap();
        assert_eq!(t.speed_for("SURFER 1905", BoatKind::Surfer).value(), 18.5);
        assert_eq!(t.speed_for("SURFER 1870", BoatKind::Surfer).value(), 16.0);
        assert_eq!(t.speed_for("AQUA HELIX", BoatKind::AquaHelix).value(), 20.0);
    }

    #[test]
    fn test_speed_table_default() {
        let t = SpeedTable::default();
        assert_eq!(
            t.speed_for("ANY", BoatKind::Surfer).value(),
            DEFAULT_SPEED_KN
        );
    }

    #[test]
    fn test_gangway() {
        let g = Gangway::from_reader(r#"["M6", "B1"]"#.as_bytes()).unwrap();
        assert!(g.allows(&pid("PCM-06")));
        assert!(g.allows(&pid("PCB-01")));
        assert!(!g.allows(&pid("PCM-02")));
    }
}
