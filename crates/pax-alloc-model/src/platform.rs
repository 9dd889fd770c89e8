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

use crate::err::UnknownPlatformError;

/// The onshore terminal. Every route originates here.
pub const TMIB: &str = "TMIB";

/// The hub platform where TMIB-pool and M9-pool passengers are exchanged.
pub const HUB: &str = "PCM-09";

/// Platform pairs that must be served by the same boat whenever both have
/// demand and the combined load fits.
pub const MANDATORY_PAIRS: [(&str, &str); 2] = [("PCM-02", "PCM-03"), ("PCM-06", "PCB-01")];

/// A canonical platform identifier (`PCM-06`, `PCB-01`, …) or the terminal
/// sentinel `TMIB`.
///
/// Construction goes through [`PlatformId::parse`], which also accepts the
/// short spellings used in route strings and demand sheets (`M6`, `B1`,
/// `PGA7`, `PDO1`, `PRB1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId(String);

impl PlatformId {
    pub fn parse(raw: &str) -> Result<Self, UnknownPlatformError> {
        let c = raw.trim().to_uppercase();
        if c == TMIB {
            return Ok(PlatformId(c));
        }
        if let Some(id) = parse_canonical(&c) {
            return Ok(id);
        }
        if let Some(id) = parse_short(&c) {
            return Ok(id);
        }
        Err(UnknownPlatformError::new(raw.trim()))
    }

    #[inline]
    pub fn tmib() -> Self {
        PlatformId(TMIB.to_string())
    }

    #[inline]
    pub fn hub() -> Self {
        PlatformId(HUB.to_string())
    }

    #[inline]
    pub fn is_tmib(&self) -> bool {
        self.0 == TMIB
    }

    #[inline]
    pub fn is_hub(&self) -> bool {
        self.0 == HUB
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The display form used in route strings: `PCM-06` → `M6`,
    /// `PCB-01` → `B1`, `PGA-07` → `PGA7`. `PCM-09` is always `M9`.
    pub fn short_name(&self) -> String {
        if self.0 == TMIB {
            return self.0.clone();
        }
        let Some((prefix, number)) = self.0.split_once('-') else {
            return self.0.clone();
        };
        let n: u32 = number.parse().unwrap_or(0);
        match prefix {
            "PCM" => format!("M{n}"),
            "PCB" => format!("B{n}"),
            "PGA" => format!("PGA{n}"),
            "PDO" => format!("PDO{n}"),
            "PRB" => format!("PRB{n}"),
            _ => self.0.clone(),
        }
    }

    pub fn cluster(&self) -> Cluster {
        match self.0.as_str() {
            "PCM-06" | "PCM-08" => Cluster::M6Area,
            "PCB-01" | "PCB-02" | "PCB-03" | "PCB-04" => Cluster::BCluster,
            "PCM-02" | "PCM-03" => Cluster::M2M3,
            "PCM-04" | "PCM-05" | "PCM-09" | "PCM-10" | "PCM-11" => Cluster::M9Near,
            "PCM-01" | "PCM-07" => Cluster::M1M7,
            "PDO-01" | "PDO-02" | "PDO-03" => Cluster::Pdo,
            "PGA-01" | "PGA-02" | "PGA-03" | "PGA-04" | "PGA-05" | "PGA-07" | "PGA-08" => {
                Cluster::Pga
            }
            "PRB-01" => Cluster::Prb,
            _ => Cluster::Other,
        }
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn parse_canonical(c: &str) -> Option<PlatformId> {
    let (prefix, number) = c.split_once('-')?;
    if !matches!(prefix, "PCM" | "PCB" | "PGA" | "PDO" | "PRB") {
        return None;
    }
    if number.len() != 2 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(PlatformId(c.to_string()))
}

fn parse_short(c: &str) -> Option<PlatformId> {
    let (prefix, digits) = if let Some(rest) = c.strip_prefix("PGA") {
        ("PGA", rest)
    } else if let Some(rest) = c.strip_prefix("PDO") {
        ("PDO", rest)
    } else if let Some(rest) = c.strip_prefix("PRB") {
        ("PRB", rest)
    } else if let Some(rest) = c.strip_prefix('M') {
        ("PCM", rest)
    } else if let Some(rest) = c.strip_prefix('B') {
        ("PCB", rest)
    } else {
        return None;
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u32 = digits.parse().ok()?;
    Some(PlatformId(format!("{prefix}-{n:02}")))
}

/// Geographic cluster of a platform. Routes that hop between incompatible
/// clusters are penalized; distant clusters force the route through the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cluster {
    M6Area,
    BCluster,
    M2M3,
    M9Near,
    M1M7,
    Pdo,
    Pga,
    Prb,
    Other,
}

impl Cluster {
    /// PDO, PGA and PRB sit far outside the hub neighborhood.
    #[inline]
    pub fn is_distant(self) -> bool {
        matches!(self, Cluster::Pdo | Cluster::Pga | Cluster::Prb)
    }

    /// Whether two clusters may share one route leg without the
    /// incompatible-switch penalty. Symmetric; same-cluster pairs are
    /// always compatible.
    pub fn is_compatible_with(self, other: Cluster) -> bool {
        use Cluster::*;
        if self == other {
            return true;
        }
        const COMPATIBLE: [(Cluster, Cluster); 8] = [
            (M6Area, BCluster),
            (M6Area, M1M7),
            (M9Near, M2M3),
            (M2M3, M1M7),
            (M2M3, M6Area),
            (M2M3, BCluster),
            (BCluster, M1M7),
            (Pdo, Pga),
        ];
        COMPATIBLE
            .iter()
            .any(|&(a, b)| (self == a && other == b) || (self == b && other == a))
    }
}
