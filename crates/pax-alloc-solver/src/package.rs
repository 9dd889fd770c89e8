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

//! Groups raw demands into the atomic units the optimizer assigns to boats.

use crate::config::Config;
use pax_alloc_model::platform::MANDATORY_PAIRS;
use pax_alloc_model::prelude::{Boat, Cluster, Demand, PlatformId};

/// One or more demands that ride the same boat: a singleton, a fused
/// mandatory pair, or one piece of a scarcity split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandPackage {
    pub demands: Vec<Demand>,
}

impl DemandPackage {
    fn singleton(demand: Demand) -> Self {
        Self {
            demands: vec![demand],
        }
    }

    pub fn total_tmib(&self) -> u32 {
        self.demands.iter().map(|d| d.tmib).sum()
    }

    pub fn total(&self) -> u32 {
        self.demands.iter().map(Demand::total).sum()
    }
}

/// Packages the demand list for assignment.
///
/// Mandatory pairs fuse when both sides have demand and their combined
/// terminal load fits the largest hull; otherwise both fall back to
/// singletons. With a scarce fleet, one large terminal-only demand is cut
/// into a small chunk plus remainder so the bin packing has slack.
pub fn form_packages(demands: &[Demand], boats: &[&Boat], config: &Config) -> Vec<DemandPackage> {
    let max_capacity = boats.iter().map(|b| b.capacity()).max().unwrap_or(0);
    let mut packages = Vec::new();
    let mut used: Vec<&PlatformId> = Vec::new();

    for (a, b) in MANDATORY_PAIRS {
        let d1 = demands.iter().find(|d| d.platform.as_str() == a && d.total() > 0);
        let d2 = demands.iter().find(|d| d.platform.as_str() == b && d.total() > 0);
        if let (Some(d1), Some(d2)) = (d1, d2) {
            if d1.tmib + d2.tmib <= max_capacity {
                packages.push(DemandPackage {
                    demands: vec![d1.clone(), d2.clone()],
                });
                used.push(&d1.platform);
                used.push(&d2.platform);
            }
        }
    }

    let split_platform = scarcity_split_candidate(demands, &used, boats.len(), config);

    for d in demands {
        if d.total() == 0 || used.contains(&&d.platform) {
            continue;
        }
        if Some(&d.platform) == split_platform.as_ref() {
            let chunk = config.scarcity_split_chunk;
            let remainder = d.tmib - chunk;
            if remainder > 0 {
                tracing::debug!(
                    platform = %d.platform,
                    chunk,
                    remainder,
                    "scarcity split of a large terminal demand"
                );
                packages.push(DemandPackage::singleton(Demand::new(
                    d.platform.clone(),
                    chunk,
                    0,
                    d.priority,
                )));
                packages.push(DemandPackage::singleton(Demand::new(
                    d.platform.clone(),
                    remainder,
                    0,
                    d.priority,
                )));
                continue;
            }
        }
        packages.push(DemandPackage::singleton(d.clone()));
    }

    packages
}

/// With two boats or fewer, the largest terminal-only demand from the hub
/// neighborhood is worth splitting to unlock tighter groupings.
fn scarcity_split_candidate(
    demands: &[Demand],
    used: &[&PlatformId],
    n_boats: usize,
    config: &Config,
) -> Option<PlatformId> {
    if n_boats > config.scarcity_boat_threshold {
        return None;
    }
    demands
        .iter()
        .filter(|d| {
            !used.contains(&&d.platform) && d.m9 == 0 && d.tmib >= config.scarcity_split_min_tmib
        })
        .min_by_key(|d| {
            let near_hub = matches!(d.platform.cluster(), Cluster::M2M3 | Cluster::M9Near);
            (if near_hub { 0 } else { 1 }, std::cmp::Reverse(d.tmib))
        })
        .map(|d| d.platform.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pax_alloc_core::prelude::Knots;
    use pax_alloc_model::prelude::Priority;

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
    }

    fn demand(p: &str, tmib: u32, m9: u32) -> Demand {
        Demand::new(pid(p), tmib, m9, Priority::NONE)
    }

    fn surfer(name: &str) -> Boat {
        Boat::new(
            name,
            true,
            NaiveTime::parse_from_str("06:30", "%H:%M").ok(),
            Knots::new(14.0),
            None,
        )
    }

    #[test]
    fn test_mandatory_pair_fuses_when_it_fits() {
        let demands = vec![demand("M2", 5, 0), demand("M3", 4, 1), demand("M6", 2, 0)];
        let boats = [surfer("A"), surfer("B"), surfer("C")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = form_packages(&demands, &refs, &Config::default());
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].demands.len(), 2);
        assert_eq!(packages[0].total_tmib(), 9);
        assert_eq!(packages[1].demands[0].platform, pid("M6"));
    }

    #[test]
    fn test_oversized_pair_falls_back_to_singletons() {
        let demands = vec![demand("M2", 15, 0), demand("M3", 10, 0)];
        let boats = [surfer("A"), surfer("B"), surfer("C")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = form_packages(&demands, &refs, &Config::default());
        assert_eq!(packages.len(), 2);
        assert!(packages.iter().all(|p| p.demands.len() == 1));
    }

    #[test]
    fn test_scarcity_split_fires_with_two_boats() {
        let demands = vec![demand("M2", 20, 0), demand("M6", 8, 0)];
        let boats = [surfer("A"), surfer("B")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = form_packages(&demands, &refs, &Config::default());
        // M2 splits 4 + 16; M6 rides whole.
        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].total_tmib(), 4);
        assert_eq!(packages[1].total_tmib(), 16);
        assert_eq!(packages[0].demands[0].platform, pid("M2"));
        assert_eq!(packages[1].demands[0].platform, pid("M2"));
    }

    #[test]
    fn test_no_scarcity_split_with_three_boats() {
        let demands = vec![demand("M2", 20, 0)];
        let boats = [surfer("A"), surfer("B"), surfer("C")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = form_packages(&demands, &refs, &Config::default());
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].total_tmib(), 20);
    }

    #[test]
    fn test_scarcity_split_prefers_hub_neighborhood() {
        // B1 is bigger, but M2 sits in the preferred clusters.
        let demands = vec![demand("B1", 23, 0), demand("M2", 14, 0)];
        let boats = [surfer("A"), surfer("B")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = form_packages(&demands, &refs, &Config::default());
        let split: Vec<_> = packages
            .iter()
            .filter(|p| p.demands[0].platform == pid("M2"))
            .collect();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].total_tmib() + split[1].total_tmib(), 14);
    }

    #[test]
    fn test_m9_demand_is_never_split() {
        let demands = vec![demand("M2", 20, 1)];
        let boats = [surfer("A"), surfer("B")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = form_packages(&demands, &refs, &Config::default());
        assert_eq!(packages.len(), 1);
    }
}
