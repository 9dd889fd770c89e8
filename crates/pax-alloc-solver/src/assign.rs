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

//! Exhaustive package-to-boat assignment.
//!
//! Every mapping of packages onto boats is enumerated as a base-B odometer
//! (iterative, in index order, so ties resolve the same way on every run)
//! and scored lexicographically: unserved hub passengers first, then total
//! distance, then the weighted soft terms. Constraints relax in a fixed
//! cascade when nothing feasible exists, and as a last resort packages may
//! be left ashore to salvage a partial plan.

use crate::config::Config;
use crate::eval::{Evaluation, RouteEvaluator};
use crate::package::DemandPackage;
use pax_alloc_model::prelude::{Boat, Demand, DistanceMatrix, Gangway, Priority, Route};

#[derive(Debug, Clone, Default)]
pub struct AssignmentOutcome {
    pub routes: Vec<Route>,
    pub remaining_m9_tmib: u32,
}

#[derive(Debug, Clone, Copy)]
struct PassRules {
    enforce_all: bool,
    enforce_distant: bool,
    require_zero_m9: bool,
    allow_unserved: bool,
}

struct Candidate {
    routes: Vec<Route>,
    unserved: u32,
    remaining_m9: u32,
    total_dist: f64,
    secondary: f64,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        if self.unserved != other.unserved {
            return self.unserved < other.unserved;
        }
        if self.remaining_m9 != other.remaining_m9 {
            return self.remaining_m9 < other.remaining_m9;
        }
        if self.total_dist != other.total_dist {
            return self.total_dist < other.total_dist;
        }
        self.secondary < other.secondary
    }
}

pub struct AssignmentOptimizer<'a> {
    evaluator: RouteEvaluator<'a>,
    config: &'a Config,
}

impl<'a> AssignmentOptimizer<'a> {
    pub fn new(distances: &'a DistanceMatrix, gangway: &'a Gangway, config: &'a Config) -> Self {
        Self {
            evaluator: RouteEvaluator::new(distances, gangway, config),
            config,
        }
    }

    pub fn optimize(
        &self,
        packages: &[DemandPackage],
        boats: &[&Boat],
        m9_tmib_demand: u32,
        m9_priority: Priority,
        distant_boats_already: usize,
    ) -> AssignmentOutcome {
        if packages.is_empty() || boats.is_empty() {
            return AssignmentOutcome {
                routes: Vec::new(),
                remaining_m9_tmib: m9_tmib_demand,
            };
        }

        tracing::info!(
            packages = packages.len(),
            boats = boats.len(),
            combinations = (boats.len() as u64).pow(packages.len() as u32),
            "assignment enumeration"
        );

        for require_zero_m9 in [true, false] {
            for (enforce_all, enforce_distant) in [(true, true), (false, true), (false, false)] {
                let enforce_all = enforce_all && packages.len() >= boats.len();
                let rules = PassRules {
                    enforce_all,
                    enforce_distant,
                    require_zero_m9,
                    allow_unserved: false,
                };
                if let Some(c) = self.run_pass(
                    packages,
                    boats,
                    m9_tmib_demand,
                    m9_priority,
                    distant_boats_already,
                    rules,
                ) {
                    return AssignmentOutcome {
                        routes: c.routes,
                        remaining_m9_tmib: c.remaining_m9,
                    };
                }
                tracing::warn!(
                    enforce_all,
                    enforce_distant,
                    require_zero_m9,
                    "no feasible assignment; relaxing constraints"
                );
            }
        }

        // Nothing serves every package: leave some ashore, preferring the
        // assignment that strands the fewest passengers.
        let rules = PassRules {
            enforce_all: false,
            enforce_distant: false,
            require_zero_m9: false,
            allow_unserved: true,
        };
        match self.run_pass(
            packages,
            boats,
            m9_tmib_demand,
            m9_priority,
            distant_boats_already,
            rules,
        ) {
            Some(c) => {
                if c.unserved > 0 {
                    tracing::warn!(unserved = c.unserved, "partial assignment only");
                }
                AssignmentOutcome {
                    routes: c.routes,
                    remaining_m9_tmib: c.remaining_m9,
                }
            }
            None => AssignmentOutcome {
                routes: Vec::new(),
                remaining_m9_tmib: m9_tmib_demand,
            },
        }
    }

    fn run_pass(
        &self,
        packages: &[DemandPackage],
        boats: &[&Boat],
        m9_tmib_demand: u32,
        m9_priority: Priority,
        distant_boats_already: usize,
        rules: PassRules,
    ) -> Option<Candidate> {
        let n_pkgs = packages.len();
        let n_boats = boats.len();
        // One extra slot means "left ashore" on the salvage pass.
        let slots = n_boats + rules.allow_unserved as usize;

        let mut best: Option<Candidate> = None;
        let mut assignment = vec![0usize; n_pkgs];

        loop {
            if let Some(candidate) = self.evaluate_assignment(
                packages,
                boats,
                &assignment,
                m9_tmib_demand,
                m9_priority,
                distant_boats_already,
                rules,
            ) {
                let better = match &best {
                    None => true,
                    Some(b) => candidate.beats(b),
                };
                if better {
                    best = Some(candidate);
                }
            }

            // Base-`slots` odometer, last package cycling fastest.
            let mut digit = n_pkgs;
            loop {
                if digit == 0 {
                    return best;
                }
                digit -= 1;
                assignment[digit] += 1;
                if assignment[digit] < slots {
                    break;
                }
                assignment[digit] = 0;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate_assignment(
        &self,
        packages: &[DemandPackage],
        boats: &[&Boat],
        assignment: &[usize],
        m9_tmib_demand: u32,
        m9_priority: Priority,
        distant_boats_already: usize,
        rules: PassRules,
    ) -> Option<Candidate> {
        let n_boats = boats.len();
        let mut bundles: Vec<Vec<&Demand>> = vec![Vec::new(); n_boats];
        let mut unserved = 0u32;
        for (pkg_idx, &slot) in assignment.iter().enumerate() {
            if slot == n_boats {
                unserved += packages[pkg_idx].total();
            } else {
                bundles[slot].extend(packages[pkg_idx].demands.iter());
            }
        }

        if rules.enforce_all && bundles.iter().any(|b| b.is_empty()) {
            return None;
        }

        let mut evaluations: Vec<Option<Evaluation>> = Vec::with_capacity(n_boats);
        let mut remaining_m9 = m9_tmib_demand;
        let mut total_dist = 0.0;
        let mut total_priority = 0.0;
        let mut total_comfort = 0.0;
        let mut total_pax_arrival = 0.0;
        let mut total_cluster = 0.0;

        for (boat_idx, bundle) in bundles.iter().enumerate() {
            if bundle.is_empty() {
                evaluations.push(None);
                continue;
            }
            let demands: Vec<Demand> = bundle.iter().map(|d| (*d).clone()).collect();
            let evaluation = self
                .evaluator
                .evaluate(boats[boat_idx], &demands, remaining_m9, m9_priority)
                .ok()?;
            remaining_m9 -= evaluation.tmib_to_m9;
            total_dist += evaluation.route.distance.value();
            total_priority += evaluation.priority_time;
            total_comfort += evaluation.comfort;
            total_pax_arrival += evaluation.pax_arrival;
            total_cluster += evaluation.cluster_penalty;
            evaluations.push(Some(evaluation));
        }

        if rules.require_zero_m9 && remaining_m9 > 0 {
            return None;
        }

        if rules.enforce_distant {
            let distant_now = evaluations
                .iter()
                .flatten()
                .filter(|e| e.route.touches_distant_cluster())
                .count();
            if distant_boats_already + distant_now > self.config.max_distant_boats {
                return None;
            }
        }

        let hub_routes = evaluations
            .iter()
            .flatten()
            .filter(|e| e.route.m9_pickup > 0 || e.route.tmib_to_m9 > 0)
            .count();
        let consolidation =
            hub_routes.saturating_sub(1) as f64 * self.config.m9_consolidation_penalty_nm;

        let mix_penalty = self.priority_mix_penalty(&bundles, &evaluations);

        let cluster_weight = if n_boats <= 2 { 1.0 } else { 0.0 };
        let secondary = consolidation
            + mix_penalty
            + total_priority * self.config.priority_time_weight
            + total_comfort * self.config.comfort_weight
            + total_pax_arrival * self.config.pax_arrival_weight
            + total_cluster * cluster_weight;

        Some(Candidate {
            routes: evaluations
                .into_iter()
                .flatten()
                .map(|e| e.route)
                .collect(),
            unserved,
            remaining_m9,
            total_dist,
            secondary,
        })
    }

    /// When priority-1 and priority-2/3 demand coexist, spreading a P2/P3
    /// item away from a P1 boat it would fit on wastes an escorted trip.
    fn priority_mix_penalty(
        &self,
        bundles: &[Vec<&Demand>],
        evaluations: &[Option<Evaluation>],
    ) -> f64 {
        let has_p1 = bundles
            .iter()
            .flatten()
            .any(|d| d.priority == Priority::P1);
        let has_p23 = bundles
            .iter()
            .flatten()
            .any(|d| matches!(d.priority.level(), 2 | 3));
        if !has_p1 || !has_p23 {
            return 0.0;
        }

        let p1_boats: Vec<usize> = bundles
            .iter()
            .enumerate()
            .filter(|(_, b)| b.iter().any(|d| d.priority == Priority::P1))
            .map(|(i, _)| i)
            .collect();

        let mut penalty = 0.0;
        for (boat_idx, bundle) in bundles.iter().enumerate() {
            if p1_boats.contains(&boat_idx) {
                continue;
            }
            for d in bundle {
                if !matches!(d.priority.level(), 2 | 3) {
                    continue;
                }
                let fits_with_p1 = p1_boats.iter().any(|&p1_idx| {
                    evaluations[p1_idx]
                        .as_ref()
                        .map(|e| e.route.spare_capacity() >= d.total())
                        .unwrap_or(false)
                });
                if fits_with_p1 {
                    penalty += self.config.priority_mix_penalty_nm;
                }
            }
        }
        penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pax_alloc_core::prelude::{Knots, Nm};
    use pax_alloc_model::prelude::PlatformId;

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
    }

    fn demand(p: &str, tmib: u32, m9: u32, priority: u8) -> Demand {
        Demand::new(pid(p), tmib, m9, Priority::new(priority).unwrap())
    }

    fn package(demands: Vec<Demand>) -> DemandPackage {
        DemandPackage { demands }
    }

    fn boat(name: &str, dep: &str) -> Boat {
        Boat::new(
            name,
            true,
            NaiveTime::parse_from_str(dep, "%H:%M").ok(),
            Knots::new(14.0),
            None,
        )
    }

    fn matrix() -> DistanceMatrix {
        let mut m = DistanceMatrix::new();
        let tmib = PlatformId::tmib();
        let hub = PlatformId::hub();
        m.insert(&tmib, &hub, Nm::new(8.0));
        for (p, d_tmib, d_hub) in [("M5", 5.0, 1.2), ("M4", 5.0, 1.0), ("M2", 8.5, 1.5)] {
            m.insert(&tmib, &pid(p), Nm::new(d_tmib));
            m.insert(&hub, &pid(p), Nm::new(d_hub));
        }
        m.insert(&pid("M4"), &pid("M5"), Nm::new(5.0));
        m.insert(&pid("M2"), &pid("M5"), Nm::new(1.5));
        m.insert(&pid("M2"), &pid("M4"), Nm::new(1.6));
        m
    }

    #[test]
    fn test_single_package_lands_on_first_boat_on_tie() {
        let cfg = Config::default();
        let m = matrix();
        let g = Gangway::new();
        let opt = AssignmentOptimizer::new(&m, &g, &cfg);
        let boats = [boat("SURFER 1905", "06:30"), boat("SURFER 1870", "06:30")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = vec![package(vec![demand("M5", 10, 0, 0)])];
        let outcome = opt.optimize(&packages, &refs, 0, Priority::NONE, 0);
        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.routes[0].boat.name(), "SURFER 1905");
    }

    #[test]
    fn test_hub_demand_spreads_until_served() {
        let cfg = Config::default();
        let m = matrix();
        let g = Gangway::new();
        let opt = AssignmentOptimizer::new(&m, &g, &cfg);
        let boats = [boat("SURFER 1905", "06:30"), boat("SURFER 1870", "07:20")];
        let refs: Vec<&Boat> = boats.iter().collect();
        // Two 20-pax packages leave 4 spare seats each; 5 pending hub
        // passengers force both boats to carry some.
        let packages = vec![
            package(vec![demand("M5", 20, 0, 0)]),
            package(vec![demand("M4", 20, 0, 0)]),
        ];
        let outcome = opt.optimize(&packages, &refs, 5, Priority::NONE, 0);
        assert_eq!(outcome.remaining_m9_tmib, 0);
        let carried: u32 = outcome.routes.iter().map(|r| r.tmib_to_m9).sum();
        assert_eq!(carried, 5);
    }

    #[test]
    fn test_priority_mix_penalty_keeps_p23_with_p1() {
        let cfg = Config::default();
        // Three co-located platforms: every two-boat partition covers the
        // same mileage, so the soft terms decide the grouping.
        let mut m = DistanceMatrix::new();
        let tmib = PlatformId::tmib();
        for p in ["M4", "M5", "M2"] {
            m.insert(&tmib, &pid(p), Nm::new(5.0));
        }
        for (a, b) in [("M4", "M5"), ("M4", "M2"), ("M5", "M2")] {
            m.insert(&pid(a), &pid(b), Nm::new(0.0));
        }
        let g = Gangway::new();
        let opt = AssignmentOptimizer::new(&m, &g, &cfg);
        let boats = [boat("SURFER 1905", "06:30"), boat("SURFER 1870", "06:30")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = vec![
            package(vec![demand("M4", 4, 0, 1)]),
            package(vec![demand("M5", 4, 0, 2)]),
            package(vec![demand("M2", 9, 0, 0)]),
        ];
        let outcome = opt.optimize(&packages, &refs, 0, Priority::NONE, 0);
        assert_eq!(outcome.routes.len(), 2);
        // The P2 drop rides with the P1 drop, not with the filler.
        let p1_route = outcome
            .routes
            .iter()
            .find(|r| r.post_hub.iter().any(|s| s.platform == pid("M4")))
            .unwrap();
        assert!(p1_route.post_hub.iter().any(|s| s.platform == pid("M5")));
    }

    #[test]
    fn test_salvage_pass_leaves_overflow_ashore() {
        let cfg = Config::default();
        let m = matrix();
        let g = Gangway::new();
        let opt = AssignmentOptimizer::new(&m, &g, &cfg);
        let boats = [boat("SURFER 1905", "06:30")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = vec![
            package(vec![demand("M5", 20, 0, 0)]),
            package(vec![demand("M4", 20, 0, 0)]),
        ];
        let outcome = opt.optimize(&packages, &refs, 0, Priority::NONE, 0);
        // Only one package fits; the other stays ashore instead of sinking
        // the whole assignment.
        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.routes[0].total_tmib(), 20);
    }

    #[test]
    fn test_distant_cap_limits_distant_routes() {
        let cfg = Config::default();
        let mut m = matrix();
        let tmib = PlatformId::tmib();
        let hub = PlatformId::hub();
        m.insert(&tmib, &pid("PDO1"), Nm::new(22.0));
        m.insert(&hub, &pid("PDO1"), Nm::new(15.0));
        let g = Gangway::new();
        let opt = AssignmentOptimizer::new(&m, &g, &cfg);
        let boats = [boat("SURFER 1905", "06:30"), boat("SURFER 1870", "07:20")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = vec![package(vec![demand("PDO1", 5, 0, 0)])];
        // A distant boat already sails: the cap of one is used up, and the
        // cascade must relax before this package gets a route.
        let outcome = opt.optimize(&packages, &refs, 0, Priority::NONE, 1);
        assert_eq!(outcome.routes.len(), 1);
        assert!(outcome.routes[0].touches_distant_cluster());
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let cfg = Config::default();
        let m = matrix();
        let g = Gangway::new();
        let opt = AssignmentOptimizer::new(&m, &g, &cfg);
        let boats = [boat("SURFER 1905", "06:30"), boat("SURFER 1870", "07:20")];
        let refs: Vec<&Boat> = boats.iter().collect();
        let packages = vec![
            package(vec![demand("M5", 6, 1, 0)]),
            package(vec![demand("M4", 7, 0, 2)]),
            package(vec![demand("M2", 9, 2, 0)]),
        ];
        let a = opt.optimize(&packages, &refs, 3, Priority::NONE, 0);
        let b = opt.optimize(&packages, &refs, 3, Priority::NONE, 0);
        assert_eq!(a.routes, b.routes);
        assert_eq!(a.remaining_m9_tmib, b.remaining_m9_tmib);
    }
}
