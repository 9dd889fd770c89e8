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

//! The solving pipeline: fixed-route subtraction, Aqua direct routes, the
//! combinatorial assignment, residual fill, final sequencing, emission.
//!
//! Everything here is deterministic: boats and demands are walked in input
//! order, and all selection uses strict improvement, so equal inputs yield
//! byte-identical plans.

use crate::assign::AssignmentOptimizer;
use crate::config::Config;
use crate::eval::{BundleStop, RouteEvaluator};
use crate::package;
use crate::split;
use pax_alloc_model::format;
use pax_alloc_model::prelude::{
    Boat, Cluster, Demand, DistanceMatrix, Gangway, Plan, PlanEntry, PlatformId, PostHubStop,
    Priority, Route, Scenario,
};
use std::collections::BTreeMap;

pub struct Solver<'a> {
    distances: &'a DistanceMatrix,
    gangway: &'a Gangway,
    config: Config,
}

impl<'a> Solver<'a> {
    pub fn new(distances: &'a DistanceMatrix, gangway: &'a Gangway) -> Self {
        Self {
            distances,
            gangway,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn solve(&self, scenario: &Scenario) -> Plan {
        let cfg = &self.config;

        // The hub row of the demand sheet is the TMIB->M9 pool, not a
        // regular destination.
        let mut m9_tmib_demand = 0u32;
        let mut m9_priority = Priority::NONE;
        let mut demands: Vec<Demand> = Vec::new();
        for d in &scenario.demands {
            if d.platform.is_hub() {
                m9_tmib_demand = d.tmib;
                m9_priority = d.priority;
            } else if d.total() > 0 {
                demands.push(d.clone());
            }
        }

        if demands.is_empty() && m9_tmib_demand == 0 {
            tracing::info!("no demand; emitting empty plan");
            return Plan::default();
        }

        let priority_map: BTreeMap<PlatformId, Priority> = demands
            .iter()
            .map(|d| (d.platform.clone(), d.priority))
            .collect();

        let available: Vec<&Boat> = scenario.available_boats().collect();
        tracing::info!(
            boats = available.len(),
            platforms = demands.len(),
            tmib_pax = demands.iter().map(|d| d.tmib).sum::<u32>() + m9_tmib_demand,
            m9_pax = demands.iter().map(|d| d.m9).sum::<u32>(),
            "solving distribution"
        );

        let mut warnings: Vec<String> = Vec::new();
        let mut entries: Vec<PlanEntry> = Vec::new();

        // Fixed routes are emitted verbatim and their implied deliveries
        // leave the demand pool up front.
        let mut free: Vec<&Boat> = Vec::new();
        for &boat in &available {
            let Some(route_str) = boat.fixed_route() else {
                free.push(boat);
                continue;
            };
            let deliveries = format::parse_fixed_route(route_str);
            let implied_load = deliveries.total_tmib().max(deliveries.total_m9());
            if implied_load > boat.capacity() {
                warnings.push(format!(
                    "AVISO: rota fixa {} excede a capacidade ({} pax > {})",
                    boat.name(),
                    implied_load,
                    boat.capacity()
                ));
            }
            for delivery in deliveries.iter() {
                if delivery.platform.is_hub() {
                    m9_tmib_demand = m9_tmib_demand.saturating_sub(delivery.tmib);
                    continue;
                }
                if let Some(d) = demands.iter_mut().find(|d| d.platform == delivery.platform) {
                    d.tmib = d.tmib.saturating_sub(delivery.tmib);
                    d.m9 = d.m9.saturating_sub(delivery.m9);
                }
            }
            tracing::info!(boat = boat.name(), "fixed route subtracted from demand");
            entries.push(PlanEntry::Fixed {
                boat: boat.clone(),
                route: route_str.to_string(),
            });
        }
        demands.retain(|d| d.total() > 0);

        let mut surfers: Vec<&Boat> = free.iter().copied().filter(|b| !b.is_aqua()).collect();
        let mut aquas: Vec<&Boat> = free.iter().copied().filter(|b| b.is_aqua()).collect();
        surfers.sort_by_key(|b| b.departure_minutes());
        aquas.sort_by_key(|b| b.departure_minutes());

        let evaluator = RouteEvaluator::new(self.distances, self.gangway, cfg);
        let mut routes: Vec<Route> = Vec::new();

        // High-capacity hulls pay off on direct gangway runs; their M9-pool
        // share stays behind for the surfers.
        let mut idle_aquas: Vec<&Boat> = Vec::new();
        for aqua in aquas {
            match self.build_aqua_direct(aqua, &demands, &evaluator, &priority_map) {
                Some(route) => {
                    tracing::info!(
                        boat = aqua.name(),
                        pax = route.total_tmib(),
                        "aqua direct route"
                    );
                    consume_route(&mut demands, &route);
                    routes.push(route);
                }
                None => idle_aquas.push(aqua),
            }
        }
        let aquas = idle_aquas;

        if cfg.enable_distant_cluster_dedication {
            self.dedicate_distant_boat(
                &mut surfers,
                &mut demands,
                &mut routes,
                &mut m9_tmib_demand,
                m9_priority,
                &evaluator,
            );
        }

        let distant_already = entries
            .iter()
            .filter(|e| match e {
                PlanEntry::Fixed { route, .. } => {
                    format::parse_fixed_route(route).touches_distant_cluster()
                }
                PlanEntry::Built(_) => false,
            })
            .count()
            + routes.iter().filter(|r| r.touches_distant_cluster()).count();

        // The combinatorial heart: every package-to-boat mapping.
        let mut remaining_boats: Vec<&Boat> = surfers
            .iter()
            .copied()
            .chain(aquas.iter().copied())
            .collect();
        if !demands.is_empty() && !remaining_boats.is_empty() {
            let packages = package::form_packages(&demands, &remaining_boats, cfg);
            let optimizer = AssignmentOptimizer::new(self.distances, self.gangway, cfg);
            let outcome = optimizer.optimize(
                &packages,
                &remaining_boats,
                m9_tmib_demand,
                m9_priority,
                distant_already,
            );
            m9_tmib_demand = outcome.remaining_m9_tmib;
            for route in outcome.routes {
                consume_route(&mut demands, &route);
                remaining_boats.retain(|b| b.name() != route.boat.name());
                routes.push(route);
            }
        }

        // Residual fill: squeeze what is left into spare seats on committed
        // routes, biggest spare first, urgent demand first.
        if !demands.is_empty() && !routes.is_empty() {
            let mut order: Vec<usize> = (0..routes.len()).collect();
            order.sort_by_key(|&i| std::cmp::Reverse(routes[i].spare_capacity()));
            for &ri in &order {
                if demands.is_empty() {
                    break;
                }
                demands.sort_by_key(|d| (d.priority.urgency_rank(), std::cmp::Reverse(d.total())));
                let mut di = 0;
                while di < demands.len() {
                    if routes[ri].spare_capacity() == 0 {
                        break;
                    }
                    if self.try_insert(&mut routes[ri], &demands[di], &priority_map) {
                        tracing::debug!(
                            boat = routes[ri].boat.name(),
                            platform = %demands[di].platform,
                            "residual demand inserted"
                        );
                        demands.remove(di);
                    } else {
                        di += 1;
                    }
                }
            }
        }

        // One last ordering pass so inserted stops sit where they belong.
        for route in &mut routes {
            evaluator.sequence_route(route, &priority_map);
            route.distance = evaluator.route_distance(route);
        }

        entries.extend(routes.into_iter().map(PlanEntry::Built));
        entries.sort_by_key(|e| e.boat().departure_minutes());

        if !demands.is_empty() {
            warnings.push("DEMANDA NAO ATENDIDA:".to_string());
            for d in &demands {
                warnings.push(format!(
                    "  {}: TMIB={}, M9={}",
                    d.platform.short_name(),
                    d.tmib,
                    d.m9
                ));
            }
        }
        if m9_tmib_demand > 0 {
            warnings.push(format!("{m9_tmib_demand} pax TMIB->M9 nao alocados"));
        }

        let mut plan = Plan { entries, warnings };
        if plan.built_routes().next().is_some() {
            let free_distance = plan.total_free_distance();
            plan.warnings.push(format!(
                "Distancia total (rotas livres): {:.1} NM",
                free_distance.value()
            ));
        }
        plan
    }

    /// A terminal-only milk run over gangway platforms, largest drops first.
    /// Committed only when it actually beats swinging past the hub.
    fn build_aqua_direct(
        &self,
        boat: &Boat,
        demands: &[Demand],
        evaluator: &RouteEvaluator<'_>,
        priority_map: &BTreeMap<PlatformId, Priority>,
    ) -> Option<Route> {
        let mut gangway_tmib: Vec<&Demand> = demands
            .iter()
            .filter(|d| self.gangway.allows(&d.platform) && d.tmib > 0)
            .collect();
        if gangway_tmib.is_empty() {
            return None;
        }
        gangway_tmib.sort_by_key(|d| std::cmp::Reverse(d.tmib));

        let capacity = boat.capacity();
        let mut stops: Vec<PostHubStop> = Vec::new();
        let mut total = 0u32;
        for d in gangway_tmib {
            if total + d.tmib <= capacity {
                stops.push(PostHubStop {
                    platform: d.platform.clone(),
                    tmib_drop: d.tmib,
                    m9_drop: 0,
                });
                total += d.tmib;
            }
        }
        if stops.is_empty() || total < self.config.aqua_direct_min_pax {
            return None;
        }

        let mut route = Route::direct(boat.clone(), stops);
        evaluator.sequence_route(&mut route, priority_map);
        route.distance = evaluator.route_distance(&route);

        // Same stop order via the hub, for comparison.
        let hub = PlatformId::hub();
        let mut via_hub = self.distances.distance(&PlatformId::tmib(), &hub);
        let mut pos = hub;
        for stop in &route.post_hub {
            via_hub += self.distances.distance(&pos, &stop.platform);
            pos = stop.platform.clone();
        }
        (route.distance < via_hub).then_some(route)
    }

    /// Reserves the first surfer that can carry the whole distant-cluster
    /// load. Costs a hull, which is why it defaults to off.
    fn dedicate_distant_boat(
        &self,
        surfers: &mut Vec<&Boat>,
        demands: &mut Vec<Demand>,
        routes: &mut Vec<Route>,
        m9_tmib_demand: &mut u32,
        m9_priority: Priority,
        evaluator: &RouteEvaluator<'_>,
    ) {
        let distant: Vec<Demand> = demands
            .iter()
            .filter(|d| d.platform.cluster().is_distant())
            .cloned()
            .collect();
        if distant.is_empty() {
            return;
        }
        let chosen = surfers.iter().enumerate().find_map(|(i, boat)| {
            evaluator
                .evaluate(boat, &distant, *m9_tmib_demand, m9_priority)
                .ok()
                .map(|evaluation| (i, evaluation))
        });
        let Some((i, evaluation)) = chosen else {
            tracing::warn!("no surfer can carry the distant-cluster demand");
            return;
        };
        tracing::info!(
            boat = evaluation.route.boat.name(),
            "dedicated distant-cluster route"
        );
        *m9_tmib_demand -= evaluation.tmib_to_m9;
        consume_route(demands, &evaluation.route);
        routes.push(evaluation.route);
        surfers.remove(i);
    }

    /// Tries to graft one leftover demand onto a committed route: gangway
    /// and cluster checks first, then a fresh pre/post-hub split. The stop
    /// order is repaired by the final sequencing pass.
    fn try_insert(
        &self,
        route: &mut Route,
        demand: &Demand,
        priority_map: &BTreeMap<PlatformId, Priority>,
    ) -> bool {
        let cfg = &self.config;
        if route.boat.is_aqua() && !self.gangway.allows(&demand.platform) {
            return false;
        }

        let route_clusters: Vec<Cluster> =
            route.post_hub.iter().map(|s| s.platform.cluster()).collect();
        let d_cluster = demand.platform.cluster();
        let compatible = route_clusters.is_empty()
            || route_clusters.contains(&d_cluster)
            || route_clusters
                .iter()
                .any(|c| c.is_compatible_with(d_cluster));
        if !compatible {
            return false;
        }

        // Rebuild the whole stop set with the newcomer folded in.
        let mut bundle: Vec<BundleStop> = Vec::new();
        let mut push = |bundle: &mut Vec<BundleStop>, platform: &PlatformId, tmib: u32, m9: u32| {
            if let Some(s) = bundle.iter_mut().find(|s| &s.platform == platform) {
                s.tmib += tmib;
                s.m9 += m9;
            } else {
                bundle.push(BundleStop {
                    platform: platform.clone(),
                    tmib,
                    m9,
                    priority: priority_map
                        .get(platform)
                        .copied()
                        .unwrap_or(Priority::NONE),
                });
            }
        };
        for s in &route.pre_hub {
            push(&mut bundle, &s.platform, s.tmib_drop, 0);
        }
        for s in &route.post_hub {
            push(&mut bundle, &s.platform, s.tmib_drop, s.m9_drop);
        }
        push(&mut bundle, &demand.platform, demand.tmib, demand.m9);

        let total_tmib: u32 = bundle.iter().map(|s| s.tmib).sum();
        let total_m9: u32 = bundle.iter().map(|s| s.m9).sum();
        let capacity = route.boat.capacity();
        if total_tmib + route.tmib_to_m9 > capacity {
            return false;
        }

        let uses_hub = total_m9 > 0
            || route.tmib_to_m9 > 0
            || bundle.iter().any(|s| s.platform.cluster().is_distant());
        if uses_hub {
            let Some((pre, post)) =
                split::split_stops(&bundle, total_m9, capacity, self.distances, cfg)
            else {
                return false;
            };
            route.pre_hub = pre;
            route.post_hub = post;
        } else {
            route.pre_hub.clear();
            route.post_hub = bundle
                .iter()
                .map(|s| PostHubStop {
                    platform: s.platform.clone(),
                    tmib_drop: s.tmib,
                    m9_drop: s.m9,
                })
                .collect();
        }
        route.uses_hub = uses_hub;
        route.m9_pickup = total_m9;
        debug_assert!(route.max_load() <= capacity);
        true
    }
}

/// Subtracts a route's drops from the open demand pool.
fn consume_route(demands: &mut Vec<Demand>, route: &Route) {
    for stop in route.stops() {
        if let Some(d) = demands.iter_mut().find(|d| d.platform == *stop.platform()) {
            d.tmib = d.tmib.saturating_sub(stop.tmib_drop());
            d.m9 = d.m9.saturating_sub(stop.m9_drop());
        }
    }
    demands.retain(|d| d.total() > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pax_alloc_core::prelude::{Knots, Nm};
    use pax_alloc_model::plan::write_report;
    use pax_alloc_model::validation::validate_plan;

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
    }

    fn boat(name: &str, dep: &str) -> Boat {
        Boat::new(
            name,
            true,
            chrono::NaiveTime::parse_from_str(dep, "%H:%M").ok(),
            Knots::new(14.0),
            None,
        )
    }

    fn fixed_boat(name: &str, dep: &str, route: &str) -> Boat {
        Boat::new(
            name,
            true,
            chrono::NaiveTime::parse_from_str(dep, "%H:%M").ok(),
            Knots::new(14.0),
            Some(route.to_string()),
        )
    }

    fn demand(p: &str, tmib: u32, m9: u32, priority: u8) -> Demand {
        Demand::new(pid(p), tmib, m9, Priority::new(priority).unwrap())
    }

    /// Field geometry on a plane: the basin strung out east of the terminal,
    /// distances Euclidean and complete.
    fn geo() -> DistanceMatrix {
        let coords: &[(&str, f64, f64)] = &[
            ("TMIB", 0.0, 0.0),
            ("M9", 8.0, 0.0),
            ("M5", 7.5, 0.8),
            ("M4", 8.5, 0.9),
            ("M10", 8.2, -0.5),
            ("M2", 9.2, 0.6),
            ("M3", 9.5, 1.2),
            ("M1", 10.5, -1.0),
            ("M7", 11.0, -1.2),
            ("M6", 11.5, 1.5),
            ("M8", 11.8, 1.6),
            ("B1", 12.5, 1.8),
            ("B2", 12.9, 2.0),
            ("B3", 13.2, 2.2),
            ("B4", 13.4, 2.4),
            ("PDO1", 20.0, 6.0),
            ("PDO2", 20.5, 6.3),
            ("PGA3", 21.5, 7.0),
        ];
        let mut m = DistanceMatrix::new();
        for (i, (a, xa, ya)) in coords.iter().enumerate() {
            for (b, xb, yb) in coords.iter().skip(i + 1) {
                let d = ((xb - xa).powi(2) + (yb - ya).powi(2)).sqrt();
                m.insert(&pid(a), &pid(b), Nm::new(d));
            }
        }
        m
    }

    fn gangway() -> Gangway {
        let mut g = Gangway::new();
        for p in ["M6", "M8", "B1", "B2", "B3", "B4"] {
            g.add(pid(p));
        }
        g
    }

    fn scenario(boats: Vec<Boat>, demands: Vec<Demand>) -> Scenario {
        Scenario {
            crew_change: false,
            m9_crew_headcount: 0,
            boats,
            demands,
        }
    }

    fn report(plan: &Plan) -> String {
        let mut out = Vec::new();
        write_report(plan, false, 0, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_zero_demand_yields_empty_plan() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(vec![boat("SURFER 1905", "06:30")], vec![]);
        let plan = solver.solve(&s);
        assert!(plan.is_empty());
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_single_boat_single_destination_goes_direct() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![boat("SURFER 1905", "06:30")],
            vec![demand("M5", 6, 0, 0)],
        );
        let plan = solver.solve(&s);
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].route_string(), "TMIB +6/M5 -6");
        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");
    }

    fn snapshot_scenario(priorities: bool) -> Scenario {
        let p = |on: bool| if on { 1 } else { 0 };
        scenario(
            vec![
                boat("SURFER 1905", "06:30"),
                boat("SURFER 1870", "07:20"),
                boat("SURFER 1930", "07:30"),
            ],
            vec![
                demand("M6", 2, 0, 0),
                demand("M5", 3, 0, 0),
                demand("PDO1", 13, 2, p(priorities)),
                demand("M3", 10, 1, 0),
                demand("M7", 9, 0, p(priorities)),
                demand("M4", 5, 4, 0),
                demand("M2", 15, 0, 0),
                demand("B1", 3, 0, 0),
                demand("B4", 4, 1, 0),
                demand("M9", 6, 0, 0),
            ],
        )
    }

    #[test]
    fn test_snapshot_case_serves_everything() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = snapshot_scenario(false);
        let plan = solver.solve(&s);

        assert_eq!(plan.entries.len(), 3);
        // All demand out the door: the only warning left is the total.
        assert!(
            plan.warnings.iter().all(|w| w.starts_with("Distancia")),
            "{:?}",
            plan.warnings
        );
        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");

        // 70 TMIB-pool plus 8 M9-pool passengers moved.
        let (tmib, m9) = plan.served_totals();
        assert_eq!(tmib, 70);
        assert_eq!(m9, 8);

        // Entries ascend by departure.
        let mins: Vec<u32> = plan
            .entries
            .iter()
            .map(|e| e.boat().departure_minutes())
            .collect();
        assert!(mins.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_priority_stops_lead_their_segments() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = snapshot_scenario(true);
        let plan = solver.solve(&s);

        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");

        let p1: Vec<PlatformId> = vec![pid("PDO1"), pid("M7")];
        for route in plan.built_routes() {
            // Within each leg no P1 stop may trail a non-P1 stop.
            let post: Vec<bool> = route
                .post_hub
                .iter()
                .map(|s| p1.contains(&s.platform))
                .collect();
            let first_normal = post.iter().position(|is_p1| !is_p1);
            if let Some(cut) = first_normal {
                assert!(
                    post[cut..].iter().all(|is_p1| !is_p1),
                    "P1 stop sequenced after a normal stop: {post:?}"
                );
            }
        }
    }

    #[test]
    fn test_scarcity_split_separates_large_demand() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        // 48 pax on two 24-seat hulls only works if M2 splits 4 + 11 across
        // the boats.
        let s = scenario(
            vec![boat("SURFER 1905", "06:30"), boat("SURFER 1870", "07:20")],
            vec![
                demand("M2", 15, 0, 0),
                demand("M6", 20, 0, 0),
                demand("B2", 13, 0, 0),
            ],
        );
        let plan = solver.solve(&s);
        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");
        assert!(
            plan.warnings.iter().all(|w| w.starts_with("Distancia")),
            "{:?}",
            plan.warnings
        );

        let m2_drops: Vec<u32> = plan
            .built_routes()
            .flat_map(|r| r.post_hub.iter())
            .filter(|s| s.platform == pid("M2"))
            .map(|s| s.tmib_drop)
            .collect();
        assert_eq!(m2_drops.len(), 2);
        assert!(m2_drops.contains(&4));
        assert!(m2_drops.contains(&11));
    }

    #[test]
    fn test_fixed_route_is_verbatim_and_subtracted() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![
                fixed_boat("SURFER 1905", "06:30", "TMIB +2/M6 -2"),
                boat("SURFER 1870", "07:20"),
            ],
            vec![demand("M6", 2, 0, 0), demand("M5", 3, 0, 0)],
        );
        let plan = solver.solve(&s);
        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.entries[0].route_string(), "TMIB +2/M6 -2");
        // The free boat only carries what the fixed route left behind.
        let built: Vec<&Route> = plan.built_routes().collect();
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].total_tmib(), 3);
        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_overloaded_fixed_route_warns() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![fixed_boat("SURFER 1905", "06:30", "TMIB +30/M6 -30")],
            vec![demand("M6", 30, 0, 0)],
        );
        let plan = solver.solve(&s);
        assert_eq!(plan.entries.len(), 1);
        assert!(plan
            .warnings
            .iter()
            .any(|w| w.contains("excede a capacidade")));
    }

    #[test]
    fn test_aqua_direct_route_bypasses_hub() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![boat("AQUA HELIX", "06:00")],
            vec![demand("M6", 12, 0, 0), demand("B1", 8, 0, 0)],
        );
        let plan = solver.solve(&s);
        assert_eq!(plan.entries.len(), 1);
        let route = plan.built_routes().next().unwrap();
        assert!(!route.uses_hub);
        assert_eq!(route.total_tmib(), 20);
        assert!(!plan.entries[0].route_string().contains("M9"));
        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_aqua_without_gangway_demand_stays_idle() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![boat("AQUA HELIX", "06:00")],
            vec![demand("M2", 5, 0, 0)],
        );
        let plan = solver.solve(&s);
        assert!(plan.is_empty());
        assert!(plan
            .warnings
            .iter()
            .any(|w| w.contains("DEMANDA NAO ATENDIDA")));
        assert!(plan.warnings.iter().any(|w| w.contains("M2")));
    }

    #[test]
    fn test_fleet_overflow_leaves_warning() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![boat("SURFER 1905", "06:30")],
            vec![demand("M2", 20, 0, 0), demand("M5", 20, 0, 0)],
        );
        let plan = solver.solve(&s);
        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");
        // One boatload sails, the rest is reported.
        assert_eq!(plan.entries.len(), 1);
        assert!(plan
            .warnings
            .iter()
            .any(|w| w.contains("DEMANDA NAO ATENDIDA")));
    }

    #[test]
    fn test_mandatory_pair_rides_together() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![boat("SURFER 1905", "06:30"), boat("SURFER 1870", "07:20")],
            vec![
                demand("M2", 5, 0, 0),
                demand("M3", 4, 0, 0),
                demand("M6", 6, 0, 0),
            ],
        );
        let plan = solver.solve(&s);
        let carrier: Vec<&Route> = plan
            .built_routes()
            .filter(|r| {
                r.post_hub.iter().any(|s| s.platform == pid("M2"))
                    || r.post_hub.iter().any(|s| s.platform == pid("M3"))
            })
            .collect();
        assert_eq!(carrier.len(), 1);
        assert!(carrier[0].post_hub.iter().any(|s| s.platform == pid("M2")));
        assert!(carrier[0].post_hub.iter().any(|s| s.platform == pid("M3")));
    }

    #[test]
    fn test_missing_distance_edge_is_avoided() {
        // Hand-built distant geography with the PGA3-PDO2 edge absent.
        let mut m = DistanceMatrix::new();
        let tmib = PlatformId::tmib();
        let hub = PlatformId::hub();
        m.insert(&tmib, &hub, Nm::new(8.0));
        for (p, d_tmib, d_hub) in [("PDO1", 22.0, 15.0), ("PDO2", 22.6, 15.6), ("PGA3", 24.0, 17.0)]
        {
            m.insert(&tmib, &pid(p), Nm::new(d_tmib));
            m.insert(&hub, &pid(p), Nm::new(d_hub));
        }
        m.insert(&pid("PDO1"), &pid("PDO2"), Nm::new(0.7));
        m.insert(&pid("PDO1"), &pid("PGA3"), Nm::new(1.9));
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = scenario(
            vec![boat("SURFER 1905", "06:30")],
            vec![
                demand("PDO1", 3, 0, 0),
                demand("PDO2", 3, 0, 0),
                demand("PGA3", 3, 0, 0),
            ],
        );
        let plan = solver.solve(&s);
        let route = plan.built_routes().next().unwrap();
        // The sequencer routes around the missing edge via PDO1.
        assert!(route.distance.value() < 100.0);
        let order: Vec<String> = route
            .post_hub
            .iter()
            .map(|s| s.platform.short_name())
            .collect();
        let pga = order.iter().position(|p| p == "PGA3").unwrap();
        let pdo2 = order.iter().position(|p| p == "PDO2").unwrap();
        assert_ne!(pga.abs_diff(pdo2), 1, "order {order:?} crosses the gap");
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        let s = snapshot_scenario(true);
        let first = report(&solver.solve(&s));
        let second = report(&solver.solve(&s));
        assert_eq!(first, second);
    }

    #[test]
    fn test_loop_visit_when_hub_pickup_is_tight() {
        let m = geo();
        let g = gangway();
        let solver = Solver::new(&m, &g);
        // 22 board at the terminal and 5 more at the hub: M3's terminal
        // drop has to happen before M9, its hub drop after.
        let s = scenario(
            vec![boat("SURFER 1905", "06:30")],
            vec![demand("M3", 20, 3, 0), demand("M4", 2, 2, 0)],
        );
        let plan = solver.solve(&s);
        let route = plan.built_routes().next().unwrap();
        assert!(route.uses_hub);
        assert!(route.pre_hub.iter().any(|s| s.platform == pid("M3")));
        assert!(route
            .post_hub
            .iter()
            .any(|s| s.platform == pid("M3") && s.m9_drop == 3 && s.tmib_drop == 0));
        assert!(route.max_load() <= 24);
        let violations = validate_plan(&s.demands, &g, &plan);
        assert!(violations.is_empty(), "{violations:?}");
    }
}
