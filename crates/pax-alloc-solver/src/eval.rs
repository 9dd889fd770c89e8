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

//! Builds and prices the route of one boat for one bundle of demands.
//!
//! The evaluator either returns a capacity-clean [`Route`] with its soft
//! penalty terms, or a [`Reject`] the assignment optimizer treats as an
//! infeasible candidate. Rejection is a value, not an error: candidate
//! bundles fail routinely while enumerating assignments.

use crate::config::Config;
use crate::sequence::{SeqStop, Sequencer};
use crate::split;
use pax_alloc_core::prelude::{travel_time_minutes, Nm};
use pax_alloc_model::prelude::{
    Boat, Demand, DistanceMatrix, Gangway, PlatformId, PostHubStop, PreHubStop, Priority, Route,
};
use std::collections::BTreeMap;

/// One platform's share of a bundle after duplicate merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleStop {
    pub platform: PlatformId,
    pub tmib: u32,
    pub m9: u32,
    pub priority: Priority,
}

/// Why a bundle cannot ride this boat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reject {
    EmptyBundle,
    GangwayRestricted { platform: PlatformId },
    CapacityExceeded { load: u32, capacity: u32 },
    SplitInfeasible,
}

impl std::fmt::Display for Reject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reject::EmptyBundle => write!(f, "empty bundle"),
            Reject::GangwayRestricted { platform } => {
                write!(f, "no gangway at {platform}")
            }
            Reject::CapacityExceeded { load, capacity } => {
                write!(f, "boarding {load} pax exceeds capacity {capacity}")
            }
            Reject::SplitInfeasible => {
                write!(f, "no pre/post-hub split keeps the load within capacity")
            }
        }
    }
}

/// A priced route: the route itself plus the soft terms the assignment
/// optimizer aggregates.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub route: Route,
    /// Terminal-to-hub passengers this route absorbed from the pending pool.
    pub tmib_to_m9: u32,
    pub priority_time: f64,
    pub comfort: f64,
    pub pax_arrival: f64,
    pub cluster_penalty: f64,
}

pub struct RouteEvaluator<'a> {
    distances: &'a DistanceMatrix,
    gangway: &'a Gangway,
    config: &'a Config,
}

impl<'a> RouteEvaluator<'a> {
    pub fn new(distances: &'a DistanceMatrix, gangway: &'a Gangway, config: &'a Config) -> Self {
        Self {
            distances,
            gangway,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn evaluate(
        &self,
        boat: &Boat,
        demands: &[Demand],
        m9_tmib_avail: u32,
        m9_priority: Priority,
    ) -> Result<Evaluation, Reject> {
        if demands.is_empty() {
            return Err(Reject::EmptyBundle);
        }

        let bundle = merge_bundle(demands);

        if boat.is_aqua() {
            for stop in &bundle {
                if !self.gangway.allows(&stop.platform) {
                    return Err(Reject::GangwayRestricted {
                        platform: stop.platform.clone(),
                    });
                }
            }
        }

        let capacity = boat.capacity();
        let total_tmib: u32 = bundle.iter().map(|s| s.tmib).sum();
        let total_m9: u32 = bundle.iter().map(|s| s.m9).sum();

        // Fill spare terminal boarding with pending TMIB->M9 passengers;
        // they leave the boat at the hub and never load the second leg.
        let space = capacity.saturating_sub(total_tmib);
        let tmib_to_m9 = if space > 0 { m9_tmib_avail.min(space) } else { 0 };

        let serves_distant = bundle.iter().any(|s| s.platform.cluster().is_distant());
        let uses_hub = total_m9 > 0 || tmib_to_m9 > 0 || serves_distant;

        let pre_load = total_tmib + tmib_to_m9;
        if pre_load > capacity {
            return Err(Reject::CapacityExceeded {
                load: pre_load,
                capacity,
            });
        }

        let priority_map: BTreeMap<PlatformId, Priority> = bundle
            .iter()
            .map(|s| (s.platform.clone(), s.priority))
            .collect();

        let (mut pre_hub, mut post_hub) = if uses_hub {
            split::split_stops(&bundle, total_m9, capacity, self.distances, self.config)
                .ok_or(Reject::SplitInfeasible)?
        } else {
            (
                Vec::new(),
                bundle
                    .iter()
                    .map(|s| PostHubStop {
                        platform: s.platform.clone(),
                        tmib_drop: s.tmib,
                        m9_drop: s.m9,
                    })
                    .collect(),
            )
        };

        if uses_hub {
            self.promote_priority_one(&mut pre_hub, &mut post_hub, &priority_map);
        }

        let mut route = Route {
            boat: boat.clone(),
            pre_hub,
            uses_hub,
            post_hub,
            tmib_to_m9,
            m9_pickup: total_m9,
            distance: Nm::new(0.0),
        };
        self.sequence_route(&mut route, &priority_map);
        route.distance = self.route_distance(&route);

        let (priority_time, comfort, pax_arrival) =
            self.walk_penalties(&route, &priority_map, m9_priority);
        let cluster_penalty = self.cluster_penalty(&route);

        Ok(Evaluation {
            route,
            tmib_to_m9,
            priority_time,
            comfort,
            pax_arrival,
            cluster_penalty,
        })
    }

    /// A post-hub terminal-only stop with priority 1 moves ahead of the hub
    /// when its solo detour off the TMIB-M9 track is small.
    fn promote_priority_one(
        &self,
        pre_hub: &mut Vec<PreHubStop>,
        post_hub: &mut Vec<PostHubStop>,
        priority_map: &BTreeMap<PlatformId, Priority>,
    ) {
        let tmib = PlatformId::tmib();
        let hub = PlatformId::hub();
        let mut kept = Vec::with_capacity(post_hub.len());
        for stop in post_hub.drain(..) {
            let is_p1 = priority_map.get(&stop.platform) == Some(&Priority::P1);
            if stop.tmib_drop > 0 && stop.m9_drop == 0 && is_p1 {
                let detour = self.distances.detour(&tmib, &stop.platform, &hub);
                if detour.value() <= self.config.p1_pre_hub_max_detour_nm {
                    pre_hub.push(PreHubStop {
                        platform: stop.platform,
                        tmib_drop: stop.tmib_drop,
                    });
                    continue;
                }
            }
            kept.push(stop);
        }
        *post_hub = kept;
    }

    /// Orders both legs: pre-hub from the terminal, post-hub from the hub
    /// (or from the terminal on hub-less routes).
    pub fn sequence_route(&self, route: &mut Route, priority_map: &BTreeMap<PlatformId, Priority>) {
        let sequencer = Sequencer::new(self.distances, self.config);
        let speed = route.boat.speed();
        let is_aqua = route.boat.is_aqua();
        let priority_of = |p: &PlatformId| priority_map.get(p).copied().unwrap_or(Priority::NONE);

        if route.uses_hub && route.pre_hub.len() > 1 {
            let seq_stops: Vec<SeqStop> = route
                .pre_hub
                .iter()
                .map(|s| SeqStop {
                    platform: s.platform.clone(),
                    pax: s.tmib_drop,
                    priority: priority_of(&s.platform),
                })
                .collect();
            let order = sequencer.sequence(&PlatformId::tmib(), &seq_stops, speed, is_aqua);
            route.pre_hub = order.iter().map(|&i| route.pre_hub[i].clone()).collect();
        }

        if route.post_hub.len() > 1 {
            let start = if route.uses_hub {
                PlatformId::hub()
            } else {
                PlatformId::tmib()
            };
            let seq_stops: Vec<SeqStop> = route
                .post_hub
                .iter()
                .map(|s| SeqStop {
                    platform: s.platform.clone(),
                    pax: s.pax(),
                    priority: priority_of(&s.platform),
                })
                .collect();
            let order = sequencer.sequence(&start, &seq_stops, speed, is_aqua);
            route.post_hub = order.iter().map(|&i| route.post_hub[i].clone()).collect();
        }
    }

    pub fn route_distance(&self, route: &Route) -> Nm {
        let mut total = Nm::new(0.0);
        let mut pos = PlatformId::tmib();
        if route.uses_hub {
            for stop in &route.pre_hub {
                total += self.distances.distance(&pos, &stop.platform);
                pos = stop.platform.clone();
            }
            let hub = PlatformId::hub();
            total += self.distances.distance(&pos, &hub);
            pos = hub;
        }
        for stop in &route.post_hub {
            total += self.distances.distance(&pos, &stop.platform);
            pos = stop.platform.clone();
        }
        total
    }

    /// One pass over the route yielding the three arrival-time penalties.
    /// Minutes are absolute (offset by the boat's departure). Non-hub stops
    /// count their arrival before passenger handling; the hub counts after
    /// its exchange completes.
    fn walk_penalties(
        &self,
        route: &Route,
        priority_map: &BTreeMap<PlatformId, Priority>,
        m9_priority: Priority,
    ) -> (f64, f64, f64) {
        let cfg = self.config;
        let speed = route.boat.speed();
        let aqua_overhead = if route.boat.is_aqua() {
            cfg.aqua_approach_minutes
        } else {
            0
        };
        let hub = PlatformId::hub();

        let mut t = route.boat.departure_minutes() as i64;
        let mut pos = PlatformId::tmib();
        let mut onboard = route.total_tmib() as i64;
        let mut comfort = 0.0;
        let mut pax_arrival = 0.0;
        let mut min_arrival: BTreeMap<PlatformId, i64> = BTreeMap::new();

        let mut record = |map: &mut BTreeMap<PlatformId, i64>, p: &PlatformId, at: i64| {
            map.entry(p.clone())
                .and_modify(|m| *m = (*m).min(at))
                .or_insert(at);
        };

        if route.uses_hub {
            for stop in &route.pre_hub {
                let dist = self.distances.distance(&pos, &stop.platform);
                let segment = travel_time_minutes(dist, speed) + aqua_overhead;
                comfort += (onboard * segment) as f64;
                t += segment;
                record(&mut min_arrival, &stop.platform, t);
                pax_arrival += (t * stop.tmib_drop as i64) as f64;
                let ops = stop.tmib_drop as i64 * cfg.minutes_per_pax;
                comfort += (onboard * ops) as f64;
                t += ops;
                onboard -= stop.tmib_drop as i64;
                pos = stop.platform.clone();
            }

            let dist = self.distances.distance(&pos, &hub);
            let segment = travel_time_minutes(dist, speed) + aqua_overhead;
            comfort += (onboard * segment) as f64;
            t += segment;
            let ops = (route.tmib_to_m9 + route.m9_pickup) as i64 * cfg.minutes_per_pax;
            comfort += (onboard * ops) as f64;
            t += ops;
            record(&mut min_arrival, &hub, t);
            onboard = onboard - route.tmib_to_m9 as i64 + route.m9_pickup as i64;
            pos = hub.clone();
        }

        for stop in &route.post_hub {
            let dist = self.distances.distance(&pos, &stop.platform);
            let segment = travel_time_minutes(dist, speed) + aqua_overhead;
            comfort += (onboard * segment) as f64;
            t += segment;
            record(&mut min_arrival, &stop.platform, t);
            pax_arrival += (t * stop.pax() as i64) as f64;
            let ops = stop.pax() as i64 * cfg.minutes_per_pax;
            comfort += (onboard * ops) as f64;
            t += ops;
            onboard -= stop.pax() as i64;
            pos = stop.platform.clone();
        }

        let mut priority_time = 0.0;
        for (platform, arrival) in &min_arrival {
            let weight = if platform == &hub {
                // The hub only matters when the route actually delivers
                // terminal passengers there.
                if route.tmib_to_m9 > 0 {
                    m9_priority.weight()
                } else {
                    0
                }
            } else {
                priority_map
                    .get(platform)
                    .copied()
                    .unwrap_or(Priority::NONE)
                    .weight()
            };
            if weight > 0 {
                priority_time += (*arrival * weight as i64) as f64;
            }
        }

        (priority_time, comfort, pax_arrival)
    }

    /// Penalizes legs that wander between clusters: a flat charge per
    /// switch (heavier when incompatible) plus a per-NM charge on the jump
    /// beyond the free allowance.
    pub fn cluster_penalty(&self, route: &Route) -> f64 {
        self.segment_cluster_penalty(route.pre_hub.iter().map(|s| &s.platform))
            + self.segment_cluster_penalty(route.post_hub.iter().map(|s| &s.platform))
    }

    fn segment_cluster_penalty<'p, I>(&self, platforms: I) -> f64
    where
        I: Iterator<Item = &'p PlatformId>,
    {
        let cfg = self.config;
        let mut penalty = 0.0;
        let mut prev: Option<&PlatformId> = None;
        for platform in platforms {
            if let Some(prev_platform) = prev {
                let prev_cluster = prev_platform.cluster();
                let cluster = platform.cluster();
                if cluster != prev_cluster {
                    penalty += if prev_cluster.is_compatible_with(cluster) {
                        cfg.cluster_switch_penalty_nm
                    } else {
                        cfg.incompatible_cluster_switch_penalty_nm
                    };
                    let jump = self.distances.distance(prev_platform, platform).value();
                    let excess = (jump - cfg.cross_cluster_jump_free_nm).max(0.0);
                    penalty += excess * cfg.cross_cluster_jump_penalty_per_nm;
                }
            }
            prev = Some(platform);
        }
        penalty
    }
}

/// Folds duplicate platforms of a bundle into one stop each, keeping first
/// appearance order. Split pieces of one platform land on the same boat as a
/// single consolidated stop.
pub fn merge_bundle(demands: &[Demand]) -> Vec<BundleStop> {
    let mut merged: Vec<BundleStop> = Vec::with_capacity(demands.len());
    for d in demands {
        if let Some(existing) = merged.iter_mut().find(|s| s.platform == d.platform) {
            existing.tmib += d.tmib;
            existing.m9 += d.m9;
            existing.priority = existing.priority.merged_with(d.priority);
        } else {
            merged.push(BundleStop {
                platform: d.platform.clone(),
                tmib: d.tmib,
                m9: d.m9,
                priority: d.priority,
            });
        }
    }
    merged
}
