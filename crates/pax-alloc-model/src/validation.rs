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

//! Post-solve plan checks. A correct solver never trips these; they guard
//! regressions and hand-edited fixed routes.

use crate::demand::Demand;
use crate::format;
use crate::geo::Gangway;
use crate::plan::{Plan, PlanEntry};
use crate::platform::PlatformId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    TmibOverDelivered {
        platform: PlatformId,
        delivered: u32,
        demanded: u32,
    },
    M9OverDelivered {
        platform: PlatformId,
        delivered: u32,
        demanded: u32,
    },
    CapacityExceeded {
        boat: String,
        load: u32,
        capacity: u32,
    },
    HubPickupShort {
        boat: String,
        pickup: u32,
        drops: u32,
    },
    HubSkipped {
        boat: String,
    },
    GangwayViolated {
        boat: String,
        platform: PlatformId,
    },
    UnsortedDepartures {
        position: usize,
    },
}

impl std::fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanViolation::TmibOverDelivered {
                platform,
                delivered,
                demanded,
            } => write!(
                f,
                "{platform}: {delivered} TMIB pax delivered but only {demanded} demanded"
            ),
            PlanViolation::M9OverDelivered {
                platform,
                delivered,
                demanded,
            } => write!(
                f,
                "{platform}: {delivered} M9 pax delivered but only {demanded} demanded"
            ),
            PlanViolation::CapacityExceeded {
                boat,
                load,
                capacity,
            } => write!(f, "{boat}: load {load} exceeds capacity {capacity}"),
            PlanViolation::HubPickupShort { boat, pickup, drops } => write!(
                f,
                "{boat}: picks up {pickup} at M9 but drops {drops} from the M9 pool"
            ),
            PlanViolation::HubSkipped { boat } => {
                write!(f, "{boat}: exchanges passengers at M9 without a hub stop")
            }
            PlanViolation::GangwayViolated { boat, platform } => {
                write!(f, "{boat}: Aqua calls at {platform} without a gangway")
            }
            PlanViolation::UnsortedDepartures { position } => {
                write!(f, "plan entry {position} departs before its predecessor")
            }
        }
    }
}

impl std::error::Error for PlanViolation {}

/// Checks a plan against the demand it was built from. Returns every
/// violation found; an empty vector means the plan is sound.
pub fn validate_plan(demands: &[Demand], gangway: &Gangway, plan: &Plan) -> Vec<PlanViolation> {
    let mut violations = Vec::new();

    // Delivered totals per platform, fixed entries included.
    let mut delivered: BTreeMap<PlatformId, (u32, u32)> = BTreeMap::new();
    for entry in &plan.entries {
        match entry {
            PlanEntry::Built(route) => {
                for stop in route.stops() {
                    let slot = delivered.entry(stop.platform().clone()).or_default();
                    slot.0 += stop.tmib_drop();
                    slot.1 += stop.m9_drop();
                }
                if route.tmib_to_m9 > 0 {
                    delivered.entry(PlatformId::hub()).or_default().0 += route.tmib_to_m9;
                }
            }
            PlanEntry::Fixed { route, .. } => {
                for d in format::parse_fixed_route(route).iter() {
                    let slot = delivered.entry(d.platform.clone()).or_default();
                    slot.0 += d.tmib;
                    slot.1 += d.m9;
                }
            }
        }
    }

    for (platform, (tmib, m9)) in &delivered {
        let demand = demands.iter().find(|d| &d.platform == platform);
        let (demand_tmib, demand_m9) = demand.map(|d| (d.tmib, d.m9)).unwrap_or((0, 0));
        if *tmib > demand_tmib {
            violations.push(PlanViolation::TmibOverDelivered {
                platform: platform.clone(),
                delivered: *tmib,
                demanded: demand_tmib,
            });
        }
        if *m9 > demand_m9 {
            violations.push(PlanViolation::M9OverDelivered {
                platform: platform.clone(),
                delivered: *m9,
                demanded: demand_m9,
            });
        }
    }

    for route in plan.built_routes() {
        let boat = route.boat.name().to_string();
        if route.max_load() > route.boat.capacity() {
            violations.push(PlanViolation::CapacityExceeded {
                boat: boat.clone(),
                load: route.max_load(),
                capacity: route.boat.capacity(),
            });
        }
        let drops = route.total_m9_drops();
        if route.uses_hub {
            if route.m9_pickup < drops {
                violations.push(PlanViolation::HubPickupShort {
                    boat: boat.clone(),
                    pickup: route.m9_pickup,
                    drops,
                });
            }
        } else if drops > 0 || route.m9_pickup > 0 || route.tmib_to_m9 > 0 {
            violations.push(PlanViolation::HubSkipped { boat: boat.clone() });
        }
        if route.boat.is_aqua() {
            for stop in route.stops() {
                if !gangway.allows(stop.platform()) {
                    violations.push(PlanViolation::GangwayViolated {
                        boat: boat.clone(),
                        platform: stop.platform().clone(),
                    });
                }
            }
        }
    }

    for (i, pair) in plan.entries.windows(2).enumerate() {
        if pair[0].boat().departure_minutes() > pair[1].boat().departure_minutes() {
            violations.push(PlanViolation::UnsortedDepartures { position: i + 1 });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boat::Boat;
    use crate::demand::Priority;
    use crate::route::{PostHubStop, Route};
    use chrono::NaiveTime;
    use pax_alloc_core::prelude::{Knots, Nm};

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
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

    fn demand(p: &str, tmib: u32, m9: u32) -> Demand {
        Demand::new(pid(p), tmib, m9, Priority::NONE)
    }

    #[test]
    fn test_clean_plan_has_no_violations() {
        let plan = Plan {
            entries: vec![PlanEntry::Built(Route::direct(
                boat("SURFER 1905", "06:30"),
                vec![PostHubStop {
                    platform: pid("M6"),
                    tmib_drop: 4,
                    m9_drop: 0,
                }],
            ))],
            warnings: Vec::new(),
        };
        let demands = vec![demand("M6", 4, 0)];
        assert!(validate_plan(&demands, &Gangway::new(), &plan).is_empty());
    }

    #[test]
    fn test_over_delivery_detected() {
        let plan = Plan {
            entries: vec![PlanEntry::Fixed {
                boat: boat("SURFER 1870", "07:20"),
                route: "TMIB +9/M6 -9".to_string(),
            }],
            warnings: Vec::new(),
        };
        let demands = vec![demand("M6", 4, 0)];
        let violations = validate_plan(&demands, &Gangway::new(), &plan);
        assert!(matches!(
            violations[0],
            PlanViolation::TmibOverDelivered { delivered: 9, demanded: 4, .. }
        ));
    }

    #[test]
    fn test_capacity_and_hub_checks() {
        let mut route = Route::direct(
            boat("SURFER 1905", "06:30"),
            vec![PostHubStop {
                platform: pid("M4"),
                tmib_drop: 30,
                m9_drop: 2,
            }],
        );
        route.distance = Nm::new(5.0);
        let plan = Plan {
            entries: vec![PlanEntry::Built(route)],
            warnings: Vec::new(),
        };
        let demands = vec![demand("M4", 30, 2)];
        let violations = validate_plan(&demands, &Gangway::new(), &plan);
        assert!(violations
            .iter()
            .any(|v| matches!(v, PlanViolation::CapacityExceeded { load: 30, capacity: 24, .. })));
        // M9-pool drop without a hub stop.
        assert!(violations
            .iter()
            .any(|v| matches!(v, PlanViolation::HubSkipped { .. })));
    }

    #[test]
    fn test_aqua_gangway_check() {
        let plan = Plan {
            entries: vec![PlanEntry::Built(Route::direct(
                boat("AQUA HELIX", "06:00"),
                vec![PostHubStop {
                    platform: pid("M2"),
                    tmib_drop: 12,
                    m9_drop: 0,
                }],
            ))],
            warnings: Vec::new(),
        };
        let demands = vec![demand("M2", 12, 0)];
        let mut gangway = Gangway::new();
        gangway.add(pid("M6"));
        let violations = validate_plan(&demands, &gangway, &plan);
        assert!(matches!(
            violations[0],
            PlanViolation::GangwayViolated { .. }
        ));
    }

    #[test]
    fn test_departure_order_check() {
        let plan = Plan {
            entries: vec![
                PlanEntry::Fixed {
                    boat: boat("B", "08:00"),
                    route: "TMIB".to_string(),
                },
                PlanEntry::Fixed {
                    boat: boat("A", "06:00"),
                    route: "TMIB".to_string(),
                },
            ],
            warnings: Vec::new(),
        };
        let violations = validate_plan(&[], &Gangway::new(), &plan);
        assert!(matches!(
            violations[0],
            PlanViolation::UnsortedDepartures { position: 1 }
        ));
    }
}
