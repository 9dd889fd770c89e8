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

/// All tuning knobs of the solver in one immutable value, threaded through
/// the pipeline. Weights are nautical-mile equivalents unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// NM-equivalent per priority-weighted arrival minute.
    pub priority_time_weight: f64,
    /// NM-equivalent per pax-arrival minute; pushes big drops early.
    pub pax_arrival_weight: f64,
    /// NM-equivalent per pax-minute spent on board.
    pub comfort_weight: f64,
    /// Penalty per NM of radial retreat toward the leg start.
    pub backtrack_penalty_nm: f64,
    /// Near-hard penalty for sequencing a non-P1 stop while P1 stops remain.
    pub p1_precedence_penalty_nm: f64,
    /// A post-hub P1 stop is promoted pre-hub only below this solo detour.
    pub p1_pre_hub_max_detour_nm: f64,
    /// Penalty for parting a P2/P3 item from a P1 boat it would fit on.
    pub priority_mix_penalty_nm: f64,
    /// Penalty per extra boat exchanging passengers at the hub.
    pub m9_consolidation_penalty_nm: f64,
    pub cluster_switch_penalty_nm: f64,
    pub incompatible_cluster_switch_penalty_nm: f64,
    /// Per NM of inter-cluster jump beyond the free allowance.
    pub cross_cluster_jump_penalty_per_nm: f64,
    pub cross_cluster_jump_free_nm: f64,
    /// Estimated extra legwork per loop visit when ranking split subsets.
    pub loop_visit_estimate_nm: f64,

    /// Exhaustive sequencing cutoff without priorities.
    pub exhaustive_stop_limit: usize,
    /// Exhaustive sequencing cutoff when priorities are present.
    pub exhaustive_priority_stop_limit: usize,
    /// Beyond this many movable stops the split falls back to its greedy
    /// ordering.
    pub split_enumeration_limit: usize,

    /// Approach overhead an Aqua pays at every stop, the hub included.
    pub aqua_approach_minutes: i64,
    /// Handling time per passenger moved at a stop.
    pub minutes_per_pax: i64,
    /// An Aqua direct route below this headcount is not worth the hull.
    pub aqua_direct_min_pax: u32,

    /// Scarcity split fires at or below this many free boats.
    pub scarcity_boat_threshold: usize,
    /// ... on a TMIB-only demand at least this large,
    pub scarcity_split_min_tmib: u32,
    /// ... cleaving off a chunk of this size.
    pub scarcity_split_chunk: u32,

    /// Cap on boats routed to the distant clusters.
    pub max_distant_boats: usize,
    /// Reserve a boat for distant clusters ahead of the optimizer. Off: the
    /// reservation shrinks total capacity more than it saves distance.
    pub enable_distant_cluster_dedication: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            priority_time_weight: 0.05,
            pax_arrival_weight: 0.10,
            comfort_weight: 0.02,
            backtrack_penalty_nm: 10.0,
            p1_precedence_penalty_nm: 250.0,
            p1_pre_hub_max_detour_nm: 1.5,
            priority_mix_penalty_nm: 120.0,
            m9_consolidation_penalty_nm: 5.0,
            cluster_switch_penalty_nm: 8.0,
            incompatible_cluster_switch_penalty_nm: 24.0,
            cross_cluster_jump_penalty_per_nm: 4.0,
            cross_cluster_jump_free_nm: 1.5,
            loop_visit_estimate_nm: 2.0,
            exhaustive_stop_limit: 6,
            exhaustive_priority_stop_limit: 7,
            split_enumeration_limit: 16,
            aqua_approach_minutes: 25,
            minutes_per_pax: 1,
            aqua_direct_min_pax: 10,
            scarcity_boat_threshold: 2,
            scarcity_split_min_tmib: 12,
            scarcity_split_chunk: 4,
            max_distant_boats: 1,
            enable_distant_cluster_dedication: false,
        }
    }
}
