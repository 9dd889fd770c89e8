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

//! Stop ordering within one route leg.
//!
//! Without priorities the leg is a plain shortest-path chain: exhaustive for
//! small sets, nearest-neighbor beyond the cutoff. With priorities the order
//! is scored on distance plus arrival-time terms, and a near-hard penalty
//! keeps priority-1 stops in front.

use crate::config::Config;
use pax_alloc_core::prelude::{travel_time_minutes, Knots, Nm};
use pax_alloc_model::prelude::{DistanceMatrix, PlatformId, Priority};
use smallvec::SmallVec;

/// A leg stop as the sequencer sees it: where, how many leave the boat, and
/// how urgent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqStop {
    pub platform: PlatformId,
    pub pax: u32,
    pub priority: Priority,
}

pub struct Sequencer<'a> {
    distances: &'a DistanceMatrix,
    config: &'a Config,
}

impl<'a> Sequencer<'a> {
    pub fn new(distances: &'a DistanceMatrix, config: &'a Config) -> Self {
        Self { distances, config }
    }

    /// Returns the visiting order as indices into `stops`. Ties always keep
    /// the earliest candidate, so the result is stable across runs.
    pub fn sequence(
        &self,
        start: &PlatformId,
        stops: &[SeqStop],
        speed: Knots,
        is_aqua: bool,
    ) -> Vec<usize> {
        let n = stops.len();
        if n <= 1 {
            return (0..n).collect();
        }

        let has_priority = stops.iter().any(|s| s.priority.is_set());
        if !has_priority {
            if n <= self.config.exhaustive_stop_limit {
                return self.best_permutation(stops, |order| {
                    self.chain_distance(start, stops, order)
                });
            }
            return self.nearest_neighbor(start, stops);
        }

        if n <= self.config.exhaustive_priority_stop_limit {
            return self.best_permutation(stops, |order| {
                self.score_order(start, stops, order, speed, is_aqua)
            });
        }
        self.greedy_lookahead(start, stops, speed, is_aqua)
    }

    fn best_permutation<F>(&self, stops: &[SeqStop], score: F) -> Vec<usize>
    where
        F: Fn(&[usize]) -> f64,
    {
        let mut perm: Vec<usize> = (0..stops.len()).collect();
        let mut best = perm.clone();
        let mut best_score = score(&perm);
        while next_permutation(&mut perm) {
            let s = score(&perm);
            if s < best_score {
                best_score = s;
                best = perm.clone();
            }
        }
        best
    }

    fn nearest_neighbor(&self, start: &PlatformId, stops: &[SeqStop]) -> Vec<usize> {
        let mut remaining: Vec<usize> = (0..stops.len()).collect();
        let mut order = Vec::with_capacity(stops.len());
        let mut current = start.clone();
        while !remaining.is_empty() {
            let mut best_pos = 0;
            let mut best_dist = Nm::SENTINEL + Nm::SENTINEL;
            for (pos, &idx) in remaining.iter().enumerate() {
                let d = self.distances.distance(&current, &stops[idx].platform);
                if d < best_dist {
                    best_dist = d;
                    best_pos = pos;
                }
            }
            let idx = remaining.remove(best_pos);
            current = stops[idx].platform.clone();
            order.push(idx);
        }
        order
    }

    fn greedy_lookahead(
        &self,
        start: &PlatformId,
        stops: &[SeqStop],
        speed: Knots,
        is_aqua: bool,
    ) -> Vec<usize> {
        let mut order: SmallVec<[usize; 8]> = SmallVec::new();
        let mut remaining: Vec<usize> = (0..stops.len()).collect();
        while !remaining.is_empty() {
            let mut best_pos = 0;
            let mut best_score = f64::INFINITY;
            for (pos, &idx) in remaining.iter().enumerate() {
                order.push(idx);
                let s = self.score_order(start, stops, &order, speed, is_aqua);
                order.pop();
                if s < best_score {
                    best_score = s;
                    best_pos = pos;
                }
            }
            order.push(remaining.remove(best_pos));
        }
        order.into_vec()
    }

    fn chain_distance(&self, start: &PlatformId, stops: &[SeqStop], order: &[usize]) -> f64 {
        let mut total = 0.0;
        let mut current = start;
        for &idx in order {
            total += self
                .distances
                .distance(current, &stops[idx].platform)
                .value();
            current = &stops[idx].platform;
        }
        total
    }

    /// The priority-aware sequence score. Minutes are relative to the leg
    /// start; the boat's departure offset cancels out between orders.
    fn score_order(
        &self,
        start: &PlatformId,
        stops: &[SeqStop],
        order: &[usize],
        speed: Knots,
        is_aqua: bool,
    ) -> f64 {
        let cfg = self.config;
        let mut current = start;
        let mut dist_total = 0.0;
        let mut time = 0i64;
        let mut priority_score = 0.0;
        let mut pax_score = 0.0;
        let mut comfort = 0.0;
        let mut backtrack = 0.0;
        let mut p1_penalty = 0.0;
        let mut onboard: i64 = order.iter().map(|&i| stops[i].pax as i64).sum();
        let mut remaining_p1 = order
            .iter()
            .filter(|&&i| stops[i].priority == Priority::P1)
            .count();
        let mut prev_radial: Option<f64> = None;

        for &idx in order {
            let stop = &stops[idx];
            if stop.priority != Priority::P1 && remaining_p1 > 0 {
                p1_penalty += cfg.p1_precedence_penalty_nm;
            }
            if stop.priority == Priority::P1 {
                remaining_p1 -= 1;
            }

            let dist = self.distances.distance(current, &stop.platform);
            dist_total += dist.value();

            let mut segment = travel_time_minutes(dist, speed);
            if is_aqua {
                segment += cfg.aqua_approach_minutes;
            }
            comfort += (onboard * segment) as f64;
            time += segment;

            pax_score += (time * stop.pax as i64) as f64;
            priority_score += (time * stop.priority.weight() as i64) as f64;

            let ops = stop.pax as i64 * cfg.minutes_per_pax;
            comfort += (onboard * ops) as f64;
            time += ops;
            onboard -= stop.pax as i64;
            current = &stop.platform;

            let radial = self.distances.distance(start, &stop.platform).value();
            if let Some(prev) = prev_radial {
                if radial < prev {
                    backtrack += prev - radial;
                }
            }
            prev_radial = Some(radial);
        }

        dist_total
            + priority_score * cfg.priority_time_weight
            + pax_score * cfg.pax_arrival_weight
            + comfort * cfg.comfort_weight
            + backtrack * cfg.backtrack_penalty_nm
            + p1_penalty
    }
}

/// Advances `perm` to its lexicographic successor; false once exhausted.
fn next_permutation(perm: &mut [usize]) -> bool {
    if perm.len() < 2 {
        return false;
    }
    let mut i = perm.len() - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = perm.len() - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
    }

    fn stop(p: &str, pax: u32, priority: u8) -> SeqStop {
        SeqStop {
            platform: pid(p),
            pax,
            priority: Priority::new(priority).unwrap(),
        }
    }

    /// Platforms strung out on a line away from TMIB.
    fn line_matrix(platforms: &[(&str, f64)]) -> DistanceMatrix {
        let mut m = DistanceMatrix::new();
        let tmib = PlatformId::tmib();
        for (i, (a, xa)) in platforms.iter().enumerate() {
            m.insert(&tmib, &pid(a), Nm::new(*xa));
            for (b, xb) in platforms.iter().skip(i + 1) {
                m.insert(&pid(a), &pid(b), Nm::new((xb - xa).abs()));
            }
        }
        m
    }

    #[test]
    fn test_next_permutation_is_lexicographic() {
        let mut p = vec![0, 1, 2];
        let mut seen = vec![p.clone()];
        while next_permutation(&mut p) {
            seen.push(p.clone());
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[1], vec![0, 2, 1]);
        assert_eq!(seen[5], vec![2, 1, 0]);
    }

    #[test]
    fn test_plain_sequencing_minimizes_distance() {
        let m = line_matrix(&[("M5", 2.0), ("M4", 5.0), ("M2", 9.0)]);
        let cfg = Config::default();
        let seq = Sequencer::new(&m, &cfg);
        let stops = vec![stop("M2", 3, 0), stop("M5", 3, 0), stop("M4", 3, 0)];
        let order = seq.sequence(&PlatformId::tmib(), &stops, Knots::new(14.0), false);
        // Out-and-back along the line: nearest first.
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_large_plain_set_uses_nearest_neighbor() {
        let m = line_matrix(&[
            ("M1", 7.0),
            ("M2", 6.0),
            ("M3", 5.0),
            ("M4", 4.0),
            ("M5", 3.0),
            ("M6", 2.0),
            ("M7", 1.0),
        ]);
        let cfg = Config::default();
        let seq = Sequencer::new(&m, &cfg);
        let stops: Vec<SeqStop> = ["M1", "M2", "M3", "M4", "M5", "M6", "M7"]
            .iter()
            .map(|p| stop(p, 1, 0))
            .collect();
        let order = seq.sequence(&PlatformId::tmib(), &stops, Knots::new(14.0), false);
        // Seven stops exceed the exhaustive cutoff; NN walks inward-out.
        assert_eq!(order, vec![6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_priority_one_goes_first_despite_distance() {
        let m = line_matrix(&[("M5", 1.0), ("M4", 2.0), ("M6", 8.0)]);
        let cfg = Config::default();
        let seq = Sequencer::new(&m, &cfg);
        // The far stop carries priority 1; the precedence penalty dominates
        // the extra mileage.
        let stops = vec![stop("M5", 2, 0), stop("M4", 2, 0), stop("M6", 2, 1)];
        let order = seq.sequence(&PlatformId::tmib(), &stops, Knots::new(14.0), false);
        assert_eq!(order[0], 2);
    }

    #[test]
    fn test_score_penalizes_backtracking() {
        let mut m = DistanceMatrix::new();
        let tmib = PlatformId::tmib();
        m.insert(&tmib, &pid("M4"), Nm::new(5.0));
        m.insert(&tmib, &pid("M5"), Nm::new(5.0));
        m.insert(&tmib, &pid("M6"), Nm::new(1.0));
        m.insert(&pid("M4"), &pid("M5"), Nm::new(1.0));
        m.insert(&pid("M5"), &pid("M6"), Nm::new(4.5));
        m.insert(&pid("M4"), &pid("M6"), Nm::new(4.5));
        let cfg = Config::default();
        let seq = Sequencer::new(&m, &cfg);
        let stops = vec![stop("M4", 1, 3), stop("M5", 1, 3), stop("M6", 1, 3)];
        // Far-far-near retreats radially at the end; near-far-far stays
        // outward bound and wins.
        let retreat = seq.score_order(&tmib, &stops, &[0, 1, 2], Knots::new(14.0), false);
        let outward = seq.score_order(&tmib, &stops, &[2, 0, 1], Knots::new(14.0), false);
        assert!(outward < retreat);
    }

    #[test]
    fn test_aqua_overhead_raises_arrival_scores() {
        let m = line_matrix(&[("M5", 2.0), ("M4", 4.0)]);
        let cfg = Config::default();
        let seq = Sequencer::new(&m, &cfg);
        let stops = vec![stop("M5", 3, 2), stop("M4", 3, 2)];
        let surfer = seq.score_order(&PlatformId::tmib(), &stops, &[0, 1], Knots::new(14.0), false);
        let aqua = seq.score_order(&PlatformId::tmib(), &stops, &[0, 1], Knots::new(14.0), true);
        assert!(aqua > surfer);
    }

    #[test]
    fn test_sequence_is_deterministic() {
        let m = line_matrix(&[("M5", 2.0), ("M4", 5.0), ("M2", 9.0), ("M3", 9.0)]);
        let cfg = Config::default();
        let seq = Sequencer::new(&m, &cfg);
        let stops = vec![
            stop("M2", 3, 2),
            stop("M5", 3, 0),
            stop("M4", 3, 1),
            stop("M3", 3, 0),
        ];
        let a = seq.sequence(&PlatformId::tmib(), &stops, Knots::new(14.0), false);
        let b = seq.sequence(&PlatformId::tmib(), &stops, Knots::new(14.0), false);
        assert_eq!(a, b);
    }
}
