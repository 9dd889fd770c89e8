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

//! Decides which terminal drops happen before the hub.
//!
//! The boat boards every terminal passenger at once, but the hub adds the
//! M9 pickup on top of whatever is still on board. When both legs cannot fit
//! the hull, terminal drops are moved ahead of the hub. A stop that also has
//! an M9-pool drop splits into a loop visit: terminal portion before the
//! hub, M9 portion after.

use crate::config::Config;
use crate::eval::BundleStop;
use pax_alloc_model::prelude::{DistanceMatrix, PlatformId, PostHubStop, PreHubStop};
use smallvec::SmallVec;

/// Splits a merged bundle into pre- and post-hub stop lists such that
/// `max(pre_load, post_load) <= capacity`. Returns `None` when no selection
/// of terminal drops can relieve the second leg enough.
pub fn split_stops(
    stops: &[BundleStop],
    m9_pickup: u32,
    capacity: u32,
    distances: &DistanceMatrix,
    config: &Config,
) -> Option<(Vec<PreHubStop>, Vec<PostHubStop>)> {
    let total_tmib: u32 = stops.iter().map(|s| s.tmib).sum();
    let needed = (total_tmib + m9_pickup).saturating_sub(capacity);
    if needed == 0 {
        return Some((Vec::new(), all_post(stops)));
    }

    let candidates: SmallVec<[usize; 8]> = stops
        .iter()
        .enumerate()
        .filter(|(_, s)| s.tmib > 0)
        .map(|(i, _)| i)
        .collect();
    let movable: u32 = candidates.iter().map(|&i| stops[i].tmib).sum();
    if movable < needed {
        return None;
    }

    if candidates.len() > config.split_enumeration_limit {
        return Some(greedy_split(stops, &candidates, needed, distances));
    }

    // Every subset of movable stops, ranked by (estimated legwork, loop
    // visits, surplus moved, pre-hub stop count). Masks ascend, so ties keep
    // the earliest subset.
    let mut best: Option<(f64, usize, u32, usize, u64)> = None;
    for mask in 1u64..(1 << candidates.len()) {
        let moved: u32 = candidates
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, &i)| stops[i].tmib)
            .sum();
        if moved < needed {
            continue;
        }

        let selected: SmallVec<[usize; 8]> = candidates
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, &i)| i)
            .collect();
        let loop_visits = selected.iter().filter(|&&i| stops[i].m9 > 0).count();
        let pre_count = selected.len();

        let pre_platforms: SmallVec<[&PlatformId; 8]> =
            selected.iter().map(|&i| &stops[i].platform).collect();
        let post_platforms: SmallVec<[&PlatformId; 8]> = stops
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                if selected.contains(i) {
                    s.m9 > 0
                } else {
                    s.tmib > 0 || s.m9 > 0
                }
            })
            .map(|(_, s)| &s.platform)
            .collect();

        let estimate = chain_estimate(distances, &PlatformId::tmib(), &pre_platforms)
            + chain_estimate(distances, &PlatformId::hub(), &post_platforms)
            + loop_visits as f64 * config.loop_visit_estimate_nm;

        let key = (estimate, loop_visits, moved - needed, pre_count, mask);
        let better = match &best {
            None => true,
            Some(b) => {
                (key.0, key.1, key.2, key.3) < (b.0, b.1, b.2, b.3)
            }
        };
        if better {
            best = Some(key);
        }
    }

    let (_, _, _, _, mask) = best?;
    let selected: SmallVec<[usize; 8]> = candidates
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, &i)| i)
        .collect();
    Some(materialize(stops, &selected))
}

/// Fallback beyond the enumeration limit: move the cheapest detours first,
/// whole stops ahead of loop splits, bigger drops breaking ties.
fn greedy_split(
    stops: &[BundleStop],
    candidates: &[usize],
    needed: u32,
    distances: &DistanceMatrix,
) -> (Vec<PreHubStop>, Vec<PostHubStop>) {
    let tmib = PlatformId::tmib();
    let hub = PlatformId::hub();
    let mut ordered: Vec<usize> = candidates.to_vec();
    ordered.sort_by(|&a, &b| {
        let ka = (stops[a].m9 > 0) as u8;
        let kb = (stops[b].m9 > 0) as u8;
        ka.cmp(&kb)
            .then_with(|| {
                let da = distances.detour(&tmib, &stops[a].platform, &hub).value();
                let db = distances.detour(&tmib, &stops[b].platform, &hub).value();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| stops[b].tmib.cmp(&stops[a].tmib))
    });

    let mut moved = 0;
    let mut selected: SmallVec<[usize; 8]> = SmallVec::new();
    for &i in &ordered {
        if moved >= needed {
            break;
        }
        selected.push(i);
        moved += stops[i].tmib;
    }
    selected.sort_unstable();
    materialize(stops, &selected)
}

fn materialize(stops: &[BundleStop], selected: &[usize]) -> (Vec<PreHubStop>, Vec<PostHubStop>) {
    let mut pre = Vec::with_capacity(selected.len());
    let mut post = Vec::new();
    for (i, stop) in stops.iter().enumerate() {
        if selected.contains(&i) {
            pre.push(PreHubStop {
                platform: stop.platform.clone(),
                tmib_drop: stop.tmib,
            });
            if stop.m9 > 0 {
                post.push(PostHubStop {
                    platform: stop.platform.clone(),
                    tmib_drop: 0,
                    m9_drop: stop.m9,
                });
            }
        } else if stop.tmib > 0 || stop.m9 > 0 {
            post.push(PostHubStop {
                platform: stop.platform.clone(),
                tmib_drop: stop.tmib,
                m9_drop: stop.m9,
            });
        }
    }
    (pre, post)
}

fn all_post(stops: &[BundleStop]) -> Vec<PostHubStop> {
    stops
        .iter()
        .filter(|s| s.tmib > 0 || s.m9 > 0)
        .map(|s| PostHubStop {
            platform: s.platform.clone(),
            tmib_drop: s.tmib,
            m9_drop: s.m9,
        })
        .collect()
}

/// Nearest-neighbor chain length from `start` through all `platforms`; a
/// cheap stand-in for the sequencer while ranking subsets.
fn chain_estimate(distances: &DistanceMatrix, start: &PlatformId, platforms: &[&PlatformId]) -> f64 {
    let mut remaining: SmallVec<[&PlatformId; 8]> = platforms.into();
    let mut current = start.clone();
    let mut total = 0.0;
    while !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best = f64::INFINITY;
        for (pos, p) in remaining.iter().enumerate() {
            let d = distances.distance(&current, p).value();
            if d < best {
                best = d;
                best_pos = pos;
            }
        }
        total += best;
        current = remaining.remove(best_pos).clone();
    }
    total
}
