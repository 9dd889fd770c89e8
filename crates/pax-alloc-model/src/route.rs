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

use crate::boat::Boat;
use crate::platform::PlatformId;
use pax_alloc_core::prelude::Nm;

/// A call made before the hub. Only terminal-pool passengers can leave the
/// boat here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreHubStop {
    pub platform: PlatformId,
    pub tmib_drop: u32,
}

/// A call made after the hub (or anywhere on a hub-less route).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostHubStop {
    pub platform: PlatformId,
    pub tmib_drop: u32,
    pub m9_drop: u32,
}

impl PostHubStop {
    #[inline]
    pub fn pax(&self) -> u32 {
        self.tmib_drop + self.m9_drop
    }
}

/// Either side of the hub, for callers that walk a whole route uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stop {
    PreHub(PreHubStop),
    PostHub(PostHubStop),
}

impl Stop {
    #[inline]
    pub fn platform(&self) -> &PlatformId {
        match self {
            Stop::PreHub(s) => &s.platform,
            Stop::PostHub(s) => &s.platform,
        }
    }

    #[inline]
    pub fn tmib_drop(&self) -> u32 {
        match self {
            Stop::PreHub(s) => s.tmib_drop,
            Stop::PostHub(s) => s.tmib_drop,
        }
    }

    #[inline]
    pub fn m9_drop(&self) -> u32 {
        match self {
            Stop::PreHub(_) => 0,
            Stop::PostHub(s) => s.m9_drop,
        }
    }
}

/// One boat's day: terminal boarding, optional pre-hub calls, the hub
/// exchange, post-hub calls.
///
/// A platform may appear once pre-hub and once post-hub (a loop visit when
/// the capacity split forces its terminal passengers off early); no other
/// duplication is allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub boat: Boat,
    pub pre_hub: Vec<PreHubStop>,
    pub uses_hub: bool,
    pub post_hub: Vec<PostHubStop>,
    /// Terminal-pool passengers disembarked at the hub itself.
    pub tmib_to_m9: u32,
    /// Hub-pool passengers boarded at the hub.
    pub m9_pickup: u32,
    pub distance: Nm,
}

impl Route {
    pub fn direct(boat: Boat, post_hub: Vec<PostHubStop>) -> Self {
        Self {
            boat,
            pre_hub: Vec::new(),
            uses_hub: false,
            post_hub,
            tmib_to_m9: 0,
            m9_pickup: 0,
            distance: Nm::new(0.0),
        }
    }

    /// Terminal-pool passengers boarded at TMIB.
    pub fn total_tmib(&self) -> u32 {
        self.tmib_to_m9
            + self.pre_hub.iter().map(|s| s.tmib_drop).sum::<u32>()
            + self.post_hub.iter().map(|s| s.tmib_drop).sum::<u32>()
    }

    /// Hub-pool passengers dropped after the hub.
    pub fn total_m9_drops(&self) -> u32 {
        self.post_hub.iter().map(|s| s.m9_drop).sum()
    }

    #[inline]
    pub fn pre_load(&self) -> u32 {
        self.total_tmib()
    }

    pub fn post_load(&self) -> u32 {
        let dropped_before_hub =
            self.tmib_to_m9 + self.pre_hub.iter().map(|s| s.tmib_drop).sum::<u32>();
        self.total_tmib() - dropped_before_hub + self.m9_pickup
    }

    /// The binding occupancy: both legs must fit the hull.
    pub fn max_load(&self) -> u32 {
        if self.uses_hub {
            self.pre_load().max(self.post_load())
        } else {
            self.total_tmib()
        }
    }

    pub fn spare_capacity(&self) -> u32 {
        self.boat.capacity().saturating_sub(self.max_load())
    }

    pub fn stops(&self) -> impl Iterator<Item = Stop> + '_ {
        self.pre_hub
            .iter()
            .cloned()
            .map(Stop::PreHub)
            .chain(self.post_hub.iter().cloned().map(Stop::PostHub))
    }

    pub fn touches_distant_cluster(&self) -> bool {
        self.stops().any(|s| s.platform().cluster().is_distant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pax_alloc_core::prelude::Knots;

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
    }

    fn surfer() -> Boat {
        Boat::new(
            "SURFER 1905",
            true,
            NaiveTime::parse_from_str("06:30", "%H:%M").ok(),
            Knots::new(14.0),
            None,
        )
    }

    fn hub_route() -> Route {
        Route {
            boat: surfer(),
            pre_hub: vec![PreHubStop {
                platform: pid("M5"),
                tmib_drop: 6,
            }],
            uses_hub: true,
            post_hub: vec![
                PostHubStop {
                    platform: pid("M4"),
                    tmib_drop: 10,
                    m9_drop: 2,
                },
                PostHubStop {
                    platform: pid("M5"),
                    tmib_drop: 0,
                    m9_drop: 1,
                },
            ],
            tmib_to_m9: 3,
            m9_pickup: 3,
            distance: Nm::new(0.0),
        }
    }

    #[test]
    fn test_load_profile() {
        let r = hub_route();
        // Boarded at the terminal: 3 (to the hub) + 6 (pre) + 10 (post).
        assert_eq!(r.total_tmib(), 19);
        assert_eq!(r.pre_load(), 19);
        // After the hub: 19 - 3 - 6 + 3 picked up.
        assert_eq!(r.post_load(), 13);
        assert_eq!(r.max_load(), 19);
        assert_eq!(r.spare_capacity(), 5);
        assert_eq!(r.total_m9_drops(), 3);
    }

    #[test]
    fn test_direct_route_load_is_tmib_only() {
        let r = Route::direct(
            surfer(),
            vec![PostHubStop {
                platform: pid("M6"),
                tmib_drop: 8,
                m9_drop: 0,
            }],
        );
        assert_eq!(r.max_load(), 8);
        assert!(!r.uses_hub);
        assert_eq!(r.total_m9_drops(), 0);
    }

    #[test]
    fn test_stop_iteration_covers_both_legs() {
        let r = hub_route();
        let platforms: Vec<String> = r.stops().map(|s| s.platform().short_name()).collect();
        assert_eq!(platforms, vec!["M5", "M4", "M5"]);
        assert!(!r.touches_distant_cluster());
    }
}
