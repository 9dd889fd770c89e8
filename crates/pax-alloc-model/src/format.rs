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

//! The route-string wire format.
//!
//! `TMIB +19/M5 -6/M9 -3 +3/M4 -10 (-2)/M5 (-1)` reads: board 19 at the
//! terminal, drop 6 at M5, leave 3 at the hub and pick up 3, then the
//! post-hub drops. `-N` is the terminal pool, `(-N)` the hub pool.

use crate::platform::PlatformId;
use crate::route::Route;

/// Renders a built route in the operator notation.
pub fn route_string(route: &Route) -> String {
    let mut parts: Vec<String> = Vec::new();

    let total_tmib = route.total_tmib();
    if total_tmib > 0 {
        parts.push(format!("TMIB +{total_tmib}"));
    } else {
        parts.push("TMIB".to_string());
    }

    if route.uses_hub {
        for stop in &route.pre_hub {
            parts.push(format!("{} -{}", stop.platform.short_name(), stop.tmib_drop));
        }

        let mut hub = "M9".to_string();
        if route.tmib_to_m9 > 0 {
            hub.push_str(&format!(" -{}", route.tmib_to_m9));
        }
        if route.m9_pickup > 0 {
            hub.push_str(&format!(" +{}", route.m9_pickup));
        }
        parts.push(hub);
    }

    for stop in &route.post_hub {
        let mut part = stop.platform.short_name();
        if stop.tmib_drop > 0 {
            part.push_str(&format!(" -{}", stop.tmib_drop));
        }
        if stop.m9_drop > 0 {
            part.push_str(&format!(" (-{})", stop.m9_drop));
        }
        parts.push(part);
    }

    parts.join("/")
}

/// Passenger deliveries implied by a hand-written fixed route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedRouteDeliveries {
    entries: Vec<FixedDelivery>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDelivery {
    pub platform: PlatformId,
    pub tmib: u32,
    pub m9: u32,
}

impl FixedRouteDeliveries {
    pub fn iter(&self) -> impl Iterator<Item = &FixedDelivery> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Terminal-pool passengers the route implies were boarded at TMIB.
    pub fn total_tmib(&self) -> u32 {
        self.entries.iter().map(|e| e.tmib).sum()
    }

    pub fn total_m9(&self) -> u32 {
        self.entries.iter().map(|e| e.m9).sum()
    }

    pub fn touches_distant_cluster(&self) -> bool {
        self.entries.iter().any(|e| e.platform.cluster().is_distant())
    }

    fn add(&mut self, platform: PlatformId, tmib: u32, m9: u32) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.platform == platform) {
            e.tmib += tmib;
            e.m9 += m9;
        } else {
            self.entries.push(FixedDelivery { platform, tmib, m9 });
        }
    }
}

/// Extracts the deliveries of a fixed route so they can be subtracted from
/// demand. Recognizes `X -N` (terminal pool) and `X (-N)` (hub pool);
/// the `TMIB +N` head and any other notation (transshipment braces included)
/// are ignored. Nothing is fabricated for tokens we cannot read.
pub fn parse_fixed_route(route: &str) -> FixedRouteDeliveries {
    let mut deliveries = FixedRouteDeliveries::default();

    for part in route.split('/') {
        let mut tokens = part.split_whitespace();
        let Some(head) = tokens.next() else {
            continue;
        };
        let Ok(platform) = PlatformId::parse(head) else {
            continue;
        };
        if platform.is_tmib() {
            continue;
        }

        let mut tmib = 0u32;
        let mut m9 = 0u32;
        for token in tokens {
            if let Some(n) = parse_paren_drop(token) {
                m9 += n;
            } else if let Some(n) = parse_plain_drop(token) {
                tmib += n;
            }
        }

        if tmib > 0 || m9 > 0 {
            deliveries.add(platform, tmib, m9);
        }
    }

    deliveries
}

fn parse_plain_drop(token: &str) -> Option<u32> {
    token.strip_prefix('-')?.parse().ok()
}

fn parse_paren_drop(token: &str) -> Option<u32> {
    token
        .strip_prefix("(-")?
        .strip_suffix(')')?
        .parse()
        .ok()
}
