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

use num_traits::Zero;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A distance in nautical miles.
///
/// Missing edges in the distance matrix resolve to [`Nm::SENTINEL`], which is
/// large enough to push any route across such an edge out of contention
/// without overflowing downstream arithmetic.
#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Nm(f64);

impl Nm {
    pub const SENTINEL: Nm = Nm(999.0);

    #[inline]
    pub const fn new(value: f64) -> Self {
        Nm(value)
    }

    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn max(self, other: Nm) -> Nm {
        Nm(self.0.max(other.0))
    }
}

impl std::fmt::Display for Nm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} NM", self.0)
    }
}

impl Add for Nm {
    type Output = Nm;

    #[inline]
    fn add(self, rhs: Nm) -> Nm {
        Nm(self.0 + rhs.0)
    }
}

impl AddAssign for Nm {
    #[inline]
    fn add_assign(&mut self, rhs: Nm) {
        self.0 += rhs.0;
    }
}

impl Sub for Nm {
    type Output = Nm;

    #[inline]
    fn sub(self, rhs: Nm) -> Nm {
        Nm(self.0 - rhs.0)
    }
}

impl Mul<f64> for Nm {
    type Output = Nm;

    #[inline]
    fn mul(self, rhs: f64) -> Nm {
        Nm(self.0 * rhs)
    }
}

impl Sum for Nm {
    fn sum<I: Iterator<Item = Nm>>(iter: I) -> Nm {
        iter.fold(Nm::zero(), Add::add)
    }
}

impl Zero for Nm {
    #[inline]
    fn zero() -> Self {
        Nm(0.0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

/// A speed in knots.
#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Knots(f64);

impl Knots {
    #[inline]
    pub const fn new(value: f64) -> Self {
        Knots(value)
    }

    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Knots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} kn", self.0)
    }
}

/// Travel time over `distance` at `speed`, rounded up to whole minutes.
/// A non-positive speed yields the 999-minute sentinel.
#[inline]
pub fn travel_time_minutes(distance: Nm, speed: Knots) -> i64 {
    if speed.value() <= 0.0 {
        return 999;
    }
    (distance.value() / speed.value() * 60.0).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nm_arithmetic() {
        let a = Nm::new(1.5);
        let b = Nm::new(2.25);
        assert_eq!((a + b).value(), 3.75);
        assert_eq!((b - a).value(), 0.75);
        assert_eq!((a * 2.0).value(), 3.0);
        let total: Nm = [a, b, Nm::zero()].into_iter().sum();
        assert_eq!(total.value(), 3.75);
    }

    #[test]
    fn test_travel_time_rounds_up() {
        // 7 NM at 14 kn is exactly 30 minutes.
        assert_eq!(travel_time_minutes(Nm::new(7.0), Knots::new(14.0)), 30);
        // 7.1 NM must round up.
        assert_eq!(travel_time_minutes(Nm::new(7.1), Knots::new(14.0)), 31);
        assert_eq!(travel_time_minutes(Nm::zero(), Knots::new(14.0)), 0);
    }

    #[test]
    fn test_travel_time_zero_speed_is_sentinel() {
        assert_eq!(travel_time_minutes(Nm::new(5.0), Knots::new(0.0)), 999);
        assert_eq!(travel_time_minutes(Nm::new(5.0), Knots::new(-1.0)), 999);
    }

    #[test]
    fn test_sentinel_dominates_real_distances() {
        assert!(Nm::SENTINEL > Nm::new(100.0));
    }
}
