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

pub mod boat;
pub mod demand;
pub mod err;
pub mod format;
pub mod geo;
pub mod plan;
pub mod platform;
pub mod route;
pub mod scenario;
pub mod validation;

pub mod prelude {
    pub use crate::boat::{Boat, BoatKind};
    pub use crate::demand::{Demand, Priority};
    pub use crate::geo::{DistanceMatrix, Gangway, SpeedTable};
    pub use crate::plan::{Plan, PlanEntry};
    pub use crate::platform::{Cluster, PlatformId};
    pub use crate::route::{PostHubStop, PreHubStop, Route, Stop};
    pub use crate::scenario::Scenario;
}
