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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatformError {
    name: String,
}

impl UnknownPlatformError {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for UnknownPlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown platform name '{}'", self.name)
    }
}

impl std::error::Error for UnknownPlatformError {}

/// A malformed scenario document. Every variant names the offending row so
/// the sheet can be corrected.
#[derive(Debug)]
pub enum ScenarioError {
    Json(serde_json::Error),
    UnknownPlatform { row: usize, source: UnknownPlatformError },
    TerminalAsDestination { row: usize },
    BadDeparture { row: usize, boat: String, value: String },
    BadPriority { row: usize, platform: String, value: u8 },
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Json(e) => write!(f, "Malformed scenario document: {e}"),
            ScenarioError::UnknownPlatform { row, source } => {
                write!(f, "Demand row {row}: {source}")
            }
            ScenarioError::TerminalAsDestination { row } => {
                write!(f, "Demand row {row}: TMIB cannot be a demand destination")
            }
            ScenarioError::BadDeparture { row, boat, value } => {
                write!(f, "Boat row {row} ({boat}): bad departure time '{value}'")
            }
            ScenarioError::BadPriority { row, platform, value } => {
                write!(
                    f,
                    "Demand row {row} ({platform}): priority {value} is outside 0..=3"
                )
            }
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Json(e) => Some(e),
            ScenarioError::UnknownPlatform { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(err: serde_json::Error) -> Self {
        ScenarioError::Json(err)
    }
}

/// A malformed geography document (distance matrix, speed table or gangway
/// list).
#[derive(Debug)]
pub enum GeoError {
    Json(serde_json::Error),
    UnknownPlatform { context: &'static str, source: UnknownPlatformError },
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::Json(e) => write!(f, "Malformed geography document: {e}"),
            GeoError::UnknownPlatform { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl std::error::Error for GeoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoError::Json(e) => Some(e),
            GeoError::UnknownPlatform { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::Json(err)
    }
}
