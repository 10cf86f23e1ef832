use super::TimeSeriesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flow orientation of a quantity on the interconnector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    AToB,
    BToA,
}

impl Direction {
    /// Canonical name, also accepted as a label
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::AToB => "A_TO_B",
            Direction::BToA => "B_TO_A",
        }
    }

    /// Resolve a direction label as it appears in a snapshot row.
    ///
    /// Accepts the configured labels and the canonical names.
    pub fn from_label(label: &str, labels: &DirectionLabels) -> Result<Self, TimeSeriesError> {
        let label = label.trim();
        if label == labels.a_to_b || label == Direction::AToB.as_str() {
            Ok(Direction::AToB)
        } else if label == labels.b_to_a || label == Direction::BToA.as_str() {
            Ok(Direction::BToA)
        } else {
            Err(TimeSeriesError::InvalidDirection(label.to_string()))
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Portal labels for each direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionLabels {
    pub a_to_b: String,
    pub b_to_a: String,
}

impl Default for DirectionLabels {
    fn default() -> Self {
        Self {
            a_to_b: "FRGB".to_string(),
            b_to_a: "GBFR".to_string(),
        }
    }
}

/// One timestamped quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Seconds from midnight
    pub position: i64,
    pub quantity: i64,
}

impl Sample {
    pub fn new(position: i64, quantity: i64) -> Self {
        Self { position, quantity }
    }
}

/// Samples for one direction, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub direction: Direction,
    pub samples: Vec<Sample>,
}

/// A parsed day-schedule document.
///
/// Both series are tagged by direction when the document is parsed, so lookups
/// never depend on position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesDocument {
    a_to_b: Series,
    b_to_a: Series,
}

impl TimeSeriesDocument {
    pub fn new(a_to_b: Vec<Sample>, b_to_a: Vec<Sample>) -> Self {
        Self {
            a_to_b: Series {
                direction: Direction::AToB,
                samples: a_to_b,
            },
            b_to_a: Series {
                direction: Direction::BToA,
                samples: b_to_a,
            },
        }
    }

    pub fn series(&self, direction: Direction) -> &Series {
        match direction {
            Direction::AToB => &self.a_to_b,
            Direction::BToA => &self.b_to_a,
        }
    }
}
