use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EmbargoError, Result};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a publication action or a scheduled job moves a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Publish,
    Unpublish,
}

impl Direction {
    pub fn all() -> &'static [Direction] {
        &[Direction::Publish, Direction::Unpublish]
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Publish => Direction::Unpublish,
            Direction::Unpublish => Direction::Publish,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Publish => "publish",
            Direction::Unpublish => "unpublish",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "publish" => Ok(Direction::Publish),
            "unpublish" => Ok(Direction::Unpublish),
            other => Err(format!("unknown direction '{other}': expected publish or unpublish")),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// What a single publication action did to its target.
///
/// Computed per execution and never persisted; the lasting effect lives on
/// the record's timing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    /// The record was published or unpublished on the spot.
    Immediate { direction: Direction },
    ScheduledPublish { at: DateTime<Utc> },
    ScheduledUnpublish { at: DateTime<Utc> },
    ScheduledBoth {
        publish_at: DateTime<Utc>,
        unpublish_at: DateTime<Utc>,
    },
    /// Nothing to publish, nothing to schedule (also used for a missing target).
    NoOp,
}

impl Decision {
    /// Build the decision from the jobs scheduled during one execution.
    pub fn from_scheduled(
        publish_at: Option<DateTime<Utc>>,
        unpublish_at: Option<DateTime<Utc>>,
    ) -> Self {
        match (publish_at, unpublish_at) {
            (Some(publish_at), Some(unpublish_at)) => Decision::ScheduledBoth {
                publish_at,
                unpublish_at,
            },
            (Some(at), None) => Decision::ScheduledPublish { at },
            (None, Some(at)) => Decision::ScheduledUnpublish { at },
            (None, None) => Decision::NoOp,
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, Decision::Immediate { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            Decision::Immediate { direction } => format!("{direction}ed immediately"),
            Decision::ScheduledPublish { at } => format!("publish scheduled for {}", at.to_rfc3339()),
            Decision::ScheduledUnpublish { at } => {
                format!("unpublish scheduled for {}", at.to_rfc3339())
            }
            Decision::ScheduledBoth {
                publish_at,
                unpublish_at,
            } => format!(
                "publish scheduled for {}, unpublish scheduled for {}",
                publish_at.to_rfc3339(),
                unpublish_at.to_rfc3339()
            ),
            Decision::NoOp => "no action".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EmbargoError::InvalidTimestamp(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
