//! Episode proximity classification
//!
//! Every function here is symmetric in its two episodes.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::Duration;
use narrative_model::time::seconds_f64;
use narrative_model::Episode;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{AnalyticsError, AnalyticsResult};

/// Temporal relationship between two episodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityRelation {
    /// Intervals share a non-empty span
    Overlapping,
    /// Disjoint intervals whose gap is within the adjacency threshold
    Adjacent,
    /// Everything else
    Disjoint,
}

impl ProximityRelation {
    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overlapping => "overlapping",
            Self::Adjacent => "adjacent",
            Self::Disjoint => "disjoint",
        }
    }
}

impl Display for ProximityRelation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProximityRelation {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overlapping" => Ok(Self::Overlapping),
            "adjacent" => Ok(Self::Adjacent),
            "disjoint" => Ok(Self::Disjoint),
            other => Err(AnalyticsError::invalid_argument(format!(
                "unknown proximity relation '{other}'"
            ))),
        }
    }
}

/// Fraction of the shorter episode covered by the overlap
///
/// Returns 0.0 when the intervals do not share a non-empty span. Because a
/// zero-length episode can never share a non-empty span, it only ever touches
/// its neighbours and is classified by gap.
#[must_use]
pub fn temporal_overlap(a: &Episode, b: &Episode) -> f64 {
    let overlap_start = a.start().max(b.start());
    let overlap_end = a.end().min(b.end());
    if overlap_start >= overlap_end {
        return 0.0;
    }

    // A non-empty overlap implies both durations are positive.
    let overlap = seconds_f64(overlap_end - overlap_start);
    overlap / a.duration_secs().min(b.duration_secs())
}

/// Time between the earlier episode's end and the later one's start
///
/// Zero when the episodes overlap or touch.
#[must_use]
pub fn temporal_gap(a: &Episode, b: &Episode) -> Duration {
    if a.end() <= b.start() {
        b.start() - a.end()
    } else if b.end() <= a.start() {
        a.start() - b.end()
    } else {
        Duration::zero()
    }
}

fn ensure_threshold(adjacency_threshold: Duration) -> AnalyticsResult<()> {
    if adjacency_threshold < Duration::zero() {
        return Err(AnalyticsError::invalid_argument(
            "adjacency_threshold must be non-negative",
        ));
    }
    Ok(())
}

/// Whether the episodes are disjoint but within `adjacency_threshold`
///
/// # Errors
/// Returns [`AnalyticsError::InvalidArgument`] for a negative threshold
pub fn are_adjacent(a: &Episode, b: &Episode, adjacency_threshold: Duration) -> AnalyticsResult<bool> {
    Ok(classify(a, b, adjacency_threshold)? == ProximityRelation::Adjacent)
}

/// Classify the pair as overlapping, adjacent or disjoint
///
/// # Errors
/// Returns [`AnalyticsError::InvalidArgument`] for a negative threshold
pub fn classify(a: &Episode, b: &Episode, adjacency_threshold: Duration) -> AnalyticsResult<ProximityRelation> {
    ensure_threshold(adjacency_threshold)?;

    let relation = if temporal_overlap(a, b) > 0.0 {
        ProximityRelation::Overlapping
    } else if temporal_gap(a, b) <= adjacency_threshold {
        ProximityRelation::Adjacent
    } else {
        ProximityRelation::Disjoint
    };
    trace!(%relation, "classified episode pair");
    Ok(relation)
}
