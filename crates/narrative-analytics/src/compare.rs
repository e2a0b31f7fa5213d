//! Structural comparison of timelines
//!
//! Timelines are compared by where they have activity, never by what the
//! events say: both are sliced along shared fixed windows and every window
//! with events on exactly one side counts as one mismatch.

use chrono::{DateTime, Duration, Utc};
use narrative_model::EmotionTimeline;
use tracing::debug;

use crate::error::AnalyticsResult;
use crate::segment::{align_timelines_to_windows, ensure_positive, fixed_windows};

/// Presence/absence distance between two timelines
///
/// Windows of `window` width are anchored on `anchor` (default: the
/// earliest event of either timeline) and cover both timelines. The result
/// is the number of windows occupied by only one of them. Two empty
/// timelines are at distance zero; an empty timeline is as far from a
/// non-empty one as that one has events.
///
/// # Errors
/// - [`crate::AnalyticsError::InvalidArgument`] if `window <= 0`
/// - [`crate::AnalyticsError::InvalidArgument`] if more than
///   [`crate::MAX_FIXED_WINDOWS`] windows would be needed
#[allow(clippy::cast_precision_loss)]
pub fn temporal_distance(
    a: &EmotionTimeline,
    b: &EmotionTimeline,
    window: Duration,
    anchor: Option<DateTime<Utc>>,
) -> AnalyticsResult<f64> {
    ensure_positive("window", window)?;

    let (first, last) = match (a.start_time(), b.start_time()) {
        (None, None) => return Ok(0.0),
        (Some(_), None) => return Ok(a.len() as f64),
        (None, Some(_)) => return Ok(b.len() as f64),
        (Some(sa), Some(sb)) => {
            let last = a.end_time().max(b.end_time()).unwrap_or(sa.max(sb));
            (sa.min(sb), last)
        }
    };

    let windows = fixed_windows(first, last, window, anchor.unwrap_or(first))?;
    let aligned = align_timelines_to_windows(&[a.clone(), b.clone()], &windows)?;
    let mismatches = aligned
        .values()
        .filter(|slices| slices[0].is_empty() != slices[1].is_empty())
        .count();

    debug!(windows = windows.len(), mismatches, "compared timelines");
    Ok(mismatches as f64)
}

/// Pairwise [`temporal_distance`] of every timeline against every other
///
/// The matrix is square and symmetric with a zero diagonal. Each pair is
/// aligned on its own earliest event.
///
/// # Errors
/// As [`temporal_distance`]
pub fn proximity_matrix(timelines: &[EmotionTimeline], window: Duration) -> AnalyticsResult<Vec<Vec<f64>>> {
    ensure_positive("window", window)?;

    let n = timelines.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let distance = temporal_distance(&timelines[i], &timelines[j], window, None)?;
            matrix[i][j] = distance;
            matrix[j][i] = distance;
        }
    }
    Ok(matrix)
}
