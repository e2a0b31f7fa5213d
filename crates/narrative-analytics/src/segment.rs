//! Temporal segmentation
//!
//! Pure, deterministic slicing of timelines into windows. No event is ever
//! dropped: the total event count across segments equals the input length.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use narrative_model::time::min_increment;
use narrative_model::{EmotionEvent, EmotionTimeline, Episode, TimeWindow};
use tracing::debug;

use crate::error::{AnalyticsError, AnalyticsResult};

/// Upper bound on windows produced by [`segment_fixed_windows`]
pub const MAX_FIXED_WINDOWS: i128 = 1_000_000;

/// One slice of a timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Bounds of the slice
    pub window: TimeWindow,
    /// Events inside the bounds, with the parent's subject
    pub timeline: EmotionTimeline,
}

pub(crate) fn ensure_positive(name: &str, d: Duration) -> AnalyticsResult<()> {
    if d <= Duration::zero() {
        return Err(AnalyticsError::invalid_argument(format!("{name} must be positive")));
    }
    Ok(())
}

fn slice(parent: &EmotionTimeline, events: Vec<EmotionEvent>) -> AnalyticsResult<EmotionTimeline> {
    Ok(EmotionTimeline::new(parent.subject_id(), events)?)
}

/// Split a timeline wherever consecutive events are at least `gap_threshold` apart
///
/// Every run has consecutive gaps strictly below the threshold. Each window
/// spans the first event of its run to the last event plus one microsecond.
///
/// # Errors
/// Returns [`AnalyticsError::InvalidArgument`] if `gap_threshold <= 0`
pub fn segment_by_gaps(
    timeline: &EmotionTimeline,
    gap_threshold: Duration,
) -> AnalyticsResult<Vec<Segment>> {
    ensure_positive("gap_threshold", gap_threshold)?;

    let events = timeline.events();
    let Some(first) = events.first() else {
        return Ok(Vec::new());
    };

    let mut segments = Vec::new();
    let mut run = vec![first.clone()];

    for pair in events.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        if gap >= gap_threshold {
            let finished = std::mem::replace(&mut run, vec![pair[1].clone()]);
            let segment = close_run(timeline, finished, segments.len())?;
            segments.push(segment);
        } else {
            run.push(pair[1].clone());
        }
    }
    let last = close_run(timeline, run, segments.len())?;
    segments.push(last);

    debug!(
        subject = timeline.subject_id(),
        events = timeline.len(),
        segments = segments.len(),
        "segmented timeline by gaps"
    );
    Ok(segments)
}

#[allow(clippy::cast_possible_wrap)]
fn close_run(parent: &EmotionTimeline, run: Vec<EmotionEvent>, position: usize) -> AnalyticsResult<Segment> {
    let start = run[0].timestamp;
    let last = run[run.len() - 1].timestamp;
    let end = last.checked_add_signed(min_increment()).ok_or_else(|| {
        AnalyticsError::invalid_argument(format!("event at {last} has no representable window end"))
    })?;
    let window = TimeWindow::new(start, end, Some(position as i64))?;
    Ok(Segment {
        window,
        timeline: slice(parent, run)?,
    })
}

/// Segment a timeline into gap-separated episodes
///
/// Each episode carries the timeline's subject as its source reference.
///
/// # Errors
/// Returns [`AnalyticsError::InvalidArgument`] if `gap_threshold <= 0`
pub fn segment_to_episodes(
    timeline: &EmotionTimeline,
    gap_threshold: Duration,
) -> AnalyticsResult<Vec<Episode>> {
    segment_by_gaps(timeline, gap_threshold)?
        .into_iter()
        .map(|segment| {
            Episode::new(
                segment.window.start(),
                segment.window.end(),
                segment.timeline.events().to_vec(),
                Some(timeline.subject_id().to_string()),
            )
            .map_err(AnalyticsError::from)
        })
        .collect()
}

fn total_nanos(d: Duration) -> i128 {
    i128::from(d.num_seconds()) * 1_000_000_000 + i128::from(d.subsec_nanos())
}

#[allow(clippy::cast_possible_truncation)]
fn nanos_to_duration(n: i128) -> AnalyticsResult<Duration> {
    i64::try_from(n)
        .map(Duration::nanoseconds)
        .map_err(|_| AnalyticsError::invalid_argument("window offset out of range"))
}

/// Slice a timeline into fixed-duration windows aligned on `anchor`
///
/// Windows span from the window holding the first event to the window
/// holding the last one, empty windows included. Indices use floor
/// division, so events before the anchor land in negative windows.
/// `anchor` defaults to the first event.
///
/// # Errors
/// - [`AnalyticsError::InvalidArgument`] if `window_duration <= 0`
/// - [`AnalyticsError::InvalidArgument`] for an empty timeline without anchor
/// - [`AnalyticsError::InvalidArgument`] if more than [`MAX_FIXED_WINDOWS`]
///   windows would be produced
pub fn segment_fixed_windows(
    timeline: &EmotionTimeline,
    window_duration: Duration,
    anchor: Option<DateTime<Utc>>,
) -> AnalyticsResult<Vec<Segment>> {
    ensure_positive("window_duration", window_duration)?;

    let (Some(first_ts), Some(last_ts)) = (timeline.start_time(), timeline.end_time()) else {
        if anchor.is_none() {
            return Err(AnalyticsError::invalid_argument(
                "cannot segment empty timeline without anchor",
            ));
        }
        return Ok(Vec::new());
    };
    let anchor = anchor.unwrap_or(first_ts);

    let mut events = timeline.events().iter().peekable();
    let segments = fixed_windows(first_ts, last_ts, window_duration, anchor)?
        .into_iter()
        .map(|window| -> AnalyticsResult<Segment> {
            let mut inside = Vec::new();
            while let Some(event) = events.next_if(|e| window.contains(e.timestamp)) {
                inside.push(event.clone());
            }
            Ok(Segment {
                window,
                timeline: slice(timeline, inside)?,
            })
        })
        .collect::<AnalyticsResult<Vec<_>>>()?;

    debug!(
        subject = timeline.subject_id(),
        windows = segments.len(),
        "segmented timeline into fixed windows"
    );
    Ok(segments)
}

/// Consecutive windows of `width` aligned on `anchor`, covering `first..=last`
pub(crate) fn fixed_windows(
    first: DateTime<Utc>,
    last: DateTime<Utc>,
    width: Duration,
    anchor: DateTime<Utc>,
) -> AnalyticsResult<Vec<TimeWindow>> {
    let width = total_nanos(width);
    let index_of = |ts: DateTime<Utc>| total_nanos(ts - anchor).div_euclid(width);
    let first_idx = index_of(first);
    let last_idx = index_of(last);

    if last_idx - first_idx + 1 > MAX_FIXED_WINDOWS {
        return Err(AnalyticsError::invalid_argument(format!(
            "window_duration too small: more than {MAX_FIXED_WINDOWS} windows"
        )));
    }

    (first_idx..=last_idx)
        .map(|idx| -> AnalyticsResult<TimeWindow> {
            let start = anchor + nanos_to_duration(idx * width)?;
            let end = anchor + nanos_to_duration((idx + 1) * width)?;
            let index = i64::try_from(idx)
                .map_err(|_| AnalyticsError::invalid_argument("window index out of range"))?;
            Ok(TimeWindow::new(start, end, Some(index))?)
        })
        .collect()
}

/// Slice several timelines along shared windows
///
/// Keys are each window's index, or its position in `windows` when it has
/// none. Every timeline contributes one (possibly empty) slice per window.
///
/// # Errors
/// Returns [`AnalyticsError::InvalidArgument`] if either input is empty
#[allow(clippy::cast_possible_wrap)]
pub fn align_timelines_to_windows(
    timelines: &[EmotionTimeline],
    windows: &[TimeWindow],
) -> AnalyticsResult<BTreeMap<i64, Vec<EmotionTimeline>>> {
    if timelines.is_empty() {
        return Err(AnalyticsError::invalid_argument("timelines cannot be empty"));
    }
    if windows.is_empty() {
        return Err(AnalyticsError::invalid_argument("windows cannot be empty"));
    }

    let mut aligned = BTreeMap::new();
    for (position, window) in windows.iter().enumerate() {
        let key = window.index().unwrap_or(position as i64);
        let slices = timelines
            .iter()
            .map(|timeline| {
                let inside = timeline
                    .events()
                    .iter()
                    .filter(|e| window.contains(e.timestamp))
                    .cloned()
                    .collect();
                slice(timeline, inside)
            })
            .collect::<AnalyticsResult<Vec<_>>>()?;
        aligned.insert(key, slices);
    }
    Ok(aligned)
}
