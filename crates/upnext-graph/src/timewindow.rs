//! Resolves the current open time interval for a task from absolute and
//! event-relative windows.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// A configured window, each bound optional and given as a second offset.
///
/// For an absolute window the offset is taken modulo a day; for an
/// event-relative window it is a plain offset from the event's timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeDependency {
    /// Offset, in seconds, marking the start of the window.
    pub start: Option<i64>,
    /// Offset, in seconds, marking the end of the window.
    pub end: Option<i64>,
}

/// The resolved `[start, end]` interval for a task at a given instant.
///
/// `(None, None)` after folding absolute and event bounds together means the
/// window is impossible today (`start >= end`), not "unbounded" — an
/// unbounded bound is represented by that single side being `None` while the
/// other is concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeslot {
    /// Lower bound, if any.
    pub start: Option<DateTime<Utc>>,
    /// Upper bound, if any.
    pub end: Option<DateTime<Utc>>,
    /// Set once folding detected `start >= end`.
    pub impossible: bool,
}

impl Timeslot {
    const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
            impossible: false,
        }
    }

    /// Whether `now` falls inside the resolved window.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        if self.impossible {
            return false;
        }
        let after_start = self.start.is_none_or(|s| now >= s);
        let before_end = self.end.is_none_or(|e| now <= e);
        after_start && before_end
    }
}

/// Resolves timeslots from absolute and event-relative window declarations.
#[derive(Debug, Default)]
pub struct TimeWindowResolver;

impl TimeWindowResolver {
    /// Creates a resolver. Stateless; kept as a type for symmetry with the
    /// other components and to give the algorithm a home for future
    /// extension (e.g. timezone-aware folding).
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Folds an absolute window and a set of named event-relative windows
    /// into a single [`Timeslot`] as of `now`.
    ///
    /// `event_timestamps` maps event name to its last-triggered time; an
    /// event window whose event has never fired contributes nothing.
    #[must_use]
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        absolute: Option<TimeDependency>,
        event_windows: &HashMap<String, TimeDependency>,
        event_timestamps: &HashMap<String, DateTime<Utc>>,
    ) -> Timeslot {
        let midnight = now.date_naive().and_hms_opt(0, 0, 0).expect("valid midnight").and_utc();

        let mut start: Option<DateTime<Utc>> = None;
        let mut end: Option<DateTime<Utc>> = None;

        if let Some(abs) = absolute {
            if let Some(s) = abs.start {
                let candidate = midnight + Duration::seconds(s.rem_euclid(86_400));
                start = Some(start.map_or(candidate, |cur| cur.max(candidate)));
            }
            if let Some(e) = abs.end {
                let candidate = midnight + Duration::seconds(e.rem_euclid(86_400));
                end = Some(end.map_or(candidate, |cur| cur.min(candidate)));
            }
        }

        for (event, win) in event_windows {
            let Some(&ts) = event_timestamps.get(event) else {
                continue;
            };
            if let Some(s) = win.start {
                let candidate = ts + Duration::seconds(s.rem_euclid(86_400));
                start = Some(start.map_or(candidate, |cur| cur.max(candidate)));
            }
            if let Some(e) = win.end {
                let candidate = ts + Duration::seconds(e.rem_euclid(86_400));
                end = Some(end.map_or(candidate, |cur| cur.min(candidate)));
            }
        }

        if let (Some(s), Some(e)) = (start, end) {
            if s >= e {
                return Timeslot {
                    start: None,
                    end: None,
                    impossible: true,
                };
            }
        }

        if start.is_none() && end.is_none() {
            return Timeslot::unbounded();
        }

        Timeslot {
            start,
            end,
            impossible: false,
        }
    }
}
