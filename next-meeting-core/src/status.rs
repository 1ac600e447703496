//! Reduce a list of meetings to what's happening now and what's next.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::event::{Meeting, Status};

/// Compute the current and next meeting at `now`.
///
/// Input order doesn't matter except as the final tie-break. Among meetings
/// in progress the most recently started one wins, then the shorter one.
/// Among upcoming meetings the earliest start wins, then the shorter one.
/// Remaining ties go to whichever appears first in `meetings`.
pub fn compute_status(meetings: &[Arc<Meeting>], now: DateTime<Utc>) -> Status {
    let mut status = Status::default();

    for meeting in meetings {
        if meeting.is_current_at(now) {
            let replace = match &status.current {
                None => true,
                Some(best) => is_more_current(meeting, best),
            };
            if replace {
                status.current = Some(Arc::clone(meeting));
            }
        } else if meeting.is_upcoming_at(now) {
            let replace = match &status.next {
                None => true,
                Some(best) => is_sooner(meeting, best),
            };
            if replace {
                status.next = Some(Arc::clone(meeting));
            }
        }
    }

    status
}

/// Later start wins; equal starts go to the shorter meeting.
fn is_more_current(candidate: &Meeting, best: &Meeting) -> bool {
    candidate.start > best.start
        || (candidate.start == best.start && candidate.duration() < best.duration())
}

/// Earlier start wins; equal starts go to the shorter meeting.
fn is_sooner(candidate: &Meeting, best: &Meeting) -> bool {
    candidate.start < best.start
        || (candidate.start == best.start && candidate.duration() < best.duration())
}
