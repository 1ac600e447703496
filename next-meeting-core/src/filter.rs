//! Drop meetings the user isn't planning to attend.

use std::sync::Arc;

use crate::event::Meeting;

/// Keep only meetings the user accepted or tentatively accepted.
///
/// Order is preserved and the returned `Arc`s are the same ones passed in.
pub fn filter_accepted(meetings: &[Arc<Meeting>]) -> Vec<Arc<Meeting>> {
    meetings
        .iter()
        .filter(|m| m.response_status.is_attending())
        .cloned()
        .collect()
}
