//! Core of next-meeting.
//!
//! - `event`: `Meeting` and `Status`
//! - `filter` and `status`: turn a fetched list into "current" and "next"
//! - `snapshot`: reuse a recent fetch instead of hitting the network
//! - `notify`: decide whether the next meeting still needs a notification
//! - `source`: the `EventSource` seam that fetchers implement

pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod notify;
pub mod snapshot;
pub mod source;
pub mod status;

pub use config::{Config, MAX_HOURS, MAX_MINUTES, hours_setting, minutes_setting};
pub use error::{CoreError, CoreResult};
pub use event::{Meeting, ResponseStatus, Status};
pub use filter::filter_accepted;
pub use notify::{NotificationStore, fingerprint};
pub use snapshot::{CachePayload, SnapshotCache};
pub use source::{EventSource, FetchError, TimeWindow};
pub use status::compute_status;
