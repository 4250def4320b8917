//! Segment provider: hook + track event operator.

pub mod hook;
pub mod track_event;

pub use self::hook::SegmentHook;
pub use self::track_event::SegmentTrackEventOperator;
