//! Domain model（ids, connection, track event, context, envelope, errors）

pub mod connection;
pub mod context;
pub mod errors;
pub mod ids;
pub mod task;
pub mod track;

pub use self::connection::{Connection, ConnectionId, SegmentCredentials, DEFAULT_CONNECTION_ID};
pub use self::context::TaskContext;
pub use self::errors::{BeaconError, ErrorKind};
pub use self::ids::{MessageId, RunId};
pub use self::task::{TaskEnvelope, TaskType};
pub use self::track::{Properties, TrackEvent, TrackRequest};
