//! Progress reporting.
//! Observer trait with a non-blocking `try_emit`; the bounded-channel
//! reporter drops intermediate events under backpressure but always
//! delivers the final event.

pub mod channel;
pub mod handler;
pub mod types;

pub use channel::ChannelReporter;
pub use handler::{NoopReporter, ProgressReporter};
pub use types::{ProgressEvent, ProgressKind};
