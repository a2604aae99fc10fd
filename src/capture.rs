//! Frame intake: buffers, sources and the queue feeding the detection worker.

mod channel;
mod dir_source;
mod frame;

pub use channel::{FrameChannelClosed, FrameReceiver, FrameSender, SendOutcome, frame_channel};
pub use dir_source::{ImageDirSource, SourceError};
pub use frame::{Frame, FrameSource, ImageBuffer, SyntheticSource};
