use std::io;

use thiserror::Error;

use crate::capture::FrameChannelClosed;

/// Errors raised while starting, feeding or stopping a running pipeline.
///
/// Per-frame problems never show up here; they are absorbed and counted in
/// `PipelineStats`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The frame source reports no permission or no usable session.
    #[error("frame source is unavailable")]
    SourceUnavailable,

    #[error("failed to spawn the {thread} thread")]
    Spawn {
        thread: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    FrameChannel(#[from] FrameChannelClosed),

    #[error("presentation thread is no longer running")]
    PresentationClosed,

    #[error("{0} thread panicked")]
    Panicked(&'static str),
}
