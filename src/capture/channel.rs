//! Bounded frame hand-off between the capture thread and the detection worker.
//!
//! When the queue is full the oldest queued frame is discarded to make room,
//! so a slow detector sheds load at the intake instead of accumulating a
//! backlog.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

use super::Frame;

/// The detection worker has stopped receiving frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame channel is closed")]
pub struct FrameChannelClosed;

/// What happened to the queue when a frame was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was queued without displacing anything.
    Queued,
    /// The frame was queued after discarding the oldest queued frame.
    DroppedOldest { sequence: u64 },
}

/// Capture-side end of the frame queue.
#[derive(Debug)]
pub struct FrameSender {
    tx: Sender<Frame>,
    drain: Receiver<Frame>,
    closed: Arc<AtomicBool>,
}

/// Worker-side end of the frame queue.
#[derive(Debug)]
pub struct FrameReceiver {
    rx: Receiver<Frame>,
    closed: Arc<AtomicBool>,
}

/// Create a drop-oldest frame queue holding at most `capacity` frames.
///
/// A capacity of zero is raised to one; a rendezvous queue cannot drop.
pub fn frame_channel(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
    let closed = Arc::new(AtomicBool::new(false));
    (
        FrameSender {
            tx,
            drain: rx.clone(),
            closed: Arc::clone(&closed),
        },
        FrameReceiver { rx, closed },
    )
}

impl FrameSender {
    /// Queue `frame`, discarding the oldest queued frame if the queue is full.
    pub fn send(&self, frame: Frame) -> Result<SendOutcome, FrameChannelClosed> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FrameChannelClosed);
        }

        let mut pending = frame;
        let mut dropped = None;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => {
                    return Ok(match dropped {
                        Some(sequence) => SendOutcome::DroppedOldest { sequence },
                        None => SendOutcome::Queued,
                    });
                }
                Err(TrySendError::Full(frame)) => {
                    pending = frame;
                    // The worker may have emptied the slot in between; just retry then.
                    if let Ok(stale) = self.drain.try_recv() {
                        log::trace!("discarding late frame {}", stale.sequence);
                        dropped = Some(stale.sequence);
                    }
                }
                Err(TrySendError::Disconnected(_)) => return Err(FrameChannelClosed),
            }
        }
    }

    /// Number of frames waiting for the worker.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

impl FrameReceiver {
    /// Block until a frame is queued. Returns `None` once the sender is gone
    /// and the queue has been drained.
    pub fn recv(&self) -> Option<Frame> {
        self.rx.recv().ok()
    }
}

impl Drop for FrameReceiver {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}
