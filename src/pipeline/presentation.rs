//! The presentation thread: sole owner of the overlay.
//!
//! Other threads ask for changes through a [`PresentationHandle`] and block
//! until the change has been applied, which keeps updates in submission
//! order. Between requests the thread sleeps until the next overlay deadline.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::overlay::{Overlay, OverlayPresenter, OverlayShape};

use super::PipelineError;

enum Command {
    Show(OverlayShape),
    Flash,
}

struct Request {
    command: Command,
    done: Sender<()>,
}

/// Synchronous access to the presentation thread.
#[derive(Debug, Clone)]
pub struct PresentationHandle {
    tx: Sender<Request>,
}

impl PresentationHandle {
    /// Show `shape` and re-arm the auto-hide. Returns once it is on screen.
    pub fn show(&self, shape: OverlayShape) -> Result<(), PipelineError> {
        self.apply(Command::Show(shape))
    }

    /// Start the capture flash. Returns once it has begun.
    pub fn flash(&self) -> Result<(), PipelineError> {
        self.apply(Command::Flash)
    }

    fn apply(&self, command: Command) -> Result<(), PipelineError> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send(Request {
                command,
                done: done_tx,
            })
            .map_err(|_| PipelineError::PresentationClosed)?;
        done_rx.recv().map_err(|_| PipelineError::PresentationClosed)
    }
}

/// Start the presentation thread. It runs until every handle is dropped and
/// then hands the overlay back through the join handle.
pub fn spawn_presentation<P>(
    presenter: P,
    hide_delay: Duration,
    flash_duration: Duration,
) -> Result<(PresentationHandle, JoinHandle<Overlay<P>>), PipelineError>
where
    P: OverlayPresenter + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    let overlay = Overlay::new(presenter, hide_delay, flash_duration);
    let join = thread::Builder::new()
        .name("rectscan-presentation".into())
        .spawn(move || run(overlay, rx))
        .map_err(|source| PipelineError::Spawn {
            thread: "presentation",
            source,
        })?;
    Ok((PresentationHandle { tx }, join))
}

fn run<P: OverlayPresenter>(mut overlay: Overlay<P>, requests: Receiver<Request>) -> Overlay<P> {
    loop {
        let request = match overlay.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match requests.recv_timeout(wait) {
                    Ok(request) => request,
                    Err(RecvTimeoutError::Timeout) => {
                        overlay.poll(Instant::now());
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match requests.recv() {
                Ok(request) => request,
                Err(_) => break,
            },
        };

        let now = Instant::now();
        // Expire first so a stale hide can never land after the new show.
        overlay.poll(now);
        match request.command {
            Command::Show(shape) => overlay.show(shape, now),
            Command::Flash => overlay.flash(now),
        }
        // The requester may have given up waiting; nothing to do then.
        let _ = request.done.send(());
    }

    log::debug!("presentation thread exiting");
    overlay
}
