use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use image::ImageFormat;
use thiserror::Error;

use super::{Frame, FrameSource, ImageBuffer};

/// Errors raised while setting up a frame source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read frame directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Replays the images of a directory, in file-name order, as a frame stream.
///
/// Files whose extension is not a known image format are skipped. Files that
/// fail to decode are delivered as frames without a buffer.
#[derive(Debug)]
pub struct ImageDirSource {
    paths: VecDeque<PathBuf>,
    next_sequence: u64,
    frame_interval: Option<Duration>,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let read_err = |source| SourceError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                paths.push(path);
            }
        }
        paths.sort();
        log::debug!("{} image(s) queued from {}", paths.len(), dir.display());

        Ok(Self {
            paths: paths.into(),
            next_sequence: 0,
            frame_interval: None,
        })
    }

    /// Sleep `interval` before each frame to imitate a camera's frame rate.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Option<Frame> {
        let path = self.paths.pop_front()?;
        if let Some(interval) = self.frame_interval {
            thread::sleep(interval);
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        match image::open(&path) {
            Ok(decoded) => Some(Frame::new(sequence, ImageBuffer::from_dynamic(&decoded))),
            Err(err) => {
                log::warn!("frame {} ({}) unreadable: {}", sequence, path.display(), err);
                Some(Frame::missing(sequence))
            }
        }
    }
}
