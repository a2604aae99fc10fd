use std::collections::VecDeque;

use image::{DynamicImage, GrayImage};

use crate::geometry::Size;

/// Pixel data of one captured frame in detector-native orientation.
///
/// Only the luma plane is kept; rectangle detection does not need colour.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pixels: GrayImage,
}

impl ImageBuffer {
    /// Wrap an existing luma image.
    pub fn new(pixels: GrayImage) -> Self {
        Self { pixels }
    }

    /// Convert any decoded image to its luma plane.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::new(image.to_luma8())
    }

    /// Wrap a raw row-major luma buffer. Returns `None` when the length does
    /// not match `width * height`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        GrayImage::from_raw(width, height, data).map(Self::new)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Width and height as reported by the capture pipeline.
    #[inline]
    pub fn extent(&self) -> Size {
        Size::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    #[inline]
    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }
}

/// One delivered sample. The buffer is missing when the capture layer
/// handed over a sample without readable pixel data.
#[derive(Debug, Clone)]
pub struct Frame {
    pub sequence: u64,
    pub buffer: Option<ImageBuffer>,
}

impl Frame {
    pub fn new(sequence: u64, buffer: ImageBuffer) -> Self {
        Self {
            sequence,
            buffer: Some(buffer),
        }
    }

    /// A sample that arrived without pixel data.
    pub fn missing(sequence: u64) -> Self {
        Self {
            sequence,
            buffer: None,
        }
    }
}

/// Supplier of sequential frames (camera, file set, test generator).
///
/// # Example
///
/// ```ignore
/// use rectscan::{Frame, FrameSource};
///
/// struct Camera { /* device handle */ }
///
/// impl FrameSource for Camera {
///     fn next_frame(&mut self) -> Option<Frame> {
///         // Block until the device produces a sample, or return None
///         // once the session has stopped.
///         None
///     }
/// }
/// ```
pub trait FrameSource {
    /// The next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Whether the source can deliver frames at all (permission granted,
    /// session configured). An unavailable source is never pulled from.
    fn is_available(&self) -> bool {
        true
    }
}

/// In-memory source that replays canned frames.
#[derive(Debug)]
pub struct SyntheticSource {
    frames: VecDeque<Frame>,
    available: bool,
}

impl SyntheticSource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            available: true,
        }
    }

    /// A source standing in for a session that could not be set up.
    pub fn unavailable() -> Self {
        Self {
            frames: VecDeque::new(),
            available: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
