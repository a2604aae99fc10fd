//! DetectionPipeline combining rectangle detection, coordinate mapping and
//! the overlay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crate::capture::{Frame, FrameReceiver, FrameSender, FrameSource, SendOutcome, frame_channel};
use crate::detection::{FeatureDetector, RectangleDetector};
use crate::geometry::Size;
use crate::mapping::CoordinateMapper;
use crate::overlay::{Overlay, OverlayPresenter, OverlayShape};

use super::presentation::{PresentationHandle, spawn_presentation};
use super::{OverlayMode, PipelineConfig, PipelineError};

/// What became of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The sample carried no pixel data.
    MissingBuffer,
    /// The view has no usable size yet; nothing was detected or drawn.
    DegenerateView,
    /// No rectangle met the detector's threshold.
    NoDetection,
    /// A shape was produced for the overlay.
    Rendered(OverlayShape),
}

/// Per-outcome frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub processed: u64,
    pub missing_buffer: u64,
    pub degenerate_view: u64,
    pub no_detection: u64,
    pub rendered: u64,
    /// Frames discarded at intake because the worker was behind.
    pub dropped: u64,
}

impl PipelineStats {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.processed += 1;
        match outcome {
            FrameOutcome::MissingBuffer => self.missing_buffer += 1,
            FrameOutcome::DegenerateView => self.degenerate_view += 1,
            FrameOutcome::NoDetection => self.no_detection += 1,
            FrameOutcome::Rendered(_) => self.rendered += 1,
        }
    }
}

/// Rectangle detection pipeline.
///
/// `process_frame` is the pure per-frame step. `start` moves the pipeline
/// onto a serial detection worker and sets up the presentation thread.
pub struct DetectionPipeline<D> {
    detector: RectangleDetector<D>,
    config: PipelineConfig,
}

impl<D: FeatureDetector> DetectionPipeline<D> {
    /// Create a new pipeline with the given detection backend and config.
    pub fn new(detector: D, config: PipelineConfig) -> Self {
        Self {
            detector: RectangleDetector::new(detector),
            config,
        }
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, PipelineConfig::default())
    }

    /// Detect, select and map for a single frame viewed at `view`.
    ///
    /// Never fails: every per-frame problem is reported as an outcome.
    pub fn process_frame(&self, frame: &Frame, view: Size) -> FrameOutcome {
        let Some(buffer) = frame.buffer.as_ref() else {
            log::debug!("frame {} has no image buffer, skipping", frame.sequence);
            return FrameOutcome::MissingBuffer;
        };

        let mapper = CoordinateMapper::new(view);
        if view.is_degenerate() {
            log::trace!("frame {}: view {:?} not laid out", frame.sequence, view);
            return FrameOutcome::DegenerateView;
        }

        let candidates = self.detector.detect(buffer);
        let count = candidates.len();
        let Some(selected) = self.config.selection.select(candidates) else {
            return FrameOutcome::NoDetection;
        };

        let Some(quad) = mapper.map(&selected.quad, buffer.extent()) else {
            log::debug!(
                "frame {}: extent {:?} cannot be mapped",
                frame.sequence,
                buffer.extent()
            );
            return FrameOutcome::DegenerateView;
        };

        log::trace!(
            "frame {}: {} candidate(s), rendering {} pick (confidence {:.2})",
            frame.sequence,
            count,
            self.config.selection,
            selected.confidence
        );
        let shape = match self.config.overlay_mode {
            OverlayMode::Quadrilateral => OverlayShape::Quadrilateral(quad),
            OverlayMode::BoundingRect => OverlayShape::Rect(quad.bounding_rect()),
        };
        FrameOutcome::Rendered(shape)
    }

    /// Get a reference to the rectangle detector.
    pub fn detector(&self) -> &RectangleDetector<D> {
        &self.detector
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<D> DetectionPipeline<D>
where
    D: FeatureDetector + Send + 'static,
{
    /// Start the detection worker and the presentation thread.
    pub fn start<P>(self, presenter: P) -> Result<RunningPipeline<P>, PipelineError>
    where
        P: OverlayPresenter + Send + 'static,
    {
        let (presentation, presentation_thread) = spawn_presentation(
            presenter,
            self.config.hide_delay,
            self.config.flash_duration,
        )?;
        let (frames, intake) = frame_channel(self.config.frame_queue_capacity);
        let view = SharedView::new(self.config.view_size);

        let worker_presentation = presentation.clone();
        let worker_view = view.clone();
        let worker = thread::Builder::new()
            .name("rectscan-detect".into())
            .spawn(move || self.run_worker(intake, worker_presentation, worker_view))
            .map_err(|source| PipelineError::Spawn {
                thread: "detection",
                source,
            })?;

        log::debug!("detection pipeline started");
        Ok(RunningPipeline {
            frames,
            presentation,
            view,
            dropped: AtomicU64::new(0),
            worker,
            presentation_thread,
        })
    }

    /// Feed every frame of `source` through a freshly started pipeline and
    /// stop once the source is exhausted and the queue has drained.
    ///
    /// Nothing is spawned when the source is unavailable.
    pub fn run<S, P>(self, source: &mut S, presenter: P) -> Result<PipelineReport<P>, PipelineError>
    where
        S: FrameSource + ?Sized,
        P: OverlayPresenter + Send + 'static,
    {
        if !source.is_available() {
            log::warn!("frame source unavailable, pipeline not started");
            return Err(PipelineError::SourceUnavailable);
        }
        let running = self.start(presenter)?;
        let submitted = running.pump(source)?;
        log::debug!("source exhausted after {} frame(s)", submitted);
        running.shutdown()
    }

    fn run_worker(
        self,
        intake: FrameReceiver,
        presentation: PresentationHandle,
        view: SharedView,
    ) -> PipelineStats {
        let mut stats = PipelineStats::default();
        while let Some(frame) = intake.recv() {
            let outcome = self.process_frame(&frame, view.get());
            stats.record(&outcome);
            // Release the pixels before waiting on the presentation thread.
            drop(frame);

            if let FrameOutcome::Rendered(shape) = outcome {
                if let Err(err) = presentation.show(shape) {
                    log::warn!("stopping detection: {}", err);
                    break;
                }
            }
        }
        log::debug!("detection worker exiting after {} frame(s)", stats.processed);
        stats
    }
}

/// View size shared between the layout owner and the detection worker.
#[derive(Debug, Clone)]
struct SharedView(Arc<RwLock<Size>>);

impl SharedView {
    fn new(size: Size) -> Self {
        Self(Arc::new(RwLock::new(size)))
    }

    fn get(&self) -> Size {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, size: Size) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = size;
    }
}

/// A started pipeline. Frames go in through `submit` or `pump`.
pub struct RunningPipeline<P> {
    frames: FrameSender,
    presentation: PresentationHandle,
    view: SharedView,
    dropped: AtomicU64,
    worker: JoinHandle<PipelineStats>,
    presentation_thread: JoinHandle<Overlay<P>>,
}

/// Final counters and the overlay as left by the presentation thread.
pub struct PipelineReport<P> {
    pub stats: PipelineStats,
    pub overlay: Overlay<P>,
}

impl<P> RunningPipeline<P> {
    /// Hand one captured frame to the detection worker.
    ///
    /// Never blocks on detection; if the worker is behind, the oldest queued
    /// frame is discarded.
    pub fn submit(&self, frame: Frame) -> Result<SendOutcome, PipelineError> {
        let outcome = self.frames.send(frame)?;
        if let SendOutcome::DroppedOldest { sequence } = outcome {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            log::trace!("frame {} dropped at intake", sequence);
        }
        Ok(outcome)
    }

    /// Submit every frame `source` yields until it ends. Returns the number
    /// of frames submitted.
    pub fn pump<S: FrameSource + ?Sized>(&self, source: &mut S) -> Result<u64, PipelineError> {
        if !source.is_available() {
            log::warn!("frame source unavailable, nothing to detect");
            return Err(PipelineError::SourceUnavailable);
        }
        let mut submitted = 0;
        while let Some(frame) = source.next_frame() {
            self.submit(frame)?;
            submitted += 1;
        }
        Ok(submitted)
    }

    /// Update the presentation surface size after a layout pass.
    pub fn set_view_size(&self, size: Size) {
        self.view.set(size);
    }

    pub fn view_size(&self) -> Size {
        self.view.get()
    }

    /// Play the capture-confirmation flash.
    pub fn capture(&self) -> Result<(), PipelineError> {
        self.presentation.flash()
    }

    /// Frames discarded at intake so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting frames, let the worker drain the queue and wait for
    /// both threads to finish.
    pub fn shutdown(self) -> Result<PipelineReport<P>, PipelineError> {
        let RunningPipeline {
            frames,
            presentation,
            dropped,
            worker,
            presentation_thread,
            ..
        } = self;

        drop(frames);
        let mut stats = worker
            .join()
            .map_err(|_| PipelineError::Panicked("detection"))?;
        stats.dropped = dropped.into_inner();

        drop(presentation);
        let overlay = presentation_thread
            .join()
            .map_err(|_| PipelineError::Panicked("presentation"))?;

        log::debug!("detection pipeline stopped: {:?}", stats);
        Ok(PipelineReport { stats, overlay })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ImageBuffer;
    use crate::detection::{CandidateSelection, Feature, RectangleFeature};
    use crate::geometry::{DetectedQuadrilateral, Point, PresentationQuadrilateral, Quadrilateral, Rect};
    use crate::pipeline::PipelineBuilder;
    use image::GrayImage;
    use std::convert::Infallible;

    const VIEW: Size = Size {
        width: 390.0,
        height: 844.0,
    };

    fn quad(x: f32, y: f32, side: f32) -> DetectedQuadrilateral {
        Quadrilateral::new(
            Point::new(x, y),
            Point::new(x + side, y),
            Point::new(x + side, y + side),
            Point::new(x, y + side),
        )
    }

    fn frame(sequence: u64) -> Frame {
        Frame::new(sequence, ImageBuffer::new(GrayImage::new(640, 480)))
    }

    fn fixed(
        quads: Vec<DetectedQuadrilateral>,
    ) -> impl Fn(&ImageBuffer) -> Result<Vec<Feature>, Infallible> {
        move |_: &ImageBuffer| {
            Ok(quads
                .iter()
                .map(|q| Feature::Rectangle(RectangleFeature::new(*q, 1.0)))
                .collect())
        }
    }

    #[test]
    fn test_missing_buffer() {
        let pipeline = DetectionPipeline::with_default_config(fixed(vec![quad(0.0, 0.0, 10.0)]));
        assert_eq!(
            pipeline.process_frame(&Frame::missing(3), VIEW),
            FrameOutcome::MissingBuffer
        );
    }

    #[test]
    fn test_no_detection() {
        let pipeline = DetectionPipeline::with_default_config(fixed(vec![]));
        assert_eq!(pipeline.process_frame(&frame(0), VIEW), FrameOutcome::NoDetection);
    }

    #[test]
    fn test_zero_sized_view_is_skipped() {
        let pipeline = DetectionPipeline::with_default_config(fixed(vec![quad(0.0, 0.0, 10.0)]));
        assert_eq!(
            pipeline.process_frame(&frame(0), Size::new(0.0, 844.0)),
            FrameOutcome::DegenerateView
        );
    }

    #[test]
    fn test_last_candidate_wins_by_default() {
        let pipeline = DetectionPipeline::with_default_config(fixed(vec![
            quad(10.0, 10.0, 100.0),
            quad(200.0, 50.0, 40.0),
        ]));
        let outcome = pipeline.process_frame(&frame(0), VIEW);

        let expected = CoordinateMapper::new(VIEW)
            .map(&quad(200.0, 50.0, 40.0), Size::new(640.0, 480.0))
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Rendered(OverlayShape::Quadrilateral(expected)));
    }

    #[test]
    fn test_selection_and_rect_mode() {
        let pipeline = PipelineBuilder::new()
            .selection(CandidateSelection::Largest)
            .overlay_mode(OverlayMode::BoundingRect)
            .build(fixed(vec![quad(10.0, 10.0, 100.0), quad(200.0, 50.0, 40.0)]));
        let outcome = pipeline.process_frame(&frame(0), VIEW);

        let expected = CoordinateMapper::new(VIEW)
            .map(&quad(10.0, 10.0, 100.0), Size::new(640.0, 480.0))
            .unwrap()
            .bounding_rect();
        assert_eq!(outcome, FrameOutcome::Rendered(OverlayShape::Rect(expected)));
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Quad(PresentationQuadrilateral),
        Rect(Rect),
        Hide,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl OverlayPresenter for Recorder {
        fn show_quadrilateral(&mut self, quad: &PresentationQuadrilateral) {
            self.events.push(Event::Quad(*quad));
        }
        fn show_rect(&mut self, rect: &Rect) {
            self.events.push(Event::Rect(*rect));
        }
        fn hide(&mut self) {
            self.events.push(Event::Hide);
        }
    }

    #[test]
    fn test_overlay_updates_follow_arrival_order() {
        // Frame 0 is slow to detect, frame 1 is fast.
        let detector = |image: &ImageBuffer| -> Result<Vec<Feature>, Infallible> {
            let id = image.width() as f32;
            if image.width() == 1 {
                thread::sleep(std::time::Duration::from_millis(50));
            }
            Ok(vec![Feature::Rectangle(RectangleFeature::new(
                quad(0.0, 0.0, id / 4.0),
                1.0,
            ))])
        };
        let running = PipelineBuilder::new()
            .frame_queue_capacity(8)
            .view_size(100.0, 100.0)
            .build(detector)
            .start(Recorder::default())
            .unwrap();

        for (sequence, width) in [(0, 1u32), (1, 2), (2, 3)] {
            let buffer = ImageBuffer::new(GrayImage::new(width, 4));
            assert_eq!(running.submit(Frame::new(sequence, buffer)).unwrap(), SendOutcome::Queued);
        }
        let report = running.shutdown().unwrap();

        let sides: Vec<f32> = report
            .overlay
            .into_presenter()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Quad(q) => Some(q.bounding_rect().width),
                _ => None,
            })
            .collect();
        // extent (w, 4) -> effective (4, w); scale = min(100/4, 100/w) = 25
        assert_eq!(sides, vec![0.25 * 25.0, 0.5 * 25.0, 0.75 * 25.0]);
        assert_eq!(report.stats.rendered, 3);
    }

    #[test]
    fn test_empty_frames_leave_overlay_untouched() {
        let detector = |image: &ImageBuffer| -> Result<Vec<Feature>, Infallible> {
            if image.width() == 640 {
                Ok(vec![Feature::Rectangle(RectangleFeature::new(quad(5.0, 5.0, 50.0), 0.9))])
            } else {
                Ok(vec![])
            }
        };
        let running = PipelineBuilder::new()
            .frame_queue_capacity(8)
            .view_size(VIEW.width, VIEW.height)
            .build(detector)
            .start(Recorder::default())
            .unwrap();

        running.submit(frame(0)).unwrap();
        running
            .submit(Frame::new(1, ImageBuffer::new(GrayImage::new(320, 240))))
            .unwrap();
        running.submit(Frame::missing(2)).unwrap();
        let report = running.shutdown().unwrap();

        assert_eq!(report.stats.processed, 3);
        assert_eq!(report.stats.rendered, 1);
        assert_eq!(report.stats.no_detection, 1);
        assert_eq!(report.stats.missing_buffer, 1);
        assert_eq!(report.overlay.presenter().events.len(), 1);
        let state = report.overlay.state();
        assert!(state.is_visible());
        assert!(state.hide_deadline().is_some());
        let Some(Event::Quad(shown)) = report.overlay.presenter().events.first() else {
            panic!("expected the first frame's quadrilateral");
        };
        assert_eq!(state.shape(), Some(&OverlayShape::Quadrilateral(*shown)));
    }

    #[test]
    fn test_empty_frames_keep_state_snapshot() {
        let detector = |image: &ImageBuffer| -> Result<Vec<Feature>, Infallible> {
            if image.width() == 640 {
                Ok(vec![Feature::Rectangle(RectangleFeature::new(quad(5.0, 5.0, 50.0), 0.9))])
            } else {
                Ok(vec![])
            }
        };
        let pipeline = DetectionPipeline::with_default_config(detector);
        let mut overlay = Overlay::new(
            Recorder::default(),
            std::time::Duration::from_secs(2),
            std::time::Duration::from_millis(300),
        );
        let t0 = std::time::Instant::now();

        let FrameOutcome::Rendered(shape) = pipeline.process_frame(&frame(0), VIEW) else {
            panic!("first frame should render");
        };
        overlay.show(shape, t0);
        let snapshot = overlay.state().clone();

        let empty = Frame::new(1, ImageBuffer::new(GrayImage::new(320, 240)));
        for (i, next) in [empty, Frame::missing(2)].iter().enumerate() {
            let outcome = pipeline.process_frame(next, VIEW);
            assert!(!matches!(outcome, FrameOutcome::Rendered(_)));
            overlay.poll(t0 + std::time::Duration::from_millis(10 * (i as u64 + 1)));
            assert_eq!(overlay.state(), &snapshot);
        }
        assert_eq!(overlay.state().hide_deadline(), snapshot.hide_deadline());
        assert_eq!(overlay.presenter().events.len(), 1);
    }

    #[test]
    fn test_view_size_can_arrive_late() {
        let running = PipelineBuilder::new()
            .frame_queue_capacity(8)
            .build(fixed(vec![quad(10.0, 10.0, 20.0)]))
            .start(Recorder::default())
            .unwrap();

        assert!(running.view_size().is_degenerate());
        running.submit(frame(0)).unwrap();
        while !running.frames.is_empty() {
            thread::yield_now();
        }
        // The worker has taken frame 0; give it time to finish with it.
        thread::sleep(std::time::Duration::from_millis(50));

        running.set_view_size(VIEW);
        running.submit(frame(1)).unwrap();
        let report = running.shutdown().unwrap();

        assert_eq!(report.stats.degenerate_view, 1);
        assert_eq!(report.stats.rendered, 1);
    }

    #[test]
    fn test_unavailable_source() {
        let running = DetectionPipeline::with_default_config(fixed(vec![]))
            .start(Recorder::default())
            .unwrap();
        let mut source = crate::capture::SyntheticSource::unavailable();
        assert!(matches!(
            running.pump(&mut source),
            Err(PipelineError::SourceUnavailable)
        ));
        let report = running.shutdown().unwrap();
        assert_eq!(report.stats.processed, 0);
    }

    #[test]
    fn test_run_drains_source() {
        let frames = (0..4).map(|i| {
            if i == 2 {
                Frame::missing(i)
            } else {
                frame(i)
            }
        });
        let mut source = crate::capture::SyntheticSource::new(frames);
        let report = PipelineBuilder::new()
            .frame_queue_capacity(4)
            .view_size(VIEW.width, VIEW.height)
            .build(fixed(vec![quad(10.0, 10.0, 20.0)]))
            .run(&mut source, Recorder::default())
            .unwrap();

        assert_eq!(source.remaining(), 0);
        // The queue holds every frame, so nothing is dropped.
        assert_eq!(report.stats.dropped, 0);
        assert_eq!(report.stats.processed, 4);
        assert_eq!(report.stats.missing_buffer, 1);
        assert_eq!(report.stats.rendered, 3);
        assert!(report.overlay.state().is_visible());
    }

    #[test]
    fn test_run_refuses_unavailable_source() {
        let mut source = crate::capture::SyntheticSource::unavailable();
        let result = DetectionPipeline::with_default_config(fixed(vec![]))
            .run(&mut source, Recorder::default());
        assert!(matches!(result, Err(PipelineError::SourceUnavailable)));
    }
}
