use std::time::{Duration, Instant};

use crate::geometry::{PresentationQuadrilateral, Rect};

use super::{FlashPhase, OverlayPresenter, OverlayShape, OverlayState};

/// Overlay state bound to a presenter.
///
/// Every `show_*` call re-arms the auto-hide; [`Overlay::poll`] performs
/// whatever deadline has passed. Lives on the presentation thread.
pub struct Overlay<P> {
    state: OverlayState,
    presenter: P,
    hide_delay: Duration,
    flash_duration: Duration,
}

impl<P: OverlayPresenter> Overlay<P> {
    pub fn new(presenter: P, hide_delay: Duration, flash_duration: Duration) -> Self {
        Self {
            state: OverlayState::new(),
            presenter,
            hide_delay,
            flash_duration,
        }
    }

    pub fn show(&mut self, shape: OverlayShape, now: Instant) {
        self.state.show(shape, now, self.hide_delay);
        match &shape {
            OverlayShape::Quadrilateral(quad) => self.presenter.show_quadrilateral(quad),
            OverlayShape::Rect(rect) => self.presenter.show_rect(rect),
        }
    }

    pub fn show_quadrilateral(&mut self, quad: PresentationQuadrilateral, now: Instant) {
        self.show(OverlayShape::Quadrilateral(quad), now);
    }

    pub fn show_rect(&mut self, rect: Rect, now: Instant) {
        self.show(OverlayShape::Rect(rect), now);
    }

    /// Hide immediately, dropping any pending hide deadline.
    pub fn hide(&mut self) {
        if self.state.hide() {
            self.presenter.hide();
        }
    }

    /// Start the capture flash; it ends on a later `poll`.
    pub fn flash(&mut self, now: Instant) {
        self.state.begin_flash(now, self.flash_duration);
        self.presenter.flash(FlashPhase::Begin);
    }

    /// Apply every deadline that has passed at `now`.
    pub fn poll(&mut self, now: Instant) {
        if self.state.expire_hide(now) {
            self.presenter.hide();
        }
        if self.state.expire_flash(now) {
            self.presenter.flash(FlashPhase::End);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.next_deadline()
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Quadrilateral};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Quad(PresentationQuadrilateral),
        Rect(Rect),
        Hide,
        Flash(FlashPhase),
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
        fn flash(&mut self, phase: FlashPhase) {
            self.events.push(Event::Flash(phase));
        }
    }

    const DELAY: Duration = Duration::from_secs(2);

    fn overlay() -> Overlay<Recorder> {
        Overlay::new(Recorder::default(), DELAY, Duration::from_millis(300))
    }

    fn quad(offset: f32) -> PresentationQuadrilateral {
        Quadrilateral::new(
            Point::new(offset, 0.0),
            Point::new(offset + 5.0, 0.0),
            Point::new(offset + 5.0, 5.0),
            Point::new(offset, 5.0),
        )
    }

    #[test]
    fn test_two_detections_single_timer() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(800);
        let mut overlay = overlay();

        overlay.show_quadrilateral(quad(0.0), t0);
        overlay.show_quadrilateral(quad(1.0), t1);
        assert_eq!(overlay.next_deadline(), Some(t1 + DELAY));

        // Sample the whole window: visible throughout, one deadline at most.
        let mut t = t1;
        while t < t1 + DELAY {
            overlay.poll(t);
            assert!(overlay.state().is_visible(), "hidden early at {:?}", t - t0);
            assert_eq!(overlay.state().hide_deadline(), Some(t1 + DELAY));
            t += Duration::from_millis(100);
        }

        overlay.poll(t1 + DELAY);
        assert!(!overlay.state().is_visible());
        assert_eq!(
            overlay.into_presenter().events,
            vec![Event::Quad(quad(0.0)), Event::Quad(quad(1.0)), Event::Hide]
        );
    }

    #[test]
    fn test_poll_before_deadline_changes_nothing() {
        let t0 = Instant::now();
        let mut overlay = overlay();
        overlay.show_rect(Rect::new(0.0, 0.0, 4.0, 4.0), t0);

        let before = overlay.state().clone();
        overlay.poll(t0 + Duration::from_millis(10));
        assert_eq!(overlay.state(), &before);
    }

    #[test]
    fn test_hide_now() {
        let t0 = Instant::now();
        let mut overlay = overlay();
        overlay.show_quadrilateral(quad(0.0), t0);
        overlay.hide();

        assert!(!overlay.state().is_visible());
        assert_eq!(overlay.next_deadline(), None);
        assert_eq!(overlay.presenter().events.last(), Some(&Event::Hide));
    }

    #[test]
    fn test_flash_begins_and_ends() {
        let t0 = Instant::now();
        let mut overlay = overlay();
        overlay.flash(t0);
        assert!(overlay.state().is_flashing());

        overlay.poll(t0 + Duration::from_millis(299));
        assert!(overlay.state().is_flashing());
        overlay.poll(t0 + Duration::from_millis(300));
        assert!(!overlay.state().is_flashing());

        assert_eq!(
            overlay.into_presenter().events,
            vec![Event::Flash(FlashPhase::Begin), Event::Flash(FlashPhase::End)]
        );
    }
}
