use crate::geometry::{PresentationQuadrilateral, Rect};

/// Stage of the capture-confirmation flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashPhase {
    Begin,
    End,
}

/// Rendering surface for the detection overlay.
///
/// All calls arrive on the presentation thread, in frame order. Timing is
/// handled by [`Overlay`](super::Overlay); implementors only draw.
pub trait OverlayPresenter {
    /// Draw the closed path tl→tr→br→bl→tl and make it visible.
    fn show_quadrilateral(&mut self, quad: &PresentationQuadrilateral);

    /// Draw an axis-aligned box and make it visible.
    fn show_rect(&mut self, rect: &Rect);

    /// Make the overlay invisible.
    fn hide(&mut self);

    /// Capture flash. Ignored by default.
    fn flash(&mut self, _phase: FlashPhase) {}
}

/// Presenter that writes every overlay change to the log.
#[derive(Debug, Default)]
pub struct LogPresenter {
    shown: u64,
    hidden: u64,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shapes drawn so far.
    pub fn shown(&self) -> u64 {
        self.shown
    }

    /// Number of times the overlay was hidden.
    pub fn hidden(&self) -> u64 {
        self.hidden
    }
}

impl OverlayPresenter for LogPresenter {
    fn show_quadrilateral(&mut self, quad: &PresentationQuadrilateral) {
        self.shown += 1;
        let [tl, tr, br, bl] = quad.corners();
        log::info!(
            "overlay quad tl=({:.1}, {:.1}) tr=({:.1}, {:.1}) br=({:.1}, {:.1}) bl=({:.1}, {:.1})",
            tl.x,
            tl.y,
            tr.x,
            tr.y,
            br.x,
            br.y,
            bl.x,
            bl.y
        );
    }

    fn show_rect(&mut self, rect: &Rect) {
        self.shown += 1;
        let [x1, y1, x2, y2] = rect.to_tlbr();
        log::info!("overlay rect ({:.1}, {:.1}) to ({:.1}, {:.1})", x1, y1, x2, y2);
    }

    fn hide(&mut self) {
        self.hidden += 1;
        log::info!("overlay hidden");
    }

    fn flash(&mut self, phase: FlashPhase) {
        log::info!("capture flash {:?}", phase);
    }
}
