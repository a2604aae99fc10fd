//! Overlay state, timing and the rendering boundary.

mod controller;
mod presenter;
mod state;

pub use controller::Overlay;
pub use presenter::{FlashPhase, LogPresenter, OverlayPresenter};
pub use state::{OverlayPhase, OverlayShape, OverlayState};
