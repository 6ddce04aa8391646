//! Panel lifecycle: one live dashboard surface at a time.

mod log;
mod manager;
mod surface;

pub use log::{PanelLog, TracingLog};
pub use manager::{Disposables, PanelManager, ShowOutcome, DEFAULT_ERROR_MESSAGE};
pub use surface::{DisplaySurface, SurfaceMessage};
