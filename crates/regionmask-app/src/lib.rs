//! RegionMask headless host.
//!
//! Plays the collaborator roles around the core editor: decodes images,
//! feeds recorded input and writes the masked export.

pub mod error;
pub mod renderer;
pub mod replay;
pub mod session;

pub use error::{AppError, AppResult};
pub use renderer::LogRenderer;
pub use replay::{Replay, Summary, load_image, run, run_session};
pub use session::{Session, SessionEvent};
