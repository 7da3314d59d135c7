//! Session replay against a headless editor.

use crate::error::AppResult;
use crate::renderer::LogRenderer;
use crate::session::{Session, SessionEvent};
use image::imageops::FilterType;
use kurbo::Point;
use regionmask_core::{Editor, EditorConfig, InputEvent, PixelBuffer};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Decode an image file into an RGBA buffer of the canvas size.
pub fn load_image(path: &Path, width: u32, height: u32) -> AppResult<PixelBuffer> {
    let rgba = image::open(path)?.to_rgba8();
    let rgba = if rgba.dimensions() == (width, height) {
        rgba
    } else {
        log::info!(
            "Resizing {} from {:?} to {width}x{height}",
            path.display(),
            rgba.dimensions()
        );
        image::imageops::resize(&rgba, width, height, FilterType::Triangle)
    };
    Ok(PixelBuffer::new(width, height, rgba.into_raw())?)
}

/// What a replay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub regions: usize,
    pub closed_regions: usize,
    pub snapshots: usize,
    pub frames: usize,
    pub output_bytes: usize,
}

/// An editor driven by recorded events on a simulated clock.
pub struct Replay {
    editor: Editor<LogRenderer>,
    start: Instant,
    elapsed: Duration,
}

impl Replay {
    pub fn new(config: EditorConfig, origin: Option<Point>) -> Self {
        let mut editor = Editor::new(config, LogRenderer::new("main")).with_minimap(LogRenderer::new("minimap"));
        if let Some(origin) = origin {
            editor = editor.with_origin(origin);
        }
        Self {
            editor,
            start: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn editor(&self) -> &Editor<LogRenderer> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor<LogRenderer> {
        &mut self.editor
    }

    /// Current simulated time.
    pub fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    pub fn apply(&mut self, event: &SessionEvent) {
        let now = self.now();
        match *event {
            SessionEvent::Down { x, y, button } => self.editor.handle_event_at(
                InputEvent::PointerDown {
                    position: Point::new(x, y),
                    button,
                },
                now,
            ),
            SessionEvent::Move { x, y } => self.editor.handle_event_at(
                InputEvent::PointerMove {
                    position: Point::new(x, y),
                },
                now,
            ),
            SessionEvent::Up { x, y } => self.editor.handle_event_at(
                InputEvent::PointerUp {
                    position: Point::new(x, y),
                },
                now,
            ),
            SessionEvent::Wheel { delta_y } => {
                self.editor.handle_event_at(InputEvent::Wheel { delta_y }, now)
            }
            SessionEvent::Wait { ms } => {
                self.elapsed += Duration::from_millis(ms);
                let now = self.now();
                self.editor.tick(now);
            }
            SessionEvent::StartRegion { mode } => self.editor.start_region(mode),
            SessionEvent::DeleteRegion { index } => {
                // Rejections are logged by the editor and leave it untouched.
                let _ = self.editor.delete_region(index);
            }
            SessionEvent::Undo => {
                self.editor.undo();
            }
            SessionEvent::Redo => {
                self.editor.redo();
            }
            SessionEvent::Reset => self.editor.reset(),
            SessionEvent::Zoom { delta } => self.editor.set_zoom(delta),
            SessionEvent::Pan { dx, dy } => self.editor.pan_by(dx, dy),
            SessionEvent::PickLayer { x, y } => {
                self.editor.pick_layer(x, y);
            }
        }
    }

    /// Let any pending debounced snapshot fire.
    pub fn settle(&mut self) {
        self.elapsed += self.editor.config().debounce();
        let now = self.now();
        self.editor.tick(now);
    }

    pub fn summary(&self, output_bytes: usize) -> Summary {
        let regions = self.editor.regions();
        Summary {
            regions: regions.len(),
            closed_regions: regions.iter().filter(|r| r.is_closed()).count(),
            snapshots: self.editor.history().len(),
            frames: self.editor.renderer().frames(),
            output_bytes,
        }
    }
}

/// Load, replay and export one session file.
pub fn run_session(path: &Path) -> AppResult<Summary> {
    let session = Session::load(path)?;
    run(&session)
}

/// Replay `session` and write its masked export.
pub fn run(session: &Session) -> AppResult<Summary> {
    let config = session.config.clone();
    let (width, height) = (config.width, config.height);
    let mut replay = Replay::new(config, session.origin.map(|(x, y)| Point::new(x, y)));

    let background = load_image(&session.background, width, height)?;
    replay.editor_mut().background_loaded(background)?;
    for path in &session.layers {
        let layer = load_image(path, width, height)?;
        replay.editor_mut().add_layer(layer)?;
    }

    for event in &session.events {
        replay.apply(event);
    }
    replay.settle();

    let png_data = replay.editor().export_selection()?;
    fs::write(&session.output, &png_data)?;
    log::info!("Wrote {} ({} bytes)", session.output.display(), png_data.len());
    if let Some(path) = &session.data_url {
        fs::write(path, regionmask_core::export::png_data_url(&png_data))?;
        log::info!("Wrote data URL to {}", path.display());
    }

    Ok(replay.summary(png_data.len()))
}
