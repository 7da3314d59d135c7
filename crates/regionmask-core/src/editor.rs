//! Editor context: owns the region store, history, interaction state, viewport
//! and layers, and exposes the host operations.

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::export::{self, PixelBuffer};
use crate::history::History;
use crate::input::{InputEvent, MouseButton};
use crate::interaction::{DrawMode, Interaction, InteractionState, Outcome, Selection, VertexStyle};
use crate::layers::LayerStack;
use crate::region::{Region, RegionStore};
use crate::render::{Renderer, render_regions};
use crate::viewport::{Minimap, Viewport};
use kurbo::{Point, Size, Vec2};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// The minimap and the surface it is drawn on.
#[derive(Debug)]
struct MinimapSurface<R> {
    map: Minimap,
    renderer: R,
}

/// A region editor bound to a renderer.
///
/// All mutation happens synchronously inside the event handlers; the only
/// deferred work is the debounced drag snapshot, fired by [`Editor::tick`] or
/// by the next event past its deadline.
#[derive(Debug)]
pub struct Editor<R: Renderer> {
    config: EditorConfig,
    store: RegionStore,
    history: History<RegionStore>,
    interaction: Interaction,
    viewport: Viewport,
    minimap: Option<MinimapSurface<R>>,
    layers: LayerStack,
    renderer: R,
    /// Last device pointer position, the anchor for wheel zoom.
    pointer: Point,
    highlighted_layer: Option<usize>,
}

impl<R: Renderer> Editor<R> {
    /// Create an editor with an empty store. The empty store is the first
    /// snapshot, so undo never goes below it.
    pub fn new(config: EditorConfig, renderer: R) -> Self {
        if config.vertex_radius < 0.0 || config.lasso_vertex_radius < 0.0 {
            log::warn!(
                "Negative vertex radius in config ({}, {}), clamping to 0",
                config.vertex_radius,
                config.lasso_vertex_radius
            );
        }
        let style = VertexStyle {
            radius: config.vertex_radius.max(0.0),
            color: config.vertex_color,
            lasso_radius: config.lasso_vertex_radius.max(0.0),
            lasso_color: config.lasso_vertex_color,
            control_color: config.control_color,
        };
        let mut viewport = Viewport::new(Size::new(config.width as f64, config.height as f64));
        viewport.max_scale = config.max_scale;
        viewport.zoom_step = config.zoom_step;

        let store = RegionStore::new();
        let mut history = History::new(config.history_capacity, config.debounce());
        history.push(store.clone());

        Self {
            interaction: Interaction::new(style, config.curve_samples),
            store,
            history,
            viewport,
            minimap: None,
            layers: LayerStack::new(),
            renderer,
            pointer: Point::ZERO,
            highlighted_layer: None,
            config,
        }
    }

    /// Attach a minimap drawn through `renderer`.
    pub fn with_minimap(mut self, renderer: R) -> Self {
        let map = Minimap::new(
            Size::new(self.config.minimap_width, self.config.minimap_height),
            self.viewport.content_size(),
        );
        self.minimap = Some(MinimapSurface { map, renderer });
        self
    }

    /// Set the page position of the canvas element.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.viewport.origin = origin;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn regions(&self) -> &RegionStore {
        &self.store
    }

    pub fn region(&self, index: usize) -> Option<&Region> {
        self.store.get(index)
    }

    pub fn history(&self) -> &History<RegionStore> {
        &self.history
    }

    pub fn state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn mode(&self) -> DrawMode {
        self.interaction.mode()
    }

    pub fn selection(&self) -> Selection {
        self.interaction.selection()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn minimap(&self) -> Option<&Minimap> {
        self.minimap.as_ref().map(|m| &m.map)
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn highlighted_layer(&self) -> Option<usize> {
        self.highlighted_layer
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn minimap_renderer(&self) -> Option<&R> {
        self.minimap.as_ref().map(|m| &m.renderer)
    }

    /// Dispatch one input event at the current time.
    pub fn handle_event(&mut self, event: InputEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// Dispatch one input event that happened at `now`.
    pub fn handle_event_at(&mut self, event: InputEvent, now: Instant) {
        self.tick(now);
        log::trace!("Input event: {event:?}");
        if let Some(position) = event.position() {
            self.pointer = position;
        }

        let outcome = match event {
            InputEvent::PointerDown { position, button } => {
                // A new gesture ends the pause the pending drag snapshot waits for.
                self.flush_pending();
                let content = self.viewport.device_to_content(position);
                self.interaction
                    .pointer_down(&mut self.store, content, position, button)
            }
            InputEvent::PointerMove { position } => {
                let content = self.viewport.device_to_content(position);
                self.interaction
                    .pointer_move(&mut self.store, content, position)
            }
            InputEvent::PointerUp { .. } => self.interaction.pointer_up(&mut self.store),
            InputEvent::Wheel { delta_y } => {
                self.viewport.wheel(delta_y, self.pointer);
                self.redraw();
                return;
            }
        };
        self.apply(outcome, now);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, button: MouseButton) {
        self.handle_event(InputEvent::PointerDown {
            position: Point::new(x, y),
            button,
        });
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.handle_event(InputEvent::PointerMove {
            position: Point::new(x, y),
        });
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.handle_event(InputEvent::PointerUp {
            position: Point::new(x, y),
        });
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.handle_event(InputEvent::Wheel { delta_y });
    }

    fn apply(&mut self, outcome: Outcome, now: Instant) {
        match outcome {
            Outcome::Ignored | Outcome::PanEnded => {}
            Outcome::VertexPlaced => {
                // Lasso vertices are committed once, on release.
                if self.interaction.state() != InteractionState::Lassoing {
                    self.commit();
                }
                self.redraw();
            }
            Outcome::RegionClosed(index) => {
                log::debug!("Region {index} closed");
                self.commit();
                self.redraw();
            }
            Outcome::Dragged => {
                self.history.schedule_push(now);
                self.redraw();
            }
            Outcome::DragStarted | Outcome::DragEnded => self.redraw(),
            Outcome::LassoFinished { closed } => {
                if closed {
                    self.commit();
                }
                self.redraw();
            }
            Outcome::Pan(delta) => {
                self.viewport.pan_by(delta);
                self.redraw();
            }
        }
    }

    /// Fire the debounced drag snapshot if it is due.
    ///
    /// Returns true if a snapshot was committed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let store = &self.store;
        let fired = self.history.flush_due(now, || store.clone());
        if fired {
            log::debug!("Debounced snapshot committed ({} in history)", self.history.len());
        }
        fired
    }

    /// Commit the current store synchronously, superseding any pending push.
    fn commit(&mut self) {
        self.flush_pending();
        self.history.commit(self.store.clone());
        log::debug!("Snapshot committed ({} in history)", self.history.len());
    }

    /// Commit a pending debounced push right away, as its own snapshot.
    ///
    /// Must run before the store is changed by anything other than the drag.
    fn flush_pending(&mut self) {
        if self.history.has_pending() {
            self.history.cancel_pending();
            self.history.commit(self.store.clone());
            log::debug!("Pending drag snapshot flushed ({} in history)", self.history.len());
        }
    }

    /// Switch the draw mode, finishing any region still in progress.
    pub fn start_region(&mut self, mode: DrawMode) {
        log::debug!("Start region in {mode:?} mode");
        self.interaction.set_mode(mode);
        self.flush_pending();
        if self.interaction.finish_open_region(&mut self.store) {
            self.commit();
            self.redraw();
        }
    }

    /// Delete the region at `index`. Out-of-range indices leave everything untouched.
    pub fn delete_region(&mut self, index: usize) -> EditorResult<Region> {
        if self.store.get(index).is_some() {
            self.flush_pending();
        }
        let removed = self
            .store
            .remove(index)
            .inspect_err(|e| log::warn!("Delete rejected: {e}"))?;
        self.interaction.resync(&self.store);
        self.commit();
        self.redraw();
        Ok(removed)
    }

    /// Restore the previous snapshot. Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        self.flush_pending();
        let Some(snapshot) = self.history.undo() else {
            log::debug!("Nothing to undo");
            return false;
        };
        self.store = snapshot;
        self.interaction.resync(&self.store);
        self.redraw();
        log::debug!("Undo ({} in history)", self.history.len());
        true
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> bool {
        self.flush_pending();
        let Some(snapshot) = self.history.recover() else {
            log::debug!("Nothing to redo");
            return false;
        };
        self.store = snapshot;
        self.interaction.resync(&self.store);
        self.redraw();
        log::debug!("Redo ({} in history)", self.history.len());
        true
    }

    /// Remove every region. Undoable.
    pub fn reset(&mut self) {
        self.flush_pending();
        self.store.clear();
        self.highlighted_layer = None;
        self.interaction.resync(&self.store);
        self.commit();
        self.redraw();
    }

    /// Masked export of the layer composition, PNG encoded.
    pub fn export_selection(&self) -> EditorResult<Vec<u8>> {
        let base = self.layers.composite().ok_or(EditorError::NotReady)?;
        log::info!(
            "Exporting {}x{} image masked by {} regions",
            base.width(),
            base.height(),
            self.store.len()
        );
        let masked = export::mask_regions(&base, self.store.as_slice(), self.config.curve_samples);
        export::encode_png(&masked)
    }

    /// Masked export as a `data:image/png;base64,...` URL.
    pub fn export_selection_data_url(&self) -> EditorResult<String> {
        self.export_selection().map(|png| export::png_data_url(&png))
    }

    /// Change the zoom by `delta`, anchored at the element origin.
    pub fn set_zoom(&mut self, delta: f64) {
        self.viewport.set_zoom(delta);
        self.redraw();
    }

    /// Pan the view by a device delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(Vec2::new(dx, dy));
        self.redraw();
    }

    /// The background image finished loading.
    ///
    /// The first load draws the initial frame and records the current store
    /// as a snapshot, so edits made before the load are kept.
    pub fn background_loaded(&mut self, background: PixelBuffer) -> EditorResult<()> {
        let expected = (self.config.width, self.config.height);
        let actual = (background.width(), background.height());
        if actual != expected {
            log::warn!("Background rejected: {actual:?} does not match canvas {expected:?}");
            return Err(EditorError::LayerSize { expected, actual });
        }
        self.flush_pending();
        let first = self.layers.is_empty();
        self.layers.set_background(background)?;
        log::info!("Background loaded ({}x{})", actual.0, actual.1);
        if first && self.history.peek() != Some(&self.store) {
            self.commit();
        }
        self.redraw();
        Ok(())
    }

    /// Add an image layer above the existing ones.
    pub fn add_layer(&mut self, layer: PixelBuffer) -> EditorResult<usize> {
        if self.layers.is_empty() {
            return Err(EditorError::NotReady);
        }
        let index = self.layers.push(layer)?;
        log::debug!("Added layer {index}");
        self.redraw();
        Ok(index)
    }

    /// Highlight the topmost non-transparent layer under a device point.
    pub fn pick_layer(&mut self, x: f64, y: f64) -> Option<usize> {
        let content = self.viewport.device_to_content(Point::new(x, y));
        let picked = self.layers.pick(content);
        log::debug!("Picked layer {picked:?} at {content:?}");
        if picked != self.highlighted_layer {
            self.highlighted_layer = picked;
            self.redraw();
        }
        picked
    }

    pub fn minimap_pointer_down(&mut self, x: f64, y: f64) {
        if let Some(minimap) = &mut self.minimap {
            minimap.map.begin_drag(Point::new(x, y));
        }
    }

    pub fn minimap_pointer_move(&mut self, x: f64, y: f64) {
        let moved = match &mut self.minimap {
            Some(minimap) => minimap.map.drag_to(Point::new(x, y), &mut self.viewport),
            None => false,
        };
        if moved {
            self.redraw();
        }
    }

    pub fn minimap_pointer_up(&mut self) {
        if let Some(minimap) = &mut self.minimap {
            minimap.map.end_drag();
        }
    }

    /// Draw the main surface and, if attached, the minimap.
    pub fn redraw(&mut self) {
        let highlighted = self.interaction.selection().region;
        render_regions(
            &mut self.renderer,
            self.viewport.transform(),
            self.store.as_slice(),
            highlighted,
        );
        if let Some(layer) = self.highlighted_layer {
            self.renderer.highlight_layer(layer);
        }
        if let Some(minimap) = &mut self.minimap {
            render_regions(
                &mut minimap.renderer,
                minimap.map.transform(),
                self.store.as_slice(),
                highlighted,
            );
            minimap
                .renderer
                .draw_viewport_indicator(minimap.map.viewport_rect(&self.viewport));
        }
    }
}
