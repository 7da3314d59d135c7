//! Renderer that writes draw calls to the log.

use kurbo::{Affine, CubicBez, Point, Rect};
use regionmask_core::{Region, Renderer, Vertex};

/// Headless drawing surface. Draw calls go to `log::trace!`.
#[derive(Debug, Default)]
pub struct LogRenderer {
    name: &'static str,
    frames: usize,
}

impl LogRenderer {
    pub fn new(name: &'static str) -> Self {
        Self { name, frames: 0 }
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn set_transform(&mut self, transform: Affine) {
        log::trace!("[{}] transform {:?}", self.name, transform.as_coeffs());
    }

    fn clear(&mut self) {
        self.frames += 1;
        log::trace!("[{}] frame {}", self.name, self.frames);
    }

    fn draw_background(&mut self) {
        log::trace!("[{}] background", self.name);
    }

    fn draw_vertex(&mut self, vertex: &Vertex) {
        log::trace!(
            "[{}] vertex {:?} at ({:.1}, {:.1})",
            self.name,
            vertex.kind,
            vertex.position.x,
            vertex.position.y
        );
    }

    fn draw_edge(&mut self, a: Point, b: Point) {
        log::trace!("[{}] edge {a:?} -> {b:?}", self.name);
    }

    fn draw_cubic_segment(&mut self, segment: CubicBez) {
        log::trace!("[{}] cubic {:?} -> {:?}", self.name, segment.p0, segment.p3);
    }

    fn fill_region(&mut self, region: &Region, highlighted: bool) {
        log::trace!(
            "[{}] fill {} ({} vertices, highlighted: {highlighted})",
            self.name,
            region.id(),
            region.len()
        );
    }

    fn draw_viewport_indicator(&mut self, rect: Rect) {
        log::trace!("[{}] viewport indicator {rect:?}", self.name);
    }

    fn highlight_layer(&mut self, index: usize) {
        log::trace!("[{}] highlight layer {index}", self.name);
    }
}
