//! Renderer trait abstraction.
//!
//! The editor never owns the drawing surface. After every visible change it
//! replays the region store through a [`Renderer`] implementation supplied by
//! the host.

use crate::region::{CurveType, Region, RegionId, Vertex};
use kurbo::{Affine, CubicBez, Point, Rect};

/// Trait for drawing backends.
///
/// All geometry is passed in content coordinates; `set_transform` carries the
/// content to surface mapping for the frame.
pub trait Renderer {
    /// Content to surface transform for the following calls.
    fn set_transform(&mut self, transform: Affine);

    /// Clear the whole surface.
    fn clear(&mut self);

    /// Draw the background image (or layer composition).
    fn draw_background(&mut self);

    fn draw_vertex(&mut self, vertex: &Vertex);

    fn draw_edge(&mut self, a: Point, b: Point);

    fn draw_cubic_segment(&mut self, segment: CubicBez);

    /// Fill a closed region. `highlighted` is set while it is being dragged.
    fn fill_region(&mut self, region: &Region, highlighted: bool);

    /// Outline of the main viewport, drawn on the minimap only.
    fn draw_viewport_indicator(&mut self, _rect: Rect) {}

    /// Emphasize one image layer. Compositing is up to the backend.
    fn highlight_layer(&mut self, _index: usize) {}
}

/// Draw one full frame of the region store.
pub fn render_regions<R: Renderer + ?Sized>(
    renderer: &mut R,
    transform: Affine,
    regions: &[Region],
    highlighted: Option<usize>,
) {
    renderer.set_transform(transform);
    renderer.clear();
    renderer.draw_background();

    for (index, region) in regions.iter().enumerate() {
        for vertex in region.vertices() {
            renderer.draw_vertex(vertex);
        }
        match region.curve_type() {
            CurveType::Polygon => {
                for pair in region.vertices().windows(2) {
                    renderer.draw_edge(pair[0].position, pair[1].position);
                }
                if region.is_closed() && region.len() > 2 {
                    if let (Some(first), Some(last)) = (region.vertices().first(), region.vertices().last()) {
                        renderer.draw_edge(last.position, first.position);
                    }
                }
            }
            CurveType::CubicCurve => {
                for segment in region.segments() {
                    renderer.draw_cubic_segment(segment);
                }
            }
        }
        if region.is_closed() {
            renderer.fill_region(region, highlighted == Some(index));
        }
    }
}

/// A recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetTransform(Affine),
    Clear,
    Background,
    Vertex(Vertex),
    Edge(Point, Point),
    Cubic(CubicBez),
    Fill { region: RegionId, highlighted: bool },
    ViewportIndicator(Rect),
    HighlightLayer(usize),
}

/// Renderer that records every call. Useful for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames drawn (one `Clear` per frame).
    pub fn frame_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear))
            .count()
    }

    /// Commands of the most recent frame.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::SetTransform(_)))
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl Renderer for RecordingRenderer {
    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_background(&mut self) {
        self.commands.push(DrawCommand::Background);
    }

    fn draw_vertex(&mut self, vertex: &Vertex) {
        self.commands.push(DrawCommand::Vertex(*vertex));
    }

    fn draw_edge(&mut self, a: Point, b: Point) {
        self.commands.push(DrawCommand::Edge(a, b));
    }

    fn draw_cubic_segment(&mut self, segment: CubicBez) {
        self.commands.push(DrawCommand::Cubic(segment));
    }

    fn fill_region(&mut self, region: &Region, highlighted: bool) {
        self.commands.push(DrawCommand::Fill {
            region: region.id(),
            highlighted,
        });
    }

    fn draw_viewport_indicator(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ViewportIndicator(rect));
    }

    fn highlight_layer(&mut self, index: usize) {
        self.commands.push(DrawCommand::HighlightLayer(index));
    }
}
