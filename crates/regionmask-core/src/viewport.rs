//! Viewport module for pan/zoom transforms and the companion minimap.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Lowest allowed scale: content never renders smaller than 1:1.
pub const MIN_SCALE: f64 = 1.0;

/// Viewport manages the view transform of the main canvas.
///
/// Device coordinates are page coordinates as delivered by the input source.
/// Content coordinates are the unscaled, unpanned drawing space that all
/// hit-testing operates in:
/// `content = (device - origin - offset) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Page position of the canvas element.
    pub origin: Point,
    /// Current translation offset (pan), always within [`Viewport::offset_bounds`].
    offset: Vec2,
    /// Current zoom level.
    scale: f64,
    /// Maximum allowed zoom level.
    pub max_scale: f64,
    /// Scale change per wheel notch.
    pub zoom_step: f64,
    /// Size of the on-screen element.
    view_size: Size,
    /// Size of the content (background image) in content pixels.
    content_size: Size,
}

impl Viewport {
    /// Create a viewport whose element is exactly the content size.
    pub fn new(content_size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            offset: Vec2::ZERO,
            scale: MIN_SCALE,
            max_scale: 10.0,
            zoom_step: 0.1,
            view_size: content_size,
            content_size,
        }
    }

    /// Set the page position of the canvas element.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Get the affine transform for rendering (content to device).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin.to_vec2() + self.offset) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling (device to content).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-(self.origin.to_vec2() + self.offset))
    }

    /// Convert a device point to content coordinates.
    pub fn device_to_content(&self, device_point: Point) -> Point {
        self.inverse_transform() * device_point
    }

    /// Convert a content point to device coordinates.
    pub fn content_to_device(&self, content_point: Point) -> Point {
        self.transform() * content_point
    }

    /// Allowed offset range per axis: `(min, max)` with `max == 0`.
    ///
    /// The scaled content must always cover the element, so the offset can
    /// go no further negative than the amount the content overhangs it.
    pub fn offset_bounds(&self) -> (Vec2, Vec2) {
        let min = Vec2::new(
            -(self.content_size.width * self.scale - self.view_size.width).max(0.0),
            -(self.content_size.height * self.scale - self.view_size.height).max(0.0),
        );
        (min, Vec2::ZERO)
    }

    fn clamp_offset(&mut self) {
        let (min, max) = self.offset_bounds();
        self.offset = Vec2::new(
            self.offset.x.clamp(min.x, max.x),
            self.offset.y.clamp(min.y, max.y),
        );
    }

    /// Pan by a delta in device pixels, clamped to the content.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
        self.clamp_offset();
    }

    /// Zoom to `new_scale`, keeping the given device point fixed.
    pub fn zoom_at(&mut self, device_point: Point, new_scale: f64) {
        let new_scale = new_scale.clamp(MIN_SCALE, self.max_scale.max(MIN_SCALE));
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        // Convert device point to content before zoom
        let content_point = self.device_to_content(device_point);

        self.scale = new_scale;

        // Adjust offset so content_point stays under device_point
        let new_device = self.content_to_device(content_point);
        self.offset += device_point - new_device;
        self.clamp_offset();
    }

    /// Change the scale by `delta`, anchored at the element origin.
    pub fn set_zoom(&mut self, delta: f64) {
        self.zoom_at(self.origin, self.scale + delta);
    }

    /// Apply one wheel event. Forward scroll (negative delta) zooms in.
    pub fn wheel(&mut self, delta_y: f64, device_point: Point) {
        let step = if delta_y < 0.0 {
            self.zoom_step
        } else if delta_y > 0.0 {
            -self.zoom_step
        } else {
            return;
        };
        self.zoom_at(device_point, self.scale + step);
    }

    /// The part of the content currently visible, in content coordinates.
    pub fn visible_content_rect(&self) -> Rect {
        let top_left = Point::new(-self.offset.x / self.scale, -self.offset.y / self.scale);
        Rect::from_origin_size(
            top_left,
            Size::new(
                self.view_size.width / self.scale,
                self.view_size.height / self.scale,
            ),
        )
    }
}

/// Scaled-down overview of the whole content with a viewport indicator.
#[derive(Debug, Clone)]
pub struct Minimap {
    /// Size of the minimap element in device pixels.
    size: Size,
    /// Size of the full content.
    content_size: Size,
    /// Last pointer position while dragging the minimap.
    drag_last: Option<Point>,
}

impl Minimap {
    pub fn new(size: Size, content_size: Size) -> Self {
        Self {
            size,
            content_size,
            drag_last: None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Content pixels per minimap pixel (`fullSize / miniSize`) per axis.
    pub fn factor(&self) -> Vec2 {
        Vec2::new(
            self.content_size.width / self.size.width,
            self.content_size.height / self.size.height,
        )
    }

    /// Content to minimap transform.
    pub fn transform(&self) -> Affine {
        let factor = self.factor();
        Affine::scale_non_uniform(1.0 / factor.x, 1.0 / factor.y)
    }

    /// The main viewport's visible area in minimap coordinates.
    pub fn viewport_rect(&self, viewport: &Viewport) -> Rect {
        self.transform().transform_rect_bbox(viewport.visible_content_rect())
    }

    pub fn begin_drag(&mut self, point: Point) {
        self.drag_last = Some(point);
    }

    /// Move the drag to `point`, panning the main viewport to follow.
    ///
    /// Returns true if the viewport was updated.
    pub fn drag_to(&mut self, point: Point, viewport: &mut Viewport) -> bool {
        let Some(last) = self.drag_last else {
            return false;
        };
        let delta = point - last;
        let factor = self.factor();
        let scale = viewport.scale();
        // Moving the indicator right shows content further right.
        viewport.pan_by(Vec2::new(
            -delta.x * factor.x * scale,
            -delta.y * factor.y * scale,
        ));
        self.drag_last = Some(point);
        true
    }

    pub fn end_drag(&mut self) {
        self.drag_last = None;
    }
}
