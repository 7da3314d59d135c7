//! Region data model and the ordered region store.

use crate::error::{EditorError, EditorResult};
use crate::geometry;
use kurbo::{CubicBez, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Whether a vertex was placed by the user or synthesized for a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexKind {
    Anchor,
    Control,
}

/// Boundary style of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveType {
    /// Straight edges between consecutive vertices.
    #[default]
    Polygon,
    /// Chained cubic Bezier segments, stride 3.
    CubicCurve,
}

/// A single vertex of a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Position in content coordinates.
    pub position: Point,
    /// Render size and hit-test threshold.
    pub radius: f64,
    pub color: SerializableColor,
    pub kind: VertexKind,
}

impl Vertex {
    pub fn anchor(position: Point, radius: f64, color: SerializableColor) -> Self {
        Self {
            position,
            radius,
            color,
            kind: VertexKind::Anchor,
        }
    }

    pub fn control(position: Point, radius: f64, color: SerializableColor) -> Self {
        Self {
            position,
            radius,
            color,
            kind: VertexKind::Control,
        }
    }
}

/// Stable identifier for regions, handed to renderers as a cache key.
pub type RegionId = Uuid;

/// Minimum vertex count before a polygon may be closed.
pub const MIN_POLYGON_CLOSE_VERTICES: usize = 2;

/// Minimum vertex count (one complete segment) before a curve may be closed.
pub const MIN_CURVE_CLOSE_VERTICES: usize = 4;

/// A closed or in-progress boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    id: RegionId,
    vertices: Vec<Vertex>,
    curve_type: CurveType,
    closed: bool,
}

impl Region {
    /// Create a new, empty, open region.
    pub fn new(curve_type: CurveType) -> Self {
        Self {
            id: Uuid::new_v4(),
            vertices: Vec::new(),
            curve_type,
            closed: false,
        }
    }

    /// Build a closed region from existing vertices.
    pub fn closed_from(curve_type: CurveType, vertices: Vec<Vertex>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vertices,
            curve_type,
            closed: true,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Mark the region complete. Closed regions take no more vertices.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether the region has enough vertices for its type to be closed.
    pub fn can_close(&self) -> bool {
        match self.curve_type {
            CurveType::Polygon => self.vertices.len() >= MIN_POLYGON_CLOSE_VERTICES,
            CurveType::CubicCurve => self.vertices.len() >= MIN_CURVE_CLOSE_VERTICES,
        }
    }

    /// Append a vertex. Returns false if the region is already closed.
    pub fn push_vertex(&mut self, vertex: Vertex) -> bool {
        if self.closed {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    /// Append a curve anchor, chaining it to the current last anchor.
    ///
    /// The first anchor is placed alone. Every later anchor completes a
    /// segment: two control vertices are synthesized at the midpoint between
    /// the previous anchor and the new one, so the sequence reads
    /// `[a0, c, c, a1, c, c, a2, ...]`. Returns true when a segment was completed.
    pub fn append_curve_anchor(&mut self, anchor: Vertex, control_color: SerializableColor) -> bool {
        if self.closed {
            return false;
        }
        let Some(previous) = self.vertices.last().copied() else {
            self.vertices.push(anchor);
            return false;
        };
        let mid = previous.position.midpoint(anchor.position);
        let control = Vertex::control(mid, anchor.radius, control_color);
        self.vertices.extend([control, control, anchor]);
        true
    }

    /// Whether `point` hits this region's vertex 0.
    pub fn hits_first_vertex(&self, point: Point) -> bool {
        self.vertices
            .first()
            .is_some_and(|first| geometry::hit_vertex(point, first))
    }

    /// Whether the last anchor lies within the first anchor's hit radius.
    ///
    /// Degenerate curves (no complete segment) never qualify.
    pub fn last_anchor_meets_first(&self) -> bool {
        if self.vertices.len() < MIN_CURVE_CLOSE_VERTICES {
            return false;
        }
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) => geometry::hit_vertex(last.position, first),
            _ => false,
        }
    }

    /// Cubic segments of a curve region (stride 3, shared anchors).
    pub fn segments(&self) -> Vec<CubicBez> {
        geometry::cubic_segments(&self.vertices)
    }

    /// Boundary approximated as a polygon.
    pub fn outline(&self, samples: usize) -> Vec<Point> {
        match self.curve_type {
            CurveType::Polygon => self.vertices.iter().map(|v| v.position).collect(),
            CurveType::CubicCurve => geometry::sample_curve_to_polygon(&self.vertices, samples),
        }
    }

    /// Containment test, even-odd rule over the (approximated) outline.
    pub fn contains(&self, point: Point, samples: usize) -> bool {
        geometry::point_in_polygon(point, &self.outline(samples))
    }

    /// Bounding box of all vertices.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.vertices.first()?.position;
        Some(
            self.vertices
                .iter()
                .fold(Rect::from_points(first, first), |rect, v| {
                    rect.union_pt(v.position)
                }),
        )
    }

    /// Move every vertex by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        for vertex in &mut self.vertices {
            vertex.position += delta;
        }
    }

    /// Move a single vertex by `delta`.
    pub fn translate_vertex(&mut self, index: usize, delta: Vec2) -> EditorResult<()> {
        let len = self.vertices.len();
        let vertex = self
            .vertices
            .get_mut(index)
            .ok_or(EditorError::InvalidIndex { index, len })?;
        vertex.position += delta;
        Ok(())
    }
}

/// Ordered region collection. Insertion order is z-order and export order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionStore {
    regions: Vec<Region>,
}

impl RegionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a region on top. Returns its index.
    pub fn push(&mut self, region: Region) -> usize {
        self.regions.push(region);
        self.regions.len() - 1
    }

    /// Remove the region at `index`, rejecting out-of-range indices untouched.
    pub fn remove(&mut self, index: usize) -> EditorResult<Region> {
        if index >= self.regions.len() {
            return Err(EditorError::InvalidIndex {
                index,
                len: self.regions.len(),
            });
        }
        Ok(self.regions.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Region> {
        self.regions.get_mut(index)
    }

    pub fn last(&self) -> Option<&Region> {
        self.regions.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Region> {
        self.regions.last_mut()
    }

    pub fn pop(&mut self) -> Option<Region> {
        self.regions.pop()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// The last region, if it is still open for new vertices.
    pub fn open_region(&self) -> Option<&Region> {
        self.regions.last().filter(|r| !r.is_closed())
    }

    /// Serialize the store to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
