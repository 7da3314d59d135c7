//! Pointer-driven interaction state machine.
//!
//! Turns content-space pointer events into vertex placement, region closing,
//! and vertex/region dragging on a [`RegionStore`]. Rendering and history are
//! left to the caller, driven by the returned [`Outcome`].

use crate::geometry;
use crate::input::MouseButton;
use crate::region::{CurveType, Region, RegionStore, SerializableColor, Vertex};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// How new regions are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawMode {
    /// One anchor per click, closed by clicking vertex 0.
    #[default]
    Polygon,
    /// One anchor per click, chained into cubic segments.
    Curve,
    /// Press and hold: every move appends a vertex, release closes.
    Lasso,
}

impl DrawMode {
    /// Curve type of regions created in this mode.
    pub fn curve_type(self) -> CurveType {
        match self {
            DrawMode::Polygon | DrawMode::Lasso => CurveType::Polygon,
            DrawMode::Curve => CurveType::CubicCurve,
        }
    }
}

/// Current interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// No region open, no pointer gesture in progress.
    #[default]
    Idle,
    /// A polygon region is open and receives clicks.
    PlacingPolygon,
    /// A curve region is open. Each click adds one anchor; the end anchor
    /// of a segment starts the next one.
    PlacingCurve,
    /// Long-press drawing in progress.
    Lassoing,
    /// A single vertex follows the pointer.
    DraggingVertex {
        region: usize,
        vertex: usize,
        last: Point,
    },
    /// A whole region follows the pointer.
    DraggingRegion { region: usize, last: Point },
    /// The view follows the pointer. `last` is in device coordinates.
    Panning { last: Point },
}

/// Which region and vertex are selected for dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub region: Option<usize>,
    /// Present when a single vertex is dragged rather than the whole region.
    pub vertex: Option<usize>,
}

/// Effect of one input on the store, for the caller to render and snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Nothing changed.
    Ignored,
    /// A vertex was appended to the open region.
    VertexPlaced,
    /// The open region at this index was closed by the click.
    RegionClosed(usize),
    /// A vertex or region was picked up.
    DragStarted,
    /// The selection moved.
    Dragged,
    /// The pointer released a dragged selection.
    DragEnded,
    /// A long-press region ended; `closed` is false when it was too small and dropped.
    LassoFinished { closed: bool },
    /// Pan the view by this device delta.
    Pan(Vec2),
    /// Panning gesture ended.
    PanEnded,
}

/// Radii and colors for vertices created by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexStyle {
    pub radius: f64,
    pub color: SerializableColor,
    pub lasso_radius: f64,
    pub lasso_color: SerializableColor,
    pub control_color: SerializableColor,
}

impl Default for VertexStyle {
    fn default() -> Self {
        Self {
            radius: 5.0,
            color: SerializableColor::black(),
            lasso_radius: 2.0,
            lasso_color: SerializableColor::transparent(),
            control_color: SerializableColor::new(128, 128, 128, 255),
        }
    }
}

/// The interaction state machine.
#[derive(Debug, Clone)]
pub struct Interaction {
    state: InteractionState,
    mode: DrawMode,
    mouse_down: bool,
    style: VertexStyle,
    samples: usize,
}

impl Interaction {
    pub fn new(style: VertexStyle, samples: usize) -> Self {
        Self {
            state: InteractionState::Idle,
            mode: DrawMode::default(),
            mouse_down: false,
            style,
            samples,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
    }

    /// Current drag selection.
    pub fn selection(&self) -> Selection {
        match self.state {
            InteractionState::DraggingVertex { region, vertex, .. } => Selection {
                region: Some(region),
                vertex: Some(vertex),
            },
            InteractionState::DraggingRegion { region, .. } => Selection {
                region: Some(region),
                vertex: None,
            },
            _ => Selection::default(),
        }
    }

    /// Pointer pressed at `content` (and `device`, used for panning).
    pub fn pointer_down(
        &mut self,
        store: &mut RegionStore,
        content: Point,
        device: Point,
        button: MouseButton,
    ) -> Outcome {
        self.mouse_down = true;
        if button != MouseButton::Left {
            self.state = InteractionState::Panning { last: device };
            return Outcome::Ignored;
        }

        // Never select while a region is open: the click belongs to it.
        if let Some(open) = store.open_region() {
            return match open.curve_type() {
                CurveType::Polygon => self.place_polygon_vertex(store, content),
                CurveType::CubicCurve => self.place_curve_anchor(store, content),
            };
        }

        // Vertices take precedence over region bodies.
        if let Some((region, vertex)) = geometry::find_vertex(content, store.as_slice()) {
            log::debug!("Picked vertex {vertex} of region {region}");
            self.state = InteractionState::DraggingVertex {
                region,
                vertex,
                last: content,
            };
            return Outcome::DragStarted;
        }
        if let Some(region) = geometry::find_region(content, store.as_slice(), self.samples) {
            log::debug!("Picked region {region}");
            self.state = InteractionState::DraggingRegion {
                region,
                last: content,
            };
            return Outcome::DragStarted;
        }

        match self.mode {
            DrawMode::Polygon => self.place_polygon_vertex(store, content),
            DrawMode::Curve => self.place_curve_anchor(store, content),
            DrawMode::Lasso => {
                let mut region = Region::new(CurveType::Polygon);
                region.push_vertex(self.lasso_vertex(content));
                store.push(region);
                self.state = InteractionState::Lassoing;
                Outcome::VertexPlaced
            }
        }
    }

    /// Pointer moved to `content` (`device` in page coordinates).
    pub fn pointer_move(&mut self, store: &mut RegionStore, content: Point, device: Point) -> Outcome {
        if !self.mouse_down {
            return Outcome::Ignored;
        }
        match self.state {
            InteractionState::DraggingVertex {
                region,
                vertex,
                last,
            } => {
                let moved = store
                    .get_mut(region)
                    .map(|r| r.translate_vertex(vertex, content - last).is_ok())
                    .unwrap_or(false);
                if !moved {
                    return Outcome::Ignored;
                }
                self.state = InteractionState::DraggingVertex {
                    region,
                    vertex,
                    last: content,
                };
                Outcome::Dragged
            }
            InteractionState::DraggingRegion { region, last } => {
                let Some(r) = store.get_mut(region) else {
                    return Outcome::Ignored;
                };
                r.translate(content - last);
                self.state = InteractionState::DraggingRegion {
                    region,
                    last: content,
                };
                Outcome::Dragged
            }
            InteractionState::Lassoing => {
                let vertex = self.lasso_vertex(content);
                if store.last_mut().is_some_and(|region| region.push_vertex(vertex)) {
                    Outcome::VertexPlaced
                } else {
                    Outcome::Ignored
                }
            }
            InteractionState::Panning { last } => {
                self.state = InteractionState::Panning { last: device };
                Outcome::Pan(device - last)
            }
            _ => Outcome::Ignored,
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, store: &mut RegionStore) -> Outcome {
        self.mouse_down = false;
        match self.state {
            InteractionState::DraggingVertex { .. } | InteractionState::DraggingRegion { .. } => {
                self.state = InteractionState::Idle;
                Outcome::DragEnded
            }
            InteractionState::Lassoing => {
                self.state = InteractionState::Idle;
                let closed = match store.last().map(Region::can_close) {
                    Some(true) => {
                        if let Some(region) = store.last_mut() {
                            region.close();
                        }
                        true
                    }
                    Some(false) => {
                        store.pop();
                        false
                    }
                    None => false,
                };
                log::debug!("Lasso finished (closed: {closed})");
                Outcome::LassoFinished { closed }
            }
            InteractionState::Panning { .. } => {
                self.resync(store);
                Outcome::PanEnded
            }
            _ => Outcome::Ignored,
        }
    }

    /// Close or drop the open region so a new one can start.
    ///
    /// Returns true if the store changed.
    pub fn finish_open_region(&mut self, store: &mut RegionStore) -> bool {
        let changed = match store.open_region().map(Region::can_close) {
            Some(true) => {
                if let Some(region) = store.last_mut() {
                    region.close();
                }
                true
            }
            Some(false) => {
                store.pop();
                true
            }
            None => false,
        };
        self.state = InteractionState::Idle;
        changed
    }

    /// Derive the state from the store after it was replaced (undo, delete).
    pub fn resync(&mut self, store: &RegionStore) {
        self.mouse_down = false;
        self.state = match store.open_region().map(Region::curve_type) {
            Some(CurveType::Polygon) => InteractionState::PlacingPolygon,
            Some(CurveType::CubicCurve) => InteractionState::PlacingCurve,
            None => InteractionState::Idle,
        };
    }

    fn anchor(&self, point: Point) -> Vertex {
        Vertex::anchor(point, self.style.radius, self.style.color)
    }

    fn lasso_vertex(&self, point: Point) -> Vertex {
        Vertex::anchor(point, self.style.lasso_radius, self.style.lasso_color)
    }

    fn place_polygon_vertex(&mut self, store: &mut RegionStore, point: Point) -> Outcome {
        let vertex = self.anchor(point);
        let index = store.len().saturating_sub(1);
        match store.last_mut().filter(|r| !r.is_closed()) {
            Some(region) => {
                let closing = region.can_close() && region.hits_first_vertex(point);
                // The closing click still leaves its vertex behind.
                region.push_vertex(vertex);
                if closing {
                    region.close();
                    self.state = InteractionState::Idle;
                    log::debug!("Closed polygon region {index} with {} vertices", region.len());
                    return Outcome::RegionClosed(index);
                }
            }
            None => {
                let mut region = Region::new(CurveType::Polygon);
                region.push_vertex(vertex);
                let index = store.push(region);
                log::debug!("Started polygon region {index}");
            }
        }
        self.state = InteractionState::PlacingPolygon;
        Outcome::VertexPlaced
    }

    fn place_curve_anchor(&mut self, store: &mut RegionStore, point: Point) -> Outcome {
        let anchor = self.anchor(point);
        let control_color = self.style.control_color;
        let index = store.len().saturating_sub(1);
        match store.last_mut().filter(|r| !r.is_closed()) {
            Some(region) => {
                let completed = region.append_curve_anchor(anchor, control_color);
                if completed && region.last_anchor_meets_first() {
                    region.close();
                    self.state = InteractionState::Idle;
                    log::debug!("Closed curve region {index} with {} segments", region.segments().len());
                    return Outcome::RegionClosed(index);
                }
            }
            None => {
                let mut region = Region::new(CurveType::CubicCurve);
                region.append_curve_anchor(anchor, control_color);
                let index = store.push(region);
                log::debug!("Started curve region {index}");
            }
        }
        self.state = InteractionState::PlacingCurve;
        Outcome::VertexPlaced
    }
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(VertexStyle::default(), geometry::DEFAULT_CURVE_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::VertexKind;

    fn click(interaction: &mut Interaction, store: &mut RegionStore, x: f64, y: f64) -> Outcome {
        let p = Point::new(x, y);
        let outcome = interaction.pointer_down(store, p, p, MouseButton::Left);
        interaction.pointer_up(store);
        outcome
    }

    fn closed_square(interaction: &mut Interaction, store: &mut RegionStore) {
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            assert_eq!(click(interaction, store, x, y), Outcome::VertexPlaced);
        }
        assert_eq!(click(interaction, store, 1.0, 1.0), Outcome::RegionClosed(0));
    }

    #[test]
    fn test_close_polygon() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        closed_square(&mut interaction, &mut store);

        let region = store.get(0).unwrap();
        assert!(region.is_closed());
        // The closing vertex is kept.
        assert_eq!(region.len(), 5);
        assert_eq!(interaction.state(), InteractionState::Idle);
    }

    #[test]
    fn test_closed_polygon_takes_no_more_vertices() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        closed_square(&mut interaction, &mut store);

        // Outside every region: starts a new region instead.
        assert_eq!(click(&mut interaction, &mut store, 50.0, 50.0), Outcome::VertexPlaced);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().len(), 5);
        assert_eq!(store.get(1).unwrap().len(), 1);
    }

    #[test]
    fn test_single_vertex_does_not_close() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        click(&mut interaction, &mut store, 0.0, 0.0);
        assert_eq!(click(&mut interaction, &mut store, 1.0, 0.0), Outcome::VertexPlaced);
        assert!(!store.get(0).unwrap().is_closed());
        assert_eq!(interaction.state(), InteractionState::PlacingPolygon);
    }

    #[test]
    fn test_open_region_click_never_selects() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        closed_square(&mut interaction, &mut store);
        click(&mut interaction, &mut store, 50.0, 50.0);

        // Inside region 0, but region 1 is open so the click appends.
        assert_eq!(click(&mut interaction, &mut store, 5.0, 5.0), Outcome::VertexPlaced);
        assert_eq!(store.get(1).unwrap().len(), 2);
    }

    #[test]
    fn test_vertex_hit_beats_region_hit() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        closed_square(&mut interaction, &mut store);

        let p = Point::new(10.0, 10.0);
        assert_eq!(
            interaction.pointer_down(&mut store, p, p, MouseButton::Left),
            Outcome::DragStarted
        );
        assert_eq!(
            interaction.selection(),
            Selection {
                region: Some(0),
                vertex: Some(2)
            }
        );
    }

    #[test]
    fn test_drag_vertex() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        closed_square(&mut interaction, &mut store);

        let p = Point::new(10.0, 10.0);
        interaction.pointer_down(&mut store, p, p, MouseButton::Left);
        let q = Point::new(13.0, 14.0);
        assert_eq!(interaction.pointer_move(&mut store, q, q), Outcome::Dragged);
        let r = Point::new(15.0, 14.0);
        interaction.pointer_move(&mut store, r, r);
        assert_eq!(store.get(0).unwrap().vertices()[2].position, Point::new(15.0, 14.0));
        assert_eq!(store.get(0).unwrap().vertices()[1].position, Point::new(10.0, 0.0));

        assert_eq!(interaction.pointer_up(&mut store), Outcome::DragEnded);
        assert_eq!(interaction.selection(), Selection::default());
    }

    #[test]
    fn test_drag_region() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        closed_square(&mut interaction, &mut store);

        let p = Point::new(5.0, 5.0);
        assert_eq!(
            interaction.pointer_down(&mut store, p, p, MouseButton::Left),
            Outcome::DragStarted
        );
        assert_eq!(interaction.selection().vertex, None);
        let q = Point::new(25.0, 5.0);
        interaction.pointer_move(&mut store, q, q);
        let positions: Vec<Point> = store.get(0).unwrap().vertices().iter().map(|v| v.position).collect();
        assert_eq!(positions[0], Point::new(20.0, 0.0));
        assert_eq!(positions[2], Point::new(30.0, 10.0));
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        closed_square(&mut interaction, &mut store);
        let q = Point::new(25.0, 5.0);
        assert_eq!(interaction.pointer_move(&mut store, q, q), Outcome::Ignored);
    }

    #[test]
    fn test_curve_placement_and_close() {
        let mut interaction = Interaction::default();
        interaction.set_mode(DrawMode::Curve);
        let mut store = RegionStore::new();

        click(&mut interaction, &mut store, 0.0, 0.0);
        assert_eq!(interaction.state(), InteractionState::PlacingCurve);
        click(&mut interaction, &mut store, 40.0, 0.0);
        click(&mut interaction, &mut store, 40.0, 40.0);
        assert_eq!(store.get(0).unwrap().len(), 7);
        assert_eq!(click(&mut interaction, &mut store, 2.0, 2.0), Outcome::RegionClosed(0));

        let region = store.get(0).unwrap();
        assert!(region.is_closed());
        assert_eq!(region.len(), 10);
        assert_eq!(region.vertices()[8].kind, VertexKind::Control);
        assert_eq!(region.vertices()[9].kind, VertexKind::Anchor);
        assert_eq!(interaction.state(), InteractionState::Idle);
    }

    #[test]
    fn test_curve_first_segment_can_close() {
        let mut interaction = Interaction::default();
        interaction.set_mode(DrawMode::Curve);
        let mut store = RegionStore::new();
        click(&mut interaction, &mut store, 0.0, 0.0);
        // Ending the first segment on top of the first anchor closes a one-segment loop.
        assert_eq!(click(&mut interaction, &mut store, 1.0, 0.0), Outcome::RegionClosed(0));
    }

    #[test]
    fn test_lasso() {
        let mut interaction = Interaction::default();
        interaction.set_mode(DrawMode::Lasso);
        let mut store = RegionStore::new();

        let start = Point::new(0.0, 0.0);
        interaction.pointer_down(&mut store, start, start, MouseButton::Left);
        for p in [Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)] {
            assert_eq!(interaction.pointer_move(&mut store, p, p), Outcome::VertexPlaced);
        }
        assert_eq!(
            interaction.pointer_up(&mut store),
            Outcome::LassoFinished { closed: true }
        );
        let region = store.get(0).unwrap();
        assert!(region.is_closed());
        assert_eq!(region.len(), 4);
        assert!((region.vertices()[0].radius - 2.0).abs() < f64::EPSILON);
        assert_eq!(interaction.state(), InteractionState::Idle);
    }

    #[test]
    fn test_lasso_tap_is_dropped() {
        let mut interaction = Interaction::default();
        interaction.set_mode(DrawMode::Lasso);
        let mut store = RegionStore::new();
        let p = Point::new(3.0, 3.0);
        interaction.pointer_down(&mut store, p, p, MouseButton::Left);
        assert_eq!(
            interaction.pointer_up(&mut store),
            Outcome::LassoFinished { closed: false }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_panning_returns_to_placing() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        click(&mut interaction, &mut store, 0.0, 0.0);

        let d = Point::new(100.0, 100.0);
        interaction.pointer_down(&mut store, d, d, MouseButton::Middle);
        let e = Point::new(90.0, 95.0);
        assert_eq!(
            interaction.pointer_move(&mut store, e, e),
            Outcome::Pan(Vec2::new(-10.0, -5.0))
        );
        assert_eq!(interaction.pointer_up(&mut store), Outcome::PanEnded);
        assert_eq!(interaction.state(), InteractionState::PlacingPolygon);
        assert_eq!(store.get(0).unwrap().len(), 1);
    }

    #[test]
    fn test_finish_open_region() {
        let mut interaction = Interaction::default();
        let mut store = RegionStore::new();
        click(&mut interaction, &mut store, 0.0, 0.0);
        assert!(interaction.finish_open_region(&mut store));
        // A single vertex cannot close, so the region is dropped.
        assert!(store.is_empty());

        click(&mut interaction, &mut store, 0.0, 0.0);
        click(&mut interaction, &mut store, 20.0, 0.0);
        assert!(interaction.finish_open_region(&mut store));
        assert!(store.get(0).unwrap().is_closed());
        assert!(!interaction.finish_open_region(&mut store));
    }
}
