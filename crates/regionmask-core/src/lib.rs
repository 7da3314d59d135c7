//! RegionMask Core Library
//!
//! Platform-agnostic region annotation engine: the vertex/region data model,
//! hit-testing, the pointer-driven interaction state machine, bounded undo
//! history and the viewport transform. Pixels are only touched when a region
//! set is exported as an alpha-masked image.

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod layers;
pub mod region;
pub mod render;
pub mod viewport;

pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use export::PixelBuffer;
pub use history::{Debouncer, History};
pub use input::{InputEvent, MouseButton};
pub use interaction::{DrawMode, InteractionState, Selection};
pub use layers::LayerStack;
pub use region::{CurveType, Region, RegionId, RegionStore, SerializableColor, Vertex, VertexKind};
pub use render::{DrawCommand, RecordingRenderer, Renderer};
pub use viewport::{Minimap, Viewport};
