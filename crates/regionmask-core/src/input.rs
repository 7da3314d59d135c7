//! Input events delivered by the host in device coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Pointer and wheel events in device (page) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { position: Point, button: MouseButton },
    PointerMove { position: Point },
    PointerUp { position: Point },
    Wheel { delta_y: f64 },
}

impl InputEvent {
    /// Device position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerDown { position, .. }
            | InputEvent::PointerMove { position }
            | InputEvent::PointerUp { position } => Some(*position),
            InputEvent::Wheel { .. } => None,
        }
    }
}
