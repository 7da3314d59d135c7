//! Stack of same-sized image layers over the canvas.

use crate::error::{EditorError, EditorResult};
use crate::export::PixelBuffer;
use kurbo::Point;

/// Image layers, bottom (index 0) to top.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<PixelBuffer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Canvas size, fixed by the first layer.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.layers.first().map(|l| (l.width(), l.height()))
    }

    pub fn get(&self, index: usize) -> Option<&PixelBuffer> {
        self.layers.get(index)
    }

    /// Push a layer on top. Every layer must match the first one's size.
    pub fn push(&mut self, layer: PixelBuffer) -> EditorResult<usize> {
        if let Some(expected) = self.size() {
            let actual = (layer.width(), layer.height());
            if actual != expected {
                return Err(EditorError::LayerSize { expected, actual });
            }
        }
        self.layers.push(layer);
        Ok(self.layers.len() - 1)
    }

    /// Replace the bottom layer, or push it onto an empty stack.
    pub fn set_background(&mut self, layer: PixelBuffer) -> EditorResult<()> {
        let actual = (layer.width(), layer.height());
        if let Some(expected) = self.layers.get(1).map(|l| (l.width(), l.height())) {
            if actual != expected {
                return Err(EditorError::LayerSize { expected, actual });
            }
        }
        match self.layers.first_mut() {
            Some(bottom) => *bottom = layer,
            None => self.layers.push(layer),
        }
        Ok(())
    }

    /// Topmost layer that is not transparent at `point` (content coordinates).
    pub fn pick(&self, point: Point) -> Option<usize> {
        self.layers
            .iter()
            .rposition(|layer| layer.alpha_at(point).is_some_and(|a| a > 0))
    }

    /// Flatten all layers, bottom to top.
    pub fn composite(&self) -> Option<PixelBuffer> {
        let (bottom, rest) = self.layers.split_first()?;
        let mut out = bottom.clone();
        for layer in rest {
            out.composite_over(layer);
        }
        Some(out)
    }
}
