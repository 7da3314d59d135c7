//! Recorded editing sessions.
//!
//! A session names the background image, optional extra layers, the output
//! path, and the input to replay. Relative paths are resolved against the
//! session file's directory.

use crate::error::AppResult;
use regionmask_core::{DrawMode, EditorConfig, MouseButton};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One recorded step: device input, elapsed time or a host operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SessionEvent {
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up {
        x: f64,
        y: f64,
    },
    Wheel {
        delta_y: f64,
    },
    /// Advance the replay clock.
    Wait {
        ms: u64,
    },
    StartRegion {
        mode: DrawMode,
    },
    DeleteRegion {
        index: usize,
    },
    Undo,
    Redo,
    Reset,
    Zoom {
        delta: f64,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
    PickLayer {
        x: f64,
        y: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub config: EditorConfig,
    pub background: PathBuf,
    #[serde(default)]
    pub layers: Vec<PathBuf>,
    /// Masked PNG output.
    pub output: PathBuf,
    /// Optional text file receiving the export as a data URL.
    #[serde(default)]
    pub data_url: Option<PathBuf>,
    /// Page position of the canvas element.
    #[serde(default)]
    pub origin: Option<(f64, f64)>,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a session file, resolving its relative paths.
    pub fn load(path: &Path) -> AppResult<Self> {
        let json = fs::read_to_string(path)?;
        let mut session = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            session.resolve_paths(dir);
        }
        log::debug!(
            "Loaded session {} with {} events",
            path.display(),
            session.events.len()
        );
        Ok(session)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        resolve(&mut self.background);
        resolve(&mut self.output);
        for layer in &mut self.layers {
            resolve(layer);
        }
        if let Some(p) = self.data_url.as_mut() {
            resolve(p);
        }
    }
}
