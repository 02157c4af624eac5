use anyhow::{Context, Result, anyhow};
use druid::Point;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::surface::BoxRect;

pub const STATE_FILE_NAME: &str = "boxdraw_state.json";

/// One committed box as it sits in the state bundle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedBox {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl From<&BoxRect> for SavedBox {
    fn from(b: &BoxRect) -> Self {
        SavedBox {
            start: (b.start.x, b.start.y),
            end: (b.end.x, b.end.y),
        }
    }
}

impl From<SavedBox> for BoxRect {
    fn from(b: SavedBox) -> Self {
        BoxRect {
            start: Point::new(b.start.0, b.start.1),
            end: Point::new(b.end.0, b.end.1),
        }
    }
}

/// The state bundle round-tripped across restarts: the surface's view
/// identifier plus the committed geometry. `boxes` defaults so a bundle
/// written by an identifier-only build still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub view_id: u32,
    #[serde(default)]
    pub boxes: Vec<SavedBox>,
}

pub fn state_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(STATE_FILE_NAME))
}

pub fn resolve_state_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    state_path_from_exe_path(&exe_path)
}

/// Read the state bundle. A missing file is not an error, just no state.
pub fn load(path: &Path) -> Result<Option<SavedState>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read state file {}", path.display()))?;
    let state: SavedState = serde_json::from_str(&content)
        .with_context(|| format!("deserialize state file {}", path.display()))?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &SavedState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create state folder {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(state).context("serialize drawing state")?;
    std::fs::write(path, json).with_context(|| format!("write state file {}", path.display()))
}
