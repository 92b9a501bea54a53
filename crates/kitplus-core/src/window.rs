//! Key window lookup over a snapshot of scenes and windows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivationState {
    #[default]
    Unattached,
    ForegroundActive,
    ForegroundInactive,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub id: u64,
    #[serde(default)]
    pub is_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowScene {
    pub activation_state: ActivationState,
    pub windows: Vec<Window>,
}

impl WindowScene {
    pub fn key_window(&self) -> Option<&Window> {
        self.windows.iter().find(|w| w.is_key)
    }
}

/// Key window of the first foreground-active scene.
///
/// Only that scene is consulted: if it has no key window the result is
/// `None` even when a later scene has one.
pub fn key_window(scenes: &[WindowScene]) -> Option<&Window> {
    scenes
        .iter()
        .find(|s| s.activation_state == ActivationState::ForegroundActive)
        .and_then(WindowScene::key_window)
}

/// First key window in a flat window list.
pub fn key_window_legacy(windows: &[Window]) -> Option<&Window> {
    windows.iter().find(|w| w.is_key)
}
