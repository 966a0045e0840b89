//! Pieces shared by the feature slices.

pub mod clipboard;
pub mod field;
pub mod overlay;
pub mod text_input;

pub use clipboard::TerminalClipboard;
use stackscroll_core::nav::Route;

use crate::effects::UiEffect;

/// What a feature handler asks of the app-level reducer.
///
/// Slices only touch their own state; navigation goes through the reducer
/// so the sign-in guard is always applied.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeatureUpdate {
    pub effects: Vec<UiEffect>,
    pub navigate: Option<Route>,
}

impl FeatureUpdate {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn effect(effect: UiEffect) -> Self {
        Self {
            effects: vec![effect],
            navigate: None,
        }
    }

    pub fn navigate(route: Route) -> Self {
        Self {
            effects: Vec::new(),
            navigate: Some(route),
        }
    }
}

impl From<Vec<UiEffect>> for FeatureUpdate {
    fn from(effects: Vec<UiEffect>) -> Self {
        Self {
            effects,
            navigate: None,
        }
    }
}

/// Spinner frames, advanced on each tick.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}
