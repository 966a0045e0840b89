//! Compose feature slice: draft and publish an article.

mod render;
mod update;

pub use render::render_compose;
use stackscroll_core::viewmodel::ComposeViewModel;
pub use update::{handle_key, handle_paste, handle_published};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposeField {
    #[default]
    Title,
    Body,
}

#[derive(Debug, Default)]
pub struct ComposeState {
    pub vm: ComposeViewModel,
    pub focus: ComposeField,
    pub title_cursor: usize,
    pub body_cursor: usize,
}

impl ComposeState {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ComposeField::Title => ComposeField::Body,
            ComposeField::Body => ComposeField::Title,
        };
    }

    /// Resets the editor after the draft was published.
    pub fn reset_editor(&mut self) {
        self.focus = ComposeField::Title;
        self.title_cursor = 0;
        self.body_cursor = 0;
    }
}
