//! Listing feature slice: article cards, expand, share, delete.

pub mod markdown;
mod render;
mod update;

pub use render::render_listing;
use stackscroll_core::models::{Article, ArticleId};
use stackscroll_core::viewmodel::ListingViewModel;
pub use update::{
    enter, handle_confirm_key, handle_copied, handle_deleted, handle_key, handle_loaded,
};

#[derive(Debug, Default)]
pub struct ListingState {
    pub vm: ListingViewModel,
    /// Index of the highlighted card.
    pub selected: usize,
    /// Article awaiting a y/n answer before it is deleted.
    pub confirm_delete: Option<ArticleId>,
}

impl ListingState {
    pub fn selected_article(&self) -> Option<&Article> {
        self.vm.articles().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.vm.articles().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keeps the selection inside the list after a reload.
    pub fn clamp_selection(&mut self) {
        let len = self.vm.articles().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
