//! Listing key handling and store results.

use crossterm::event::{KeyCode, KeyEvent};
use stackscroll_core::models::{Article, User};
use stackscroll_core::share::share_link;
use stackscroll_core::store::StoreResult;
use stackscroll_core::task::TaskId;
use stackscroll_core::viewmodel::ListingViewModel;

use super::ListingState;
use crate::effects::UiEffect;

/// Starts a fetch. Called whenever the listing is entered or reloaded.
pub fn enter(listing: &mut ListingState) -> Vec<UiEffect> {
    let task = listing.vm.begin_load();
    vec![UiEffect::LoadArticles { task }]
}

pub fn handle_key(
    listing: &mut ListingState,
    key: KeyEvent,
    user: Option<&User>,
    share_origin: &str,
) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            listing.select_prev();
            vec![]
        }
        KeyCode::Down | KeyCode::Char('j') => {
            listing.select_next();
            vec![]
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(id) = listing.selected_article().map(|a| a.id.clone()) {
                listing.vm.toggle_expand(&id);
            }
            vec![]
        }
        KeyCode::Char('s') => {
            let Some(article) = listing.selected_article().cloned() else {
                return vec![];
            };
            match listing.vm.begin_share(&article, share_origin) {
                Ok(text) => vec![UiEffect::CopyToClipboard { text }],
                Err(_) => vec![],
            }
        }
        KeyCode::Char('o') => {
            let Some(article) = listing.selected_article() else {
                return vec![];
            };
            match share_link(share_origin, &article.id) {
                Ok(url) => vec![UiEffect::OpenBrowser {
                    url: url.to_string(),
                }],
                Err(e) => {
                    tracing::warn!(error = %format!("{e:#}"), "Cannot open article link");
                    vec![]
                }
            }
        }
        KeyCode::Char('d') => {
            let Some(article) = listing.selected_article() else {
                return vec![];
            };
            if listing.vm.deleting().is_none() && ListingViewModel::can_delete(article, user) {
                listing.confirm_delete = Some(article.id.clone());
            }
            vec![]
        }
        KeyCode::Char('r') => enter(listing),
        KeyCode::Esc => {
            listing.vm.dismiss_feedback();
            vec![]
        }
        _ => vec![],
    }
}

/// Keys while the delete confirmation is open.
pub fn handle_confirm_key(
    listing: &mut ListingState,
    key: KeyEvent,
    user: Option<&User>,
) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('y' | 'Y') => {
            let Some(id) = listing.confirm_delete.take() else {
                return vec![];
            };
            let Some(article) = listing.vm.article(&id).cloned() else {
                return vec![];
            };
            confirm_delete(listing, &article, user)
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            listing.confirm_delete = None;
            vec![]
        }
        _ => vec![],
    }
}

fn confirm_delete(
    listing: &mut ListingState,
    article: &Article,
    user: Option<&User>,
) -> Vec<UiEffect> {
    match listing.vm.begin_delete(article, user) {
        Ok(request) => vec![UiEffect::DeleteArticle { request }],
        Err(_) => vec![],
    }
}

pub fn handle_loaded(listing: &mut ListingState, task: TaskId, result: StoreResult<Vec<Article>>) {
    if listing.vm.finish_load(task, result) {
        listing.clamp_selection();
    }
}

/// Applies a delete result; a successful delete reloads the listing.
pub fn handle_deleted(
    listing: &mut ListingState,
    task: TaskId,
    result: StoreResult<()>,
) -> Vec<UiEffect> {
    if listing.vm.finish_delete(task, result) {
        enter(listing)
    } else {
        vec![]
    }
}

pub fn handle_copied(listing: &mut ListingState, result: anyhow::Result<()>) {
    // Feedback is kept on the view-model for rendering.
    let _ = listing.vm.finish_share(result);
}
