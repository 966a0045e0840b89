use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use stackscroll_core::models::{Article, User};
use stackscroll_core::nav::Route;
use stackscroll_core::store::StoreResult;
use stackscroll_core::task::TaskId;

use super::{ComposeField, ComposeState};
use crate::common::FeatureUpdate;
use crate::common::text_input;
use crate::effects::UiEffect;

pub fn handle_key(compose: &mut ComposeState, key: KeyEvent, user: Option<&User>) -> FeatureUpdate {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => FeatureUpdate::navigate(Route::Listing),
        KeyCode::Tab | KeyCode::BackTab => {
            compose.toggle_focus();
            FeatureUpdate::none()
        }
        KeyCode::Char('s') if ctrl => publish(compose, user),
        KeyCode::Enter if compose.focus == ComposeField::Title => {
            compose.focus = ComposeField::Body;
            FeatureUpdate::none()
        }
        _ => {
            if compose.vm.is_publishing() {
                return FeatureUpdate::none();
            }
            let edited = match compose.focus {
                ComposeField::Title => text_input::handle_key(
                    &mut compose.vm.title,
                    &mut compose.title_cursor,
                    key,
                    false,
                ),
                ComposeField::Body => text_input::handle_key(
                    &mut compose.vm.body,
                    &mut compose.body_cursor,
                    key,
                    true,
                ),
            };
            if edited {
                compose.vm.clear_error();
            }
            FeatureUpdate::none()
        }
    }
}

pub fn handle_paste(compose: &mut ComposeState, text: &str) {
    if compose.vm.is_publishing() {
        return;
    }
    match compose.focus {
        ComposeField::Title => {
            text_input::insert_str(&mut compose.vm.title, &mut compose.title_cursor, text, false);
        }
        ComposeField::Body => {
            text_input::insert_str(&mut compose.vm.body, &mut compose.body_cursor, text, true);
        }
    }
}

fn publish(compose: &mut ComposeState, user: Option<&User>) -> FeatureUpdate {
    match compose.vm.begin_publish(user) {
        Ok(Some(request)) => FeatureUpdate::effect(UiEffect::Publish { request }),
        // Already publishing, or rejected with the error kept on the view-model.
        Ok(None) | Err(_) => FeatureUpdate::none(),
    }
}

/// Applies an insert result; success moves on to the listing.
pub fn handle_published(
    compose: &mut ComposeState,
    task: TaskId,
    result: StoreResult<Article>,
) -> FeatureUpdate {
    match compose.vm.finish_publish(task, result) {
        Some(Ok(_)) => {
            compose.reset_editor();
            FeatureUpdate::navigate(Route::Listing)
        }
        Some(Err(_)) | None => FeatureUpdate::none(),
    }
}
