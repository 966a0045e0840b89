use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use stackscroll_core::error::AppError;
use stackscroll_core::nav::Route;
use stackscroll_core::task::TaskId;
use stackscroll_core::viewmodel::{AuthMode, AuthOutcome};

use super::{AuthField, AuthState};
use crate::common::FeatureUpdate;
use crate::common::text_input;
use crate::effects::UiEffect;

pub fn handle_key(auth: &mut AuthState, key: KeyEvent) -> FeatureUpdate {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => FeatureUpdate::navigate(Route::Home),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            auth.toggle_focus();
            FeatureUpdate::none()
        }
        KeyCode::Char('t') if ctrl => {
            if !auth.vm.is_submitting() {
                auth.vm.toggle_mode();
            }
            FeatureUpdate::none()
        }
        KeyCode::Enter => match auth.vm.begin_submit() {
            Ok(Some(request)) => FeatureUpdate::effect(UiEffect::SubmitAuth { request }),
            Ok(None) | Err(_) => FeatureUpdate::none(),
        },
        _ => {
            if auth.vm.is_submitting() {
                return FeatureUpdate::none();
            }
            match auth.focus {
                AuthField::Email => {
                    text_input::handle_key(&mut auth.vm.email, &mut auth.email_cursor, key, false);
                }
                AuthField::Password => {
                    text_input::handle_key(
                        &mut auth.vm.password,
                        &mut auth.password_cursor,
                        key,
                        false,
                    );
                }
            }
            FeatureUpdate::none()
        }
    }
}

pub fn handle_paste(auth: &mut AuthState, text: &str) {
    if auth.vm.is_submitting() {
        return;
    }
    match auth.focus {
        AuthField::Email => {
            text_input::insert_str(&mut auth.vm.email, &mut auth.email_cursor, text.trim(), false);
        }
        AuthField::Password => {
            text_input::insert_str(&mut auth.vm.password, &mut auth.password_cursor, text, false);
        }
    }
}

/// Applies the session manager's answer to the form.
pub fn handle_finished(
    auth: &mut AuthState,
    task: TaskId,
    mode: AuthMode,
    result: Result<(), AppError>,
) -> Option<AuthOutcome> {
    let outcome = auth.vm.finish_submit(task, mode, result)?;
    if outcome != AuthOutcome::Failed {
        // The password was cleared by the view-model.
        auth.password_cursor = 0;
        auth.focus = AuthField::Password;
    }
    Some(outcome)
}
