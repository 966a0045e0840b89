//! Auth feature slice: sign in and sign up.

mod render;
mod update;

pub use render::render_auth;
use stackscroll_core::viewmodel::AuthViewModel;
pub use update::{handle_finished, handle_key, handle_paste};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Default)]
pub struct AuthState {
    pub vm: AuthViewModel,
    pub focus: AuthField,
    pub email_cursor: usize,
    pub password_cursor: usize,
}

impl AuthState {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Email,
        };
    }
}
