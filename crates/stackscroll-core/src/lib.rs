//! Core StackScroll library (config, store clients, session, view-models).

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod nav;
pub mod session;
pub mod share;
pub mod store;
pub mod task;
pub mod viewmodel;
