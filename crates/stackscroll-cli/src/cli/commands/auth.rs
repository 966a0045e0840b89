//! Account command handlers.

use anyhow::{Context, Result, bail};
use stackscroll_core::config::Config;
use stackscroll_core::error::messages;
use stackscroll_core::viewmodel::{AuthMode, AuthOutcome, AuthViewModel};

use super::{Backend, read_password};

pub async fn login(config: &Config, email: &str) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let outcome = submit(&backend, AuthMode::SignIn, email).await?;
    match outcome {
        AuthOutcome::SignedIn => {
            let who = backend
                .session
                .current_user()
                .and_then(|user| user.email)
                .unwrap_or_else(|| email.to_string());
            println!("Signed in as {who}");
            Ok(())
        }
        other => bail!("Unexpected sign-in outcome: {other:?}"),
    }
}

pub async fn signup(config: &Config, email: &str) -> Result<()> {
    let backend = Backend::connect(config).await?;
    submit(&backend, AuthMode::SignUp, email).await?;
    println!("{}", messages::SIGN_UP_PENDING);
    Ok(())
}

async fn submit(backend: &Backend, mode: AuthMode, email: &str) -> Result<AuthOutcome> {
    let mut vm = AuthViewModel::new();
    vm.set_mode(mode);
    vm.email = email.to_string();
    vm.password = read_password()?;

    let outcome = vm
        .submit(&backend.session)
        .await?
        .context("submission did not run")?;
    if outcome == AuthOutcome::Failed {
        let message = vm
            .error()
            .map_or_else(|| "Authentication failed.".to_string(), |e| e.message.clone());
        bail!(message);
    }
    Ok(outcome)
}

pub async fn logout(config: &Config) -> Result<()> {
    let backend = Backend::connect(config).await?;
    if backend.session.current_user().is_none() {
        println!("Not signed in.");
        return Ok(());
    }
    backend.session.sign_out().await?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let backend = Backend::connect(config).await?;
    match backend.session.current_user() {
        Some(user) => match user.email {
            Some(email) => println!("{email} ({})", user.id),
            None => println!("{}", user.id),
        },
        None => println!("Not signed in."),
    }
    Ok(())
}
