//! Integration tests for `login`, `logout` and `whoami`.


use backend::{can_bind_localhost, stackscroll, token_body, write_session};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_persists_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_json(json!({ "email": "a@b.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u-1", "a@b.com")))
        .expect(1)
        .mount(&server)
        .await;

    stackscroll(&home, &server)
        .args(["login", "--email", "a@b.com"])
        .write_stdin("hunter22\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as a@b.com"));

    let saved = std::fs::read_to_string(home.path().join("session.json")).unwrap();
    assert!(saved.contains("fresh-access"));
}

#[tokio::test]
async fn test_login_rejection_shows_generic_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    stackscroll(&home, &server)
        .args(["login", "--email", "a@b.com"])
        .write_stdin("wrong-password\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email or password"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_short_password_never_reaches_backend() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    stackscroll(&home, &server)
        .args(["signup", "--email", "a@b.com"])
        .write_stdin("abc\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 6 characters"));
}

#[tokio::test]
async fn test_whoami_reads_saved_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    stackscroll(&home, &server)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));

    write_session(&home, "u-1", "a@b.com");
    stackscroll(&home, &server)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("a@b.com (u-1)"));
}

#[tokio::test]
async fn test_logout_clears_saved_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_session(&home, "u-1", "a@b.com");

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer user-access"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    stackscroll(&home, &server)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    assert!(!home.path().join("session.json").exists());
}
