mod common;

use axum::http::StatusCode;
use common::TestApp;
use commune_server::models::{MAX_DISPLAY_NAME_LEN, MAX_USERNAME_LEN};

#[tokio::test]
async fn test_root_redirects_home() {
    let app = TestApp::new();
    app.get("/", None).await.assert_redirect_home();
}

#[tokio::test]
async fn test_registration_logs_the_volunteer_in() {
    let app = TestApp::new();
    let cookie = app.volunteer("sam").await;

    let home = app.get("/home", Some(&cookie)).await;
    assert_eq!(home.status, StatusCode::OK);
    assert_eq!(home.data()["user"]["username"], "sam");
    assert_eq!(home.data()["user"]["role"], "volunteer");
    assert_eq!(home.data()["attending"], serde_json::json!([]));
    assert!(home.data().get("hosting").is_none());
}

#[tokio::test]
async fn test_username_is_unique_across_roles() {
    let app = TestApp::new();
    app.volunteer("sam").await;

    let response = app
        .post(
            "/register_organization",
            &[("user", "sam"), ("pass", "pw"), ("displayName", "Sam's Shelter")],
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.data()["taken_failure"], true);
    assert_eq!(response.data()["blank_failure"], false);
    assert!(response.cookie.is_none());

    let again = app
        .post("/register_volunteer", &[("user", " sam "), ("pass", "pw")], None)
        .await;
    assert_eq!(again.data()["taken_failure"], true);
}

#[tokio::test]
async fn test_blank_fields_are_rejected() {
    let app = TestApp::new();

    for form in [
        vec![("user", ""), ("pass", "pw")],
        vec![("user", "   "), ("pass", "pw")],
        vec![("user", "sam"), ("pass", " \t ")],
        vec![("user", "sam")],
    ] {
        let response = app.post("/register_volunteer", &form, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.data()["blank_failure"], true);
        assert_eq!(response.data()["taken_failure"], false);
    }

    let response = app
        .post(
            "/register_organization",
            &[("user", "parks"), ("pass", "pw"), ("displayName", "  ")],
            None,
        )
        .await;
    assert_eq!(response.data()["blank_failure"], true);
}

#[tokio::test]
async fn test_blank_and_taken_are_reported_together() {
    let app = TestApp::new();
    app.volunteer("sam").await;

    let response = app
        .post("/register_volunteer", &[("user", "sam"), ("pass", "  ")], None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.data()["blank_failure"], true);
    assert_eq!(response.data()["taken_failure"], true);
}

#[tokio::test]
async fn test_login_with_correct_password() {
    let app = TestApp::new();
    app.organization("parks", "City Parks").await;

    let response = app
        .post(
            "/login_organization",
            &[("user", "parks"), ("pass", "secret")],
            None,
        )
        .await;
    response.assert_redirect_home();

    let cookie = response.cookie.expect("session cookie");
    let home = app.get("/home", Some(&cookie)).await;
    assert_eq!(home.data()["user"]["username"], "parks");
    assert_eq!(home.data()["user"]["role"], "organization");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.volunteer("sam").await;

    let wrong_password = app
        .post("/login_volunteer", &[("user", "sam"), ("pass", "nope")], None)
        .await;
    let unknown_user = app
        .post("/login_volunteer", &[("user", "nobody"), ("pass", "nope")], None)
        .await;

    assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password.status, unknown_user.status);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(wrong_password.data()["failure"], true);
    assert!(wrong_password.cookie.is_none());
}

#[tokio::test]
async fn test_login_is_role_specific() {
    let app = TestApp::new();
    app.volunteer("sam").await;

    let response = app
        .post("/login_organization", &[("user", "sam"), ("pass", "secret")], None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.data()["failure"], true);
}

#[tokio::test]
async fn test_logged_in_users_skip_login_and_register_pages() {
    let app = TestApp::new();
    let cookie = app.volunteer("sam").await;

    for path in [
        "/login",
        "/login_volunteer",
        "/login_organization",
        "/register",
        "/register_volunteer",
        "/register_organization",
    ] {
        app.get(path, Some(&cookie)).await.assert_redirect_home();
    }

    let response = app
        .post("/register_volunteer", &[("user", "other"), ("pass", "pw")], Some(&cookie))
        .await;
    response.assert_redirect_home();
    assert!(response.cookie.is_none());
}

#[tokio::test]
async fn test_portals_list_both_roles() {
    let app = TestApp::new();
    let login = app.get("/login", None).await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.data()["links"][0]["path"], "/login_volunteer");
    assert_eq!(login.data()["links"][1]["path"], "/login_organization");

    let register = app.get("/register", None).await;
    assert_eq!(register.data()["links"][1]["role"], "organization");
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let app = TestApp::new();
    let cookie = app.volunteer("sam").await;

    let response = app.get("/logout", Some(&cookie)).await;
    response.assert_redirect_home();
    assert_eq!(response.cookie.as_deref(), Some(""));

    let home = app.get("/home", None).await;
    assert!(home.data()["user"].is_null());
}

#[tokio::test]
async fn test_forged_session_cookie_is_anonymous() {
    let app = TestApp::new();
    let cookie = app.volunteer("sam").await;
    let (name, _) = cookie.split_once('=').unwrap();

    let forged = format!("{name}=volunteer:00000000-0000-0000-0000-000000000000");
    let home = app.get("/home", Some(&forged)).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.data()["user"].is_null());
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
}

#[tokio::test]
async fn test_overlong_registration_fields_are_rejected() {
    let app = TestApp::new();
    let username = "s".repeat(MAX_USERNAME_LEN + 1);

    let response = app
        .post(
            "/register_volunteer",
            &[("user", username.as_str()), ("pass", "secret")],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.data()["too_long_failure"], true);
    assert_eq!(response.data()["blank_failure"], false);
    assert!(response.cookie.is_none());

    let display_name = "p".repeat(MAX_DISPLAY_NAME_LEN + 1);
    let response = app
        .post(
            "/register_organization",
            &[
                ("user", "parks"),
                ("pass", "secret"),
                ("displayName", display_name.as_str()),
            ],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.data()["too_long_failure"], true);

    app.volunteer(&"s".repeat(MAX_USERNAME_LEN)).await;
}
