use axum::http::{header, HeaderValue};
use axum::{routing::get, Router};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{accounts, events, health_check, home, root};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/home", get(home))
        .route("/health", get(health_check))
        .route("/logout", get(accounts::logout))
        .route("/login", get(accounts::login_portal))
        .route(
            "/login_volunteer",
            get(accounts::login_volunteer_page).post(accounts::login_volunteer),
        )
        .route(
            "/login_organization",
            get(accounts::login_organization_page).post(accounts::login_organization),
        )
        .route("/register", get(accounts::register_portal))
        .route(
            "/register_volunteer",
            get(accounts::register_volunteer_page).post(accounts::register_volunteer),
        )
        .route(
            "/register_organization",
            get(accounts::register_organization_page).post(accounts::register_organization),
        )
        .route(
            "/create",
            get(events::create_event_page).post(events::create_event),
        )
        .route(
            "/cancel",
            get(events::cancel_event_page).post(events::cancel_event),
        )
        .route(
            "/attend",
            get(events::attend_event_page).post(events::attend_event),
        )
        // pages depend on the session cookie
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(create_security_headers_layer(config))
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
