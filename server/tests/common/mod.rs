#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use commune_server::config::{Config, MIN_BCRYPT_COST};
use commune_server::routes::create_routes;
use commune_server::state::AppState;
use commune_server::store::{MemoryStore, Store};

pub struct TestApp {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    /// `name=value` from Set-Cookie; `Some("")` when the cookie was cleared.
    pub cookie: Option<String>,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn titles(&self, field: &str) -> Vec<String> {
        self.data()[field]
            .as_array()
            .map(|events| {
                events
                    .iter()
                    .filter_map(|e| e["title"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn assert_redirect_home(&self) {
        assert_eq!(self.status, StatusCode::SEE_OTHER);
        assert_eq!(self.location.as_deref(), Some("/home"));
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let config = Config {
            bcrypt_cost: MIN_BCRYPT_COST,
            ..Config::default()
        };
        let state = AppState::new(store, &config);
        Self {
            router: create_routes(state, &config),
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder().method(Method::GET).uri(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let body = serde_urlencoded::to_string(form).unwrap();
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| {
                let pair = v.to_str().unwrap().split(';').next().unwrap_or_default();
                match pair.split_once('=') {
                    Some((_, "")) | None => String::new(),
                    Some(_) => pair.to_string(),
                }
            });

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            location,
            cookie,
            body,
        }
    }

    /// Registers a volunteer and returns its session cookie.
    pub async fn volunteer(&self, username: &str) -> String {
        let response = self
            .post(
                "/register_volunteer",
                &[("user", username), ("pass", "secret")],
                None,
            )
            .await;
        response.assert_redirect_home();
        response.cookie.expect("session cookie")
    }

    /// Registers an organization and returns its session cookie.
    pub async fn organization(&self, username: &str, display_name: &str) -> String {
        let response = self
            .post(
                "/register_organization",
                &[
                    ("user", username),
                    ("pass", "secret"),
                    ("displayName", display_name),
                ],
                None,
            )
            .await;
        response.assert_redirect_home();
        response.cookie.expect("session cookie")
    }

    pub async fn create_event(
        &self,
        cookie: &str,
        title: &str,
        start: &str,
        end: &str,
    ) -> TestResponse {
        self.post(
            "/create",
            &[
                ("title", title),
                ("desc", "Bring gloves"),
                ("start", start),
                ("end", end),
            ],
            Some(cookie),
        )
        .await
    }
}
