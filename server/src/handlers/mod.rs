use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

use crate::auth::Identity;
use crate::models::Account;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;
use crate::views::{event_views, HomeView, UserView};

pub mod accounts;
pub mod events;

pub const HOME_PATH: &str = "/home";

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "commune-events",
    };

    success(payload, "Health check successful")
}

pub(crate) fn redirect_home() -> Response {
    Redirect::to(HOME_PATH).into_response()
}

pub async fn root() -> Response {
    redirect_home()
}

/// Every event for everyone, plus what the caller hosts or attends.
pub async fn home(
    State(state): State<AppState>,
    Identity(account): Identity,
) -> AppResult<Response> {
    let events = state.store.list_events().await?;

    let mut view = HomeView {
        user: account.as_ref().map(UserView::from),
        events: event_views(&events),
        hosting: None,
        attending: None,
    };

    match &account {
        Some(Account::Organization(organization)) => {
            let hosting = state.store.list_hosted_events(organization.id).await?;
            view.hosting = Some(event_views(&hosting));
        }
        Some(Account::Volunteer(volunteer)) => {
            let attending = state.store.list_attending_events(volunteer.id).await?;
            view.attending = Some(event_views(&attending));
        }
        None => {}
    }

    Ok(success(view, "Events"))
}
