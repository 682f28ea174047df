use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{CurrentOrganization, CurrentVolunteer};
use crate::handlers::redirect_home;
use crate::models::event::parse_event_time;
use crate::models::{exceeds, NewEvent, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{page, success};
use crate::views::{CreateEventView, EventChoiceView};

pub const TITLE_MISSING: &str = "Event must have a title";
pub const TITLE_TAKEN: &str = "This event title is already taken";
pub const TITLE_TOO_LONG: &str = "Event title must be at most 120 characters";
pub const DATES_MISSING: &str = "Event must have a start and end date";
pub const DATES_MALFORMED: &str = "Event dates must use the format YYYY-MM-DDTHH:MM";
pub const END_BEFORE_START: &str = "End date must be after start date";
pub const DESCRIPTION_TOO_LONG: &str = "Event description must be at most 255 characters";

/// Status, inline error and flash message for a re-rendered choice page.
type Outcome = (StatusCode, Option<String>, Option<String>);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub desc: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TitleForm {
    pub title: String,
}

/// Parses and orders the event window.
fn event_window(start: &str, end: &str) -> Result<(NaiveDateTime, NaiveDateTime), &'static str> {
    if start.trim().is_empty() || end.trim().is_empty() {
        return Err(DATES_MISSING);
    }
    let (Some(start), Some(end)) = (parse_event_time(start), parse_event_time(end)) else {
        return Err(DATES_MALFORMED);
    };
    if start >= end {
        return Err(END_BEFORE_START);
    }
    Ok((start, end))
}

fn create_failed(errors: Vec<String>) -> Response {
    page(
        StatusCode::BAD_REQUEST,
        CreateEventView { errors },
        Some("Event could not be created".to_string()),
    )
}

pub async fn create_event_page(CurrentOrganization(_): CurrentOrganization) -> Response {
    success(CreateEventView { errors: Vec::new() }, "Create an event")
}

pub async fn create_event(
    State(state): State<AppState>,
    CurrentOrganization(organization): CurrentOrganization,
    Form(form): Form<EventForm>,
) -> AppResult<Response> {
    let mut errors = Vec::new();

    let title = form.title.trim();
    if title.is_empty() {
        errors.push(TITLE_MISSING.to_string());
    } else if exceeds(title, MAX_TITLE_LEN) {
        errors.push(TITLE_TOO_LONG.to_string());
    } else if state.store.find_event_by_title(title).await?.is_some() {
        errors.push(TITLE_TAKEN.to_string());
    }

    let window = event_window(&form.start, &form.end);
    if let Err(message) = window {
        errors.push(message.to_string());
    }

    let description = form.desc.trim();
    if exceeds(description, MAX_DESCRIPTION_LEN) {
        errors.push(DESCRIPTION_TOO_LONG.to_string());
    }

    let (start_time, end_time) = match window {
        Ok(window) if errors.is_empty() => window,
        _ => return Ok(create_failed(errors)),
    };

    let new_event = NewEvent {
        title: title.to_string(),
        description: description.to_string(),
        start_time,
        end_time,
        host_id: organization.id,
        host_name: organization.display_name.clone(),
    };

    match state.store.create_event(new_event).await {
        Ok(event) => {
            info!(
                title = %event.title,
                host = %organization.username,
                start = %event.start_time,
                "Event created"
            );
            Ok(redirect_home())
        }
        Err(AppError::Conflict(_)) => Ok(create_failed(vec![TITLE_TAKEN.to_string()])),
        Err(e) => Err(e),
    }
}

pub async fn cancel_event_page(
    State(state): State<AppState>,
    CurrentOrganization(organization): CurrentOrganization,
) -> AppResult<Response> {
    let hosting = state.store.list_hosted_events(organization.id).await?;
    Ok(success(
        EventChoiceView::new(&hosting, None),
        "Choose an event to cancel",
    ))
}

/// Only the hosting organization may cancel; attendance goes with the event.
pub async fn cancel_event(
    State(state): State<AppState>,
    CurrentOrganization(organization): CurrentOrganization,
    Form(form): Form<TitleForm>,
) -> AppResult<Response> {
    let title = form.title.trim();
    let not_found = || -> Outcome {
        (
            StatusCode::NOT_FOUND,
            Some(format!("Event '{title}' does not exist")),
            None,
        )
    };

    let (status, error, message): Outcome = match state.store.find_event_by_title(title).await? {
        None => not_found(),
        Some(event) if event.host_id != organization.id => {
            warn!(
                title = %event.title,
                requester = %organization.username,
                "Refused to cancel an event hosted by another organization"
            );
            (
                StatusCode::FORBIDDEN,
                Some(format!("Event '{title}' is hosted by another organization")),
                None,
            )
        }
        Some(event) => {
            if state.store.delete_event(event.id).await? {
                info!(title = %event.title, host = %organization.username, "Event cancelled");
                (StatusCode::OK, None, Some(format!("Cancelled '{title}'")))
            } else {
                not_found()
            }
        }
    };

    let hosting = state.store.list_hosted_events(organization.id).await?;
    Ok(page(status, EventChoiceView::new(&hosting, error), message))
}

pub async fn attend_event_page(
    State(state): State<AppState>,
    CurrentVolunteer(_): CurrentVolunteer,
) -> AppResult<Response> {
    let events = state.store.list_events().await?;
    Ok(success(
        EventChoiceView::new(&events, None),
        "Choose an event to attend",
    ))
}

/// Attending is idempotent: a repeat submission leaves one attendance.
pub async fn attend_event(
    State(state): State<AppState>,
    CurrentVolunteer(volunteer): CurrentVolunteer,
    Form(form): Form<TitleForm>,
) -> AppResult<Response> {
    let title = form.title.trim();
    let not_found = || -> Outcome {
        (
            StatusCode::NOT_FOUND,
            Some(format!(
                "You may not attend an event that does not exist ('{title}'). \
                 Please check your spelling"
            )),
            None,
        )
    };

    let (status, error, message): Outcome = match state.store.find_event_by_title(title).await? {
        None => not_found(),
        Some(event) => match state.store.add_attendee(event.id, volunteer.id).await {
            Ok(true) => {
                info!(title = %event.title, volunteer = %volunteer.username, "Attendance added");
                (StatusCode::OK, None, Some(format!("Now attending '{title}'")))
            }
            Ok(false) => (StatusCode::OK, None, Some(format!("Already attending '{title}'"))),
            // cancelled between lookup and insert
            Err(AppError::NotFound(_)) => not_found(),
            Err(e) => return Err(e),
        },
    };

    let events = state.store.list_events().await?;
    Ok(page(status, EventChoiceView::new(&events, error), message))
}
