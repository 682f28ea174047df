//! View models: the data each page hands to its template.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{Account, Event, Role};

#[derive(Debug, Serialize)]
pub struct EventView {
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub host_name: String,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            host_name: event.host_name.clone(),
        }
    }
}

pub fn event_views(events: &[Event]) -> Vec<EventView> {
    events.iter().map(EventView::from).collect()
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub username: String,
    pub role: Role,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username().to_string(),
            role: account.role(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub user: Option<UserView>,
    pub events: Vec<EventView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting: Option<Vec<EventView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attending: Option<Vec<EventView>>,
}

#[derive(Debug, Serialize)]
pub struct PortalLink {
    pub role: Role,
    pub path: &'static str,
}

/// `/login` and `/register` landing pages.
#[derive(Debug, Serialize)]
pub struct PortalView {
    pub links: Vec<PortalLink>,
}

impl PortalView {
    pub fn login() -> Self {
        Self {
            links: vec![
                PortalLink {
                    role: Role::Volunteer,
                    path: "/login_volunteer",
                },
                PortalLink {
                    role: Role::Organization,
                    path: "/login_organization",
                },
            ],
        }
    }

    pub fn register() -> Self {
        Self {
            links: vec![
                PortalLink {
                    role: Role::Volunteer,
                    path: "/register_volunteer",
                },
                PortalLink {
                    role: Role::Organization,
                    path: "/register_organization",
                },
            ],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub role: Role,
    pub failure: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterView {
    pub role: Role,
    pub blank_failure: bool,
    pub taken_failure: bool,
    /// Username or display name is wider than its column.
    pub too_long_failure: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateEventView {
    pub errors: Vec<String>,
}

/// Cancel and attend pages: the events to pick from plus any lookup error.
#[derive(Debug, Serialize)]
pub struct EventChoiceView {
    pub events: Vec<EventView>,
    pub error: Option<String>,
}

impl EventChoiceView {
    pub fn new(events: &[Event], error: Option<String>) -> Self {
        Self {
            events: event_views(events),
            error,
        }
    }
}
