//! Persistence for accounts, events and attendance.
//!
//! Handlers talk to an `Arc<dyn Store>`; `PgStore` backs production and
//! `MemoryStore` backs local runs and the test suite. Unique usernames and
//! event titles are enforced by the backend, surfacing as
//! [`AppError::Conflict`](crate::utils::error::AppError::Conflict).

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Event, NewEvent, NewOrganization, NewVolunteer, Organization, Volunteer};
use crate::utils::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_volunteer(&self, id: Uuid) -> AppResult<Option<Volunteer>>;

    async fn find_volunteer_by_username(&self, username: &str) -> AppResult<Option<Volunteer>>;

    async fn find_organization(&self, id: Uuid) -> AppResult<Option<Organization>>;

    async fn find_organization_by_username(
        &self,
        username: &str,
    ) -> AppResult<Option<Organization>>;

    /// True when either a volunteer or an organization owns `username`.
    async fn username_taken(&self, username: &str) -> AppResult<bool>;

    async fn create_volunteer(&self, volunteer: NewVolunteer) -> AppResult<Volunteer>;

    async fn create_organization(&self, organization: NewOrganization) -> AppResult<Organization>;

    async fn find_event_by_title(&self, title: &str) -> AppResult<Option<Event>>;

    async fn create_event(&self, event: NewEvent) -> AppResult<Event>;

    /// Removes the event together with its attendance rows.
    async fn delete_event(&self, id: Uuid) -> AppResult<bool>;

    /// Every event, earliest start first.
    async fn list_events(&self) -> AppResult<Vec<Event>>;

    async fn list_hosted_events(&self, organization_id: Uuid) -> AppResult<Vec<Event>>;

    async fn list_attending_events(&self, volunteer_id: Uuid) -> AppResult<Vec<Event>>;

    /// Returns false when the volunteer was already attending.
    async fn add_attendee(&self, event_id: Uuid, volunteer_id: Uuid) -> AppResult<bool>;
}
