use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, NewEvent, NewOrganization, NewVolunteer, Organization, Volunteer};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

const EVENT_COLUMNS: &str =
    "e.id, e.title, e.description, e.start_time, e.end_time, e.host_id, e.host_name, e.created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        tracing::info!("Successfully connected to database");

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(format!("migration failed: {e}")))?;

        tracing::info!("Migrations run successfully");

        Ok(Self::new(pool))
    }
}

fn conflict_on_unique(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message()),
        _ => AppError::DatabaseError(e),
    }
}

const ATTENDING_VOLUNTEER_FK: &str = "attending_volunteer_fk";

/// Names the missing side of an attendance insert.
fn missing_attendance_reference(
    constraint: Option<&str>,
    event_id: Uuid,
    volunteer_id: Uuid,
) -> AppError {
    match constraint {
        Some(ATTENDING_VOLUNTEER_FK) => {
            AppError::NotFound(format!("volunteer {volunteer_id} does not exist"))
        }
        _ => AppError::NotFound(format!("event {event_id} does not exist")),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_volunteer(&self, id: Uuid) -> AppResult<Option<Volunteer>> {
        let volunteer = sqlx::query_as::<_, Volunteer>(
            "SELECT id, username, password_hash, created_at FROM volunteer WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(volunteer)
    }

    async fn find_volunteer_by_username(&self, username: &str) -> AppResult<Option<Volunteer>> {
        let volunteer = sqlx::query_as::<_, Volunteer>(
            "SELECT id, username, password_hash, created_at FROM volunteer WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(volunteer)
    }

    async fn find_organization(&self, id: Uuid) -> AppResult<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            "SELECT id, username, display_name, password_hash, created_at \
             FROM organization WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(organization)
    }

    async fn find_organization_by_username(
        &self,
        username: &str,
    ) -> AppResult<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            "SELECT id, username, display_name, password_hash, created_at \
             FROM organization WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(organization)
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM volunteer WHERE username = $1) \
             OR EXISTS (SELECT 1 FROM organization WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn create_volunteer(&self, volunteer: NewVolunteer) -> AppResult<Volunteer> {
        sqlx::query_as::<_, Volunteer>(
            "INSERT INTO volunteer (id, username, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&volunteer.username)
        .bind(&volunteer.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_on_unique(e, || format!("username '{}' is taken", volunteer.username))
        })
    }

    async fn create_organization(&self, organization: NewOrganization) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organization (id, username, display_name, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, display_name, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&organization.username)
        .bind(&organization.display_name)
        .bind(&organization.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_on_unique(e, || {
                format!("username '{}' is taken", organization.username)
            })
        })
    }

    async fn find_event_by_title(&self, title: &str) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event e WHERE e.title = $1"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn create_event(&self, event: NewEvent) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO event (id, title, description, start_time, end_time, host_id, host_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, title, description, start_time, end_time, host_id, host_name, \
             created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.host_id)
        .bind(&event.host_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("event title '{}' is taken", event.title)))
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        // attending rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM event WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event e ORDER BY e.start_time, e.title"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn list_hosted_events(&self, organization_id: Uuid) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event e \
             WHERE e.host_id = $1 \
             ORDER BY e.start_time, e.title"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn list_attending_events(&self, volunteer_id: Uuid) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event e \
             JOIN attending a ON a.event_id = e.id \
             WHERE a.volunteer_id = $1 \
             ORDER BY e.start_time, e.title"
        ))
        .bind(volunteer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn add_attendee(&self, event_id: Uuid, volunteer_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO attending (volunteer_id, event_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(volunteer_id)
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                missing_attendance_reference(db.constraint(), event_id, volunteer_id)
            }
            _ => AppError::DatabaseError(e),
        })?;
        Ok(result.rows_affected() == 1)
    }
}
