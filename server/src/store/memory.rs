use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Event, NewEvent, NewOrganization, NewVolunteer, Organization, Volunteer};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    volunteers: HashMap<Uuid, Volunteer>,
    organizations: HashMap<Uuid, Organization>,
    events: HashMap<Uuid, Event>,
    /// (volunteer_id, event_id)
    attending: BTreeSet<(Uuid, Uuid)>,
}

impl Tables {
    fn username_taken(&self, username: &str) -> bool {
        self.volunteers.values().any(|v| v.username == username)
            || self.organizations.values().any(|o| o.username == username)
    }

    fn sorted(mut events: Vec<Event>) -> Vec<Event> {
        events.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.title.cmp(&b.title))
        });
        events
    }
}

/// In-process store. Everything sits behind one lock, so each operation is
/// atomic and the uniqueness rules hold under concurrent requests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_volunteer(&self, id: Uuid) -> AppResult<Option<Volunteer>> {
        Ok(self.tables.lock().await.volunteers.get(&id).cloned())
    }

    async fn find_volunteer_by_username(&self, username: &str) -> AppResult<Option<Volunteer>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .volunteers
            .values()
            .find(|v| v.username == username)
            .cloned())
    }

    async fn find_organization(&self, id: Uuid) -> AppResult<Option<Organization>> {
        Ok(self.tables.lock().await.organizations.get(&id).cloned())
    }

    async fn find_organization_by_username(
        &self,
        username: &str,
    ) -> AppResult<Option<Organization>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .organizations
            .values()
            .find(|o| o.username == username)
            .cloned())
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        Ok(self.tables.lock().await.username_taken(username))
    }

    async fn create_volunteer(&self, volunteer: NewVolunteer) -> AppResult<Volunteer> {
        let mut tables = self.tables.lock().await;
        if tables.username_taken(&volunteer.username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is taken",
                volunteer.username
            )));
        }

        let created = Volunteer {
            id: Uuid::new_v4(),
            username: volunteer.username,
            password_hash: volunteer.password_hash,
            created_at: Utc::now(),
        };
        tables.volunteers.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_organization(&self, organization: NewOrganization) -> AppResult<Organization> {
        let mut tables = self.tables.lock().await;
        if tables.username_taken(&organization.username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is taken",
                organization.username
            )));
        }

        let created = Organization {
            id: Uuid::new_v4(),
            username: organization.username,
            display_name: organization.display_name,
            password_hash: organization.password_hash,
            created_at: Utc::now(),
        };
        tables.organizations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_event_by_title(&self, title: &str) -> AppResult<Option<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.values().find(|e| e.title == title).cloned())
    }

    async fn create_event(&self, event: NewEvent) -> AppResult<Event> {
        let mut tables = self.tables.lock().await;
        if tables.events.values().any(|e| e.title == event.title) {
            return Err(AppError::Conflict(format!(
                "event title '{}' is taken",
                event.title
            )));
        }
        if !tables.organizations.contains_key(&event.host_id) {
            return Err(AppError::NotFound(format!(
                "organization {} does not exist",
                event.host_id
            )));
        }
        if event.start_time >= event.end_time {
            return Err(AppError::ValidationError(
                "event must start before it ends".to_string(),
            ));
        }

        let created = Event {
            id: Uuid::new_v4(),
            title: event.title,
            description: event.description,
            start_time: event.start_time,
            end_time: event.end_time,
            host_id: event.host_id,
            host_name: event.host_name,
            created_at: Utc::now(),
        };
        tables.events.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let removed = tables.events.remove(&id).is_some();
        if removed {
            tables.attending.retain(|(_, event_id)| *event_id != id);
        }
        Ok(removed)
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        Ok(Tables::sorted(tables.events.values().cloned().collect()))
    }

    async fn list_hosted_events(&self, organization_id: Uuid) -> AppResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        Ok(Tables::sorted(
            tables
                .events
                .values()
                .filter(|e| e.host_id == organization_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_attending_events(&self, volunteer_id: Uuid) -> AppResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        Ok(Tables::sorted(
            tables
                .attending
                .iter()
                .filter(|(attendee, _)| *attendee == volunteer_id)
                .filter_map(|(_, event_id)| tables.events.get(event_id).cloned())
                .collect(),
        ))
    }

    async fn add_attendee(&self, event_id: Uuid, volunteer_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.events.contains_key(&event_id) {
            return Err(AppError::NotFound(format!("event {event_id} does not exist")));
        }
        if !tables.volunteers.contains_key(&volunteer_id) {
            return Err(AppError::NotFound(format!(
                "volunteer {volunteer_id} does not exist"
            )));
        }
        Ok(tables.attending.insert((volunteer_id, event_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::parse_event_time;

    async fn seed_organization(store: &MemoryStore, username: &str) -> Organization {
        store
            .create_organization(NewOrganization {
                username: username.to_string(),
                display_name: format!("{username} display"),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    async fn seed_volunteer(store: &MemoryStore, username: &str) -> Volunteer {
        store
            .create_volunteer(NewVolunteer {
                username: username.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    fn new_event(host: &Organization, title: &str, start: &str, end: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: String::new(),
            start_time: parse_event_time(start).unwrap(),
            end_time: parse_event_time(end).unwrap(),
            host_id: host.id,
            host_name: host.display_name.clone(),
        }
    }

    #[tokio::test]
    async fn test_usernames_are_unique_across_roles() {
        let store = MemoryStore::new();
        seed_volunteer(&store, "sam").await;

        assert!(store.username_taken("sam").await.unwrap());
        let err = store
            .create_organization(NewOrganization {
                username: "sam".to_string(),
                display_name: "Sam's Shelter".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_event_title_conflicts() {
        let store = MemoryStore::new();
        let org = seed_organization(&store, "parks").await;
        let event = new_event(&org, "Beach Cleanup", "2024-01-01T10:00", "2024-01-01T12:00");

        store.create_event(event.clone()).await.unwrap();
        let err = store.create_event(event).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_events_are_listed_by_start_time() {
        let store = MemoryStore::new();
        let org = seed_organization(&store, "parks").await;
        store
            .create_event(new_event(&org, "Late", "2024-03-01T10:00", "2024-03-01T11:00"))
            .await
            .unwrap();
        store
            .create_event(new_event(&org, "Early", "2024-01-01T10:00", "2024-01-01T11:00"))
            .await
            .unwrap();

        let titles: Vec<_> = store
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["Early", "Late"]);

        let hosted = store.list_hosted_events(org.id).await.unwrap();
        assert_eq!(hosted.len(), 2);
        assert_eq!(hosted[0].title, "Early");
    }

    #[tokio::test]
    async fn test_attendance_is_idempotent_and_cascades_on_delete() {
        let store = MemoryStore::new();
        let org = seed_organization(&store, "parks").await;
        let volunteer = seed_volunteer(&store, "sam").await;
        let event = store
            .create_event(new_event(&org, "Beach Cleanup", "2024-01-01T10:00", "2024-01-01T12:00"))
            .await
            .unwrap();

        assert!(store.add_attendee(event.id, volunteer.id).await.unwrap());
        assert!(!store.add_attendee(event.id, volunteer.id).await.unwrap());
        assert_eq!(
            store.list_attending_events(volunteer.id).await.unwrap().len(),
            1
        );

        assert!(store.delete_event(event.id).await.unwrap());
        assert!(!store.delete_event(event.id).await.unwrap());
        assert!(store
            .list_attending_events(volunteer.id)
            .await
            .unwrap()
            .is_empty());
    }
}
