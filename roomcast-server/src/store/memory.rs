use crate::store::{RoomRecord, RoomStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use roomcast_core::Identity;
use tracing::debug;
use uuid::Uuid;

/// In-process implementation of [`RoomStore`], backing the binary and any
/// deployment that does not need durability across restarts.
#[derive(Default)]
pub struct MemoryStore {
    rooms: DashMap<Uuid, RoomRecord>,
    by_name: DashMap<String, Uuid>,
    users: DashMap<String, Identity>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = Identity>) -> Self {
        let store = Self::new();
        for user in users {
            store.add_user(user);
        }
        store
    }

    pub fn add_user(&self, user: Identity) {
        self.users.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn find_room(&self, room_name: &str) -> Result<Option<RoomRecord>, StoreError> {
        let Some(id) = self.by_name.get(room_name).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.rooms.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create_room(&self, record: RoomRecord) -> Result<(), StoreError> {
        // The live table is the existence gate; a record already present
        // under this name is a leftover from a crashed process and gets
        // reclaimed here.
        if let Some((_, stale_id)) = self.by_name.remove(&record.room_name) {
            self.rooms.remove(&stale_id);
            debug!("Reclaimed stale record for room {}", record.room_name);
        }

        self.by_name.insert(record.room_name.clone(), record.id);
        self.rooms.insert(record.id, record);
        Ok(())
    }

    async fn add_member(&self, room_id: Uuid, identity: &Identity) -> Result<(), StoreError> {
        let mut record = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| StoreError::NotFound(room_id.to_string()))?;

        if !record.members.contains(identity) {
            record.members.push(identity.clone());
        }
        Ok(())
    }

    async fn remove_member(&self, room_id: Uuid, identity: &Identity) -> Result<(), StoreError> {
        let mut record = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| StoreError::NotFound(room_id.to_string()))?;

        record.members.retain(|member| member != identity);
        Ok(())
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<(), StoreError> {
        let (_, record) = self
            .rooms
            .remove(&room_id)
            .ok_or_else(|| StoreError::NotFound(room_id.to_string()))?;

        self.by_name
            .remove_if(&record.room_name, |_, mapped| *mapped == room_id);
        Ok(())
    }

    async fn find_user(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }
}
