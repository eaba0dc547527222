mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use roomcast_core::Identity;
use thiserror::Error;
use uuid::Uuid;

/// Durable view of a room, as the persistence collaborator keeps it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRecord {
    pub id: Uuid,
    pub room_name: String,
    pub password: Option<String>,
    pub created_by: Identity,
    pub members: Vec<Identity>,
    pub created_at: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Трейт внешнего хранилища комнат и пользователей. Координатор вызывает
/// его после синхронного решения по живой таблице: запись — подтверждение,
/// а не ворота. Никакой логики запросов сверх этих операций.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn find_room(&self, room_name: &str) -> Result<Option<RoomRecord>, StoreError>;

    async fn create_room(&self, record: RoomRecord) -> Result<(), StoreError>;

    async fn add_member(&self, room_id: Uuid, identity: &Identity) -> Result<(), StoreError>;

    async fn remove_member(&self, room_id: Uuid, identity: &Identity) -> Result<(), StoreError>;

    async fn delete_room(&self, room_id: Uuid) -> Result<(), StoreError>;

    async fn find_user(&self, email: &str) -> Result<Option<Identity>, StoreError>;
}
