use crate::model::identity::Identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    pub id: Uuid,
    pub room_name: String,
    pub created_by: Identity,
    pub members: Vec<Identity>,
    pub member_count: usize,
    pub created_at: String,
}
