use crate::model::identity::Identity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub room_name: String,
    pub sender: Identity,
    pub text: String,
    pub timestamp: String,
}
