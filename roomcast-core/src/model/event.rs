use crate::model::connection::ConnectionId;
use crate::model::identity::Identity;
use crate::model::message::ChatMessage;
use crate::model::room::RoomDetails;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    #[serde(rename = "join")]
    Join {
        room_name: String,
        email: String,
        #[serde(default)]
        password: Option<String>,
    },
    #[serde(rename = "leaveRoom")]
    LeaveRoom { room_name: String },
    #[serde(rename = "kick-user")]
    KickUser {
        room_name: String,
        target_email: String,
    },
    #[serde(rename = "ready")]
    Ready { room_name: String },
    #[serde(rename = "offer")]
    Offer {
        payload: Value,
        room_name: String,
        target: ConnectionId,
    },
    #[serde(rename = "answer")]
    Answer {
        payload: Value,
        room_name: String,
        target: ConnectionId,
    },
    #[serde(rename = "ice-candidate")]
    IceCandidate {
        payload: Value,
        room_name: String,
        target: ConnectionId,
    },
    #[serde(rename = "stream-stopped")]
    StreamStopped { room_name: String },
    #[serde(rename = "send-message")]
    SendMessage {
        room_name: String,
        text: String,
        #[serde(default)]
        sender_email: Option<String>,
        #[serde(default)]
        timestamp: Option<String>,
    },
    #[serde(rename = "request-message-history")]
    RequestMessageHistory { room_name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    #[serde(rename = "welcome")]
    Welcome { connection_id: ConnectionId },
    #[serde(rename = "created")]
    Created {
        room_name: String,
        identity: Identity,
        room_details: RoomDetails,
    },
    #[serde(rename = "joined")]
    Joined {
        room_name: String,
        identity: Identity,
        creator: Identity,
        members: Vec<Identity>,
        room_details: RoomDetails,
    },
    #[serde(rename = "full")]
    Full { room_name: String },
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "user-joined")]
    UserJoined {
        identity: Identity,
        room_name: String,
        member_count: usize,
    },
    #[serde(rename = "user-left")]
    UserLeft {
        identity: Identity,
        room_name: String,
        was_kicked: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        by: Option<String>,
        member_count: usize,
    },
    #[serde(rename = "user-disconnected")]
    UserDisconnected {
        identity: Identity,
        room_name: String,
        member_count: usize,
    },
    #[serde(rename = "kicked")]
    Kicked {
        room_name: String,
        by: String,
        timestamp: String,
    },
    #[serde(rename = "ready")]
    Ready {
        from: ConnectionId,
        identity: Identity,
    },
    #[serde(rename = "offer")]
    Offer { payload: Value, from: ConnectionId },
    #[serde(rename = "answer")]
    Answer { payload: Value, from: ConnectionId },
    #[serde(rename = "ice-candidate")]
    IceCandidate { payload: Value, from: ConnectionId },
    #[serde(rename = "stream-stopped")]
    StreamStopped { room_name: String },
    #[serde(rename = "message-received")]
    MessageReceived(ChatMessage),
    #[serde(rename = "message-history")]
    MessageHistory {
        room_name: String,
        messages: Vec<ChatMessage>,
    },
}
