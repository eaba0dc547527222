use dashmap::DashMap;
use roomcast_core::ChatMessage;
use std::collections::VecDeque;

/// Per-room bounded chat history, independent of signaling. Oldest entry
/// is evicted when a room's buffer is full.
pub struct MessageLog {
    logs: DashMap<String, VecDeque<ChatMessage>>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            logs: DashMap::new(),
            capacity,
        }
    }

    pub fn append(&self, room_name: &str, message: ChatMessage) {
        let mut log = self.logs.entry(room_name.to_owned()).or_default();

        if log.len() == self.capacity {
            log.pop_front();
        }
        log.push_back(message);
    }

    /// Current buffer for the room; an empty list when the room has no log
    /// yet, never an error.
    pub fn history(&self, room_name: &str) -> Vec<ChatMessage> {
        self.logs
            .get(room_name)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop a room's log entirely, mirroring room deletion.
    pub fn remove(&self, room_name: &str) {
        self.logs.remove(room_name);
    }
}
