use crate::errors::RelayError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use roomcast_core::Identity;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RoomState {
    pub store_id: Uuid,
    pub creator: Identity,
    pub password: Option<String>,
    pub members: Vec<Identity>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Creator,
    Joinee,
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub role: Role,
    pub already_member: bool,
    /// Room state as committed by this join.
    pub room: RoomState,
    /// Members before this join committed.
    pub prior_members: Vec<Identity>,
}

#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub store_id: Uuid,
    pub remaining: Vec<Identity>,
    /// Pre-removal state, present when the removal emptied the room and it
    /// was dropped from the table.
    pub deleted_room: Option<RoomState>,
}

/// Живое, авторитетное представление комнат. Все составные решения
/// выполняются под одним guard'ом шарда, без await — источник истины
/// для «кто может получить что».
pub struct RoomTable {
    rooms: DashMap<String, RoomState>,
    capacity: usize,
}

impl RoomTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity,
        }
    }

    /// Atomic create-or-join. The existence check and the insert happen
    /// under the same entry guard, so two near-simultaneous joins to a
    /// fresh name cannot both become the creator. The create path never
    /// checks the password; the join path validates capacity first, then
    /// the password, then appends (idempotent for an existing member).
    pub fn join_or_create(
        &self,
        room_name: &str,
        identity: &Identity,
        password: Option<&str>,
        created_at: &str,
    ) -> Result<JoinOutcome, RelayError> {
        match self.rooms.entry(room_name.to_owned()) {
            Entry::Vacant(slot) => {
                let room = RoomState {
                    store_id: Uuid::new_v4(),
                    creator: identity.clone(),
                    password: password.map(str::to_owned),
                    members: vec![identity.clone()],
                    created_at: created_at.to_owned(),
                };
                let snapshot = room.clone();
                slot.insert(room);

                Ok(JoinOutcome {
                    role: Role::Creator,
                    already_member: false,
                    room: snapshot,
                    prior_members: Vec::new(),
                })
            }
            Entry::Occupied(mut slot) => {
                let room = slot.get_mut();

                if room.members.len() >= self.capacity {
                    return Err(RelayError::RoomFull(room_name.to_owned()));
                }
                if room.password.as_deref() != password {
                    return Err(RelayError::AuthFailed(room_name.to_owned()));
                }

                let prior_members = room.members.clone();
                let already_member = room.members.contains(identity);
                if !already_member {
                    room.members.push(identity.clone());
                }

                Ok(JoinOutcome {
                    role: Role::Joinee,
                    already_member,
                    room: room.clone(),
                    prior_members,
                })
            }
        }
    }

    /// Remove an identity from a room. `None` when the room does not exist
    /// or the identity was not a member (a no-op, not an error). Deletes
    /// the room when the last member leaves.
    pub fn leave(&self, room_name: &str, identity: &Identity) -> Option<RemovalOutcome> {
        let Entry::Occupied(mut slot) = self.rooms.entry(room_name.to_owned()) else {
            return None;
        };

        if !slot.get().members.contains(identity) {
            return None;
        }
        let before = slot.get().clone();

        let room = slot.get_mut();
        room.members.retain(|member| member != identity);

        if room.members.is_empty() {
            slot.remove();
            Some(RemovalOutcome {
                store_id: before.store_id,
                remaining: Vec::new(),
                deleted_room: Some(before),
            })
        } else {
            Some(RemovalOutcome {
                store_id: room.store_id,
                remaining: room.members.clone(),
                deleted_room: None,
            })
        }
    }

    /// Remove `target_email` on behalf of `requester`. Only the room's
    /// creator may kick; the removal itself behaves exactly like `leave`.
    pub fn kick(
        &self,
        room_name: &str,
        requester: &Identity,
        target_email: &str,
    ) -> Result<(Identity, RemovalOutcome), RelayError> {
        let Entry::Occupied(mut slot) = self.rooms.entry(room_name.to_owned()) else {
            return Err(RelayError::RoomNotFound(room_name.to_owned()));
        };

        if slot.get().creator.email != requester.email {
            return Err(RelayError::NotAuthorized);
        }
        let Some(target) = slot
            .get()
            .members
            .iter()
            .find(|member| member.email == target_email)
            .cloned()
        else {
            return Err(RelayError::TargetNotFound {
                room: room_name.to_owned(),
                target: target_email.to_owned(),
            });
        };
        let before = slot.get().clone();

        let room = slot.get_mut();
        room.members.retain(|member| member.email != target_email);

        let outcome = if room.members.is_empty() {
            slot.remove();
            RemovalOutcome {
                store_id: before.store_id,
                remaining: Vec::new(),
                deleted_room: Some(before),
            }
        } else {
            RemovalOutcome {
                store_id: room.store_id,
                remaining: room.members.clone(),
                deleted_room: None,
            }
        };

        Ok((target, outcome))
    }

    /// Leave every room the identity belongs to, returning the affected
    /// rooms so the caller can broadcast once per room.
    pub fn disconnect_cleanup(&self, identity: &Identity) -> Vec<(String, RemovalOutcome)> {
        let joined: Vec<String> = self
            .rooms
            .iter()
            .filter(|entry| entry.value().members.contains(identity))
            .map(|entry| entry.key().clone())
            .collect();

        joined
            .into_iter()
            .filter_map(|room_name| {
                self.leave(&room_name, identity)
                    .map(|outcome| (room_name, outcome))
            })
            .collect()
    }

    /// Undo a committed join whose persistence confirmation failed or whose
    /// connection vanished before notifications were committed.
    pub fn rollback_join(&self, room_name: &str, identity: &Identity, role: Role) {
        match role {
            Role::Creator => {
                let removed = self.rooms.remove_if(room_name, |_, room| {
                    room.creator == *identity && room.members.len() <= 1
                });
                // Another join slipped in during the persistence await;
                // only the creator's own membership can be taken back.
                if removed.is_none() {
                    let _ = self.leave(room_name, identity);
                }
            }
            Role::Joinee => {
                let _ = self.leave(room_name, identity);
            }
        }
    }

    /// Undo a committed removal whose persistence confirmation failed.
    pub fn restore(&self, room_name: &str, identity: &Identity, outcome: &RemovalOutcome) {
        match &outcome.deleted_room {
            Some(state) => {
                self.rooms.insert(room_name.to_owned(), state.clone());
            }
            None => {
                if let Some(mut room) = self.rooms.get_mut(room_name)
                    && !room.members.contains(identity)
                {
                    room.members.push(identity.clone());
                }
            }
        }
    }

    pub fn members(&self, room_name: &str) -> Option<Vec<Identity>> {
        self.rooms.get(room_name).map(|room| room.members.clone())
    }

    pub fn contains(&self, room_name: &str) -> bool {
        self.rooms.contains_key(room_name)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
