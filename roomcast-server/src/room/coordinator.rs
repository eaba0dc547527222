use crate::errors::RelayError;
use crate::registry::ConnectionRegistry;
use crate::room::{JoinOutcome, MessageLog, RemovalOutcome, Role, RoomState, RoomTable};
use crate::signaling::{EventSink, SignalKind, SignalRelay};
use crate::store::{RoomRecord, RoomStore, StoreError};
use chrono::Utc;
use roomcast_core::{ChatMessage, ClientEvent, ConnectionId, Identity, RoomDetails, ServerEvent};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrates membership transitions. Every transaction makes its
/// decision synchronously against the live table, awaits the persistence
/// confirmation, re-checks connection liveness, and only then commits the
/// notifications. A failed confirmation rolls the live mutation back.
pub struct Coordinator {
    table: Arc<RoomTable>,
    registry: Arc<ConnectionRegistry>,
    messages: Arc<MessageLog>,
    store: Arc<dyn RoomStore>,
    sink: Arc<dyn EventSink>,
    relay: SignalRelay,
}

impl Coordinator {
    pub fn new(
        table: Arc<RoomTable>,
        registry: Arc<ConnectionRegistry>,
        messages: Arc<MessageLog>,
        store: Arc<dyn RoomStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let relay = SignalRelay::new(table.clone(), registry.clone(), sink.clone());
        Self {
            table,
            registry,
            messages,
            store,
            sink,
            relay,
        }
    }

    pub fn on_connect(&self, connection_id: ConnectionId) {
        self.registry.add_connection(connection_id);
    }

    pub async fn handle_event(&self, connection_id: &ConnectionId, event: ClientEvent) {
        let result = match event {
            ClientEvent::Join {
                room_name,
                email,
                password,
            } => {
                self.handle_join(connection_id, &room_name, &email, password.as_deref())
                    .await
            }
            ClientEvent::LeaveRoom { room_name } => {
                self.handle_leave(connection_id, &room_name).await
            }
            ClientEvent::KickUser {
                room_name,
                target_email,
            } => {
                self.handle_kick(connection_id, &room_name, &target_email)
                    .await
            }
            ClientEvent::Ready { room_name } => {
                self.relay.relay_ready(&room_name, connection_id).await;
                Ok(())
            }
            ClientEvent::Offer {
                payload, target, ..
            } => {
                self.relay
                    .relay_to_target(SignalKind::Offer, payload, connection_id, target)
                    .await;
                Ok(())
            }
            ClientEvent::Answer {
                payload, target, ..
            } => {
                self.relay
                    .relay_to_target(SignalKind::Answer, payload, connection_id, target)
                    .await;
                Ok(())
            }
            ClientEvent::IceCandidate {
                payload, target, ..
            } => {
                self.relay
                    .relay_to_target(SignalKind::IceCandidate, payload, connection_id, target)
                    .await;
                Ok(())
            }
            ClientEvent::StreamStopped { room_name } => {
                self.relay
                    .relay_stream_stopped(&room_name, connection_id)
                    .await;
                Ok(())
            }
            ClientEvent::SendMessage {
                room_name,
                text,
                timestamp,
                ..
            } => {
                self.handle_send_message(connection_id, &room_name, text, timestamp)
                    .await
            }
            ClientEvent::RequestMessageHistory { room_name } => {
                self.handle_history(connection_id, &room_name).await;
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!("Request from {} failed: {}", connection_id, err);
            self.sink.send(connection_id.clone(), err.into_event()).await;
        }
    }

    async fn handle_join(
        &self,
        connection_id: &ConnectionId,
        room_name: &str,
        email: &str,
        password: Option<&str>,
    ) -> Result<(), RelayError> {
        if room_name.is_empty() || email.is_empty() {
            return Err(RelayError::Validation(
                "email and room name are required".to_owned(),
            ));
        }

        let identity = self
            .store
            .find_user(email)
            .await?
            .ok_or_else(|| RelayError::UserNotFound(email.to_owned()))?;

        self.registry.register(connection_id, identity.clone());

        let outcome = self
            .table
            .join_or_create(room_name, &identity, password, &now_rfc3339())?;

        let confirm = match outcome.role {
            Role::Creator => {
                self.store
                    .create_room(RoomRecord {
                        id: outcome.room.store_id,
                        room_name: room_name.to_owned(),
                        password: outcome.room.password.clone(),
                        created_by: identity.clone(),
                        members: outcome.room.members.clone(),
                        created_at: outcome.room.created_at.clone(),
                    })
                    .await
            }
            Role::Joinee if !outcome.already_member => {
                self.store
                    .add_member(outcome.room.store_id, &identity)
                    .await
            }
            Role::Joinee => Ok(()),
        };

        if let Err(e) = confirm {
            self.table.rollback_join(room_name, &identity, outcome.role);
            warn!(
                "Persisting join of {} to {} failed, rolled back: {}",
                identity.email, room_name, e
            );
            return Err(e.into());
        }

        if !self.sink.is_connected(connection_id) {
            info!(
                "Connection {} vanished during join to {}, rolling back",
                connection_id, room_name
            );
            self.table.rollback_join(room_name, &identity, outcome.role);
            self.unpersist_join(room_name, &identity, &outcome).await;
            return Ok(());
        }

        self.registry.note_joined(connection_id, room_name);

        let details = room_details(room_name, &outcome.room);
        match outcome.role {
            Role::Creator => {
                info!("Room {} created by {}", room_name, identity.email);
                self.sink
                    .send(
                        connection_id.clone(),
                        ServerEvent::Created {
                            room_name: room_name.to_owned(),
                            identity: identity.clone(),
                            room_details: details,
                        },
                    )
                    .await;
            }
            Role::Joinee => {
                info!("{} joined {}", identity.email, room_name);
                self.sink
                    .send(
                        connection_id.clone(),
                        ServerEvent::Joined {
                            room_name: room_name.to_owned(),
                            identity: identity.clone(),
                            creator: outcome.room.creator.clone(),
                            members: outcome.room.members.clone(),
                            room_details: details,
                        },
                    )
                    .await;

                if !outcome.already_member {
                    self.notify_members(
                        &outcome.prior_members,
                        Some(&identity.email),
                        ServerEvent::UserJoined {
                            identity: identity.clone(),
                            room_name: room_name.to_owned(),
                            member_count: outcome.room.members.len(),
                        },
                    )
                    .await;
                }
            }
        }

        Ok(())
    }

    async fn handle_leave(
        &self,
        connection_id: &ConnectionId,
        room_name: &str,
    ) -> Result<(), RelayError> {
        if room_name.is_empty() {
            return Ok(());
        }
        let Some(identity) = self.registry.identity_of(connection_id) else {
            return Ok(());
        };

        let Some(outcome) = self.table.leave(room_name, &identity) else {
            return Ok(());
        };

        if let Err(e) = self.persist_removal(&outcome, &identity).await {
            self.table.restore(room_name, &identity, &outcome);
            warn!(
                "Persisting leave of {} from {} failed, rolled back: {}",
                identity.email, room_name, e
            );
            return Err(e.into());
        }

        self.registry.note_left(connection_id, room_name);
        self.finish_room_if_deleted(room_name, &outcome);
        info!("{} left {}", identity.email, room_name);

        self.notify_members(
            &outcome.remaining,
            None,
            ServerEvent::UserLeft {
                identity,
                room_name: room_name.to_owned(),
                was_kicked: false,
                by: None,
                member_count: outcome.remaining.len(),
            },
        )
        .await;

        Ok(())
    }

    async fn handle_kick(
        &self,
        connection_id: &ConnectionId,
        room_name: &str,
        target_email: &str,
    ) -> Result<(), RelayError> {
        if room_name.is_empty() || target_email.is_empty() {
            return Err(RelayError::Validation(
                "room name and target email are required".to_owned(),
            ));
        }
        let requester = self
            .registry
            .identity_of(connection_id)
            .ok_or(RelayError::NotAuthorized)?;

        let (target, outcome) = self.table.kick(room_name, &requester, target_email)?;

        if let Err(e) = self.persist_removal(&outcome, &target).await {
            self.table.restore(room_name, &target, &outcome);
            warn!(
                "Persisting kick of {} from {} failed, rolled back: {}",
                target.email, room_name, e
            );
            return Err(e.into());
        }

        self.finish_room_if_deleted(room_name, &outcome);
        info!(
            "{} kicked from {} by {}",
            target.email, room_name, requester.email
        );

        if let Some(target_connection) = self.registry.resolve(&target.email) {
            self.registry.note_left(&target_connection, room_name);
            if self.sink.is_connected(&target_connection) {
                self.sink
                    .send(
                        target_connection,
                        ServerEvent::Kicked {
                            room_name: room_name.to_owned(),
                            by: requester.display_name.clone(),
                            timestamp: now_rfc3339(),
                        },
                    )
                    .await;
            } else {
                self.registry.evict(&target.email);
            }
        }

        self.notify_members(
            &outcome.remaining,
            None,
            ServerEvent::UserLeft {
                identity: target,
                room_name: room_name.to_owned(),
                was_kicked: true,
                by: Some(requester.display_name),
                member_count: outcome.remaining.len(),
            },
        )
        .await;

        Ok(())
    }

    pub async fn handle_disconnect(&self, connection_id: &ConnectionId) {
        let Some(record) = self.registry.unregister(connection_id) else {
            return;
        };
        let Some(identity) = record.identity else {
            return;
        };

        for (room_name, outcome) in self.table.disconnect_cleanup(&identity) {
            // The connection is already gone, so there is nobody to report
            // a store failure to; the orphaned durable record is reclaimed
            // by the next create for this name.
            if let Err(e) = self.persist_removal(&outcome, &identity).await {
                warn!(
                    "Persisting disconnect cleanup of {} from {} failed: {}",
                    identity.email, room_name, e
                );
            }
            self.finish_room_if_deleted(&room_name, &outcome);

            self.notify_members(
                &outcome.remaining,
                None,
                ServerEvent::UserDisconnected {
                    identity: identity.clone(),
                    room_name: room_name.clone(),
                    member_count: outcome.remaining.len(),
                },
            )
            .await;
        }

        info!("Cleaned up after disconnect of {}", identity.email);
    }

    async fn handle_send_message(
        &self,
        connection_id: &ConnectionId,
        room_name: &str,
        text: String,
        timestamp: Option<String>,
    ) -> Result<(), RelayError> {
        if room_name.is_empty() || text.is_empty() {
            return Ok(());
        }
        let Some(identity) = self.registry.identity_of(connection_id) else {
            return Err(RelayError::Validation(
                "join a room before sending messages".to_owned(),
            ));
        };
        let members = self
            .table
            .members(room_name)
            .ok_or_else(|| RelayError::RoomNotFound(room_name.to_owned()))?;

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            room_name: room_name.to_owned(),
            sender: identity,
            text,
            timestamp: timestamp.unwrap_or_else(now_rfc3339),
        };
        self.messages.append(room_name, message.clone());

        self.notify_members(&members, None, ServerEvent::MessageReceived(message))
            .await;
        Ok(())
    }

    async fn handle_history(&self, connection_id: &ConnectionId, room_name: &str) {
        let messages = self.messages.history(room_name);
        self.sink
            .send(
                connection_id.clone(),
                ServerEvent::MessageHistory {
                    room_name: room_name.to_owned(),
                    messages,
                },
            )
            .await;
    }

    /// Best-effort undo of an already-persisted join whose notifications
    /// will never be committed.
    async fn unpersist_join(&self, room_name: &str, identity: &Identity, outcome: &JoinOutcome) {
        let result = match outcome.role {
            Role::Creator => self.store.delete_room(outcome.room.store_id).await,
            Role::Joinee if !outcome.already_member => {
                self.store
                    .remove_member(outcome.room.store_id, identity)
                    .await
            }
            Role::Joinee => Ok(()),
        };
        if let Err(e) = result {
            warn!(
                "Undoing persisted join of {} to {} failed: {}",
                identity.email, room_name, e
            );
        }
    }

    async fn persist_removal(
        &self,
        outcome: &RemovalOutcome,
        identity: &Identity,
    ) -> Result<(), StoreError> {
        if outcome.deleted_room.is_some() {
            self.store.delete_room(outcome.store_id).await
        } else {
            self.store.remove_member(outcome.store_id, identity).await
        }
    }

    fn finish_room_if_deleted(&self, room_name: &str, outcome: &RemovalOutcome) {
        if outcome.deleted_room.is_some() {
            self.messages.remove(room_name);
            info!("Room {} is empty, deleted", room_name);
        }
    }

    async fn notify_members(
        &self,
        members: &[Identity],
        exclude_email: Option<&str>,
        event: ServerEvent,
    ) {
        for member in members {
            if exclude_email == Some(member.email.as_str()) {
                continue;
            }
            let Some(target) = self.registry.resolve(&member.email) else {
                continue;
            };
            if !self.sink.is_connected(&target) {
                self.registry.evict(&member.email);
                continue;
            }
            self.sink.send(target, event.clone()).await;
        }
    }
}

fn room_details(room_name: &str, room: &RoomState) -> RoomDetails {
    RoomDetails {
        id: room.store_id,
        room_name: room_name.to_owned(),
        created_by: room.creator.clone(),
        members: room.members.clone(),
        member_count: room.members.len(),
        created_at: room.created_at.clone(),
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
