//! Room broadcast groups.
//!
//! Each connection registers an outbox (the sending half of the channel
//! its writer task drains). Joining a room subscribes the connection to
//! that room's group; a broadcast pushes the same encoded frame into
//! every subscriber's outbox. Pushing never blocks, so broadcasts are
//! made while the game lock is held and arrive in the order the
//! coordinator emitted them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use typo_royale_protocol::{PlayerId, RoomId};

/// An encoded frame shared by every recipient of a broadcast.
pub(crate) type Frame = Arc<[u8]>;

/// Sending half of a connection's outgoing queue.
pub(crate) type Outbox = mpsc::UnboundedSender<Frame>;

#[derive(Debug, Default)]
pub(crate) struct Hub {
    outboxes: HashMap<PlayerId, Outbox>,
    groups: HashMap<RoomId, HashSet<PlayerId>>,
}

impl Hub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, player_id: PlayerId, outbox: Outbox) {
        self.outboxes.insert(player_id, outbox);
    }

    /// Drops a connection's outbox and every group membership.
    ///
    /// Dropping the outbox ends the connection's writer task.
    pub(crate) fn unregister(&mut self, player_id: PlayerId) {
        self.outboxes.remove(&player_id);
        self.groups.retain(|_, members| {
            members.remove(&player_id);
            !members.is_empty()
        });
    }

    pub(crate) fn subscribe(&mut self, room_id: RoomId, player_id: PlayerId) {
        self.groups.entry(room_id).or_default().insert(player_id);
    }

    pub(crate) fn unsubscribe(&mut self, room_id: &RoomId, player_id: PlayerId) {
        if let Some(members) = self.groups.get_mut(room_id) {
            members.remove(&player_id);
            if members.is_empty() {
                self.groups.remove(room_id);
            }
        }
    }

    /// Queues `frame` for every subscriber of `room_id`.
    ///
    /// Returns how many outboxes accepted it.
    pub(crate) fn broadcast(&self, room_id: &RoomId, frame: &Frame) -> usize {
        let Some(members) = self.groups.get(room_id) else {
            return 0;
        };
        members
            .iter()
            .filter_map(|id| self.outboxes.get(id))
            .filter(|outbox| outbox.send(Arc::clone(frame)).is_ok())
            .count()
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.groups.get(room_id).map_or(0, HashSet::len)
    }

    pub(crate) fn connection_count(&self) -> usize {
        self.outboxes.len()
    }
}
