//! Room registry: creates, looks up, and deletes rooms by id.

use std::collections::HashMap;

use typo_royale_protocol::RoomId;

use crate::room::Room;

/// Storage for live rooms.
///
/// The coordinator only talks to rooms through this trait, so a
/// different backing store can be swapped in without touching the game
/// rules.
pub trait RoomStore {
    /// Returns the room for `id`, creating an empty one if absent.
    fn ensure_room(&mut self, id: &RoomId) -> &mut Room;

    fn get(&self, id: &RoomId) -> Option<&Room>;

    fn get_mut(&mut self, id: &RoomId) -> Option<&mut Room>;

    /// Removes a room. Returns it if it existed.
    fn delete(&mut self, id: &RoomId) -> Option<Room>;

    /// Every live room id, sorted.
    fn room_ids(&self) -> Vec<RoomId>;

    fn room_count(&self) -> usize;

    fn contains(&self, id: &RoomId) -> bool {
        self.get(id).is_some()
    }
}

/// In-memory [`RoomStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomStore for RoomRegistry {
    fn ensure_room(&mut self, id: &RoomId) -> &mut Room {
        self.rooms.entry(id.clone()).or_insert_with(|| {
            tracing::info!(room_id = %id, "room created");
            Room::new(id.clone())
        })
    }

    fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    fn get_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    fn delete(&mut self, id: &RoomId) -> Option<Room> {
        let removed = self.rooms.remove(id);
        if removed.is_some() {
            tracing::info!(room_id = %id, "room deleted");
        }
        removed
    }

    fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
