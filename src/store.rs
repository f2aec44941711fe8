// Document store for hotels, rooms, users and bookings
// Stands in for the database layer; every read hands back an owned copy so no
// lock outlives a single call.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;
use tracing::debug;

use crate::model::{Booking, Hotel, Room, User};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{collection} document {id} not found")]
    NotFound { collection: &'static str, id: String },

    #[error("{collection} document {id} already exists")]
    Conflict { collection: &'static str, id: String },
}

#[derive(Debug, Default)]
pub struct StoreStats {
    pub reads: AtomicUsize,
    pub misses: AtomicUsize,
    pub writes: AtomicUsize,
    pub deletes: AtomicUsize,
    pub conflicts: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StoreStatsReport {
    pub reads: usize,
    pub misses: usize,
    pub writes: usize,
    pub deletes: usize,
    pub conflicts: usize,
    pub hotels: usize,
    pub rooms: usize,
    pub users: usize,
    pub bookings: usize,
}

pub type Filter<'a, T> = &'a dyn Fn(&T) -> bool;
pub type Mutation<'a, T> = &'a mut dyn FnMut(&mut T);

// Persistence seam used by the booking service
pub trait DocumentStore: Send + Sync + 'static {
    fn insert_hotel(&self, hotel: Hotel) -> Result<(), StoreError>;
    fn get_hotel(&self, id: &str) -> Option<Hotel>;
    fn find_hotels(&self, filter: Filter<'_, Hotel>) -> Vec<Hotel>;
    fn update_hotel(&self, id: &str, apply: Mutation<'_, Hotel>) -> Result<Hotel, StoreError>;
    fn delete_hotel(&self, id: &str) -> Option<Hotel>;

    fn insert_room(&self, room: Room) -> Result<(), StoreError>;
    fn get_room(&self, id: &str) -> Option<Room>;
    fn find_rooms(&self, filter: Filter<'_, Room>) -> Vec<Room>;
    fn update_room(&self, id: &str, apply: Mutation<'_, Room>) -> Result<Room, StoreError>;
    fn delete_room(&self, id: &str) -> Option<Room>;

    fn insert_user(&self, user: User) -> Result<(), StoreError>;
    fn get_user(&self, id: &str) -> Option<User>;
    fn update_user(&self, id: &str, apply: Mutation<'_, User>) -> Result<User, StoreError>;
    fn delete_user(&self, id: &str) -> Option<User>;

    // Bookings are never deleted, only cancelled
    fn insert_booking(&self, booking: Booking) -> Result<(), StoreError>;
    fn get_booking(&self, id: &str) -> Option<Booking>;
    fn find_bookings(&self, filter: Filter<'_, Booking>) -> Vec<Booking>;
    fn update_booking(&self, id: &str, apply: Mutation<'_, Booking>)
        -> Result<Booking, StoreError>;

    fn stats(&self) -> StoreStatsReport;
}

// One collection keeps documents with their insertion sequence so listings come
// back in a stable natural order.
struct Collection<T> {
    name: &'static str,
    docs: DashMap<String, (u64, T)>,
    next_seq: AtomicU64,
}

impl<T: Clone> Collection<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            docs: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    fn insert(&self, id: String, doc: T, stats: &StoreStats) -> Result<(), StoreError> {
        match self.docs.entry(id) {
            Entry::Occupied(e) => {
                stats.conflicts.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::Conflict {
                    collection: self.name,
                    id: e.key().clone(),
                })
            }
            Entry::Vacant(e) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                debug!(collection = self.name, id = %e.key(), "inserting document");
                e.insert((seq, doc));
                stats.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    fn get(&self, id: &str, stats: &StoreStats) -> Option<T> {
        stats.reads.fetch_add(1, Ordering::SeqCst);
        let found = self.docs.get(id).map(|entry| entry.value().1.clone());
        if found.is_none() {
            stats.misses.fetch_add(1, Ordering::SeqCst);
        }
        found
    }

    fn find(&self, filter: Filter<'_, T>, stats: &StoreStats) -> Vec<T> {
        stats.reads.fetch_add(1, Ordering::SeqCst);
        let mut matched: Vec<(u64, T)> = self
            .docs
            .iter()
            .filter(|entry| filter(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        matched.into_iter().map(|(_, doc)| doc).collect()
    }

    fn update(&self, id: &str, apply: Mutation<'_, T>, stats: &StoreStats) -> Result<T, StoreError> {
        let mut entry = self.docs.get_mut(id).ok_or_else(|| {
            stats.misses.fetch_add(1, Ordering::SeqCst);
            StoreError::NotFound {
                collection: self.name,
                id: id.to_string(),
            }
        })?;
        apply(&mut entry.value_mut().1);
        stats.writes.fetch_add(1, Ordering::SeqCst);
        Ok(entry.value().1.clone())
    }

    fn delete(&self, id: &str, stats: &StoreStats) -> Option<T> {
        let removed = self.docs.remove(id).map(|(_, (_, doc))| doc);
        if removed.is_some() {
            debug!(collection = self.name, id, "deleted document");
            stats.deletes.fetch_add(1, Ordering::SeqCst);
        } else {
            stats.misses.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    fn len(&self) -> usize {
        self.docs.len()
    }
}

pub struct InMemoryStore {
    hotels: Collection<Hotel>,
    rooms: Collection<Room>,
    users: Collection<User>,
    bookings: Collection<Booking>,
    stats: StoreStats,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            hotels: Collection::new("hotels"),
            rooms: Collection::new("rooms"),
            users: Collection::new("users"),
            bookings: Collection::new("bookings"),
            stats: StoreStats::default(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryStore {
    fn insert_hotel(&self, hotel: Hotel) -> Result<(), StoreError> {
        self.hotels.insert(hotel.id.clone(), hotel, &self.stats)
    }

    fn get_hotel(&self, id: &str) -> Option<Hotel> {
        self.hotels.get(id, &self.stats)
    }

    fn find_hotels(&self, filter: Filter<'_, Hotel>) -> Vec<Hotel> {
        self.hotels.find(filter, &self.stats)
    }

    fn update_hotel(&self, id: &str, apply: Mutation<'_, Hotel>) -> Result<Hotel, StoreError> {
        self.hotels.update(id, apply, &self.stats)
    }

    fn delete_hotel(&self, id: &str) -> Option<Hotel> {
        self.hotels.delete(id, &self.stats)
    }

    fn insert_room(&self, room: Room) -> Result<(), StoreError> {
        self.rooms.insert(room.id.clone(), room, &self.stats)
    }

    fn get_room(&self, id: &str) -> Option<Room> {
        self.rooms.get(id, &self.stats)
    }

    fn find_rooms(&self, filter: Filter<'_, Room>) -> Vec<Room> {
        self.rooms.find(filter, &self.stats)
    }

    fn update_room(&self, id: &str, apply: Mutation<'_, Room>) -> Result<Room, StoreError> {
        self.rooms.update(id, apply, &self.stats)
    }

    fn delete_room(&self, id: &str) -> Option<Room> {
        self.rooms.delete(id, &self.stats)
    }

    fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.users.insert(user.id.clone(), user, &self.stats)
    }

    fn get_user(&self, id: &str) -> Option<User> {
        self.users.get(id, &self.stats)
    }

    fn update_user(&self, id: &str, apply: Mutation<'_, User>) -> Result<User, StoreError> {
        self.users.update(id, apply, &self.stats)
    }

    fn delete_user(&self, id: &str) -> Option<User> {
        self.users.delete(id, &self.stats)
    }

    fn insert_booking(&self, booking: Booking) -> Result<(), StoreError> {
        self.bookings.insert(booking.id.clone(), booking, &self.stats)
    }

    fn get_booking(&self, id: &str) -> Option<Booking> {
        self.bookings.get(id, &self.stats)
    }

    fn find_bookings(&self, filter: Filter<'_, Booking>) -> Vec<Booking> {
        self.bookings.find(filter, &self.stats)
    }

    fn update_booking(
        &self,
        id: &str,
        apply: Mutation<'_, Booking>,
    ) -> Result<Booking, StoreError> {
        self.bookings.update(id, apply, &self.stats)
    }

    fn stats(&self) -> StoreStatsReport {
        StoreStatsReport {
            reads: self.stats.reads.load(Ordering::SeqCst),
            misses: self.stats.misses.load(Ordering::SeqCst),
            writes: self.stats.writes.load(Ordering::SeqCst),
            deletes: self.stats.deletes.load(Ordering::SeqCst),
            conflicts: self.stats.conflicts.load(Ordering::SeqCst),
            hotels: self.hotels.len(),
            rooms: self.rooms.len(),
            users: self.users.len(),
            bookings: self.bookings.len(),
        }
    }
}

#[cfg(test)]
pub mod interleaving {
    // Store wrapper that lets a test slip another request's write in right
    // after a chosen call returns
    use super::*;
    use parking_lot::Mutex;

    type Hook = Box<dyn FnOnce(&InMemoryStore) + Send>;

    #[derive(Default)]
    pub struct InterleavingStore {
        inner: InMemoryStore,
        hook: Mutex<Option<(&'static str, Hook)>>,
    }

    impl InterleavingStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn inner(&self) -> &InMemoryStore {
            &self.inner
        }

        /// Runs `hook` once, after the next call to the store method named `op`.
        pub fn after<F>(&self, op: &'static str, hook: F)
        where
            F: FnOnce(&InMemoryStore) + Send + 'static,
        {
            *self.hook.lock() = Some((op, Box::new(hook)));
        }

        fn fire(&self, op: &'static str) {
            let hook = {
                let mut slot = self.hook.lock();
                match slot.take() {
                    Some((target, hook)) if target == op => Some(hook),
                    other => {
                        *slot = other;
                        None
                    }
                }
            };
            if let Some(hook) = hook {
                hook(&self.inner);
            }
        }
    }

    impl DocumentStore for InterleavingStore {
        fn insert_hotel(&self, hotel: Hotel) -> Result<(), StoreError> {
            self.inner.insert_hotel(hotel)
        }

        fn get_hotel(&self, id: &str) -> Option<Hotel> {
            self.inner.get_hotel(id)
        }

        fn find_hotels(&self, filter: Filter<'_, Hotel>) -> Vec<Hotel> {
            self.inner.find_hotels(filter)
        }

        fn update_hotel(&self, id: &str, apply: Mutation<'_, Hotel>) -> Result<Hotel, StoreError> {
            self.inner.update_hotel(id, apply)
        }

        fn delete_hotel(&self, id: &str) -> Option<Hotel> {
            self.inner.delete_hotel(id)
        }

        fn insert_room(&self, room: Room) -> Result<(), StoreError> {
            self.inner.insert_room(room)
        }

        fn get_room(&self, id: &str) -> Option<Room> {
            self.inner.get_room(id)
        }

        fn find_rooms(&self, filter: Filter<'_, Room>) -> Vec<Room> {
            self.inner.find_rooms(filter)
        }

        fn update_room(&self, id: &str, apply: Mutation<'_, Room>) -> Result<Room, StoreError> {
            self.inner.update_room(id, apply)
        }

        fn delete_room(&self, id: &str) -> Option<Room> {
            self.inner.delete_room(id)
        }

        fn insert_user(&self, user: User) -> Result<(), StoreError> {
            let out = self.inner.insert_user(user);
            self.fire("insert_user");
            out
        }

        fn get_user(&self, id: &str) -> Option<User> {
            self.inner.get_user(id)
        }

        fn update_user(&self, id: &str, apply: Mutation<'_, User>) -> Result<User, StoreError> {
            let out = self.inner.update_user(id, apply);
            self.fire("update_user");
            out
        }

        fn delete_user(&self, id: &str) -> Option<User> {
            self.inner.delete_user(id)
        }

        fn insert_booking(&self, booking: Booking) -> Result<(), StoreError> {
            self.inner.insert_booking(booking)
        }

        fn get_booking(&self, id: &str) -> Option<Booking> {
            let out = self.inner.get_booking(id);
            self.fire("get_booking");
            out
        }

        fn find_bookings(&self, filter: Filter<'_, Booking>) -> Vec<Booking> {
            self.inner.find_bookings(filter)
        }

        fn update_booking(
            &self,
            id: &str,
            apply: Mutation<'_, Booking>,
        ) -> Result<Booking, StoreError> {
            let out = self.inner.update_booking(id, apply);
            self.fire("update_booking");
            out
        }

        fn stats(&self) -> StoreStatsReport {
            self.inner.stats()
        }
    }
}
