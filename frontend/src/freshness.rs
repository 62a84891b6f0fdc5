use std::collections::HashSet;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use log::debug;

use crate::clock::Clock;
use crate::item::{Item, Readable};

/// Never read, or read only after the view was loaded.
pub fn is_new(read_at: Option<DateTime<Utc>>, loaded_at: DateTime<Utc>) -> bool {
    match read_at {
        None => true,
        Some(read_at) => loaded_at < read_at,
    }
}

/// Tracks when a view was loaded and how much newer content is waiting
/// behind the "reload" banner. Reloading is always the viewer's call.
#[derive(Debug, Clone)]
pub struct Freshness<I> {
    loaded_at: DateTime<Utc>,
    future_ids: HashSet<I>,
    reported: u64,
}

impl<I: Eq + Hash + Clone> Freshness<I> {
    pub fn loaded(clock: &impl Clock) -> Self {
        Freshness {
            loaded_at: clock.now(),
            future_ids: HashSet::new(),
            reported: 0,
        }
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn is_new<T: Readable>(&self, item: &T) -> bool {
        is_new(item.read_at(), self.loaded_at)
    }

    /// Counts `item` if it was created after the load. Returns whether it
    /// was counted for the first time.
    pub fn observe<T: Item<Id = I>>(&mut self, item: &T) -> bool {
        if item.created_at() <= self.loaded_at {
            return false;
        }
        self.future_ids.insert(item.id().clone())
    }

    /// Takes a count of newer items straight from a count poll.
    pub fn report_future_count(&mut self, count: u64) {
        debug!("{} items newer than {}", count, self.loaded_at);
        self.reported = count;
    }

    pub fn future_count(&self) -> u64 {
        self.reported.max(self.future_ids.len() as u64)
    }

    /// What the reload banner should announce, if anything.
    pub fn banner(&self) -> Option<u64> {
        match self.future_count() {
            0 => None,
            count => Some(count),
        }
    }

    pub fn reload(&mut self, clock: &impl Clock) {
        self.loaded_at = clock.now();
        self.future_ids.clear();
        self.reported = 0;
    }
}
