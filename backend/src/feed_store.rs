use chrono::{DateTime, Utc};
use log::debug;

use forum_feed_frontend::item::{Comment, Document, Notification};
use forum_feed_frontend::{Cursor, Item, Page, PageInfo};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid cursor {0:?}")]
    InvalidCursor(String),
}

/// Free-text filtering of a feed.
pub trait Matches {
    fn matches(&self, filter: &str) -> bool;
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Matches for Notification {
    fn matches(&self, filter: &str) -> bool {
        self.content
            .as_ref()
            .map_or(false, |c| contains(&c.title, filter) || contains(&c.body, filter))
    }
}

impl Matches for Comment {
    fn matches(&self, filter: &str) -> bool {
        let preview = self.preview.as_deref().unwrap_or_default();
        let author = self.display_author.as_deref().unwrap_or_default();
        contains(preview, filter) || contains(author, filter)
    }
}

impl Matches for Document {
    fn matches(&self, filter: &str) -> bool {
        contains(&self.meta.title, filter)
    }
}

// cursors are offsets into the (filtered) feed, so an insert at the top
// shifts every window by one
fn encode_offset(offset: usize) -> Cursor {
    Cursor(format!("o{}", offset))
}

fn decode_offset(cursor: &Cursor) -> Result<usize, StoreError> {
    cursor
        .0
        .strip_prefix('o')
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(|| StoreError::InvalidCursor(cursor.0.clone()))
}

/// One feed, newest first.
#[derive(Debug, Clone)]
pub struct FeedStore<T> {
    items: Vec<T>,
}

impl<T> Default for FeedStore<T> {
    fn default() -> Self {
        FeedStore { items: Vec::new() }
    }
}

impl<T: Item + Matches + Clone> FeedStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<T>) -> Self {
        let mut store = FeedStore::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    /// Adds `item` at its place in time. An item with the same id is
    /// replaced, and moves if its timestamp changed.
    pub fn insert(&mut self, item: T) {
        self.remove(item.id());
        let position = self
            .items
            .iter()
            .position(|other| other.created_at() < item.created_at())
            .unwrap_or(self.items.len());
        self.items.insert(position, item);
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let position = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(position))
    }

    pub fn page(
        &self,
        after: Option<&Cursor>,
        first: usize,
        filter: Option<&str>,
    ) -> Result<Page<T>, StoreError> {
        let start = match after {
            Some(cursor) => decode_offset(cursor)?,
            None => 0,
        };

        let matching: Vec<&T> = self
            .items
            .iter()
            .filter(|item| filter.map_or(true, |filter| item.matches(filter)))
            .collect();

        let items: Vec<T> = matching
            .iter()
            .skip(start)
            .take(first)
            .map(|item| (*item).clone())
            .collect();
        let end = start + items.len();

        debug!(
            "page after {:?}: {} items, {} of {} matching",
            after,
            items.len(),
            end,
            matching.len()
        );

        let page_info = PageInfo {
            has_next_page: end < matching.len(),
            end_cursor: if items.is_empty() {
                None
            } else {
                Some(encode_offset(end))
            },
        };
        Ok(Page::new(items, page_info).with_total_count(matching.len() as u64))
    }

    pub fn count_since(&self, since: DateTime<Utc>) -> u64 {
        self.items
            .iter()
            .take_while(|item| item.created_at() > since)
            .count() as u64
    }
}
