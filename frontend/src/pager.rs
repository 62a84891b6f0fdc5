use log::{debug, warn};

use crate::fetch::{FetchError, PageSource};
use crate::group::{group, Group};
use crate::item::Item;
use crate::merge::AccumulatedList;
use crate::page::{Cursor, Page, PageRequest};

/// Proof that a load was started, tied to the pager state it was started
/// from. Answers carrying a ticket from before a reset are dropped.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Merged { added: usize },
    /// The pager was reset while the request was out.
    Stale,
    /// A load was already in flight, or there is nothing more to load.
    Skipped,
}

/// Infinite-scroll state of one view: what has been loaded, where to
/// continue, and whether a request is out.
#[derive(Debug)]
pub struct Pager<T> {
    items: AccumulatedList<T>,
    end_cursor: Option<Cursor>,
    has_next_page: bool,
    total_count: Option<u64>,
    unread_count: Option<u64>,
    filter: Option<String>,
    page_size: Option<u32>,
    generation: u64,
    in_flight: bool,
}

impl<T: Item + Clone> Default for Pager<T> {
    fn default() -> Self {
        Pager::new(None)
    }
}

impl<T: Item + Clone> Pager<T> {
    pub fn new(filter: Option<String>) -> Self {
        Pager {
            items: AccumulatedList::new(),
            end_cursor: None,
            has_next_page: true,
            total_count: None,
            unread_count: None,
            filter,
            page_size: None,
            generation: 0,
            in_flight: false,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn end_cursor(&self) -> Option<&Cursor> {
        self.end_cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.has_next_page
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn unread_count(&self) -> Option<u64> {
        self.unread_count
    }

    /// Loaded count against the total the source last reported.
    pub fn progress(&self) -> (usize, Option<u64>) {
        (self.items.len(), self.total_count)
    }

    pub fn grouped<L, F>(&self, key_fn: F) -> Vec<Group<L, &T>>
    where
        L: PartialEq,
        F: FnMut(&T) -> L,
    {
        group(&self.items, key_fn)
    }

    /// Starts the next load unless one is already out or the list is
    /// exhausted.
    pub fn begin_load(&mut self) -> Option<(LoadTicket, PageRequest)> {
        if self.in_flight || !self.has_next_page {
            return None;
        }
        self.in_flight = true;

        let request = PageRequest {
            after: self.end_cursor.clone(),
            first: self.page_size,
            filter: self.filter.clone(),
        };
        Some((
            LoadTicket {
                generation: self.generation,
            },
            request,
        ))
    }

    /// Settles the load `ticket` belongs to. A failure leaves the list
    /// untouched and is handed back to the caller.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Page<T>, FetchError>,
    ) -> Result<LoadOutcome, FetchError> {
        if ticket.generation != self.generation {
            debug!(
                "discarding answer for generation {} (now {})",
                ticket.generation, self.generation
            );
            return Ok(LoadOutcome::Stale);
        }
        self.in_flight = false;

        let page = result?;
        let before = self.items.len();
        self.items = self.items.merge_page(&page);

        // without a cursor there is no way to ask for what follows
        match page.page_info.end_cursor {
            Some(cursor) => {
                self.end_cursor = Some(cursor);
                self.has_next_page = page.page_info.has_next_page;
            }
            None => {
                if page.page_info.has_next_page {
                    warn!("page claims more items but carries no cursor, treating it as the last");
                }
                self.has_next_page = false;
            }
        }
        self.total_count = page.total_count.or(self.total_count);
        self.unread_count = page.unread_count.or(self.unread_count);

        let added = self.items.len() - before;
        debug!(
            "merged page: {} new of {} received, {} held",
            added,
            page.items.len(),
            self.items.len()
        );
        Ok(LoadOutcome::Merged { added })
    }

    pub async fn load_more<S>(&mut self, source: &S) -> Result<LoadOutcome, FetchError>
    where
        S: PageSource<T> + ?Sized,
    {
        let Some((ticket, request)) = self.begin_load() else {
            return Ok(LoadOutcome::Skipped);
        };
        let result = source.fetch_page(&request).await;
        self.finish_load(ticket, result)
    }

    /// Drops everything loaded and starts over from the first page. Any
    /// load still out becomes stale.
    pub fn reset(&mut self, filter: Option<String>) {
        self.items.clear();
        self.end_cursor = None;
        self.has_next_page = true;
        self.total_count = None;
        self.unread_count = None;
        self.filter = filter;
        self.generation += 1;
        self.in_flight = false;
    }

    /// Manual reload with the current filter.
    pub fn reload(&mut self) {
        let filter = self.filter.take();
        self.reset(filter);
    }

    /// Resets only when the filter actually changed. Returns whether it did.
    pub fn set_filter(&mut self, filter: Option<String>) -> bool {
        if self.filter == filter {
            return false;
        }
        self.reset(filter);
        true
    }
}
