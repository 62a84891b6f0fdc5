extern crate serde;
#[macro_use]
extern crate serde_derive;

pub mod clock;
pub mod connection;
pub mod debounce;
pub mod fetch;
pub mod freshness;
pub mod group;
pub mod item;
pub mod merge;
pub mod mutation;
pub mod page;
pub mod pager;
pub mod poll;
pub mod protocol;

use std::time::Duration;

pub use fetch::{FetchError, PageSource};
pub use item::{Item, Readable};
pub use merge::{merge, AccumulatedList};
pub use page::{Cursor, Page, PageInfo, PageRequest};
pub use pager::{LoadOutcome, Pager};

pub const WEBSOCKET_URL: &'static str = "ws://127.0.0.1:5050";

/// Day headings of feeds and notification lists.
pub const DAY_LABEL_FORMAT: &'static str = "%A,\n%d.%m.%Y";

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);
