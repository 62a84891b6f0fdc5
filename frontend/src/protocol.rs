use chrono::{DateTime, Utc};

use crate::page::{Page, PageRequest};

#[derive(Hash, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum FeedKind {
    Notifications,
    Comments,
    Documents,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedRequest {
    Page { feed: FeedKind, request: PageRequest },
    /// How many items were created after `since`; feeds the reload banner.
    CountSince { feed: FeedKind, since: DateTime<Utc> },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum FeedResponse<T> {
    Page(Page<T>),
    Count { count: u64 },
    Error { message: String },
}

/// One request on the wire. The server echoes `id` on the reply, so a
/// client can tell the answer to an abandoned request from its own.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestFrame {
    pub id: u64,
    pub request: FeedRequest,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseFrame<T> {
    /// Zero when the request was too garbled to carry an id.
    #[serde(default)]
    pub id: u64,
    pub response: FeedResponse<T>,
}
