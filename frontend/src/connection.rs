use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info};
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::fetch::{FetchError, PageSource};
use crate::page::{Page, PageRequest};
use crate::protocol::{FeedKind, FeedRequest, FeedResponse, RequestFrame, ResponseFrame};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn network<E: std::fmt::Display>(err: E) -> FetchError {
    FetchError::Network(err.to_string())
}

#[derive(Deserialize)]
struct ReplyId {
    #[serde(default)]
    id: u64,
}

/// Pages of one feed, fetched over a websocket. One request is answered by
/// exactly one text frame carrying the request's id.
pub struct WebSocketSource<T> {
    socket: Mutex<Socket>,
    feed: FeedKind,
    next_id: AtomicU64,
    items: PhantomData<fn() -> T>,
}

impl<T> WebSocketSource<T> {
    pub async fn connect(url: &str, feed: FeedKind) -> Result<Self, FetchError> {
        let (socket, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(network)?;
        info!("websocket opened: {} ({:?})", url, feed);

        Ok(WebSocketSource {
            socket: Mutex::new(socket),
            feed,
            next_id: AtomicU64::new(1),
            items: PhantomData,
        })
    }

    pub fn feed(&self) -> FeedKind {
        self.feed
    }

    /// Sends `request` and waits for the reply carrying its id. Replies to
    /// requests whose caller gave up waiting are still on the socket and
    /// get skipped here.
    async fn exchange(&self, request: FeedRequest) -> Result<String, FetchError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = serde_json::to_string(&RequestFrame { id, request })
            .map_err(|err| FetchError::Source(err.to_string()))?;

        let mut socket = self.socket.lock().await;
        socket.send(Message::Text(message)).await.map_err(network)?;

        while let Some(message) = socket.next().await {
            match message.map_err(network)? {
                Message::Text(data) => {
                    debug!("got websocket message: {:?}", data);
                    match serde_json::from_str::<ReplyId>(&data) {
                        Ok(reply) if reply.id != id => {
                            debug!("skipping reply {} while waiting for {}", reply.id, id);
                            continue;
                        }
                        _ => return Ok(data),
                    }
                }
                Message::Close(_) => break,
                _ => continue,
            }
        }
        Err(FetchError::Network("websocket closed".into()))
    }

    /// Items of this feed created after `since`.
    pub async fn count_since(&self, since: DateTime<Utc>) -> Result<u64, FetchError> {
        let request = FeedRequest::CountSince {
            feed: self.feed,
            since,
        };
        let data = self.exchange(request).await?;

        match decode::<IgnoredAny>(&data)? {
            FeedResponse::Count { count } => Ok(count),
            FeedResponse::Error { message } => Err(FetchError::Source(message)),
            FeedResponse::Page(_) => Err(FetchError::Source("expected a count, got a page".into())),
        }
    }

    pub async fn close(&self) -> Result<(), FetchError> {
        self.socket.lock().await.close(None).await.map_err(network)
    }
}

fn decode<T: DeserializeOwned>(data: &str) -> Result<FeedResponse<T>, FetchError> {
    serde_json::from_str::<ResponseFrame<T>>(data)
        .map(|frame| frame.response)
        .map_err(|err| FetchError::Source(format!("could not parse reply: {}", err)))
}

#[async_trait]
impl<T> PageSource<T> for WebSocketSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>, FetchError> {
        let request = FeedRequest::Page {
            feed: self.feed,
            request: request.clone(),
        };
        let data = self.exchange(request).await?;

        match decode(&data)? {
            FeedResponse::Page(page) => Ok(page),
            FeedResponse::Error { message } => Err(FetchError::Source(message)),
            FeedResponse::Count { .. } => {
                Err(FetchError::Source("expected a page, got a count".into()))
            }
        }
    }
}
