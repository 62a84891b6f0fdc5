use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::Message;

use forum_feed_frontend::protocol::{FeedResponse, RequestFrame, ResponseFrame};

use crate::config::ServerConfig;
use crate::feeds::Feeds;

pub type SharedFeeds = Arc<Mutex<Feeds>>;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("websocket handshake failed")]
    Handshake,
    #[error("feed state lock poisoned")]
    FeedsLock,
    #[error("failed to bind {0}")]
    FailedSocketBind(String),
    #[error("could not encode reply: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not send reply")]
    Send,
}

/// The reply frame for one request frame. Malformed requests get an error
/// reply, with their id when one can be read, instead of closing the
/// connection.
pub fn answer(feeds: &SharedFeeds, config: &ServerConfig, text: &str) -> Result<String, HandlerError> {
    match serde_json::from_str::<RequestFrame>(text) {
        Ok(frame) => {
            let feeds = feeds.lock().map_err(|_err| HandlerError::FeedsLock)?;
            Ok(feeds.respond(&frame, config)?)
        }
        Err(err) => {
            warn!("unreadable request: {}", err);
            let id = serde_json::from_str::<serde_json::Value>(text)
                .ok()
                .and_then(|value| value.get("id").and_then(|id| id.as_u64()))
                .unwrap_or_default();
            let reply = ResponseFrame {
                id,
                response: FeedResponse::<()>::Error {
                    message: format!("could not parse request: {}", err),
                },
            };
            Ok(serde_json::to_string(&reply)?)
        }
    }
}

async fn handle_connection(
    feeds: SharedFeeds,
    config: Arc<ServerConfig>,
    raw_stream: TcpStream,
    addr: SocketAddr,
) -> Result<(), HandlerError> {
    info!("tcp connection from: {}", addr);

    let ws_stream = tokio_tungstenite::accept_async(raw_stream)
        .await
        .map_err(|_err| HandlerError::Handshake)?;
    let (mut outgoing, mut incoming) = ws_stream.split();

    while let Some(message) = incoming.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                warn!("{} read failed: {}", addr, err);
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        debug!("received a message from {}: {}", addr, text);

        let reply = answer(&feeds, &config, &text)?;
        outgoing
            .send(Message::Text(reply))
            .await
            .map_err(|_err| HandlerError::Send)?;
    }

    info!("{} disconnected", addr);
    Ok(())
}

/// Accepts connections on `listener` forever, one task per connection.
pub async fn serve(listener: TcpListener, config: ServerConfig, feeds: SharedFeeds) -> Result<(), HandlerError> {
    let config = Arc::new(config);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let feeds = feeds.clone();
                let config = config.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(feeds, config, stream, addr).await {
                        warn!("connection {} ended: {}", addr, err);
                    }
                });
            }
            Err(err) => warn!("accept failed: {}", err),
        }
    }
}

pub async fn establish(config: ServerConfig, feeds: SharedFeeds) -> Result<(), HandlerError> {
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|_err| HandlerError::FailedSocketBind(config.bind_addr.clone()))?;
    info!("listening on: {}", config.bind_addr);

    serve(listener, config, feeds).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use forum_feed_frontend::item::Comment;

    fn feeds() -> SharedFeeds {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        Arc::new(Mutex::new(Feeds::seeded(now)))
    }

    #[test]
    fn page_request_is_answered_with_a_page() {
        let request =
            r#"{ "id": 3, "request": { "type": "page", "feed": "comments", "request": { "first": 4 } } }"#;

        let reply = answer(&feeds(), &ServerConfig::default(), request).unwrap();
        let reply: ResponseFrame<Comment> = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply.id, 3);

        match reply.response {
            FeedResponse::Page(page) => {
                assert_eq!(page.items.len(), 4);
                assert_eq!(page.end_cursor().map(|c| c.0.as_str()), Some("o4"));
            }
            other => panic!("expected a page, got {:?}", other),
        }
    }

    #[test]
    fn garbage_is_answered_with_an_error() {
        let reply = answer(&feeds(), &ServerConfig::default(), "{ not json").unwrap();
        let reply: ResponseFrame<Comment> = serde_json::from_str(&reply).unwrap();

        assert_eq!(reply.id, 0);
        assert!(matches!(
            reply.response,
            FeedResponse::Error { message } if message.starts_with("could not parse request")
        ));
    }

    #[test]
    fn unknown_feed_is_refused_under_its_id() {
        let request = r#"{ "id": 12, "request": { "type": "page", "feed": "polls", "request": {} } }"#;

        let reply = answer(&feeds(), &ServerConfig::default(), request).unwrap();
        let reply: ResponseFrame<Comment> = serde_json::from_str(&reply).unwrap();

        assert_eq!(reply.id, 12);
        assert!(matches!(reply.response, FeedResponse::Error { .. }));
    }
}
