use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::Serialize;

use forum_feed_frontend::item::{
    Comment, Document, DocumentMeta, Notification, NotificationContent, NotificationObject,
};
use forum_feed_frontend::protocol::{FeedKind, FeedRequest, FeedResponse, RequestFrame, ResponseFrame};
use forum_feed_frontend::{Item, Page, PageRequest};

use crate::config::ServerConfig;
use crate::feed_store::{FeedStore, Matches, StoreError};

/// Every feed the server knows, one store per kind.
#[derive(Debug, Clone, Default)]
pub struct Feeds {
    pub notifications: FeedStore<Notification>,
    pub comments: FeedStore<Comment>,
    pub documents: FeedStore<Document>,
}

fn page_of<T: Item + Matches + Clone>(
    store: &FeedStore<T>,
    request: &PageRequest,
    config: &ServerConfig,
) -> Result<Page<T>, StoreError> {
    store.page(
        request.after.as_ref(),
        config.page_size_for(request.first),
        request.filter.as_deref(),
    )
}

fn encode<T: Serialize>(id: u64, result: Result<Page<T>, StoreError>) -> serde_json::Result<String> {
    let response = match result {
        Ok(page) => FeedResponse::Page(page),
        Err(err) => {
            warn!("refusing page request: {}", err);
            FeedResponse::Error {
                message: err.to_string(),
            }
        }
    };
    serde_json::to_string(&ResponseFrame { id, response })
}

impl Feeds {
    /// Serialized answer to `frame`, tagged with its id.
    pub fn respond(&self, frame: &RequestFrame, config: &ServerConfig) -> serde_json::Result<String> {
        let id = frame.id;
        match &frame.request {
            FeedRequest::Page {
                feed: FeedKind::Notifications,
                request,
            } => {
                let unread = self
                    .notifications
                    .iter()
                    .filter(|n| n.read_at.is_none())
                    .count() as u64;
                let result = page_of(&self.notifications, request, config).map(|mut page| {
                    page.unread_count = Some(unread);
                    page
                });
                encode(id, result)
            }
            FeedRequest::Page {
                feed: FeedKind::Comments,
                request,
            } => encode(id, page_of(&self.comments, request, config)),
            FeedRequest::Page {
                feed: FeedKind::Documents,
                request,
            } => encode(id, page_of(&self.documents, request, config)),
            FeedRequest::CountSince { feed, since } => {
                let count = self.count_since(*feed, *since);
                serde_json::to_string(&ResponseFrame {
                    id,
                    response: FeedResponse::<()>::Count { count },
                })
            }
        }
    }

    pub fn count_since(&self, feed: FeedKind, since: DateTime<Utc>) -> u64 {
        match feed {
            FeedKind::Notifications => self.notifications.count_since(since),
            FeedKind::Comments => self.comments.count_since(since),
            FeedKind::Documents => self.documents.count_since(since),
        }
    }

    /// A few days of demo content ending at `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut feeds = Feeds::default();
        let titles = [
            "Die Wahl im Rückblick",
            "Was die Klimadaten zeigen",
            "Briefing aus Bern",
            "Neues aus der Community",
            "Das Editorial zum Wochenende",
            "Fragen an die Redaktion",
        ];

        for (n, title) in titles.iter().enumerate() {
            let published = now - Duration::hours(10 * n as i64 + 1);
            let document_id = format!("doc-{}", n);

            feeds.documents.insert(Document {
                id: document_id.clone(),
                meta: DocumentMeta {
                    title: title.to_string(),
                    path: format!("/{}/{}", published.format("%Y/%m/%d"), n),
                    publish_date: published,
                    template: Some(if n == 4 { "editorialNewsletter" } else { "article" }.into()),
                    kind: None,
                },
            });

            let comment_id = format!("comment-{}", n);
            feeds.comments.insert(Comment {
                id: comment_id.clone(),
                created_at: published + Duration::minutes(30),
                updated_at: published + Duration::minutes(30),
                preview: Some(format!("Zu «{}»: danke für die Recherche.", title)),
                published: n != 3,
                display_author: Some(format!("Leserin {}", n)),
            });

            feeds.notifications.insert(Notification {
                id: format!("notification-{}", n),
                created_at: published + Duration::minutes(31),
                read_at: if n >= 2 { Some(published + Duration::hours(2)) } else { None },
                object: Some(if n % 2 == 0 {
                    NotificationObject::Document { id: document_id }
                } else {
                    NotificationObject::Comment {
                        id: comment_id,
                        published: n != 3,
                    }
                }),
                content: Some(NotificationContent {
                    title: title.to_string(),
                    body: "Neue Antwort in einer Debatte, der Sie folgen.".into(),
                }),
            });
        }

        feeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use forum_feed_frontend::Cursor;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap()
    }

    #[test]
    fn notification_pages_carry_unread_count() {
        let feeds = Feeds::seeded(now());
        let frame = RequestFrame {
            id: 4,
            request: FeedRequest::Page {
                feed: FeedKind::Notifications,
                request: PageRequest {
                    first: Some(2),
                    ..PageRequest::default()
                },
            },
        };

        let reply = feeds.respond(&frame, &ServerConfig::default()).unwrap();
        let reply: ResponseFrame<Notification> = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply.id, 4);

        match reply.response {
            FeedResponse::Page(page) => {
                assert_eq!(page.items.len(), 2);
                assert_eq!(page.unread_count, Some(2));
                assert_eq!(page.total_count, Some(6));
                assert!(page.has_next_page());
            }
            other => panic!("expected a page, got {:?}", other),
        }
    }

    #[test]
    fn bad_cursor_becomes_an_error_reply() {
        let feeds = Feeds::seeded(now());
        let frame = RequestFrame {
            id: 9,
            request: FeedRequest::Page {
                feed: FeedKind::Documents,
                request: PageRequest {
                    after: Some(Cursor("nope".into())),
                    ..PageRequest::default()
                },
            },
        };

        let reply = feeds.respond(&frame, &ServerConfig::default()).unwrap();
        let reply: ResponseFrame<Document> = serde_json::from_str(&reply).unwrap();

        assert_eq!(reply.id, 9);
        assert_eq!(
            reply.response,
            FeedResponse::Error {
                message: "invalid cursor \"nope\"".into()
            }
        );
    }

    #[test]
    fn counts_items_newer_than_a_mark() {
        let feeds = Feeds::seeded(now());
        let mark = now() - Duration::hours(12);

        assert_eq!(feeds.count_since(FeedKind::Documents, mark), 2);
        assert_eq!(feeds.count_since(FeedKind::Comments, now()), 0);
    }
}
