use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::hash::Hash;

/// Anything a paginated view can hold: identified, and placed in time.
pub trait Item {
    type Id: Eq + Hash + Clone + Debug;

    fn id(&self) -> &Self::Id;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Items that carry a per-viewer read marker.
pub trait Readable {
    fn read_at(&self) -> Option<DateTime<Utc>>;
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "__typename")]
pub enum NotificationObject {
    Document { id: String },
    Comment { id: String, published: bool },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub object: Option<NotificationObject>,
    #[serde(default)]
    pub content: Option<NotificationContent>,
}

impl Notification {
    /// The referenced object is gone, or is a comment that was unpublished
    /// after the notification went out.
    pub fn is_unpublished(&self) -> bool {
        match &self.object {
            None => true,
            Some(NotificationObject::Comment { published, .. }) => !published,
            Some(NotificationObject::Document { .. }) => false,
        }
    }
}

impl Item for Notification {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Readable for Notification {
    fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub preview: Option<String>,
    pub published: bool,
    #[serde(default)]
    pub display_author: Option<String>,
}

impl Item for Comment {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub title: String,
    pub path: String,
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub meta: DocumentMeta,
}

impl Item for Document {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    // documents are placed by publication, not by row creation
    fn created_at(&self) -> DateTime<Utc> {
        self.meta.publish_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_from_graphql_shape() {
        let raw = r#"{
            "id": "n1",
            "createdAt": "2024-01-01T10:00:00Z",
            "readAt": null,
            "object": { "__typename": "Comment", "id": "c9", "published": false },
            "content": { "title": "Reply", "body": "hello" }
        }"#;

        let notification: Notification = serde_json::from_str(raw).unwrap();

        assert_eq!(notification.id(), "n1");
        assert_eq!(notification.read_at(), None);
        assert!(notification.is_unpublished());
        assert_eq!(
            notification.content.as_ref().map(|c| c.title.as_str()),
            Some("Reply")
        );
    }

    #[test]
    fn notification_without_object_is_unpublished() {
        let raw = r#"{ "id": "n2", "createdAt": "2024-01-01T10:00:00Z" }"#;
        let notification: Notification = serde_json::from_str(raw).unwrap();
        assert!(notification.is_unpublished());
    }

    #[test]
    fn document_is_placed_by_publish_date() {
        let raw = r#"{
            "id": "d1",
            "meta": {
                "title": "Editorial",
                "path": "/2024/01/02/editorial",
                "publishDate": "2024-01-02T06:00:00Z",
                "template": "editorialNewsletter"
            }
        }"#;

        let document: Document = serde_json::from_str(raw).unwrap();

        assert_eq!(document.created_at(), document.meta.publish_date);
        assert_eq!(document.meta.kind, None);
    }
}
