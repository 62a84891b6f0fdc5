use std::fmt;

/// Opaque position marker handed out by a data source. Only ever echoed
/// back verbatim.
#[derive(Hash, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<Cursor>,
}

/// One fetched batch, in the connection shape the GraphQL backend returns:
/// `{ nodes, pageInfo: { hasNextPage, endCursor }, totalCount }`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(rename = "nodes")]
    pub items: Vec<T>,
    pub page_info: PageInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Page {
            items,
            page_info,
            total_count: None,
            unread_count: None,
        }
    }

    /// A terminal page: nothing follows it.
    pub fn last(items: Vec<T>) -> Self {
        Page::new(items, PageInfo::default())
    }

    pub fn empty() -> Self {
        Page::last(Vec::new())
    }

    pub fn with_total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.has_next_page
    }

    pub fn end_cursor(&self) -> Option<&Cursor> {
        self.page_info.end_cursor.as_ref()
    }
}

/// Variables of a page query. `after: None` asks for the first page.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub after: Option<Cursor>,
    #[serde(default)]
    pub first: Option<u32>,
    #[serde(default)]
    pub filter: Option<String>,
}

impl PageRequest {
    pub fn first_page(filter: Option<String>) -> Self {
        PageRequest {
            after: None,
            first: None,
            filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_reads_connection_shape() {
        let raw = r#"{
            "nodes": [1, 2, 3],
            "pageInfo": { "hasNextPage": true, "endCursor": "abc" },
            "totalCount": 12
        }"#;

        let page: Page<u32> = serde_json::from_str(raw).unwrap();

        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.has_next_page());
        assert_eq!(page.end_cursor(), Some(&Cursor("abc".into())));
        assert_eq!(page.total_count, Some(12));
        assert_eq!(page.unread_count, None);
    }

    #[test]
    fn terminal_page_without_cursor() {
        let raw = r#"{ "nodes": [], "pageInfo": { "hasNextPage": false } }"#;
        let page: Page<u32> = serde_json::from_str(raw).unwrap();
        assert_eq!(page, Page::empty());
    }

    #[test]
    fn cursor_is_serialized_verbatim() {
        let request = PageRequest {
            after: Some(Cursor("opaque==".into())),
            first: Some(5),
            filter: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"after":"opaque==","first":5,"filter":null}"#);
    }
}
