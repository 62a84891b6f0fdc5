use async_trait::async_trait;

use crate::page::{Page, PageRequest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never got a usable answer.
    #[error("network error: {0}")]
    Network(String),
    /// The data source answered with an error.
    #[error("source error: {0}")]
    Source(String),
}

/// A paginated data source. No retries happen behind this trait, and two
/// calls with the same cursor may overlap if the source changed in between.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>, FetchError>;
}

