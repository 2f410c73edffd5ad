//! Template fetching.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use teeforge_core::catalog::BoxFuture;
use thiserror::Error;

/// Template fetch errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Network error: {0}")]
    Network(String),
}

/// Fetches template markup by URL.
///
/// Implementations wrap the platform's HTTP client. The designer only
/// ever awaits one fetch per view at a time.
pub trait TemplateFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<String, FetchError>>;
}

/// Fetcher serving fixed responses, for tests and offline embedding.
#[derive(Debug, Default)]
pub struct StaticTemplateFetcher {
    responses: HashMap<String, Result<String, FetchError>>,
    fetches: AtomicUsize,
}

impl StaticTemplateFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `markup` for `url`.
    pub fn with(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Ok(markup.into()));
        self
    }

    /// Fail requests for `url` with `error`.
    pub fn with_error(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl TemplateFetcher for StaticTemplateFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<String, FetchError>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let response = self
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(url.to_string())));
        Box::pin(async move { response })
    }
}
