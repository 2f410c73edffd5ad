//! Template loading: per-`src` document cache and fetch tickets.

use crate::document::VectorDocument;
use std::collections::HashMap;
use std::sync::Arc;
use teeforge_core::view::{ViewKey, ViewMap};

/// Identifies one outstanding fetch. Only the newest ticket per view is honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    view: ViewKey,
    src: String,
    generation: u64,
}

impl FetchTicket {
    pub fn view(&self) -> ViewKey {
        self.view
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

/// A fetch the platform should perform and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub url: String,
}

/// Parsed-document cache keyed by `src`, plus fetch generations per view.
#[derive(Debug, Default)]
pub struct TemplateLoader {
    cache: HashMap<String, Arc<VectorDocument>>,
    latest: ViewMap<u64>,
    next_generation: u64,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, src: &str) -> Option<Arc<VectorDocument>> {
        self.cache.get(src).cloned()
    }

    pub fn store(&mut self, src: impl Into<String>, document: Arc<VectorDocument>) {
        self.cache.insert(src.into(), document);
    }

    pub fn evict(&mut self, src: &str) {
        self.cache.remove(src);
    }

    /// Issue a ticket for fetching `src` into `view`, superseding any
    /// outstanding ticket for that view.
    pub fn begin(&mut self, view: ViewKey, src: &str) -> FetchTicket {
        self.next_generation += 1;
        self.latest.insert(view, self.next_generation);
        FetchTicket {
            view,
            src: src.to_string(),
            generation: self.next_generation,
        }
    }

    /// Whether `ticket` is still the newest for its view.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.get(ticket.view) == Some(&ticket.generation)
    }

    /// Retire the ticket once its result is applied.
    pub fn finish(&mut self, ticket: &FetchTicket) {
        if self.is_current(ticket) {
            self.latest.remove(ticket.view);
        }
    }

    /// Whether a fetch is outstanding for `view`.
    pub fn is_loading(&self, view: ViewKey) -> bool {
        self.latest.contains(view)
    }

    /// Invalidate any outstanding ticket for `view`.
    pub fn cancel(&mut self, view: ViewKey) {
        self.latest.remove(view);
    }
}
