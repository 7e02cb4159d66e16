use ns_core::{Article, Error, ErrorKind, Result, SearchService};
use ns_storage::HistoryStore;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A search that failed while it was the latest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSearch {
    pub query: String,
    pub message: String,
    pub kind: ErrorKind,
    pub retryable: bool,
}

/// Everything the result screen renders.
#[derive(Debug, Clone, Default)]
pub struct Session {
    query: String,
    articles: Vec<Article>,
    loading: bool,
    last_error: Option<FailedSearch>,
}

impl Session {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&FailedSearch> {
        self.last_error.as_ref()
    }

    /// True when the "no articles" message should be shown.
    pub fn is_empty_state(&self) -> bool {
        self.articles.is_empty() && !self.loading
    }
}

/// Identifies one dispatched request. Only the ticket of the most recent
/// dispatch may change the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// An issued but not yet awaited request, safe to move onto another task.
pub struct PendingSearch {
    ticket: SearchTicket,
    service: Arc<dyn SearchService>,
}

impl PendingSearch {
    pub fn ticket(&self) -> &SearchTicket {
        &self.ticket
    }

    pub async fn run(self) -> (SearchTicket, Result<Vec<Article>>) {
        let result = self.service.search(&self.ticket.query).await;
        (self.ticket, result)
    }
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// Blank query, nothing was sent.
    Ignored,
    /// The article list was replaced.
    Applied { count: usize },
    /// A newer search was dispatched before this response arrived; it was dropped.
    Superseded,
    /// The request failed; the previous article list is still shown.
    Failed(Error),
}

impl SearchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SearchOutcome::Applied { .. })
    }
}

pub struct QueryController {
    service: Arc<dyn SearchService>,
    history: Arc<HistoryStore>,
    session: Session,
    generation: u64,
}

impl QueryController {
    pub fn new(service: Arc<dyn SearchService>, history: Arc<HistoryStore>) -> Self {
        Self {
            service,
            history,
            session: Session::default(),
            generation: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.session.query = text.into();
    }

    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Starts a search for the current query text.
    ///
    /// Returns `None` without touching the session when the query is blank.
    /// Any search dispatched earlier becomes stale.
    pub fn dispatch(&mut self) -> Option<PendingSearch> {
        let query = self.session.query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search");
            return None;
        }

        self.generation += 1;
        let ticket = SearchTicket {
            generation: self.generation,
            query: query.to_string(),
        };
        self.session.loading = true;
        self.session.last_error = None;
        info!(
            "🔎 Searching {} for {:?} (#{})",
            self.service.name(),
            ticket.query,
            ticket.generation
        );

        Some(PendingSearch {
            ticket,
            service: self.service.clone(),
        })
    }

    /// Applies the response of a dispatched search.
    pub async fn complete(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<Article>>,
    ) -> SearchOutcome {
        if !self.is_current(&ticket) {
            debug!(
                "Dropping response for {:?} (#{}), #{} is newer",
                ticket.query, ticket.generation, self.generation
            );
            return SearchOutcome::Superseded;
        }

        self.session.loading = false;
        match result {
            Ok(articles) => {
                let count = articles.len();
                self.session.articles = articles;
                self.history.record(&ticket.query).await;
                info!("✨ Showing {} articles for {:?}", count, ticket.query);
                SearchOutcome::Applied { count }
            }
            Err(e) => {
                error!("❌ Search for {:?} failed: {}", ticket.query, e);
                self.session.last_error = Some(FailedSearch {
                    query: ticket.query,
                    message: e.to_string(),
                    kind: e.kind(),
                    retryable: e.is_retryable(),
                });
                SearchOutcome::Failed(e)
            }
        }
    }

    pub async fn submit(&mut self) -> SearchOutcome {
        match self.dispatch() {
            Some(pending) => self.run_to_completion(pending).await,
            None => SearchOutcome::Ignored,
        }
    }

    pub async fn select_history_item(&mut self, text: impl Into<String>) -> SearchOutcome {
        self.set_query_text(text);
        self.submit().await
    }

    /// Puts the query of the last failed search back and dispatches it.
    pub fn dispatch_retry(&mut self) -> Option<PendingSearch> {
        let query = self.session.last_error.as_ref()?.query.clone();
        self.set_query_text(query);
        self.dispatch()
    }

    pub async fn retry(&mut self) -> SearchOutcome {
        match self.dispatch_retry() {
            Some(pending) => self.run_to_completion(pending).await,
            None => SearchOutcome::Ignored,
        }
    }

    async fn run_to_completion(&mut self, pending: PendingSearch) -> SearchOutcome {
        let (ticket, result) = pending.run().await;
        self.complete(ticket, result).await
    }
}
