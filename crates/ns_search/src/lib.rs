pub mod controller;
pub mod newsapi;

pub use controller::{
    FailedSearch, PendingSearch, QueryController, SearchOutcome, SearchTicket, Session,
};
pub use newsapi::{NewsApiClient, NewsApiConfig, SortBy};

pub mod prelude {
    pub use super::controller::{QueryController, SearchOutcome, Session};
    pub use super::newsapi::{NewsApiClient, NewsApiConfig};
    pub use ns_core::{Article, Error, Result, SearchService};
}
