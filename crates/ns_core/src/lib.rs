pub mod error;
pub mod search;
pub mod storage;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use search::SearchService;
pub use storage::KeyValueStore;
pub use types::{Article, ArticleSource};

pub mod prelude {
    pub use super::{Article, ArticleSource, Error, KeyValueStore, Result, SearchService};
}
