use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Human readable name of the backing service
    fn name(&self) -> &str;

    /// Search articles matching a free text query, in the order the service returns them
    async fn search(&self, query: &str) -> Result<Vec<Article>>;
}
