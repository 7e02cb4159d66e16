use chrono::NaiveDate;
use clap::Parser;
use ns_core::{Error, Result};
use ns_search::newsapi::DEFAULT_BASE_URL;
use ns_search::{NewsApiClient, NewsApiConfig, QueryController, SearchOutcome, SortBy};
use ns_storage::HistoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod duration;
mod interactive;
mod logging;
mod render;
mod spinner;

use duration::HumanDuration;
use render::{render_failure, render_history, render_results};
use spinner::Spinner;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search recent news articles from the terminal", long_about = None)]
pub struct Cli {
    /// News API credential
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "NEWSAPI_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Only articles published on or after this date (YYYY-MM-DD)
    #[arg(long, default_value = "2024-06-06")]
    from: NaiveDate,
    #[arg(long, default_value = "publishedAt", help = "Result order: publishedAt (default), relevancy, popularity")]
    sort_by: SortBy,
    #[arg(long)]
    page_size: Option<u32>,
    /// Two-letter language code, e.g. en
    #[arg(long)]
    language: Option<String>,
    /// Give up on a search after this long (e.g. 30s, 1m). Waits forever if unset
    #[arg(long)]
    timeout: Option<HumanDuration>,
    #[arg(long, env = "NS_STORAGE", default_value = "file", help = "Where recent searches are kept: file (default) or memory")]
    storage: String,
    /// Storage file used by the file backend
    #[arg(long, env = "NS_STORAGE_PATH")]
    storage_path: Option<PathBuf>,
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run one search and print the results
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show recent searches
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
    /// Search repeatedly from a prompt (default)
    Interactive,
}

impl Cli {
    fn news_api_config(&self) -> Result<NewsApiConfig> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            Error::Config("News API key is required (--api-key or NEWSAPI_KEY)".to_string())
        })?;
        let mut config = NewsApiConfig::new(api_key).with_base_url(self.base_url.clone());
        config.from = self.from;
        config.sort_by = self.sort_by;
        config.page_size = self.page_size;
        config.language = self.language.clone();
        config.timeout = self.timeout.map(|t| t.0);
        Ok(config)
    }

    fn controller(&self, history: Arc<HistoryStore>) -> Result<QueryController> {
        let client = NewsApiClient::new(self.news_api_config()?)?;
        info!("📡 Search service ready ({})", client.endpoint());
        Ok(QueryController::new(Arc::new(client), history))
    }
}

async fn search_once(mut controller: QueryController, query: String) -> Result<()> {
    let spinner = Spinner::start(format!("Searching for \"{}\"...", query.trim()));
    controller.set_query_text(query);
    let outcome = controller.submit().await;
    spinner.stop();

    match outcome {
        SearchOutcome::Failed(e) => {
            if let Some(failed) = controller.session().last_error() {
                eprintln!("{}", render_failure(failed));
            }
            Err(e)
        }
        SearchOutcome::Ignored => Err(Error::Config("Search query must not be blank".to_string())),
        _ => {
            println!("{}", render_results(controller.session()));
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let storage = ns_storage::create_storage(&cli.storage, cli.storage_path.as_deref()).await?;
    let history = Arc::new(HistoryStore::new(storage));
    history.load().await;

    match cli.command {
        Some(Commands::History { clear: true }) => {
            history.clear().await?;
            println!("Recent searches cleared.");
        }
        Some(Commands::History { clear: false }) => match render_history(&history.entries().await) {
            Some(line) => println!("{}", line),
            None => println!("No recent searches yet."),
        },
        Some(Commands::Search { ref query }) => {
            let controller = cli.controller(history)?;
            search_once(controller, query.join(" ")).await?;
        }
        Some(Commands::Interactive) | None => {
            let controller = cli.controller(history)?;
            interactive::run(controller).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ns", "--api-key", "k", "search", "climate", "change"]).unwrap();
        assert_eq!(cli.from, NaiveDate::from_ymd_opt(2024, 6, 6).unwrap());
        assert_eq!(cli.sort_by, SortBy::PublishedAt);
        assert_eq!(cli.storage, "file");
        match cli.command {
            Some(Commands::Search { ref query }) => assert_eq!(query.join(" "), "climate change"),
            ref other => panic!("unexpected command: {:?}", other),
        }

        let config = cli.news_api_config().unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "ns",
            "--api-key",
            "k",
            "--from",
            "2025-01-01",
            "--sort-by",
            "relevancy",
            "--timeout",
            "1m",
            "--page-size",
            "10",
            "history",
            "--clear",
        ])
        .unwrap();
        let config = cli.news_api_config().unwrap();
        assert_eq!(config.from, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(config.sort_by, SortBy::Relevancy);
        assert_eq!(config.timeout, Some(std::time::Duration::from_secs(60)));
        assert_eq!(config.page_size, Some(10));
        assert!(matches!(cli.command, Some(Commands::History { clear: true })));
    }

    #[test]
    fn test_missing_api_key() {
        let mut cli = Cli::try_parse_from(["ns", "history"]).unwrap();
        cli.api_key = None;
        assert!(matches!(cli.news_api_config(), Err(Error::Config(_))));
    }
}
