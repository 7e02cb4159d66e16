use ns_core::Article;
use ns_search::{FailedSearch, Session};
use std::fmt::Write;

pub const EMPTY_STATE: &str = "No articles found. Try another search.";

pub fn render_article(position: usize, article: &Article) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "[{}] {}", position, article.title.trim());
    if let Some(image) = &article.url_to_image {
        let _ = writeln!(card, "    🖼  {}", image);
    }
    if let Some(author) = article.author.as_deref().filter(|a| !a.trim().is_empty()) {
        let _ = writeln!(card, "    by {}", author.trim());
    }
    if let Some(description) = article.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(card, "    {}", description.trim());
    }
    let _ = writeln!(
        card,
        "    {} · {}",
        article.source.name,
        article.published_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = write!(card, "    🔗 {}", article.url);
    card
}

/// The result area: nothing while loading, the empty-state message, or the cards.
pub fn render_results(session: &Session) -> String {
    if session.is_loading() {
        return String::new();
    }
    if session.is_empty_state() {
        return EMPTY_STATE.to_string();
    }
    session
        .articles()
        .iter()
        .enumerate()
        .map(|(i, article)| render_article(i + 1, article))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_history(entries: &[String]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let items = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("[{}] {}", i + 1, entry))
        .collect::<Vec<_>>()
        .join("  ");
    Some(format!("Recent searches: {}", items))
}

pub fn render_failure(failed: &FailedSearch) -> String {
    let mut message = format!("⚠️  Search for \"{}\" failed: {}", failed.query, failed.message);
    if failed.retryable {
        message.push_str("\n    Type :retry to try again.");
    }
    message
}
