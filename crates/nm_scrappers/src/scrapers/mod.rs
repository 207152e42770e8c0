use url::Url;

use crate::extract::{ArticleDetails, Candidate, Rule, SourceProfile};

pub mod jsonld;
pub mod mexico;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub emoji: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub emoji: &'static str,
    pub region: Region,
    /// Listing page scraped when no override is configured.
    pub default_url: &'static str,
    /// Maximum articles fetched per run.
    pub article_limit: usize,
}

/// A news source: where it lives and how its markup reads.
///
/// Implementations are plain data. Fetching, filtering and pacing are done
/// by [`crate::collector::SourceCollector`].
pub trait Scraper: Send + Sync {
    fn source_metadata(&self) -> SourceMetadata;

    fn profile(&self) -> &SourceProfile;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    fn extract_candidates(&self, html: &str, page_url: &Url) -> Vec<Candidate> {
        self.profile().extract_candidates(html, page_url)
    }

    fn extract_article(&self, html: &str, page_url: &Url, title: &str) -> ArticleDetails {
        self.profile().extract_article(html, page_url, title)
    }
}

pub type ScraperFactory = Box<dyn Fn() -> Box<dyn Scraper> + Send + Sync>;

/// Factories for every known source, in report order.
pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    mexico::get_scraper_factories()
}

pub fn get_scrapers() -> Vec<Box<dyn Scraper>> {
    get_scraper_factories().iter().map(|f| f()).collect()
}

/// The scraper whose site hosts `url`.
pub fn get_scraper_for_url(url: &str) -> Option<Box<dyn Scraper>> {
    get_scrapers().into_iter().find(|s| s.can_handle(url))
}

/// Scrapers selected by CLI name, in registry order. Unknown names are
/// returned as the error value.
pub fn get_scrapers_by_name(names: &[String]) -> std::result::Result<Vec<Box<dyn Scraper>>, Vec<String>> {
    let scrapers = get_scrapers();
    let unknown: Vec<String> = names
        .iter()
        .filter(|name| !scrapers.iter().any(|s| s.cli_names().contains(&name.as_str())))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }
    Ok(scrapers
        .into_iter()
        .filter(|s| names.iter().any(|name| s.cli_names().contains(&name.as_str())))
        .collect())
}

pub(crate) fn host_matches(url: &str, domain: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .map(|host| host == domain || host.ends_with(&format!(".{}", domain)))
        .unwrap_or(false)
}

/// Date cascade shared by the WordPress-based sources.
pub(crate) fn generic_date_rules() -> Vec<Rule> {
    vec![
        Rule::Attr("time[datetime]", "datetime"),
        Rule::Attr("meta[property='article:published_time']", "content"),
        Rule::JsonLd("datePublished"),
    ]
}
