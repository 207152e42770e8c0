pub mod collector;
pub mod dedupe;
pub mod extract;
pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use collector::{Collector, SourceCollector};
pub use dedupe::{deduplicate, Deduplicated};
pub use fetcher::HttpFetcher;
pub use manager::{merge, Collection, ScraperManager, SearchReport, SourceFailure, SourceResult, SummarizedArticle};
pub use scrapers::Scraper;

pub mod prelude {
    pub use super::collector::Collector;
    pub use super::scrapers::Scraper;
    pub use nm_core::{Article, Error, KeywordSet, Result};
}
