//! Per-source collection: listing page, keyword filter, article pages.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use nm_core::{Article, Error, KeywordSet, PageFetcher, Result};
use url::Url;

use crate::logging::Logger;
use crate::scrapers::Scraper;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Something that produces keyword-matching articles for one source.
#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &str;

    async fn collect(&self, keywords: &KeywordSet) -> Result<Vec<Article>>;
}

/// [`Collector`] driven by a [`Scraper`] profile.
pub struct SourceCollector {
    scraper: Box<dyn Scraper>,
    fetcher: Arc<dyn PageFetcher>,
    name: String,
    listing_url: String,
    article_limit: usize,
    delay: Duration,
    logger: Logger,
}

impl SourceCollector {
    pub fn new(scraper: Box<dyn Scraper>, fetcher: Arc<dyn PageFetcher>) -> Self {
        let meta = scraper.source_metadata();
        Self {
            scraper,
            fetcher,
            name: meta.name.to_string(),
            listing_url: meta.default_url.to_string(),
            article_limit: meta.article_limit,
            delay: DEFAULT_DELAY,
            logger: Logger::for_source(meta.name),
        }
    }

    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.listing_url = url.into();
        self
    }

    pub fn with_article_limit(mut self, limit: usize) -> Self {
        self.article_limit = limit;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    pub fn article_limit(&self) -> usize {
        self.article_limit
    }

    /// Fetch and extract a single article page. The title comes from the
    /// page's `<h1>` or `<title>`.
    pub async fn scrape_article(&self, url: &str) -> Result<Article> {
        let page_url = Url::parse(url)?;
        let html = self.fetcher.fetch(url).await?;
        let title = page_title(&html)
            .ok_or_else(|| Error::Scraping(format!("No title found at {}", url)))?;
        let details = self.scraper.extract_article(&html, &page_url, &title);
        Ok(Article::new(title, url, self.name.clone())
            .with_body(details.body_text)
            .with_image(details.image)
            .with_published(details.published))
    }
}

fn page_title(html: &str) -> Option<String> {
    let document = scraper::Html::parse_document(html);
    ["h1", "title"].iter().find_map(|css| {
        let sel = crate::extract::selector(css)?;
        document
            .select(&sel)
            .map(|el| crate::extract::normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
            .find(|t| !t.is_empty())
    })
}

#[async_trait]
impl Collector for SourceCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self, keywords: &KeywordSet) -> Result<Vec<Article>> {
        let listing_url = Url::parse(&self.listing_url).map_err(|e| {
            self.logger.error(&format!("Invalid listing URL {}: {}", self.listing_url, e));
            Error::from(e)
        })?;

        self.logger.info(&format!("Fetching listing {}", self.listing_url));
        let html = match self.fetcher.fetch(&self.listing_url).await {
            Ok(html) => html,
            Err(e) => {
                self.logger.warn(&format!("Could not fetch listing page: {}", e));
                return Ok(Vec::new());
            }
        };

        let candidates = self.scraper.extract_candidates(&html, &listing_url);
        self.logger.debug(&format!("Found {} candidates", candidates.len()));

        let mut articles = Vec::new();
        let mut fetched = 0;
        for candidate in candidates {
            if articles.len() >= self.article_limit {
                break;
            }
            if !keywords.matches(&candidate.title) {
                continue;
            }

            if fetched > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            fetched += 1;

            let page_url = match Url::parse(&candidate.link) {
                Ok(url) => url,
                Err(e) => {
                    self.logger.warn(&format!("Skipping {}: {}", candidate.link, e));
                    continue;
                }
            };
            let html = match self.fetcher.fetch(&candidate.link).await {
                Ok(html) => html,
                Err(e) => {
                    self.logger.warn(&format!("Skipping {}: {}", candidate.link, e));
                    continue;
                }
            };

            let details = self.scraper.extract_article(&html, &page_url, &candidate.title);
            self.logger.debug(&format!(
                "{}: {} characters of text",
                candidate.title,
                details.body_text.chars().count()
            ));
            let image = candidate.image.or(details.image);
            articles.push(
                Article::new(candidate.title, candidate.link, self.name.clone())
                    .with_body(details.body_text)
                    .with_image(image)
                    .with_published(details.published),
            );
        }

        self.logger.info(&format!("Collected {} matching articles", articles.len()));
        Ok(articles)
    }
}
