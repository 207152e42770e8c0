use std::sync::Arc;
use futures::future::join_all;
use nm_core::{Article, Error, KeywordSet};
use nm_inference::Summarizer;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::collector::Collector;
use crate::dedupe::deduplicate;

pub const DEFAULT_COLLECTOR_CONCURRENCY: usize = 4;
pub const DEFAULT_SUMMARY_CONCURRENCY: usize = 1;

/// A collector that could not deliver, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// Outcome of one collector run, keyed by collector name.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source: String,
    pub outcome: std::result::Result<Vec<Article>, String>,
}

impl SourceResult {
    pub fn ok(source: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            source: source.into(),
            outcome: Ok(articles),
        }
    }

    pub fn failed(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            outcome: Err(message.into()),
        }
    }
}

/// Articles from every source, concatenated in source order.
#[derive(Debug, Clone, Default)]
pub struct Merged {
    pub articles: Vec<Article>,
    pub source_counts: Vec<(String, usize)>,
    pub failures: Vec<SourceFailure>,
}

/// Concatenate per-source results in the order given. Failed sources count
/// as zero articles and are listed in `failures`.
pub fn merge(results: &[SourceResult]) -> Merged {
    let mut merged = Merged::default();
    for result in results {
        match &result.outcome {
            Ok(articles) => {
                merged.source_counts.push((result.source.clone(), articles.len()));
                merged.articles.extend(articles.iter().cloned());
            }
            Err(message) => {
                merged.source_counts.push((result.source.clone(), 0));
                merged.failures.push(SourceFailure {
                    source: result.source.clone(),
                    message: message.clone(),
                });
            }
        }
    }
    merged
}

/// Merged and deduplicated articles, before summarization.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub articles: Vec<Article>,
    pub source_counts: Vec<(String, usize)>,
    pub failures: Vec<SourceFailure>,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub keywords: Vec<String>,
    pub articles: Vec<SummarizedArticle>,
    pub source_counts: Vec<(String, usize)>,
    pub failures: Vec<SourceFailure>,
    pub duplicates_removed: usize,
}

/// Runs collectors concurrently, merges, deduplicates and summarizes.
pub struct ScraperManager {
    collectors: Vec<Arc<dyn Collector>>,
    summarizer: Summarizer,
    semaphore: Arc<Semaphore>,
    summary_concurrency: usize,
}

impl ScraperManager {
    pub fn new(summarizer: Summarizer) -> Self {
        Self {
            collectors: Vec::new(),
            summarizer,
            semaphore: Arc::new(Semaphore::new(DEFAULT_COLLECTOR_CONCURRENCY)),
            summary_concurrency: DEFAULT_SUMMARY_CONCURRENCY,
        }
    }

    pub fn add_collector(&mut self, collector: Arc<dyn Collector>) {
        self.collectors.push(collector);
    }

    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.add_collector(collector);
        self
    }

    pub fn with_collector_concurrency(mut self, concurrency: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        self
    }

    pub fn with_summary_concurrency(mut self, concurrency: usize) -> Self {
        self.summary_concurrency = concurrency.max(1);
        self
    }

    pub fn collector_names(&self) -> Vec<&str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// One task per collector, joined before returning. A collector that
    /// errors or panics contributes nothing and is reported as a failure.
    pub async fn run_collectors(&self, keywords: &KeywordSet) -> Vec<SourceResult> {
        let handles: Vec<_> = self
            .collectors
            .iter()
            .map(|collector| {
                let collector = collector.clone();
                let keywords = keywords.clone();
                let semaphore = self.semaphore.clone();
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::External(e.into()))?;
                    collector.collect(&keywords).await
                })
            })
            .collect();

        let outcomes = join_all(handles).await;

        self.collectors
            .iter()
            .zip(outcomes)
            .map(|(collector, outcome)| {
                let source = collector.name().to_string();
                let message = match outcome {
                    Ok(Ok(articles)) => return SourceResult::ok(source, articles),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) if e.is_panic() => "collector panicked".to_string(),
                    Err(e) => e.to_string(),
                };
                warn!(source = %source, error = %message, "Source failed, continuing without it");
                SourceResult::failed(source, message)
            })
            .collect()
    }

    pub async fn collect(&self, keywords: &KeywordSet) -> Collection {
        let results = self.run_collectors(keywords).await;
        let merged = merge(&results);
        let total = merged.articles.len();
        let deduped = deduplicate(merged.articles);
        info!(
            total,
            unique = deduped.articles.len(),
            failures = merged.failures.len(),
            "Collection finished"
        );
        Collection {
            articles: deduped.articles,
            source_counts: merged.source_counts,
            failures: merged.failures,
            duplicates_removed: deduped.removed,
        }
    }

    /// Pair every article with its synopsis, in input order.
    pub async fn summarize_all(&self, articles: Vec<Article>) -> Vec<SummarizedArticle> {
        let texts: Vec<&str> = articles.iter().map(|a| a.body_text.as_str()).collect();
        let summaries = self.summarizer.summarize_many(&texts, self.summary_concurrency).await;
        articles
            .into_iter()
            .zip(summaries)
            .map(|(article, summary)| SummarizedArticle { article, summary })
            .collect()
    }

    /// Summarize a finished collection into a report. `max_articles` caps
    /// how many deduplicated articles are summarized and reported.
    pub async fn finish(
        &self,
        keywords: &KeywordSet,
        mut collection: Collection,
        max_articles: Option<usize>,
    ) -> SearchReport {
        if let Some(max) = max_articles {
            collection.articles.truncate(max);
        }
        let articles = self.summarize_all(collection.articles).await;
        SearchReport {
            keywords: keywords.iter().map(str::to_string).collect(),
            articles,
            source_counts: collection.source_counts,
            failures: collection.failures,
            duplicates_removed: collection.duplicates_removed,
        }
    }

    /// Full pipeline: collect, merge, deduplicate, summarize.
    pub async fn search(&self, keywords: &KeywordSet, max_articles: Option<usize>) -> SearchReport {
        let collection = self.collect(keywords).await;
        self.finish(keywords, collection, max_articles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use async_trait::async_trait;
    use nm_core::{InferenceModel, Result};
    use nm_inference::summarizer::INSUFFICIENT_TEXT_MESSAGE;
    use crate::collector::tests::MapFetcher;
    use crate::collector::SourceCollector;
    use crate::scrapers::mexico::{MineriaEnLineaScraper, MundoMineroScraper};

    enum Behavior {
        Return(Vec<Article>),
        Fail(&'static str),
        Panic,
    }

    struct MockCollector {
        name: &'static str,
        behavior: Behavior,
    }

    #[async_trait]
    impl Collector for MockCollector {
        fn name(&self) -> &str {
            self.name
        }

        async fn collect(&self, _keywords: &KeywordSet) -> Result<Vec<Article>> {
            match &self.behavior {
                Behavior::Return(articles) => Ok(articles.clone()),
                Behavior::Fail(msg) => Err(Error::Scraping(msg.to_string())),
                Behavior::Panic => panic!("selector blew up"),
            }
        }
    }

    #[derive(Debug, Default)]
    struct EchoModel {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl InferenceModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn summarize(&self, text: &str) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            Ok(format!("resumen: {}", text.split_whitespace().next().unwrap_or_default()))
        }
    }

    fn article(title: &str, source: &str) -> Article {
        Article::new(title, format!("https://{}.mx/{}", source, title.trim().len()), source)
            .with_body(format!("{} cuerpo suficientemente largo para pasar el umbral mínimo", title.trim()))
    }

    fn mock(name: &'static str, behavior: Behavior) -> Arc<dyn Collector> {
        Arc::new(MockCollector { name, behavior })
    }

    fn manager(model: Arc<EchoModel>) -> ScraperManager {
        ScraperManager::new(Summarizer::new(model as Arc<dyn InferenceModel>))
    }

    fn titles(articles: &[SummarizedArticle]) -> Vec<&str> {
        articles.iter().map(|a| a.article.title.as_str()).collect()
    }

    #[test]
    fn test_merge_keeps_source_order() {
        let merged = merge(&[
            SourceResult::ok("uno", vec![article("A", "uno"), article("B", "uno")]),
            SourceResult::failed("dos", "timeout"),
            SourceResult::ok("tres", vec![article("C", "tres")]),
        ]);
        let got: Vec<&str> = merged.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(got, vec!["A", "B", "C"]);
        assert_eq!(
            merged.source_counts,
            vec![("uno".to_string(), 2), ("dos".to_string(), 0), ("tres".to_string(), 1)]
        );
        assert_eq!(
            merged.failures,
            vec![SourceFailure {
                source: "dos".to_string(),
                message: "timeout".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_one_failing_collector_is_isolated() {
        let manager = manager(Arc::new(EchoModel::default()))
            .with_collector(mock("uno", Behavior::Return(vec![article("A", "uno")])))
            .with_collector(mock("dos", Behavior::Fail("listing markup changed")))
            .with_collector(mock("tres", Behavior::Return(vec![article("C", "tres")])))
            .with_collector(mock("cuatro", Behavior::Return(vec![article("D", "cuatro")])));

        let collection = manager.collect(&KeywordSet::default()).await;
        let got: Vec<&str> = collection.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(got, vec!["A", "C", "D"]);
        assert_eq!(collection.failures.len(), 1);
        assert_eq!(collection.failures[0].source, "dos");
        assert!(collection.failures[0].message.contains("listing markup changed"));
        assert!(collection.articles.iter().all(|a| a.source != "dos"));
    }

    #[tokio::test]
    async fn test_panicking_collector_is_isolated() {
        let manager = manager(Arc::new(EchoModel::default()))
            .with_collector(mock("uno", Behavior::Panic))
            .with_collector(mock("dos", Behavior::Return(vec![article("B", "dos")])));

        let collection = manager.collect(&KeywordSet::default()).await;
        assert_eq!(collection.articles.len(), 1);
        assert_eq!(collection.failures[0].source, "uno");
        assert_eq!(collection.failures[0].message, "collector panicked");
    }

    #[tokio::test]
    async fn test_end_to_end_merge_dedupe_summarize() {
        let model = Arc::new(EchoModel::default());
        let manager = manager(model.clone())
            .with_collector(mock(
                "uno",
                Behavior::Return(vec![article("Oro sube", "uno"), article("Plata baja", "uno")]),
            ))
            .with_collector(mock("dos", Behavior::Fail("HTTP status 503")))
            .with_collector(mock(
                "tres",
                Behavior::Return(vec![article("  PLATA BAJA ", "tres"), article("Cobre estable", "tres")]),
            ))
            .with_collector(mock("cuatro", Behavior::Return(vec![article("Litio en Sonora", "cuatro")])))
            .with_collector_concurrency(2);

        let keywords = KeywordSet::new(["oro", "plata", "cobre", "litio"]);
        let report = manager.search(&keywords, None).await;

        assert_eq!(
            titles(&report.articles),
            vec!["Oro sube", "Plata baja", "Cobre estable", "Litio en Sonora"]
        );
        assert_eq!(report.articles[1].article.source, "uno");
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.articles[0].summary, "resumen: Oro");
        assert_eq!(*model.calls.lock().unwrap(), 4);
        assert_eq!(report.keywords, vec!["oro", "plata", "cobre", "litio"]);
        assert_eq!(
            report.source_counts,
            vec![
                ("uno".to_string(), 2),
                ("dos".to_string(), 0),
                ("tres".to_string(), 2),
                ("cuatro".to_string(), 1)
            ]
        );
    }

    #[tokio::test]
    async fn test_max_articles_limits_summaries() {
        let model = Arc::new(EchoModel::default());
        let many: Vec<Article> = (0..5).map(|i| article(&format!("Nota {}", i), "uno")).collect();
        let manager = manager(model.clone()).with_collector(mock("uno", Behavior::Return(many)));

        let report = manager.search(&KeywordSet::default(), Some(2)).await;
        assert_eq!(titles(&report.articles), vec!["Nota 0", "Nota 1"]);
        assert_eq!(*model.calls.lock().unwrap(), 2);
        assert_eq!(report.source_counts, vec![("uno".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_short_bodies_get_fixed_message() {
        let manager = manager(Arc::new(EchoModel::default()));
        let summarized = manager
            .summarize_all(vec![Article::new("Sin texto", "https://a.mx/1", "uno")])
            .await;
        assert_eq!(summarized[0].summary, INSUFFICIENT_TEXT_MESSAGE);
    }

    #[tokio::test]
    async fn test_with_source_collectors() {
        let fetcher = Arc::new(MapFetcher::default().with_page(
            "https://mineriaenlinea.com/",
            r#"<article><h2 class="entry-title"><a href="/oro">Oro en Zacatecas</a></h2></article>"#,
        ).with_page(
            "https://mineriaenlinea.com/oro",
            r#"<div class="entry-content">Zacatecas reporta hallazgo de oro en una nueva veta del distrito minero.</div>"#,
        ));
        let manager = manager(Arc::new(EchoModel::default()))
            .with_collector(Arc::new(
                SourceCollector::new(Box::new(MineriaEnLineaScraper::new()), fetcher.clone())
                    .with_delay(Duration::ZERO),
            ))
            .with_collector(Arc::new(
                SourceCollector::new(Box::new(MundoMineroScraper::new()), fetcher.clone())
                    .with_delay(Duration::ZERO),
            ));

        let report = manager.search(&KeywordSet::new(["oro"]), None).await;
        assert_eq!(titles(&report.articles), vec!["Oro en Zacatecas"]);
        assert_eq!(report.articles[0].summary, "resumen: Zacatecas");
        // an unreachable listing is an empty source, not a failure
        assert!(report.failures.is_empty());
        assert_eq!(
            report.source_counts,
            vec![("Minería en Línea".to_string(), 1), ("Mundo Minero".to_string(), 0)]
        );
    }
}
