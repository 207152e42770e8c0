use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use nm_core::{Error, KeywordSet, PageFetcher, Result};
use nm_inference::{create_model, Summarizer};
use nm_scrappers::logging::{init_logging, level_for_verbosity};
use nm_scrappers::scrapers::{get_scraper_for_url, get_scrapers};
use nm_scrappers::{HttpFetcher, ScraperManager, SourceCollector};
use tracing::info;

mod config;
mod report;

use config::{default_keywords, AppConfig, CliSettings, FileConfig, HumanDuration};

#[derive(Parser, Debug)]
#[command(author, version, about = "Mexican mining news: scrape, filter, summarize", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// TOML file with per-source overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, env = "NM_MODEL", global = true, help = "Summarization backend: openai (default), dummy")]
    model: Option<String>,
    /// Model identifier sent to the API, e.g. gpt-3.5-turbo
    #[arg(long, env = "NM_MODEL_NAME", global = true)]
    model_name: Option<String>,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "NM_API_BASE_URL", global = true)]
    api_base_url: Option<String>,
    /// Per-request timeout (e.g. 15s, 500ms)
    #[arg(long, global = true)]
    timeout: Option<HumanDuration>,
    /// Pause between article fetches of one source (e.g. 1s, 0)
    #[arg(long, global = true)]
    delay: Option<HumanDuration>,
    /// Sources scraped at the same time
    #[arg(long, global = true)]
    concurrency: Option<usize>,
    /// Summaries requested at the same time
    #[arg(long, global = true)]
    summary_concurrency: Option<usize>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Search every source for articles matching the keywords
    Search {
        /// Comma separated keywords; "" matches every article
        #[arg(short, long)]
        keywords: Option<String>,
        /// Only scrape these sources (see `nm list`)
        #[arg(short, long = "source", value_delimiter = ',')]
        sources: Vec<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Summarize and show at most this many articles
        #[arg(long)]
        max_articles: Option<usize>,
    },
    /// List available sources
    List,
    /// Scrape and summarize one article URL
    Article {
        url: String,
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn settings(&self) -> CliSettings {
        CliSettings {
            model: self.model.clone(),
            model_name: self.model_name.clone(),
            api_key: self.api_key.clone(),
            api_base_url: self.api_base_url.clone(),
            timeout: self.timeout.map(|d| d.0),
            delay: self.delay.map(|d| d.0),
            concurrency: self.concurrency,
            summary_concurrency: self.summary_concurrency,
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(AppConfig::from_parts(self.settings(), file))
    }
}

async fn build_manager(config: &AppConfig, sources: &[String]) -> Result<ScraperManager> {
    let plan = config.source_plan(sources)?;
    let model = create_model(Some(config.inference_config())).await?;
    info!("🧠 Summaries by {}", model.name());

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(config.timeout)?);
    let mut manager = ScraperManager::new(Summarizer::new(model))
        .with_collector_concurrency(config.concurrency)
        .with_summary_concurrency(config.summary_concurrency);

    for source in plan {
        let collector = SourceCollector::new(source.scraper, fetcher.clone())
            .with_listing_url(source.listing_url)
            .with_article_limit(source.article_limit)
            .with_delay(config.delay);
        manager.add_collector(Arc::new(collector));
    }
    info!("🦗 Sources: {}", manager.collector_names().join(", "));
    Ok(manager)
}

async fn search(
    config: &AppConfig,
    keywords: KeywordSet,
    sources: &[String],
    json: bool,
    max_articles: Option<usize>,
) -> Result<()> {
    let manager = build_manager(config, sources).await?;

    let collection = manager.collect(&keywords).await;
    if !json {
        eprint!("{}", report::render_collection_status(&collection));
    }
    let search_report = manager.finish(&keywords, collection, max_articles).await;

    if json {
        println!("{}", report::render_json(&search_report)?);
    } else {
        print!("{}", report::render_text(&search_report));
    }
    Ok(())
}

fn list(config: &AppConfig) {
    for scraper in get_scrapers() {
        let meta = scraper.source_metadata();
        let state = if config.is_enabled(scraper.as_ref()) { "" } else { " (disabled)" };
        println!(
            "{} {}/{}{}",
            meta.emoji,
            meta.region.name,
            scraper.cli_names().first().copied().unwrap_or_default(),
            state
        );
        println!("    {} · {} · up to {} articles", meta.name, meta.default_url, meta.article_limit);
    }
}

async fn article(config: &AppConfig, url: &str, json: bool) -> Result<()> {
    let scraper = get_scraper_for_url(url)
        .ok_or_else(|| Error::Scraping(format!("No scraper found for URL: {}", url)))?;
    let model = create_model(Some(config.inference_config())).await?;
    let fetcher = Arc::new(HttpFetcher::new(config.timeout)?);

    let collector = SourceCollector::new(scraper, fetcher);
    let scraped = collector.scrape_article(url).await?;
    let manager = ScraperManager::new(Summarizer::new(model));
    let summarized = manager.summarize_all(vec![scraped]).await;

    for item in &summarized {
        if json {
            println!("{}", report::render_json(item)?);
        } else {
            print!("{}", report::render_single(item));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(level_for_verbosity(cli.verbose));

    let config = cli.load_config()?;

    match cli.command.unwrap_or(Commands::Search {
        keywords: None,
        sources: Vec::new(),
        json: false,
        max_articles: None,
    }) {
        Commands::List => list(&config),
        Commands::Search {
            keywords,
            sources,
            json,
            max_articles,
        } => {
            config.validate()?;
            let keywords = keywords.map(|k| KeywordSet::parse(&k)).unwrap_or_else(default_keywords);
            info!("🔎 Searching for {} keywords", keywords.len());
            search(&config, keywords, &sources, json, max_articles).await?;
        }
        Commands::Article { url, json } => {
            config.validate()?;
            article(&config, &url, json).await?;
        }
    }

    Ok(())
}
