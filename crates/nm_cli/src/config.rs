//! Runtime configuration.
//!
//! Values are layered: command line and environment (both handled by clap)
//! win over the optional TOML file, which wins over built-in defaults.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use nm_core::{Error, KeywordSet, Result};
use nm_inference::models::{requires_api_key, AVAILABLE_MODELS};
use nm_scrappers::scrapers::{get_scrapers, Scraper};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_SUMMARY_CONCURRENCY: usize = 1;
pub const DEFAULT_MODEL: &str = "openai";

/// Mining terms searched when no keywords are given.
pub const DEFAULT_KEYWORDS: &str = "oro, cobre, plata, zinc, litio, abrir, acero, aluminio, cemento, \
    cementera, cantera, canteras, apertura, inaugurar, inauguración, inauguran, inaugura, inauguro, \
    cerrar, cierre, cierran, clausurar, clausura, clausuran, clausuro, clausurado, clausurada, \
    crecimiento, incremento, crece, incrementa, disminuye, reduce, reducen, disminución, reducción, \
    Sandvik, CAT, Caterpillar, komatsu, expandir, expansión, expande, expanden, expandirse, comienza, \
    comenzar, inicia, inician, Minera México, Peñoles, Coeur, First Majestic, Fresnillo, Newmont, \
    Goldcorp, Pan American, Panamericana, Argonaut, Frisco, Endeavour, colorada, chispas, filos, gatos, \
    san julian, palmarejo, parral, santa elena, tayoltita, saucito, san dimas, san francisco, san josé, \
    san luis, san martin, san nicolas, san patricio, san rafael, san vicente, santa cruz, santa maria, \
    santa rosa, santa rita, media luna, Torex, Pinnacle, Silver Wolf, copalquin, Bear Creek, mercedes, \
    cananea, aumenta, aumentar, aumentará, aumentan, aumentó, durango, nuevo";

pub fn default_keywords() -> KeywordSet {
    KeywordSet::parse(DEFAULT_KEYWORDS)
}

/// A duration given as `15s`, `500ms`, `2m`, `1h30m` or a bare number of
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Duration must include a number".to_string());
        }
        if let Ok(secs) = s.parse::<u64>() {
            return Ok(HumanDuration(Duration::from_secs(secs)));
        }

        let mut total = Duration::ZERO;
        let mut rest = s;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Invalid duration: {}", s));
            }
            let number: u64 = rest[..digits]
                .parse()
                .map_err(|_| format!("Invalid number in duration: {}", s))?;
            rest = &rest[digits..];
            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let too_large = || format!("Duration too large: {}", s);
            let part = match &rest[..unit_len] {
                "ms" => Duration::from_millis(number),
                "s" => Duration::from_secs(number),
                "m" => Duration::from_secs(number.checked_mul(60).ok_or_else(too_large)?),
                "h" => Duration::from_secs(number.checked_mul(3600).ok_or_else(too_large)?),
                unit => return Err(format!("Invalid duration unit: {}", unit)),
            };
            total = total.checked_add(part).ok_or_else(too_large)?;
            rest = &rest[unit_len..];
        }
        Ok(HumanDuration(total))
    }
}

/// Per-source settings from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceOverride {
    pub base_url: Option<String>,
    pub article_limit: Option<usize>,
    pub enabled: Option<bool>,
}

/// Shape of the `--config` TOML file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<String>,
    pub model_name: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub delay_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub summary_concurrency: Option<usize>,
    pub sources: BTreeMap<String, SourceOverride>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid configuration file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text)
    }
}

/// Values taken from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct CliSettings {
    pub model: Option<String>,
    pub model_name: Option<String>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub delay: Option<Duration>,
    pub concurrency: Option<usize>,
    pub summary_concurrency: Option<usize>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub model: String,
    pub model_name: Option<String>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout: Duration,
    pub delay: Duration,
    pub concurrency: usize,
    pub summary_concurrency: usize,
    pub sources: BTreeMap<String, SourceOverride>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("model", &self.model)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("delay", &self.delay)
            .field("concurrency", &self.concurrency)
            .field("summary_concurrency", &self.summary_concurrency)
            .field("sources", &self.sources)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_parts(CliSettings::default(), FileConfig::default())
    }
}

/// One source ready to be collected.
pub struct PlannedSource {
    pub scraper: Box<dyn Scraper>,
    pub listing_url: String,
    pub article_limit: usize,
}

impl AppConfig {
    pub fn from_parts(cli: CliSettings, file: FileConfig) -> Self {
        Self {
            model: cli.model.or(file.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_name: cli.model_name.or(file.model_name),
            api_key: cli.api_key.filter(|k| !k.trim().is_empty()),
            api_base_url: cli.api_base_url.or(file.api_base_url),
            timeout: cli
                .timeout
                .or(file.timeout_secs.map(Duration::from_secs))
                .unwrap_or(DEFAULT_TIMEOUT),
            delay: cli
                .delay
                .or(file.delay_ms.map(Duration::from_millis))
                .unwrap_or(DEFAULT_DELAY),
            concurrency: cli.concurrency.or(file.concurrency).unwrap_or(DEFAULT_CONCURRENCY),
            summary_concurrency: cli
                .summary_concurrency
                .or(file.summary_concurrency)
                .unwrap_or(DEFAULT_SUMMARY_CONCURRENCY),
            sources: file.sources,
        }
    }

    /// Reject configurations that cannot work, before any network access.
    pub fn validate(&self) -> Result<()> {
        if !AVAILABLE_MODELS.contains(&self.model.as_str()) {
            return Err(Error::Config(format!(
                "Unknown model '{}'. Available models: {}",
                self.model,
                AVAILABLE_MODELS.join(", ")
            )));
        }
        if requires_api_key(&self.model) && self.api_key.is_none() {
            return Err(Error::Config(format!(
                "Model '{}' needs an API key: set OPENAI_API_KEY or pass --api-key",
                self.model
            )));
        }
        if let Some(base) = &self.api_base_url {
            check_http_url(base, "api_base_url")?;
        }
        if self.concurrency == 0 || self.summary_concurrency == 0 {
            return Err(Error::Config("Concurrency must be at least 1".to_string()));
        }

        let scrapers = get_scrapers();
        for (name, source) in &self.sources {
            if !scrapers.iter().any(|s| s.cli_names().contains(&name.as_str())) {
                return Err(Error::Config(format!("Unknown source '{}' in configuration", name)));
            }
            if let Some(url) = &source.base_url {
                check_http_url(url, name)?;
            }
            if source.article_limit == Some(0) {
                return Err(Error::Config(format!("Source '{}' has an article_limit of 0", name)));
            }
        }
        if !scrapers.iter().any(|s| self.is_enabled(s.as_ref())) {
            return Err(Error::Config("Every source is disabled".to_string()));
        }
        Ok(())
    }

    fn override_for(&self, scraper: &dyn Scraper) -> Option<&SourceOverride> {
        scraper
            .cli_names()
            .iter()
            .find_map(|name| self.sources.get(*name))
    }

    pub fn is_enabled(&self, scraper: &dyn Scraper) -> bool {
        self.override_for(scraper)
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }

    /// Enabled sources with their overrides applied, in registry order.
    /// `only` restricts the plan to the named sources.
    pub fn source_plan(&self, only: &[String]) -> Result<Vec<PlannedSource>> {
        let scrapers = get_scrapers();
        if let Some(unknown) = only
            .iter()
            .find(|name| !scrapers.iter().any(|s| s.cli_names().contains(&name.as_str())))
        {
            return Err(Error::Config(format!("Unknown source '{}'", unknown)));
        }

        let plan: Vec<PlannedSource> = scrapers
            .into_iter()
            .filter(|s| only.is_empty() || s.cli_names().iter().any(|n| only.iter().any(|o| o.as_str() == *n)))
            .filter(|s| self.is_enabled(s.as_ref()))
            .map(|scraper| {
                let meta = scraper.source_metadata();
                let source = self.override_for(scraper.as_ref()).cloned().unwrap_or_default();
                PlannedSource {
                    listing_url: source.base_url.unwrap_or_else(|| meta.default_url.to_string()),
                    article_limit: source.article_limit.unwrap_or(meta.article_limit),
                    scraper,
                }
            })
            .collect();

        if plan.is_empty() {
            return Err(Error::Config("No enabled source selected".to_string()));
        }
        Ok(plan)
    }

    pub fn inference_config(&self) -> nm_inference::Config {
        nm_inference::Config {
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            model_name: self.model_name.clone(),
            base_url: self.api_base_url.clone(),
            ..nm_inference::Config::default()
        }
    }
}

fn check_http_url(value: &str, field: &str) -> Result<()> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(Error::Config(format!("{}: '{}' is not an http(s) URL", field, value))),
        Err(e) => Err(Error::Config(format!("{}: '{}' is not a valid URL ({})", field, value, e))),
    }
}
