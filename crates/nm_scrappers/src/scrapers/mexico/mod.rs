use crate::scrapers::{Region, ScraperFactory};

pub mod cluster_minero;
pub mod mineria_en_linea;
pub mod mundo_minero;
pub mod rumbo_minero;

pub use cluster_minero::ClusterMineroScraper;
pub use mineria_en_linea::MineriaEnLineaScraper;
pub use mundo_minero::MundoMineroScraper;
pub use rumbo_minero::RumboMineroScraper;

pub const REGION: Region = Region {
    name: "mexico",
    emoji: "🇲🇽",
};

pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![
        Box::new(|| Box::new(MineriaEnLineaScraper::new())),
        Box::new(|| Box::new(MundoMineroScraper::new())),
        Box::new(|| Box::new(ClusterMineroScraper::new())),
        Box::new(|| Box::new(RumboMineroScraper::new())),
    ]
}
