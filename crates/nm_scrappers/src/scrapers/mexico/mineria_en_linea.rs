use crate::extract::{BodyRules, ImageRule, ListingStrategy, SourceProfile};
use crate::scrapers::{generic_date_rules, host_matches, Scraper, SourceMetadata};
use super::REGION;

#[derive(Debug, Clone)]
pub struct MineriaEnLineaScraper {
    profile: SourceProfile,
}

impl MineriaEnLineaScraper {
    const BASE_URL: &'static str = "https://mineriaenlinea.com/";

    pub fn new() -> Self {
        Self {
            profile: SourceProfile {
                listing: vec![ListingStrategy::new("article", &["h2.entry-title a", ".entry-title a"])],
                link_must_contain: None,
                link_excludes: &["/category/", "/tag/"],
                body: BodyRules {
                    containers: vec!["div.entry-content"],
                    strip: ".sharedaddy, .jp-relatedposts",
                    prefer_paragraphs: false,
                },
                image: vec![
                    ImageRule::img(".featured-image img"),
                    ImageRule::img(".post-thumbnail img"),
                    ImageRule::img("article img"),
                    ImageRule::img(".entry-content img"),
                    ImageRule::img("figure img"),
                    ImageRule::img("img.wp-post-image"),
                    ImageRule::img(".post-image img"),
                    ImageRule::img("img"),
                ],
                date: generic_date_rules(),
            },
        }
    }
}

impl Default for MineriaEnLineaScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper for MineriaEnLineaScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "Minería en Línea",
            emoji: "⛏️",
            region: REGION,
            default_url: Self::BASE_URL,
            article_limit: 10,
        }
    }

    fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "mineriaenlinea.com")
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["mineria-en-linea", "mineriaenlinea"]
    }
}
