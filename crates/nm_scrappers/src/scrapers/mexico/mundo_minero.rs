use crate::extract::{BodyRules, ImageRule, ListingStrategy, SourceProfile};
use crate::scrapers::{generic_date_rules, host_matches, Scraper, SourceMetadata};
use super::REGION;

#[derive(Debug, Clone)]
pub struct MundoMineroScraper {
    profile: SourceProfile,
}

impl MundoMineroScraper {
    const BASE_URL: &'static str = "https://mundominero.mx/";

    pub fn new() -> Self {
        Self {
            profile: SourceProfile {
                listing: vec![
                    ListingStrategy::new(".tt-post", &["a.tt-post-title", ".tt-post-title a"]),
                    ListingStrategy::new(
                        "article",
                        &["a.tt-post-title", ".tt-post-title a", "h2 a", "h3 a", ".entry-title a", "a.read-more"],
                    ),
                ],
                link_must_contain: None,
                link_excludes: &["/category/", "/tag/", "/author/"],
                body: BodyRules {
                    containers: vec![
                        ".tt-blog-content",
                        "div.post-content",
                        "div.entry-content",
                        "div.tt-content",
                        "div.content-inner",
                        "div.content",
                        "article",
                        "div.entry",
                        "div.post",
                        "main",
                        "div#content",
                    ],
                    strip: "nav, footer, .navigation, .comments, .related-posts, .fusion-sharing-box, .fusion-meta-info",
                    prefer_paragraphs: false,
                },
                image: vec![
                    ImageRule::img("img.img-responsive.wp-post-image"),
                    ImageRule::img(".tt-featured-image img"),
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

impl Default for MundoMineroScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper for MundoMineroScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "Mundo Minero",
            emoji: "🌎",
            region: REGION,
            default_url: Self::BASE_URL,
            article_limit: 15,
        }
    }

    fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "mundominero.mx")
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["mundo-minero", "mundominero"]
    }
}
