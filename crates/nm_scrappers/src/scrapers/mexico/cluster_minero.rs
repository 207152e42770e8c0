use crate::extract::{BodyRules, ImageRule, ListingStrategy, SourceProfile};
use crate::scrapers::{generic_date_rules, host_matches, Scraper, SourceMetadata};
use super::REGION;

/// Cluster Minero news, published on the ProMinería portal.
#[derive(Debug, Clone)]
pub struct ClusterMineroScraper {
    profile: SourceProfile,
}

impl ClusterMineroScraper {
    const BASE_URL: &'static str = "https://www.promineria.com/";

    pub fn new() -> Self {
        Self {
            profile: SourceProfile {
                listing: vec![
                    ListingStrategy::new(
                        ".portada_noticias_cuadro li[style*='background-image']",
                        &[".contenido_cuadro_titulo a"],
                    )
                    .with_image(vec![ImageRule::Background("li[style*='background-image']")]),
                    ListingStrategy::new("a[href*='?p=nota&id=']", &[]),
                ],
                link_must_contain: None,
                link_excludes: &[],
                body: BodyRules {
                    containers: vec!["div.nota_contenido", "#cuerpo_nota", ".contenido", ".entry-content", "article"],
                    strip: "nav, footer, .comentarios, .redes_sociales",
                    prefer_paragraphs: false,
                },
                image: vec![
                    ImageRule::Background("li[style*='background-image']"),
                    ImageRule::img(".imagen_nota img"),
                    ImageRule::img(".nota_contenido img"),
                    ImageRule::img(".featured-image img"),
                    ImageRule::img("article img"),
                    ImageRule::img(".entry-content img"),
                    ImageRule::img("img"),
                ],
                date: generic_date_rules(),
            },
        }
    }
}

impl Default for ClusterMineroScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper for ClusterMineroScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "Cluster Minero",
            emoji: "🏔️",
            region: REGION,
            default_url: Self::BASE_URL,
            article_limit: 15,
        }
    }

    fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "promineria.com")
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["cluster-minero", "promineria"]
    }
}
