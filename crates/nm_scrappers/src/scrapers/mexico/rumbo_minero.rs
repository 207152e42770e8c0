use crate::extract::{BodyRules, ImageRule, ListingStrategy, Rule, SourceProfile};
use crate::scrapers::{host_matches, Scraper, SourceMetadata};
use super::REGION;

/// Mexico section of Rumbo Minero, a Newspaper-theme WordPress site with
/// lazily loaded images.
#[derive(Debug, Clone)]
pub struct RumboMineroScraper {
    profile: SourceProfile,
}

impl RumboMineroScraper {
    const BASE_URL: &'static str = "https://www.rumbominero.com/mexico/";

    pub fn new() -> Self {
        Self {
            profile: SourceProfile {
                listing: vec![
                    ListingStrategy::new(
                        "div[class*='td_module_']",
                        &["h3 a", "h4 a", ".entry-title a", ".td-module-title a"],
                    )
                    .with_image(vec![ImageRule::img(".td-module-thumb img")]),
                    ListingStrategy::new(".td_block_inner a, .tdb-block-inner a", &[]).min_title_chars(15),
                    ListingStrategy::new("a", &[]).min_title_chars(16),
                ],
                link_must_contain: Some("rumbominero.com"),
                link_excludes: &["/category/", "/tag/"],
                body: BodyRules {
                    containers: vec![
                        ".td-post-content",
                        ".tdb_single_content",
                        "article .content",
                        ".entry-content",
                        ".post-content",
                        "article",
                    ],
                    strip: ".sharedaddy, .jp-relatedposts, .social-share, .comments-area, .navigation",
                    prefer_paragraphs: true,
                },
                image: vec![
                    ImageRule::img(".td-post-featured-image img"),
                    ImageRule::img(".wp-post-image"),
                    ImageRule::img(".td-module-thumb img"),
                    ImageRule::img(".entry-thumb"),
                    ImageRule::img("article img"),
                    ImageRule::img(".entry-content img"),
                    ImageRule::img("figure img"),
                    ImageRule::img(".td_block_inner img"),
                    ImageRule::img(".td-module-image img"),
                ],
                date: vec![
                    Rule::Attr("span.td-post-date time[datetime]", "datetime"),
                    Rule::Attr("time[datetime]", "datetime"),
                    Rule::Text(".td-post-date"),
                    Rule::Text(".post-date"),
                    Rule::Text(".entry-date"),
                    Rule::Text(".meta-date"),
                    Rule::Text("span.date"),
                    Rule::Attr("meta[property='article:published_time']", "content"),
                    Rule::JsonLd("datePublished"),
                ],
            },
        }
    }
}

impl Default for RumboMineroScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper for RumboMineroScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "Rumbo Minero",
            emoji: "🧭",
            region: REGION,
            default_url: Self::BASE_URL,
            article_limit: 10,
        }
    }

    fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "rumbominero.com")
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["rumbo-minero", "rumbominero"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use url::Url;

    fn base() -> Url {
        Url::parse(RumboMineroScraper::BASE_URL).unwrap()
    }

    #[test]
    fn test_listing_modules_with_lazy_images() {
        let html = r#"
            <div class="td_module_flex td_module_flex_1">
              <div class="td-module-thumb">
                <img src="data:image/gif;base64,R0lGOD" data-img-url="https://www.rumbominero.com/wp-content/uploads/2024/06/mina.jpg" alt="Mina">
              </div>
              <h3 class="entry-title td-module-title"><a href="https://www.rumbominero.com/mexico/noticias/capstone-cozamin/">Capstone amplía Cozamin</a></h3>
            </div>
            <div class="td_module_10">
              <h3><a href="https://www.rumbominero.com/category/mexico/">México</a></h3>
            </div>
            <div class="td_module_wrap">
              <h3><a href="https://otro-sitio.com/nota/">Nota externa</a></h3>
            </div>
        "#;
        let candidates = RumboMineroScraper::new().extract_candidates(html, &base());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Capstone amplía Cozamin");
        let image = candidates[0].image.clone().unwrap();
        assert_eq!(
            image.url.as_deref(),
            Some("https://www.rumbominero.com/wp-content/uploads/2024/06/mina.jpg")
        );
        assert_eq!(image.alt, "Mina");
    }

    #[test]
    fn test_listing_block_fallback_requires_long_titles() {
        let html = r#"
            <div class="td_block_inner">
              <a href="https://www.rumbominero.com/mexico/corta/">Corta</a>
              <a href="https://www.rumbominero.com/mexico/noticias/first-majestic-reanuda/">First Majestic reanuda operaciones</a>
              <a href="https://www.rumbominero.com/tag/plata/">Etiqueta de plata con texto largo</a>
            </div>
        "#;
        let candidates = RumboMineroScraper::new().extract_candidates(html, &base());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "First Majestic reanuda operaciones");
    }

    #[test]
    fn test_article_paragraphs_and_date() {
        let html = r#"
            <html><head>
              <meta property="article:published_time" content="2024-06-03T12:00:00+00:00">
            </head><body>
              <span class="td-post-date"><time class="entry-date" datetime="2024-06-04T09:30:00-06:00">4 junio, 2024</time></span>
              <div class="td-post-featured-image"><img data-src="/wp-content/uploads/cozamin.jpg" src="/pixel.gif" alt=""></div>
              <div class="td-post-content">
                <div class="td-a-ad">Publicidad</div>
                <p>Capstone Copper anunció la ampliación.</p>
                <div class="sharedaddy"><p>Compartir</p></div>
                <p>La mina se ubica en Zacatecas.</p>
              </div>
            </body></html>
        "#;
        let url = Url::parse("https://www.rumbominero.com/mexico/noticias/capstone-cozamin/").unwrap();
        let details = RumboMineroScraper::new().extract_article(html, &url, "Capstone amplía Cozamin");
        assert_eq!(
            details.body_text,
            "Capstone Copper anunció la ampliación. La mina se ubica en Zacatecas."
        );
        let published = details.published.unwrap();
        assert_eq!(published.raw, "2024-06-04T09:30:00-06:00");
        assert_eq!(published.date, NaiveDate::from_ymd_opt(2024, 6, 4));
        let image = details.image.unwrap();
        assert_eq!(
            image.url.as_deref(),
            Some("https://www.rumbominero.com/wp-content/uploads/cozamin.jpg")
        );
        assert_eq!(image.alt, "Capstone amplía Cozamin");
    }

    #[test]
    fn test_visible_date_fallback() {
        let html = r#"<html><body><div class="post-date">15 de abril de 2023</div><article><p>x</p></article></body></html>"#;
        let url = Url::parse("https://www.rumbominero.com/mexico/n/").unwrap();
        let details = RumboMineroScraper::new().extract_article(html, &url, "t");
        assert_eq!(details.published.unwrap().formatted(), "15/04/2023");
    }
}
