//! Selector-cascade extraction.
//!
//! A [`SourceProfile`] describes one site's markup as ordered lists of
//! strategies. For every field the first strategy that yields a non-empty
//! value wins, so fixing markup drift means editing a profile, not the
//! collector.

use lazy_static::lazy_static;
use nm_core::{ArticleImage, PublishedDate};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::scrapers::jsonld;

lazy_static! {
    static ref BACKGROUND_URL: Regex =
        Regex::new(r#"background(?:-image)?\s*:\s*url\(\s*['"]?([^'")]+)['"]?\s*\)"#).expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Image URLs containing any of these are site chrome, not article photos.
pub const IMAGE_SKIP_PATTERNS: &[&str] = &[
    "placeholder", "icon", "logo", "avatar", "banner", "16x16", "20x20", "24x24", "32x32", "50x50",
];

/// Attributes that may carry an image URL, lazy-loading ones first.
pub const IMAGE_ATTRS: &[&str] = &["data-src", "data-lazy-src", "src", "data-img-url"];

/// Subtrees never worth reading as article text.
pub const ALWAYS_STRIP: &str = "script, style, noscript";

/// Extraction step for plain string fields such as the publication date.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Text content of the first matching element with any text.
    Text(&'static str),
    /// Attribute of the first matching element that carries it.
    Attr(&'static str, &'static str),
    /// Top-level key of a JSON-LD block, e.g. `datePublished`.
    JsonLd(&'static str),
}

#[derive(Debug, Clone)]
pub enum ImageRule {
    /// `<img>`-like element; `attrs` are tried in order on each match.
    Element {
        selector: &'static str,
        attrs: &'static [&'static str],
    },
    /// CSS `background-image: url(..)` inside a `style` attribute.
    Background(&'static str),
}

impl ImageRule {
    pub const fn img(selector: &'static str) -> Self {
        ImageRule::Element {
            selector,
            attrs: IMAGE_ATTRS,
        }
    }
}

/// One way of finding teasers on a listing page.
#[derive(Debug, Clone)]
pub struct ListingStrategy {
    /// Teaser containers.
    pub items: &'static str,
    /// Links inside a container carrying title and href, tried in order.
    /// Empty means the container itself is the link.
    pub anchors: &'static [&'static str],
    /// Shorter link texts are navigation, not headlines.
    pub min_title_chars: usize,
    /// Teaser image, used when the article page has none.
    pub image: Vec<ImageRule>,
}

impl ListingStrategy {
    pub fn new(items: &'static str, anchors: &'static [&'static str]) -> Self {
        Self {
            items,
            anchors,
            min_title_chars: 1,
            image: Vec::new(),
        }
    }

    pub fn min_title_chars(mut self, chars: usize) -> Self {
        self.min_title_chars = chars;
        self
    }

    pub fn with_image(mut self, image: Vec<ImageRule>) -> Self {
        self.image = image;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BodyRules {
    /// Candidate content containers, first match wins.
    pub containers: Vec<&'static str>,
    /// Subtrees removed from the container before reading its text.
    pub strip: &'static str,
    /// Read only `<p>` elements when the container has any.
    pub prefer_paragraphs: bool,
}

/// Markup knowledge for one source.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub listing: Vec<ListingStrategy>,
    /// Links must contain this (usually the site's domain).
    pub link_must_contain: Option<&'static str>,
    /// Links containing any of these are sections, tags or ads.
    pub link_excludes: &'static [&'static str],
    pub body: BodyRules,
    pub image: Vec<ImageRule>,
    pub date: Vec<Rule>,
}

/// A teaser found on a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub link: String,
    pub image: Option<ArticleImage>,
}

/// Fields read from an article page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDetails {
    pub body_text: String,
    pub image: Option<ArticleImage>,
    pub published: Option<PublishedDate>,
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = css, error = ?e, "Invalid selector in source profile");
            None
        }
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// `scope` itself when it matches, then its matching descendants.
fn select_with_self<'a, 'b>(scope: ElementRef<'a>, sel: &'b Selector) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    std::iter::once(scope)
        .filter(move |el| sel.matches(el))
        .chain(scope.select(sel))
}

fn element_text(element: ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Resolve `href` against the page it was found on. Only http(s) targets are
/// kept.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

pub fn is_placeholder_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    IMAGE_SKIP_PATTERNS.iter().any(|p| lower.contains(p))
}

impl Rule {
    pub fn apply(&self, scope: ElementRef, document: &Html) -> Option<String> {
        match self {
            Rule::Text(css) => {
                let sel = selector(css)?;
                scope
                    .select(&sel)
                    .map(element_text)
                    .find(|text| !text.is_empty())
            }
            Rule::Attr(css, attr) => {
                let sel = selector(css)?;
                scope
                    .select(&sel)
                    .filter_map(|el| el.value().attr(attr))
                    .map(str::trim)
                    .find(|value| !value.is_empty())
                    .map(str::to_string)
            }
            Rule::JsonLd(key) => jsonld::find_string(document, key),
        }
    }
}

pub fn first_match(rules: &[Rule], scope: ElementRef, document: &Html) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(scope, document))
}

impl ImageRule {
    /// First usable image under `scope`, skipping placeholders and icons.
    pub fn apply(&self, scope: ElementRef, page_url: &Url) -> Option<ArticleImage> {
        match self {
            ImageRule::Element { selector: css, attrs } => {
                let sel = selector(css)?;
                let found = select_with_self(scope, &sel).find_map(|el| {
                    let raw = attrs
                        .iter()
                        .filter_map(|attr| el.value().attr(attr))
                        .map(str::trim)
                        .find(|value| !value.is_empty() && !value.starts_with("data:"))?;
                    if is_placeholder_image(raw) {
                        debug!(url = raw, "Skipping placeholder image");
                        return None;
                    }
                    Some(ArticleImage {
                        url: Some(resolve_url(page_url, raw)?),
                        alt: el.value().attr("alt").unwrap_or_default().trim().to_string(),
                    })
                });
                found
            }
            ImageRule::Background(css) => {
                let sel = selector(css)?;
                let found = select_with_self(scope, &sel).find_map(|el| {
                    let style = el.value().attr("style")?;
                    let raw = BACKGROUND_URL.captures(style)?.get(1)?.as_str().trim();
                    if is_placeholder_image(raw) {
                        return None;
                    }
                    Some(ArticleImage {
                        url: Some(resolve_url(page_url, raw)?),
                        alt: String::new(),
                    })
                });
                found
            }
        }
    }
}

fn first_image(rules: &[ImageRule], scope: ElementRef, page_url: &Url, title: &str) -> Option<ArticleImage> {
    let mut image = rules.iter().find_map(|rule| rule.apply(scope, page_url))?;
    if image.alt.is_empty() {
        image.alt = title.to_string();
    }
    Some(image)
}

/// Whether `element` is, or sits inside, a stripped element below `scope`.
fn is_stripped(element: ElementRef, scope: ElementRef, strip: Option<&Selector>) -> bool {
    let Some(strip) = strip else { return false };
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .take_while(|el| *el != scope)
        .any(|el| strip.matches(&el))
}

/// Text of `scope` without the subtrees matched by `strip`.
fn text_without(scope: ElementRef, strip: Option<&Selector>) -> String {
    let mut parts = Vec::new();
    for node in scope.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let parent = node.parent().and_then(ElementRef::wrap);
        if parent.is_some_and(|parent| is_stripped(parent, scope, strip)) {
            continue;
        }
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text);
        }
    }
    normalize_whitespace(&parts.join(" "))
}

fn extract_body(rules: &BodyRules, document: &Html) -> String {
    let strip_css = if rules.strip.is_empty() {
        ALWAYS_STRIP.to_string()
    } else {
        format!("{}, {}", ALWAYS_STRIP, rules.strip)
    };
    let strip = selector(&strip_css);
    let paragraphs = selector("p");

    for css in &rules.containers {
        let Some(sel) = selector(css) else { continue };
        let Some(container) = document.select(&sel).next() else {
            continue;
        };

        if rules.prefer_paragraphs {
            if let Some(p) = &paragraphs {
                let text = container
                    .select(p)
                    .filter(|el| !is_stripped(*el, container, strip.as_ref()))
                    .map(|el| text_without(el, strip.as_ref()))
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if !text.is_empty() {
                    return text;
                }
            }
        }

        let text = text_without(container, strip.as_ref());
        if !text.is_empty() {
            return text;
        }
    }
    String::new()
}

impl SourceProfile {
    fn accepts_link(&self, link: &str) -> bool {
        if let Some(required) = self.link_must_contain {
            if !link.contains(required) {
                return false;
            }
        }
        !self.link_excludes.iter().any(|pattern| link.contains(pattern))
    }

    /// Teasers on a listing page, in page order, one per link.
    ///
    /// Strategies are tried in order; the first that finds anything wins.
    pub fn extract_candidates(&self, html: &str, page_url: &Url) -> Vec<Candidate> {
        let document = Html::parse_document(html);

        for (index, strategy) in self.listing.iter().enumerate() {
            let candidates = self.candidates_with(strategy, &document, page_url);
            if !candidates.is_empty() {
                debug!(strategy = index, count = candidates.len(), "Listing strategy matched");
                return candidates;
            }
        }
        Vec::new()
    }

    fn candidates_with(&self, strategy: &ListingStrategy, document: &Html, page_url: &Url) -> Vec<Candidate> {
        let Some(items) = selector(strategy.items) else {
            return Vec::new();
        };
        let anchors: Vec<Selector> = strategy.anchors.iter().filter_map(|css| selector(css)).collect();

        let mut seen = std::collections::HashSet::new();
        let mut candidates = Vec::new();

        for item in document.select(&items) {
            let anchor = if strategy.anchors.is_empty() {
                Some(item)
            } else {
                anchors.iter().find_map(|sel| {
                    item.select(sel).find(|el| {
                        el.value().attr("href").is_some()
                            && element_text(*el).chars().count() >= strategy.min_title_chars
                    })
                })
            };
            let Some(anchor) = anchor else { continue };

            let title = element_text(anchor);
            if title.is_empty() || title.chars().count() < strategy.min_title_chars {
                continue;
            }
            let Some(link) = anchor
                .value()
                .attr("href")
                .and_then(|href| resolve_url(page_url, href))
            else {
                continue;
            };
            if !self.accepts_link(&link) || !seen.insert(link.clone()) {
                continue;
            }

            let image = first_image(&strategy.image, item, page_url, &title);
            candidates.push(Candidate { title, link, image });
        }
        candidates
    }

    /// Body, image and date of an article page. Missing pieces are left
    /// empty rather than treated as errors.
    pub fn extract_article(&self, html: &str, page_url: &Url, title: &str) -> ArticleDetails {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let body_text = extract_body(&self.body, &document);
        let image = first_image(&self.image, root, page_url, title);
        let published = first_match(&self.date, root, &document).map(PublishedDate::from_raw);

        ArticleDetails {
            body_text,
            image,
            published,
        }
    }
}
