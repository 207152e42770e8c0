use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::parse_date;

/// One news item produced by a source collector.
///
/// Articles are built once by a collector and then only filtered, merged and
/// reordered by the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub body_text: String,
    pub image: Option<ArticleImage>,
    pub published: Option<PublishedDate>,
    pub source: String,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            body_text: String::new(),
            image: None,
            published: None,
            source: source.into(),
        }
    }

    pub fn with_body(mut self, body_text: impl Into<String>) -> Self {
        self.body_text = body_text.into();
        self
    }

    pub fn with_image(mut self, image: Option<ArticleImage>) -> Self {
        self.image = image;
        self
    }

    pub fn with_published(mut self, published: Option<PublishedDate>) -> Self {
        self.published = published;
        self
    }

    /// Key used to detect the same story reported twice.
    pub fn dedupe_key(&self) -> String {
        self.title.trim().to_lowercase()
    }

    /// Host part of the link, used when rendering the report.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.link)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleImage {
    pub url: Option<String>,
    pub alt: String,
}

/// Publication date as found on the page, plus the parsed calendar date when
/// the text matched one of the known formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedDate {
    pub raw: String,
    pub date: Option<NaiveDate>,
}

impl PublishedDate {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into().trim().to_string();
        let date = parse_date(&raw);
        Self { raw, date }
    }

    /// `DD/MM/YYYY` when parsed, otherwise the raw text.
    pub fn formatted(&self) -> String {
        match self.date {
            Some(date) => date.format("%d/%m/%Y").to_string(),
            None => self.raw.clone(),
        }
    }
}
