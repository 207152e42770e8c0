pub mod date;
pub mod error;
pub mod fetch;
pub mod keywords;
pub mod models;
pub mod types;

pub use date::parse_date;
pub use error::{Error, Result};
pub use fetch::PageFetcher;
pub use keywords::KeywordSet;
pub use models::InferenceModel;
pub use types::{Article, ArticleImage, PublishedDate};
