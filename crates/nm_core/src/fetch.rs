use async_trait::async_trait;
use crate::Result;

/// Retrieves the raw HTML of a page.
///
/// Implementations must bound how long a single fetch may take and identify
/// themselves with a browser-like user agent.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
