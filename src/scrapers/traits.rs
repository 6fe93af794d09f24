use anyhow::Result;
use async_trait::async_trait;

/// Plain HTTP GET access, used for listing pages and the property API
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the response body
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Renders pages whose fields are filled in by JavaScript
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Open a rendering session for `url`; the session ends when dropped
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>>;
}

/// A live rendered page
pub trait RenderedPage: Send + Sync {
    /// Current DOM serialized as HTML
    fn html(&self) -> Result<String>;
}

/// Lookup of current market status by street address
#[async_trait]
pub trait ListingStatus: Send + Sync {
    async fn is_currently_listed(&self, address: &str) -> Result<bool>;
}
