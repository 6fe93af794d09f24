pub mod browser;
pub mod location;
pub mod redfin;
pub mod retry;
pub mod search;
pub mod suitability;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use browser::ChromeRenderer;
pub use location::HttpPageFetcher;
pub use redfin::RedfinClient;
pub use retry::RetryPolicy;
pub use search::SearchDriver;
pub use suitability::SuitabilityEvaluator;
