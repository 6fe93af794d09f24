use crate::scrapers::traits::{PageRenderer, RenderedPage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest Chrome may sit without events before its transport shuts down
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(60);

/// Renders listing pages in headless Chrome
///
/// Every session launches its own browser. The tab and the browser go away
/// together when the session is dropped, so nothing is shared between
/// candidates and a browser never idles between them.
pub struct ChromeRenderer {
    render_wait: Duration,
}

impl ChromeRenderer {
    pub fn new(render_wait: Duration) -> Self {
        Self { render_wait }
    }

    fn launch(&self) -> Result<Browser> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT + self.render_wait)
            .build()
            .context("Failed to build launch options")?;

        Browser::new(options).context("Failed to launch Chrome browser")
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>> {
        debug!(url = %url, "Launching headless Chrome");
        let browser = self.launch()?;
        let tab = browser.new_tab().context("could not create new tab")?;

        tab.navigate_to(url)
            .with_context(|| format!("could not navigate to {}", url))?;
        tab.wait_until_navigated()
            .with_context(|| format!("navigation to {} did not finish", url))?;

        // Listing details are filled in after load
        tokio::time::sleep(self.render_wait).await;

        Ok(Box::new(ChromePage {
            tab,
            _browser: browser,
        }))
    }
}

/// The outerHTML string from a DOM evaluation
fn dom_string(value: Option<&Value>) -> Result<String> {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("rendered DOM was not a string")
}

/// One rendered candidate; fields drop in order, so the tab closes first
struct ChromePage {
    tab: Arc<Tab>,
    _browser: Browser,
}

impl RenderedPage for ChromePage {
    fn html(&self) -> Result<String> {
        let result = self
            .tab
            .evaluate("document.documentElement.outerHTML", false)
            .context("could not read rendered DOM")?;

        dom_string(result.value.as_ref())
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            warn!("could not close tab: {}", e);
        }
    }
}
