use anyhow::{Context, Result};
use headless_chrome::{Browser, Tab};
use std::sync::Arc;
use tracing::{debug, info};

/// Navigation seam between the pipeline and the remote browser, so the loop
/// can run against canned page HTML in tests.
pub trait PageFetcher {
    /// Navigate to the site root, run the location search and return the
    /// loaded results-page HTML.
    fn search(&self, root: &str, input_selector: &str, location: &str) -> Result<String>;

    /// Navigate to an absolute URL and return the loaded page HTML.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// One remote CDP browser session, held open for the lifetime of a run.
///
/// The single tab is reused across listings. Dropping the session releases
/// the connection on every exit path, including early aborts.
pub struct BrowserSession {
    tab: Arc<Tab>,
    _browser: Browser,
}

impl BrowserSession {
    /// Connect to the scraping browser's WebSocket CDP endpoint.
    pub fn connect(ws_url: &str) -> Result<Self> {
        info!("Connecting to scraping browser...");
        let browser = Browser::connect(ws_url.to_string())
            .context("Failed to connect to browser endpoint")?;
        let tab = browser.new_tab().context("Failed to open a page")?;

        Ok(Self {
            tab,
            _browser: browser,
        })
    }

    fn page_html(&self) -> Result<String> {
        let result = self
            .tab
            .evaluate("document.documentElement.outerHTML", false)?;
        let html = result
            .value
            .as_ref()
            .and_then(|value| value.as_str())
            .context("page returned no HTML")?;
        Ok(html.to_string())
    }
}

impl PageFetcher for BrowserSession {
    fn search(&self, root: &str, input_selector: &str, location: &str) -> Result<String> {
        info!("Connected! Navigating to {}", root);
        self.tab.navigate_to(root)?;
        self.tab.wait_until_navigated()?;

        let input = self
            .tab
            .wait_for_element(input_selector)
            .context("search input not found on landing page")?;
        input.click()?;
        self.tab.type_str(location)?;
        self.tab.press_key("Enter")?;

        info!("Waiting for search results...");
        self.tab.wait_until_navigated()?;
        self.page_html()
    }

    fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        self.page_html()
    }
}
