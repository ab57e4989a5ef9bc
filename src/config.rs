use anyhow::{Context, Result};
use std::env;

/// Landing page of the listing site.
pub const SITE_ROOT: &str = "https://www.zoopla.co.uk/";

/// Free-text location query typed into the search input.
pub const SEARCH_LOCATION: &str = "London";

/// Stream subject every property record is published to.
pub const SUBJECT: &str = "properties";

/// Chat model used for fact-sheet extraction.
pub const MODEL: &str = "gpt-3.5-turbo";

const DEFAULT_NATS_URL: &str = "localhost:4222";

/// Environment-provided endpoints and credentials.
pub struct Config {
    /// WebSocket CDP endpoint of the remote scraping browser.
    pub browser_ws_url: String,
    pub openai_api_key: String,
    pub nats_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            browser_ws_url: env::var("BROWSER_WS_URL").context("BROWSER_WS_URL not set")?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
            nats_url: env::var("NATS_URL").unwrap_or_else(|_| DEFAULT_NATS_URL.to_string()),
        })
    }
}
