use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::{info, warn};

use crate::llm::{attribute_prompt, parse_attributes, ChatModel};
use crate::models::{ListingSummary, PropertyRecord};
use crate::publish::StreamPublisher;
use crate::scrapers::{ListingSite, PageFetcher};

/// End-of-run accounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub discovered: usize,
    pub published: usize,
    pub skipped: usize,
}

/// The scrape-transform-publish loop with its collaborators injected, so any
/// of them can be swapped for a double.
pub struct Pipeline {
    site: Arc<dyn ListingSite>,
    model: Arc<dyn ChatModel>,
    publisher: Arc<dyn StreamPublisher>,
    subject: String,
}

impl Pipeline {
    pub fn new(
        site: Arc<dyn ListingSite>,
        model: Arc<dyn ChatModel>,
        publisher: Arc<dyn StreamPublisher>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            site,
            model,
            publisher,
            subject: subject.into(),
        }
    }

    /// Run the whole pipeline over one browser session: search, discover,
    /// then enrich and publish each listing in order.
    ///
    /// A bootstrap or discovery failure aborts the run; a failure while
    /// enriching or publishing one listing only loses that listing.
    pub async fn run(&self, fetcher: &dyn PageFetcher, location: &str) -> Result<RunSummary> {
        let results_html = fetcher
            .search(self.site.root(), self.site.search_input(), location)
            .context("location search failed")?;
        let listings = self
            .site
            .find_listing_cards(&results_html)
            .context("listing discovery failed")?;
        info!("Discovered {} listings", listings.len());

        let mut summary = RunSummary {
            discovered: listings.len(),
            ..Default::default()
        };

        for listing in listings {
            match self.process_listing(fetcher, &listing).await {
                Ok(()) => summary.published += 1,
                Err(err) => {
                    warn!("Skipping {}: {:#}", listing.detail_url, err);
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn process_listing(
        &self,
        fetcher: &dyn PageFetcher,
        listing: &ListingSummary,
    ) -> Result<()> {
        info!("Navigating to the listing page {}", listing.detail_url);
        let page_html = fetcher.fetch(&listing.detail_url)?;
        let detail = self
            .site
            .find_detail_fragment(&page_html)
            .context("listing details container not found")?;

        let pictures = self.site.find_gallery_sources(&detail);
        let floor_plan = self.site.find_floor_plan(&detail);
        let fact_sheet = self
            .site
            .find_attribute_fragment(&detail)
            .context("property fact sheet not found")?;

        info!("Extracting property details...");
        let reply = self.model.complete(&attribute_prompt(&fact_sheet)).await?;
        let attributes = parse_attributes(&reply)?;

        let record = PropertyRecord::assemble(listing.clone(), pictures, floor_plan, attributes);
        let payload =
            serde_json::to_vec(&record).context("failed to serialize property record")?;

        self.publisher
            .publish(self.subject.clone(), Bytes::from(payload))
            .await
            .context("publish failed")?;
        info!("Record published to {}", self.subject);

        Ok(())
    }
}
