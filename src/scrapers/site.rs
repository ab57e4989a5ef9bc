use crate::models::ListingSummary;
use anyhow::Result;

/// Selector logic for one listing site, kept apart from browser driving so
/// every extraction step can run against fixture HTML.
pub trait ListingSite: Send + Sync {
    /// Absolute URL of the site's landing page.
    fn root(&self) -> &str;

    /// CSS selector of the landing page's location search input.
    fn search_input(&self) -> &str;

    /// Resolve a card's href into an absolute detail-page URL.
    fn listing_url(&self, href: &str) -> Result<String>;

    /// All well-formed listing cards on the search-results page, in DOM
    /// order. A malformed card is skipped, a missing results container is an
    /// error.
    fn find_listing_cards(&self, results_html: &str) -> Result<Vec<ListingSummary>>;

    /// Inner markup of the detail-page container, when present.
    fn find_detail_fragment(&self, page_html: &str) -> Option<String>;

    /// Gallery image URLs matching the target encoding and resolution.
    fn find_gallery_sources(&self, detail_html: &str) -> Vec<String>;

    /// Markup of the property fact sheet handed to the model.
    fn find_attribute_fragment(&self, detail_html: &str) -> Option<String>;

    /// First floor-plan image URL, when the page exposes one.
    fn find_floor_plan(&self, detail_html: &str) -> Option<String>;
}
