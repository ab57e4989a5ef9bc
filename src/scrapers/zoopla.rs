use crate::models::ListingSummary;
use crate::scrapers::site::ListingSite;
use anyhow::{Context, Result};
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

const RESULTS_CONTAINER: &str = r#"div[data-testid="regular-listings"]"#;
const SEARCH_INPUT: &str = r#"input[name="autosuggest-input"]"#;
const LISTING_CARD: &str = "div.dkr2t83";
const DETAIL_CONTAINER: &str = r#"div[data-testid="listing-details-page"]"#;
const GALLERY_SECTION: &str = r#"section[aria-labelledby="listing-gallery-heading"]"#;
const FACT_SHEET: &str = "div._14bi3x331";
const FLOOR_PLAN_THUMB: &str = r#"div[data-testid="floorplan-thumbnail-0"]"#;

/// Selector set for zoopla.co.uk's current markup.
pub struct Zoopla;

impl ListingSite for Zoopla {
    fn root(&self) -> &str {
        crate::config::SITE_ROOT
    }

    fn search_input(&self) -> &str {
        SEARCH_INPUT
    }

    fn listing_url(&self, href: &str) -> Result<String> {
        let base = Url::parse(self.root()).context("site root is not a valid URL")?;
        let resolved = base
            .join(href)
            .with_context(|| format!("cannot resolve listing href {href:?}"))?;
        Ok(resolved.to_string())
    }

    fn find_listing_cards(&self, results_html: &str) -> Result<Vec<ListingSummary>> {
        let document = Html::parse_document(results_html);
        let container_sel = Selector::parse(RESULTS_CONTAINER).unwrap();
        let card_sel = Selector::parse(LISTING_CARD).unwrap();
        let anchor_sel = Selector::parse("a").unwrap();
        let address_sel = Selector::parse("address").unwrap();
        let heading_sel = Selector::parse("h2").unwrap();

        let container = document
            .select(&container_sel)
            .next()
            .context("results container not found on search page")?;

        let mut summaries = Vec::new();
        for (idx, card) in container.select(&card_sel).enumerate() {
            let href = card
                .select(&anchor_sel)
                .next()
                .and_then(|a| a.value().attr("href"));
            let address = card
                .select(&address_sel)
                .next()
                .map(|el| el.text().collect::<String>());
            let title = card
                .select(&heading_sel)
                .next()
                .map(|el| el.text().collect::<String>());

            match (href, address, title) {
                (Some(href), Some(address), Some(title)) => summaries.push(ListingSummary {
                    address: address.trim().to_string(),
                    title: title.trim().to_string(),
                    detail_url: self.listing_url(href)?,
                }),
                _ => warn!("Skipping malformed listing card at index {}", idx),
            }
        }

        Ok(summaries)
    }

    fn find_detail_fragment(&self, page_html: &str) -> Option<String> {
        let document = Html::parse_document(page_html);
        let container_sel = Selector::parse(DETAIL_CONTAINER).unwrap();
        document
            .select(&container_sel)
            .next()
            .map(|el| el.inner_html())
    }

    fn find_gallery_sources(&self, detail_html: &str) -> Vec<String> {
        let fragment = Html::parse_fragment(detail_html);
        let section_sel = Selector::parse(GALLERY_SECTION).unwrap();
        let picture_sel = Selector::parse("picture").unwrap();
        let source_sel = Selector::parse("source").unwrap();

        let mut urls = Vec::new();
        let Some(section) = fragment.select(&section_sel).next() else {
            return urls;
        };

        for picture in section.select(&picture_sel) {
            for source in picture.select(&source_sel) {
                let encoding = source
                    .value()
                    .attr("type")
                    .unwrap_or("")
                    .rsplit('/')
                    .next()
                    .unwrap_or("");
                let url = first_srcset_url(source.value().attr("srcset").unwrap_or(""));

                if encoding == "webp" && url.contains("1024") {
                    urls.push(url.to_string());
                }
            }
        }

        urls
    }

    fn find_attribute_fragment(&self, detail_html: &str) -> Option<String> {
        let fragment = Html::parse_fragment(detail_html);
        let sheet_sel = Selector::parse(FACT_SHEET).unwrap();
        fragment.select(&sheet_sel).next().map(|el| el.html())
    }

    fn find_floor_plan(&self, detail_html: &str) -> Option<String> {
        let fragment = Html::parse_fragment(detail_html);
        let thumb_sel = Selector::parse(FLOOR_PLAN_THUMB).unwrap();
        let source_sel = Selector::parse("picture source").unwrap();

        let thumb = fragment.select(&thumb_sel).next()?;
        let srcset = thumb
            .select(&source_sel)
            .next()
            .and_then(|source| source.value().attr("srcset"))?;
        srcset.split_whitespace().next().map(str::to_string)
    }
}

/// First URL token of the first comma-separated srcset candidate.
fn first_srcset_url(srcset: &str) -> &str {
    srcset
        .split(',')
        .next()
        .unwrap_or("")
        .trim_start()
        .split(' ')
        .next()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <div data-testid="regular-listings">
          <div class="dkr2t83">
            <a href="/p/1"></a>
            <address>1 Test St</address>
            <h2>Nice Flat</h2>
          </div>
          <div class="dkr2t83">
            <a href="/p/2"></a>
            <address>2 Test St</address>
            <h2>Bigger Flat</h2>
          </div>
        </div>
        </body></html>"#;

    #[test]
    fn discovers_every_well_formed_card() {
        let cards = Zoopla.find_listing_cards(RESULTS_PAGE).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].address, "1 Test St");
        assert_eq!(cards[0].title, "Nice Flat");
        assert_eq!(cards[0].detail_url, "https://www.zoopla.co.uk/p/1");
        assert_eq!(cards[1].detail_url, "https://www.zoopla.co.uk/p/2");
    }

    #[test]
    fn discovery_is_deterministic() {
        let first = Zoopla.find_listing_cards(RESULTS_PAGE).unwrap();
        let second = Zoopla.find_listing_cards(RESULTS_PAGE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn card_without_address_is_skipped() {
        let html = r#"
            <div data-testid="regular-listings">
              <div class="dkr2t83"><a href="/p/1"></a><h2>No Address</h2></div>
              <div class="dkr2t83">
                <a href="/p/2"></a><address>2 Test St</address><h2>Fine</h2>
              </div>
            </div>"#;
        let cards = Zoopla.find_listing_cards(html).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].address, "2 Test St");
    }

    #[test]
    fn missing_results_container_is_an_error() {
        assert!(Zoopla.find_listing_cards("<html><body></body></html>").is_err());
    }

    const GALLERY: &str = r#"
        <section aria-labelledby="listing-gallery-heading">
          <picture>
            <source type="image/webp"
                    srcset="https://img/a-1024.webp 1024w, https://img/a-2048.webp 2048w">
            <source type="image/jpeg" srcset="https://img/a-1024.jpg 1024w">
          </picture>
          <picture>
            <source type="image/webp" srcset="https://img/b-480.webp 480w">
            <source type="image/webp" srcset="https://img/b-1024.webp 1024w">
          </picture>
        </section>"#;

    #[test]
    fn gallery_keeps_webp_sources_at_target_resolution_in_order() {
        let urls = Zoopla.find_gallery_sources(GALLERY);
        assert_eq!(
            urls,
            vec![
                "https://img/a-1024.webp".to_string(),
                "https://img/b-1024.webp".to_string(),
            ]
        );
    }

    #[test]
    fn gallery_is_empty_when_no_source_qualifies() {
        let html = r#"
            <section aria-labelledby="listing-gallery-heading">
              <picture>
                <source type="image/jpeg" srcset="https://img/a-1024.jpg 1024w">
                <source type="image/webp" srcset="https://img/a-480.webp 480w">
              </picture>
            </section>"#;
        assert!(Zoopla.find_gallery_sources(html).is_empty());
        assert!(Zoopla.find_gallery_sources("<div></div>").is_empty());
    }

    #[test]
    fn floor_plan_takes_first_srcset_token() {
        let html = r#"
            <div data-testid="floorplan-thumbnail-0">
              <picture>
                <source srcset="https://img/plan-1024.webp 1024w, https://img/plan-2048.webp 2048w">
              </picture>
            </div>"#;
        assert_eq!(
            Zoopla.find_floor_plan(html).as_deref(),
            Some("https://img/plan-1024.webp")
        );
    }

    #[test]
    fn floor_plan_is_absent_without_thumbnail() {
        assert_eq!(Zoopla.find_floor_plan("<div>no plan here</div>"), None);
    }

    #[test]
    fn detail_fragment_and_fact_sheet_are_located() {
        let page = r#"
            <html><body>
            <div data-testid="listing-details-page">
              <div class="_14bi3x331"><p>2 beds</p></div>
            </div>
            </body></html>"#;
        let detail = Zoopla.find_detail_fragment(page).unwrap();
        let sheet = Zoopla.find_attribute_fragment(&detail).unwrap();
        assert!(sheet.contains("2 beds"));
        assert!(Zoopla.find_attribute_fragment("<div></div>").is_none());
    }
}
