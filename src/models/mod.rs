use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One listing card lifted from the search-results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingSummary {
    pub address: String,
    pub title: String,
    pub detail_url: String,
}

/// The fixed fact-sheet schema the model is asked to fill in.
///
/// Every key must be present in the model's reply; a value the model cannot
/// determine comes back as an empty string, never as a missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    pub price: String,
    pub address: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub receptions: String,
    #[serde(rename = "EPC Rating")]
    pub epc_rating: String,
    pub tenure: String,
    pub time_remaining_on_lease: String,
    pub service_charge: String,
    pub council_tax_band: String,
    pub ground_rent: String,
}

impl PropertyAttributes {
    /// Keys a well-formed model reply has to carry, in schema order.
    pub const KEYS: [&'static str; 11] = [
        "price",
        "address",
        "bedrooms",
        "bathrooms",
        "receptions",
        "EPC Rating",
        "tenure",
        "time_remaining_on_lease",
        "service_charge",
        "council_tax_band",
        "ground_rent",
    ];
}

/// The published unit: listing summary, gallery, floor plan and model
/// attributes merged into one flat JSON object.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyRecord {
    pub title: String,
    pub link: String,
    pub pictures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_plan: Option<String>,
    pub scraped_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attributes: PropertyAttributes,
}

impl PropertyRecord {
    /// Merge the extracted pieces into one record.
    ///
    /// The fact sheet usually repeats the address; the card's address only
    /// stands in when the model leaves the field empty.
    pub fn assemble(
        summary: ListingSummary,
        pictures: Vec<String>,
        floor_plan: Option<String>,
        mut attributes: PropertyAttributes,
    ) -> Self {
        if attributes.address.is_empty() {
            attributes.address = summary.address;
        }

        Self {
            title: summary.title,
            link: summary.detail_url,
            pictures,
            floor_plan,
            scraped_at: Utc::now(),
            attributes,
        }
    }
}
