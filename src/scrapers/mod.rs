pub mod browser;
pub mod site;
pub mod zoopla;

pub use browser::{BrowserSession, PageFetcher};
pub use site::ListingSite;
pub use zoopla::Zoopla;
