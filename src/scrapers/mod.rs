// Scraper exports
pub mod adapter;
pub mod airbnb;
pub mod booking;
pub mod expedia;
pub mod hotelscom;
pub mod traits;
pub mod types;

pub use adapter::ScraperAdapter;
pub use airbnb::AirbnbScraper;
pub use booking::BookingScraper;
pub use expedia::ExpediaScraper;
pub use hotelscom::HotelsComScraper;
pub use traits::{PlatformScraper, ScrapeError};
pub use types::RawListing;

use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScrapingSettings;
use crate::models::Platform;

/// Build one scraper per supported platform, sharing a single HTTP client.
pub fn build_scrapers(
    settings: &ScrapingSettings,
) -> Result<HashMap<Platform, Arc<dyn PlatformScraper>>, reqwest::Error> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .user_agent(&settings.user_agent)
        .build()?;

    let mut scrapers: HashMap<Platform, Arc<dyn PlatformScraper>> = HashMap::new();
    scrapers.insert(
        Platform::Airbnb,
        Arc::new(AirbnbScraper::new(client.clone())),
    );
    scrapers.insert(
        Platform::Booking,
        Arc::new(BookingScraper::new(client.clone())),
    );
    scrapers.insert(
        Platform::HotelsCom,
        Arc::new(HotelsComScraper::new(client.clone())),
    );
    scrapers.insert(Platform::Expedia, Arc::new(ExpediaScraper::new(client)));

    Ok(scrapers)
}

/// GET a search page, translating transport failures and bot walls into the
/// scrape error taxonomy.
pub(crate) async fn fetch_html(client: &Client, url: &str) -> Result<String, ScrapeError> {
    tracing::debug!("Fetching {}", url);

    let response = client
        .get(url)
        .header("Accept-Language", "de-CH,de;q=0.9,en;q=0.8")
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ScrapeError::BlockedOrCaptcha);
    }
    if !status.is_success() {
        return Err(ScrapeError::Unavailable(format!("HTTP {}", status)));
    }

    let body = response.text().await?;
    let lowered = body.to_lowercase();
    if lowered.contains("captcha")
        || lowered.contains("pardon our interruption")
        || lowered.contains("are you a robot")
    {
        return Err(ScrapeError::BlockedOrCaptcha);
    }

    Ok(body)
}
