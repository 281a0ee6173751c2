use async_trait::async_trait;
use reqwest::Client;

use crate::models::{Platform, SearchRequest};
use crate::scrapers::hotelscom::parse_lodging_cards;
use crate::scrapers::{fetch_html, PlatformScraper, RawListing, ScrapeError};

const BASE_URL: &str = "https://www.expedia.ch";

/// Expedia (Swiss storefront) search-results scraper
///
/// Expedia serves the same lodging-card markup as Hotels.com (same parent
/// company), so parsing is shared; only the URL shape differs. Ratings come
/// back on the 0-10 scale.
pub struct ExpediaScraper {
    client: Client,
}

impl ExpediaScraper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn build_search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}/Hotel-Search?destination={}&startDate={}&endDate={}&rooms=1&adults={}",
            BASE_URL,
            urlencoding::encode(&request.location),
            request.check_in,
            request.check_out,
            request.guests
        );

        if let Some(max_price) = request.max_price {
            url.push_str(&format!("&price={}", max_price.round() as u64));
        }

        url
    }
}

#[async_trait]
impl PlatformScraper for ExpediaScraper {
    fn platform(&self) -> Platform {
        Platform::Expedia
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawListing>, ScrapeError> {
        let url = self.build_search_url(request);
        let html = fetch_html(&self.client, &url).await?;
        parse_lodging_cards(&html, BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_search_url() {
        let scraper = ExpediaScraper::new(Client::new());
        let request = SearchRequest {
            location: "Crans-Montana".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
            guests: 3,
            max_price: Some(400.0),
            min_rating: None,
            min_reviews: None,
            search_radius_km: None,
            platforms: vec![Platform::Expedia],
        };
        let url = scraper.build_search_url(&request);
        assert!(url.starts_with("https://www.expedia.ch/Hotel-Search?destination=Crans-Montana"));
        assert!(url.contains("adults=3"));
        assert!(url.contains("price=400"));
    }
}
