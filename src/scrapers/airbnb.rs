use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::models::{Platform, SearchRequest};
use crate::scrapers::types::extract_number;
use crate::scrapers::{fetch_html, PlatformScraper, RawListing, ScrapeError};

const BASE_URL: &str = "https://www.airbnb.ch";

/// Airbnb search-results scraper
///
/// Searches entire homes only (no private or shared rooms), mirroring what
/// the search URL filters at the source. Ratings come back on Airbnb's 0-5
/// scale.
pub struct AirbnbScraper {
    client: Client,
}

impl AirbnbScraper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn build_search_url(&self, request: &SearchRequest) -> String {
        // Airbnb path segments: spaces become dashes, commas double-dashes
        let location = request.location.replace(' ', "-").replace(',', "--");

        let mut url = format!(
            "{}/s/{}/homes?checkin={}&checkout={}&adults={}",
            BASE_URL, location, request.check_in, request.check_out, request.guests
        );

        if let Some(max_price) = request.max_price {
            url.push_str(&format!("&price_max={}", max_price.round() as u64));
        }

        // Entire homes only, no private or shared rooms
        url.push_str("&room_types%5B%5D=Entire%20home%2Fapt");

        url
    }
}

#[async_trait]
impl PlatformScraper for AirbnbScraper {
    fn platform(&self) -> Platform {
        Platform::Airbnb
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawListing>, ScrapeError> {
        let url = self.build_search_url(request);
        let html = fetch_html(&self.client, &url).await?;
        parse_listing_cards(&html)
    }
}

fn parse_listing_cards(html: &str) -> Result<Vec<RawListing>, ScrapeError> {
    let card_sel = selector("[data-testid=\"card-container\"]")?;
    let title_sel = selector("[data-testid=\"listing-card-title\"]")?;
    let subtitle_sel = selector("[data-testid=\"listing-card-subtitle\"]")?;
    let price_sel = selector("[data-testid=\"price-availability-row\"]")?;
    let link_sel = selector("a")?;
    let img_sel = selector("img")?;

    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for card in document.select(&card_sel) {
        let title = card
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>());

        let address = card
            .select(&subtitle_sel)
            .next()
            .map(|el| el.text().collect::<String>());

        let price_per_night = card
            .select(&price_sel)
            .next()
            .and_then(|el| extract_number(&el.text().collect::<String>()));

        let url = card
            .select(&link_sel)
            .find_map(|a| a.value().attr("href"))
            .map(|href| {
                if href.starts_with('/') {
                    format!("{}{}", BASE_URL, href)
                } else {
                    href.to_string()
                }
            });

        let image_urls: Vec<String> = card
            .select(&img_sel)
            .filter_map(|img| img.value().attr("src"))
            .map(str::to_string)
            .take(10)
            .collect();

        let (rating, num_reviews) = parse_rating_reviews(&card.text().collect::<String>());

        listings.push(RawListing {
            id: None,
            title,
            price_per_night,
            currency: price_per_night.map(|_| "CHF".to_string()),
            rating,
            num_reviews,
            latitude: None,
            longitude: None,
            address,
            image_urls,
            url,
            distance_km: None,
        });
    }

    Ok(listings)
}

/// Airbnb renders rating and review count as e.g. "4.85 (123)"
fn parse_rating_reviews(text: &str) -> (Option<f64>, Option<u32>) {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    for (i, token) in tokens.iter().enumerate() {
        let trimmed = token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.');
        if !trimmed.contains('.') {
            continue;
        }
        if let Ok(rating) = trimmed.parse::<f64>() {
            if (0.0..=5.0).contains(&rating) {
                let reviews = tokens.get(i + 1).and_then(|next| {
                    if !next.starts_with('(') {
                        return None;
                    }
                    let digits: String = next.chars().filter(char::is_ascii_digit).collect();
                    digits.parse().ok()
                });
                return (Some(rating), reviews);
            }
        }
    }

    (None, None)
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> SearchRequest {
        SearchRequest {
            location: "Zermatt, Schweiz".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
            guests: 2,
            max_price: Some(300.0),
            min_rating: None,
            min_reviews: None,
            search_radius_km: None,
            platforms: vec![Platform::Airbnb],
        }
    }

    #[test]
    fn test_search_url() {
        let scraper = AirbnbScraper::new(Client::new());
        let url = scraper.build_search_url(&request());
        assert!(url.starts_with("https://www.airbnb.ch/s/Zermatt--Schweiz/homes?"));
        assert!(url.contains("checkin=2026-01-10"));
        assert!(url.contains("checkout=2026-01-17"));
        assert!(url.contains("adults=2"));
        assert!(url.contains("price_max=300"));
        assert!(url.contains("room_types"));
    }

    #[test]
    fn test_parse_rating_reviews() {
        let (rating, reviews) = parse_rating_reviews("Cozy Cabin Zermatt 4.85 (123) night");
        assert_eq!(rating, Some(4.85));
        assert_eq!(reviews, Some(123));
    }

    #[test]
    fn test_parse_rating_without_reviews() {
        let (rating, reviews) = parse_rating_reviews("Chalet 4.9 new listing");
        assert_eq!(rating, Some(4.9));
        assert_eq!(reviews, None);
    }

    #[test]
    fn test_parse_cards_from_fragment() {
        let html = r#"
            <div data-testid="card-container">
                <a href="/rooms/12345?adults=2"></a>
                <div data-testid="listing-card-title">Cozy Cabin</div>
                <div data-testid="listing-card-subtitle">Wohnung in Zermatt</div>
                <div data-testid="price-availability-row">CHF 120 per night</div>
                <img src="https://img.test/1.jpg">
                <span>4.85 (123)</span>
            </div>
        "#;
        let listings = parse_listing_cards(html).unwrap();
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.title.as_deref(), Some("Cozy Cabin"));
        assert_eq!(listing.price_per_night, Some(120.0));
        assert_eq!(listing.rating, Some(4.85));
        assert_eq!(listing.num_reviews, Some(123));
        assert_eq!(
            listing.url.as_deref(),
            Some("https://www.airbnb.ch/rooms/12345?adults=2")
        );
    }

    #[test]
    fn test_parse_empty_page() {
        let listings = parse_listing_cards("<html><body></body></html>").unwrap();
        assert!(listings.is_empty());
    }
}
