use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::models::{Platform, SearchRequest};
use crate::scrapers::types::extract_number;
use crate::scrapers::{fetch_html, PlatformScraper, RawListing, ScrapeError};

/// Hotels.com (Swiss storefront) search-results scraper
///
/// Ratings come back on the 0-10 guest-score scale.
pub struct HotelsComScraper {
    client: Client,
}

impl HotelsComScraper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn build_search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "https://ch.hotels.com/Hotel-Search?destination={}&startDate={}&endDate={}&rooms=1&adults={}&locale=de_CH&pos=HCOM_CH&siteid=300000014",
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
impl PlatformScraper for HotelsComScraper {
    fn platform(&self) -> Platform {
        Platform::HotelsCom
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawListing>, ScrapeError> {
        let url = self.build_search_url(request);
        let html = fetch_html(&self.client, &url).await?;
        parse_lodging_cards(&html, "https://ch.hotels.com")
    }
}

/// Parse the Expedia-group lodging-card markup.
///
/// Hotels.com and Expedia render the same card structure, so the Expedia
/// scraper reuses this.
pub(crate) fn parse_lodging_cards(
    html: &str,
    base_url: &str,
) -> Result<Vec<RawListing>, ScrapeError> {
    let card_sel = selector("[data-stid=\"lodging-card-responsive\"]")?;
    let title_sel = selector("h3")?;
    let price_sel = selector("[data-test-id=\"price-summary\"]")?;
    let badge_sel = selector("span.uitk-badge-base-text")?;
    let link_sel = selector("a")?;
    let img_sel = selector("img")?;

    let document = Html::parse_document(html);
    let mut hotels = Vec::new();

    for card in document.select(&card_sel) {
        let title = card
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>());

        let price_per_night = card
            .select(&price_sel)
            .next()
            .and_then(|el| extract_number(&el.text().collect::<String>()));

        let rating = card
            .select(&badge_sel)
            .next()
            .and_then(|el| extract_number(&el.text().collect::<String>()))
            .filter(|r| (0.0..=10.0).contains(r));

        let num_reviews = parse_review_count(&card.text().collect::<String>());

        let url = card
            .select(&link_sel)
            .find_map(|a| a.value().attr("href"))
            .map(|href| {
                if href.starts_with('/') {
                    format!("{}{}", base_url, href)
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

        hotels.push(RawListing {
            id: None,
            title,
            price_per_night,
            currency: price_per_night.map(|_| "CHF".to_string()),
            rating,
            num_reviews,
            latitude: None,
            longitude: None,
            address: None,
            image_urls,
            url,
            distance_km: None,
        });
    }

    Ok(hotels)
}

/// Review counts render like "1'024 Bewertungen" / "412 reviews"
fn parse_review_count(text: &str) -> Option<u32> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        let lowered = token.to_lowercase();
        if lowered.starts_with("bewertung") || lowered.starts_with("review") {
            let digits: String = tokens
                .get(i.wrapping_sub(1))?
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            return digits.parse().ok();
        }
    }
    None
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::ParseError(e.to_string()))
}
