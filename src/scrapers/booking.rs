use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::models::{Platform, SearchRequest};
use crate::scrapers::types::extract_number;
use crate::scrapers::{fetch_html, PlatformScraper, RawListing, ScrapeError};

const BASE_URL: &str = "https://www.booking.com";

/// Booking.com search-results scraper
///
/// Ratings come back on Booking's 0-10 scale. The search URL pre-filters
/// price and review score at the source; the price filter is still applied
/// again downstream since the URL variant is unreliable.
pub struct BookingScraper {
    client: Client,
}

impl BookingScraper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn build_search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}/searchresults.de.html?ss={}&checkin={}&checkout={}&group_adults={}&no_rooms=1&group_children=0",
            BASE_URL,
            urlencoding::encode(&request.location),
            request.check_in,
            request.check_out,
            request.guests
        );

        if let Some(max_price) = request.max_price {
            url.push_str(&format!("&price=CHF-0-CHF-{}", max_price.round() as u64));
        }

        // Apartments, holiday homes, chalets
        url.push_str("&nflt=ht_id%3D201%3Bht_id%3D204%3Bht_id%3D220");

        if let Some(min_rating) = request.min_rating {
            // Canonical 0-5 scale to Booking's review_score percentage
            let review_score = (min_rating * 2.0 * 10.0).round() as u32;
            if review_score > 0 {
                url.push_str(&format!("&review_score={}", review_score));
            }
        }

        url
    }
}

#[async_trait]
impl PlatformScraper for BookingScraper {
    fn platform(&self) -> Platform {
        Platform::Booking
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawListing>, ScrapeError> {
        let url = self.build_search_url(request);
        let html = fetch_html(&self.client, &url).await?;
        parse_property_cards(&html)
    }
}

fn parse_property_cards(html: &str) -> Result<Vec<RawListing>, ScrapeError> {
    let card_sel = selector("[data-testid=\"property-card\"]")?;
    let title_sel = selector("[data-testid=\"title\"]")?;
    let address_sel = selector("[data-testid=\"address\"]")?;
    let price_sel = selector("[data-testid=\"price-and-discounted-price\"]")?;
    let score_sel = selector("[data-testid=\"review-score\"]")?;
    let distance_sel = selector("[data-testid=\"distance\"]")?;
    let link_sel = selector("a[data-testid=\"title-link\"]")?;
    let img_sel = selector("img")?;

    let document = Html::parse_document(html);
    let mut properties = Vec::new();

    for card in document.select(&card_sel) {
        let title = card
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>());

        let address = card
            .select(&address_sel)
            .next()
            .map(|el| el.text().collect::<String>());

        let price_per_night = card
            .select(&price_sel)
            .next()
            .and_then(|el| extract_number(&el.text().collect::<String>()));

        let (rating, num_reviews) = card
            .select(&score_sel)
            .next()
            .map(|el| parse_review_score(&el.text().collect::<String>()))
            .unwrap_or((None, None));

        let distance_km = card
            .select(&distance_sel)
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

        properties.push(RawListing {
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
            distance_km,
        });
    }

    Ok(properties)
}

/// Booking's score block reads like "Scored 8.6 8.6 Fabelhaft 1'024 Bewertungen":
/// the first decimal is the rating, the last integer the review count.
fn parse_review_score(text: &str) -> (Option<f64>, Option<u32>) {
    let rating = extract_number(text).filter(|r| (0.0..=10.0).contains(r));

    let num_reviews = text
        .split_whitespace()
        .rev()
        .find_map(|token| {
            let digits: String = token
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            if digits.is_empty() || token.contains('.') {
                None
            } else {
                digits.parse::<u32>().ok()
            }
        });

    (rating, num_reviews)
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::ParseError(e.to_string()))
}
