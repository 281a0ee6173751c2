use std::sync::Arc;
use std::time::Duration;

use crate::models::{Platform, SearchRequest};
use crate::scrapers::{PlatformScraper, RawListing, ScrapeError};

/// Uniform wrapper around one platform's scraper
///
/// Enforces a hard wall-clock budget per invocation. On timeout the
/// underlying future is dropped (stop waiting, not stop running) and the
/// platform is reported failed; a slow platform never stalls its siblings.
pub struct ScraperAdapter {
    scraper: Arc<dyn PlatformScraper>,
    timeout: Duration,
}

impl ScraperAdapter {
    pub fn new(scraper: Arc<dyn PlatformScraper>, timeout: Duration) -> Self {
        Self { scraper, timeout }
    }

    pub fn platform(&self) -> Platform {
        self.scraper.platform()
    }

    pub async fn run(&self, request: &SearchRequest) -> Result<Vec<RawListing>, ScrapeError> {
        let platform = self.platform();
        tracing::debug!("Dispatching {} scrape for {}", platform, request.location);

        match tokio::time::timeout(self.timeout, self.scraper.search(request)).await {
            Ok(Ok(listings)) => {
                tracing::info!("{}: {} raw listings", platform, listings.len());
                Ok(listings)
            }
            Ok(Err(err)) => {
                tracing::warn!("{}: scrape failed: {}", platform, err);
                Err(err)
            }
            Err(_) => {
                tracing::warn!(
                    "{}: scrape exceeded {}s budget, abandoning",
                    platform,
                    self.timeout.as_secs()
                );
                Err(ScrapeError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct SlowScraper {
        delay: Duration,
    }

    #[async_trait]
    impl PlatformScraper for SlowScraper {
        fn platform(&self) -> Platform {
            Platform::Booking
        }

        async fn search(&self, _request: &SearchRequest) -> Result<Vec<RawListing>, ScrapeError> {
            tokio::time::sleep(self.delay).await;
            Ok(vec![RawListing::default()])
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            location: "Zermatt".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
            guests: 2,
            max_price: None,
            min_rating: None,
            min_reviews: None,
            search_radius_km: None,
            platforms: vec![Platform::Booking],
        }
    }

    #[test]
    fn test_slow_scrape_times_out() {
        tokio_test::block_on(async {
            let adapter = ScraperAdapter::new(
                Arc::new(SlowScraper {
                    delay: Duration::from_secs(5),
                }),
                Duration::from_millis(50),
            );

            let result = adapter.run(&request()).await;
            assert!(matches!(result, Err(ScrapeError::Timeout)));
        });
    }

    #[test]
    fn test_fast_scrape_passes_through() {
        tokio_test::block_on(async {
            let adapter = ScraperAdapter::new(
                Arc::new(SlowScraper {
                    delay: Duration::from_millis(5),
                }),
                Duration::from_secs(1),
            );

            let result = adapter.run(&request()).await.unwrap();
            assert_eq!(result.len(), 1);
        });
    }
}
