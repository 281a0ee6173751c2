use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{AggregatedResult, SearchRequest};

/// Errors that can occur while publishing a report
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Boundary to report rendering and persistence
///
/// Called exactly once per job, after every platform result has been folded
/// in. The returned location is an opaque string the job stores for clients.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(
        &self,
        job_id: &str,
        request: &SearchRequest,
        result: &AggregatedResult,
    ) -> Result<String, SinkError>;
}

/// Writes the HTML comparison report plus a CSV export to a local directory
pub struct FileReportSink {
    output_dir: PathBuf,
}

impl FileReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn publish(
        &self,
        job_id: &str,
        request: &SearchRequest,
        result: &AggregatedResult,
    ) -> Result<String, SinkError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let html_name = format!("search_results_{}.html", job_id);
        let csv_name = format!("search_results_{}.csv", job_id);

        tokio::fs::write(
            self.output_dir.join(&html_name),
            render_html(request, result),
        )
        .await?;
        tokio::fs::write(self.output_dir.join(&csv_name), render_csv(result)).await?;

        tracing::info!(
            "Report for job {} written: {} listings, {}",
            job_id,
            result.listings.len(),
            html_name
        );

        Ok(format!("/api/v1/results/{}", html_name))
    }
}

fn render_html(request: &SearchRequest, result: &AggregatedResult) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>Unterkunfts-Vergleichsreport</title>\n<style>\n\
         body { font-family: Arial, sans-serif; margin: 20px; background: #f5f5f5; }\n\
         h1 { color: #FF5A5F; text-align: center; }\n\
         .summary, .listing { background: white; padding: 20px; margin: 20px 0; \
         border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }\n\
         .platform-badge { display: inline-block; padding: 5px 10px; border-radius: 4px; \
         color: white; font-weight: bold; font-size: 12px; margin-right: 10px; }\n\
         .airbnb { background: #FF5A5F; } .booking { background: #003580; }\n\
         .hotelscom { background: #D32F2F; } .expedia { background: #0057B8; }\n\
         .price { font-size: 24px; font-weight: bold; color: #008009; }\n\
         .rating { background: #FF8C00; color: white; padding: 5px 10px; \
         border-radius: 4px; display: inline-block; }\n\
         img { max-width: 300px; border-radius: 8px; }\n\
         </style>\n</head>\n<body>\n<h1>🏠 Unterkunfts-Vergleichsreport</h1>\n",
    );

    html.push_str(&format!(
        "<div class=\"summary\">\n<p><strong>Ort:</strong> {}</p>\n\
         <p><strong>Zeitraum:</strong> {} - {}</p>\n\
         <p><strong>Gefunden:</strong> {} Unterkünfte</p>\n",
        escape(&request.location),
        request.check_in,
        request.check_out,
        result.listings.len()
    ));
    for (platform, counts) in &result.platform_counts {
        html.push_str(&format!(
            "<p><strong>{}:</strong> {} gefunden, {} nach Filter</p>\n",
            platform.label(),
            counts.returned,
            counts.after_filter
        ));
    }
    html.push_str("</div>\n");

    for (idx, listing) in result.listings.iter().enumerate() {
        html.push_str("<div class=\"listing\">\n");
        for source in &listing.sources {
            html.push_str(&format!(
                "<span class=\"platform-badge {}\">{}</span>",
                source.as_str(),
                source.label()
            ));
        }
        html.push_str(&format!("\n<h2>{}. {}</h2>\n", idx + 1, escape(&listing.title)));

        if let Some(address) = &listing.address {
            html.push_str(&format!("<p>📍 {}</p>\n", escape(address)));
        }
        if let Some(image) = listing.image_urls.first() {
            html.push_str(&format!("<img src=\"{}\" alt=\"\">\n", escape(image)));
        }
        match listing.price_per_night {
            Some(price) => html.push_str(&format!(
                "<p><span class=\"price\">{} {:.0}</span> pro Nacht</p>\n",
                escape(listing.currency.as_deref().unwrap_or("CHF")),
                price
            )),
            None => html.push_str("<p><span class=\"price\">Preis unbekannt</span></p>\n"),
        }
        let rating = listing
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "N/A".to_string());
        let reviews = listing
            .num_reviews
            .map(|n| n.to_string())
            .unwrap_or_else(|| "0".to_string());
        html.push_str(&format!(
            "<p><span class=\"rating\">⭐ {}</span> ({} Bewertungen)</p>\n",
            rating, reviews
        ));
        if let Some(distance) = listing.distance_km {
            html.push_str(&format!("<p>📏 Distanz: {:.1} km</p>\n", distance));
        }
        html.push_str(&format!(
            "<p><a href=\"{}\" target=\"_blank\">🔗 Ansehen</a></p>\n</div>\n",
            escape(&listing.url)
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_csv(result: &AggregatedResult) -> String {
    let mut csv =
        String::from("platform,title,price_per_night,rating,num_reviews,distance_km,url\n");

    for listing in &result.listings {
        let sources = listing
            .sources
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join("+");
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            sources,
            csv_field(&listing.title),
            listing
                .price_per_night
                .map(|p| format!("{:.2}", p))
                .unwrap_or_default(),
            listing
                .rating
                .map(|r| format!("{:.2}", r))
                .unwrap_or_default(),
            listing
                .num_reviews
                .map(|n| n.to_string())
                .unwrap_or_default(),
            listing
                .distance_km
                .map(|d| format!("{:.1}", d))
                .unwrap_or_default(),
            csv_field(&listing.url),
        ));
    }

    csv
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
