use serde::{Deserialize, Serialize};

/// Platform-specific raw result, before normalization
///
/// Everything is optional: the sites expose different subsets of these
/// fields and markup changes silently. `rating` is in the platform's native
/// scale; the normalizer converts it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    pub id: Option<String>,
    pub title: Option<String>,
    pub price_per_night: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub num_reviews: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub url: Option<String>,
    pub distance_km: Option<f64>,
}

/// Pull the first decimal number out of a text fragment like "CHF 1'250" or
/// "4.85 (123 reviews)". Thousands separators common on the Swiss sites
/// (apostrophe, comma-as-thousands) are stripped before parsing.
pub(crate) fn extract_number(text: &str) -> Option<f64> {
    let cleaned = text.replace('\u{2019}', "'");
    let mut number = String::new();
    let mut seen_digit = false;

    for ch in cleaned.chars() {
        match ch {
            '0'..='9' => {
                seen_digit = true;
                number.push(ch);
            }
            '.' if seen_digit && !number.contains('.') => number.push(ch),
            '\'' | ',' if seen_digit => continue,
            _ if seen_digit => break,
            _ => continue,
        }
    }

    if seen_digit {
        number.trim_end_matches('.').parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_number() {
        assert_eq!(extract_number("CHF 120"), Some(120.0));
        assert_eq!(extract_number("4.85 (123)"), Some(4.85));
    }

    #[test]
    fn test_extract_with_separators() {
        assert_eq!(extract_number("CHF 1'250 per night"), Some(1250.0));
        assert_eq!(extract_number("1,250 kr"), Some(1250.0));
    }

    #[test]
    fn test_no_number() {
        assert_eq!(extract_number("price on request"), None);
        assert_eq!(extract_number(""), None);
    }

    #[test]
    fn test_stops_at_second_number() {
        assert_eq!(extract_number("8.6 Fabulous 1024 reviews"), Some(8.6));
    }
}
