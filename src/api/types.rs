use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Quote
// ============================================================================

/// A quote card as returned by `GET /getQuotes`.
///
/// Quotes are immutable once fetched. Optional fields tolerate `null` or
/// missing keys because the service does not guarantee them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub created_at: Option<String>,
}

impl Quote {
    /// Author name for display, "Unknown" when the service omitted it.
    pub fn author(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or("Unknown")
    }

    /// Creation date as `YYYY-MM-DD` (UTC), or empty if unparseable.
    pub fn created_date(&self) -> String {
        self.created_at
            .as_deref()
            .and_then(format_date)
            .unwrap_or_default()
    }
}

/// Format a service timestamp as a UTC calendar date (`YYYY-MM-DD`).
///
/// Accepts RFC 3339, naive ISO-8601 (assumed UTC), `YYYY-MM-DD HH:MM:SS`,
/// and millisecond epoch numbers. Returns `None` for anything else.
pub fn format_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed: Option<DateTime<Utc>> = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
                .map(|naive| naive.and_utc())
                .ok()
        })
        .or_else(|| {
            raw.parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
        });

    match parsed {
        Some(dt) => Some(dt.format("%Y-%m-%d").to_string()),
        None => {
            tracing::debug!(raw = %raw, "Unparseable quote timestamp");
            None
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateQuoteRequest<'a> {
    pub text: &'a str,
    pub media_url: &'a str,
}

/// Body of `GET /getQuotes`: `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct QuotePage {
    #[serde(default)]
    pub data: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub url: Option<String>,
}

/// An image file ready to be posted to the media endpoint.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Lenient id/timestamp decoding
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer)
        .map(|value| value.map(StringOrNumber::into_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quote_from_service_json() {
        let json = r#"{
            "id": 42,
            "text": "Stay hungry",
            "mediaUrl": "https://cdn.example.com/a.jpg",
            "username": "jobs",
            "createdAt": "2024-08-09T21:15:00.000Z"
        }"#;
        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.id, "42");
        assert_eq!(quote.text, "Stay hungry");
        assert_eq!(
            quote.media_url.as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(quote.author(), "jobs");
        assert_eq!(quote.created_date(), "2024-08-09");
    }

    #[test]
    fn test_quote_string_id_and_missing_fields() {
        let quote: Quote = serde_json::from_str(r#"{"id": "abc", "text": "hi"}"#).unwrap();
        assert_eq!(quote.id, "abc");
        assert_eq!(quote.media_url, None);
        assert_eq!(quote.author(), "Unknown");
        assert_eq!(quote.created_date(), "");
    }

    #[test]
    fn test_quote_null_fields() {
        let quote: Quote = serde_json::from_str(
            r#"{"id": 1, "text": "x", "mediaUrl": null, "username": null, "createdAt": null}"#,
        )
        .unwrap();
        assert_eq!(quote.media_url, None);
        assert_eq!(quote.created_at, None);
    }

    #[test]
    fn test_quote_missing_id_rejected() {
        let result: Result<Quote, _> = serde_json::from_str(r#"{"text": "no id"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_date_uses_utc() {
        // 23:30 at -05:00 is the next day in UTC
        assert_eq!(
            format_date("2024-03-01T23:30:00-05:00").as_deref(),
            Some("2024-03-02")
        );
    }

    #[test]
    fn test_format_date_naive_forms() {
        assert_eq!(
            format_date("2023-12-31T10:00:00").as_deref(),
            Some("2023-12-31")
        );
        assert_eq!(
            format_date("2023-12-31 10:00:00").as_deref(),
            Some("2023-12-31")
        );
    }

    #[test]
    fn test_format_date_epoch_millis() {
        // 2024-01-01T00:00:00Z
        assert_eq!(format_date("1704067200000").as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_format_date_invalid() {
        assert_eq!(format_date("yesterday"), None);
        assert_eq!(format_date(""), None);
    }

    #[test]
    fn test_create_request_uses_camel_case() {
        let body = serde_json::to_value(CreateQuoteRequest {
            text: "t",
            media_url: "https://m",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"text": "t", "mediaUrl": "https://m"}));
    }
}
