use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::dates::{format_yyyymmdd, parse_yyyymmdd};
use crate::models::PriceFrame;

/// Last traded price field.
pub const PX_LAST: &str = "PX_LAST";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Vendor error: {0}")]
    Vendor(String),
}

/// A single field value as the vendor reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Dates come back either as YYYYMMDD text or as the same digits in a number.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 => parse_yyyymmdd(&format!("{}", *n as i64)).ok(),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => parse_yyyymmdd(s).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub values: HashMap<String, FieldValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityHistory {
    pub security: String,
    pub rows: Vec<HistoryRow>,
}

/// Response to a historical request: per security, date-ordered field values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoricalData {
    pub securities: Vec<SecurityHistory>,
}

impl HistoricalData {
    pub fn security(&self, security: &str) -> Option<&SecurityHistory> {
        self.securities.iter().find(|s| s.security == security)
    }

    /// Dated values of one field for one security, in date order.
    pub fn values(&self, security: &str, field: &str) -> Vec<(NaiveDate, &FieldValue)> {
        self.security(security)
            .map(|history| {
                history
                    .rows
                    .iter()
                    .filter_map(|row| row.values.get(field).map(|v| (row.date, v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Wide frame of `field`, one column per security in the order given.
    /// A security the vendor returned nothing for still gets a (NaN) column.
    pub fn price_frame(&self, securities: &[&str], field: &str) -> PriceFrame {
        PriceFrame::from_observations(
            securities
                .iter()
                .map(|security| (security.to_string(), self.numeric(security, field)))
                .collect(),
        )
    }

    /// One column per field for a single security, named after the field.
    pub fn field_frame(&self, security: &str, fields: &[&str]) -> PriceFrame {
        PriceFrame::from_observations(
            fields
                .iter()
                .map(|field| (field.to_string(), self.numeric(security, field)))
                .collect(),
        )
    }

    fn numeric(&self, security: &str, field: &str) -> Vec<(NaiveDate, f64)> {
        self.values(security, field)
            .into_iter()
            .map(|(date, v)| (date, v.as_f64().unwrap_or(f64::NAN)))
            .collect()
    }
}

/// Response to a reference (current value) request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceData {
    pub values: Vec<(String, FieldValue)>,
}

impl ReferenceData {
    pub fn get(&self, security: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(s, _)| s == security)
            .map(|(_, v)| v)
    }
}

/// Boundary to the market-data vendor.
pub trait QuoteVendor {
    /// Historical values of `fields` for each security between `start` and
    /// `end` inclusive.
    fn historical_request(
        &self,
        securities: &[&str],
        fields: &[&str],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalData, ApiError>;

    /// Current value of `field` for each security.
    fn reference_request(&self, securities: &[&str], field: &str) -> Result<ReferenceData, ApiError>;
}

#[derive(Deserialize)]
struct HistoricalResponse {
    #[serde(default)]
    securities: Vec<WireSecurity>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct WireSecurity {
    security: String,
    #[serde(default)]
    rows: Vec<WireRow>,
}

#[derive(Deserialize)]
struct WireRow {
    date: String,
    #[serde(default)]
    values: HashMap<String, FieldValue>,
}

#[derive(Deserialize)]
struct ReferenceResponse {
    #[serde(default)]
    values: Vec<WireReference>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct WireReference {
    security: String,
    value: FieldValue,
}

/// Blocking HTTP client for the market-data bridge.
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("histprices/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .map_err(|e| ApiError::ParseError(format!("Failed to get response text: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::RequestFailed(format!("{} returned {}: {}", url, status, response_text)));
        }

        Ok(response_text)
    }
}

impl QuoteVendor for ApiClient {
    fn historical_request(
        &self,
        securities: &[&str],
        fields: &[&str],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalData, ApiError> {
        tracing::debug!(
            "Historical request {:?} {:?} {}..{}",
            securities,
            fields,
            start,
            end
        );

        let text = self.get_text(
            "historical",
            &[
                ("securities", securities.join(",")),
                ("fields", fields.join(",")),
                ("start", format_yyyymmdd(start)),
                ("end", format_yyyymmdd(end)),
            ],
        )?;

        parse_historical(&text)
    }

    fn reference_request(&self, securities: &[&str], field: &str) -> Result<ReferenceData, ApiError> {
        tracing::debug!("Reference request {:?} {}", securities, field);

        let text = self.get_text(
            "reference",
            &[("securities", securities.join(",")), ("field", field.to_string())],
        )?;

        parse_reference(&text)
    }
}

/// Parse a historical response body. Rows are returned in date order.
pub fn parse_historical(text: &str) -> Result<HistoricalData, ApiError> {
    let response: HistoricalResponse = serde_json::from_str(text)
        .map_err(|e| ApiError::ParseError(format!("Failed to parse history. Response: {}. Error: {}", text, e)))?;

    if let Some(error) = response.error {
        return Err(ApiError::Vendor(error));
    }

    let mut securities = Vec::with_capacity(response.securities.len());
    for wire in response.securities {
        let mut rows = Vec::with_capacity(wire.rows.len());
        for row in wire.rows {
            let date = parse_yyyymmdd(&row.date)
                .map_err(|_| ApiError::ParseError(format!("Invalid date '{}' for {}", row.date, wire.security)))?;
            rows.push(HistoryRow {
                date,
                values: row.values,
            });
        }

        // Sort by date (ascending)
        rows.sort_by_key(|row| row.date);

        securities.push(SecurityHistory {
            security: wire.security,
            rows,
        });
    }

    Ok(HistoricalData { securities })
}

/// Parse a reference response body.
pub fn parse_reference(text: &str) -> Result<ReferenceData, ApiError> {
    let response: ReferenceResponse = serde_json::from_str(text)
        .map_err(|e| ApiError::ParseError(format!("Failed to parse reference data. Response: {}. Error: {}", text, e)))?;

    if let Some(error) = response.error {
        return Err(ApiError::Vendor(error));
    }

    Ok(ReferenceData {
        values: response
            .values
            .into_iter()
            .map(|r| (r.security, r.value))
            .collect(),
    })
}
