use chrono::NaiveDate;

use super::PriceSource;
use crate::api_client::{QuoteVendor, PX_LAST};
use crate::dates::{self, DateRange};
use crate::error::Result;
use crate::models::PriceFrame;

/// Live vendor query for last prices, by symbol code.
pub struct VendorSource<'a> {
    vendor: &'a dyn QuoteVendor,
    lookback_weeks: i64,
    today: NaiveDate,
}

impl<'a> VendorSource<'a> {
    pub fn new(vendor: &'a dyn QuoteVendor, lookback_weeks: i64) -> Self {
        Self {
            vendor,
            lookback_weeks,
            today: dates::today(),
        }
    }

    /// Resolve open ranges against `today` instead of the system date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

impl PriceSource for VendorSource<'_> {
    fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceFrame> {
        let (start, end) = range.resolve(self.today, self.lookback_weeks)?;
        let data = self
            .vendor
            .historical_request(&[symbol], &[PX_LAST], start, end)?;

        let mut frame = data.field_frame(symbol, &[PX_LAST]);
        frame.rename(PX_LAST, symbol);

        tracing::info!("Fetched {} prices for {} ({}..{})", frame.len(), symbol, start, end);
        Ok(frame)
    }

    fn fetch_many(&self, symbols: &[&str], range: &DateRange) -> Result<PriceFrame> {
        let (start, end) = range.resolve(self.today, self.lookback_weeks)?;
        let data = self
            .vendor
            .historical_request(symbols, &[PX_LAST], start, end)?;

        let frame = data.price_frame(symbols, PX_LAST);

        tracing::info!(
            "Fetched {} rows for {} symbols ({}..{})",
            frame.len(),
            symbols.len(),
            start,
            end
        );
        Ok(frame)
    }

    fn describe(&self) -> String {
        "vendor".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{parse_historical, ApiError, HistoricalData, ReferenceData};
    use std::cell::RefCell;

    struct Recording {
        body: &'static str,
        requests: RefCell<Vec<(Vec<String>, NaiveDate, NaiveDate)>>,
    }

    impl QuoteVendor for Recording {
        fn historical_request(
            &self,
            securities: &[&str],
            _fields: &[&str],
            start: NaiveDate,
            end: NaiveDate,
        ) -> std::result::Result<HistoricalData, ApiError> {
            self.requests.borrow_mut().push((
                securities.iter().map(|s| s.to_string()).collect(),
                start,
                end,
            ));
            parse_historical(self.body)
        }

        fn reference_request(&self, _: &[&str], _: &str) -> std::result::Result<ReferenceData, ApiError> {
            Ok(ReferenceData::default())
        }
    }

    const BODY: &str = r#"{"securities": [
        {"security": "AAPL US Equity", "rows": [
            {"date": "20240102", "values": {"PX_LAST": 185.6}},
            {"date": "20240103", "values": {"PX_LAST": 184.3}}
        ]},
        {"security": "SPY US Equity", "rows": [
            {"date": "20240102", "values": {"PX_LAST": 472.6}},
            {"date": "20240103", "values": {"PX_LAST": 468.8}}
        ]}
    ]}"#;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_fetch_defaults_to_trailing_104_weeks() {
        let vendor = Recording { body: BODY, requests: RefCell::new(Vec::new()) };
        let source = VendorSource::new(&vendor, 104).with_today(d(2024, 6, 14));

        let frame = source.fetch("AAPL US Equity", &DateRange::open()).unwrap();
        assert_eq!(frame.column_names(), vec!["AAPL US Equity"]);
        assert_eq!(frame.column("AAPL US Equity").unwrap(), &[185.6, 184.3]);

        let requests = vendor.requests.borrow();
        assert_eq!(requests[0].1, d(2022, 6, 17));
        assert_eq!(requests[0].2, d(2024, 6, 14));
    }

    #[test]
    fn test_fetch_many_uses_request_order() {
        let vendor = Recording { body: BODY, requests: RefCell::new(Vec::new()) };
        let source = VendorSource::new(&vendor, 104).with_today(d(2024, 6, 14));
        let range = DateRange::parse(Some("20240102"), Some("20240103")).unwrap();

        let frame = source.fetch_many(&["SPY US Equity", "AAPL US Equity"], &range).unwrap();
        assert_eq!(frame.column_names(), vec!["SPY US Equity", "AAPL US Equity"]);
        assert_eq!(frame.len(), 2);

        let requests = vendor.requests.borrow();
        assert_eq!(requests[0].0, vec!["SPY US Equity", "AAPL US Equity"]);
        assert_eq!((requests[0].1, requests[0].2), (d(2024, 1, 2), d(2024, 1, 3)));
    }
}
