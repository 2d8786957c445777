use chrono::NaiveDate;
use tracing::{debug, info};

use crate::api_client::{FieldValue, QuoteVendor, ReferenceData, PX_LAST};
use crate::config::Config;
use crate::dates::{self, most_recent_weekday, DateRange};
use crate::error::{PriceError, Result};
use crate::indicators::calc_indicators_with;
use crate::models::PriceFrame;
use crate::sources::{MemorySource, PriceSource, VendorSource, WorkbookSource};
use crate::state::Capabilities;

/// Earnings announcement date field.
pub const ANNOUNCEMENT_DT: &str = "ANNOUNCEMENT DT";

/// Where [`PriceService::get_prices`] reads prices from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Vendor,
    Workbook,
    Memory(&'a PriceFrame),
}

/// Price retrieval plus indicator calculation.
pub struct PriceService {
    config: Config,
    capabilities: Capabilities,
    workbook: Option<WorkbookSource>,
    today: Option<NaiveDate>,
}

impl PriceService {
    pub fn new(config: Config, capabilities: Capabilities) -> Self {
        Self {
            config,
            capabilities,
            workbook: None,
            today: None,
        }
    }

    pub fn with_workbook(mut self, workbook: WorkbookSource) -> Self {
        self.workbook = Some(workbook);
        self
    }

    /// Pin "today" instead of reading the system date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Read the configured workbook sheet. Later workbook requests reuse the
    /// loaded table until this is called again.
    pub fn load_workbook(&mut self) -> Result<()> {
        let source = WorkbookSource::open(&self.config.workbook_path(), &self.config.sheet)?;
        self.workbook = Some(source);
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(dates::today)
    }

    fn vendor(&self) -> Result<&dyn QuoteVendor> {
        self.capabilities.vendor.vendor()
    }

    fn vendor_source(&self) -> Result<VendorSource<'_>> {
        Ok(VendorSource::new(self.vendor()?, self.config.lookback_weeks).with_today(self.today()))
    }

    fn workbook(&self) -> Result<&WorkbookSource> {
        self.workbook.as_ref().ok_or(PriceError::WorkbookNotLoaded)
    }

    /// Historical prices of `ticker` with the moving average, previous price
    /// and RSI columns attached.
    pub fn get_prices(&self, ticker: &str, range: &DateRange, source: Source<'_>) -> Result<PriceFrame> {
        let mut frame = match source {
            Source::Vendor => self.get_vendor_prices(ticker, range)?,
            Source::Workbook => self.get_workbook_prices(ticker, range)?,
            Source::Memory(table) => MemorySource::new(table).fetch(ticker, range)?,
        };

        calc_indicators_with(&mut frame, ticker, self.config.mavg_days, self.config.rsi_period)?;

        info!("Prepared {} rows of {} from {}", frame.len(), ticker, source_name(&source));
        Ok(frame)
    }

    /// Last prices from the vendor. Open bounds default to the trailing
    /// lookback window ending today.
    pub fn get_vendor_prices(&self, ticker: &str, range: &DateRange) -> Result<PriceFrame> {
        self.vendor_source()?.fetch(ticker, range)
    }

    /// Last prices of several tickers from the vendor, one column each.
    pub fn get_vendor_prices_list(&self, tickers: &[&str], range: &DateRange) -> Result<PriceFrame> {
        self.vendor_source()?.fetch_many(tickers, range)
    }

    /// Prices from the loaded workbook sheet.
    pub fn get_workbook_prices(&self, ticker: &str, range: &DateRange) -> Result<PriceFrame> {
        self.workbook()?.fetch(ticker, range)
    }

    /// Arbitrary historical fields of one security, one column per field.
    /// `PX_LAST` is renamed to the ticker. Open bounds default to the
    /// shorter field-history lookback.
    pub fn get_history(&self, ticker: &str, fields: &[&str], range: &DateRange) -> Result<PriceFrame> {
        let (start, end) = range.resolve(self.today(), self.config.bdh_lookback_weeks)?;
        let data = self.vendor()?.historical_request(&[ticker], fields, start, end)?;

        let mut frame = data.field_frame(ticker, fields);
        frame.rename(PX_LAST, ticker);
        Ok(frame)
    }

    /// Current value of one field for one security.
    pub fn get_reference(&self, ticker: &str, field: &str) -> Result<FieldValue> {
        let data = self.vendor()?.reference_request(&[ticker], field)?;
        data.get(ticker)
            .cloned()
            .ok_or_else(|| PriceError::symbol_not_found(ticker, &format!("reference data for {}", field)))
    }

    /// Current value of one field for several securities.
    pub fn get_reference_list(&self, tickers: &[&str], field: &str) -> Result<ReferenceData> {
        Ok(self.vendor()?.reference_request(tickers, field)?)
    }

    /// Latest close of `ticker`: a single-day request for the most recent
    /// weekday (weekends roll back to Friday).
    pub fn update_last_price(&self, ticker: &str) -> Result<f64> {
        let date = most_recent_weekday(self.today());
        let frame = self.get_vendor_prices(ticker, &DateRange::single_day(date))?;

        frame
            .column(ticker)
            .and_then(|values| values.first().copied())
            .filter(|price| !price.is_nan())
            .ok_or_else(|| PriceError::NoPrice {
                symbol: ticker.to_string(),
                date,
            })
    }

    /// Latest closes of several tickers, as a wide frame of (at most) one row.
    pub fn update_last_prices(&self, tickers: &[&str]) -> Result<PriceFrame> {
        let date = most_recent_weekday(self.today());
        debug!("Updating last prices of {} tickers for {}", tickers.len(), date);
        self.get_vendor_prices_list(tickers, &DateRange::single_day(date))
    }

    /// Earnings announcement dates over the trailing price lookback window,
    /// unique and in the order reported.
    pub fn get_announcement_dates(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        let vendor = self.vendor()?;
        let (start, end) = DateRange::open().resolve(self.today(), self.config.lookback_weeks)?;
        let data = vendor.historical_request(&[ticker], &[ANNOUNCEMENT_DT], start, end)?;

        let mut announcements: Vec<NaiveDate> = Vec::new();
        for (_, value) in data.values(ticker, ANNOUNCEMENT_DT) {
            let date = value
                .as_date()
                .ok_or_else(|| PriceError::InvalidDate(format!("{:?}", value)))?;
            if !announcements.contains(&date) {
                announcements.push(date);
            }
        }
        Ok(announcements)
    }
}

fn source_name(source: &Source<'_>) -> &'static str {
    match source {
        Source::Vendor => "vendor",
        Source::Workbook => "workbook",
        Source::Memory(_) => "memory",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{MAVG_COLUMN, PREV_PRICE_COLUMN, RSI_COLUMN};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn offline() -> PriceService {
        PriceService::new(Config::default(), Capabilities::workbook_only("tests"))
    }

    #[test]
    fn test_get_prices_from_memory_attaches_indicators() {
        let table = PriceFrame::from_series(
            "RY CN",
            vec![(d(2024, 1, 2), 100.0), (d(2024, 1, 3), 102.0), (d(2024, 1, 4), 101.0)],
        );

        let frame = offline()
            .get_prices("RY CN", &DateRange::open(), Source::Memory(&table))
            .unwrap();

        assert_eq!(
            frame.column_names(),
            vec!["RY CN", MAVG_COLUMN, PREV_PRICE_COLUMN, RSI_COLUMN]
        );
    }

    #[test]
    fn test_vendor_calls_fail_without_capability() {
        let service = offline();
        assert!(matches!(
            service.get_prices("AAPL US Equity", &DateRange::open(), Source::Vendor),
            Err(PriceError::VendorUnavailable(_))
        ));
        assert!(matches!(
            service.update_last_price("AAPL US Equity"),
            Err(PriceError::VendorUnavailable(_))
        ));
    }

    #[test]
    fn test_oversized_lookback_is_an_error() {
        let config = Config {
            lookback_weeks: 20_000_000,
            ..Config::default()
        };
        let service = PriceService::new(config, Capabilities::workbook_only("tests")).with_today(d(2024, 6, 14));

        // The missing vendor is reported before the range is looked at
        assert!(matches!(
            service.get_announcement_dates("AAPL US Equity"),
            Err(PriceError::VendorUnavailable(_))
        ));
    }

    #[test]
    fn test_workbook_source_requires_loaded_workbook() {
        assert!(matches!(
            offline().get_prices("RY CN", &DateRange::open(), Source::Workbook),
            Err(PriceError::WorkbookNotLoaded)
        ));
    }

    #[test]
    fn test_workbook_prices_after_loading() {
        let table = PriceFrame::from_series("RY CN", vec![(d(2024, 1, 2), 100.0)]);
        let service = offline().with_workbook(WorkbookSource::from_table("Prices", table));

        let frame = service
            .get_prices("RY CN", &DateRange::open(), Source::Workbook)
            .unwrap();
        assert_eq!(frame.len(), 1);

        let err = service
            .get_prices("RY CN Equity", &DateRange::open(), Source::Workbook)
            .unwrap_err();
        assert!(matches!(err, PriceError::SymbolNotFound { .. }));
    }
}
