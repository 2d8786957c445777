mod common;

use common::{d, FakeVendor};
use histprices::{Capabilities, Config, DateRange, FieldValue, PriceError, PriceService, Source, VendorCapability};

const HISTORY: &str = r#"{"securities": [
    {"security": "AAPL US Equity", "rows": [
        {"date": "20240610", "values": {"PX_LAST": 193.1, "ANNOUNCEMENT DT": "20240502"}},
        {"date": "20240611", "values": {"PX_LAST": 207.2, "ANNOUNCEMENT DT": "20240502"}},
        {"date": "20240612", "values": {"PX_LAST": 213.1, "ANNOUNCEMENT DT": "20240502"}},
        {"date": "20240613", "values": {"PX_LAST": 214.2, "ANNOUNCEMENT DT": 20240801}},
        {"date": "20240614", "values": {"PX_LAST": 212.5, "ANNOUNCEMENT DT": "20240801"}}
    ]},
    {"security": "SPY US Equity", "rows": [
        {"date": "20240610", "values": {"PX_LAST": 535.7}},
        {"date": "20240611", "values": {"PX_LAST": 536.9}},
        {"date": "20240612", "values": {"PX_LAST": 541.4}},
        {"date": "20240613", "values": {"PX_LAST": 542.5}},
        {"date": "20240614", "values": {"PX_LAST": 542.8}}
    ]}
]}"#;

const REFERENCE: &str = r#"{"values": [
    {"security": "AAPL US Equity", "value": 212.49},
    {"security": "SPY US Equity", "value": 542.78}
]}"#;

fn service(today: chrono::NaiveDate) -> (PriceService, std::rc::Rc<std::cell::RefCell<Vec<common::Request>>>) {
    let (vendor, requests) = FakeVendor::new(HISTORY, REFERENCE);
    let capabilities = Capabilities {
        vendor: VendorCapability::Available(Box::new(vendor)),
    };
    (
        PriceService::new(Config::default(), capabilities).with_today(today),
        requests,
    )
}

#[test]
fn vendor_prices_get_indicators() {
    let (service, requests) = service(d(2024, 6, 14));

    let frame = service
        .get_prices("AAPL US Equity", &DateRange::open(), Source::Vendor)
        .unwrap();

    assert_eq!(
        frame.column_names(),
        vec!["AAPL US Equity", "mavg_200d", "prev_pr", "rsi"]
    );
    assert_eq!(frame.len(), 5);

    let request = &requests.borrow()[0];
    assert_eq!(request.fields, vec!["PX_LAST"]);
    assert_eq!(request.start, d(2022, 6, 17));
    assert_eq!(request.end, d(2024, 6, 14));
}

#[test]
fn batch_prices_keep_requested_columns_and_range() {
    let (service, requests) = service(d(2024, 6, 14));
    let range = DateRange::parse(Some("20240610"), Some("20240614")).unwrap();

    let frame = service
        .get_vendor_prices_list(&["SPY US Equity", "AAPL US Equity"], &range)
        .unwrap();

    assert_eq!(frame.column_names(), vec!["SPY US Equity", "AAPL US Equity"]);
    assert_eq!(frame.index().first(), Some(&d(2024, 6, 10)));
    assert_eq!(frame.index().last(), Some(&d(2024, 6, 14)));
    for column in frame.columns() {
        assert!(column.values.iter().all(|v| !v.is_nan()), "{} has gaps", column.name);
    }

    let request = &requests.borrow()[0];
    assert_eq!((request.start, request.end), (d(2024, 6, 10), d(2024, 6, 14)));
}

#[test]
fn reversed_range_is_rejected_before_any_request() {
    assert!(DateRange::parse(Some("20240614"), Some("20240610")).is_err());
}

#[test]
fn history_defaults_to_52_weeks_and_renames_last_price() {
    let (service, requests) = service(d(2024, 6, 14));

    let frame = service
        .get_history("AAPL US Equity", &["PX_LAST", "ANNOUNCEMENT DT"], &DateRange::open())
        .unwrap();

    assert_eq!(frame.column_names(), vec!["AAPL US Equity", "ANNOUNCEMENT DT"]);
    assert_eq!(requests.borrow()[0].start, d(2023, 6, 16));
}

#[test]
fn last_price_on_a_weekend_asks_for_friday() {
    // 2024-06-16 is a Sunday
    let (service, requests) = service(d(2024, 6, 16));

    let price = service.update_last_price("AAPL US Equity").unwrap();
    // The fake replays the whole history; the first row is the value read
    assert_eq!(price, 193.1);

    let request = &requests.borrow()[0];
    assert_eq!((request.start, request.end), (d(2024, 6, 14), d(2024, 6, 14)));
}

#[test]
fn last_prices_for_several_tickers() {
    let (service, requests) = service(d(2024, 6, 12));

    let frame = service
        .update_last_prices(&["AAPL US Equity", "SPY US Equity"])
        .unwrap();
    assert_eq!(frame.column_names(), vec!["AAPL US Equity", "SPY US Equity"]);

    let request = &requests.borrow()[0];
    assert_eq!((request.start, request.end), (d(2024, 6, 12), d(2024, 6, 12)));
}

#[test]
fn reference_values() {
    let (service, _) = service(d(2024, 6, 14));

    let value = service.get_reference("AAPL US Equity", "PX_LAST").unwrap();
    assert_eq!(value, FieldValue::Number(212.49));

    let list = service
        .get_reference_list(&["AAPL US Equity", "SPY US Equity"], "PX_LAST")
        .unwrap();
    assert_eq!(list.values.len(), 2);

    let missing = service.get_reference("MSFT US Equity", "PX_LAST").unwrap_err();
    assert_eq!(
        missing.to_string(),
        "symbol 'MSFT US Equity' not found in reference data for PX_LAST"
    );
}

#[test]
fn announcement_dates_are_unique() {
    let (service, requests) = service(d(2024, 6, 14));

    let dates = service.get_announcement_dates("AAPL US Equity").unwrap();
    assert_eq!(dates, vec![d(2024, 5, 2), d(2024, 8, 1)]);

    let request = &requests.borrow()[0];
    assert_eq!(request.fields, vec!["ANNOUNCEMENT DT"]);
    assert_eq!(request.start, d(2022, 6, 17));
}

#[test]
fn beta_against_market_from_batch_fetch() {
    let (service, _) = service(d(2024, 6, 14));
    let range = DateRange::parse(Some("20240610"), Some("20240614")).unwrap();

    let frame = service
        .get_vendor_prices_list(&["AAPL US Equity", "SPY US Equity"], &range)
        .unwrap();
    let fit = histprices::calc_beta(&frame, "AAPL US Equity").unwrap();

    assert_eq!(fit.observations, 4);
    assert!(fit.beta.is_finite());
}

#[test]
fn lookback_beyond_the_calendar_fails_without_a_request() {
    let (vendor, requests) = FakeVendor::new(HISTORY, REFERENCE);
    let config = Config {
        lookback_weeks: 20_000_000,
        ..Config::default()
    };
    let capabilities = Capabilities {
        vendor: VendorCapability::Available(Box::new(vendor)),
    };
    let service = PriceService::new(config, capabilities).with_today(d(2024, 6, 14));

    assert!(matches!(
        service.get_announcement_dates("AAPL US Equity"),
        Err(PriceError::InvalidLookback { .. })
    ));
    assert!(matches!(
        service.get_prices("AAPL US Equity", &DateRange::open(), Source::Vendor),
        Err(PriceError::InvalidLookback { .. })
    ));
    assert!(requests.borrow().is_empty());
}
