#![allow(dead_code)]

use chrono::NaiveDate;
use histprices::api_client::{parse_historical, parse_reference};
use histprices::{ApiError, HistoricalData, QuoteVendor, ReferenceData};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub securities: Vec<String>,
    pub fields: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Vendor that replays canned bridge responses and records what was asked.
pub struct FakeVendor {
    pub history: String,
    pub reference: String,
    pub requests: Rc<RefCell<Vec<Request>>>,
}

impl FakeVendor {
    pub fn new(history: &str, reference: &str) -> (Self, Rc<RefCell<Vec<Request>>>) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                history: history.to_string(),
                reference: reference.to_string(),
                requests: Rc::clone(&requests),
            },
            requests,
        )
    }
}

impl QuoteVendor for FakeVendor {
    fn historical_request(
        &self,
        securities: &[&str],
        fields: &[&str],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalData, ApiError> {
        self.requests.borrow_mut().push(Request {
            securities: securities.iter().map(|s| s.to_string()).collect(),
            fields: fields.iter().map(|s| s.to_string()).collect(),
            start,
            end,
        });
        parse_historical(&self.history)
    }

    fn reference_request(&self, _securities: &[&str], _field: &str) -> Result<ReferenceData, ApiError> {
        parse_reference(&self.reference)
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}
