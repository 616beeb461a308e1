use chrono::{SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::yahoo::{ChartData, QuoteSummaryResult};

// Response shapes returned to clients

/// Current price for a single instrument.
#[derive(Serialize, Debug)]
pub struct PriceResponse {
    pub ticker: String,
    pub price: f64,
    pub currency: String,
    pub last_updated: String,
}

/// One trading day on the chart.
#[derive(Serialize, Debug, PartialEq)]
pub struct ChartPoint {
    pub date: String,
    pub price: f64,
}

/// Daily closes over the requested period, in provider order.
#[derive(Serialize, Debug)]
pub struct ChartResponse {
    pub ticker: String,
    pub history: Vec<ChartPoint>,
}

/// HTS-style detailed quote: session prices, volume, valuation figures.
#[derive(Serialize, Debug)]
pub struct DetailedQuoteResponse {
    pub ticker: String,
    pub name: String,
    pub current_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub previous_close: f64,
    pub volume: i64,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub change: f64,
    pub change_percent: f64,
    pub currency: String,
    pub last_updated: String,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl PriceResponse {
    /// Builds the price payload, or `None` when no price field is obtainable.
    pub fn from_summary(ticker: &str, summary: &QuoteSummaryResult) -> Option<Self> {
        let price: f64 = summary.current_price()?;

        Some(PriceResponse {
            ticker: ticker.to_uppercase(),
            price,
            currency: summary.currency().unwrap_or("USD").to_string(),
            last_updated: now_iso(),
        })
    }
}

impl ChartResponse {
    /// Maps provider history onto chart points, keeping provider order and
    /// skipping days without a close.
    pub fn from_history(ticker: &str, data: &ChartData) -> Self {
        let closes: &[Option<f64>] = data
            .indicators
            .quote
            .first()
            .map(|block| block.close.as_slice())
            .unwrap_or(&[]);

        let history: Vec<ChartPoint> = data
            .timestamp
            .iter()
            .zip(closes)
            .filter_map(|(timestamp, close)| {
                let price: f64 = (*close)?;
                let date: String = Utc
                    .timestamp_opt(*timestamp, 0)
                    .single()?
                    .format("%Y-%m-%d")
                    .to_string();
                Some(ChartPoint { date, price })
            })
            .collect();

        ChartResponse {
            ticker: ticker.to_uppercase(),
            history,
        }
    }
}

impl DetailedQuoteResponse {
    /// Builds the detailed quote, or `None` when no current price is
    /// obtainable. Session fields missing upstream fall back to the current
    /// price; valuation figures stay null when the provider omits them.
    pub fn from_summary(ticker: &str, summary: &QuoteSummaryResult) -> Option<Self> {
        let current_price: f64 = summary.current_price()?;

        let open_price: f64 = summary.open().unwrap_or(current_price);
        let high_price: f64 = summary.day_high().unwrap_or(current_price);
        let low_price: f64 = summary.day_low().unwrap_or(current_price);
        let previous_close: f64 = summary.previous_close().unwrap_or(current_price);
        let volume: i64 = summary.volume().unwrap_or(0.0) as i64;

        let change: f64 = current_price - previous_close;
        let change_percent: f64 = if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Some(DetailedQuoteResponse {
            ticker: ticker.to_uppercase(),
            name: summary.name().unwrap_or(ticker).to_string(),
            current_price,
            open_price,
            high_price,
            low_price,
            previous_close,
            volume,
            market_cap: summary.market_cap(),
            pe_ratio: summary.pe_ratio(),
            change,
            change_percent,
            currency: summary.currency().unwrap_or("USD").to_string(),
            last_updated: now_iso(),
        })
    }
}
