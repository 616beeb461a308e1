use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::ProviderError;

/// Yahoo rejects the default reqwest User-Agent, so the client identifies
/// itself as a desktop browser.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// Wire models for the quoteSummary (v10) endpoint. Yahoo wraps every numeric
// field in a detail object like {"raw": 123.4, "fmt": "123.40"}, or an empty
// object {} when no data is available.

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawField {
    pub raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryEnvelope {
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummary {
    #[serde(default)]
    pub result: Vec<QuoteSummaryResult>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    pub price: Option<PriceModule>,
    pub summary_detail: Option<SummaryDetailModule>,
    pub financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub currency: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub market_cap: Option<RawField>,
    pub regular_market_price: Option<RawField>,
    pub regular_market_open: Option<RawField>,
    pub regular_market_day_high: Option<RawField>,
    pub regular_market_day_low: Option<RawField>,
    pub regular_market_previous_close: Option<RawField>,
    pub regular_market_volume: Option<RawField>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetailModule {
    pub open: Option<RawField>,
    pub day_high: Option<RawField>,
    pub day_low: Option<RawField>,
    pub previous_close: Option<RawField>,
    pub volume: Option<RawField>,
    pub market_cap: Option<RawField>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawField>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<RawField>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    pub current_price: Option<RawField>,
    pub financial_currency: Option<String>,
}

// Wire models for the chart (v8) endpoint. Timestamps and closes come back
// as parallel arrays; a close may be null on days with no trade.

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartIndex,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndex {
    pub result: Option<Vec<ChartData>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ChartData {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize, Default)]
pub struct QuoteBlock {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// First present value from an ordered list of field lookups.
///
/// Each entry in the chain is one accessor attempt; a field that is missing
/// entirely or deserialized from an empty `{}` object contributes nothing.
pub fn first_raw(chain: &[Option<&RawField>]) -> Option<f64> {
    chain.iter().copied().flatten().find_map(|field| field.raw)
}

impl QuoteSummaryResult {
    fn price_module(&self) -> Option<&PriceModule> {
        self.price.as_ref()
    }

    fn detail_module(&self) -> Option<&SummaryDetailModule> {
        self.summary_detail.as_ref()
    }

    /// Current price: live trading price, then regular-market price, then
    /// previous close.
    pub fn current_price(&self) -> Option<f64> {
        first_raw(&[
            self.financial_data.as_ref().and_then(|f| f.current_price.as_ref()),
            self.price_module().and_then(|p| p.regular_market_price.as_ref()),
            self.detail_module().and_then(|s| s.previous_close.as_ref()),
            self.price_module().and_then(|p| p.regular_market_previous_close.as_ref()),
        ])
    }

    pub fn open(&self) -> Option<f64> {
        first_raw(&[
            self.price_module().and_then(|p| p.regular_market_open.as_ref()),
            self.detail_module().and_then(|s| s.open.as_ref()),
        ])
    }

    pub fn day_high(&self) -> Option<f64> {
        first_raw(&[
            self.price_module().and_then(|p| p.regular_market_day_high.as_ref()),
            self.detail_module().and_then(|s| s.day_high.as_ref()),
        ])
    }

    pub fn day_low(&self) -> Option<f64> {
        first_raw(&[
            self.price_module().and_then(|p| p.regular_market_day_low.as_ref()),
            self.detail_module().and_then(|s| s.day_low.as_ref()),
        ])
    }

    pub fn previous_close(&self) -> Option<f64> {
        first_raw(&[
            self.detail_module().and_then(|s| s.previous_close.as_ref()),
            self.price_module().and_then(|p| p.regular_market_previous_close.as_ref()),
        ])
    }

    pub fn volume(&self) -> Option<f64> {
        first_raw(&[
            self.detail_module().and_then(|s| s.volume.as_ref()),
            self.price_module().and_then(|p| p.regular_market_volume.as_ref()),
        ])
    }

    pub fn market_cap(&self) -> Option<f64> {
        first_raw(&[
            self.detail_module().and_then(|s| s.market_cap.as_ref()),
            self.price_module().and_then(|p| p.market_cap.as_ref()),
        ])
    }

    /// P/E ratio as reported by the provider, trailing preferred over
    /// forward. Never computed locally.
    pub fn pe_ratio(&self) -> Option<f64> {
        first_raw(&[
            self.detail_module().and_then(|s| s.trailing_pe.as_ref()),
            self.detail_module().and_then(|s| s.forward_pe.as_ref()),
        ])
    }

    /// Display name: long name, then short name.
    pub fn name(&self) -> Option<&str> {
        self.price_module()
            .and_then(|p| p.long_name.as_deref().or(p.short_name.as_deref()))
    }

    pub fn currency(&self) -> Option<&str> {
        self.price_module()
            .and_then(|p| p.currency.as_deref())
            .or_else(|| self.financial_data.as_ref().and_then(|f| f.financial_currency.as_deref()))
    }
}

/// Fetches the quote modules for a ticker from the quoteSummary endpoint.
///
/// # Parameters
/// - `client`: HTTP client.
/// - `config`: Service configuration holding the endpoint base URL.
/// - `ticker`: Instrument symbol, passed through as given.
///
pub async fn fetch_quote_summary(
    client: &Client,
    config: &AppConfig,
    ticker: &str,
) -> Result<QuoteSummaryResult, ProviderError> {
    let url: String = format!(
        "{}/{}?modules=price,summaryDetail,financialData",
        config.quote_base, ticker
    );

    let body: String = get_text(client, &url).await?;
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(&body)?;

    debug!("quoteSummary fetched for {}", ticker);

    // An empty result list behaves like a quote with every field absent.
    Ok(envelope
        .quote_summary
        .result
        .into_iter()
        .next()
        .unwrap_or_default())
}

/// Fetches daily history for a ticker over a lookback period.
///
/// # Parameters
/// - `client`: HTTP client.
/// - `config`: Service configuration holding the endpoint base URL.
/// - `ticker`: Instrument symbol.
/// - `period`: Lookback window (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y,
///   ytd, max), passed through to the provider verbatim.
///
pub async fn fetch_chart(
    client: &Client,
    config: &AppConfig,
    ticker: &str,
    period: &str,
) -> Result<ChartData, ProviderError> {
    let url: String = format!(
        "{}/{}?range={}&interval=1d",
        config.chart_base, ticker, period
    );

    let body: String = get_text(client, &url).await?;
    let envelope: ChartEnvelope = serde_json::from_str(&body)?;

    debug!("chart fetched for {} over {}", ticker, period);

    Ok(envelope
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or_default())
}

async fn get_text(client: &Client, url: &str) -> Result<String, ProviderError> {
    let response: reqwest::Response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status()));
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_summary_json() -> serde_json::Value {
        serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "currency": "USD",
                        "longName": "Apple Inc.",
                        "shortName": "Apple",
                        "regularMarketPrice": {"raw": 180.50, "fmt": "180.50"},
                        "regularMarketOpen": {"raw": 178.00, "fmt": "178.00"},
                        "regularMarketDayHigh": {"raw": 181.25, "fmt": "181.25"},
                        "regularMarketDayLow": {"raw": 177.10, "fmt": "177.10"},
                        "regularMarketPreviousClose": {"raw": 175.00, "fmt": "175.00"},
                        "regularMarketVolume": {"raw": 51230000.0, "fmt": "51.23M"}
                    },
                    "summaryDetail": {
                        "previousClose": {"raw": 175.00, "fmt": "175.00"},
                        "volume": {"raw": 51230000.0, "fmt": "51.23M"},
                        "marketCap": {"raw": 2800000000000.0, "fmt": "2.8T"},
                        "trailingPE": {"raw": 29.5, "fmt": "29.50"}
                    },
                    "financialData": {
                        "currentPrice": {"raw": 180.75, "fmt": "180.75"},
                        "financialCurrency": "USD"
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn first_raw_takes_first_present_value() {
        let a = RawField { raw: Some(1.0) };
        let b = RawField { raw: Some(2.0) };
        assert_eq!(first_raw(&[None, Some(&a), Some(&b)]), Some(1.0));
    }

    #[test]
    fn first_raw_skips_empty_detail_objects() {
        // Yahoo sends {} for fields with no data; raw deserializes to None.
        let empty = RawField { raw: None };
        let b = RawField { raw: Some(2.0) };
        assert_eq!(first_raw(&[Some(&empty), Some(&b)]), Some(2.0));
    }

    #[test]
    fn first_raw_all_absent_is_none() {
        assert_eq!(first_raw(&[None, None]), None);
    }

    #[test]
    fn summary_deserializes_and_prefers_live_price() {
        let envelope: QuoteSummaryEnvelope =
            serde_json::from_value(sample_summary_json()).unwrap();
        let result = envelope.quote_summary.result.into_iter().next().unwrap();

        // financialData.currentPrice wins over price.regularMarketPrice
        assert_eq!(result.current_price(), Some(180.75));
        assert_eq!(result.previous_close(), Some(175.00));
        assert_eq!(result.pe_ratio(), Some(29.5));
        assert_eq!(result.market_cap(), Some(2_800_000_000_000.0));
        assert_eq!(result.name(), Some("Apple Inc."));
        assert_eq!(result.currency(), Some("USD"));
    }

    #[test]
    fn price_falls_back_through_the_chain() {
        let json = serde_json::json!({
            "price": {"regularMarketPrice": {}, "regularMarketPreviousClose": {"raw": 99.0}},
            "summaryDetail": {}
        });
        let result: QuoteSummaryResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.current_price(), Some(99.0));
    }

    #[test]
    fn missing_modules_yield_no_price() {
        let result = QuoteSummaryResult::default();
        assert_eq!(result.current_price(), None);
        assert_eq!(result.volume(), None);
        assert_eq!(result.name(), None);
    }

    #[test]
    fn chart_envelope_deserializes_parallel_arrays() {
        let json = serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [1704067200, 1704153600],
                    "indicators": {"quote": [{"close": [100.0, null]}]}
                }],
                "error": null
            }
        });
        let envelope: ChartEnvelope = serde_json::from_value(json).unwrap();
        let data = envelope.chart.result.unwrap().into_iter().next().unwrap();
        assert_eq!(data.timestamp.len(), 2);
        assert_eq!(data.indicators.quote[0].close, vec![Some(100.0), None]);
    }

    #[tokio::test]
    async fn fetch_quote_summary_hits_modules_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/AAPL"))
            .and(query_param("modules", "price,summaryDetail,financialData"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_summary_json()))
            .mount(&server)
            .await;

        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            quote_base: server.uri(),
            chart_base: server.uri(),
        };
        let client = Client::new();

        let result = fetch_quote_summary(&client, &config, "AAPL").await.unwrap();
        assert_eq!(result.current_price(), Some(180.75));
    }

    #[tokio::test]
    async fn fetch_quote_summary_empty_result_has_no_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "quoteSummary": {"result": [], "error": null}
            })))
            .mount(&server)
            .await;

        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            quote_base: server.uri(),
            chart_base: server.uri(),
        };
        let client = Client::new();

        let result = fetch_quote_summary(&client, &config, "ZZZZ").await.unwrap();
        assert_eq!(result.current_price(), None);
    }

    #[tokio::test]
    async fn fetch_chart_passes_period_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/AAPL"))
            .and(query_param("range", "7d"))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {
                    "result": [{
                        "timestamp": [1704067200],
                        "indicators": {"quote": [{"close": [101.5]}]}
                    }],
                    "error": null
                }
            })))
            .mount(&server)
            .await;

        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            quote_base: server.uri(),
            chart_base: server.uri(),
        };
        let client = Client::new();

        let data = fetch_chart(&client, &config, "AAPL", "7d").await.unwrap();
        assert_eq!(data.indicators.quote[0].close, vec![Some(101.5)]);
    }

    #[tokio::test]
    async fn provider_error_status_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            quote_base: server.uri(),
            chart_base: server.uri(),
        };
        let client = Client::new();

        let err = fetch_quote_summary(&client, &config, "AAPL").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(_)));
    }
}
