use actix_web::{get, web, HttpResponse, Responder};
use log::{error, info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::models::{ChartResponse, DetailedQuoteResponse, PriceResponse};
use crate::yahoo;

#[derive(Deserialize)]
pub struct TickerQuery {
    pub ticker: String,
}

#[derive(Deserialize)]
pub struct ChartQuery {
    pub ticker: String,
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_period() -> String {
    "7d".to_string()
}

/// Current price for a single instrument.
#[get("/api/market/price")]
pub async fn get_price(
    query: web::Query<TickerQuery>,
    client: web::Data<Client>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let ticker: &str = &query.ticker;
    info!("Price request received for ticker: {}", ticker);

    let summary = yahoo::fetch_quote_summary(&client, &config, ticker)
        .await
        .map_err(|err| {
            error!("Error fetching price for {}: {}", ticker, err);
            ApiError::Upstream(format!(
                "Failed to fetch price data for '{}': {}",
                ticker, err
            ))
        })?;

    let response: PriceResponse =
        PriceResponse::from_summary(ticker, &summary).ok_or_else(|| {
            warn!("No price data found for ticker: {}", ticker);
            ApiError::NotFound(format!("Price data for '{}' not available.", ticker))
        })?;

    info!(
        "Price fetched for {}: {} {}",
        ticker, response.price, response.currency
    );

    Ok(HttpResponse::Ok().json(response))
}

/// Historical daily closes over a lookback period (default "7d").
#[get("/api/market/chart")]
pub async fn get_chart(
    query: web::Query<ChartQuery>,
    client: web::Data<Client>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let ticker: &str = &query.ticker;
    let period: &str = &query.period;
    info!(
        "Chart request received for ticker: {}, period: {}",
        ticker, period
    );

    let data = yahoo::fetch_chart(&client, &config, ticker, period)
        .await
        .map_err(|err| {
            error!("Error fetching chart for {}: {}", ticker, err);
            ApiError::Upstream(format!(
                "Failed to fetch chart data for '{}': {}",
                ticker, err
            ))
        })?;

    let response: ChartResponse = ChartResponse::from_history(ticker, &data);

    if response.history.is_empty() {
        warn!("No historical data found for ticker: {}", ticker);
        return Err(ApiError::NotFound(format!(
            "Chart data for '{}' not available.",
            ticker
        )));
    }

    info!(
        "Chart data fetched for {}: {} data points",
        ticker,
        response.history.len()
    );

    Ok(HttpResponse::Ok().json(response))
}

/// HTS-style detailed quote: session prices, volume, market cap, P/E.
#[get("/api/market/quote")]
pub async fn get_quote(
    query: web::Query<TickerQuery>,
    client: web::Data<Client>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let ticker: &str = &query.ticker;
    info!("Detailed quote request received for ticker: {}", ticker);

    let summary = yahoo::fetch_quote_summary(&client, &config, ticker)
        .await
        .map_err(|err| {
            error!("Error fetching detailed quote for {}: {}", ticker, err);
            ApiError::Upstream(format!(
                "Failed to fetch detailed quote for '{}': {}",
                ticker, err
            ))
        })?;

    let response: DetailedQuoteResponse = DetailedQuoteResponse::from_summary(ticker, &summary)
        .ok_or_else(|| {
            warn!("No quote data found for ticker: {}", ticker);
            ApiError::NotFound(format!("Quote data for '{}' not available.", ticker))
        })?;

    info!(
        "Detailed quote fetched for {}: {} {}",
        ticker, response.current_price, response.currency
    );

    Ok(HttpResponse::Ok().json(response))
}

/// Service liveness; never touches the provider.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "market-data-svc",
    }))
}
