use std::env;

const QUOTE_BASE: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Origins allowed to call this service from a browser.
pub const ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:8080",
    "http://127.0.0.1:8080",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Service configuration, resolved once at startup and read-only afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub quote_base: String,
    pub chart_base: String,
}

impl AppConfig {
    /// Reads configuration from environment variables, falling back to
    /// the defaults for local development.
    pub fn from_env() -> Self {
        let host: String = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8000);

        AppConfig {
            host,
            port,
            quote_base: env::var("YAHOO_QUOTE_URL").unwrap_or_else(|_| QUOTE_BASE.to_string()),
            chart_base: env::var("YAHOO_CHART_URL").unwrap_or_else(|_| CHART_BASE.to_string()),
        }
    }
}
