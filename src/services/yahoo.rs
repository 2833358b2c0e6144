use crate::constants::PRICE_SOURCE_TIMEOUT_SECS;
use crate::error::SourceError;
use crate::models::{dedup_by_date, PriceBar, PriceHistory, PriceWindow};
use crate::services::price_source::PriceSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Price source backed by the Yahoo Finance v8 chart endpoint
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Endpoint root, e.g. "https://query2.finance.yahoo.com"
    pub fn new(base_url: String) -> Result<Self, SourceError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SourceError::InvalidResponse(format!(
                "Invalid base_url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(StdDuration::from_secs(PRICE_SOURCE_TIMEOUT_SECS))
            .build()?;

        info!("Created YahooClient: base_url='{}'", base_url);

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query string for a window, relative to `now`
    fn window_query(window: &PriceWindow, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
        match window {
            PriceWindow::Days(days) => {
                let start = now - ChronoDuration::days(i64::from(*days));
                vec![
                    ("period1", start.timestamp().to_string()),
                    ("period2", now.timestamp().to_string()),
                    ("interval", window.interval().as_query_value().to_string()),
                ]
            }
            PriceWindow::Period { period, interval } => vec![
                ("range", period.as_query_value()),
                ("interval", interval.as_query_value().to_string()),
            ],
        }
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    #[instrument(skip(self, window), fields(window = %window))]
    async fn history(&self, symbol: &str, window: &PriceWindow) -> Result<PriceHistory, SourceError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let query = Self::window_query(window, Utc::now());

        debug!("Fetching chart: url={}, query={:?}", url, query);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Unknown symbols come back as 404 with a chart.error payload
            if let Ok(json) = serde_json::from_str::<Value>(&text) {
                if let Some(message) = chart_error_message(&json) {
                    warn!(symbol, status = status.as_u16(), "Chart endpoint rejected symbol: {}", message);
                    return Err(SourceError::Symbol {
                        symbol: symbol.to_string(),
                        message,
                    });
                }
            }
            warn!(symbol, status = status.as_u16(), "Chart endpoint returned error status");
            return Err(SourceError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| SourceError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        let bars = parse_chart_response(symbol, &json)?;
        info!(symbol, bars = bars.len(), "Fetched price history");
        Ok(bars)
    }
}

/// Description of a `chart.error` object, if one is present
fn chart_error_message(json: &Value) -> Option<String> {
    let error = json.get("chart")?.get("error")?;
    if error.is_null() {
        return None;
    }
    let message = error
        .get("description")
        .and_then(Value::as_str)
        .or_else(|| error.get("code").and_then(Value::as_str))
        .unwrap_or("unknown chart error");
    Some(message.to_string())
}

/// Parse a v8 chart payload into daily bars.
///
/// Rows with a null close (halted or not yet settled) are skipped. A result
/// without timestamps means no trades in range and yields an empty history.
/// Bars falling on the same exchange-local date collapse to the last one.
pub fn parse_chart_response(symbol: &str, json: &Value) -> Result<PriceHistory, SourceError> {
    if json.get("chart").is_none() {
        return Err(SourceError::InvalidResponse("Missing key: chart".to_string()));
    }
    if let Some(message) = chart_error_message(json) {
        return Err(SourceError::Symbol {
            symbol: symbol.to_string(),
            message,
        });
    }

    let result = json["chart"]["result"]
        .as_array()
        .and_then(|r| r.first())
        .ok_or_else(|| SourceError::InvalidResponse("Empty chart.result".to_string()))?;

    let timestamps = match result.get("timestamp").and_then(Value::as_array) {
        Some(ts) => ts,
        None => return Ok(Vec::new()),
    };

    let quote = &result["indicators"]["quote"][0];
    let opens = quote_column(quote, "open")?;
    let highs = quote_column(quote, "high")?;
    let lows = quote_column(quote, "low")?;
    let closes = quote_column(quote, "close")?;
    let volumes = quote_column(quote, "volume")?;

    let length = timestamps.len();
    if [opens.len(), highs.len(), lows.len(), closes.len(), volumes.len()]
        .iter()
        .any(|&len| len != length)
    {
        return Err(SourceError::InvalidResponse("Inconsistent array lengths".to_string()));
    }

    let to_date = exchange_date_fn(&result["meta"]);

    let mut bars = Vec::with_capacity(length);
    for i in 0..length {
        let close = match closes[i].as_f64() {
            Some(c) => c,
            None => continue,
        };
        let timestamp = timestamps[i].as_i64().ok_or_else(|| {
            SourceError::InvalidResponse(format!("Invalid timestamp at index {}: {:?}", i, &timestamps[i]))
        })?;
        let time = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
            SourceError::InvalidResponse(format!("Cannot convert timestamp {} at index {}", timestamp, i))
        })?;

        bars.push(PriceBar::new(
            to_date(time),
            opens[i].as_f64().unwrap_or(close),
            highs[i].as_f64().unwrap_or(close),
            lows[i].as_f64().unwrap_or(close),
            close,
            volumes[i].as_u64().unwrap_or(0),
        ));
    }

    Ok(dedup_by_date(bars))
}

fn quote_column<'a>(quote: &'a Value, key: &str) -> Result<&'a Vec<Value>, SourceError> {
    quote
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::InvalidResponse(format!("Missing key: {}", key)))
}

/// Converter from a bar timestamp to the exchange-local trading date
fn exchange_date_fn(meta: &Value) -> Box<dyn Fn(DateTime<Utc>) -> NaiveDate> {
    if let Some(tz) = meta
        .get("exchangeTimezoneName")
        .and_then(Value::as_str)
        .and_then(|name| name.parse::<Tz>().ok())
    {
        return Box::new(move |time| time.with_timezone(&tz).date_naive());
    }

    if let Some(offset) = meta
        .get("gmtoffset")
        .and_then(Value::as_i64)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
    {
        return Box::new(move |time| time.with_timezone(&offset).date_naive());
    }

    Box::new(|time| time.date_naive())
}
