use crate::constants::{
    DEFAULT_DETAIL_COMPANY, DEFAULT_LOOKBACK_DAYS, GENERIC_ERROR_MESSAGE, MAX_LOOKBACK_DAYS,
    MIN_LOOKBACK_DAYS, PRICE_RANGE_MAX, PRICE_RANGE_MIN,
};
use crate::error::RenderFailure;
use crate::models::{PriceRange, TickerMap};
use crate::server::{AppState, SharedDashboard};
use crate::services::{tidy_to_csv, DashboardRequest, OverviewSection};
use axum::{
    extract::{Json, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::{Query, QueryRejection};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Query parameters shared by the dashboard endpoints
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardQuery {
    /// Lookback window in days (1..=365, default 180)
    pub days: Option<u16>,

    /// Companies to show (can be repeated: company=TOYOTA&company=HONDA).
    /// Absent means every company; a single empty value (`company=`) means none.
    /// Kept as a plain list: an `Option` would read `company=` as absent.
    #[serde(default)]
    pub company: Vec<String>,

    /// Lower bound of the price axis (JPY)
    pub ymin: Option<f64>,

    /// Upper bound of the price axis (JPY)
    pub ymax: Option<f64>,

    /// Company of the detail section (default TOYOTA)
    pub firm: Option<String>,

    /// Response format: json (default); /api/overview also accepts csv
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "json".to_string()
}

fn bad_request(message: String) -> Response {
    warn!(%message, "Rejected request parameters");
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Map a failed render to the generic banner, keeping the cause in the log only
fn render_failure_response(failure: &RenderFailure) -> Response {
    let status = match failure {
        RenderFailure::Fetch(_) => StatusCode::BAD_GATEWAY,
        RenderFailure::Transform(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %failure, status = status.as_u16(), "Render failed");
    (status, Json(serde_json::json!({ "error": GENERIC_ERROR_MESSAGE }))).into_response()
}

/// Unwrap the extracted query, answering malformed values (`days=abc`) with a JSON 400
fn query_params(query: Result<Query<DashboardQuery>, QueryRejection>) -> Result<DashboardQuery, Response> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| bad_request(format!("Invalid query: {}", rejection)))
}

fn require_json(format: &str) -> Result<(), Response> {
    if format != "json" {
        return Err(bad_request(format!("Invalid format {}. Valid values: json", format)));
    }
    Ok(())
}

fn parse_days(days: Option<u16>) -> Result<u16, Response> {
    let days = days.unwrap_or(DEFAULT_LOOKBACK_DAYS);
    if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&days) {
        return Err(bad_request(format!(
            "Invalid days. Expected {}..={}",
            MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS
        )));
    }
    Ok(days)
}

fn parse_range(ymin: Option<f64>, ymax: Option<f64>) -> Result<PriceRange, Response> {
    PriceRange::new(ymin.unwrap_or(PRICE_RANGE_MIN), ymax.unwrap_or(PRICE_RANGE_MAX))
        .map_err(|e| bad_request(e.to_string()))
}

/// Resolve the company selection against the ticker map.
///
/// Empty values are dropped and repeats collapse to their first occurrence,
/// so `company=` alone yields an empty selection.
fn parse_companies(raw: Vec<String>, tickers: &TickerMap) -> Result<Vec<String>, Response> {
    if raw.is_empty() {
        return Ok(tickers.names());
    }

    let mut selected: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !tickers.contains(name) {
            return Err(bad_request(format!("Unknown company: {}", name)));
        }
        if !selected.iter().any(|s| s == name) {
            selected.push(name.to_string());
        }
    }
    Ok(selected)
}

fn parse_firm(firm: Option<String>, tickers: &TickerMap) -> Result<String, Response> {
    let firm = firm
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_DETAIL_COMPANY.to_string());
    if !tickers.contains(&firm) {
        return Err(bad_request(format!("Unknown company: {}", firm)));
    }
    Ok(firm)
}

fn parse_request(params: DashboardQuery, tickers: &TickerMap) -> Result<DashboardRequest, Response> {
    Ok(DashboardRequest {
        days: parse_days(params.days)?,
        companies: parse_companies(params.company, tickers)?,
        range: parse_range(params.ymin, params.ymax)?,
        firm: parse_firm(params.firm, tickers)?,
    })
}

/// GET / - dashboard page
#[instrument(skip(app_state))]
pub async fn index_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let index_path = app_state.public_dir.join("index.html");

    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => {
            debug!("Serving dashboard from {}", index_path.display());
            Html(html).into_response()
        }
        Err(e) => {
            warn!(error = %e, path = %index_path.display(), "Failed to read index.html");
            (
                StatusCode::NOT_FOUND,
                Html("<h1>Dashboard not found</h1><p>Unable to load the dashboard page.</p>"),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
struct CompanyEntry<'a> {
    name: &'a str,
    symbol: &'a str,
}

/// GET /api/companies - ticker map plus widget defaults and ranges
#[instrument(skip(dashboard))]
pub async fn companies_handler(State(dashboard): State<SharedDashboard>) -> impl IntoResponse {
    let tickers = dashboard.tickers();
    let companies: Vec<CompanyEntry> = tickers
        .iter()
        .map(|(name, symbol)| CompanyEntry { name, symbol })
        .collect();

    let body = serde_json::json!({
        "companies": companies,
        "defaults": {
            "days": DEFAULT_LOOKBACK_DAYS,
            "firm": DEFAULT_DETAIL_COMPANY,
            "ymin": PRICE_RANGE_MIN,
            "ymax": PRICE_RANGE_MAX,
        },
        "ranges": {
            "days": [MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS],
            "price": [PRICE_RANGE_MIN, PRICE_RANGE_MAX],
        },
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/dashboard - overview and detail sections in one pass
///
/// Examples:
/// - /api/dashboard (every company, 180 days, TOYOTA detail)
/// - /api/dashboard?days=30&company=TOYOTA&company=HONDA&ymin=1000&ymax=4000
/// - /api/dashboard?company=&firm=NISSAN (empty overview, NISSAN detail)
#[instrument(skip(dashboard))]
pub async fn dashboard_handler(
    State(dashboard): State<SharedDashboard>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> impl IntoResponse {
    let params = match query_params(query) {
        Ok(params) => params,
        Err(response) => return response,
    };
    if let Err(response) = require_json(&params.format) {
        return response;
    }
    let request = match parse_request(params, dashboard.tickers()) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match dashboard.render(&request).await {
        Ok(page) => {
            info!(
                days = page.days,
                companies = request.companies.len(),
                firm = %page.detail.company,
                "Rendered dashboard"
            );
            (StatusCode::OK, Json(page)).into_response()
        }
        Err(failure) => render_failure_response(&failure),
    }
}

/// GET /api/overview - overview section only, JSON or CSV of the tidy table
#[instrument(skip(dashboard))]
pub async fn overview_handler(
    State(dashboard): State<SharedDashboard>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> impl IntoResponse {
    let params = match query_params(query) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let days = match parse_days(params.days) {
        Ok(days) => days,
        Err(response) => return response,
    };
    let companies = match parse_companies(params.company, dashboard.tickers()) {
        Ok(companies) => companies,
        Err(response) => return response,
    };
    let range = match parse_range(params.ymin, params.ymax) {
        Ok(range) => range,
        Err(response) => return response,
    };
    let as_csv = match params.format.as_str() {
        "json" => false,
        "csv" => true,
        other => return bad_request(format!("Invalid format {}. Valid values: json, csv", other)),
    };

    let section = match dashboard.render_overview(days, &companies, &range).await {
        Ok(section) => section,
        Err(failure) => return render_failure_response(&failure),
    };

    if !as_csv {
        return (StatusCode::OK, Json(section)).into_response();
    }

    let rows = match &section {
        OverviewSection::Ready { tidy, .. } => tidy.clone(),
        OverviewSection::SelectionEmpty { .. } => Vec::new(),
    };
    match tidy_to_csv(&rows) {
        Ok(body) => {
            info!(rows = rows.len(), bytes = body.len(), "CSV export");
            let disposition = format!("attachment; filename=\"overview_{}d.csv\"", days);
            let mut response = (StatusCode::OK, body).into_response();
            let headers = response.headers_mut();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8"));
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                headers.insert(CONTENT_DISPOSITION, value);
            }
            response
        }
        Err(e) => {
            error!(error = %e, "CSV export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": GENERIC_ERROR_MESSAGE })),
            )
                .into_response()
        }
    }
}

/// GET /api/detail - detail section for one company
#[instrument(skip(dashboard))]
pub async fn detail_handler(
    State(dashboard): State<SharedDashboard>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> impl IntoResponse {
    let params = match query_params(query) {
        Ok(params) => params,
        Err(response) => return response,
    };
    if let Err(response) = require_json(&params.format) {
        return response;
    }
    let firm = match parse_firm(params.firm, dashboard.tickers()) {
        Ok(firm) => firm,
        Err(response) => return response,
    };
    let range = match parse_range(params.ymin, params.ymax) {
        Ok(range) => range,
        Err(response) => return response,
    };

    match dashboard.render_detail(&firm, &range).await {
        Ok(section) => (StatusCode::OK, Json(section)).into_response(),
        Err(failure) => render_failure_response(&failure),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub cache_entries: usize,
    pub current_system_time: String,
}

/// GET /health - uptime and overview cache size
#[instrument(skip(app_state))]
pub async fn health_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok",
        uptime_secs: app_state.started_at.elapsed().as_secs(),
        cache_entries: app_state.dashboard.overview_fetcher().cache().len().await,
        current_system_time: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(health)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::router;
    use crate::services::test_support::{date, StaticPriceSource};
    use crate::services::{Dashboard, EvictionPolicy, OverviewCache};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn tickers() -> TickerMap {
        TickerMap::new([("TOYOTA", "7203.T"), ("HONDA", "7267.T")]).unwrap()
    }

    fn healthy_source() -> StaticPriceSource {
        let dates = [date(2025, 1, 6), date(2025, 1, 7)];
        StaticPriceSource::new()
            .with_closes("7203.T", &dates, &[2650.0, 2700.0])
            .with_closes("7267.T", &dates, &[1400.0, 1390.0])
    }

    fn app(source: StaticPriceSource) -> (Router, Arc<StaticPriceSource>) {
        app_with_sma_window(source, 5)
    }

    fn app_with_sma_window(source: StaticPriceSource, window: usize) -> (Router, Arc<StaticPriceSource>) {
        let source = Arc::new(source);
        let dashboard = Dashboard::new(
            tickers(),
            source.clone(),
            Arc::new(OverviewCache::new(EvictionPolicy::Never)),
        )
        .with_sma_window(window);
        let public_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public");
        (router(AppState::new(dashboard, public_dir)), source)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_dashboard_defaults() {
        let (app, _) = app(healthy_source());

        let (status, body) = get_json(app, "/api/dashboard?days=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["days"], 2);
        assert_eq!(body["overview"]["status"], "ready");
        assert_eq!(body["overview"]["tidy"].as_array().unwrap().len(), 4);
        assert_eq!(body["overview"]["chart"]["encoding"]["y"]["scale"]["domain"][1], 6000.0);
        assert_eq!(body["detail"]["company"], "TOYOTA");
        assert_eq!(body["detail"]["title"], "TOYOTAの株価グラフ");
    }

    #[tokio::test]
    async fn test_repeated_company_keys() {
        let (app, _) = app(healthy_source());

        let (status, body) = get_json(app, "/api/overview?days=2&company=HONDA&company=HONDA").await;

        assert_eq!(status, StatusCode::OK);
        let tidy = body["tidy"].as_array().unwrap();
        assert_eq!(tidy.len(), 2);
        assert!(tidy.iter().all(|row| row["Name"] == "HONDA"));
    }

    #[tokio::test]
    async fn test_empty_selection() {
        let (app, source) = app(healthy_source());

        let (status, body) = get_json(app, "/api/dashboard?company=&firm=HONDA").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overview"]["status"], "selection_empty");
        assert_eq!(body["overview"]["message"], "少なくとも一社は選んでください。");
        assert_eq!(body["detail"]["company"], "HONDA");
        // only the detail fetch ran
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_rejected() {
        for uri in [
            "/api/dashboard?days=0",
            "/api/dashboard?days=366",
            "/api/dashboard?ymin=3000&ymax=2000",
            "/api/dashboard?ymax=7000",
            "/api/dashboard?company=FERRARI",
            "/api/detail?firm=FERRARI",
            "/api/overview?format=xml",
        ] {
            let (app, source) = app(healthy_source());
            let (status, _) = get(app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(source.calls(), 0, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_generic_banner() {
        let (app, _) = app(healthy_source().failing("7267.T"));

        let (status, body) = get_json(app, "/api/dashboard?days=2").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "おっと！なにかエラーが起きているようです。");
    }

    #[tokio::test]
    async fn test_malformed_query_values_get_json_error() {
        for uri in [
            "/api/dashboard?days=abc",
            "/api/dashboard?days=70000",
            "/api/overview?ymin=low",
            "/api/detail?ymax=NaN-ish",
        ] {
            let (app, source) = app(healthy_source());
            let (status, body) = get(app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            let json: Value = serde_json::from_str(&body).unwrap();
            assert!(json["error"].as_str().unwrap().starts_with("Invalid query"), "{}", uri);
            assert_eq!(source.calls(), 0, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_csv_format_only_on_overview() {
        for uri in ["/api/dashboard?format=csv", "/api/detail?format=csv"] {
            let (app, source) = app(healthy_source());
            let (status, body) = get_json(app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body["error"].is_string());
            assert_eq!(source.calls(), 0, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_transform_failure_shows_generic_banner() {
        // a zero SMA window cannot be computed
        let (app, _) = app_with_sma_window(healthy_source(), 0);

        let (status, body) = get_json(app, "/api/detail?firm=TOYOTA").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "おっと！なにかエラーが起きているようです。");
    }

    #[tokio::test]
    async fn test_overview_csv_export() {
        let (app, _) = app(healthy_source());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/overview?days=2&company=TOYOTA&format=csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/csv; charset=utf-8");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(
            body,
            "Date,Name,Stock Prices(円)\n2025-01-06,TOYOTA,2650.0\n2025-01-07,TOYOTA,2700.0\n"
        );
    }

    #[tokio::test]
    async fn test_detail_endpoint() {
        let (app, _) = app(healthy_source());

        let (status, body) = get_json(app, "/api/detail?firm=HONDA&ymin=1000&ymax=2000").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bars"].as_array().unwrap().len(), 2);
        assert_eq!(body["bars"][1]["sma05"], 1395.0);
        assert_eq!(body["chart"]["encoding"]["y"]["scale"]["domain"][0], 1000.0);
    }

    #[tokio::test]
    async fn test_companies_and_health() {
        let (app, _) = app(healthy_source());
        let (status, body) = get_json(app, "/api/companies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["companies"][0]["name"], "TOYOTA");
        assert_eq!(body["companies"][1]["symbol"], "7267.T");
        assert_eq!(body["defaults"]["days"], 180);

        let (app, _) = self::app(healthy_source());
        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache_entries"], 0);
    }

    #[tokio::test]
    async fn test_index_page() {
        let (app, _) = app(healthy_source());
        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<html"));
        assert!(body.contains("<h1>国内自動車企業の株価可視化アプリ</h1>"));
        assert!(body.contains("こちらは株価可視化ツールです。"));
    }
}
