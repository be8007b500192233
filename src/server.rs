// HTTP shell around `dashboard::render`
// Every request re-renders from the shared context and the query string.

use crate::config::Config;
use crate::dashboard::render;
use crate::data::{DataContext, DataSource};
use crate::data_quality::check;
use crate::error::DashboardError;
use crate::filter::{default_regions, full_range, FilterState, YearRange};
use crate::table::export_csv;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::error;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<DataSource>,
}

impl AppState {
    pub fn new(source: DataSource) -> Self {
        AppState {
            source: Arc::new(source),
        }
    }

    /// State over tables that are already in memory
    pub fn with_context(ctx: DataContext) -> Self {
        AppState::new(DataSource::preloaded(Config::default(), ctx))
    }
}

fn internal_error(e: DashboardError) -> Response {
    error!("request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::err(e.to_string())),
    )
        .into_response()
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Sidebar state as query parameters
///
/// `regions` may repeat, one region per parameter. Absent means the default
/// top-5 selection; a single empty `regions=` means nothing selected.
/// Empty or unparseable `from` / `to` fall back to the data bounds.
#[derive(Debug, Default, PartialEq)]
pub struct DashboardQuery {
    pub regions: Option<Vec<String>>,
    pub from: Option<i32>,
    pub to: Option<i32>,
}

impl DashboardQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = DashboardQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "regions" => {
                    let list = query.regions.get_or_insert_with(Vec::new);
                    let value = value.trim();
                    if !value.is_empty() {
                        list.push(value.to_string());
                    }
                }
                "from" => query.from = parse_year(&value),
                "to" => query.to = parse_year(&value),
                _ => {}
            }
        }
        query
    }

    pub fn to_filter(&self, ctx: &DataContext) -> FilterState {
        let regions = match &self.regions {
            None => default_regions(ctx),
            Some(list) => list.clone(),
        };
        let bounds = full_range(ctx);
        let years = YearRange::new(
            self.from.unwrap_or(bounds.from),
            self.to.unwrap_or(bounds.to),
        );
        FilterState::new(regions, years)
    }
}

fn parse_year(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/dashboard - Full render payload for the given sidebar state
async fn get_dashboard(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let ctx = match state.source.get() {
        Ok(ctx) => ctx,
        Err(e) => return internal_error(e),
    };
    let filter = DashboardQuery::from_pairs(pairs).to_filter(ctx);

    match render(ctx, &filter) {
        Ok(payload) => (StatusCode::OK, Json(ApiResponse::ok(payload))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/quality - Data-contract report
async fn get_quality(State(state): State<AppState>) -> Response {
    match state.source.get() {
        Ok(ctx) => Json(ApiResponse::ok(check(ctx))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/export - Ranking table as a CSV download
async fn get_export(State(state): State<AppState>) -> Response {
    let file = match state.source.get().and_then(|ctx| export_csv(&ctx.ranking)) {
        Ok(file) => file,
        Err(e) => return internal_error(e),
    };
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        file.file_name,
        urlencoding::encode(file.file_name)
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format!("{}; charset=utf-8", file.mime)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/quality", get(get_quality))
        .route("/export", get(get_export))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{rk, small_context};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), disposition)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body, _) = get(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_query_to_filter() {
        let ctx = small_context();

        let absent = DashboardQuery::from_pairs(vec![]).to_filter(&ctx);
        assert_eq!(absent.regions.len(), 2);
        assert_eq!(absent.years, YearRange::new(2023, 2024));

        let empty = DashboardQuery::from_pairs(pairs(&[("regions", "")])).to_filter(&ctx);
        assert!(empty.regions.is_empty());

        let picked = DashboardQuery::from_pairs(pairs(&[
            ("regions", "A"),
            ("regions", " "),
            ("from", "2024"),
            ("to", "2023"),
        ]))
        .to_filter(&ctx);
        assert!(picked.is_selected("A"));
        assert_eq!(picked.regions.len(), 1);
        assert_eq!(picked.years, YearRange::new(2023, 2024));
    }

    #[test]
    fn test_query_blank_years_fall_back_to_bounds() {
        let ctx = small_context();
        let query = DashboardQuery::from_pairs(pairs(&[
            ("regions", "A"),
            ("from", ""),
            ("to", "tahun"),
        ]));
        assert_eq!(query.from, None);
        assert_eq!(query.to, None);
        assert_eq!(query.to_filter(&ctx).years, YearRange::new(2023, 2024));
    }

    #[test]
    fn test_query_keeps_commas_in_region_names() {
        let query = DashboardQuery::from_pairs(pairs(&[
            ("regions", "Kab. Bogor, Barat"),
            ("regions", "Kota Bandung"),
        ]));
        assert_eq!(
            query.regions,
            Some(vec!["Kab. Bogor, Barat".to_string(), "Kota Bandung".to_string()])
        );
    }

    #[tokio::test]
    async fn test_dashboard_blank_year_is_ok() {
        let app = router(AppState::with_context(small_context()));
        let (status, json) = get_json(app, "/api/dashboard?regions=A&from=&to=2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["sidebar"]["selected_years"]["from"], 2023);
        assert_eq!(json["data"]["trend"]["kind"], "chart");
    }

    #[tokio::test]
    async fn test_dashboard_encoded_region_with_comma() {
        let mut ctx = small_context();
        for row in ctx.timeseries.iter_mut().filter(|r| r.region == "B") {
            row.region = "Kab. Bogor, Barat".to_string();
        }
        let app = router(AppState::with_context(ctx));
        let (status, json) =
            get_json(app, "/api/dashboard?regions=Kab.%20Bogor%2C%20Barat").await;
        assert_eq!(status, StatusCode::OK);
        let series = json["data"]["trend"]["series"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["name"], "Kab. Bogor, Barat");
    }

    #[tokio::test]
    async fn test_missing_files_are_500() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(DataSource::new(Config::with_data_dir(dir.path()))));
        let (status, json) = get_json(app, "/api/dashboard").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("data_timeseries_bansos_jabar.csv"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(AppState::with_context(small_context()));
        let (status, json) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn test_dashboard_single_region() {
        let app = router(AppState::with_context(small_context()));
        let (status, json) = get_json(app, "/api/dashboard?regions=A&from=2023&to=2024").await;
        assert_eq!(status, StatusCode::OK);

        let data = &json["data"];
        assert_eq!(data["kpis"]["latest_total"]["raw"], 35.0);
        assert_eq!(data["trend"]["kind"], "chart");
        assert_eq!(data["trend"]["series"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_empty_selection_is_notice() {
        let app = router(AppState::with_context(small_context()));
        let (status, json) = get_json(app, "/api/dashboard?regions=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["trend"]["kind"], "notice");
    }

    #[tokio::test]
    async fn test_dashboard_without_rank_one_is_500() {
        let mut ctx = small_context();
        ctx.ranking = vec![rk("B", 2, 0.5)];
        let app = router(AppState::with_context(ctx));
        let (status, json) = get_json(app, "/api/dashboard").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_export_download() {
        let app = router(AppState::with_context(small_context()));
        let (status, body, disposition) = get(app, "/api/export").await;
        assert_eq!(status, StatusCode::OK);
        assert!(disposition.unwrap().contains("filename=\"Laporan_SPK_Bansos_Jabar.csv\""));
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("Wilayah,Ranking,Skor_TOPSIS"));
    }

    #[tokio::test]
    async fn test_quality_endpoint() {
        let app = router(AppState::with_context(small_context()));
        let (status, json) = get_json(app, "/api/quality").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["issues"].as_array().unwrap().is_empty());
    }
}
