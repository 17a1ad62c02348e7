use crate::server::AppState;
use crate::utils::{parse_date_label, today_label};
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// Query parameters for /api/mentions and /api/merge
#[derive(Debug, Deserialize, Default)]
pub struct DateQuery {
    /// Day label (YYYY-MM-DD), defaults to today's UTC day
    pub date: Option<String>,
}

/// Query parameters for /api/history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub ticker: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mention_rows: i64,
    pub price_rows: i64,
    pub unique_tickers: i64,
    pub latest_date: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn internal_error(e: sqlx::Error) -> Response {
    error!(error = %e, "Database query failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database query failed")
}

/// Normalise the `date` query parameter
pub(crate) fn resolve_date(date: Option<&str>) -> Result<String, Response> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(today_label()),
        Some(raw) => parse_date_label(raw)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .ok_or_else(|| {
                error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid date format. Expected YYYY-MM-DD",
                )
            }),
    }
}

/// GET /api/mentions - mention rows of one day, most mentioned first
///
/// Examples:
/// - /api/mentions (today's UTC day)
/// - /api/mentions?date=2024-05-02
#[instrument(skip(state))]
pub async fn mentions_handler(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> Response {
    let date = match resolve_date(params.date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };

    match state.store.read_mentions(&date).await {
        Ok(rows) => {
            debug!(date = %date, rows = rows.len(), "Serving mentions");
            Json(rows).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// GET /api/merge - mentions of one day joined with closes and 1-day returns
#[instrument(skip(state))]
pub async fn merge_handler(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> Response {
    let date = match resolve_date(params.date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };

    match state.store.read_join(&date).await {
        Ok(rows) => {
            debug!(date = %date, rows = rows.len(), "Serving merged rows");
            Json(rows).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// GET /api/history - every stored day of one ticker, oldest first
#[instrument(skip(state))]
pub async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let ticker = params.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "ticker must not be empty");
    }

    match state.store.read_ticker_history(&ticker).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let stats = match state.store.stats().await {
        Ok(stats) => stats,
        Err(e) => return internal_error(e),
    };

    Json(HealthResponse {
        status: "ok",
        mention_rows: stats.mention_rows,
        price_rows: stats.price_rows,
        unique_tickers: stats.unique_tickers,
        latest_date: stats.date_range.map(|(_, max)| max),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MentionRecord, PriceRecord};
    use crate::services::MentionStore;
    use serde_json::Value;
    use tempfile::tempdir;

    async fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempdir().unwrap();
        let store = MentionStore::new(dir.path().join("api.sqlite")).await.unwrap();

        store
            .upsert_mentions(&[
                MentionRecord::new("2024-05-02", "NVDA", 7).with_title(Some("NVIDIA CORP".into())),
                MentionRecord::new("2024-05-02", "GME", 12),
                MentionRecord::new("2024-05-01", "NVDA", 3),
            ])
            .await
            .unwrap();
        store
            .upsert_prices(&[PriceRecord {
                date: "2024-05-02".into(),
                ticker: "NVDA".into(),
                close: 858.17,
                ret1d: Some(3.33),
            }])
            .await
            .unwrap();

        (dir, AppState { store })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn date(d: &str) -> Query<DateQuery> {
        Query(DateQuery { date: Some(d.to_string()) })
    }

    #[tokio::test]
    async fn test_mentions_sorted_by_count() {
        let (_dir, state) = state().await;

        let response = mentions_handler(State(state), date("2024-05-02")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json[0]["ticker"], "GME");
        assert_eq!(json[0]["mentions"], 12);
        assert_eq!(json[1]["title"], "NVIDIA CORP");
    }

    #[tokio::test]
    async fn test_merge_left_join() {
        let (_dir, state) = state().await;

        let json = body_json(merge_handler(State(state), date("2024-05-02")).await).await;

        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["ticker"], "GME");
        assert!(json[0]["close"].is_null());
        assert_eq!(json[1]["close"], 858.17);
        assert_eq!(json[1]["ret1d"], 3.33);
    }

    #[tokio::test]
    async fn test_invalid_date_is_bad_request() {
        let (_dir, state) = state().await;

        let response = merge_handler(State(state), date("05/02/2024")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_date_is_empty() {
        let (_dir, state) = state().await;

        let json = body_json(mentions_handler(State(state), date("2023-01-01")).await).await;
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_history_and_health() {
        let (_dir, state) = state().await;

        let history = history_handler(
            State(state.clone()),
            Query(HistoryQuery { ticker: "nvda".into() }),
        )
        .await;
        let json = body_json(history).await;
        assert_eq!(json[0]["date"], "2024-05-01");
        assert_eq!(json[1]["date"], "2024-05-02");

        let health = body_json(health_handler(State(state)).await).await;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["mention_rows"], 3);
        assert_eq!(health["latest_date"], "2024-05-02");
    }

    #[test]
    fn test_resolve_date_defaults_to_today() {
        assert_eq!(resolve_date(None).unwrap(), today_label());
        assert_eq!(resolve_date(Some("  ")).unwrap(), today_label());
        assert_eq!(resolve_date(Some(" 2024-05-02 ")).unwrap(), "2024-05-02");
    }
}
