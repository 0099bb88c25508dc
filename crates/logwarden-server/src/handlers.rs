use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use logwarden_core::{LogEntry, RequestContext};
use logwarden_runtime::QueryFilter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "logwarden" }))
}

/// Raw `/v1/logs` query string. Values are parsed by [`LogsParams::into_filter`].
#[derive(Debug, Default, Deserialize)]
pub struct LogsParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub user_ids: Option<String>,
}

impl LogsParams {
    pub fn into_filter(self) -> Result<QueryFilter, ApiError> {
        let mut filter = QueryFilter::new();
        if let Some(from) = non_empty(self.from.as_deref()) {
            filter = filter.since(parse_timestamp("from", from)?);
        }
        if let Some(to) = non_empty(self.to.as_deref()) {
            filter = filter.until(parse_timestamp("to", to)?);
        }
        if let Some(ids) = non_empty(self.user_ids.as_deref()) {
            filter = filter.user_ids(parse_user_ids(ids)?);
        }
        Ok(filter)
    }
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub trace_id: Uuid,
    pub count: usize,
    pub entries: Vec<LogEntry>,
}

pub async fn query_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, ErrorResponse> {
    let ctx = RequestContext::from_header(
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let fail = |e: ApiError| e.with_trace(ctx.trace_id);

    let token = extract_admin_token(&headers).ok_or_else(|| fail(ApiError::MissingToken))?;
    let filter = match params.into_filter() {
        Ok(filter) => filter,
        Err(bad_param) => {
            // Credential problems take precedence over malformed filters.
            state
                .service
                .admit(&ctx, &token)
                .await
                .map_err(|e| fail(e.into()))?;
            return Err(fail(bad_param));
        }
    };

    let entries = state
        .service
        .query_logs(&ctx, &token, filter)
        .await
        .map_err(|e| fail(e.into()))?;

    Ok(Json(LogsResponse {
        trace_id: ctx.trace_id,
        count: entries.len(),
        entries,
    }))
}

fn extract_admin_token(headers: &HeaderMap) -> Option<String> {
    if let Some(v) = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        let s = v.trim();
        if !s.is_empty() {
            return Some(s.to_string());
        }
    }
    if let Some(v) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(rest) = v.strip_prefix("Bearer ") {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }
    None
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_timestamp(param: &'static str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ApiError::BadParam {
            param,
            reason: e.to_string(),
        })
}

fn parse_user_ids(value: &str) -> Result<Vec<i32>, ApiError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i32>().map_err(|e| ApiError::BadParam {
                param: "user_ids",
                reason: format!("'{}': {}", id, e),
            })
        })
        .collect()
}
