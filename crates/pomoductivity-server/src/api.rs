//! REST routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use pomoductivity_core::{SessionHistoryEntry, Settings, SettingsPatch, TimerSnapshot};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;
use crate::ws;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the full application router.
pub fn router(state: AppState, cors_origin: &str) -> Router {
    let timer = Router::new()
        .route("/status", get(status))
        .route("/history", get(history))
        .route("/start-stop", post(toggle))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/reset", post(reset))
        .route("/set-type", post(set_type));

    let settings = Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/reset", post(reset_settings));

    let api = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health))
        .nest("/timer", timer)
        .nest("/settings", settings);

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/api") }))
        .route("/ws", get(ws::upgrade))
        .nest("/api", api)
        .fallback(not_found)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE]);
    if origin == "*" {
        return base.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => base
            .allow_origin(AllowOrigin::exact(value))
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!(origin, "invalid CORS origin, allowing any");
            base.allow_origin(Any)
        }
    }
}

async fn api_info() -> Json<Value> {
    Json(json!({
        "name": "Pomoductivity API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "REST API for Pomodoro timer management",
        "endpoints": {
            "health": "GET /api/health",
            "timer": {
                "status": "GET /api/timer/status",
                "history": "GET /api/timer/history",
                "startStop": "POST /api/timer/start-stop",
                "start": "POST /api/timer/start",
                "stop": "POST /api/timer/stop",
                "reset": "POST /api/timer/reset",
                "setType": "POST /api/timer/set-type",
            },
            "settings": {
                "get": "GET /api/settings",
                "update": "PUT /api/settings",
                "reset": "POST /api/settings/reset",
            },
            "websocket": "WS /ws",
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "timestamp": Utc::now(),
    }))
}

async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": format!("Cannot {method} {}", uri.path()),
            "availableEndpoints": "/api",
        })),
    )
}

// ── Timer ────────────────────────────────────────────────────────────

async fn status(State(state): State<AppState>) -> ApiResult<TimerSnapshot> {
    Ok(Json(state.timer.status().await?))
}

async fn history(State(state): State<AppState>) -> ApiResult<Vec<SessionHistoryEntry>> {
    Ok(Json(state.timer.history().await?))
}

async fn toggle(State(state): State<AppState>) -> ApiResult<TimerSnapshot> {
    Ok(Json(state.timer.toggle().await?))
}

async fn start(State(state): State<AppState>) -> ApiResult<TimerSnapshot> {
    Ok(Json(state.timer.start().await?))
}

async fn stop(State(state): State<AppState>) -> ApiResult<TimerSnapshot> {
    Ok(Json(state.timer.stop().await?))
}

async fn reset(State(state): State<AppState>) -> ApiResult<TimerSnapshot> {
    Ok(Json(state.timer.reset().await?))
}

#[derive(Deserialize)]
struct SetTypeRequest {
    #[serde(rename = "type")]
    session_type: Option<String>,
}

async fn set_type(
    State(state): State<AppState>,
    payload: Result<Json<SetTypeRequest>, JsonRejection>,
) -> ApiResult<TimerSnapshot> {
    let requested = match payload {
        Ok(Json(SetTypeRequest {
            session_type: Some(t),
        })) if !t.is_empty() => t,
        Ok(_) | Err(JsonRejection::MissingJsonContentType(_)) => {
            return Err(ApiError::MissingSessionType)
        }
        Err(rejection) => return Err(ApiError::BadRequest(rejection.body_text())),
    };
    Ok(Json(state.timer.set_session_type(requested).await?))
}

// ── Settings ─────────────────────────────────────────────────────────

/// Raw update body. A field that is present -- even as `null` -- must be a
/// valid duration; absent fields are left alone.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UpdateSettingsRequest {
    #[serde(default, deserialize_with = "present")]
    focus_duration: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    short_break_duration: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    long_break_duration: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Whole numbers only; `1500` and `1500.0` pass, `15.5`, `"1500"` and
/// `null` do not.
fn whole_seconds(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}

impl UpdateSettingsRequest {
    fn into_patch(self) -> Result<SettingsPatch, ApiError> {
        let convert = |field: Option<Value>| -> Result<Option<i64>, ApiError> {
            field
                .map(|v| whole_seconds(&v).ok_or(ApiError::InvalidDuration))
                .transpose()
        };
        let patch = SettingsPatch {
            focus_duration: convert(self.focus_duration)?,
            short_break_duration: convert(self.short_break_duration)?,
            long_break_duration: convert(self.long_break_duration)?,
        };
        Ok(patch)
    }

    fn is_empty(&self) -> bool {
        self.focus_duration.is_none()
            && self.short_break_duration.is_none()
            && self.long_break_duration.is_none()
    }
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<Settings> {
    Ok(Json(state.timer.settings().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> ApiResult<Settings> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => UpdateSettingsRequest::default(),
        Err(rejection) => return Err(ApiError::BadRequest(rejection.body_text())),
    };
    if request.is_empty() {
        return Err(ApiError::EmptySettingsUpdate);
    }
    let patch = request.into_patch()?;
    Ok(Json(state.timer.update_settings(patch).await?))
}

async fn reset_settings(State(state): State<AppState>) -> ApiResult<Settings> {
    Ok(Json(state.timer.reset_settings().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_seconds_accepts_integers_only() {
        assert_eq!(whole_seconds(&json!(1500)), Some(1500));
        assert_eq!(whole_seconds(&json!(1500.0)), Some(1500));
        assert_eq!(whole_seconds(&json!(-3)), Some(-3));
        assert_eq!(whole_seconds(&json!(15.5)), None);
        assert_eq!(whole_seconds(&json!("1500")), None);
        assert_eq!(whole_seconds(&Value::Null), None);
        assert_eq!(whole_seconds(&json!(true)), None);
    }

    #[test]
    fn null_field_counts_as_present() {
        let req: UpdateSettingsRequest =
            serde_json::from_value(json!({ "focusDuration": null })).unwrap();
        assert!(!req.is_empty());
        assert!(matches!(req.into_patch(), Err(ApiError::InvalidDuration)));
    }

    #[test]
    fn absent_fields_stay_absent() {
        let req: UpdateSettingsRequest =
            serde_json::from_value(json!({ "shortBreakDuration": 600, "other": 1 })).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.short_break_duration, Some(600));
        assert!(patch.focus_duration.is_none());
        assert!(patch.long_break_duration.is_none());
    }
}
