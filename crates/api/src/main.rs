use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bunseok_core::{auth, storage};

mod validate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = bunseok_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<SqlitePool> = match storage::connect(settings.database_url()).await {
        Ok(pool) => match storage::init(&pool).await {
            Ok(()) => Some(pool),
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "db init failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "db connect failed; starting API in degraded mode");
            None
        }
    };

    let app = app(AppState { pool });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Debug, Clone)]
struct AppState {
    pool: Option<SqlitePool>,
}

fn app(state: AppState) -> Router {
    // The frontend is served separately during development; CORS stays open.
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SimpleResponse {
    message: String,
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<SimpleResponse>, ApiError> {
    let Some(pool) = &state.pool else {
        return Err(ApiError::Unavailable);
    };

    validate::email(&req.email).map_err(ApiError::BadRequest)?;
    validate::password(&req.password).map_err(ApiError::BadRequest)?;

    if storage::users::find_by_email(pool, &req.email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::BadRequest("이미 가입된 이메일입니다.".to_string()));
    }

    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .context("join hash task failed")
        .map_err(ApiError::Internal)?
        .map_err(ApiError::Internal)?;

    // The UNIQUE index still decides under concurrent signups for one email.
    if storage::users::insert(pool, &req.email, &password_hash)
        .await
        .map_err(ApiError::Internal)?
        .is_none()
    {
        return Err(ApiError::BadRequest("이미 가입된 이메일입니다.".to_string()));
    }

    tracing::info!(email = %req.email, "signup ok");

    Ok(Json(SimpleResponse {
        message: "회원가입 성공".to_string(),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SimpleResponse>, ApiError> {
    let Some(pool) = &state.pool else {
        return Err(ApiError::Unavailable);
    };

    validate::email(&req.email).map_err(ApiError::BadRequest)?;
    validate::password(&req.password).map_err(ApiError::BadRequest)?;

    let Some(user) = storage::users::find_by_email(pool, &req.email)
        .await
        .map_err(ApiError::Internal)?
    else {
        return Err(ApiError::BadRequest("가입되지 않은 이메일입니다.".to_string()));
    };

    let password = req.password.clone();
    let ok =
        tokio::task::spawn_blocking(move || auth::verify_password(&password, &user.password_hash))
            .await
            .context("join verify task failed")
            .map_err(ApiError::Internal)?
            .map_err(ApiError::Internal)?;

    if !ok {
        return Err(ApiError::BadRequest("비밀번호가 일치하지 않습니다.".to_string()));
    }

    Ok(Json(SimpleResponse {
        message: "로그인 성공".to_string(),
    }))
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unavailable,
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "database unavailable".to_string(),
            ),
            ApiError::Internal(err) => {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &bunseok_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::str::FromStr;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        // One connection keeps every request on the same in-memory database.
        let opts = sqlx::sqlite::SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("parse memory url")
            .foreign_keys(true);
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .expect("open in-memory sqlite");
        storage::init(&pool).await.expect("init schema");

        app(AppState { pool: Some(pool) })
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn healthz_responds_ok() {
        let app = test_app().await;
        let res = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn signup_succeeds_once_then_rejects_duplicate() {
        let app = test_app().await;
        let req = json!({"email": "baek@example.com", "password": "secret1"});

        let (status, body) = post_json(&app, "/api/signup", req.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "회원가입 성공");

        let (status, body) = post_json(&app, "/api/signup", req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "이미 가입된 이메일입니다.");
    }

    #[tokio::test]
    async fn login_accepts_correct_credentials_only() {
        let app = test_app().await;
        let (status, _) = post_json(
            &app,
            "/api/signup",
            json!({"email": "baek@example.com", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post_json(
            &app,
            "/api/login",
            json!({"email": "baek@example.com", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "로그인 성공");

        let (status, body) = post_json(
            &app,
            "/api/login",
            json!({"email": "baek@example.com", "password": "secret2"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "비밀번호가 일치하지 않습니다.");

        let (status, body) = post_json(
            &app,
            "/api/login",
            json!({"email": "nobody@example.com", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "가입되지 않은 이메일입니다.");
    }

    #[tokio::test]
    async fn signup_rejects_malformed_input() {
        let app = test_app().await;

        let (status, _) = post_json(
            &app,
            "/api/signup",
            json!({"email": "not-an-email", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            &app,
            "/api/signup",
            json!({"email": "baek@example.com", "password": "short"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            &app,
            "/api/signup",
            json!({"email": "baek@example.com", "password": "x".repeat(81)}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn degraded_mode_returns_service_unavailable() {
        let app = app(AppState { pool: None });
        let (status, _) = post_json(
            &app,
            "/api/login",
            json!({"email": "baek@example.com", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
