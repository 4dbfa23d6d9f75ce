#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tollgate::router::init_router;
use tollgate::state::AppState;
use tollgate_config::{CorsConfig, JwtConfig};
use tollgate_core::{Role, hash_password};
use tower::ServiceExt;
use uuid::Uuid;

pub const USER_AGENT: &str = "X";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub struct TestApp {
    pub state: AppState,
    pub router: axum::Router,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "integration-access-secret-at-least-32-chars".to_string(),
        access_token_expiry: 900,
        refresh_secret: "integration-refresh-secret-at-least-32-chars".to_string(),
        refresh_token_expiry: 604800,
    }
}

pub fn setup_test_app(pool: PgPool) -> TestApp {
    let state = AppState::new(
        pool,
        &test_jwt_config(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    );
    let router = init_router(state.clone());
    TestApp { state, router }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn login(&self, email: &str, password: &str, user_agent: &str) -> (StatusCode, Value) {
        self.send(
            RequestBuilder::post("/api/auth/login")
                .user_agent(user_agent)
                .json(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Logs in and returns `(access_token, refresh_token)`.
    pub async fn login_tokens(&self, user: &TestUser, user_agent: &str) -> (String, String) {
        let (status, body) = self.login(&user.email, &user.password, user_agent).await;
        assert_eq!(status, StatusCode::CREATED, "login failed: {body}");
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
        user_agent: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = RequestBuilder::post("/api/auth/refresh-token").bearer(access_token);
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        self.send(builder.json(serde_json::json!({ "refresh_token": refresh_token })))
            .await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Thin wrapper over `http::request::Builder` for the headers these tests use.
pub struct RequestBuilder(axum::http::request::Builder);

impl RequestBuilder {
    pub fn new(method: &str, uri: &str) -> Self {
        Self(Request::builder().method(method).uri(uri))
    }

    pub fn post(uri: &str) -> Self {
        Self::new("POST", uri)
    }

    pub fn get(uri: &str) -> Self {
        Self::new("GET", uri)
    }

    pub fn bearer(self, token: &str) -> Self {
        Self(self.0.header(header::AUTHORIZATION, format!("Bearer {}", token)))
    }

    pub fn user_agent(self, user_agent: &str) -> Self {
        Self(self.0.header(header::USER_AGENT, user_agent))
    }

    pub fn json(self, body: Value) -> Request<Body> {
        self.0
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn empty(self) -> Request<Body> {
        self.0.body(Body::empty()).unwrap()
    }
}

pub async fn create_test_user(pool: &PgPool, password: &str, role: Role) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(password).await.unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password, full_name, role)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(&email)
    .bind(&hashed)
    .bind("Test User")
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: password.to_string(),
        role,
    }
}

pub async fn live_session_count(pool: &PgPool, user_id: Uuid, client_context: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM refresh_sessions
         WHERE user_id = $1 AND client_context = $2 AND expires_at > NOW()",
    )
    .bind(user_id)
    .bind(client_context)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
