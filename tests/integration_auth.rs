mod common;

use axum::http::StatusCode;
use common::{RequestBuilder, USER_AGENT, create_test_user, generate_unique_email, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use tollgate_core::Role;

#[sqlx::test(migrations = "./migrations")]
async fn test_register_login_refresh_flow(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let (status, body) = app
        .send(RequestBuilder::post("/api/auth/register").json(json!({
            "email": "a@b.com",
            "password": "Passw0rd!",
            "full_name": "A B"
        })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["message"].is_string());

    let (status, body) = app.login("a@b.com", "Passw0rd!", USER_AGENT).await;
    assert_eq!(status, StatusCode::CREATED);
    let access_token = body["access_token"].as_str().unwrap().to_string();
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();
    assert!(!access_token.is_empty());
    assert!(!refresh_token.is_empty());
    assert_eq!(body["expires_in"], 900);

    let (status, body) = app
        .refresh(&access_token, &refresh_token, Some(USER_AGENT))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let new_access = body["access_token"].as_str().unwrap();
    assert!(!new_access.is_empty());
    assert_ne!(new_access, access_token);
    assert!(body["expires_in"].is_number());
    assert!(body.get("refresh_token").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;

    let (status, body) = app
        .send(RequestBuilder::post("/api/auth/register").json(json!({
            "email": user.email,
            "password": "Another1!",
            "full_name": "Someone Else"
        })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is already registered");
    assert_eq!(body["status"], 400);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_missing_fields(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = app
        .send(RequestBuilder::post("/api/auth/register").json(json!({
            "email": generate_unique_email(),
            "password": "Passw0rd!"
        })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "full_name is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;

    let (wrong_status, wrong_body) = app.login(&user.email, "wrong-password", USER_AGENT).await;
    let (unknown_status, unknown_body) = app
        .login(&generate_unique_email(), "Passw0rd!", USER_AGENT)
        .await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_body, unknown_body);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_missing_password(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = app
        .send(
            RequestBuilder::post("/api/auth/login")
                .user_agent(USER_AGENT)
                .json(json!({ "email": "a@b.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "password is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_without_user_agent(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;

    let (status, body) = app
        .send(RequestBuilder::post("/api/auth/login").json(json!({
            "email": user.email,
            "password": user.password
        })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User-Agent header is required");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_session_store_failure_is_server_error(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;

    sqlx::query("DROP TABLE refresh_sessions")
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = app.login(&user.email, &user.password, USER_AGENT).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["status"], 500);
    assert!(body.get("access_token").is_none());
    assert!(body.get("refresh_token").is_none());
    assert!(!body.to_string().contains("refresh_sessions"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_login_invalidates_first_refresh_token(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;

    let (first_access, first_refresh) = app.login_tokens(&user, USER_AGENT).await;
    let (second_access, second_refresh) = app.login_tokens(&user, USER_AGENT).await;
    assert_ne!(first_refresh, second_refresh);

    let (status, _) = app
        .refresh(&second_access, &second_refresh, Some(USER_AGENT))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // The first access token is still cryptographically valid.
    let (status, body) = app
        .refresh(&first_access, &first_refresh, Some(USER_AGENT))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_without_user_agent(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let (access, refresh) = app.login_tokens(&user, USER_AGENT).await;

    let (status, body) = app.refresh(&access, &refresh, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User-Agent header is required");

    let (status, _) = app.refresh(&access, "garbage", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_from_another_client_context(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let (access, refresh) = app.login_tokens(&user, USER_AGENT).await;

    let (status, body) = app.refresh(&access, &refresh, Some("Other")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_with_tampered_token(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let (access, refresh) = app.login_tokens(&user, USER_AGENT).await;

    let mut parts: Vec<String> = refresh.split('.').map(str::to_string).collect();
    let mut payload = parts[1].clone().into_bytes();
    payload[10] = if payload[10] == b'A' { b'B' } else { b'A' };
    parts[1] = String::from_utf8(payload).unwrap();
    let tampered = parts.join(".");

    let (status, body) = app.refresh(&access, &tampered, Some(USER_AGENT)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_with_access_token_as_refresh_token(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let (access, _) = app.login_tokens(&user, USER_AGENT).await;

    let (status, _) = app.refresh(&access, &access, Some(USER_AGENT)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_without_bearer_is_bad_request(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let (_, refresh) = app.login_tokens(&user, USER_AGENT).await;

    let (status, body) = app
        .send(
            RequestBuilder::post("/api/auth/refresh-token")
                .user_agent(USER_AGENT)
                .json(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_token_of_another_user(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let alice = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let bob = create_test_user(&pool, "Passw0rd!", Role::User).await;

    let (alice_access, _) = app.login_tokens(&alice, "Alice-Agent").await;
    let (_, bob_refresh) = app.login_tokens(&bob, "Bob-Agent").await;

    let (status, _) = app
        .refresh(&alice_access, &bob_refresh, Some("Bob-Agent"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_missing_body_field(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let (access, _) = app.login_tokens(&user, USER_AGENT).await;

    let (status, body) = app
        .send(
            RequestBuilder::post("/api/auth/refresh-token")
                .bearer(&access)
                .user_agent(USER_AGENT)
                .json(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "refresh_token is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_revokes_only_this_client(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "Passw0rd!", Role::User).await;
    let (access, refresh) = app.login_tokens(&user, USER_AGENT).await;

    let (status, body) = app
        .send(
            RequestBuilder::post("/api/auth/logout")
                .bearer(&access)
                .user_agent(USER_AGENT)
                .empty(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, _) = app.refresh(&access, &refresh, Some(USER_AGENT)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The access token itself stays valid until it expires.
    let (status, _) = app
        .send(RequestBuilder::get("/api/users/me").bearer(&access).empty())
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_requires_bearer(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = app
        .send(
            RequestBuilder::post("/api/auth/logout")
                .user_agent(USER_AGENT)
                .empty(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
