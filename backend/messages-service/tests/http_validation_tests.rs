//! Handler-level validation and authentication tests.
//!
//! These run against a lazily-connected pool: every assertion here fires
//! before any query, so a test reaching the database would fail loudly.

use actix_web::{test, web, App};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use messages_service::{handlers, security::jwt};

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost:1/unreachable")
        .expect("lazy pool")
}

fn bearer(user: Uuid) -> (&'static str, String) {
    jwt::initialize_keys("test-secret").expect("initialize keys");
    let token = jwt::generate_token(user).expect("generate token");
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! messages_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .configure(handlers::messages::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn request_without_token_is_rejected() {
    jwt::initialize_keys("test-secret").expect("initialize keys");
    let app = messages_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/messages/inbox")
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    assert!(resp.is_err(), "missing bearer token must be rejected");
}

#[actix_web::test]
async fn request_with_garbage_token_is_rejected() {
    jwt::initialize_keys("test-secret").expect("initialize keys");
    let app = messages_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/messages/inbox")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    assert!(resp.is_err(), "garbage token must be rejected");
}

#[actix_web::test]
async fn request_with_wrong_scheme_is_rejected() {
    jwt::initialize_keys("test-secret").expect("initialize keys");
    let app = messages_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/messages/inbox")
        .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    assert!(resp.is_err(), "non-Bearer scheme must be rejected");
}

#[actix_web::test]
async fn compose_with_empty_recipient_list_returns_400() {
    let app = messages_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/messages/compose")
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(serde_json::json!({
            "recipient": [],
            "subject": "Hi",
            "body": "hello"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn compose_with_empty_body_returns_400() {
    let app = messages_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/messages/compose")
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(serde_json::json!({
            "recipient": [Uuid::new_v4()],
            "subject": "Hi",
            "body": ""
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn compose_with_oversized_subject_returns_400() {
    let app = messages_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/messages/compose")
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(serde_json::json!({
            "recipient": [Uuid::new_v4()],
            "subject": "x".repeat(141),
            "body": "hello"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn reply_with_blank_subject_returns_400() {
    let app = messages_app!();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/messages/{}/reply", Uuid::new_v4()))
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(serde_json::json!({
            "subject": "",
            "body": "hello"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}
