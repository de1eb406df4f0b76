/// OpenAPI documentation for the messages service.
use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Messages Service API",
        version = "0.1.0",
        description = "Private user-to-user messages: inbox/outbox/trash folders, compose, reply threading, and two-sided soft deletion",
        license(name = "MIT")
    ),
    paths(
        handlers::health::health_check,
        handlers::messages::inbox,
        handlers::messages::outbox,
        handlers::messages::trash,
        handlers::messages::compose,
        handlers::messages::reply,
        handlers::messages::delete_message,
        handlers::messages::undelete_message,
        handlers::messages::view_message,
    ),
    components(schemas(
        handlers::health::HealthResponse,
        handlers::messages::ComposeRequest,
        handlers::messages::ReplyRequest,
        handlers::messages::MessageDto,
        handlers::messages::MessageListResponse,
        handlers::messages::MessageResponse,
    )),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Messages", description = "Private user-to-user messages"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}

/// Serve the generated document; a Swagger UI can be pointed at this URL.
pub async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> HttpResponse {
    let body = serde_json::to_string(&*doc)
        .expect("Failed to serialize OpenAPI document for messages-service");

    HttpResponse::Ok()
        .content_type("application/json")
        .body(body)
}
