//! REST handlers for the private messages API.
//!
//! Folder listings, compose, reply, two-sided soft delete/undelete, and the
//! read-marking single-message view.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::jwt_auth::UserId;
use crate::models::{Folder, Message};
use crate::services::MessageService;

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ComposeRequest {
    /// One message row is created per recipient.
    #[validate(length(min = 1, message = "recipient is required"))]
    pub recipient: Vec<Uuid>,
    #[validate(length(min = 1, max = 140))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplyRequest {
    #[validate(length(min = 1, max = 140))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

/// Read-only projection of a message for the presentation layer.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDto {
    pub id: Uuid,
    pub subject: String,
    pub body: String,
    pub sender: Option<Uuid>,
    pub recipient: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub replied_at: Option<String>,
    pub sender_deleted_at: Option<String>,
    pub recipient_deleted_at: Option<String>,
    pub is_new: bool,
    pub is_replied: bool,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            is_new: message.is_new(),
            is_replied: message.is_replied(),
            id: message.id,
            subject: message.subject,
            body: message.body,
            sender: message.sender,
            recipient: message.recipient,
            parent_id: message.parent_id,
            sent_at: message.sent_at.to_rfc3339(),
            read_at: message.read_at.map(|t| t.to_rfc3339()),
            replied_at: message.replied_at.map(|t| t.to_rfc3339()),
            sender_deleted_at: message.sender_deleted_at.map(|t| t.to_rfc3339()),
            recipient_deleted_at: message.recipient_deleted_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageListResponse {
    pub messages_list: Vec<MessageDto>,
}

impl From<Vec<Message>> for MessageListResponse {
    fn from(messages: Vec<Message>) -> Self {
        Self {
            messages_list: messages.into_iter().map(MessageDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: MessageDto,
}

// ============================================
// API Handlers
// ============================================

/// GET /api/v1/messages/inbox
#[utoipa::path(
    get,
    path = "/api/v1/messages/inbox",
    tag = "Messages",
    responses((status = 200, description = "Received messages for the current user", body = MessageListResponse))
)]
pub async fn inbox(user: UserId, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let service = MessageService::new(pool.get_ref().clone());
    let messages = service.list(user.0, Folder::Inbox).await?;
    Ok(HttpResponse::Ok().json(MessageListResponse::from(messages)))
}

/// GET /api/v1/messages/outbox
#[utoipa::path(
    get,
    path = "/api/v1/messages/outbox",
    tag = "Messages",
    responses((status = 200, description = "Messages sent by the current user", body = MessageListResponse))
)]
pub async fn outbox(user: UserId, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let service = MessageService::new(pool.get_ref().clone());
    let messages = service.list(user.0, Folder::Outbox).await?;
    Ok(HttpResponse::Ok().json(MessageListResponse::from(messages)))
}

/// GET /api/v1/messages/trash
#[utoipa::path(
    get,
    path = "/api/v1/messages/trash",
    tag = "Messages",
    responses((status = 200, description = "Messages the current user moved to trash", body = MessageListResponse))
)]
pub async fn trash(user: UserId, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let service = MessageService::new(pool.get_ref().clone());
    let messages = service.list(user.0, Folder::Trash).await?;
    Ok(HttpResponse::Ok().json(MessageListResponse::from(messages)))
}

/// POST /api/v1/messages/compose
#[utoipa::path(
    post,
    path = "/api/v1/messages/compose",
    tag = "Messages",
    request_body = ComposeRequest,
    responses(
        (status = 201, description = "Messages created, one per recipient", body = MessageListResponse),
        (status = 400, description = "Malformed compose input"),
    )
)]
pub async fn compose(
    user: UserId,
    pool: web::Data<PgPool>,
    req: web::Json<ComposeRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;
    let service = MessageService::new(pool.get_ref().clone());
    let messages = service
        .compose(user.0, &req.recipient, &req.subject, &req.body)
        .await?;
    Ok(HttpResponse::Created().json(MessageListResponse::from(messages)))
}

/// POST /api/v1/messages/{id}/reply
#[utoipa::path(
    post,
    path = "/api/v1/messages/{id}/reply",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "Parent message id")),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "Reply created, addressed to the parent's counter-party", body = MessageResponse),
        (status = 404, description = "Parent absent or caller not a party"),
    )
)]
pub async fn reply(
    user: UserId,
    pool: web::Data<PgPool>,
    parent_id: web::Path<Uuid>,
    req: web::Json<ReplyRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;
    let service = MessageService::new(pool.get_ref().clone());
    let message = service
        .reply(user.0, *parent_id, &req.subject, &req.body)
        .await?;
    Ok(HttpResponse::Created().json(MessageResponse {
        message: MessageDto::from(message),
    }))
}

/// PUT /api/v1/messages/{id}/delete
#[utoipa::path(
    put,
    path = "/api/v1/messages/{id}/delete",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message moved to trash for the caller's role(s)"),
        (status = 404, description = "Message absent or caller not a party"),
    )
)]
pub async fn delete_message(
    user: UserId,
    pool: web::Data<PgPool>,
    message_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = MessageService::new(pool.get_ref().clone());
    service.delete(user.0, *message_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/v1/messages/{id}/undelete
#[utoipa::path(
    put,
    path = "/api/v1/messages/{id}/undelete",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message recovered from trash for the caller's role(s)"),
        (status = 404, description = "Message absent or caller not a party"),
    )
)]
pub async fn undelete_message(
    user: UserId,
    pool: web::Data<PgPool>,
    message_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = MessageService::new(pool.get_ref().clone());
    service.undelete(user.0, *message_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Message successfully recovered"
    })))
}

/// GET /api/v1/messages/{id}/view
#[utoipa::path(
    get,
    path = "/api/v1/messages/{id}/view",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 200, description = "The message; first view by the recipient marks it read", body = MessageResponse),
        (status = 404, description = "Message absent, caller not a party, or caller's side trashed"),
    )
)]
pub async fn view_message(
    user: UserId,
    pool: web::Data<PgPool>,
    message_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = MessageService::new(pool.get_ref().clone());
    let message = service.view(user.0, *message_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: MessageDto::from(message),
    }))
}

// ============================================
// Route Configuration
// ============================================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/messages")
            .wrap(crate::middleware::JwtAuthMiddleware)
            .route("/inbox", web::get().to(inbox))
            .route("/outbox", web::get().to(outbox))
            .route("/trash", web::get().to(trash))
            .route("/compose", web::post().to(compose))
            .route("/{id}/reply", web::post().to(reply))
            .route("/{id}/delete", web::put().to(delete_message))
            .route("/{id}/undelete", web::put().to(undelete_message))
            .route("/{id}/view", web::get().to(view_message)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn dto_carries_derived_flags_and_rfc3339_timestamps() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4(),
            subject: "Hi".into(),
            body: "hello".into(),
            sender: Some(a),
            recipient: Some(b),
            parent_id: None,
            sent_at: now,
            read_at: None,
            replied_at: Some(now),
            sender_deleted_at: None,
            recipient_deleted_at: None,
        };

        let dto = MessageDto::from(message);
        assert!(dto.is_new);
        assert!(dto.is_replied);
        assert_eq!(dto.sent_at, now.to_rfc3339());
        assert!(dto.read_at.is_none());
    }

    #[test]
    fn compose_request_rejects_empty_recipient_list() {
        let req = ComposeRequest {
            recipient: vec![],
            subject: "Hi".into(),
            body: "hello".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn compose_request_rejects_oversized_subject() {
        let req = ComposeRequest {
            recipient: vec![Uuid::new_v4()],
            subject: "x".repeat(141),
            body: "hello".into(),
        };
        assert!(req.validate().is_err());
    }
}
