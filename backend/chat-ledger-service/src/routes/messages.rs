use crate::error::{AppError, AppResult};
use crate::models::{SendMessageRequest, StatusUpdate};
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};
use serde::Serialize;

#[derive(Serialize)]
pub struct ReceiptResponse {
    pub updated: bool,
}

/// Reject sends that cannot be keyed to a conversation.
pub fn validate_send(request: &SendMessageRequest) -> AppResult<()> {
    if request.sender_id.trim().is_empty() {
        return Err(AppError::InvalidMessage("senderId must not be empty".into()));
    }
    if request.receiver_id.trim().is_empty() {
        return Err(AppError::InvalidMessage("receiverId must not be empty".into()));
    }
    Ok(())
}

/// POST /api/chat/messages
#[post("/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    body: web::Json<SendMessageRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    validate_send(&request)?;

    let message = state.chat.send_message(request).await;
    Ok(HttpResponse::Ok().json(message))
}

/// POST /api/chat/receipts
///
/// Unknown messages and non-advancing statuses answer `updated: false`.
#[post("/receipts")]
pub async fn apply_receipt(
    state: web::Data<AppState>,
    body: web::Json<StatusUpdate>,
) -> AppResult<HttpResponse> {
    let updated = state.chat.apply_status_update(&body).await;
    Ok(HttpResponse::Ok().json(ReceiptResponse { updated }))
}

/// GET /api/chat/history/{user1}/{user2}
#[get("/history/{user1}/{user2}")]
pub async fn get_history(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (user1, user2) = path.into_inner();
    Ok(HttpResponse::Ok().json(state.chat.history(&user1, &user2)))
}
