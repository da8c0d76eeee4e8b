use crate::error::{AppError, AppResult};
use crate::models::user::SignUpRequest;
use crate::state::AppState;
use actix_web::{delete, get, post, web, HttpResponse};

/// POST /api/users/signup
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let display_name = body.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::InvalidDisplayName("displayName must not be empty".into()));
    }

    Ok(HttpResponse::Ok().json(state.users.sign_up(display_name)))
}

/// GET /api/users/contacts/{session_id}
#[get("/contacts/{session_id}")]
pub async fn contacts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.users.contacts_except(&path)))
}

/// DELETE /api/users/{session_id}
///
/// Removes the account and anonymizes everything it sent. Always acknowledges,
/// the anonymizer being a no-op for ids that never sent anything.
#[delete("/{session_id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    if !state.users.delete(&session_id) {
        tracing::info!(%session_id, "delete requested for unregistered user");
    }

    let report = state.chat.anonymize_user(&session_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User account deleted and messages anonymized.",
        "messagesAnonymized": report.total_rewritten(),
    })))
}
