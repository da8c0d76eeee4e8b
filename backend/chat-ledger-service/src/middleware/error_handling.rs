use crate::error::AppError;
use actix_web::{http::StatusCode, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};

/// Map a service error onto the shared JSON error body.
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::BAD_REQUEST),
        AppError::InvalidMessage(_) => (kinds::VALIDATION_ERROR, error_codes::MESSAGE_INVALID),
        AppError::InvalidDisplayName(_) => {
            (kinds::VALIDATION_ERROR, error_codes::DISPLAY_NAME_INVALID)
        }
        AppError::Config(_) => (kinds::SERVER_ERROR, error_codes::CONFIG_ERROR),
        AppError::StartServer(_) => (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR),
    };

    let response = ErrorResponse::new(
        status.canonical_reason().unwrap_or("Error"),
        &err.to_string(),
        status.as_u16(),
        error_type,
        code,
    );

    (status, response)
}

/// Render an error body, tagged with the request id when one is known.
pub fn render(err: &AppError, request_id: Option<&str>) -> HttpResponse {
    let (status, mut body) = map_error(err);
    if let Some(id) = request_id {
        body = body.with_trace_id(id.to_string());
    }
    HttpResponse::build(status).json(body)
}

pub fn into_response(err: &AppError) -> HttpResponse {
    if err.status_code() >= 500 {
        tracing::error!(error = %err, "request failed");
    }
    render(err, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_invalid_message_maps_to_validation_error() {
        let (status, body) =
            map_error(&AppError::InvalidMessage("content must not be empty".into()));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.error_type, kinds::VALIDATION_ERROR);
        assert_eq!(body.code, error_codes::MESSAGE_INVALID);
        assert!(body.message.contains("content must not be empty"));
    }

    #[test]
    fn test_display_name_has_its_own_code() {
        let (status, body) = map_error(&AppError::InvalidDisplayName("blank".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, error_codes::DISPLAY_NAME_INVALID);
    }

    #[test]
    fn test_config_errors_are_server_errors() {
        let (status, body) = map_error(&AppError::Config("PORT".into()));
        assert_eq!(status.as_u16(), 500);
        assert_eq!(body.error_type, kinds::SERVER_ERROR);
        assert_eq!(body.code, error_codes::CONFIG_ERROR);
    }

    #[actix_web::test]
    async fn test_render_carries_request_id() {
        let resp = render(&AppError::BadRequest("user_id".into()), Some("req-42"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["trace_id"], "req-42");
        assert_eq!(value["code"], error_codes::BAD_REQUEST);
    }
}
