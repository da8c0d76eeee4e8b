pub mod messages;
pub mod users;
pub mod wsroute;

use crate::metrics;
use actix_web::{get, web, HttpResponse};

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mount every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(metrics::metrics_handler)
        .service(wsroute::ws_handler)
        .service(
            web::scope("/api/chat")
                .service(messages::send_message)
                .service(messages::apply_receipt)
                .service(messages::get_history),
        )
        .service(
            web::scope("/api/users")
                .service(users::signup)
                .service(users::contacts)
                .service(users::delete_user),
        );
}
