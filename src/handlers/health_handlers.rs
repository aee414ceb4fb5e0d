use crate::error_handler::ServiceError;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};

// === GET /health ===
#[get("/health")]
pub async fn health_check_handler(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    state.store.health_check().await.map_err(|e| {
        log::error!("Health check failed: {}", e);
        ServiceError::InternalServerError("Failed to reach the store".to_string())
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "message": "Service is running and the store is reachable"
    })))
}
