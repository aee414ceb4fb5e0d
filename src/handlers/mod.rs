pub mod auth_handlers;
pub mod health_handlers;
pub mod help_request_handlers;
pub mod page_handlers;
pub mod reservation_handlers;
pub mod skill_handlers;
pub mod time_slot_handlers;

use crate::error_handler::ServiceError;
use crate::models::User;
use crate::state::AppState;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use tera::Context;

pub(crate) const DASHBOARD_PATH: &str = "/dashboard";

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Context every page starts from; the layout reads `current_user`.
pub(crate) fn page_context(current_user: Option<&User>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("current_user", &current_user);
    ctx
}

pub(crate) fn render_page(
    state: &AppState,
    template: &str,
    ctx: &Context,
) -> Result<HttpResponse, ServiceError> {
    render_page_with_status(state, StatusCode::OK, template, ctx)
}

pub(crate) fn render_page_with_status(
    state: &AppState,
    status: StatusCode,
    template: &str,
    ctx: &Context,
) -> Result<HttpResponse, ServiceError> {
    let body = state.renderer.render(template, ctx)?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}
