use super::{page_context, render_page};
use crate::auth_utils::{AuthenticatedUser, CurrentUser};
use crate::error_handler::ServiceError;
use crate::forms::DATE_FORMAT;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use chrono::Utc;

// === GET / ===
#[get("/")]
pub async fn home_handler(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<HttpResponse, ServiceError> {
    let skills = state.store.list_skills().await?;
    let timeslots = state.store.list_available_slots().await?;

    let mut ctx = page_context(current_user.0.as_ref());
    ctx.insert("skills", &skills);
    ctx.insert("timeslots", &timeslots);
    ctx.insert(
        "today",
        &Utc::now().date_naive().format(DATE_FORMAT).to_string(),
    );
    render_page(&state, "home.html", &ctx)
}

// === GET /dashboard ===
#[get("/dashboard")]
pub async fn home_user_handler(
    state: web::Data<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id();
    log::debug!("Rendering dashboard for user {}", user_uuid);

    let skills = state.store.list_skills_by_user(user_uuid).await?;
    let help_requests = state.store.list_help_requests_by_user(user_uuid).await?;
    let time_slots = state.store.list_slots_by_user(user_uuid).await?;

    let mut ctx = page_context(Some(&authenticated_user.0));
    ctx.insert("skills", &skills);
    ctx.insert("help_requests", &help_requests);
    ctx.insert("time_slots", &time_slots);
    render_page(&state, "home_user.html", &ctx)
}
