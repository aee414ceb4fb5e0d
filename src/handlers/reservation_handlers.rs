use super::{page_context, render_page};
use crate::auth_utils::AuthenticatedUser;
use crate::error_handler::ServiceError;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};

// === GET /history ===
#[get("/history")]
pub async fn history_handler(
    state: web::Data<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let reservations = state
        .store
        .list_reservations_for_user(authenticated_user.id())
        .await?;

    let mut ctx = page_context(Some(&authenticated_user.0));
    ctx.insert("reservations", &reservations);
    render_page(&state, "history.html", &ctx)
}
