use super::{page_context, redirect, render_page, DASHBOARD_PATH};
use crate::auth_utils::CurrentUser;
use crate::error_handler::ServiceError;
use crate::forms::{FormErrors, HelpRequestForm};
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};

fn help_request_page(
    state: &AppState,
    current_user: &CurrentUser,
    form: &HelpRequestForm,
    errors: &FormErrors,
) -> Result<HttpResponse, ServiceError> {
    let mut ctx = page_context(current_user.0.as_ref());
    ctx.insert("values", form);
    ctx.insert("errors", errors);
    render_page(state, "create_new_request.html", &ctx)
}

// === GET /requests/new ===
#[get("/requests/new")]
pub async fn new_request_form_handler(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<HttpResponse, ServiceError> {
    help_request_page(
        &state,
        &current_user,
        &HelpRequestForm::default(),
        &FormErrors::default(),
    )
}

// === POST /requests/new ===
// Anonymous requests are accepted and stored without an owner.
#[post("/requests/new")]
pub async fn create_new_request_handler(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    form: web::Form<HelpRequestForm>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();
    let owner = current_user.0.as_ref().map(|user| user.id);

    let new_request = match form.clean(owner) {
        Ok(new_request) => new_request,
        Err(errors) => return help_request_page(&state, &current_user, &form, &errors),
    };

    let request = state.store.create_help_request(new_request).await?;
    log::info!(
        "Help request {} created (owner: {:?})",
        request.id,
        request.user_id
    );
    Ok(redirect(DASHBOARD_PATH))
}
