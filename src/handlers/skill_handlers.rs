use super::{page_context, redirect, render_page, DASHBOARD_PATH};
use crate::auth_utils::AuthenticatedUser;
use crate::error_handler::ServiceError;
use crate::forms::{FormErrors, SkillForm};
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};

fn skill_page(
    state: &AppState,
    authenticated_user: &AuthenticatedUser,
    form: &SkillForm,
    errors: &FormErrors,
) -> Result<HttpResponse, ServiceError> {
    let mut ctx = page_context(Some(&authenticated_user.0));
    ctx.insert("values", form);
    ctx.insert("errors", errors);
    render_page(state, "create_new_skill.html", &ctx)
}

// === GET /skills/new ===
#[get("/skills/new")]
pub async fn new_skill_form_handler(
    state: web::Data<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    skill_page(
        &state,
        &authenticated_user,
        &SkillForm::default(),
        &FormErrors::default(),
    )
}

// === POST /skills/new ===
#[post("/skills/new")]
pub async fn create_new_skill_handler(
    state: web::Data<AppState>,
    authenticated_user: AuthenticatedUser,
    form: web::Form<SkillForm>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();

    // The owner always comes from the session
    let new_skill = match form.clean(authenticated_user.id()) {
        Ok(new_skill) => new_skill,
        Err(errors) => return skill_page(&state, &authenticated_user, &form, &errors),
    };

    let skill = state.store.create_skill(new_skill).await?;
    log::info!(
        "User {} created skill {} ('{}')",
        authenticated_user.id(),
        skill.id,
        skill.name
    );
    Ok(redirect(DASHBOARD_PATH))
}
