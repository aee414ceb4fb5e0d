use super::{page_context, redirect, render_page, render_page_with_status, DASHBOARD_PATH};
use crate::auth_utils::{AuthenticatedUser, CurrentUser};
use crate::error_handler::ServiceError;
use crate::forms::{parse_date, FormErrors, TimeSlotForm, INVALID_SKILL};
use crate::models::{ReserveOutcome, TimeSlot};
use crate::state::AppState;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

pub const INVALID_DATE_MESSAGE: &str =
    "Invalid date format. Please enter a date in YYYY-MM-DD format.";
pub const ALREADY_RESERVED_MESSAGE: &str = "This slot is already reserved.";

async fn proposition_page(
    state: &AppState,
    authenticated_user: &AuthenticatedUser,
    form: &TimeSlotForm,
    errors: &FormErrors,
) -> Result<HttpResponse, ServiceError> {
    let skills = state.store.list_skills().await?;

    let mut ctx = page_context(Some(&authenticated_user.0));
    ctx.insert("skills", &skills);
    ctx.insert("values", form);
    ctx.insert("errors", errors);
    render_page(state, "create_new_proposition.html", &ctx)
}

// Ids in the URL that do not parse can never match a record
fn parse_id(raw: &str, what: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound(format!("{} {} not found", what, raw)))
}

// === GET /propositions/new ===
#[get("/propositions/new")]
pub async fn new_proposition_form_handler(
    state: web::Data<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    proposition_page(
        &state,
        &authenticated_user,
        &TimeSlotForm::default(),
        &FormErrors::default(),
    )
    .await
}

// === POST /propositions/new ===
#[post("/propositions/new")]
pub async fn create_new_proposition_handler(
    state: web::Data<AppState>,
    authenticated_user: AuthenticatedUser,
    form: web::Form<TimeSlotForm>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();

    // The proposer always comes from the session
    let new_slot = match form.clean(authenticated_user.id()) {
        Ok(new_slot) => new_slot,
        Err(errors) => return proposition_page(&state, &authenticated_user, &form, &errors).await,
    };

    if state.store.get_skill(new_slot.skill_id).await?.is_none() {
        let mut errors = FormErrors::default();
        errors.add("skill_id", INVALID_SKILL);
        return proposition_page(&state, &authenticated_user, &form, &errors).await;
    }

    let slot = state.store.create_time_slot(new_slot).await?;
    log::info!(
        "User {} proposed time slot {} for skill {} on {}",
        authenticated_user.id(),
        slot.id,
        slot.skill_id,
        slot.date
    );
    Ok(redirect(DASHBOARD_PATH))
}

// === GET /skills/{skill_id}/slots/{date} ===
#[get("/skills/{skill_id}/slots/{date}")]
pub async fn find_slots_handler(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (raw_skill_id, raw_date) = path.into_inner();
    let skill_id = parse_id(&raw_skill_id, "Skill")?;

    let skill = state
        .store
        .get_skill(skill_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Skill {} not found", skill_id)))?;

    // A malformed date is answered with the page and an inline message
    let date = parse_date(&raw_date);
    let (available_slots, error_message) = match date {
        Some(date) => (state.store.find_available_slots(skill.id, date).await?, None),
        None => {
            log::debug!("Rejected date '{}' in slot search", raw_date);
            (Vec::<TimeSlot>::new(), Some(INVALID_DATE_MESSAGE))
        }
    };

    let mut ctx = page_context(current_user.0.as_ref());
    ctx.insert("skill", &skill);
    ctx.insert("date", &date);
    ctx.insert("available_slots", &available_slots);
    ctx.insert("error_message", &error_message);
    render_page(&state, "find_slots.html", &ctx)
}

// === POST /slots/{slot_id}/reserve ===
#[post("/slots/{slot_id}/reserve")]
pub async fn reserve_slot_handler(
    state: web::Data<AppState>,
    authenticated_user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let slot_id = parse_id(&path.into_inner(), "Time slot")?;
    let user_uuid = authenticated_user.id();

    match state.store.reserve_slot(slot_id, user_uuid).await? {
        ReserveOutcome::Reserved(reservation) => {
            log::info!(
                "User {} reserved time slot {} (reservation {})",
                user_uuid,
                slot_id,
                reservation.id
            );
            Ok(redirect("/history"))
        }
        ReserveOutcome::AlreadyReserved => {
            log::info!(
                "User {} tried to reserve time slot {} which is already taken",
                user_uuid,
                slot_id
            );
            let mut ctx = page_context(Some(&authenticated_user.0));
            ctx.insert("message", ALREADY_RESERVED_MESSAGE);
            render_page_with_status(&state, StatusCode::CONFLICT, "error.html", &ctx)
        }
        ReserveOutcome::SlotNotFound => Err(ServiceError::NotFound(format!(
            "Time slot {} not found",
            slot_id
        ))),
    }
}
