use super::{page_context, redirect, render_page, DASHBOARD_PATH};
use crate::auth_utils::{end_session, safe_redirect_target, start_session, CurrentUser};
use crate::error_handler::ServiceError;
use crate::forms::{FormErrors, LoginForm, SignupForm};
use crate::models::{NewUser, User};
use crate::password::{hash_password, verify_password};
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{get, post, route, web, HttpRequest, HttpResponse};
use serde::Deserialize;

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Deserialize, Debug, Default)]
pub struct NextQuery {
    #[serde(default)]
    pub next: String,
}

fn login_page(
    state: &AppState,
    current_user: Option<&User>,
    form: &LoginForm,
    errors: &FormErrors,
    error: Option<&str>,
) -> Result<HttpResponse, ServiceError> {
    let mut ctx = page_context(current_user);
    ctx.insert("values", form);
    ctx.insert("errors", errors);
    ctx.insert("error", &error);
    render_page(state, "login.html", &ctx)
}

async fn login_redirect(
    state: &AppState,
    user: &User,
    next: &str,
) -> Result<HttpResponse, ServiceError> {
    let cookie = start_session(state, user).await?;
    let target = safe_redirect_target(next).unwrap_or(DASHBOARD_PATH);
    Ok(HttpResponse::Found()
        .cookie(cookie)
        .insert_header((header::LOCATION, target))
        .finish())
}

// Argon2 blocks the thread; run it on the blocking pool.
async fn check_password(password: String, hash: String) -> Result<bool, ServiceError> {
    web::block(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            log::error!("Password verification task failed: {}", e);
            ServiceError::InternalServerError("Password verification failed".to_string())
        })?
}

async fn make_password_hash(password: String) -> Result<String, ServiceError> {
    web::block(move || hash_password(&password))
        .await
        .map_err(|e| {
            log::error!("Password hashing task failed: {}", e);
            ServiceError::InternalServerError("Password hashing failed".to_string())
        })?
}

// === GET /login ===
#[get("/login")]
pub async fn login_form_handler(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    query: web::Query<NextQuery>,
) -> Result<HttpResponse, ServiceError> {
    let form = LoginForm {
        next: query.into_inner().next,
        ..LoginForm::default()
    };
    login_page(
        &state,
        current_user.0.as_ref(),
        &form,
        &FormErrors::default(),
        None,
    )
}

// === POST /login ===
#[post("/login")]
pub async fn login_handler(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();

    let (username, password) = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return login_page(&state, current_user.0.as_ref(), &form, &errors, None);
        }
    };

    let user = match state.store.find_user_by_username(&username).await? {
        Some(user) => user,
        None => {
            log::warn!("Login attempt for unknown user '{}'", username);
            return login_page(
                &state,
                current_user.0.as_ref(),
                &form,
                &FormErrors::default(),
                Some(INVALID_CREDENTIALS),
            );
        }
    };

    if !check_password(password, user.password_hash.clone()).await? {
        log::warn!("Failed login for user {}", user.id);
        return login_page(
            &state,
            current_user.0.as_ref(),
            &form,
            &FormErrors::default(),
            Some(INVALID_CREDENTIALS),
        );
    }

    login_redirect(&state, &user, &form.next).await
}

// === GET|POST /logout ===
#[route("/logout", method = "GET", method = "POST")]
pub async fn logout_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let removal = end_session(&state, &req).await?;
    Ok(HttpResponse::Found()
        .cookie(removal)
        .insert_header((header::LOCATION, "/"))
        .finish())
}

fn signup_page(
    state: &AppState,
    current_user: Option<&User>,
    form: &SignupForm,
    errors: &FormErrors,
) -> Result<HttpResponse, ServiceError> {
    let mut ctx = page_context(current_user);
    ctx.insert("values", form);
    ctx.insert("errors", errors);
    render_page(state, "signup.html", &ctx)
}

// === GET /signup ===
#[get("/signup")]
pub async fn signup_form_handler(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<HttpResponse, ServiceError> {
    if current_user.0.is_some() {
        return Ok(redirect(DASHBOARD_PATH));
    }
    signup_page(&state, None, &SignupForm::default(), &FormErrors::default())
}

// === POST /signup ===
#[post("/signup")]
pub async fn signup_handler(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();

    let (username, password) = match form.clean() {
        Ok(fields) => fields,
        Err(errors) => return signup_page(&state, None, &form, &errors),
    };

    if state.store.find_user_by_username(&username).await?.is_some() {
        let mut errors = FormErrors::default();
        errors.add("username", "A user with that username already exists.");
        return signup_page(&state, None, &form, &errors);
    }

    let password_hash = make_password_hash(password).await?;
    let user = match state
        .store
        .create_user(NewUser {
            username,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        // Lost a race with another signup for the same name
        Err(ServiceError::BadRequest(_)) => {
            let mut errors = FormErrors::default();
            errors.add("username", "A user with that username already exists.");
            return signup_page(&state, None, &form, &errors);
        }
        Err(e) => return Err(e),
    };

    log::info!("User {} signed up as '{}'", user.id, user.username);
    login_redirect(&state, &user, DASHBOARD_PATH).await
}
