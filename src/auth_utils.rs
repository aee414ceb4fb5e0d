use crate::error_handler::ServiceError;
use crate::models::{Session, User};
use crate::state::AppState;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::Method;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "allo_session";

/// The caller's user, if the request carries a live session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// A logged-in caller. Anonymous requests are turned away with a redirect
/// to the login form.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, ServiceError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        log::error!("AppState is not registered on the application");
        ServiceError::InternalServerError("Application state missing".to_string())
    })
}

async fn session_user(req: &HttpRequest) -> Result<Option<User>, ServiceError> {
    let cookie = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie,
        None => return Ok(None),
    };

    let token = match Uuid::parse_str(cookie.value()) {
        Ok(token) => token,
        Err(parse_err) => {
            log::warn!("Ignoring malformed session cookie: {}", parse_err);
            return Ok(None);
        }
    };

    let state = app_state(req)?;
    let user = state.store.find_session_user(token, Utc::now()).await?;
    if user.is_none() {
        log::debug!("Session cookie does not match a live session");
    }
    Ok(user)
}

impl FromRequest for CurrentUser {
    type Error = ServiceError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { Ok(CurrentUser(session_user(&req).await?)) })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match session_user(&req).await? {
                Some(user) => Ok(AuthenticatedUser(user)),
                None => {
                    // Only a GET can be replayed after logging in
                    let next = (req.method() == Method::GET).then(|| {
                        req.uri()
                            .path_and_query()
                            .map(|pq| pq.as_str().to_string())
                            .unwrap_or_else(|| req.path().to_string())
                    });
                    Err(ServiceError::LoginRequired { next })
                }
            }
        })
    }
}

/// Opens a session for `user` and returns the cookie carrying its token.
pub async fn start_session(state: &AppState, user: &User) -> Result<Cookie<'static>, ServiceError> {
    let now = Utc::now();
    let session = state
        .store
        .create_session(Session {
            token: Uuid::new_v4(),
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::hours(state.settings.session_ttl_hours),
        })
        .await?;

    log::info!("User {} logged in", user.id);
    Ok(Cookie::build(SESSION_COOKIE, session.token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.settings.secure_cookies)
        .finish())
}

/// Deletes the session named by the request cookie, if any, and returns the
/// cookie that clears it in the browser.
pub async fn end_session(state: &AppState, req: &HttpRequest) -> Result<Cookie<'static>, ServiceError> {
    if let Some(token) = req
        .cookie(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        state.store.delete_session(token).await?;
        log::info!("Session {} closed", token);
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();
    Ok(removal)
}

/// `next` is honoured only when it is a path on this site.
pub fn safe_redirect_target(next: &str) -> Option<&str> {
    let local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    local.then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_paths_are_followed() {
        assert_eq!(safe_redirect_target("/history"), Some("/history"));
        assert_eq!(safe_redirect_target("//evil.example"), None);
        assert_eq!(safe_redirect_target("https://evil.example"), None);
        assert_eq!(safe_redirect_target("/\\evil.example"), None);
        assert_eq!(safe_redirect_target(""), None);
    }
}
