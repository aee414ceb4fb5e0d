//! Shared fixtures for the HTTP tests.
//!
//! Pages are rendered by [`ContextRenderer`], which returns the template name
//! and the context as JSON so assertions can look at data instead of HTML.

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::{test, web};
use allo_aide::auth_utils::SESSION_COOKIE;
use allo_aide::config::Settings;
use allo_aide::error_handler::ServiceError;
use allo_aide::models::{NewSkill, NewTimeSlot, NewUser, Session, Skill, TimeSlot, User};
use allo_aide::render::Renderer;
use allo_aide::repository::{
    MemoryStore, SessionRepository, SkillRepository, TimeSlotRepository, UserRepository,
};
use allo_aide::state::AppState;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub struct ContextRenderer;

impl Renderer for ContextRenderer {
    fn render(&self, template: &str, context: &tera::Context) -> Result<String, ServiceError> {
        let page = json!({
            "template": template,
            "context": context.clone().into_json(),
        });
        Ok(page.to_string())
    }
}

pub fn test_state(store: Arc<MemoryStore>) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        store,
        Arc::new(ContextRenderer),
        Settings::default(),
    ))
}

/// Builds the application over `store`; expands to an awaited service.
macro_rules! init_app {
    ($store:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(common::test_state($store))
                .configure(allo_aide::routes::configure),
        )
        .await
    };
}

/// A user whose password is never checked; log in with [`session_cookie`].
pub async fn create_user(store: &MemoryStore, username: &str) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            password_hash: "unusable".to_string(),
        })
        .await
        .unwrap()
}

pub async fn create_user_with_password(store: &MemoryStore, username: &str, password: &str) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            password_hash: allo_aide::password::hash_password(password).unwrap(),
        })
        .await
        .unwrap()
}

/// A live session cookie for `user`, opened directly in the store.
pub async fn session_cookie(store: &MemoryStore, user: &User) -> Cookie<'static> {
    let now = Utc::now();
    let session = store
        .create_session(Session {
            token: Uuid::new_v4(),
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::hours(1),
        })
        .await
        .unwrap();
    Cookie::new(SESSION_COOKIE, session.token.to_string())
}

pub async fn create_skill(store: &MemoryStore, owner: &User, name: &str) -> Skill {
    store
        .create_skill(NewSkill {
            user_id: owner.id,
            name: name.to_string(),
            description: String::new(),
        })
        .await
        .unwrap()
}

pub fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub async fn create_slot(
    store: &MemoryStore,
    owner: &User,
    skill: &Skill,
    date: &str,
    start_hour: u32,
) -> TimeSlot {
    store
        .create_time_slot(NewTimeSlot {
            user_id: owner.id,
            skill_id: skill.id,
            date: day(date),
            start_time: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(start_hour + 1, 0, 0).unwrap(),
        })
        .await
        .unwrap()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Body of a page rendered by [`ContextRenderer`].
pub async fn page<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("body is not a rendered page")
}
