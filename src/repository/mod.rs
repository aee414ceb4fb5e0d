//! Data access, one trait per entity.
//!
//! Handlers only see `dyn Store`; [`PgStore`] backs it in production and
//! [`MemoryStore`] in tests and `STORAGE=memory` runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error_handler::ServiceError;
use crate::models::{
    HelpRequest, NewHelpRequest, NewSkill, NewTimeSlot, NewUser, ReservationDetail,
    ReserveOutcome, Session, Skill, SlotListing, TimeSlot, User,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, ServiceError>;

#[async_trait]
pub trait UserRepository {
    /// Fails with `BadRequest` when the username is taken.
    async fn create_user(&self, new_user: NewUser) -> RepoResult<User>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

#[async_trait]
pub trait SessionRepository {
    async fn create_session(&self, session: Session) -> RepoResult<Session>;
    /// Resolves a cookie token; expired sessions resolve to `None`.
    async fn find_session_user(&self, token: Uuid, now: DateTime<Utc>)
        -> RepoResult<Option<User>>;
    async fn delete_session(&self, token: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait SkillRepository {
    async fn create_skill(&self, new_skill: NewSkill) -> RepoResult<Skill>;
    async fn get_skill(&self, skill_id: Uuid) -> RepoResult<Option<Skill>>;
    async fn list_skills(&self) -> RepoResult<Vec<Skill>>;
    async fn list_skills_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Skill>>;
}

#[async_trait]
pub trait HelpRequestRepository {
    async fn create_help_request(&self, new_request: NewHelpRequest) -> RepoResult<HelpRequest>;
    async fn list_help_requests_by_user(&self, user_id: Uuid) -> RepoResult<Vec<HelpRequest>>;
}

#[async_trait]
pub trait TimeSlotRepository {
    async fn create_time_slot(&self, new_slot: NewTimeSlot) -> RepoResult<TimeSlot>;
    async fn get_time_slot(&self, slot_id: Uuid) -> RepoResult<Option<TimeSlot>>;
    /// Every available slot with its skill, by date then start time.
    async fn list_available_slots(&self) -> RepoResult<Vec<SlotListing>>;
    async fn list_slots_by_user(&self, user_id: Uuid) -> RepoResult<Vec<SlotListing>>;
    async fn find_available_slots(
        &self,
        skill_id: Uuid,
        date: NaiveDate,
    ) -> RepoResult<Vec<TimeSlot>>;
    /// Marks the slot unavailable and records the reservation, only if the
    /// slot was still available. Both writes happen or neither does.
    async fn reserve_slot(&self, slot_id: Uuid, user_id: Uuid) -> RepoResult<ReserveOutcome>;
}

#[async_trait]
pub trait ReservationRepository {
    /// The user's reservations, newest first.
    async fn list_reservations_for_user(
        &self,
        user_id: Uuid,
    ) -> RepoResult<Vec<ReservationDetail>>;
}

#[async_trait]
pub trait Store:
    UserRepository
    + SessionRepository
    + SkillRepository
    + HelpRequestRepository
    + TimeSlotRepository
    + ReservationRepository
    + Send
    + Sync
{
    async fn health_check(&self) -> RepoResult<()>;
}
