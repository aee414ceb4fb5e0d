use super::{
    HelpRequestRepository, RepoResult, ReservationRepository, SessionRepository, SkillRepository,
    Store, TimeSlotRepository, UserRepository,
};
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    HelpRequest, NewHelpRequest, NewReservation, NewSkill, NewTimeSlot, NewUser, Reservation,
    ReservationDetail, ReserveOutcome, Session, Skill, SlotListing, TimeSlot, User,
};
use crate::schema::{help_requests, reservations, sessions, skills, time_slots, users};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

/// PostgreSQL store over the bb8 pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, new_user: NewUser) -> RepoResult<User> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result::<User>(&mut conn)
            .await
            .map_err(|db_err| match db_err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ServiceError::BadRequest(format!(
                        "Username '{}' is already taken",
                        new_user.username
                    ))
                }
                _ => ServiceError::from(db_err),
            })
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut conn = self.pool.get().await?;

        Ok(users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first::<User>(&mut conn)
            .await
            .optional()?)
    }
}

#[async_trait]
impl SessionRepository for PgStore {
    async fn create_session(&self, session: Session) -> RepoResult<Session> {
        let mut conn = self.pool.get().await?;

        // Purge des sessions expirées
        let purged =
            diesel::delete(sessions::table.filter(sessions::expires_at.le(session.created_at)))
                .execute(&mut conn)
                .await?;
        if purged > 0 {
            log::debug!("Purged {} expired sessions", purged);
        }

        Ok(diesel::insert_into(sessions::table)
            .values(&session)
            .returning(Session::as_returning())
            .get_result::<Session>(&mut conn)
            .await?)
    }

    async fn find_session_user(
        &self,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<User>> {
        let mut conn = self.pool.get().await?;

        Ok(sessions::table
            .inner_join(users::table)
            .filter(sessions::token.eq(token))
            .filter(sessions::expires_at.gt(now))
            .select(User::as_select())
            .first::<User>(&mut conn)
            .await
            .optional()?)
    }

    async fn delete_session(&self, token: Uuid) -> RepoResult<()> {
        let mut conn = self.pool.get().await?;

        diesel::delete(sessions::table.filter(sessions::token.eq(token)))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SkillRepository for PgStore {
    async fn create_skill(&self, new_skill: NewSkill) -> RepoResult<Skill> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::insert_into(skills::table)
            .values(&new_skill)
            .returning(Skill::as_returning())
            .get_result::<Skill>(&mut conn)
            .await?)
    }

    async fn get_skill(&self, skill_id: Uuid) -> RepoResult<Option<Skill>> {
        let mut conn = self.pool.get().await?;

        Ok(skills::table
            .filter(skills::id.eq(skill_id))
            .select(Skill::as_select())
            .first::<Skill>(&mut conn)
            .await
            .optional()?)
    }

    async fn list_skills(&self) -> RepoResult<Vec<Skill>> {
        let mut conn = self.pool.get().await?;

        Ok(skills::table
            .order((skills::name.asc(), skills::created_at.asc()))
            .select(Skill::as_select())
            .load::<Skill>(&mut conn)
            .await?)
    }

    async fn list_skills_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Skill>> {
        let mut conn = self.pool.get().await?;

        Ok(skills::table
            .filter(skills::user_id.eq(user_id))
            .order((skills::name.asc(), skills::created_at.asc()))
            .select(Skill::as_select())
            .load::<Skill>(&mut conn)
            .await?)
    }
}

#[async_trait]
impl HelpRequestRepository for PgStore {
    async fn create_help_request(&self, new_request: NewHelpRequest) -> RepoResult<HelpRequest> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::insert_into(help_requests::table)
            .values(&new_request)
            .returning(HelpRequest::as_returning())
            .get_result::<HelpRequest>(&mut conn)
            .await?)
    }

    async fn list_help_requests_by_user(&self, user_id: Uuid) -> RepoResult<Vec<HelpRequest>> {
        let mut conn = self.pool.get().await?;

        Ok(help_requests::table
            .filter(help_requests::user_id.eq(user_id))
            .order(help_requests::created_at.desc())
            .select(HelpRequest::as_select())
            .load::<HelpRequest>(&mut conn)
            .await?)
    }
}

#[async_trait]
impl TimeSlotRepository for PgStore {
    async fn create_time_slot(&self, new_slot: NewTimeSlot) -> RepoResult<TimeSlot> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(time_slots::table)
            .values(&new_slot)
            .returning(TimeSlot::as_returning())
            .get_result::<TimeSlot>(&mut conn)
            .await
            .map_err(|db_err| match db_err {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    ServiceError::NotFound(format!(
                        "Skill with id {} not found",
                        new_slot.skill_id
                    ))
                }
                _ => ServiceError::from(db_err),
            })
    }

    async fn get_time_slot(&self, slot_id: Uuid) -> RepoResult<Option<TimeSlot>> {
        let mut conn = self.pool.get().await?;

        Ok(time_slots::table
            .filter(time_slots::id.eq(slot_id))
            .select(TimeSlot::as_select())
            .first::<TimeSlot>(&mut conn)
            .await
            .optional()?)
    }

    async fn list_available_slots(&self) -> RepoResult<Vec<SlotListing>> {
        let mut conn = self.pool.get().await?;

        let rows = time_slots::table
            .inner_join(skills::table)
            .filter(time_slots::is_available.eq(true))
            .order((time_slots::date.asc(), time_slots::start_time.asc()))
            .select((TimeSlot::as_select(), Skill::as_select()))
            .load::<(TimeSlot, Skill)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(slot, skill)| SlotListing { slot, skill })
            .collect())
    }

    async fn list_slots_by_user(&self, user_id: Uuid) -> RepoResult<Vec<SlotListing>> {
        let mut conn = self.pool.get().await?;

        let rows = time_slots::table
            .inner_join(skills::table)
            .filter(time_slots::user_id.eq(user_id))
            .order((time_slots::date.asc(), time_slots::start_time.asc()))
            .select((TimeSlot::as_select(), Skill::as_select()))
            .load::<(TimeSlot, Skill)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(slot, skill)| SlotListing { slot, skill })
            .collect())
    }

    async fn find_available_slots(
        &self,
        skill_id: Uuid,
        date: NaiveDate,
    ) -> RepoResult<Vec<TimeSlot>> {
        let mut conn = self.pool.get().await?;

        Ok(time_slots::table
            .filter(time_slots::skill_id.eq(skill_id))
            .filter(time_slots::date.eq(date))
            .filter(time_slots::is_available.eq(true))
            .order(time_slots::start_time.asc())
            .select(TimeSlot::as_select())
            .load::<TimeSlot>(&mut conn)
            .await?)
    }

    async fn reserve_slot(&self, slot_id: Uuid, user_id: Uuid) -> RepoResult<ReserveOutcome> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, ServiceError, _>(|conn| {
            async move {
                // Conditional write: only one transaction can flip the flag.
                let claimed = diesel::update(
                    time_slots::table
                        .filter(time_slots::id.eq(slot_id))
                        .filter(time_slots::is_available.eq(true)),
                )
                .set(time_slots::is_available.eq(false))
                .returning(time_slots::id)
                .get_result::<Uuid>(conn)
                .await
                .optional()?;

                if claimed.is_none() {
                    let exists = time_slots::table
                        .filter(time_slots::id.eq(slot_id))
                        .select(time_slots::id)
                        .first::<Uuid>(conn)
                        .await
                        .optional()?;
                    return Ok(match exists {
                        Some(_) => ReserveOutcome::AlreadyReserved,
                        None => ReserveOutcome::SlotNotFound,
                    });
                }

                let reservation = diesel::insert_into(reservations::table)
                    .values(&NewReservation {
                        time_slot_id: slot_id,
                        user_id,
                    })
                    .returning(Reservation::as_returning())
                    .get_result::<Reservation>(conn)
                    .await?;

                Ok(ReserveOutcome::Reserved(reservation))
            }
            .scope_boxed()
        })
        .await
    }
}

#[async_trait]
impl ReservationRepository for PgStore {
    async fn list_reservations_for_user(
        &self,
        user_id: Uuid,
    ) -> RepoResult<Vec<ReservationDetail>> {
        let mut conn = self.pool.get().await?;

        let rows = reservations::table
            .inner_join(time_slots::table.inner_join(skills::table))
            .filter(reservations::user_id.eq(user_id))
            .order(reservations::created_at.desc())
            .select((
                Reservation::as_select(),
                TimeSlot::as_select(),
                Skill::as_select(),
            ))
            .load::<(Reservation, TimeSlot, Skill)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(reservation, time_slot, skill)| ReservationDetail {
                reservation,
                time_slot,
                skill,
            })
            .collect())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> RepoResult<()> {
        // Test de connexion au pool
        let _conn = self.pool.get().await?;
        Ok(())
    }
}
