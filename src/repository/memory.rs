use super::{
    HelpRequestRepository, RepoResult, ReservationRepository, SessionRepository, SkillRepository,
    Store, TimeSlotRepository, UserRepository,
};
use crate::error_handler::ServiceError;
use crate::models::{
    HelpRequest, NewHelpRequest, NewSkill, NewTimeSlot, NewUser, Reservation, ReservationDetail,
    ReserveOutcome, Session, Skill, SlotListing, TimeSlot, User,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
    skills: HashMap<Uuid, Skill>,
    help_requests: HashMap<Uuid, HelpRequest>,
    time_slots: HashMap<Uuid, TimeSlot>,
    reservations: HashMap<Uuid, Reservation>,
}

impl Tables {
    fn listing(&self, slot: &TimeSlot) -> Option<SlotListing> {
        self.skills.get(&slot.skill_id).map(|skill| SlotListing {
            slot: slot.clone(),
            skill: skill.clone(),
        })
    }
}

/// In-process store. All tables sit behind one lock, so every operation is
/// atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reservation_count(&self) -> usize {
        self.tables.read().reservations.len()
    }
}

fn sort_listings(listings: &mut [SlotListing]) {
    listings.sort_by(|a, b| {
        (a.slot.date, a.slot.start_time, a.slot.created_at).cmp(&(
            b.slot.date,
            b.slot.start_time,
            b.slot.created_at,
        ))
    });
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.username == new_user.username) {
            return Err(ServiceError::BadRequest(format!(
                "Username '{}' is already taken",
                new_user.username
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create_session(&self, session: Session) -> RepoResult<Session> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&session.user_id) {
            return Err(ServiceError::NotFound(format!(
                "User with id {} not found",
                session.user_id
            )));
        }
        // Purge des sessions expirées
        let now = session.created_at;
        tables.sessions.retain(|_, s| !s.is_expired(now));
        tables.sessions.insert(session.token, session.clone());
        Ok(session)
    }

    async fn find_session_user(
        &self,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<User>> {
        let tables = self.tables.read();
        Ok(tables
            .sessions
            .get(&token)
            .filter(|s| !s.is_expired(now))
            .and_then(|s| tables.users.get(&s.user_id))
            .cloned())
    }

    async fn delete_session(&self, token: Uuid) -> RepoResult<()> {
        self.tables.write().sessions.remove(&token);
        Ok(())
    }
}

#[async_trait]
impl SkillRepository for MemoryStore {
    async fn create_skill(&self, new_skill: NewSkill) -> RepoResult<Skill> {
        let skill = Skill {
            id: Uuid::new_v4(),
            user_id: new_skill.user_id,
            name: new_skill.name,
            description: new_skill.description,
            created_at: Utc::now(),
        };
        self.tables.write().skills.insert(skill.id, skill.clone());
        Ok(skill)
    }

    async fn get_skill(&self, skill_id: Uuid) -> RepoResult<Option<Skill>> {
        Ok(self.tables.read().skills.get(&skill_id).cloned())
    }

    async fn list_skills(&self) -> RepoResult<Vec<Skill>> {
        let mut skills: Vec<Skill> = self.tables.read().skills.values().cloned().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(skills)
    }

    async fn list_skills_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Skill>> {
        let mut skills: Vec<Skill> = self
            .tables
            .read()
            .skills
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(skills)
    }
}

#[async_trait]
impl HelpRequestRepository for MemoryStore {
    async fn create_help_request(&self, new_request: NewHelpRequest) -> RepoResult<HelpRequest> {
        let request = HelpRequest {
            id: Uuid::new_v4(),
            user_id: new_request.user_id,
            title: new_request.title,
            description: new_request.description,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .help_requests
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_help_requests_by_user(&self, user_id: Uuid) -> RepoResult<Vec<HelpRequest>> {
        let mut requests: Vec<HelpRequest> = self
            .tables
            .read()
            .help_requests
            .values()
            .filter(|r| r.user_id == Some(user_id))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

#[async_trait]
impl TimeSlotRepository for MemoryStore {
    async fn create_time_slot(&self, new_slot: NewTimeSlot) -> RepoResult<TimeSlot> {
        let mut tables = self.tables.write();
        // Mirrors the foreign key on time_slots.skill_id
        if !tables.skills.contains_key(&new_slot.skill_id) {
            return Err(ServiceError::NotFound(format!(
                "Skill with id {} not found",
                new_slot.skill_id
            )));
        }
        let slot = TimeSlot {
            id: Uuid::new_v4(),
            user_id: new_slot.user_id,
            skill_id: new_slot.skill_id,
            date: new_slot.date,
            start_time: new_slot.start_time,
            end_time: new_slot.end_time,
            is_available: true,
            created_at: Utc::now(),
        };
        tables.time_slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn get_time_slot(&self, slot_id: Uuid) -> RepoResult<Option<TimeSlot>> {
        Ok(self.tables.read().time_slots.get(&slot_id).cloned())
    }

    async fn list_available_slots(&self) -> RepoResult<Vec<SlotListing>> {
        let tables = self.tables.read();
        let mut listings: Vec<SlotListing> = tables
            .time_slots
            .values()
            .filter(|s| s.is_available)
            .filter_map(|s| tables.listing(s))
            .collect();
        sort_listings(&mut listings);
        Ok(listings)
    }

    async fn list_slots_by_user(&self, user_id: Uuid) -> RepoResult<Vec<SlotListing>> {
        let tables = self.tables.read();
        let mut listings: Vec<SlotListing> = tables
            .time_slots
            .values()
            .filter(|s| s.user_id == user_id)
            .filter_map(|s| tables.listing(s))
            .collect();
        sort_listings(&mut listings);
        Ok(listings)
    }

    async fn find_available_slots(
        &self,
        skill_id: Uuid,
        date: NaiveDate,
    ) -> RepoResult<Vec<TimeSlot>> {
        let mut slots: Vec<TimeSlot> = self
            .tables
            .read()
            .time_slots
            .values()
            .filter(|s| s.skill_id == skill_id && s.date == date && s.is_available)
            .cloned()
            .collect();
        slots.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(slots)
    }

    async fn reserve_slot(&self, slot_id: Uuid, user_id: Uuid) -> RepoResult<ReserveOutcome> {
        let mut tables = self.tables.write();
        let slot = match tables.time_slots.get_mut(&slot_id) {
            Some(slot) => slot,
            None => return Ok(ReserveOutcome::SlotNotFound),
        };
        if !slot.is_available {
            return Ok(ReserveOutcome::AlreadyReserved);
        }
        slot.is_available = false;

        let reservation = Reservation {
            id: Uuid::new_v4(),
            time_slot_id: slot_id,
            user_id,
            created_at: Utc::now(),
        };
        tables
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(ReserveOutcome::Reserved(reservation))
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn list_reservations_for_user(
        &self,
        user_id: Uuid,
    ) -> RepoResult<Vec<ReservationDetail>> {
        let tables = self.tables.read();
        let mut details: Vec<ReservationDetail> = tables
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                let time_slot = tables.time_slots.get(&r.time_slot_id)?;
                let skill = tables.skills.get(&time_slot.skill_id)?;
                Some(ReservationDetail {
                    reservation: r.clone(),
                    time_slot: time_slot.clone(),
                    skill: skill.clone(),
                })
            })
            .collect();
        details.sort_by(|a, b| b.reservation.created_at.cmp(&a.reservation.created_at));
        Ok(details)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> RepoResult<()> {
        Ok(())
    }
}
