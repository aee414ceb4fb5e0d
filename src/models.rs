use crate::schema::{help_requests, reservations, sessions, skills, time_slots, users};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

// --- User Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

// --- Session Model ---
// Une ligne par connexion; le token est la valeur du cookie.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Session {
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// --- Skill Model ---
#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq,
)]
#[diesel(table_name = skills)]
#[diesel(belongs_to(User))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Skill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = skills)]
pub struct NewSkill {
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
}

// --- HelpRequest Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = help_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HelpRequest {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = help_requests)]
pub struct NewHelpRequest {
    pub user_id: Option<Uuid>,
    pub title: String,
    pub description: String,
}

// --- TimeSlot Model ---
#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq,
)]
#[diesel(table_name = time_slots)]
#[diesel(belongs_to(Skill))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimeSlot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

// is_available n'est pas inséré: la colonne vaut TRUE par défaut.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = time_slots)]
pub struct NewTimeSlot {
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

// --- Reservation Model ---
#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq,
)]
#[diesel(table_name = reservations)]
#[diesel(belongs_to(TimeSlot))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reservation {
    pub id: Uuid,
    pub time_slot_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub time_slot_id: Uuid,
    pub user_id: Uuid,
}

// --- Read models for the pages ---

/// A time slot together with the skill it is offered for.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlotListing {
    pub slot: TimeSlot,
    pub skill: Skill,
}

/// One line of the reservation history.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReservationDetail {
    pub reservation: Reservation,
    pub time_slot: TimeSlot,
    pub skill: Skill,
}

/// Result of the atomic "reserve if still available" operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReserveOutcome {
    Reserved(Reservation),
    AlreadyReserved,
    SlotNotFound,
}
