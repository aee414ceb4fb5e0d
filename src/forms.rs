//! Submitted field sets and their validation.
//!
//! Every form field is a plain string so that a bad submission still
//! deserializes and can be shown back to the user with its errors. `clean`
//! trims, validates and converts a form into the record to insert; owner ids
//! are always passed in by the handler, never read from the form.

use crate::models::{NewHelpRequest, NewSkill, NewTimeSlot};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const INVALID_SKILL: &str = "Select a valid skill.";
const INVALID_DATE: &str = "Enter a valid date (YYYY-MM-DD).";
const INVALID_TIME: &str = "Enter a valid time (HH:MM).";

/// Field name → messages, in the shape the templates read.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn from_validation(result: Result<(), ValidationErrors>) -> Self {
        let mut errors = FormErrors::default();
        if let Err(validation) = result {
            for (field, field_errors) in validation.field_errors() {
                for error in field_errors.iter() {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => error.code.to_string(),
                    };
                    errors.add(&field, message);
                }
            }
        }
        errors
    }

    fn into_result<T>(self, value: Option<T>) -> Result<T, FormErrors> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

/// Strict `YYYY-MM-DD`: a four-digit year from 0001, then one or two digit
/// month and day. chrono alone would also take signs and leading spaces.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(year, 4, 4) || !digits(month, 1, 2) || !digits(day, 1, 2) || year == "0000" {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

// <input type="time"> sends HH:MM, some browsers add seconds
fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn parse_field<T>(
    errors: &mut FormErrors,
    field: &str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
    message: &str,
) -> Option<T> {
    if errors.contains(field) {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        errors.add(field, message);
    }
    parsed
}

// --- Skill ---

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct SkillForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Enter a name of 1 to 100 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Keep the description under 1000 characters."))]
    pub description: String,
}

impl SkillForm {
    pub fn clean(&self, user_id: Uuid) -> Result<NewSkill, FormErrors> {
        let form = SkillForm {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        FormErrors::from_validation(form.validate()).into_result(Some(NewSkill {
            user_id,
            name: form.name,
            description: form.description,
        }))
    }
}

// --- HelpRequest ---

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct HelpRequestForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Enter a title of 1 to 150 characters."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Describe what you need in 1 to 2000 characters."
    ))]
    pub description: String,
}

impl HelpRequestForm {
    pub fn clean(&self, user_id: Option<Uuid>) -> Result<NewHelpRequest, FormErrors> {
        let form = HelpRequestForm {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        FormErrors::from_validation(form.validate()).into_result(Some(NewHelpRequest {
            user_id,
            title: form.title,
            description: form.description,
        }))
    }
}

// --- TimeSlot ---

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct TimeSlotForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub skill_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub start_time: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub end_time: String,
}

impl TimeSlotForm {
    /// Checks formats only; whether the skill exists is up to the caller.
    pub fn clean(&self, user_id: Uuid) -> Result<NewTimeSlot, FormErrors> {
        let form = TimeSlotForm {
            skill_id: self.skill_id.trim().to_string(),
            date: self.date.trim().to_string(),
            start_time: self.start_time.trim().to_string(),
            end_time: self.end_time.trim().to_string(),
        };
        let mut errors = FormErrors::from_validation(form.validate());

        let skill_id = parse_field(
            &mut errors,
            "skill_id",
            &form.skill_id,
            |raw| Uuid::parse_str(raw).ok(),
            INVALID_SKILL,
        );
        let date = parse_field(&mut errors, "date", &form.date, parse_date, INVALID_DATE);
        let start_time = parse_field(
            &mut errors,
            "start_time",
            &form.start_time,
            parse_time,
            INVALID_TIME,
        );
        let end_time = parse_field(
            &mut errors,
            "end_time",
            &form.end_time,
            parse_time,
            INVALID_TIME,
        );

        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end <= start {
                errors.add("end_time", "End time must be after start time.");
            }
        }

        let slot = match (skill_id, date, start_time, end_time) {
            (Some(skill_id), Some(date), Some(start_time), Some(end_time)) => Some(NewTimeSlot {
                user_id,
                skill_id,
                date,
                start_time,
                end_time,
            }),
            _ => None,
        };
        errors.into_result(slot)
    }
}

// --- Login ---

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[serde(default, skip_serializing)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    /// Local path to return to after logging in.
    #[serde(default)]
    pub next: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        let form = LoginForm {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            next: String::new(),
        };
        FormErrors::from_validation(form.validate())
            .into_result(Some((form.username, form.password)))
    }
}

// --- Signup ---

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Enter a username of 1 to 150 characters."))]
    pub username: String,
    #[serde(default, skip_serializing)]
    #[validate(length(min = 8, max = 128, message = "Use 8 to 128 characters."))]
    pub password: String,
    #[serde(default, skip_serializing)]
    #[validate(must_match(other = "password", message = "The two passwords do not match."))]
    pub password_confirm: String,
}

impl SignupForm {
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        let form = SignupForm {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
        };
        let mut errors = FormErrors::from_validation(form.validate());

        let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
        if !errors.contains("username") && !form.username.chars().all(allowed) {
            errors.add(
                "username",
                "Use only letters, digits and the characters @ . + - _",
            );
        }
        errors.into_result(Some((form.username, form.password)))
    }
}
