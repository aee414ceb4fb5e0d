//! Page rendering.
//!
//! Handlers build a [`tera::Context`] and hand it to a [`Renderer`] together
//! with a template name. The production renderer is [`TeraRenderer`], whose
//! templates are compiled into the binary.

use crate::error_handler::ServiceError;
use tera::{Context, Tera};

pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, context: &Context) -> Result<String, ServiceError>;
}

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("home_user.html", include_str!("../templates/home_user.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("signup.html", include_str!("../templates/signup.html")),
    (
        "create_new_skill.html",
        include_str!("../templates/create_new_skill.html"),
    ),
    (
        "create_new_request.html",
        include_str!("../templates/create_new_request.html"),
    ),
    (
        "create_new_proposition.html",
        include_str!("../templates/create_new_proposition.html"),
    ),
    ("find_slots.html", include_str!("../templates/find_slots.html")),
    ("history.html", include_str!("../templates/history.html")),
    ("error.html", include_str!("../templates/error.html")),
];

pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    pub fn new() -> Result<Self, ServiceError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(TeraRenderer { tera })
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, template: &str, context: &Context) -> Result<String, ServiceError> {
        Ok(self.tera.render(template, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormErrors;
    use crate::models::{Reservation, ReservationDetail, Skill, SlotListing, TimeSlot, User};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "secret-hash".to_string(),
            created_at: Utc::now(),
        }
    }

    fn listing(owner: &User) -> SlotListing {
        let skill = Skill {
            id: Uuid::new_v4(),
            user_id: owner.id,
            name: "Bike repair".to_string(),
            description: "Brakes & gears".to_string(),
            created_at: Utc::now(),
        };
        let slot = TimeSlot {
            id: Uuid::new_v4(),
            user_id: owner.id,
            skill_id: skill.id,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            is_available: true,
            created_at: Utc::now(),
        };
        SlotListing { slot, skill }
    }

    #[test]
    fn all_templates_compile() {
        let renderer = TeraRenderer::new().unwrap();
        let names: Vec<&str> = renderer.tera.get_template_names().collect();
        assert_eq!(names.len(), TEMPLATES.len());
    }

    #[test]
    fn home_renders_listings_escaped() {
        let renderer = TeraRenderer::new().unwrap();
        let owner = user();
        let item = listing(&owner);

        let mut ctx = Context::new();
        ctx.insert("current_user", &None::<User>);
        ctx.insert("skills", &vec![item.skill.clone()]);
        ctx.insert("timeslots", &vec![item.clone()]);
        ctx.insert("today", "2024-01-01");

        let html = renderer.render("home.html", &ctx).unwrap();
        assert!(html.contains("Bike repair"));
        assert!(html.contains("Brakes &amp; gears"));
        assert!(html.contains(&format!("/slots/{}/reserve", item.slot.id)));
        assert!(html.contains("Log in"));
    }

    #[test]
    fn home_renders_empty_lists() {
        let renderer = TeraRenderer::new().unwrap();
        let mut ctx = Context::new();
        ctx.insert("current_user", &None::<User>);
        ctx.insert("skills", &Vec::<Skill>::new());
        ctx.insert("timeslots", &Vec::<SlotListing>::new());
        ctx.insert("today", "2024-01-01");

        let html = renderer.render("home.html", &ctx).unwrap();
        assert!(html.contains("No skills have been published yet."));
        assert!(html.contains("No time slots are available right now."));
    }

    #[test]
    fn form_errors_are_listed() {
        let renderer = TeraRenderer::new().unwrap();
        let mut errors = FormErrors::default();
        errors.add("name", "This field is required.");

        let mut ctx = Context::new();
        ctx.insert("current_user", &Some(user()));
        ctx.insert("values", &crate::forms::SkillForm::default());
        ctx.insert("errors", &errors);

        let html = renderer.render("create_new_skill.html", &ctx).unwrap();
        assert!(html.contains("This field is required."));
        assert!(html.contains("Signed in as alice"));
        assert!(!html.contains("secret-hash"));
    }

    #[test]
    fn find_slots_shows_inline_error() {
        let renderer = TeraRenderer::new().unwrap();
        let owner = user();
        let item = listing(&owner);

        let mut ctx = Context::new();
        ctx.insert("current_user", &None::<User>);
        ctx.insert("skill", &item.skill);
        ctx.insert("date", &None::<NaiveDate>);
        ctx.insert("available_slots", &Vec::<TimeSlot>::new());
        ctx.insert("error_message", "Invalid date format.");

        let html = renderer.render("find_slots.html", &ctx).unwrap();
        assert!(html.contains("Invalid date format."));
    }

    #[test]
    fn history_renders_reservations() {
        let renderer = TeraRenderer::new().unwrap();
        let owner = user();
        let item = listing(&owner);
        let detail = ReservationDetail {
            reservation: Reservation {
                id: Uuid::new_v4(),
                time_slot_id: item.slot.id,
                user_id: owner.id,
                created_at: Utc::now(),
            },
            time_slot: item.slot,
            skill: item.skill,
        };

        let mut ctx = Context::new();
        ctx.insert("current_user", &Some(owner));
        ctx.insert("reservations", &vec![detail]);

        let html = renderer.render("history.html", &ctx).unwrap();
        assert!(html.contains("Bike repair"));
        assert!(html.contains("2024-01-01"));
    }
}
