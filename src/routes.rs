use crate::handlers::{
    auth_handlers, health_handlers, help_request_handlers, page_handlers, reservation_handlers,
    skill_handlers, time_slot_handlers,
};
use actix_web::web;

/// Registers every page. The caller provides `web::Data<AppState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_handlers::health_check_handler)
        .service(page_handlers::home_handler)
        .service(page_handlers::home_user_handler)
        .service(auth_handlers::login_form_handler)
        .service(auth_handlers::login_handler)
        .service(auth_handlers::logout_handler)
        .service(auth_handlers::signup_form_handler)
        .service(auth_handlers::signup_handler)
        .service(skill_handlers::new_skill_form_handler)
        .service(skill_handlers::create_new_skill_handler)
        .service(help_request_handlers::new_request_form_handler)
        .service(help_request_handlers::create_new_request_handler)
        .service(time_slot_handlers::new_proposition_form_handler)
        .service(time_slot_handlers::create_new_proposition_handler)
        .service(time_slot_handlers::find_slots_handler)
        .service(time_slot_handlers::reserve_slot_handler)
        .service(reservation_handlers::history_handler);
}
