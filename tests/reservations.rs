#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use allo_aide::repository::{MemoryStore, TimeSlotRepository};
use common::{create_skill, create_slot, create_user, location, page, session_cookie};
use std::sync::Arc;
use uuid::Uuid;

#[actix_web::test]
async fn reserving_an_available_slot() {
    let store = Arc::new(MemoryStore::new());
    let owner = create_user(&store, "alice").await;
    let guest = create_user(&store, "bob").await;
    let skill = create_skill(&store, &owner, "Piano lessons").await;
    let slot = create_slot(&store, &owner, &skill, "2024-01-01", 9).await;
    let cookie = session_cookie(&store, &guest).await;
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/slots/{}/reserve", slot.id))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/history");
    assert_eq!(store.reservation_count(), 1);
    let slot = store.get_time_slot(slot.id).await.unwrap().unwrap();
    assert!(!slot.is_available);
}

#[actix_web::test]
async fn second_reservation_is_a_conflict() {
    let store = Arc::new(MemoryStore::new());
    let owner = create_user(&store, "alice").await;
    let first = create_user(&store, "bob").await;
    let second = create_user(&store, "carol").await;
    let skill = create_skill(&store, &owner, "Piano lessons").await;
    let slot = create_slot(&store, &owner, &skill, "2024-01-01", 9).await;
    let first_cookie = session_cookie(&store, &first).await;
    let second_cookie = session_cookie(&store, &second).await;
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/slots/{}/reserve", slot.id))
        .cookie(first_cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    for cookie in [second_cookie, first_cookie] {
        let req = test::TestRequest::post()
            .uri(&format!("/slots/{}/reserve", slot.id))
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let page = page(resp).await;
        assert_eq!(page["template"], "error.html");
        assert_eq!(
            page["context"]["message"],
            "This slot is already reserved."
        );
    }

    assert_eq!(store.reservation_count(), 1);
}

#[actix_web::test]
async fn reserving_a_missing_slot_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let guest = create_user(&store, "bob").await;
    let cookie = session_cookie(&store, &guest).await;
    let app = init_app!(store.clone());

    for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let req = test::TestRequest::post()
            .uri(&format!("/slots/{}/reserve", id))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
    assert_eq!(store.reservation_count(), 0);
}

#[actix_web::test]
async fn anonymous_reservation_redirects_to_login() {
    let store = Arc::new(MemoryStore::new());
    let owner = create_user(&store, "alice").await;
    let skill = create_skill(&store, &owner, "Piano lessons").await;
    let slot = create_slot(&store, &owner, &skill, "2024-01-01", 9).await;
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/slots/{}/reserve", slot.id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
    assert_eq!(store.reservation_count(), 0);
    assert!(store.get_time_slot(slot.id).await.unwrap().unwrap().is_available);
}

#[actix_web::test]
async fn history_lists_only_own_reservations() {
    let store = Arc::new(MemoryStore::new());
    let owner = create_user(&store, "alice").await;
    let bob = create_user(&store, "bob").await;
    let carol = create_user(&store, "carol").await;
    let skill = create_skill(&store, &owner, "Piano lessons").await;
    let bobs_slot = create_slot(&store, &owner, &skill, "2024-01-01", 9).await;
    let carols_slot = create_slot(&store, &owner, &skill, "2024-01-01", 11).await;
    store.reserve_slot(bobs_slot.id, bob.id).await.unwrap();
    store.reserve_slot(carols_slot.id, carol.id).await.unwrap();

    let bob_cookie = session_cookie(&store, &bob).await;
    let owner_cookie = session_cookie(&store, &owner).await;
    let app = init_app!(store.clone());

    let req = test::TestRequest::get()
        .uri("/history")
        .cookie(bob_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let history = page(resp).await;
    assert_eq!(history["template"], "history.html");
    let reservations = history["context"]["reservations"].as_array().unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(
        reservations[0]["time_slot"]["id"],
        bobs_slot.id.to_string()
    );
    assert_eq!(reservations[0]["skill"]["name"], "Piano lessons");
    assert_eq!(reservations[0]["reservation"]["user_id"], bob.id.to_string());

    // The slot owner has reserved nothing
    let req = test::TestRequest::get()
        .uri("/history")
        .cookie(owner_cookie)
        .to_request();
    let history = page(test::call_service(&app, req).await).await;
    assert_eq!(history["context"]["reservations"], serde_json::json!([]));
}

#[actix_web::test]
async fn history_requires_login() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(store.clone());

    let req = test::TestRequest::get().uri("/history").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?next=%2Fhistory");
}
