//! HTTP-level integration tests for the instance lifecycle: registration,
//! relocation, loans and who gets to see the renter.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_place, create_pomucka, get, get_as, post_json_as, put_json_as, staff,
};
use pomucky_core::roles::Role;
use pomucky_db::models::place::Place;
use pomucky_db::models::pomucka::Pomucka;
use sqlx::PgPool;

/// Two places with staff and one catalog entry.
struct World {
    owner: Place,
    host: Place,
    entry: Pomucka,
    owner_cookie: String,
    host_cookie: String,
    global_cookie: String,
}

async fn world(pool: &PgPool) -> World {
    let owner = create_place(pool, "Brno").await;
    let host = create_place(pool, "Praha").await;
    let entry = create_pomucka(pool, "Hmatový atlas", &[]).await;
    let (_o, owner_cookie) = staff(pool, "o@brno.cz", Role::Default, owner.id).await;
    let (_h, host_cookie) = staff(pool, "h@praha.cz", Role::Default, host.id).await;
    let (_g, global_cookie) = staff(pool, "g@brno.cz", Role::GlobalManager, owner.id).await;
    World {
        owner,
        host,
        entry,
        owner_cookie,
        host_cookie,
        global_cookie,
    }
}

fn renter() -> serde_json::Value {
    serde_json::json!({ "name": "Jan Novák", "identifier": "ZS-1234" })
}

/// Register an instance as the owner's staff and return its id.
async fn register(app: axum::Router, w: &World) -> i64 {
    let uri = format!("/pomucky/{}/instances", w.entry.id);
    let response = post_json_as(app, &uri, &w.owner_cookie, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_register_instances_for_own_place(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);

    let uri = format!("/pomucky/{}/instances", w.entry.id);
    let response = post_json_as(app, &uri, &w.owner_cookie, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["pomucka"], w.entry.id);
    assert_eq!(json["ownedBy"]["id"], w.owner.id);
    assert_eq!(json["currentlyAt"]["id"], w.owner.id);
    assert_eq!(json["ownedBy"]["name"], "Brno");
    assert_eq!(json["rentedBy"], false);
    assert!(json["currentlyAt"].get("banner").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn registering_for_another_place_needs_global_manager(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);

    let uri = format!("/pomucky/{}/instances?place={}", w.entry.id, w.host.id);
    let response = post_json_as(app.clone(), &uri, &w.owner_cookie, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "insufficient_role");

    let response = post_json_as(app.clone(), &uri, &w.global_cookie, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ownedBy"]["id"], w.host.id);
    assert_eq!(json["currentlyAt"]["id"], w.host.id);

    let uri = format!("/pomucky/{}/instances?place=9999", w.entry.id);
    let response = post_json_as(app.clone(), &uri, &w.global_cookie, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "place_not_found");
    assert_eq!(json["key"], "place");

    let response = post_json_as(
        app.clone(),
        "/pomucky/9999/instances",
        &w.owner_cookie,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "pomucka_not_found");

    // A missing entry is reported before the role check on `place`.
    let uri = format!("/pomucky/9999/instances?place={}", w.host.id);
    let response = post_json_as(app, &uri, &w.owner_cookie, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "pomucka_not_found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_callers_cannot_register(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);

    let uri = format!("/pomucky/{}/instances", w.entry.id);
    let response = common::send(app, axum::http::Method::POST, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Relocation and loans
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn relocate_then_lend_then_return(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);
    let id = register(app.clone(), &w).await;
    let uri = format!("/instances/{id}");

    let body = serde_json::json!({ "currentlyAt": w.host.id });
    let response = put_json_as(app.clone(), &uri, &w.owner_cookie, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ownedBy"]["id"], w.owner.id);
    assert_eq!(json["currentlyAt"]["id"], w.host.id);

    // The hosting place lends it out and sees the renter.
    let body = serde_json::json!({ "rentedBy": renter() });
    let response = put_json_as(app.clone(), &uri, &w.host_cookie, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rentedBy"], renter());

    // An update that leaves rentedBy out keeps the loan.
    let body = serde_json::json!({ "currentlyAt": w.host.id });
    let response = put_json_as(app.clone(), &uri, &w.host_cookie, body).await;
    assert_eq!(body_json(response).await["rentedBy"], renter());

    let body = serde_json::json!({ "rentedBy": null });
    let response = put_json_as(app.clone(), &uri, &w.host_cookie, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rentedBy"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn outsiders_cannot_modify(pool: PgPool) {
    let w = world(&pool).await;
    let stranger_place = create_place(&pool, "Ostrava").await;
    let (_s, stranger_cookie) =
        staff(&pool, "s@ostrava.cz", Role::LocalAdmin, stranger_place.id).await;
    let app = common::build_test_app(pool);
    let id = register(app.clone(), &w).await;
    let uri = format!("/instances/{id}");

    let body = serde_json::json!({ "rentedBy": renter() });
    let response = put_json_as(app.clone(), &uri, &stranger_cookie, body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_as(app, &uri, &w.global_cookie, body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_updates_name_the_field(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);
    let id = register(app.clone(), &w).await;
    let uri = format!("/instances/{id}");

    let body = serde_json::json!({ "currentlyAt": 9999 });
    let response = put_json_as(app.clone(), &uri, &w.owner_cookie, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "place_not_found");
    assert_eq!(json["key"], "currentlyAt");

    let body = serde_json::json!({ "rentedBy": { "name": "", "identifier": "ZS-1" } });
    let response = put_json_as(app.clone(), &uri, &w.owner_cookie, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "invalid_body");
    assert_eq!(json["key"], "rentedBy.name");

    let body = serde_json::json!({ "rentedBy": { "name": "Jan" } });
    let response = put_json_as(app.clone(), &uri, &w.owner_cookie, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["key"], "rentedBy.identifier");
    assert_eq!(json["err"], "required");

    let body = serde_json::json!({ "rentedBy": { "name": "Jan", "identifier": 5 } });
    let response = put_json_as(app.clone(), &uri, &w.owner_cookie, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "invalid_body");
    assert_eq!(json["key"], "rentedBy.identifier");
    assert_eq!(json["err"], "invalid_type");

    let body = serde_json::json!({ "rentedBy": "Jan" });
    let response = put_json_as(app.clone(), &uri, &w.owner_cookie, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["key"], "rentedBy");

    let body = serde_json::json!({ "currentlyAt": w.host.id });
    let response = put_json_as(app, "/instances/9999", &w.owner_cookie, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "instance_not_found");
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn renter_is_shown_only_to_host_and_global_staff(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);
    let id = register(app.clone(), &w).await;
    let uri = format!("/instances/{id}");

    let body = serde_json::json!({ "currentlyAt": w.host.id, "rentedBy": renter() });
    let response = put_json_as(app.clone(), &uri, &w.owner_cookie, body).await;
    // The owner made the change but the instance now sits elsewhere.
    assert_eq!(body_json(response).await["rentedBy"], true);

    let response = get_as(app.clone(), &uri, &w.owner_cookie).await;
    assert_eq!(body_json(response).await["rentedBy"], true);
    let response = get_as(app.clone(), &uri, &w.host_cookie).await;
    assert_eq!(body_json(response).await["rentedBy"], renter());
    let response = get_as(app.clone(), &uri, &w.global_cookie).await;
    assert_eq!(body_json(response).await["rentedBy"], renter());

    // List endpoints apply the same rule per instance.
    let response = get_as(app.clone(), "/instances", &w.owner_cookie).await;
    assert_eq!(body_json(response).await[0]["rentedBy"], true);

    let response = get_as(app.clone(), "/instances/@local", &w.host_cookie).await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["rentedBy"], renter());

    let response = get_as(app.clone(), "/instances/@local", &w.owner_cookie).await;
    assert_eq!(body_json(response).await, serde_json::json!([]));

    let public_uri = format!("/pomucky/{}/instances", w.entry.id);
    let response = get(app.clone(), &public_uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["pomucka"]["id"], w.entry.id);
    assert_eq!(json["instances"][0]["rentedBy"], true);
    assert_eq!(json["instances"][0]["ownedBy"], w.owner.id);
    assert_eq!(json["instances"][0]["currentlyAt"], w.host.id);
    assert_eq!(json["places"].as_array().unwrap().len(), 2);
    assert!(!json.to_string().contains("ZS-1234"));

    let response = get_as(app, &public_uri, &w.host_cookie).await;
    assert_eq!(body_json(response).await["instances"][0]["rentedBy"], renter());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn instance_reads_need_login(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);
    let id = register(app.clone(), &w).await;

    let response = get(app.clone(), "/instances").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = get(app, &format!("/instances/{id}")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Place stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn own_place_stats_follow_the_instance(pool: PgPool) {
    let w = world(&pool).await;
    let app = common::build_test_app(pool);
    let id = register(app.clone(), &w).await;
    register(app.clone(), &w).await;

    let body = serde_json::json!({ "currentlyAt": w.host.id, "rentedBy": renter() });
    put_json_as(app.clone(), &format!("/instances/{id}"), &w.owner_cookie, body).await;

    let response = get_as(app.clone(), "/users/@self/place/stats", &w.owner_cookie).await;
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "owned": 2, "hosted": 1, "onLoan": 0, "lentOut": 1 })
    );

    let response = get_as(app, "/users/@self/place/stats", &w.host_cookie).await;
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "owned": 0, "hosted": 1, "onLoan": 1, "lentOut": 0 })
    );
}
