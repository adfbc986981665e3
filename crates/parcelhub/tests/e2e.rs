// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete parcelhub HTTP surface.
//!
//! Each test creates an isolated TestHarness with a fresh store and mock
//! identity and payment collaborators. Tests are independent and
//! order-insensitive.

use axum::http::StatusCode;
use parcelhub_core::document::to_document;
use parcelhub_core::{Collection, Filter, RiderStatus, Role, StorageAdapter, TrackingLog, WorkStatus};
use parcelhub_test_utils::TestHarness;
use serde_json::{Value, json};

const OK: StatusCode = StatusCode::OK;
const CREATED: StatusCode = StatusCode::CREATED;
const BAD_REQUEST: StatusCode = StatusCode::BAD_REQUEST;
const UNAUTHORIZED: StatusCode = StatusCode::UNAUTHORIZED;
const FORBIDDEN: StatusCode = StatusCode::FORBIDDEN;
const NOT_FOUND: StatusCode = StatusCode::NOT_FOUND;
const CONFLICT: StatusCode = StatusCode::CONFLICT;
const BAD_GATEWAY: StatusCode = StatusCode::BAD_GATEWAY;

const ADMIN: &str = "admin-token";
const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";
const RIDER: &str = "rider-token";

async fn harness() -> TestHarness {
    TestHarness::builder()
        .with_user(ADMIN, "admin@parcelhub.test", Role::Admin)
        .with_user(ALICE, "a@x.com", Role::User)
        .with_user(BOB, "b@x.com", Role::User)
        .with_user(RIDER, "rider@x.com", Role::User)
        .build()
        .await
        .unwrap()
}

async fn create_parcel(h: &TestHarness, sender: &str, receiver: &str, cost: f64) -> Value {
    let resp = h
        .post(
            "/parcels",
            Some(ALICE),
            json!({
                "title": "Box",
                "created_by": "a@x.com",
                "sender_district": sender,
                "receiver_district": receiver,
                "totalCost": cost
            }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, CREATED, "{:?}", resp.body);
    resp.body["parcel"].clone()
}

/// Rider applies, admin approves; returns the rider id.
async fn onboard_rider(h: &TestHarness, district: &str) -> String {
    let resp = h
        .post(
            "/riders",
            Some(RIDER),
            json!({ "name": "Rahim", "district": district, "phone": "017" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, CREATED, "{:?}", resp.body);
    let rider_id = resp.body["_id"].as_str().unwrap().to_string();

    let resp = h
        .patch(
            &format!("/riders/{rider_id}/status"),
            Some(ADMIN),
            json!({ "status": "active" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, OK, "{:?}", resp.body);
    rider_id
}

/// Drives a parcel from creation to delivered; returns the parcel id.
async fn deliver(h: &TestHarness, sender: &str, receiver: &str, cost: f64) -> String {
    let parcel = create_parcel(h, sender, receiver, cost).await;
    let parcel_id = parcel["_id"].as_str().unwrap().to_string();
    let rider_id = onboard_rider(h, sender).await;

    let resp = h
        .patch(
            &format!("/parcels/{parcel_id}/assign"),
            Some(ADMIN),
            json!({ "riderId": rider_id }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, OK, "{:?}", resp.body);

    for status in ["in_transit", "delivered"] {
        let resp = h
            .patch(
                &format!("/rider/update-status/{parcel_id}"),
                Some(RIDER),
                json!({ "status": status }),
            )
            .await
            .unwrap();
        assert_eq!(resp.status, OK, "{:?}", resp.body);
    }
    parcel_id
}

// ---- Parcel creation ----

#[tokio::test]
async fn creating_a_parcel_stores_pending_unpaid_record() {
    let h = harness().await;
    let parcel = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;

    assert_eq!(parcel["title"], "Box");
    assert_eq!(parcel["delivery_status"], "pending");
    assert_eq!(parcel["payment_status"], "unpaid");
    assert!(parcel["createdAt"].as_str().is_some_and(|s| !s.is_empty()));

    let tracking_id = parcel["tracking_id"].as_str().unwrap();
    assert!(tracking_id.starts_with("PCL-"));

    let logs = h
        .get(&format!("/trackings/{tracking_id}/logs"), None)
        .await
        .unwrap();
    assert_eq!(logs.status, OK);
    assert_eq!(logs.body[0]["status"], "parcel_created");
}

#[tokio::test]
async fn creating_a_parcel_without_district_is_invalid() {
    let h = harness().await;
    let resp = h
        .post(
            "/parcels",
            Some(ALICE),
            json!({ "title": "Box", "sender_district": "Dhaka", "totalCost": 10 }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, BAD_REQUEST);
    assert_eq!(resp.body["error"], "invalid_argument");
}

#[tokio::test]
async fn users_only_see_their_own_parcels() {
    let h = harness().await;
    create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;

    let mine = h.get("/parcels", Some(ALICE)).await.unwrap();
    assert_eq!(mine.body.as_array().unwrap().len(), 1);

    let theirs = h.get("/parcels", Some(BOB)).await.unwrap();
    assert_eq!(theirs.status, OK);
    assert!(theirs.body.as_array().unwrap().is_empty());

    let snooping = h.get("/parcels?email=a@x.com", Some(BOB)).await.unwrap();
    assert_eq!(snooping.status, FORBIDDEN);

    let admin = h.get("/parcels?payment_status=unpaid", Some(ADMIN)).await.unwrap();
    assert_eq!(admin.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_parcel_is_limited_to_creator_and_admin() {
    let h = harness().await;
    let parcel = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;
    let id = parcel["_id"].as_str().unwrap();

    let resp = h.delete(&format!("/parcels/{id}"), Some(BOB)).await.unwrap();
    assert_eq!(resp.status, FORBIDDEN);

    let resp = h.delete(&format!("/parcels/{id}"), Some(ALICE)).await.unwrap();
    assert_eq!(resp.status, OK);
    assert_eq!(resp.body["deletedCount"], 1);

    let resp = h.get(&format!("/parcels/{id}"), Some(ADMIN)).await.unwrap();
    assert_eq!(resp.status, NOT_FOUND);
}

// ---- Authorization ----

#[tokio::test]
async fn admin_route_rejects_missing_token_and_plain_users() {
    let h = harness().await;

    let resp = h.get("/riders/pending", None).await.unwrap();
    assert_eq!(resp.status, UNAUTHORIZED);
    assert_eq!(resp.body["error"], "unauthenticated");

    let resp = h.get("/riders/pending", Some(ALICE)).await.unwrap();
    assert_eq!(resp.status, FORBIDDEN);
    assert_eq!(resp.body["error"], "forbidden");

    let resp = h.get("/riders/pending", Some(ADMIN)).await.unwrap();
    assert_eq!(resp.status, OK);
}

#[tokio::test]
async fn identity_outage_is_an_upstream_failure() {
    let h = harness().await;
    h.identity.set_unavailable(true).await;
    let resp = h.get("/parcels", Some(ALICE)).await.unwrap();
    assert_eq!(resp.status, BAD_GATEWAY);
    assert_eq!(resp.body["error"], "upstream_failure");
}

#[tokio::test]
async fn save_user_creates_then_refreshes_without_touching_role() {
    let h = harness().await;
    h.identity.add_token("new-token", "New@x.com").await;

    let first = h
        .post("/auth/save-user", Some("new-token"), json!({ "name": "Newcomer" }))
        .await
        .unwrap();
    assert_eq!(first.status, CREATED);
    assert_eq!(first.body["user"]["email"], "new@x.com");
    assert_eq!(first.body["user"]["role"], "user");

    let user_id = first.body["user"]["_id"].as_str().unwrap().to_string();
    let resp = h
        .patch(
            &format!("/users/{user_id}/role"),
            Some(ADMIN),
            json!({ "role": "admin" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, OK);

    let again = h
        .post("/auth/save-user", Some("new-token"), json!({}))
        .await
        .unwrap();
    assert_eq!(again.status, OK);
    assert_eq!(again.body["created"], false);

    let role = h.get("/users/new@x.com/role", Some("new-token")).await.unwrap();
    assert_eq!(role.body, json!({ "role": "admin" }));
}

// ---- Riders ----

#[tokio::test]
async fn availability_excludes_busy_and_includes_unset_work_status() {
    let h = harness().await;
    h.seed_rider("free@x.com", "Dhaka", RiderStatus::Active, Some(WorkStatus::Available))
        .await
        .unwrap();
    h.seed_rider("busy@x.com", "Dhaka", RiderStatus::Active, Some(WorkStatus::InDelivery))
        .await
        .unwrap();
    h.seed_rider("legacy@x.com", "dhaka", RiderStatus::Approved, None)
        .await
        .unwrap();
    h.seed_rider("waiting@x.com", "Dhaka", RiderStatus::Pending, None)
        .await
        .unwrap();
    h.seed_rider("far@x.com", "Khulna", RiderStatus::Active, Some(WorkStatus::Available))
        .await
        .unwrap();

    let resp = h
        .get("/riders/available?district=Dhaka", Some(ALICE))
        .await
        .unwrap();
    assert_eq!(resp.status, OK);

    let mut emails: Vec<&str> = resp
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["email"].as_str())
        .collect();
    emails.sort_unstable();
    assert_eq!(emails, ["free@x.com", "legacy@x.com"]);
}

#[tokio::test]
async fn approving_a_rider_grants_the_rider_role() {
    let h = harness().await;
    onboard_rider(&h, "Dhaka").await;

    let role = h.get("/users/rider@x.com/role", Some(RIDER)).await.unwrap();
    assert_eq!(role.body, json!({ "role": "rider" }));

    let duplicate = h
        .post("/riders", Some(RIDER), json!({ "name": "Rahim", "district": "Dhaka" }))
        .await
        .unwrap();
    assert_eq!(duplicate.status, CONFLICT);
}

#[tokio::test]
async fn assigning_a_busy_rider_conflicts() {
    let h = harness().await;
    let first = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;
    let second = create_parcel(&h, "Dhaka", "Dhaka", 50.0).await;
    let rider_id = onboard_rider(&h, "Dhaka").await;

    let assign = |parcel: &Value| format!("/parcels/{}/assign", parcel["_id"].as_str().unwrap());
    let resp = h
        .patch(&assign(&first), Some(ADMIN), json!({ "riderId": rider_id }))
        .await
        .unwrap();
    assert_eq!(resp.status, OK);
    assert_eq!(resp.body["delivery_status"], "rider_assigned");

    let resp = h
        .patch(&assign(&second), Some(ADMIN), json!({ "riderId": rider_id }))
        .await
        .unwrap();
    assert_eq!(resp.status, CONFLICT);

    let active = h.get("/rider/parcels", Some(RIDER)).await.unwrap();
    assert_eq!(active.body.as_array().unwrap().len(), 1);
}

// ---- Delivery status ----

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let h = harness().await;
    let parcel = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;
    let id = parcel["_id"].as_str().unwrap();

    let resp = h
        .patch(
            &format!("/parcels/{id}/status"),
            Some(ADMIN),
            json!({ "status": "delivered" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, BAD_REQUEST);

    let resp = h
        .patch(
            &format!("/parcels/{id}/status"),
            Some(ADMIN),
            json!({ "status": "teleported" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, BAD_REQUEST);
}

#[tokio::test]
async fn delivery_frees_the_rider_again() {
    let h = harness().await;
    deliver(&h, "Dhaka", "Dhaka", 100.0).await;

    let available = h
        .get("/riders/available?district=Dhaka", Some(ADMIN))
        .await
        .unwrap();
    let riders = available.body.as_array().unwrap();
    assert_eq!(riders.len(), 1);
    assert_eq!(riders[0]["work_status"], "available");

    let completed = h.get("/rider/completed-deliveries", Some(RIDER)).await.unwrap();
    assert_eq!(completed.body[0]["delivery_status"], "delivered");
    assert!(completed.body[0]["delivered_at"].is_string());
}

// ---- Cashout ----

#[tokio::test]
async fn same_district_cashout_pays_eighty_percent_once() {
    let h = harness().await;
    let parcel_id = deliver(&h, "Dhaka", "dhaka", 100.0).await;
    let uri = format!("/rider/completed-deliveries/{parcel_id}/cashout");

    let first = h.patch(&uri, Some(RIDER), json!({})).await.unwrap();
    assert_eq!(first.status, OK, "{:?}", first.body);
    assert_eq!(first.body["payout_cashed"], true);
    assert_eq!(first.body["payout_amount"], 80.0);

    let second = h.patch(&uri, Some(RIDER), json!({})).await.unwrap();
    assert_eq!(second.status, CONFLICT);
    assert_eq!(second.body["error"], "conflict");
}

#[tokio::test]
async fn cross_district_cashout_pays_thirty_percent() {
    let h = harness().await;
    let parcel_id = deliver(&h, "Dhaka", "Khulna", 100.0).await;
    let resp = h
        .patch(
            &format!("/rider/completed-deliveries/{parcel_id}/cashout"),
            Some(RIDER),
            json!({}),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, OK);
    assert_eq!(resp.body["payout_amount"], 30.0);
}

#[tokio::test]
async fn concurrent_cashouts_succeed_exactly_once() {
    let h = TestHarness::builder()
        .with_sqlite()
        .with_user(ADMIN, "admin@parcelhub.test", Role::Admin)
        .with_user(ALICE, "a@x.com", Role::User)
        .with_user(RIDER, "rider@x.com", Role::User)
        .build()
        .await
        .unwrap();
    let parcel_id = deliver(&h, "Dhaka", "Dhaka", 100.0).await;
    let uri = format!("/rider/completed-deliveries/{parcel_id}/cashout");

    let (a, b) = futures::join!(
        h.patch(&uri, Some(RIDER), json!({})),
        h.patch(&uri, Some(RIDER), json!({})),
    );
    let mut codes = [a.unwrap().status, b.unwrap().status];
    codes.sort_unstable();
    assert_eq!(codes, [OK, CONFLICT]);
}

#[tokio::test]
async fn concurrent_assignments_of_one_rider_succeed_exactly_once() {
    let h = TestHarness::builder()
        .with_sqlite()
        .with_user(ADMIN, "admin@parcelhub.test", Role::Admin)
        .with_user(ALICE, "a@x.com", Role::User)
        .with_user(RIDER, "rider@x.com", Role::User)
        .build()
        .await
        .unwrap();
    let first = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;
    let second = create_parcel(&h, "Dhaka", "Dhaka", 50.0).await;
    let rider_id = onboard_rider(&h, "Dhaka").await;

    let first_uri = format!("/parcels/{}/assign", first["_id"].as_str().unwrap());
    let second_uri = format!("/parcels/{}/assign", second["_id"].as_str().unwrap());
    let (a, b) = futures::join!(
        h.patch(&first_uri, Some(ADMIN), json!({ "riderId": rider_id })),
        h.patch(&second_uri, Some(ADMIN), json!({ "riderId": rider_id })),
    );
    let mut codes = [a.unwrap().status, b.unwrap().status];
    codes.sort_unstable();
    assert_eq!(codes, [OK, CONFLICT]);

    let active = h.get("/rider/parcels", Some(RIDER)).await.unwrap();
    assert_eq!(active.body.as_array().unwrap().len(), 1);

    let pending = h
        .get("/parcels?delivery_status=pending", Some(ADMIN))
        .await
        .unwrap();
    assert_eq!(pending.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cashout_of_undelivered_or_foreign_parcel_fails() {
    let h = harness().await;
    let parcel = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;
    let id = parcel["_id"].as_str().unwrap();
    onboard_rider(&h, "Dhaka").await;

    let resp = h
        .patch(
            &format!("/rider/completed-deliveries/{id}/cashout"),
            Some(RIDER),
            json!({}),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, FORBIDDEN);

    let resp = h
        .patch("/rider/completed-deliveries/missing/cashout", Some(RIDER), json!({}))
        .await
        .unwrap();
    assert_eq!(resp.status, NOT_FOUND);
}

// ---- Payments ----

#[tokio::test]
async fn payment_intent_goes_through_the_processor() {
    let h = harness().await;
    let parcel = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;
    let id = parcel["_id"].as_str().unwrap();

    let resp = h
        .post(
            "/create-payment-intent",
            Some(ALICE),
            json!({ "amountInCents": 10000, "parcelId": id }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, OK, "{:?}", resp.body);
    assert_eq!(resp.body["clientSecret"], "pi_mock_1_secret");

    let requests = h.payments.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount_minor, 10000);
    assert_eq!(requests[0].parcel_id.as_deref(), Some(id));

    let zero = h
        .post("/create-payment-intent", Some(ALICE), json!({ "amountInCents": 0 }))
        .await
        .unwrap();
    assert_eq!(zero.status, BAD_REQUEST);

    h.payments.set_failing(true).await;
    let failed = h
        .post("/create-payment-intent", Some(ALICE), json!({ "amountInCents": 500 }))
        .await
        .unwrap();
    assert_eq!(failed.status, BAD_GATEWAY);
}

#[tokio::test]
async fn paying_twice_conflicts_without_duplicate_record() {
    let h = harness().await;
    let parcel = create_parcel(&h, "Dhaka", "Dhaka", 100.0).await;
    let id = parcel["_id"].as_str().unwrap();
    let body = json!({
        "parcelId": id,
        "amount": 100,
        "paymentMethod": "card",
        "transactionId": "pi_123"
    });

    let first = h.post("/payments", Some(ALICE), body.clone()).await.unwrap();
    assert_eq!(first.status, CREATED, "{:?}", first.body);
    assert_eq!(first.body["payment"]["email"], "a@x.com");

    let second = h.post("/payments", Some(ALICE), body).await.unwrap();
    assert_eq!(second.status, CONFLICT);

    let stored = h
        .storage
        .find(Collection::Payments, &Filter::new().eq("parcel_id", id), None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);

    let parcel = h.get(&format!("/parcels/{id}"), Some(ALICE)).await.unwrap();
    assert_eq!(parcel.body["payment_status"], "paid");

    let history = h.get("/payments", Some(ALICE)).await.unwrap();
    assert_eq!(history.body.as_array().unwrap().len(), 1);

    let foreign = h.get("/payments?email=a@x.com", Some(BOB)).await.unwrap();
    assert_eq!(foreign.status, FORBIDDEN);
}

// ---- Tracking ----

#[tokio::test]
async fn tracking_logs_come_back_in_time_order() {
    let h = harness().await;
    for (n, time) in [
        "2026-03-01T10:00:02.000Z",
        "2026-03-01T10:00:00.000Z",
        "2026-03-01T10:00:01.000Z",
    ]
    .into_iter()
    .enumerate()
    {
        let log = TrackingLog {
            id: format!("log-{n}"),
            tracking_id: "PCL-ORDERED".to_string(),
            parcel_id: None,
            status: format!("step_{n}"),
            message: String::new(),
            updated_by: "admin@parcelhub.test".to_string(),
            time: time.to_string(),
        };
        h.storage
            .insert_one(Collection::Trackings, to_document(&log).unwrap())
            .await
            .unwrap();
    }

    let resp = h.get("/trackings/PCL-ORDERED/logs", None).await.unwrap();
    assert_eq!(resp.status, OK);
    let times: Vec<&str> = resp
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["time"].as_str())
        .collect();
    assert_eq!(
        times,
        [
            "2026-03-01T10:00:00.000Z",
            "2026-03-01T10:00:01.000Z",
            "2026-03-01T10:00:02.000Z",
        ]
    );
}

#[tokio::test]
async fn appending_tracking_entries_is_staff_only() {
    let h = harness().await;
    let entry = json!({ "tracking_id": "PCL-MANUAL", "status": "note", "message": "at hub" });

    let resp = h.post("/trackings", Some(ALICE), entry.clone()).await.unwrap();
    assert_eq!(resp.status, FORBIDDEN);

    let resp = h.post("/trackings", Some(ADMIN), entry).await.unwrap();
    assert_eq!(resp.status, CREATED);
    assert_eq!(resp.body["updated_by"], "admin@parcelhub.test");
}

// ---- Health ----

#[tokio::test]
async fn health_reports_collaborators() {
    let h = harness().await;
    let resp = h.get("/health", None).await.unwrap();
    assert_eq!(resp.status, OK);
    assert_eq!(resp.body["status"], "ok");
    assert_eq!(resp.body["storage"], "healthy");
}
