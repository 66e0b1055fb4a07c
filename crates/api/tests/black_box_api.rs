use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use eventdesk_api::config::ApiConfig;
use eventdesk_auth::{Profile, Role, TokenClaims};
use eventdesk_core::UserId;
use eventdesk_infra::{InMemoryStore, ProfileStore};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    store: Arc<InMemoryStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ApiConfig::for_secret(JWT_SECRET)).await
    }

    async fn spawn_with(config: ApiConfig) -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let store = Arc::new(InMemoryStore::new());
        let app = eventdesk_api::app::build_app(&config, store.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Seed a profile directly in the store and return a token for it.
    async fn user(&self, email: &str, role: Role) -> (UserId, String) {
        let id = UserId::new();
        let profile = Profile::register(id, email, role, Utc::now()).unwrap();
        self.store.insert_profile(profile).await.unwrap();
        (id, mint_jwt(id, Some(email)))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: UserId, email: Option<&str>) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub,
        email: email.map(str::to_string),
        iat: now.timestamp(),
        exp: (now + ChronoDuration::minutes(10)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn change_role(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let res = client
        .patch(srv.url("/admin/users"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn create_event(client: &reqwest::Client, srv: &TestServer, token: &str, title: &str) -> serde_json::Value {
    let res = client
        .post(srv.url("/events"))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "description": "Talks and pizza",
            "location": "Hall 2",
            "date_time": "2099-06-01T18:30",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let res = client
        .get(srv.url("/admin/users"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn ping_reports_store_health() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/api/ping")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn profile_registration_uses_signup_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = UserId::new();
    let token = mint_jwt(id, Some("New.Person@Example.com"));

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], id.to_string());
    assert!(body["role"].is_null());

    let res = client
        .post(srv.url("/profiles"))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "event_owner");
    assert_eq!(body["email"], "new.person@example.com");

    let res = client
        .post(srv.url("/profiles"))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(srv.url("/profiles/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn profile_registration_requires_email() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(UserId::new(), None);

    let res = reqwest::Client::new()
        .post(srv.url("/profiles"))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn configured_signup_role_is_applied() {
    let mut config = ApiConfig::for_secret(JWT_SECRET);
    config.default_signup_role = Role::User;
    let srv = TestServer::spawn_with(config).await;

    let token = mint_jwt(UserId::new(), Some("plain@example.com"));
    let res = reqwest::Client::new()
        .post(srv.url("/profiles"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn user_list_is_gated_by_role_and_excludes_caller() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, admin) = srv.user("admin@example.com", Role::Admin).await;
    let (_, owner) = srv.user("owner@example.com", Role::EventOwner).await;
    let (_, user) = srv.user("user@example.com", Role::User).await;

    let res = client
        .get(srv.url("/admin/users"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let emails: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails.len(), 2);
    assert!(!emails.contains(&"admin@example.com"));

    let res = client
        .get(srv.url("/admin/users"))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/admin/users"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Valid token, no profile.
    let res = client
        .get(srv.url("/admin/users"))
        .bearer_auth(mint_jwt(UserId::new(), None))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_change_any_other_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, admin) = srv.user("admin@example.com", Role::Admin).await;
    let (target, _) = srv.user("target@example.com", Role::User).await;

    let (status, body) = change_role(
        &client,
        &srv,
        &admin,
        json!({ "userId": target.to_string(), "newRole": "admin" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "role updated successfully");
    assert_eq!(body["role"], "admin");

    let stored = srv.store.get_profile(target).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Admin);
}

#[tokio::test]
async fn nobody_changes_their_own_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (admin_id, admin) = srv.user("admin@example.com", Role::Admin).await;

    let (status, body) = change_role(
        &client,
        &srv,
        &admin,
        json!({ "userId": admin_id.to_string(), "newRole": "user" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "cannot change own role");
}

#[tokio::test]
async fn event_owner_only_manages_regular_users() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, owner) = srv.user("owner@example.com", Role::EventOwner).await;
    let (plain, _) = srv.user("plain@example.com", Role::User).await;
    let (other_owner, _) = srv.user("other@example.com", Role::EventOwner).await;

    let (status, body) = change_role(
        &client,
        &srv,
        &owner,
        json!({ "userId": plain.to_string(), "newRole": "admin" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "event owners can only manage regular users");

    let (status, _) = change_role(
        &client,
        &srv,
        &owner,
        json!({ "userId": other_owner.to_string(), "newRole": "user" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = change_role(
        &client,
        &srv,
        &owner,
        json!({ "userId": plain.to_string(), "newRole": "user" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_change_input_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, admin) = srv.user("admin@example.com", Role::Admin).await;
    let (_, user) = srv.user("user@example.com", Role::User).await;
    let (target, _) = srv.user("target@example.com", Role::User).await;

    let (status, body) = change_role(&client, &srv, &admin, json!({ "newRole": "admin" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "user ID and new role are required");

    let (status, body) = change_role(
        &client,
        &srv,
        &admin,
        json!({ "userId": target.to_string(), "newRole": "superuser" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid role");

    let (status, _) = change_role(
        &client,
        &srv,
        &admin,
        json!({ "userId": "nope", "newRole": "user" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = change_role(
        &client,
        &srv,
        &admin,
        json!({ "userId": UserId::new().to_string(), "newRole": "user" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "target user not found");

    let (status, body) = change_role(
        &client,
        &srv,
        &user,
        json!({ "userId": target.to_string(), "newRole": "event_owner" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "insufficient permissions");
}

#[tokio::test]
async fn event_lifecycle_and_management_gate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, owner) = srv.user("owner@example.com", Role::EventOwner).await;
    let (_, user) = srv.user("user@example.com", Role::User).await;

    let created = create_event(&client, &srv, &owner, "Rust Meetup #4").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["public_slug"], "rust-meetup-4");
    assert_eq!(
        created["share_url"],
        "http://localhost:3000/event/rust-meetup-4"
    );

    // Same title again gets a distinct slug.
    let second = create_event(&client, &srv, &owner, "Rust Meetup #4").await;
    assert_ne!(second["public_slug"], created["public_slug"]);

    let res = client
        .get(srv.url("/events?date=2099-06-01"))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let res = client
        .get(srv.url("/events/calendar"))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    let cal: serde_json::Value = res.json().await.unwrap();
    assert_eq!(cal["days"]["2099-06-01"], 2);

    // A regular user who does not own the event is refused.
    let res = client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(&user)
        .json(&json!({ "title": "Hijacked", "date_time": "2099-06-02T10:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(&owner)
        .json(&json!({ "title": "Rust Meetup #5", "date_time": "2099-07-01T18:00:00Z" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["title"], "Rust Meetup #5");
    assert_eq!(updated["public_slug"], "rust-meetup-4");

    let res = client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(&owner)
        .json(&json!({ "title": "ab", "date_time": "2099-07-01T18:00:00Z" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(srv.url(&format!("/events/{id}")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(srv.url(&format!("/events/{id}")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_rsvp_export_and_analytics() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, owner) = srv.user("owner@example.com", Role::EventOwner).await;
    let (_, user) = srv.user("user@example.com", Role::User).await;
    let created = create_event(&client, &srv, &owner, "Rust Meetup").await;
    let id = created["id"].as_str().unwrap().to_string();
    let slug = created["public_slug"].as_str().unwrap().to_string();

    let res = client
        .get(srv.url(&format!("/events/{id}/export")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "no RSVPs found");

    let res = client
        .post(srv.url(&format!("/public/events/{slug}/rsvps")))
        .json(&json!({ "name": "Ada Lovelace", "email": "Ada@Example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(srv.url(&format!("/public/events/{id}/rsvps")))
        .json(&json!({ "name": "Ada again", "email": "ada@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "already RSVP'd to this event");

    let res = client
        .post(srv.url(&format!("/public/events/{slug}/rsvps")))
        .json(&json!({ "name": "B", "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/public/events/no-such-event/rsvps"))
        .json(&json!({ "name": "Grace", "email": "grace@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url(&format!("/public/events/{slug}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["rsvp_count"], 1);

    // Export is hidden from callers who may not manage the event.
    let res = client
        .get(srv.url(&format!("/events/{id}/export")))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url(&format!("/events/{id}/export")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        res.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"rust_meetup_attendees.csv\""
    );
    let csv = res.text().await.unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("\"Name\",\"Email\",\"RSVP Date\""));
    assert!(lines.next().unwrap().starts_with("\"Ada Lovelace\",\"ada@example.com\","));

    let res = client
        .get(srv.url("/analytics"))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["counts"]["upcoming"], 1);
    assert_eq!(body["counts"]["past"], 0);
    assert_eq!(body["counts"]["attendees"], 1);
    assert_eq!(body["upcoming"][0]["attendee_count"], 1);
}

async fn rsvp(client: &reqwest::Client, srv: &TestServer, key: &str, name: &str, email: &str) {
    let res = client
        .post(srv.url(&format!("/public/events/{key}/rsvps")))
        .json(&json!({ "name": name, "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn attendee_export_is_limited_to_the_event_owner() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, host) = srv.user("host@example.com", Role::EventOwner).await;
    let (_, other_owner) = srv.user("other@example.com", Role::EventOwner).await;
    let (_, admin) = srv.user("admin@example.com", Role::Admin).await;

    let created = create_event(&client, &srv, &host, "Private Dinner").await;
    let id = created["id"].as_str().unwrap().to_string();
    rsvp(&client, &srv, &id, "Ada Lovelace", "ada@secret.io").await;

    for token in [&other_owner, &admin] {
        let res = client
            .get(srv.url(&format!("/events/{id}/export")))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["message"], "event not found or unauthorized");
    }

    let res = client
        .get(srv.url(&format!("/events/{id}/export")))
        .bearer_auth(&host)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("ada@secret.io"));
}

#[tokio::test]
async fn event_owner_role_may_manage_events_it_does_not_own() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, host) = srv.user("host@example.com", Role::EventOwner).await;
    let (_, other_owner) = srv.user("other@example.com", Role::EventOwner).await;

    let created = create_event(&client, &srv, &host, "Board Games").await;
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(&other_owner)
        .json(&json!({ "title": "Board Games Night", "date_time": "2099-06-02T19:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(srv.url(&format!("/events/{id}")))
        .bearer_auth(&other_owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn regular_users_manage_only_their_own_events() {
    let mut config = ApiConfig::for_secret(JWT_SECRET);
    config.default_signup_role = Role::User;
    let srv = TestServer::spawn_with(config).await;
    let client = reqwest::Client::new();

    // Both sign up through the API and get the plain `user` role.
    let mut tokens = Vec::new();
    for email in ["host@example.com", "guest@example.com"] {
        let token = mint_jwt(UserId::new(), Some(email));
        let res = client
            .post(srv.url("/profiles"))
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        tokens.push(token);
    }
    let (host, guest) = (&tokens[0], &tokens[1]);

    let created = create_event(&client, &srv, host, "Book Club").await;
    let id = created["id"].as_str().unwrap().to_string();
    rsvp(&client, &srv, &id, "Grace Hopper", "grace@example.com").await;

    let res = client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(host)
        .json(&json!({ "title": "Book Club: June", "date_time": "2099-06-03T18:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url(&format!("/events/{id}/export")))
        .bearer_auth(host)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(guest)
        .json(&json!({ "title": "Taken over", "date_time": "2099-06-03T18:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(srv.url(&format!("/events/{id}")))
        .bearer_auth(guest)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url(&format!("/events/{id}/export")))
        .bearer_auth(guest)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(srv.url(&format!("/events/{id}")))
        .bearer_auth(host)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn mistyped_json_bodies_get_the_error_envelope() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (_, admin) = srv.user("admin@example.com", Role::Admin).await;

    let (status, body) = change_role(
        &client,
        &srv,
        &admin,
        json!({ "userId": 5, "newRole": "user" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let res = client
        .post(srv.url("/events"))
        .bearer_auth(&admin)
        .json(&json!({ "title": ["not", "a", "string"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_input");
}
