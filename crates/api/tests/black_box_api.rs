use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use devcamp_api::app::{AppServices, Settings, build_app};
use devcamp_auth::{JwtClaims, Role, User, hash_password};
use devcamp_bootcamps::Location;
use devcamp_core::{BootcampId, GeoPoint, UserId};
use devcamp_infra::{PhotoStore, RecordingMailer, StaticGeocoder};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tempfile::TempDir;

const JWT_SECRET: &str = "test-secret";
const MAX_UPLOAD: u64 = 1024;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    services: Arc<AppServices>,
    mailer: Arc<RecordingMailer>,
    uploads: TempDir,
    handle: tokio::task::JoinHandle<()>,
}

fn located(lng: f64, lat: f64, city: &str, zipcode: &str) -> Location {
    let mut location = Location::at(GeoPoint::new(lng, lat).unwrap(), format!("{city} {zipcode}"));
    location.city = Some(city.to_string());
    location.zipcode = Some(zipcode.to_string());
    location
}

fn geocoder() -> StaticGeocoder {
    StaticGeocoder::new()
        .with("02118", located(-71.0707, 42.3389, "Boston", "02118"))
        .with("233 Bay State Rd Boston MA 02215", located(-71.1054, 42.3505, "Boston", "02215"))
        .with("Worcester MA 01609", located(-71.8023, 42.2626, "Worcester", "01609"))
        .with("Los Angeles CA 90001", located(-118.2437, 34.0522, "Los Angeles", "90001"))
}

impl TestServer {
    async fn spawn() -> Self {
        let uploads = TempDir::new().expect("failed to create upload dir");
        let photos = PhotoStore::new(uploads.path());
        let mailer = Arc::new(RecordingMailer::new());

        let settings = Settings {
            cookie_days: 30,
            secure_cookies: false,
            max_upload_bytes: MAX_UPLOAD,
        };
        let services = Arc::new(
            AppServices::in_memory(JWT_SECRET, settings, photos)
                .with_geocoder(Arc::new(geocoder()))
                .with_mailer(mailer.clone()),
        );

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(services.clone());
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
            client: reqwest::Client::new(),
            services,
            mailer,
            uploads,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, email: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/v1/auth/register"))
            .json(&json!({ "name": "Test User", "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Admins cannot register; put one straight into the store.
    async fn seed_admin(&self, email: &str) -> String {
        let admin = User {
            id: UserId::new(),
            name: "Admin".to_string(),
            email: email.to_string(),
            role: Role::Admin,
            password_hash: hash_password("adminpass").unwrap(),
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        };
        self.services.users.insert(&admin).await.unwrap();

        let res = self.login(email, "adminpass").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_bootcamp(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/bootcamps"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn create_bootcamp_ok(&self, token: &str, body: Value) -> String {
        let res = self.create_bootcamp(token, body).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn upload(&self, token: &str, id: &str, form: Form) -> reqwest::Response {
        self.client
            .put(self.url(&format!("/api/v1/bootcamps/{id}/photo")))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn bootcamp(name: &str, address: &str) -> Value {
    json!({
        "name": name,
        "description": "Full stack web development bootcamp",
        "address": address,
        "careers": ["Web Development", "UI/UX"],
        "website": "https://example.com",
        "averageCost": 10000,
        "housing": true
    })
}

fn mint_jwt(sub: UserId, role: Role, issued_at: chrono::DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = JwtClaims::new(sub, role, issued_at, ttl);
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn error_of(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    body["error"].as_str().unwrap().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/api/v1/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "Not authorized to access this route");

    let res = srv
        .client
        .post(srv.url("/api/v1/bootcamps"))
        .json(&bootcamp("Devworks", "02118"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url("/api/v1/auth/me"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_or_orphaned_tokens_rejected() {
    let srv = TestServer::spawn().await;
    srv.register("jane@example.com", "123456").await;
    let user = srv.services.users.find_by_email("jane@example.com").await.unwrap().unwrap();

    let expired = mint_jwt(
        user.id,
        user.role,
        Utc::now() - ChronoDuration::hours(2),
        ChronoDuration::hours(1),
    );
    let res = srv
        .client
        .get(srv.url("/api/v1/auth/me"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let unknown = mint_jwt(UserId::new(), Role::User, Utc::now(), ChronoDuration::hours(1));
    let res = srv
        .client
        .get(srv.url("/api/v1/auth/me"))
        .bearer_auth(unknown)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_me() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/v1/auth/register"))
        .json(&json!({ "name": "Jane", "email": "Jane@Example.com", "password": "123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=2592000"));

    let res = srv.login("jane@example.com", "123456").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    let token = body["token"].as_str().unwrap().to_string();

    let res = srv
        .client
        .get(srv.url("/api/v1/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["email"], "jane@example.com");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("passwordHash").is_none());

    // The session cookie works as well as the bearer header.
    let res = srv
        .client
        .get(srv.url("/api/v1/auth/me"))
        .header("Cookie", format!("token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_failures() {
    let srv = TestServer::spawn().await;
    srv.register("jane@example.com", "123456").await;

    let res = srv.login("jane@example.com", "wrong-password").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "Invalid credentials");

    let res = srv.login("nobody@example.com", "123456").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url("/api/v1/auth/login"))
        .json(&json!({ "email": "jane@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_rules() {
    let srv = TestServer::spawn().await;
    srv.register("jane@example.com", "123456").await;

    let res = srv
        .client
        .post(srv.url("/api/v1/auth/register"))
        .json(&json!({ "name": "Jane", "email": "JANE@example.com", "password": "123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "Duplicate field value entered");

    let res = srv
        .client
        .post(srv.url("/api/v1/auth/register"))
        .json(&json!({ "name": "Eve", "email": "eve@example.com", "password": "123456", "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/api/v1/auth/register"))
        .json(&json!({ "name": "Bob", "email": "bob@example.com", "password": "123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let srv = TestServer::spawn().await;
    let token = srv.register("jane@example.com", "123456").await;

    let res = srv
        .client
        .get(srv.url("/api/v1/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("token=none;"));
    assert!(cookie.contains("Max-Age=10"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "data": {} }));

    let res = srv
        .client
        .get(srv.url("/api/v1/auth/me"))
        .header("Cookie", "token=none")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_details_and_password() {
    let srv = TestServer::spawn().await;
    let token = srv.register("jane@example.com", "123456").await;

    let res = srv
        .client
        .put(srv.url("/api/v1/auth/update-details"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Janet", "email": "janet@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Janet");
    assert_eq!(body["data"]["email"], "janet@example.com");

    let res = srv
        .client
        .put(srv.url("/api/v1/auth/update-password"))
        .bearer_auth(&token)
        .json(&json!({ "currentPassword": "nope-nope", "newPassword": "abcdef" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .put(srv.url("/api/v1/auth/update-password"))
        .bearer_auth(&token)
        .json(&json!({ "currentPassword": "123456", "newPassword": "abcdef" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["token"].is_string());

    assert_eq!(srv.login("janet@example.com", "abcdef").await.status(), StatusCode::OK);
    assert_eq!(srv.login("janet@example.com", "123456").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forgot_and_reset_password_round_trip() {
    let srv = TestServer::spawn().await;
    srv.register("jane@example.com", "123456").await;

    let res = srv
        .client
        .post(srv.url("/api/v1/auth/forgot-password"))
        .json(&json!({ "email": "jane@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "data": "Email sent" }));

    let mail = srv.mailer.last().expect("reset email recorded");
    assert_eq!(mail.to, "jane@example.com");
    let url = mail
        .text
        .split_whitespace()
        .find(|w| w.contains("/api/v1/auth/reset-password/"))
        .unwrap()
        .to_string();
    assert!(url.starts_with("http://127.0.0.1:"));
    let raw_token = url.rsplit('/').next().unwrap().to_string();

    // Only the digest is stored.
    let stored = srv.services.users.find_by_email("jane@example.com").await.unwrap().unwrap();
    assert_ne!(stored.reset_password_token.as_deref(), Some(raw_token.as_str()));

    let res = srv
        .client
        .put(srv.url(&format!("/api/v1/auth/reset-password/{raw_token}")))
        .json(&json!({ "password": "brand-new" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(srv.login("jane@example.com", "brand-new").await.status(), StatusCode::OK);
    assert_eq!(srv.login("jane@example.com", "123456").await.status(), StatusCode::UNAUTHORIZED);

    // The token is single use.
    let res = srv
        .client
        .put(srv.url(&format!("/api/v1/auth/reset-password/{raw_token}")))
        .json(&json!({ "password": "another-one" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "Invalid token");
}

#[tokio::test]
async fn expired_reset_token_rejected() {
    let srv = TestServer::spawn().await;
    srv.register("jane@example.com", "123456").await;

    let mut user = srv.services.users.find_by_email("jane@example.com").await.unwrap().unwrap();
    let raw = "expired-token";
    user.set_reset_token(
        devcamp_auth::ResetToken::digest(raw),
        Utc::now() - ChronoDuration::minutes(1),
    );
    srv.services.users.update(&user).await.unwrap();

    let res = srv
        .client
        .put(srv.url(&format!("/api/v1/auth/reset-password/{raw}")))
        .json(&json!({ "password": "brand-new" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forgot_password_failures() {
    let srv = TestServer::spawn().await;
    srv.register("jane@example.com", "123456").await;

    let res = srv
        .client
        .post(srv.url("/api/v1/auth/forgot-password"))
        .json(&json!({ "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    srv.mailer.set_failing(true);
    let res = srv
        .client
        .post(srv.url("/api/v1/auth/forgot-password"))
        .json(&json!({ "email": "jane@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(res).await, "Email could not be sent");

    let user = srv.services.users.find_by_email("jane@example.com").await.unwrap().unwrap();
    assert!(user.reset_password_token.is_none());
    assert!(user.reset_password_expire.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Bootcamps
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bootcamp_lifecycle() {
    let srv = TestServer::spawn().await;
    let token = srv.register("publisher@example.com", "123456").await;

    let res = srv
        .create_bootcamp(&token, bootcamp("Devworks Bootcamp", "233 Bay State Rd Boston MA 02215"))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Bootcamp created successfully");
    let data = &body["data"];
    assert_eq!(data["slug"], "devworks-bootcamp");
    assert_eq!(data["photo"], "no-photo.jpg");
    assert_eq!(data["location"]["type"], "Point");
    assert_eq!(data["location"]["city"], "Boston");
    assert!(data.get("address").is_none());
    let id = data["id"].as_str().unwrap().to_string();

    let res = srv
        .client
        .get(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .put(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Devworks Academy", "address": "Worcester MA 01609" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["slug"], "devworks-academy");
    assert_eq!(body["data"]["location"]["city"], "Worcester");

    let res = srv
        .client
        .delete(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "message": "Bootcamp deleted successfully" }));

    let res = srv
        .client
        .get(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_or_malformed_ids_are_404() {
    let srv = TestServer::spawn().await;

    let missing = BootcampId::new();
    let res = srv
        .client
        .get(srv.url(&format!("/api/v1/bootcamps/{missing}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await, format!("Bootcamp not found with id of {missing}"));

    let res = srv
        .client
        .get(srv.url("/api/v1/bootcamps/not-an-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await, "Resource not found with id of not-an-id");
}

#[tokio::test]
async fn second_bootcamp_rejected_for_publisher() {
    let srv = TestServer::spawn().await;
    let token = srv.register("publisher@example.com", "123456").await;

    srv.create_bootcamp_ok(&token, bootcamp("First Camp", "02118")).await;
    let res = srv.create_bootcamp(&token, bootcamp("Second Camp", "02118")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(res).await.contains("has already published a bootcamp"));
}

#[tokio::test]
async fn admin_may_create_several_bootcamps() {
    let srv = TestServer::spawn().await;
    let token = srv.seed_admin("admin@example.com").await;

    srv.create_bootcamp_ok(&token, bootcamp("First Camp", "02118")).await;
    srv.create_bootcamp_ok(&token, bootcamp("Second Camp", "02118")).await;

    let res = srv.create_bootcamp(&token, bootcamp("Second Camp", "02118")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "Duplicate field value entered");
}

#[tokio::test]
async fn invalid_bootcamp_input_rejected() {
    let srv = TestServer::spawn().await;
    let token = srv.register("publisher@example.com", "123456").await;

    let mut body = bootcamp("Camp", "02118");
    body["careers"] = json!(["Basket Weaving"]);
    assert_eq!(srv.create_bootcamp(&token, body).await.status(), StatusCode::BAD_REQUEST);

    let mut body = bootcamp("Camp", "02118");
    body["website"] = json!("example.com");
    assert_eq!(srv.create_bootcamp(&token, body).await.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "name": "Camp" });
    assert_eq!(srv.create_bootcamp(&token, body).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_owner_or_admin_may_modify() {
    let srv = TestServer::spawn().await;
    let owner = srv.register("owner@example.com", "123456").await;
    let stranger = srv.register("stranger@example.com", "123456").await;
    let admin = srv.seed_admin("admin@example.com").await;

    let id = srv.create_bootcamp_ok(&owner, bootcamp("Owned Camp", "02118")).await;

    let res = srv
        .client
        .put(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .bearer_auth(&stranger)
        .json(&json!({ "description": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(error_of(res).await.contains("is not authorized to update this bootcamp"));

    let res = srv
        .client
        .delete(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .bearer_auth(&stranger)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .put(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "description": "Reviewed by staff" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["description"], "Reviewed by staff");
    // No address in the update, so the location is untouched.
    assert_eq!(body["data"]["location"]["zipcode"], "02118");

    let res = srv
        .client
        .delete(srv.url(&format!("/api/v1/bootcamps/{}", BootcampId::new())))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn radius_search() {
    let srv = TestServer::spawn().await;
    let admin = srv.seed_admin("admin@example.com").await;

    srv.create_bootcamp_ok(&admin, bootcamp("Boston Camp", "233 Bay State Rd Boston MA 02215")).await;
    srv.create_bootcamp_ok(&admin, bootcamp("Worcester Camp", "Worcester MA 01609")).await;
    srv.create_bootcamp_ok(&admin, bootcamp("LA Camp", "Los Angeles CA 90001")).await;
    srv.create_bootcamp_ok(&admin, bootcamp("Nowhere Camp", "an address nobody knows")).await;

    let names = |body: &Value| {
        let mut names: Vec<String> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        names
    };

    let res = srv
        .client
        .get(srv.url("/api/v1/bootcamps/radius/02118/10"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(names(&body), vec!["Boston Camp"]);

    let res = srv
        .client
        .get(srv.url("/api/v1/bootcamps/radius/02118/60"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(names(&body), vec!["Boston Camp", "Worcester Camp"]);

    let res = srv
        .client
        .get(srv.url("/api/v1/bootcamps/radius/99999/10"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    for bad in ["far", "-5"] {
        let res = srv
            .client
            .get(srv.url(&format!("/api/v1/bootcamps/radius/02118/{bad}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn list_filters_sorts_and_paginates() {
    let srv = TestServer::spawn().await;
    let admin = srv.seed_admin("admin@example.com").await;

    for (name, cost, housing) in [("Alpha", 5000, true), ("Bravo", 12000, false), ("Charlie", 9000, true)] {
        let mut body = bootcamp(name, "02118");
        body["averageCost"] = json!(cost);
        body["housing"] = json!(housing);
        srv.create_bootcamp_ok(&admin, body).await;
    }

    let get = |query: &'static str| {
        let client = srv.client.clone();
        let url = srv.url(&format!("/api/v1/bootcamps{query}"));
        async move { client.get(url).send().await.unwrap() }
    };

    let body: Value = get("?sort=name&limit=2").await.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["name"], "Alpha");
    assert_eq!(body["pagination"], json!({ "next": { "page": 2, "limit": 2 } }));

    let body: Value = get("?sort=name&limit=2&page=2").await.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Charlie");
    assert_eq!(body["pagination"], json!({ "prev": { "page": 1, "limit": 2 } }));

    let body: Value = get("?averageCost[lte]=10000&sort=-averageCost&select=name,averageCost")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["name"], "Charlie");
    assert_eq!(body["data"][1]["name"], "Alpha");
    assert!(body["data"][0].get("description").is_none());
    assert!(body["data"][0].get("id").is_some());

    let body: Value = get("?housing=false").await.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Bravo");

    let res = get("?colour=red").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ─────────────────────────────────────────────────────────────────────────────
// Photo upload
// ─────────────────────────────────────────────────────────────────────────────

fn image_part(bytes: Vec<u8>, file_name: &str, mime: &str) -> Form {
    Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()).mime_str(mime).unwrap())
}

#[tokio::test]
async fn photo_upload_rules() {
    let srv = TestServer::spawn().await;
    let owner = srv.register("owner@example.com", "123456").await;
    let stranger = srv.register("stranger@example.com", "123456").await;
    let id = srv.create_bootcamp_ok(&owner, bootcamp("Photo Camp", "02118")).await;

    let res = srv.upload(&owner, &id, image_part(b"%PDF".to_vec(), "doc.pdf", "application/pdf")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "Please upload a valid image file");

    let res = srv
        .upload(&owner, &id, image_part(vec![0u8; MAX_UPLOAD as usize + 1], "big.png", "image/png"))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, format!("Please upload an image less than {MAX_UPLOAD}"));

    // Well past the request body limit, so the multipart read itself fails.
    let res = srv
        .upload(&owner, &id, image_part(vec![0u8; 200 * 1024], "huge.png", "image/png"))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, format!("Please upload an image less than {MAX_UPLOAD}"));

    let res = srv.upload(&owner, &id, Form::new().text("caption", "no file here")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "Please upload a file");

    let res = srv.upload(&stranger, &id, image_part(vec![1, 2, 3], "me.png", "image/png")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let missing = BootcampId::new().to_string();
    let res = srv.upload(&owner, &missing, image_part(vec![1, 2, 3], "me.png", "image/png")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn photo_upload_stores_renamed_file() {
    let srv = TestServer::spawn().await;
    let owner = srv.register("owner@example.com", "123456").await;
    let id = srv.create_bootcamp_ok(&owner, bootcamp("Photo Camp", "02118")).await;

    let res = srv.upload(&owner, &id, image_part(vec![7u8; 512], "holiday.jpg", "image/jpeg")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let expected = format!("photo_{id}.jpg");
    assert_eq!(body["message"], "Photo added successfully");
    assert_eq!(body["data"], expected.as_str());

    let stored = std::fs::read(srv.uploads.path().join(&expected)).unwrap();
    assert_eq!(stored.len(), 512);

    let res = srv
        .client
        .get(srv.url(&format!("/api/v1/bootcamps/{id}")))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["photo"], expected.as_str());
}
