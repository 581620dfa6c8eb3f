use alumnet::config::Config;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Staff accounts seeded by migration (must match m20240102_seed_staff_accounts.rs)
const ADMIN_EMAIL: &str = "admin@univ.example";
const ADMIN_PASSWORD: &str = "admin123";
const LEADERSHIP_EMAIL: &str = "rector@univ.example";
const LEADERSHIP_PASSWORD: &str = "rector123";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;

    let state = alumnet::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    alumnet::api::router(state).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("No session cookie issued")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn login_staff(app: &Router, email: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

/// Registers an alumni profile and logs in with the student number.
/// Returns (session cookie, alumni id).
async fn register_and_login_alumni(app: &Router, student_number: &str, email: &str) -> (String, String) {
    let response = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "student_number": student_number,
            "full_name": "Alya Putri",
            "email": email,
            "password": "hunter2hunter",
            "cohort_year": 2016,
            "faculty": "Engineering",
            "study_program": "Informatics",
            "home_city": "Bandung",
            "home_province": "Jawa Barat"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let alumni_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "student_number": student_number })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    (session_cookie(&response), alumni_id)
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = spawn_app().await;

    // Unknown email, wrong password for a real account, and wrong student
    // number must all produce the same response.
    let unknown = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "nobody@univ.example", "password": "whatever1" })),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown).await;

    let wrong_password = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": ADMIN_EMAIL, "password": "not-the-password" })),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body = body_json(wrong_password).await;

    let wrong_student_number = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "nobody@univ.example", "student_number": "999" })),
    )
    .await;
    assert_eq!(wrong_student_number.status(), StatusCode::UNAUTHORIZED);
    let wrong_student_number_body = body_json(wrong_student_number).await;

    assert_eq!(unknown_body, wrong_password_body);
    assert_eq!(unknown_body, wrong_student_number_body);
    assert_eq!(unknown_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = spawn_app().await;

    for uri in [
        "/api/auth/me",
        "/api/alumni/me",
        "/api/dashboard/stats",
        "/api/admin/alumni",
        "/api/analytics",
        "/api/metrics",
    ] {
        let response = send(&app, "GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_register_and_student_number_login() {
    let app = spawn_app().await;

    let (cookie, _) = register_and_login_alumni(&app, "2016123456", "alya@example.com").await;

    let response = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "ALUMNI");
    assert_eq!(body["data"]["profile"]["student_number"], "2016123456");

    // Duplicate student number or email is a conflict.
    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "student_number": "2016123456",
            "full_name": "Other Person",
            "email": "other@example.com",
            "password": "hunter2hunter",
            "cohort_year": 2017,
            "faculty": "Engineering",
            "study_program": "Informatics",
            "home_city": "Bandung",
            "home_province": "Jawa Barat"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_role_enforcement_on_admin_api() {
    let app = spawn_app().await;

    let (alumni_cookie, _) = register_and_login_alumni(&app, "2015000001", "budi@example.com").await;
    let leadership_cookie = login_staff(&app, LEADERSHIP_EMAIL, LEADERSHIP_PASSWORD).await;
    let admin_cookie = login_staff(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Admin surface is ADMIN only, even for leadership.
    let response = send(&app, "GET", "/api/admin/alumni", Some(&alumni_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = send(&app, "GET", "/api/admin/alumni", Some(&leadership_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = send(&app, "GET", "/api/admin/alumni", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Analytics is open to both staff roles, closed to alumni.
    let response = send(&app, "GET", "/api/analytics", Some(&leadership_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, "GET", "/api/analytics", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, "GET", "/api/analytics", Some(&alumni_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff sessions carry no alumni profile, so self-service is closed.
    let response = send(&app, "GET", "/api/alumni/careers", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_career_replace_keeps_single_current() {
    let app = spawn_app().await;
    let (cookie, _) = register_and_login_alumni(&app, "2014000002", "citra@example.com").await;

    let first = serde_json::json!({
        "status": "EMPLOYED",
        "company": "PT Nusantara Teknologi",
        "position": "Software Engineer",
        "industry": "Technology",
        "work_city": "Jakarta",
        "work_province": "DKI Jakarta",
        "field_related": true
    });
    let response = send(&app, "POST", "/api/alumni/careers", Some(&cookie), Some(first)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let second = serde_json::json!({
        "status": "SELF_EMPLOYED",
        "company": "Warung Kopi Citra",
        "industry": "Food & Beverage",
        "work_city": "Bandung",
        "work_province": "Jawa Barat",
        "field_related": false
    });
    let response = send(&app, "POST", "/api/alumni/careers", Some(&cookie), Some(second)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/alumni/careers", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let careers = body["data"].as_array().unwrap();
    assert_eq!(careers.len(), 2);

    let current: Vec<_> = careers
        .iter()
        .filter(|c| c["is_current"].as_bool().unwrap())
        .collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0]["status"], "SELF_EMPLOYED");
}

#[tokio::test]
async fn test_verify_and_delete_cascade() {
    let app = spawn_app().await;
    let (alumni_cookie, alumni_id) =
        register_and_login_alumni(&app, "2013000003", "dewi@example.com").await;
    let admin_cookie = login_staff(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Give the profile a career so the delete has something to cascade over.
    let response = send(
        &app,
        "POST",
        "/api/alumni/careers",
        Some(&alumni_cookie),
        Some(serde_json::json!({ "status": "FURTHER_STUDY" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Verification is idempotent.
    let uri = format!("/api/admin/alumni/{alumni_id}/verify");
    for _ in 0..2 {
        let response = send(
            &app,
            "POST",
            &uri,
            Some(&admin_cookie),
            Some(serde_json::json!({ "verified": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(
        &app,
        "GET",
        &format!("/api/admin/alumni/{alumni_id}"),
        Some(&admin_cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_verified"], true);

    let response = send(
        &app,
        "DELETE",
        &format!("/api/admin/alumni/{alumni_id}"),
        Some(&admin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "GET",
        &format!("/api/admin/alumni/{alumni_id}"),
        Some(&admin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting twice is a 404, not an error.
    let response = send(
        &app,
        "DELETE",
        &format!("/api/admin/alumni/{alumni_id}"),
        Some(&admin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_testimonial_moderation_flow() {
    let app = spawn_app().await;
    let (alumni_cookie, _) = register_and_login_alumni(&app, "2012000004", "eko@example.com").await;
    let admin_cookie = login_staff(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = send(
        &app,
        "POST",
        "/api/testimonials",
        Some(&alumni_cookie),
        Some(serde_json::json!({ "content": "The program prepared me well for industry." })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "PENDING");
    let testimonial_id = body["data"]["id"].as_str().unwrap().to_string();

    // Pending testimonials are invisible to the public feed.
    let response = send(&app, "GET", "/api/testimonials", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // PENDING is not a valid moderation target.
    let response = send(
        &app,
        "PATCH",
        &format!("/api/admin/testimonials/{testimonial_id}"),
        Some(&admin_cookie),
        Some(serde_json::json!({ "status": "PENDING" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "PATCH",
        &format!("/api/admin/testimonials/{testimonial_id}"),
        Some(&admin_cookie),
        Some(serde_json::json!({ "status": "APPROVED" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/testimonials", None, None).await;
    let body = body_json(response).await;
    let approved = body["data"].as_array().unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0]["alumni_name"], "Alya Putri");
}

#[tokio::test]
async fn test_duplicate_insert_reports_conflict() {
    use alumnet::api::ApiError;
    use alumnet::config::SecurityConfig;
    use alumnet::db::{NewAlumni, Store};

    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open store");
    let input = NewAlumni {
        student_number: "2010000009".to_string(),
        full_name: "Joko Susilo".to_string(),
        email: "joko@example.com".to_string(),
        cohort_year: 2010,
        faculty: "Law".to_string(),
        study_program: "Law".to_string(),
        phone: None,
        home_city: "Semarang".to_string(),
        home_province: "Jawa Tengah".to_string(),
    };
    let security = SecurityConfig::default();

    store
        .register_alumni(&input, "hunter2hunter", &security)
        .await
        .expect("First registration failed");

    // A concurrent writer can slip past the duplicate prechecks and lose
    // the race to the unique index; that failure must map to a conflict,
    // not a generic server error.
    let err = store
        .register_alumni(&input, "hunter2hunter", &security)
        .await
        .expect_err("Duplicate registration must fail");
    let api_err = ApiError::from_write_error(err, "Email or student number is already registered");
    assert!(matches!(api_err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = spawn_app().await;
    let cookie = login_staff(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = send(&app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_staff_only() {
    let app = spawn_app().await;
    let (alumni_cookie, _) = register_and_login_alumni(&app, "2011000005", "fitri@example.com").await;

    let response = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&alumni_cookie),
        Some(serde_json::json!({
            "current_password": "whatever1",
            "new_password": "whatever2whatever"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login_staff(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&admin_cookie),
        Some(serde_json::json!({
            "current_password": ADMIN_PASSWORD,
            "new_password": "a-much-better-password"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, new one does.
    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    login_staff(&app, ADMIN_EMAIL, "a-much-better-password").await;
}
