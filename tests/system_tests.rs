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

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: &Router, uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(
            builder
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("No session cookie issued")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        None,
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn seed_employed_alumni(app: &Router, student_number: &str, email: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/register",
        None,
        serde_json::json!({
            "student_number": student_number,
            "full_name": "Gita Lestari",
            "email": email,
            "password": "hunter2hunter",
            "cohort_year": 2018,
            "faculty": "Economics",
            "study_program": "Accounting",
            "home_city": "Surabaya",
            "home_province": "Jawa Timur"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app,
        "/api/auth/login",
        None,
        serde_json::json!({ "email": email, "student_number": student_number }),
    )
    .await;
    let cookie = session_cookie(&response);

    let response = post_json(
        app,
        "/api/alumni/careers",
        Some(&cookie),
        serde_json::json!({
            "status": "EMPLOYED",
            "company": "Bank Jatim",
            "position": "Analyst",
            "industry": "Finance",
            "work_city": "Surabaya",
            "work_province": "Jawa Timur",
            "salary_band": "5_10M",
            "field_related": true
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    cookie
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("No Location header")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_page_gate_redirects() {
    let app = spawn_app().await;

    // Public pages need no session; the landing page match is exact.
    for uri in ["/", "/login", "/register"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    // Anonymous visitors are sent to login from any protected page.
    for uri in ["/dashboard", "/profile", "/admin/dashboard", "/analytics"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let leadership = login(&app, LEADERSHIP_EMAIL, LEADERSHIP_PASSWORD).await;

    // Staff are bounced out of the alumni area to their own home.
    let response = get(&app, "/dashboard", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/admin/dashboard");

    let response = get(&app, "/dashboard", Some(&leadership)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/analytics");

    // Leadership reads analytics but never the admin area.
    let response = get(&app, "/analytics", Some(&leadership)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get(&app, "/admin/dashboard", Some(&leadership)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");

    let response = get(&app, "/admin/dashboard", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_alumni_page_access() {
    let app = spawn_app().await;
    let cookie = seed_employed_alumni(&app, "2018000001", "gita@example.com").await;

    for uri in ["/dashboard", "/profile", "/career", "/network", "/testimonials"] {
        let response = get(&app, uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    // Alumni are bounced from staff pages back to their dashboard.
    for uri in ["/admin/dashboard", "/analytics"] {
        let response = get(&app, uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(location(&response), "/dashboard", "{uri}");
    }
}

#[tokio::test]
async fn test_analytics_overview_counts() {
    let app = spawn_app().await;
    seed_employed_alumni(&app, "2018000002", "hadi@example.com").await;
    let leadership = login(&app, LEADERSHIP_EMAIL, LEADERSHIP_PASSWORD).await;

    let response = get(&app, "/api/analytics", Some(&leadership)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let summary = &body["data"]["summary"];
    assert_eq!(summary["total_alumni"], 1);
    assert_eq!(summary["with_current_career"], 1);
    assert!((summary["employment_rate"].as_f64().unwrap() - 1.0).abs() < f64::EPSILON);
    assert!((summary["field_match_rate"].as_f64().unwrap() - 1.0).abs() < f64::EPSILON);

    // Filtering by a faculty with no alumni zeroes everything out.
    let response = get(&app, "/api/analytics?faculty=Medicine", Some(&leadership)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["summary"]["total_alumni"], 0);
}

#[tokio::test]
async fn test_csv_export() {
    let app = spawn_app().await;
    seed_employed_alumni(&app, "2018000003", "indah@example.com").await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = get(&app, "/api/admin/export?type=alumni", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment; filename=\"alumni-export-"));
    assert!(disposition.ends_with(".csv\""));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..3], [0xEF, 0xBB, 0xBF], "UTF-8 BOM");
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.trim_start_matches('\u{feff}').split("\r\n");
    let header_row = lines.next().unwrap();
    assert!(header_row.starts_with("student_number,"));
    assert!(lines.any(|line| line.contains("2018000003")));

    // Remaining export types respond with CSV as well.
    for export_type in ["careers", "locations", "accreditation"] {
        let response = get(
            &app,
            &format!("/api/admin/export?type={export_type}"),
            Some(&admin),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "{export_type}");
    }

    let response = get(&app, "/api/admin/export?type=bogus", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Export is admin only.
    let leadership = login(&app, LEADERSHIP_EMAIL, LEADERSHIP_PASSWORD).await;
    let response = get(&app, "/api/admin/export?type=alumni", Some(&leadership)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_metrics_endpoint_is_staff_gated() {
    let app = spawn_app().await;

    let response = get(&app, "/api/metrics", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let leadership = login(&app, LEADERSHIP_EMAIL, LEADERSHIP_PASSWORD).await;
    let response = get(&app, "/api/metrics", Some(&leadership)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = spawn_app().await;

    let response = get(&app, "/", None).await;
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    let csp = response
        .headers()
        .get("content-security-policy")
        .expect("No content-security-policy header")
        .to_str()
        .unwrap();
    assert!(csp.contains("default-src 'self'"));
    assert!(csp.contains("frame-ancestors 'none'"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;

    let response = get(&app, "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["version"].is_string());
    assert!(body["data"]["uptime_seconds"].is_u64());
}
