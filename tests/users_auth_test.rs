mod common;

use assert_matches::assert_matches;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::TestHarness;
use upkeep_api::auth::AuthUser;
use upkeep_api::entities::user::UserRole;
use upkeep_api::errors::ServiceError;
use upkeep_api::services::users::{LoginRequest, RegisterUser};

fn register_input(username: &str) -> RegisterUser {
    RegisterUser {
        username: username.to_string(),
        password: "correct-horse-battery".to_string(),
        role: None,
    }
}

#[tokio::test]
async fn registration_hashes_the_password_and_defaults_the_role() {
    let app = TestHarness::new().await;

    let user = app
        .services
        .users
        .register(register_input("somchai"))
        .await
        .expect("register");

    assert_eq!(user.username, "somchai");
    assert_eq!(user.role(), UserRole::Unspecified);
    assert_ne!(user.password_hash, "correct-horse-battery");
    assert!(user.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
    let app = TestHarness::new().await;

    app.services
        .users
        .register(register_input("somchai"))
        .await
        .expect("first registration");

    let err = app
        .services
        .users
        .register(register_input("somchai"))
        .await
        .expect_err("duplicate username");
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn login_issues_a_token_the_auth_service_accepts() {
    let app = TestHarness::new().await;
    let user = app
        .services
        .users
        .register(register_input("somchai"))
        .await
        .expect("register");

    let token = app
        .services
        .users
        .login(LoginRequest {
            username: "somchai".to_string(),
            password: "correct-horse-battery".to_string(),
        })
        .await
        .expect("login");

    assert_eq!(token.token_type, "Bearer");
    let claims = app
        .auth
        .validate_token(&token.access_token)
        .expect("token validates");
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.username, "somchai");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_identically() {
    let app = TestHarness::new().await;
    app.services
        .users
        .register(register_input("somchai"))
        .await
        .expect("register");

    let wrong_password = app
        .services
        .users
        .login(LoginRequest {
            username: "somchai".to_string(),
            password: "guessing".to_string(),
        })
        .await
        .expect_err("wrong password");
    let unknown_user = app
        .services
        .users
        .login(LoginRequest {
            username: "nobody".to_string(),
            password: "guessing".to_string(),
        })
        .await
        .expect_err("unknown user");

    // Same message either way, so login probing cannot tell accounts apart.
    match (&wrong_password, &unknown_user) {
        (ServiceError::Unauthorized(a), ServiceError::Unauthorized(b)) => assert_eq!(a, b),
        other => panic!("expected Unauthorized for both, got {:?}", other),
    }
}

#[tokio::test]
async fn only_admins_can_assign_roles() {
    let app = TestHarness::new().await;

    let target = app
        .services
        .users
        .register(register_input("somchai"))
        .await
        .expect("register target");

    let technician = AuthUser {
        user_id: 99,
        username: "tech".to_string(),
        role: UserRole::Technician,
    };
    let err = app
        .services
        .users
        .assign_role(target.id, UserRole::Technician, &technician)
        .await
        .expect_err("non-admin actor");
    assert_matches!(err, ServiceError::Forbidden(_));

    let admin = AuthUser {
        user_id: 1,
        username: "boss".to_string(),
        role: UserRole::Admin,
    };
    let updated = app
        .services
        .users
        .assign_role(target.id, UserRole::Technician, &admin)
        .await
        .expect("admin assigns role");
    assert_eq!(updated.role(), UserRole::Technician);
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&body).expect("json body")
}

#[tokio::test]
async fn register_and_login_over_http() {
    let app = TestHarness::new().await;
    let router = app.router();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"username": "somchai", "password": "correct-horse-battery"}).to_string(),
        ))
        .expect("build request");
    let response = router.clone().oneshot(request).await.expect("register");
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"username": "somchai", "password": "correct-horse-battery"}).to_string(),
        ))
        .expect("build request");
    let response = router.clone().oneshot(request).await.expect("login");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let token = body["data"]["access_token"]
        .as_str()
        .expect("access token in response");

    // The issued token opens protected routes.
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/users")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("build request");
    let response = router.clone().oneshot(request).await.expect("list users");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_reject_missing_tokens() {
    let app = TestHarness::new().await;
    let router = app.router();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/users")
        .body(Body::empty())
        .expect("build request");
    let response = router.oneshot(request).await.expect("unauthenticated");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
