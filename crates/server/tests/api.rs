use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use engine::{Engine, NewUser, Role, Session};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use server::AuthConfig;
use tower::ServiceExt;

const BASE: &str = "/api/v1/store_app";
const PASSWORD: &str = "Abcdef1!";

/// Router over a fresh database holding a single administrator.
async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .create_user(
            &Session::new(0, Role::Administrator),
            NewUser {
                name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                address: "Head office 1".to_string(),
                password: PASSWORD.to_string(),
                role: Role::Administrator,
            },
        )
        .await
        .unwrap();

    server::app(
        engine,
        AuthConfig::new("integration-test-secret-0123456789"),
        BASE,
    )
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(format!("{BASE}{path}"));
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn sign_up(app: &Router, name: &str, role: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/sign-up",
        None,
        Some(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "address": "Somewhere 1",
            "password": PASSWORD,
            "type": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["user"].clone()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn add_store(app: &Router, admin: &str, name: &str, owner_id: Option<i64>) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/add-store",
        Some(admin),
        Some(json!({ "name": name, "address": "Market street 4", "owner_id": owner_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn sign_up_then_login_then_session() {
    let app = test_app().await;
    let user = sign_up(&app, "Alice", "Normal User").await;
    assert_eq!(user["role"], "Normal User");
    assert!(user.get("password").is_none());

    let token = login(&app, "alice@example.com").await;
    let (status, body) = send(&app, Method::GET, "/is-login", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn sign_up_errors_map_to_status_codes() {
    let app = test_app().await;
    sign_up(&app, "Bob", "Normal User").await;

    let duplicate = json!({
        "name": "Robert",
        "email": "bob@example.com",
        "address": "Other 2",
        "password": PASSWORD,
        "role": "Store Owner",
    });
    let (status, _) = send(&app, Method::POST, "/sign-up", None, Some(duplicate)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let weak = json!({
        "name": "Carol",
        "email": "carol@example.com",
        "address": "Other 2",
        "password": "abcdefgh",
        "role": "Normal User",
    });
    let (status, body) = send(&app, Method::POST, "/sign-up", None, Some(weak)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Password"));

    let admin = json!({
        "name": "Carol",
        "email": "carol@example.com",
        "address": "Other 2",
        "password": PASSWORD,
        "role": "System Administrator",
    });
    let (status, _) = send(&app, Method::POST, "/sign-up", None, Some(admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("{BASE}/login"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "Wrong#Pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/user-ratings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "access denied");

    let (status, _) = send(&app, Method::GET, "/is-login", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_of_a_deleted_user_is_rejected() {
    let app = test_app().await;
    let admin = login(&app, "admin@example.com").await;
    let user = sign_up(&app, "Dora", "Normal User").await;
    let token = login(&app, "dora@example.com").await;

    let path = format!("/delete-user/{}", user["id"]);
    let (status, _) = send(&app, Method::DELETE, &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/is-login", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rating_flow_updates_the_listing() {
    let app = test_app().await;
    let admin = login(&app, "admin@example.com").await;
    let store_id = add_store(&app, &admin, "Corner Shop", None).await;

    let mut tokens = Vec::new();
    for name in ["Eve", "Finn", "Gus", "Hana"] {
        sign_up(&app, name, "Normal User").await;
        tokens.push(login(&app, &format!("{}@example.com", name.to_lowercase())).await);
    }

    let path = format!("/add-rating/{store_id}");
    for (token, value) in tokens.iter().zip([5, 5, 4, 3]) {
        let (status, body) = send(
            &app,
            Method::POST,
            &path,
            Some(token),
            Some(json!({ "rating": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["rating"]["rating"], value);
    }

    // Rerating replaces the first rater's row.
    let (status, _) = send(
        &app,
        Method::POST,
        &path,
        Some(&tokens[0]),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/get-stores", None, None).await;
    let store = &body["stores"][0];
    assert_eq!(store["rating_count"], 4);
    assert_eq!(store["average_rating"], 4.3);

    let summary_path = format!("/stores/{store_id}/summary");
    let (status, body) = send(&app, Method::GET, &summary_path, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"], 4.25);
    assert_eq!(body["distribution"], json!([0, 0, 1, 1, 2]));

    let (_, body) = send(&app, Method::GET, "/user-ratings", Some(&tokens[0]), None).await;
    assert_eq!(body["ratings"].as_array().unwrap().len(), 1);
    assert_eq!(body["ratings"][0]["store_name"], "Corner Shop");
}

#[tokio::test]
async fn invalid_ratings_are_rejected() {
    let app = test_app().await;
    let admin = login(&app, "admin@example.com").await;
    let store_id = add_store(&app, &admin, "Bakery", None).await;
    sign_up(&app, "Ivan", "Normal User").await;
    let token = login(&app, "ivan@example.com").await;

    let path = format!("/add-rating/{store_id}");
    for body in [json!({ "rating": 0 }), json!({ "rating": 6 }), json!({ "rating": 4.5 })] {
        let (status, _) = send(&app, Method::POST, &path, Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/add-rating/999",
        Some(&token),
        Some(json!({ "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &path,
        Some(&admin),
        Some(json!({ "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, Method::GET, "/get-ratings", None, None).await;
    assert!(body["ratings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_routes_are_role_scoped() {
    let app = test_app().await;
    let admin = login(&app, "admin@example.com").await;
    sign_up(&app, "Jack", "Normal User").await;
    let normal = login(&app, "jack@example.com").await;

    let (status, _) = send(&app, Method::GET, "/admin/dashboard", Some(&normal), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        Method::POST,
        "/add-store",
        Some(&normal),
        Some(json!({ "name": "Sneaky", "address": "Back alley 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/admin/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["administrators"], 1);
    assert_eq!(body["normal_users"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/add-user",
        Some(&admin),
        Some(json!({
            "name": "Second Admin",
            "email": "root2@example.com",
            "address": "Head office 2",
            "password": PASSWORD,
            "role": "System Administrator",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["role"], "System Administrator");

    let (_, body) = send(
        &app,
        Method::GET,
        "/get-users?role=System%20Administrator",
        None,
        None,
    )
    .await;
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn owners_see_only_their_own_feedback() {
    let app = test_app().await;
    let admin = login(&app, "admin@example.com").await;
    let kim = sign_up(&app, "Kim", "Store Owner").await;
    sign_up(&app, "Leo", "Store Owner").await;
    let kim_token = login(&app, "kim@example.com").await;
    let leo_token = login(&app, "leo@example.com").await;
    let store_id = add_store(&app, &admin, "Kim's Books", kim["id"].as_i64()).await;

    sign_up(&app, "Max", "Normal User").await;
    let max = login(&app, "max@example.com").await;
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/add-rating/{store_id}"),
        Some(&max),
        Some(json!({ "rating": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let path = format!("/stores/{store_id}/ratings");
    let (status, body) = send(&app, Method::GET, &path, Some(&kim_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ratings"][0]["user_email"], "max@example.com");
    assert_eq!(body["summary"]["count"], 1);

    let (status, _) = send(&app, Method::GET, &path, Some(&leo_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, &path, Some(&max), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/owner/dashboard", Some(&kim_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stores"].as_array().unwrap().len(), 1);
    let (status, _) = send(&app, Method::GET, "/owner/dashboard", Some(&max), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn password_change_and_profile_edit() {
    let app = test_app().await;
    let nina = sign_up(&app, "Nina", "Normal User").await;
    let token = login(&app, "nina@example.com").await;
    let id = nina["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/change-password/{id}"),
        Some(&token),
        Some(json!({ "oldPassword": "Wrong#Pass", "new_password": "Fresh#Pass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/change-password/{id}"),
        Some(&token),
        Some(json!({ "oldPassword": PASSWORD, "newPassword": "Fresh#Pass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/edit-user/{id}"),
        Some(&token),
        Some(json!({
            "name": "Nina Renamed",
            "email": "nina@example.com",
            "address": "New place 7",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Nina Renamed");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/edit-user/{id}"),
        Some(&token),
        Some(json!({
            "name": "Nina Renamed",
            "email": "nina@example.com",
            "address": "New place 7",
            "role": "Store Owner",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_store_cascades_its_ratings() {
    let app = test_app().await;
    let admin = login(&app, "admin@example.com").await;
    let store_id = add_store(&app, &admin, "Short Lived", None).await;
    sign_up(&app, "Olga", "Normal User").await;
    let token = login(&app, "olga@example.com").await;
    send(
        &app,
        Method::POST,
        &format!("/add-rating/{store_id}"),
        Some(&token),
        Some(json!({ "rating": 4 })),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/delete-store/{store_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/get-ratings", None, None).await;
    assert!(body["ratings"].as_array().unwrap().is_empty());
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/stores/{store_id}/summary"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_email_wins_over_invalid_fields() {
    let app = test_app().await;
    sign_up(&app, "Paula", "Normal User").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/sign-up",
        None,
        Some(json!({
            "name": "Pa",
            "email": "paula@example.com",
            "address": "Anywhere 3",
            "password": "abcdefgh",
            "role": "Normal User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_bearer_authorization_is_unauthenticated() {
    let app = test_app().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("{BASE}/user-ratings"))
        .header(header::AUTHORIZATION, "Basic YWJjOmRlZg==")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "access denied");
}

#[tokio::test]
async fn bad_path_and_query_are_json_errors() {
    let app = test_app().await;
    sign_up(&app, "Quentin", "Normal User").await;
    let token = login(&app, "quentin@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/add-rating/abc",
        Some(&token),
        Some(json!({ "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = send(&app, Method::GET, "/get-users?role=bogus", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}
