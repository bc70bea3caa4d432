use super::test_util::{prepare_db_and_test, router_for, seed_session, seed_session_expiring};
use crate::api::test_util::{deserialize_body, ErrorBody};
use crate::dto;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call_procedure(
    router: &Router,
    procedure: &str,
    token: &str,
    input: Option<Value>,
) -> Response<Body> {
    let builder = Request::builder()
        .uri(format!("/rpc/todo.{procedure}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    let request = match input {
        Some(body) => builder
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.method("GET").body(Body::empty()),
    }
    .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

async fn get_all(router: &Router, token: &str) -> Vec<dto::Todo> {
    let response = call_procedure(router, "getAll", token, None).await;
    assert_eq!(StatusCode::OK, response.status());

    deserialize_body(response.into_body()).await
}

async fn create(router: &Router, token: &str, title: &str) -> dto::Todo {
    let response = call_procedure(router, "create", token, Some(json!({ "title": title }))).await;
    assert_eq!(StatusCode::CREATED, response.status());

    deserialize_body(response.into_body()).await
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn todo_lifecycle_for_one_user() {
    prepare_db_and_test(|db| async move {
        seed_session(&db, "user-alice", "Alice", "alice-token").await;
        let router = router_for(db);

        assert!(get_all(&router, "alice-token").await.is_empty());

        let milk = create(&router, "alice-token", "  Buy milk  ").await;
        let dog = create(&router, "alice-token", "Walk dog").await;
        assert_eq!("Buy milk", milk.title);
        assert_eq!(dto::TodoStatus::Pending, milk.status);
        assert_eq!(None, milk.description);

        let listed = get_all(&router, "alice-token").await;
        let titles: Vec<&str> = listed.iter().map(|todo| todo.title.as_str()).collect();
        assert_eq!(vec!["Walk dog", "Buy milk"], titles);

        let update = call_procedure(
            &router,
            "updateStatus",
            "alice-token",
            Some(json!({ "id": milk.id, "status": "IN_PROGRESS" })),
        )
        .await;
        assert_eq!(StatusCode::NO_CONTENT, update.status());

        let delete = call_procedure(&router, "delete", "alice-token", Some(json!({ "id": dog.id }))).await;
        assert_eq!(StatusCode::NO_CONTENT, delete.status());

        let listed = get_all(&router, "alice-token").await;
        assert_eq!(1, listed.len());
        assert_eq!(milk.id, listed[0].id);
        assert_eq!(dto::TodoStatus::InProgress, listed[0].status);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn users_cannot_touch_each_others_todos() {
    prepare_db_and_test(|db| async move {
        seed_session(&db, "user-alice", "Alice", "alice-token").await;
        seed_session(&db, "user-bob", "Bob", "bob-token").await;
        let router = router_for(db);

        let alices = create(&router, "alice-token", "Alice's secret").await;

        assert!(get_all(&router, "bob-token").await.is_empty());

        let update = call_procedure(
            &router,
            "updateStatus",
            "bob-token",
            Some(json!({ "id": alices.id, "status": "DONE" })),
        )
        .await;
        assert_eq!(StatusCode::NO_CONTENT, update.status());

        let delete =
            call_procedure(&router, "delete", "bob-token", Some(json!({ "id": alices.id }))).await;
        assert_eq!(StatusCode::NO_CONTENT, delete.status());

        let listed = get_all(&router, "alice-token").await;
        assert_eq!(1, listed.len());
        assert_eq!(dto::TodoStatus::Pending, listed[0].status);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn expired_or_unknown_sessions_are_unauthorized() {
    prepare_db_and_test(|db| async move {
        seed_session_expiring(&db, "user-alice", "Alice", "stale-token", Duration::hours(-1)).await;
        let router = router_for(db);

        for token in ["stale-token", "never-issued"] {
            let response = call_procedure(&router, "getAll", token, None).await;
            assert_eq!(StatusCode::UNAUTHORIZED, response.status());

            let error: ErrorBody = deserialize_body(response.into_body()).await;
            assert_eq!("unauthorized", error.error_code);
        }
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn session_cookie_is_accepted() {
    prepare_db_and_test(|db| async move {
        seed_session(&db, "user-alice", "Alice", "alice-token").await;
        let router = router_for(db);

        let request = Request::builder()
            .method("GET")
            .uri("/rpc/todo.getAll")
            .header(header::COOKIE, "todo_session=alice-token")
            .body(Body::empty())
            .expect("request should build");
        let response = router.oneshot(request).await.expect("router is infallible");

        assert_eq!(StatusCode::OK, response.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn rejects_invalid_titles_without_storing_anything() {
    prepare_db_and_test(|db| async move {
        seed_session(&db, "user-alice", "Alice", "alice-token").await;
        let router = router_for(db);

        for title in ["   ".to_owned(), "a".repeat(257)] {
            let response =
                call_procedure(&router, "create", "alice-token", Some(json!({ "title": title }))).await;
            assert_eq!(StatusCode::BAD_REQUEST, response.status());

            let error: ErrorBody = deserialize_body(response.into_body()).await;
            assert_eq!("invalid_input", error.error_code);
        }

        let longest = create(&router, "alice-token", &"é".repeat(256)).await;
        assert_eq!(256, longest.title.chars().count());
        assert_eq!(1, get_all(&router, "alice-token").await.len());
    });
}
