//! Login against a mocked backend and persistence of the resulting user.

use std::time::Duration;

use lockin_core::{QueryClient, RecordKind, SessionStore};
use serde_json::json;

#[tokio::test]
async fn login_then_remember_user() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/login-user/execute")
        .match_header("auth", "token-1")
        .match_body(mockito::Matcher::Json(
            json!({ "email": "lea@example.com", "password": "s3cret" }),
        ))
        .with_body(r#"{"success": true, "data": [{"u_id": "u-31", "username": "lea"}]}"#)
        .create_async()
        .await;

    let client = QueryClient::new(&server.url(), "token-1", Duration::from_secs(5)).unwrap();
    let user = client
        .login("lea@example.com", "s3cret")
        .await
        .unwrap()
        .expect("user should be found");
    mock.assert_async().await;

    let store = SessionStore::open_memory().unwrap();
    store.save_login(&user).unwrap();
    assert_eq!(store.current_user_id().unwrap().as_deref(), Some("u-31"));
    assert_eq!(store.current_user().unwrap().unwrap()["username"], "lea");

    store.logout().unwrap();
    assert!(store.current_user_id().unwrap().is_none());
}

#[tokio::test]
async fn records_are_normalized_per_kind() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/select-user-habits/execute")
        .with_body(
            r#"{"success": true, "data": [{"habit_id": 4, "name": "read"}, {"h_id": 9, "name": "run"}]}"#,
        )
        .create_async()
        .await;

    let client = QueryClient::new(&server.url(), "", Duration::from_secs(5)).unwrap();
    let habits = client
        .fetch_records("select-user-habits", &json!({ "user_id": 1 }), RecordKind::Habit)
        .await
        .unwrap();
    let ids: Vec<_> = habits.iter().map(|h| h["id"].clone()).collect();
    assert_eq!(ids, vec![json!(4), json!(9)]);
}
