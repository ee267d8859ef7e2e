mod support;

use std::sync::Arc;
use std::time::Duration;

use client::api::login::LoginRequest;
use client::api::users::{CreateUserRequest, DeleteUserRequest, UpdateUserBody, UpdateUserRequest};
use client::state::{AppConfig, AppState};
use client::{ApiError, QueryStatus};
use support::{StubService, KNOWN_EMAIL, KNOWN_TOKEN};

fn state_for(stub: &StubService, dir: &tempfile::TempDir) -> AppState {
    AppState::init(
        Some(dir.path().to_path_buf()),
        AppConfig {
            api_base: stub.base_url(),
            api_key: Some("test-key".to_string()),
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_login_persists_token_across_restart() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    let response = state
        .gateway
        .run(LoginRequest {
            email: KNOWN_EMAIL.to_string(),
            password: "cityslicka".to_string(),
        })
        .await
        .unwrap();

    // the login request itself went out without a bearer header
    let login_headers = stub.last_headers().unwrap();
    assert!(login_headers.authorization.is_none());
    assert_eq!(login_headers.api_key.as_deref(), Some("test-key"));

    state
        .session
        .set(response.token.clone(), Some(KNOWN_EMAIL.to_string()));

    assert_eq!(response.token, KNOWN_TOKEN);
    assert!(state.session.is_logged_in());

    // a later read carries the bearer token and the static api key
    state.cache.users_page(1, false).await.into_result().unwrap();
    let headers = stub.last_headers().unwrap();
    assert_eq!(
        headers.authorization.as_deref(),
        Some("Bearer QpwL5tke4Pnpja7X4")
    );
    assert_eq!(headers.api_key.as_deref(), Some("test-key"));

    // a fresh process picks the token back up, but not the label
    let reopened = AppState::load(Some(dir.path().to_path_buf()), None, None).unwrap();
    assert_eq!(reopened.session.token().as_deref(), Some(KNOWN_TOKEN));
    assert!(reopened.session.identity().is_none());
}

#[tokio::test]
async fn test_login_rejection_surfaces_service_message() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    let err = state
        .gateway
        .run(LoginRequest {
            email: "nobody@reqres.in".to_string(),
            password: "whatever".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        ApiError::Rejection { status, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "user not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!state.session.is_logged_in());
}

#[tokio::test]
async fn test_concurrent_page_reads_share_one_request() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    let (a, b) = tokio::join!(
        state.cache.users_page(1, false),
        state.cache.users_page(1, false),
    );
    let a = a.into_result().unwrap();
    let b = b.into_result().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.data.len(), 6);
    assert_eq!(stub.list_hits(1), 1);

    // a later read is served from cache without touching the service
    state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(stub.list_hits(1), 1);
}

#[tokio::test]
async fn test_pages_are_cached_independently() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    let first = state.cache.users_page(1, false).await.into_result().unwrap();
    let second = state.cache.users_page(2, false).await.into_result().unwrap();
    assert_eq!(first.page, 1);
    assert_eq!(second.page, 2);
    assert_eq!(stub.list_hits(1), 1);
    assert_eq!(stub.list_hits(2), 1);

    state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(stub.list_hits(1), 1);
}

#[tokio::test]
async fn test_failed_create_leaves_cached_page() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    let before = state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(before.data.len(), 6);

    stub.fail_next();
    let err = state
        .gateway
        .run(CreateUserRequest {
            name: "Tobias Funke".to_string(),
            job: "Analyst".to_string(),
            email: "tobias.funke@reqres.in".to_string(),
            avatar: "https://reqres.in/img/faces/7-image.jpg".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));

    // nothing was created and the cached page was not invalidated
    let after = state.cache.users_page(1, false).await.into_result().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(stub.list_hits(1), 1);
    assert_eq!(stub.user_count(), 6);
}

#[tokio::test]
async fn test_create_invalidates_list() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    state.cache.users_page(1, false).await.into_result().unwrap();

    let created = state
        .gateway
        .run(CreateUserRequest {
            name: "Tobias Funke".to_string(),
            job: "Analyst".to_string(),
            email: "tobias.funke@reqres.in".to_string(),
            avatar: "https://reqres.in/img/faces/7-image.jpg".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "7");

    let after = state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(after.total, 7);
    assert_eq!(stub.list_hits(1), 2);
}

#[tokio::test]
async fn test_delete_invalidates_list() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    let before = state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(before.data.len(), 6);

    state.gateway.run(DeleteUserRequest { id: 3 }).await.unwrap();

    // the page entry was unobserved, so it was dropped and refetches
    let after = state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(after.data.len(), 5);
    assert!(after.data.iter().all(|u| u.id != 3));
    assert_eq!(stub.list_hits(1), 2);
}

#[tokio::test]
async fn test_update_refetches_watched_record() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    let first = state.cache.user(5, false).await.into_result().unwrap();
    assert_eq!(first.email, "charles.morris@reqres.in");
    let mut rx = state.cache.subscribe_user(5).unwrap();

    state
        .gateway
        .run(UpdateUserRequest {
            id: 5,
            body: UpdateUserBody {
                email: Some("charles.morris@corp.example".to_string()),
                ..UpdateUserBody::default()
            },
        })
        .await
        .unwrap();

    // the watched entry went stale and refetched in the background
    let fresh = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            rx.changed().await.unwrap();
            let snapshot = rx.borrow().clone();
            if snapshot.status == QueryStatus::Success && !snapshot.stale {
                break snapshot;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(
        fresh.into_result().unwrap().email,
        "charles.morris@corp.example"
    );
    assert_eq!(stub.user_hits(5), 2);
}

#[tokio::test]
async fn test_email_update_refetches_list_page() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(stub.list_hits(1), 1);

    state
        .gateway
        .run(UpdateUserRequest {
            id: 2,
            body: UpdateUserBody {
                email: Some("janet.weaver@corp.example".to_string()),
                ..UpdateUserBody::default()
            },
        })
        .await
        .unwrap();

    let page = state.cache.users_page(1, false).await.into_result().unwrap();
    let janet = page.data.iter().find(|u| u.id == 2).unwrap();
    assert_eq!(janet.email, "janet.weaver@corp.example");
    assert_eq!(stub.list_hits(1), 2);
}

#[tokio::test]
async fn test_job_only_update_keeps_list_cached() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);

    state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(stub.list_hits(1), 1);

    state
        .gateway
        .run(UpdateUserRequest {
            id: 2,
            body: UpdateUserBody {
                job: Some("Zookeeper".to_string()),
                ..UpdateUserBody::default()
            },
        })
        .await
        .unwrap();

    // job is not shown in list rows, so the cached page stays good
    let page = state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(page.data.len(), 6);
    assert_eq!(stub.list_hits(1), 1);
}

#[tokio::test]
async fn test_rejected_credentials_keep_session_and_last_value() {
    let stub = support::start_seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&stub, &dir);
    state.session.set(KNOWN_TOKEN, Some(KNOWN_EMAIL.to_string()));

    let good = state.cache.users_page(1, false).await.into_result().unwrap();
    assert_eq!(good.data.len(), 6);

    stub.reject_auth(true);
    let snapshot = state.cache.users_page(1, true).await;
    assert_eq!(snapshot.status, QueryStatus::Error);
    assert!(snapshot.error.as_ref().unwrap().is_unauthorized());

    // the last good value survives the failed refetch, and a rejection
    // never logs the session out by itself
    let retained = snapshot.into_result().unwrap();
    assert_eq!(retained.data.len(), 6);
    assert!(state.session.is_logged_in());

    stub.reject_auth(false);
    let recovered = state.cache.users_page(1, true).await;
    assert_eq!(recovered.status, QueryStatus::Success);
}
