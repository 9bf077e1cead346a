mod common;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::StatusCode;

use common::{bearer, location, test_app};
use huddle_api::db::store::Store;
use huddle_api::invite::accept_invite;
use huddle_api::models::member::MemberRole;
use huddle_api::outcome::PageOutcome;

#[tokio::test]
async fn signed_out_visit_redirects_to_sign_in_without_touching_store() {
    let app = test_app();

    let resp = app.server.get("/invite/ABCD1234").await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&resp),
        "/sign-in?redirect_url=%2Finvite%2FABCD1234"
    );
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn empty_code_redirects_home() {
    let app = test_app();
    let (token, _) = app.sign_in("idp|alice", "alice").await;

    let resp = app
        .server
        .get("/invite/")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn empty_code_makes_no_store_calls() {
    let app = test_app();
    let (_, profile) = app.sign_in("idp|alice", "alice").await;
    let before = app.store.calls();

    let outcome = accept_invite(app.store.as_ref(), Some(&profile), "")
        .await
        .unwrap();

    assert!(matches!(outcome, PageOutcome::Redirect(ref to) if to == "/"));
    assert_eq!(app.store.calls(), before);
}

#[tokio::test]
async fn first_visit_joins_as_guest() {
    let app = test_app();
    let (owner_token, _) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&owner_token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();
    let code = server["invite_code"].as_str().unwrap();

    let (token, guest) = app.sign_in("idp|guest", "guest").await;
    let resp = app
        .server
        .get(&format!("/invite/{code}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), format!("/servers/{server_id}"));

    let members = app.store.members_of(server_id);
    assert_eq!(members.len(), 2);
    let joined = members
        .iter()
        .find(|m| m.profile_id == guest.id)
        .expect("guest membership");
    assert_eq!(joined.role(), MemberRole::Guest);
}

#[tokio::test]
async fn existing_member_is_redirected_without_writes() {
    let app = test_app();
    let (owner_token, _) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&owner_token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();
    let code = server["invite_code"].as_str().unwrap();

    let writes = app.store.writes();
    let resp = app
        .server
        .get(&format!("/invite/{code}"))
        .add_header(AUTHORIZATION, bearer(&owner_token))
        .await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), format!("/servers/{server_id}"));
    assert_eq!(app.store.writes(), writes);
    assert_eq!(app.store.members_of(server_id).len(), 1);
}

#[tokio::test]
async fn repeat_visits_keep_a_single_membership() {
    let app = test_app();
    let (owner_token, _) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&owner_token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();
    let code = server["invite_code"].as_str().unwrap();

    let (token, _) = app.sign_in("idp|guest", "guest").await;
    for _ in 0..3 {
        app.server
            .get(&format!("/invite/{code}"))
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);
    }

    assert_eq!(app.store.members_of(server_id).len(), 2);
}

#[tokio::test]
async fn racing_joins_after_membership_checks_create_one_membership() {
    let app = test_app();
    let (owner_token, _) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&owner_token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();
    let code = server["invite_code"].as_str().unwrap();
    let (_, guest) = app.sign_in("idp|guest", "guest").await;

    // Both visits see "not a member" before either writes.
    let store = app.store.as_ref();
    assert!(store
        .find_server_with_member(code, &guest.id)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .find_server_with_member(code, &guest.id)
        .await
        .unwrap()
        .is_none());

    let first = store.join_by_invite_code(code, &guest.id).await.unwrap();
    let second = store.join_by_invite_code(code, &guest.id).await.unwrap();

    assert_eq!([first.created, second.created], [true, false]);
    assert_eq!(first.server.id, server_id);
    assert_eq!(second.server.id, server_id);
    let guests = app
        .store
        .members_of(server_id)
        .into_iter()
        .filter(|m| m.profile_id == guest.id)
        .count();
    assert_eq!(guests, 1);
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let app = test_app();
    let (token, _) = app.sign_in("idp|alice", "alice").await;

    let resp = app
        .server
        .get("/invite/NOPE0000")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status_not_found();
    assert_eq!(resp.text(), "Invite Not Found");
}

#[tokio::test]
async fn session_cookie_is_accepted() {
    let app = test_app();
    let (owner_token, _) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&owner_token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();
    let code = server["invite_code"].as_str().unwrap();

    let (token, _) = app.sign_in("idp|guest", "guest").await;
    let resp = app
        .server
        .get(&format!("/invite/{code}"))
        .add_header(COOKIE, format!("theme=dark; __session={token}"))
        .await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), format!("/servers/{server_id}"));
}

#[tokio::test]
async fn identity_without_profile_is_sent_to_sign_in() {
    let app = test_app();
    let token = common::session_token(&app.keys, "idp|new", "new");

    let resp = app
        .server
        .get("/invite/ABCD1234")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert!(location(&resp).starts_with("/sign-in?"));
}
